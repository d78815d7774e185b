//! Math accelerator: operation queue, execution core pool and the
//! controller that arbitrates them for a host

use crate::error::ExecutionError;
use crate::error::SimulatorError;
use crate::error::SimulatorResult;
use crate::memory::external::ExternalMemory;
use crate::memory::local_ram::LocalRam;

pub mod bf16;
pub mod controller;
pub mod exec_core;
pub mod host;
pub mod pool;
pub mod queue;

use controller::AcceleratorController;
use host::HostRequest;
use host::HostResponse;

/// Host opcode space (3 bits)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccelOpcode {
    Noop = 0,
    Add = 1,
    Sub = 2,
    Mul = 3,
    Div = 4,
    /// Local RAM access; the write flag picks the direction
    LocalRam = 5,
    /// External memory access; the write flag picks the direction
    External = 6,
    Reserved = 7,
}

impl AccelOpcode {
    pub fn from_bits(bits: u8) -> Self {
        use AccelOpcode::*;
        match bits & 0x7 {
            0 => Noop,
            1 => Add,
            2 => Sub,
            3 => Mul,
            4 => Div,
            5 => LocalRam,
            6 => External,
            _ => Reserved,
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, AccelOpcode::Add | AccelOpcode::Sub | AccelOpcode::Mul | AccelOpcode::Div)
    }
}

/// Per-request status bit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Success = 0,
    Error = 1,
}

/// Accelerator configuration
#[derive(Clone, Copy, Debug)]
pub struct AcceleratorConfig {
    pub queue_capacity: usize,
    pub core_count: usize,
    /// Words in local RAM, a power of two
    pub local_ram_words: usize,
    /// Wait cycles before external memory acknowledges
    pub external_latency: u32,
    /// Bound for driver loops; the controller itself never times out
    pub max_cycles: u64,
    /// Completions kept in the controller log; zero disables it
    pub completion_log: usize,
}

impl Default for AcceleratorConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 16,
            core_count: 4,
            local_ram_words: 256,
            external_latency: 3,
            max_cycles: 1_000_000,
            completion_log: 1024,
        }
    }
}

impl AcceleratorConfig {
    pub fn validate(&self) -> SimulatorResult<()> {
        if self.queue_capacity == 0 {
            return Err(SimulatorError::ConfigError("queue capacity must be at least 1".into()));
        }
        if self.core_count == 0 {
            return Err(SimulatorError::ConfigError("core count must be at least 1".into()));
        }
        if !self.local_ram_words.is_power_of_two() {
            return Err(SimulatorError::ConfigError(format!(
                "local RAM size {} is not a power of two",
                self.local_ram_words
            )));
        }
        Ok(())
    }
}

/// Controller together with the memory devices behind its ports
pub struct Accelerator {
    pub controller: AcceleratorController,
    pub ram: LocalRam,
    pub ext: ExternalMemory,
}

impl Accelerator {
    pub fn new(config: AcceleratorConfig) -> SimulatorResult<Self> {
        config.validate()?;
        Ok(Self {
            controller: AcceleratorController::new(config),
            ram: LocalRam::new(config.local_ram_words),
            ext: ExternalMemory::new(config.external_latency),
        })
    }

    /// One cycle slot
    pub fn tick(&mut self, request: &HostRequest) -> HostResponse {
        self.controller.tick(request, &mut self.ram, &mut self.ext)
    }

    /// Ticks with no host request until all work has drained.
    /// Returns the number of cycles spent.
    pub fn run_until_idle(&mut self) -> SimulatorResult<u64> {
        let limit = self.controller.config.max_cycles;
        let mut cycles = 0;
        while !self.controller.is_drained() {
            if cycles >= limit {
                return Err(ExecutionError::CycleLimitReached(limit).into());
            }
            self.tick(&HostRequest::idle());
            cycles += 1;
        }
        Ok(cycles)
    }
}
