//! Scalar core state: register file, policy and history

use crate::types::DataType;

/// Number of addressable registers
pub const REGISTER_COUNT: usize = 16;

/// CPU state
#[derive(Clone, Copy)]
pub struct CPUState {
    /// General purpose registers
    pub gpr: RegisterFile,

    /// CPU policy
    pub policy: CPUPolicy,

    /// History of execution
    pub history: CPUHistory,
}

impl CPUState {
    pub fn make(policy: CPUPolicy) -> Self {
        Self { gpr: RegisterFile::new(), policy, history: CPUHistory::default() }
    }

    /// Zeroes the register file and history
    pub fn reset(&mut self) {
        self.gpr.reset();
        self.history = CPUHistory::default();
    }

    /// Increments history instruction count
    pub fn update_inst_count(&mut self, value: u64) {
        self.history.inst_count += value;
    }
}

/// A single 64-bit storage cell
#[derive(Clone, Copy)]
pub struct Register {
    /// Current data in the register
    data: u64,
}

impl Register {
    pub fn new(data: u64) -> Self {
        Self { data }
    }

    /// Reads the register
    pub fn read(&self) -> u64 {
        self.data
    }

    /// Writes to register
    pub fn write(&mut self, value: u64) {
        self.data = value;
    }
}

/// Register file simulation.
/// Slot 0 is hardwired to zero.
#[derive(Clone, Copy)]
pub struct RegisterFile {
    cells: [Register; REGISTER_COUNT],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self { cells: [Register::new(0); REGISTER_COUNT] }
    }

    /// Reads a register; slot 0 always yields zero
    pub fn read(&self, index: u32) -> u64 {
        match index as usize {
            0 => 0,
            i => self.cells[i % REGISTER_COUNT].read(),
        }
    }

    /// Writes a register after type-specific extension.
    /// Writes to slot 0 are accepted and dropped.
    pub fn write(&mut self, index: u32, value: u64, data_type: DataType) {
        let i = index as usize % REGISTER_COUNT;
        if i != 0 {
            self.cells[i].write(data_type.extend(value));
        }
    }

    pub fn reset(&mut self) {
        self.cells = [Register::new(0); REGISTER_COUNT];
    }

    /// Snapshot of all 16 slots as observed through `read`
    pub fn dump(&self) -> [u64; REGISTER_COUNT] {
        let mut values = [0; REGISTER_COUNT];
        for (i, v) in values.iter_mut().enumerate() {
            *v = self.read(i as u32);
        }
        values
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

/// CPU policy
#[derive(Clone, Copy, Default)]
pub struct CPUPolicy {
    pub verbose: bool,
    pub history: bool,
}

impl CPUPolicy {
    /// Default log filter: verbose shows every instruction,
    /// history shows the summaries
    pub fn log_level(&self) -> &'static str {
        match (self.verbose, self.history) {
            (true, _) => "debug",
            (false, true) => "info",
            (false, false) => "warn",
        }
    }
}

/// History module
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CPUHistory {
    pub inst_count: u64,
    pub reg_writes: u64,
    pub mem_reads: u64,
    pub mem_writes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TYPES: [DataType; 8] = [
        DataType::INT8,
        DataType::INT16,
        DataType::INT32,
        DataType::INT64,
        DataType::FP16,
        DataType::BF16,
        DataType::FP32,
        DataType::FP64,
    ];

    #[test]
    fn test_write_read_extension() {
        let mut regs = RegisterFile::new();
        regs.write(1, 0xff, DataType::INT8);
        assert_eq!(regs.read(1), 0xffff_ffff_ffff_ffff);
        regs.write(2, 0x3f80_0000, DataType::FP32);
        assert_eq!(regs.read(2), 0x0000_0000_3f80_0000);

        let samples = [0u64, 1, 0x80, 0x8000, 0xdead_beef, u64::MAX];
        for ty in ALL_TYPES {
            for v in samples {
                regs.write(5, v, ty);
                assert_eq!(regs.read(5), ty.extend(v));
            }
        }
    }

    #[test]
    fn test_register_zero() {
        let mut regs = RegisterFile::new();
        for ty in ALL_TYPES {
            for v in [1u64, 0xff, u64::MAX] {
                regs.write(0, v, ty);
                assert_eq!(regs.read(0), 0);
            }
        }
    }

    #[test]
    fn test_policy_log_level() {
        let mut policy = CPUPolicy::default();
        assert_eq!(policy.log_level(), "warn");
        policy.history = true;
        assert_eq!(policy.log_level(), "info");
        policy.verbose = true;
        assert_eq!(policy.log_level(), "debug");
    }

    #[test]
    fn test_reset() {
        let mut cpu = CPUState::make(CPUPolicy::default());
        for i in 1..16 {
            cpu.gpr.write(i, i as u64 * 3, DataType::INT64);
        }
        cpu.update_inst_count(4);
        cpu.reset();
        assert_eq!(cpu.gpr.dump(), [0; REGISTER_COUNT]);
        assert_eq!(cpu.history, CPUHistory::default());
    }
}
