use std::path::PathBuf;

use clap::Parser;

use crate::accel::AcceleratorConfig;
use crate::cpu::CPUPolicy;

/// HybridCore dual-mode core and math accelerator simulator.
#[derive(Parser, Debug)]
#[command(name = "hybrid", version, about, long_about = None)]
pub struct HybridArgs {
    /// Instruction program to run through the scalar pipeline,
    /// one hex word per line.
    #[arg(short, long, value_name = "FILE")]
    pub program: Option<PathBuf>,

    /// Host request trace (CSV) to run through the accelerator.
    #[arg(short, long, value_name = "FILE")]
    pub trace: Option<PathBuf>,

    /// Number of accelerator execution cores.
    #[arg(long, value_name = "N", default_value_t = 4)]
    pub cores: usize,

    /// Operation queue capacity.
    #[arg(long, value_name = "N", default_value_t = 16)]
    pub queue: usize,

    /// Wait cycles before external memory acknowledges.
    #[arg(long, value_name = "N", default_value_t = 3)]
    pub ext_latency: u32,

    /// Writes the final register file as CSV.
    #[arg(long, value_name = "FILE")]
    pub dump: Option<PathBuf>,

    /// Enables history module, printing counters after simulation.
    #[arg(long)]
    pub history: bool,

    /// Enables verbose mode, logging every instruction and dispatch.
    #[arg(short, long)]
    pub verbose: bool,
}

impl HybridArgs {
    pub fn policy(&self) -> CPUPolicy {
        CPUPolicy { verbose: self.verbose, history: self.history }
    }

    pub fn accel_config(&self) -> AcceleratorConfig {
        AcceleratorConfig {
            queue_capacity: self.queue,
            core_count: self.cores,
            external_latency: self.ext_latency,
            ..Default::default()
        }
    }
}
