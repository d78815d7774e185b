//! Memory structure: the scalar data bus and the accelerator's memory ports

pub mod external;
pub mod local_ram;
pub mod mmu;

/// Data memory interface seen by the scalar pipeline.
/// Addresses name 64-bit words.
pub trait StorageInterface {
    fn load(&mut self, address: u64) -> u64;
    fn store(&mut self, address: u64, value: u64);
}

/// Outputs the scalar pipeline drives onto the memory bus in one cycle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BusSignals {
    pub address: u64,
    pub write_data: u64,
    pub mem_read_enable: bool,
    pub mem_write_enable: bool,
}

/// Single-cycle bus latch.
/// Answers every load with externally supplied read data
/// and records what the pipeline drove.
#[derive(Clone, Copy, Debug, Default)]
pub struct LatchedBus {
    read_data: u64,
    pub signals: BusSignals,
}

impl LatchedBus {
    pub fn new(read_data: u64) -> Self {
        Self { read_data, signals: BusSignals::default() }
    }
}

impl StorageInterface for LatchedBus {
    fn load(&mut self, address: u64) -> u64 {
        self.signals.address = address;
        self.signals.mem_read_enable = true;
        self.read_data
    }

    fn store(&mut self, address: u64, value: u64) {
        self.signals.address = address;
        self.signals.write_data = value;
        self.signals.mem_write_enable = true;
    }
}
