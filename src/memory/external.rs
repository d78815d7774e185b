//! External memory behind a request/acknowledge handshake

use std::collections::HashMap;

use log::trace;

/// Lines the controller drives toward external memory
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExternalRequest {
    pub request: bool,
    pub write: bool,
    pub address: u32,
    pub write_data: u16,
}

/// Lines external memory drives back
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExternalResponse {
    pub ack: bool,
    pub read_data: u16,
}

/// Handshake contract: called once per cycle with the current request lines
pub trait ExternalMemoryPort {
    fn cycle(&mut self, lines: &ExternalRequest) -> ExternalResponse;
}

/// Sparse word memory that acknowledges a held request
/// after a fixed number of wait cycles
pub struct ExternalMemory {
    words: HashMap<u32, u16>,
    latency: u32,
    waited: u32,
}

impl ExternalMemory {
    pub fn new(latency: u32) -> Self {
        Self { words: HashMap::new(), latency, waited: 0 }
    }

    pub fn peek(&self, address: u32) -> u16 {
        self.words.get(&address).copied().unwrap_or(0)
    }

    pub fn poke(&mut self, address: u32, value: u16) {
        self.words.insert(address, value);
    }
}

impl ExternalMemoryPort for ExternalMemory {
    fn cycle(&mut self, lines: &ExternalRequest) -> ExternalResponse {
        if !lines.request {
            self.waited = 0;
            return ExternalResponse::default();
        }
        if self.waited < self.latency {
            self.waited += 1;
            return ExternalResponse::default();
        }
        self.waited = 0;
        trace!(
            "external {} @ {:#010x}",
            if lines.write { "write" } else { "read" },
            lines.address
        );
        if lines.write {
            self.words.insert(lines.address, lines.write_data);
            ExternalResponse { ack: true, read_data: 0 }
        } else {
            ExternalResponse { ack: true, read_data: self.peek(lines.address) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency() {
        let mut mem = ExternalMemory::new(2);
        mem.poke(0x10, 0xbeef);
        let lines = ExternalRequest { request: true, write: false, address: 0x10, write_data: 0 };
        assert!(!mem.cycle(&lines).ack);
        assert!(!mem.cycle(&lines).ack);
        assert_eq!(mem.cycle(&lines), ExternalResponse { ack: true, read_data: 0xbeef });
    }

    #[test]
    fn test_write_zero_latency() {
        let mut mem = ExternalMemory::new(0);
        let lines = ExternalRequest { request: true, write: true, address: 7, write_data: 42 };
        assert!(mem.cycle(&lines).ack);
        assert_eq!(mem.peek(7), 42);
        assert_eq!(mem.cycle(&ExternalRequest::default()), ExternalResponse::default());
    }
}
