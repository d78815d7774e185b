//! Accelerator-local RAM: single-cycle synchronous port, no acknowledge

use crate::error::MemoryError;
use crate::error::MemoryErrorKind;

/// Port contract the controller drives each cycle
pub trait LocalRamPort {
    /// One synchronous access. Returns the word at `address`
    /// as it was before any write in the same cycle.
    fn access(&mut self, address: u32, write_enable: bool, write_data: u16) -> u16;
}

/// Power-of-two sized array of accelerator words
pub struct LocalRam {
    words: Vec<u16>,
}

impl LocalRam {
    /// `size` must be a power of two; checked by the accelerator configuration
    pub fn new(size: usize) -> Self {
        Self { words: vec![0; size.max(1)] }
    }

    pub fn size(&self) -> usize {
        self.words.len()
    }

    fn index(&self, address: u32) -> usize {
        address as usize & (self.words.len() - 1)
    }

    /// Seeds the RAM from `base`
    pub fn preload(&mut self, base: u32, data: &[u16]) -> Result<(), MemoryError> {
        let end = base as usize + data.len();
        if end > self.words.len() {
            return Err(MemoryError::AccessError {
                address: end as u64 - 1,
                kind: MemoryErrorKind::OutOfBounds,
            });
        }
        self.words[base as usize..end].copy_from_slice(data);
        Ok(())
    }

    pub fn peek(&self, address: u32) -> u16 {
        self.words[self.index(address)]
    }
}

impl LocalRamPort for LocalRam {
    fn access(&mut self, address: u32, write_enable: bool, write_data: u16) -> u16 {
        let i = self.index(address);
        let read_data = self.words[i];
        if write_enable {
            self.words[i] = write_data;
        }
        read_data
    }
}
