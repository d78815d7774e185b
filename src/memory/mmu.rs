//! Data memory behind the scalar pipeline's bus,
//! a lazily allocated page table of 64-bit words

use std::collections::HashMap;

use log::trace;

use super::StorageInterface;
use crate::error::MemoryError;
use crate::error::MemoryErrorKind;

const PAGE_WIDTH: usize = 10;
const PAGE_SIZE: usize = 1 << PAGE_WIDTH;

// Defines page type
type PageType = Box<[u64; PAGE_SIZE]>;

/// Memory management unit
#[derive(Default)]
pub struct MMU {
    // pages[p][o] stores the word at (p << PAGE_WIDTH) | o
    // Allocate stuff lazily
    pages: HashMap<u64, PageType>,
}

impl MMU {
    /// Make a new MMU
    pub fn make() -> Self {
        Self { pages: HashMap::new() }
    }

    /// The page number of the address
    pub fn get_page_number(address: u64) -> u64 {
        address >> PAGE_WIDTH
    }

    /// The word offset within the page
    pub fn get_page_offset(address: u64) -> usize {
        (address & ((PAGE_SIZE - 1) as u64)) as usize
    }

    /// Set the word at the given address, allocating its page on demand
    pub fn set64(&mut self, address: u64, value: u64) {
        let page = self
            .pages
            .entry(Self::get_page_number(address))
            .or_insert_with(|| Box::new([0; PAGE_SIZE]));
        page[Self::get_page_offset(address)] = value;
    }

    /// Get the word at the given address
    pub fn get64(&self, address: u64) -> Result<u64, MemoryError> {
        match self.pages.get(&Self::get_page_number(address)) {
            Some(page) => Ok(page[Self::get_page_offset(address)]),
            None => Err(MemoryError::AccessError {
                address,
                kind: MemoryErrorKind::ReadUnallocated,
            }),
        }
    }
}

impl StorageInterface for MMU {
    /// Unallocated words read as zero
    fn load(&mut self, address: u64) -> u64 {
        self.get64(address).unwrap_or_else(|e| {
            trace!("{}; reading zero", e);
            0
        })
    }

    fn store(&mut self, address: u64, value: u64) {
        self.set64(address, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_granularity() {
        let mut memory = MMU::make();
        let address = 0x1234_5678_9abc;
        let page_base = address & !((PAGE_SIZE - 1) as u64);

        memory.set64(address, 7);

        // The whole page comes into existence, zeroed
        assert_eq!(memory.get64(page_base).unwrap(), 0);
        assert_eq!(memory.get64(page_base + PAGE_SIZE as u64 - 1).unwrap(), 0);
        assert!(memory.get64(page_base + PAGE_SIZE as u64).is_err());
        assert!(memory.get64(page_base - 1).is_err());
    }

    #[test]
    fn test_set64_get64() {
        let mut memory = MMU::make();
        let address = u64::MAX - 3;

        memory.set64(address, 0xdead_beef_cafe_f00d);

        assert_eq!(memory.get64(address).unwrap(), 0xdead_beef_cafe_f00d);
        assert_eq!(memory.get64(address - 1).unwrap(), 0);
    }

    #[test]
    fn test_unallocated_read() {
        let mut memory = MMU::make();
        assert!(matches!(
            memory.get64(0x40),
            Err(MemoryError::AccessError { address: 0x40, .. })
        ));
        // Through the bus interface it reads as zero
        assert_eq!(memory.load(0x40), 0);
        // Reading does not allocate
        assert!(memory.get64(0x40).is_err());
    }
}
