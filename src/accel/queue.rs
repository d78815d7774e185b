//! Fixed-capacity circular queue of pending arithmetic requests

use log::debug;
use log::warn;

use super::AccelOpcode;

/// One queued request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueEntry {
    pub opcode: AccelOpcode,
    pub operand_a: u16,
    pub operand_b: u16,
}

/// Ring buffer over fixed slots with wraparound head/tail pointers.
/// A request is accepted only if the slot at the write pointer is free.
pub struct OperationQueue {
    slots: Vec<Option<QueueEntry>>,
    head: usize,
    tail: usize,
}

impl OperationQueue {
    pub fn new(capacity: usize) -> Self {
        Self { slots: vec![None; capacity.max(1)], head: 0, tail: 0 }
    }

    /// Returns whether the request was stored.
    /// Non-arithmetic opcodes are not queued; a full queue drops the request.
    pub fn enqueue(&mut self, opcode: AccelOpcode, operand_a: u16, operand_b: u16) -> bool {
        if !opcode.is_arithmetic() {
            return false;
        }
        if self.slots[self.tail].is_some() {
            warn!(
                "queue full, dropping {:?} {:#06x} {:#06x}",
                opcode, operand_a, operand_b
            );
            return false;
        }
        self.slots[self.tail] = Some(QueueEntry { opcode, operand_a, operand_b });
        debug!("enqueued {:?} at slot {}", opcode, self.tail);
        self.tail = (self.tail + 1) % self.slots.len();
        true
    }

    /// The entry at the read pointer, without removing it
    pub fn peek(&self) -> Option<&QueueEntry> {
        self.slots[self.head].as_ref()
    }

    /// Removes the entry at the read pointer
    pub fn pop(&mut self) -> Option<QueueEntry> {
        let entry = self.slots[self.head].take()?;
        self.head = (self.head + 1) % self.slots.len();
        Some(entry)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.peek().is_none()
    }

    pub fn is_full(&self) -> bool {
        self.slots[self.tail].is_some()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
