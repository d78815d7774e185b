//! Single cycle implementation: one instruction per cycle slot,
//! no fetch unit, no branching

use log::debug;

use crate::cpu::CPUState;
use crate::memory::StorageInterface;
use crate::stages_simple::step;

/// Feeds every instruction word of `program` in order.
/// Returns the number of cycle slots used.
pub fn run(cpu: &mut CPUState, program: &[u32], mem: &mut impl StorageInterface) -> u64 {
    for (slot, &raw_inst) in program.iter().enumerate() {
        debug!("slot {}: {:#010x}", slot, raw_inst);
        step(cpu, raw_inst, mem);
    }
    program.len() as u64
}
