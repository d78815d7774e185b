//! Stage functions of the scalar pipeline.
//! One externally supplied instruction is evaluated per cycle slot.

use log::debug;

use crate::alu::{alu, ALUSrc};
use crate::cpu::CPUState;
use crate::instruction::Instruction;
use crate::memory::BusSignals;
use crate::memory::LatchedBus;
use crate::memory::StorageInterface;

/// ID: Instruction decode
pub fn instruction_decode(raw_inst: u32) -> Instruction {
    Instruction::new(raw_inst)
}

/// ID: Register read
pub fn register_read(inst: &Instruction, cpu: &CPUState) -> (u64, u64) {
    let op1 = cpu.gpr.read(inst.attributes.src1);
    let op2 = cpu.gpr.read(inst.attributes.src2);
    (op1, op2)
}

/// EX: Compute stuff
pub fn execute(cpu: &mut CPUState, inst: &Instruction, op1: u64, op2: u64) -> u64 {
    // Increment instruction count
    cpu.update_inst_count(1);

    use ALUSrc::*;
    let op2 = match inst.controls.alu_src {
        REG => op2,
        IMM => inst.attributes.imm,
    };
    let result = alu(inst, op1, op2);
    debug!(
        "{:#010x} {}: op1={:#x} op2={:#x} -> {:#x}",
        inst.raw_inst, inst, op1, op2, result
    );
    result
}

/// MEM: Access memory.
/// Returns the value to write back.
pub fn memory_access(
    inst: &Instruction,
    cpu: &mut CPUState,
    mem: &mut impl StorageInterface,
    exec_result: u64,
) -> u64 {
    let address = exec_result;
    if inst.controls.mem_read {
        cpu.history.mem_reads += 1;
        mem.load(address)
    } else if inst.controls.mem_write {
        // The dest field names the data register of a store
        let data = cpu.gpr.read(inst.attributes.dest);
        cpu.history.mem_writes += 1;
        mem.store(address, data);
        exec_result
    } else {
        exec_result
    }
}

/// WB: Write stuff back to the selected register
pub fn write_back(inst: &Instruction, cpu: &mut CPUState, wb_result: u64) {
    if inst.controls.reg_write {
        cpu.gpr.write(inst.attributes.dest, wb_result, inst.data_type);
        cpu.history.reg_writes += 1;
    }
}

/// Runs one instruction through every stage against a data memory
pub fn step(cpu: &mut CPUState, raw_inst: u32, mem: &mut impl StorageInterface) -> Instruction {
    // ID
    let inst = instruction_decode(raw_inst);
    let (op1, op2) = register_read(&inst, cpu);
    // EX
    let exec_result = execute(cpu, &inst, op1, op2);
    // MEM
    let wb_result = memory_access(&inst, cpu, mem, exec_result);
    // WB
    write_back(&inst, cpu, wb_result);
    inst
}

/// Per-cycle external interface: one instruction word and one
/// memory read data word in, the memory bus signals out.
/// The address lines carry the ALU result every cycle.
pub fn issue(cpu: &mut CPUState, raw_inst: u32, mem_read_data: u64) -> BusSignals {
    let inst = instruction_decode(raw_inst);
    let (op1, op2) = register_read(&inst, cpu);
    let exec_result = execute(cpu, &inst, op1, op2);

    let mut bus = LatchedBus::new(mem_read_data);
    bus.signals.address = exec_result;
    let wb_result = memory_access(&inst, cpu, &mut bus, exec_result);
    write_back(&inst, cpu, wb_result);
    bus.signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::CPUPolicy;
    use crate::instruction::Mode;
    use crate::types::DataType;

    fn enc(op: u32, ty: DataType, mode: Mode, d: u32, s1: u32, s2: u32, imm: u32) -> u32 {
        Instruction::encode(op, ty, mode, d, s1, s2, imm)
    }

    #[test]
    fn test_issue_add() {
        let mut cpu = CPUState::make(CPUPolicy::default());
        cpu.gpr.write(1, 10, DataType::INT64);
        cpu.gpr.write(2, 20, DataType::INT64);
        let bus = issue(&mut cpu, enc(0x0, DataType::INT32, Mode::GP, 3, 1, 2, 0), 0);
        assert_eq!(cpu.gpr.read(3), 30);
        assert!(!bus.mem_read_enable && !bus.mem_write_enable);
        // Address lines still carry the ALU result
        assert_eq!(bus.address, 30);
        assert_eq!(bus.write_data, 0);
    }

    #[test]
    fn test_issue_sub_sign_extends_on_write() {
        let mut cpu = CPUState::make(CPUPolicy::default());
        cpu.gpr.write(1, 10, DataType::INT64);
        cpu.gpr.write(2, 20, DataType::INT64);
        issue(&mut cpu, enc(0x1, DataType::INT32, Mode::GP, 3, 1, 2, 0), 0);
        assert_eq!(cpu.gpr.read(3), (-10i64) as u64);
    }

    #[test]
    fn test_issue_load() {
        let mut cpu = CPUState::make(CPUPolicy::default());
        cpu.gpr.write(5, 0x100, DataType::INT64);
        let bus = issue(&mut cpu, enc(0xd, DataType::INT8, Mode::GP, 4, 5, 0xf, 0xffc), 0x80);
        assert!(bus.mem_read_enable);
        assert!(!bus.mem_write_enable);
        assert_eq!(bus.address, 0xfc);
        assert_eq!(cpu.gpr.read(4), 0xffff_ffff_ffff_ff80);
    }

    #[test]
    fn test_issue_store() {
        let mut cpu = CPUState::make(CPUPolicy::default());
        cpu.gpr.write(5, 0x200, DataType::INT64);
        cpu.gpr.write(6, 0xfeed, DataType::INT64);
        let before = cpu.gpr.dump();
        let bus = issue(&mut cpu, enc(0xe, DataType::INT64, Mode::GP, 6, 5, 0, 8), 0);
        assert_eq!(
            bus,
            BusSignals {
                address: 0x208,
                write_data: 0xfeed,
                mem_read_enable: false,
                mem_write_enable: true
            }
        );
        assert_eq!(cpu.gpr.dump(), before);
    }

    #[test]
    fn test_src2_extends_immediate() {
        let mut cpu = CPUState::make(CPUPolicy::default());
        cpu.gpr.write(5, 0x100, DataType::INT64);
        let near = issue(&mut cpu, enc(0xd, DataType::INT64, Mode::GP, 4, 5, 0x0, 0x004), 0);
        assert_eq!(near.address, 0x104);
        // src2 is imm[15:12] here, not a register
        let far = issue(&mut cpu, enc(0xd, DataType::INT64, Mode::GP, 4, 5, 0x2, 0x004), 0);
        assert_eq!(far.address, 0x2104);
        let back = issue(&mut cpu, enc(0xe, DataType::INT64, Mode::GP, 4, 5, 0xf, 0xf00), 0);
        assert_eq!(back.address, 0);
        assert!(back.mem_write_enable);
    }

    #[test]
    fn test_mov_idempotent() {
        let mut cpu = CPUState::make(CPUPolicy::default());
        cpu.gpr.write(1, 0x1234_5678_9abc, DataType::INT64);
        let mov = enc(0xf, DataType::INT64, Mode::AMC, 2, 1, 0, 0);
        issue(&mut cpu, mov, 0);
        assert_eq!(cpu.gpr.read(2), 0x1234_5678_9abc);
        issue(&mut cpu, mov, 0);
        assert_eq!(cpu.gpr.read(2), 0x1234_5678_9abc);
        assert_eq!(cpu.gpr.read(1), 0x1234_5678_9abc);
    }

    #[test]
    fn test_write_to_r0_ignored() {
        let mut cpu = CPUState::make(CPUPolicy::default());
        cpu.gpr.write(1, 5, DataType::INT64);
        issue(&mut cpu, enc(0x0, DataType::INT64, Mode::GP, 0, 1, 1, 0), 0);
        assert_eq!(cpu.gpr.read(0), 0);
        assert_eq!(cpu.history.reg_writes, 1);
    }
}
