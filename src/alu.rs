//! ALU implementation

use crate::instruction::Instruction;
use crate::instruction::Mode;
use crate::types::DataType;

/// Performs an atomic ALU operation on 64-bit operands.
/// The second operand has already been selected by the caller.
pub fn alu(inst: &Instruction, op1: u64, op2: u64) -> u64 {
    match inst.controls.alu_op {
        ALUOp::Overloaded(opcode) => match inst.mode {
            Mode::GP => gp(opcode, inst.data_type, op1, op2),
            Mode::AMC => amc(opcode, op1, op2),
        },
        ALUOp::Address => op1.wrapping_add(op2),
        ALUOp::Pass => op1,
        ALUOp::Nop => 0,
    }
}

/// General-purpose table.
/// Integer types are masked to their width and zero-extended.
/// Floating types are plain integer arithmetic on the bit pattern.
pub fn gp(opcode: u32, data_type: DataType, op1: u64, op2: u64) -> u64 {
    let result = match opcode {
        0x0 => op1.wrapping_add(op2),
        0x1 => op1.wrapping_sub(op2),
        0x2 => op1.wrapping_mul(op2),
        0x7 => op1 & op2,
        0x8 => op1 | op2,
        0x9 => op1 ^ op2,
        0xf => op1,
        // DIV MOD NEG ABS CMP SHL SHR are placeholders
        _ => 0,
    };
    if data_type.is_float() {
        result
    } else {
        result & data_type.mask()
    }
}

/// Advanced-math table.
/// MADD is a bare multiply; SQRT and SIN forward src1.
pub fn amc(opcode: u32, op1: u64, op2: u64) -> u64 {
    match opcode {
        0x0 => op1.wrapping_mul(op2),
        0x2 => op1,
        0x6 => op1,
        _ => 0,
    }
}

/// Selector for ALU src2 input
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum ALUSrc {
    // From register
    #[default]
    REG,
    // From immediate
    IMM,
}

/// Effective ALU operation chosen by the control unit
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum ALUOp {
    /// Opcode looked up in the GP or AMC table depending on mode
    Overloaded(u32),
    /// src1 + immediate, for loads and stores
    Address,
    /// Forward src1
    Pass,
    #[default]
    Nop,
}
