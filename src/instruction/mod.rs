//! Instruction representation

use std::fmt;

use crate::alu::ALUOp;
use crate::alu::ALUSrc;
use crate::types::DataType;

pub mod control;
pub mod decode_helper;

/// NOP: ADD.INT8 r0, r0, r0
pub(crate) const NOP: u32 = 0x0;

/// Wrapped instruction
#[derive(Clone, Copy, Debug)]
pub struct Instruction {
    /// Raw representation
    pub raw_inst: u32,
    /// 4-bit opcode
    pub opcode: u32,
    /// Data type tag
    pub data_type: DataType,
    /// Opcode interpretation mode
    pub mode: Mode,
    /// Mnemonic selected by (mode, opcode)
    pub function: Function,
    /// Register and immediate fields
    pub attributes: Attributes,
    /// Control signals
    pub controls: Controls,
}

impl Instruction {
    /// Decodes a raw instruction word. Every 32-bit value decodes.
    pub fn new(raw_inst: u32) -> Self {
        let mut inst = Self {
            raw_inst,
            opcode: 0,
            data_type: DataType::default(),
            mode: Mode::default(),
            function: Function::default(),
            attributes: Attributes::default(),
            controls: Controls::default(),
        };
        decode_helper::parse(&mut inst);
        inst
    }

    /// Packs fields into a raw instruction word.
    /// Immediate forms read `src2` as imm[15:12].
    pub fn encode(
        opcode: u32,
        data_type: DataType,
        mode: Mode,
        dest: u32,
        src1: u32,
        src2: u32,
        imm: u32,
    ) -> u32 {
        ((opcode & 0xf) << 28)
            | (data_type.to_bits() << 25)
            | ((mode as u32) << 24)
            | ((dest & 0xf) << 20)
            | ((src1 & 0xf) << 16)
            | ((src2 & 0xf) << 12)
            | (imm & 0xfff)
    }
}

impl Default for Instruction {
    fn default() -> Self {
        Self::new(NOP)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.attributes;
        match self.controls.alu_src {
            ALUSrc::IMM => write!(
                f,
                "{:?}.{} r{}, r{}, {}",
                self.function, self.data_type, a.dest, a.src1, a.imm as i64
            ),
            ALUSrc::REG => write!(
                f,
                "{:?}.{} r{}, r{}, r{}",
                self.function, self.data_type, a.dest, a.src1, a.src2
            ),
        }
    }
}

/// Opcode interpretation mode, selected by the mode bit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    /// General-purpose integer/logic operations
    #[default]
    GP = 0,
    /// Advanced-math-computation operations
    AMC = 1,
}

/// Mnemonic of a decoded instruction.
/// Several are named by the instruction set but evaluate to zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Function {
    // GP
    #[default]
    ADD,
    SUB,
    MUL,
    DIV,
    MOD,
    NEG,
    ABS,
    AND,
    OR,
    XOR,
    CMP,
    SHL,
    SHR,
    // AMC
    MADD,
    MSUB,
    SQRT,
    INV,
    EXP,
    LOG,
    SIN,
    COS,
    TAN,
    RSQRT,
    // Either mode
    LOAD,
    STORE,
    MOV,
    RESERVED,
}

/// Instruction register and immediate fields
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Attributes {
    pub dest: u32,
    pub src1: u32,
    pub src2: u32,
    /// Sign-extended 16-bit immediate, src2 in its top four bits
    pub imm: u64,
}

/// Control signals
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Controls {
    pub reg_write: bool,
    pub mem_read: bool,
    pub mem_write: bool,
    pub alu_op: ALUOp,
    pub alu_src: ALUSrc,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_fields() {
        let raw = Instruction::encode(0x2, DataType::INT16, Mode::GP, 3, 1, 2, 0);
        let inst = Instruction::new(raw);
        assert_eq!(inst.opcode, 0x2);
        assert_eq!(inst.data_type, DataType::INT16);
        assert_eq!(inst.mode, Mode::GP);
        assert_eq!(inst.function, Function::MUL);
        assert_eq!(inst.attributes.dest, 3);
        assert_eq!(inst.attributes.src1, 1);
        assert_eq!(inst.attributes.src2, 2);
    }

    #[test]
    fn test_amc_functions() {
        let sqrt = Instruction::new(Instruction::encode(
            0x2,
            DataType::FP32,
            Mode::AMC,
            1,
            2,
            0,
            0,
        ));
        assert_eq!(sqrt.function, Function::SQRT);
        let reserved = Instruction::new(Instruction::encode(
            0xb,
            DataType::FP32,
            Mode::AMC,
            1,
            2,
            0,
            0,
        ));
        assert_eq!(reserved.function, Function::RESERVED);
    }

    #[test]
    fn test_display() {
        let add =
            Instruction::new(Instruction::encode(0x0, DataType::INT32, Mode::GP, 3, 1, 2, 0));
        assert_eq!(add.to_string(), "ADD.INT32 r3, r1, r2");
        let load = Instruction::new(Instruction::encode(
            0xd,
            DataType::INT64,
            Mode::GP,
            4,
            5,
            0xf,
            0xffc,
        ));
        assert_eq!(load.to_string(), "LOAD.INT64 r4, r5, -4");
        let store = Instruction::new(Instruction::encode(
            0xe,
            DataType::INT64,
            Mode::GP,
            4,
            5,
            0x1,
            0x000,
        ));
        assert_eq!(store.to_string(), "STORE.INT64 r4, r5, 4096");
    }
}
