//! Decoding helper functions.
//! Field layout, MSB first:
//! opcode[31:28] type[27:25] mode[24] dest[23:20] src1[19:16] src2[15:12] imm[11:0]
//!
//! When the immediate is selected, src2 supplies its top four bits.

use super::control::get_controls;
use super::Attributes;
use super::Function;
use super::Instruction;
use super::Mode;
use crate::types::DataType;

/// Extracts the sign-extended 16-bit immediate src2:imm[11:0]
fn get_imm_sign_extended(raw_inst: u32) -> u64 {
    (raw_inst & 0xffff) as u16 as i16 as i64 as u64
}

/// Determines an instruction's mnemonic, e.g., MUL, SQRT, or MOV
pub fn get_function(mode: Mode, opcode: u32) -> Function {
    use Function::*;
    match (mode, opcode) {
        (_, 0xd) => LOAD,
        (_, 0xe) => STORE,
        (_, 0xf) => MOV,
        (Mode::GP, 0x0) => ADD,
        (Mode::GP, 0x1) => SUB,
        (Mode::GP, 0x2) => MUL,
        (Mode::GP, 0x3) => DIV,
        (Mode::GP, 0x4) => MOD,
        (Mode::GP, 0x5) => NEG,
        (Mode::GP, 0x6) => ABS,
        (Mode::GP, 0x7) => AND,
        (Mode::GP, 0x8) => OR,
        (Mode::GP, 0x9) => XOR,
        (Mode::GP, 0xa) => CMP,
        (Mode::GP, 0xb) => SHL,
        (Mode::GP, 0xc) => SHR,
        (Mode::AMC, 0x0) => MADD,
        (Mode::AMC, 0x1) => MSUB,
        (Mode::AMC, 0x2) => SQRT,
        (Mode::AMC, 0x3) => INV,
        (Mode::AMC, 0x4) => EXP,
        (Mode::AMC, 0x5) => LOG,
        (Mode::AMC, 0x6) => SIN,
        (Mode::AMC, 0x7) => COS,
        (Mode::AMC, 0x8) => TAN,
        (Mode::AMC, 0x9) => RSQRT,
        _ => RESERVED,
    }
}

/// Parses every field and derives the control signals
pub fn parse(inst: &mut Instruction) {
    let raw_inst = inst.raw_inst;
    inst.opcode = get_opcode(raw_inst);
    inst.data_type = DataType::from_bits(get_type(raw_inst));
    inst.mode = get_mode(raw_inst);
    inst.attributes = Attributes {
        dest: get_dest(raw_inst),
        src1: get_src1(raw_inst),
        src2: get_src2(raw_inst),
        imm: get_imm_sign_extended(raw_inst),
    };
    inst.function = get_function(inst.mode, inst.opcode);
    inst.controls = get_controls(inst.opcode);
}

/// Extracts opcode from a raw instruction
pub fn get_opcode(raw_inst: u32) -> u32 {
    (raw_inst >> 28) & 0xf
}

/// Extracts the type tag field from a raw instruction
pub fn get_type(raw_inst: u32) -> u32 {
    (raw_inst >> 25) & 0x7
}

/// Extracts the mode bit from a raw instruction
pub fn get_mode(raw_inst: u32) -> Mode {
    match (raw_inst >> 24) & 0x1 {
        0 => Mode::GP,
        _ => Mode::AMC,
    }
}

/// Extracts the dest field from a raw instruction
pub fn get_dest(raw_inst: u32) -> u32 {
    (raw_inst >> 20) & 0xf
}

/// Extracts the src1 field from a raw instruction
pub fn get_src1(raw_inst: u32) -> u32 {
    (raw_inst >> 16) & 0xf
}

/// Extracts the src2 field from a raw instruction
pub fn get_src2(raw_inst: u32) -> u32 {
    (raw_inst >> 12) & 0xf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_extraction() {
        // opcode=2 type=INT16 mode=AMC dest=3 src1=1 src2=2 imm=0xabc
        let raw: u32 = 0x2331_2abc;
        assert_eq!(get_opcode(raw), 0x2);
        assert_eq!(get_type(raw), 1);
        assert_eq!(get_mode(raw), Mode::AMC);
        assert_eq!(get_dest(raw), 3);
        assert_eq!(get_src1(raw), 1);
        assert_eq!(get_src2(raw), 2);
    }

    #[test]
    fn test_imm_sign_extended() {
        assert_eq!(get_imm_sign_extended(0x7ff), 0x7ff);
        // Bit 11 alone is not the sign
        assert_eq!(get_imm_sign_extended(0x800), 0x800);
        // src2 carries the upper bits
        assert_eq!(get_imm_sign_extended(0x3004), 0x3004);
        assert_eq!(get_imm_sign_extended(0xf800), (-2048i64) as u64);
        assert_eq!(get_imm_sign_extended(0xffff_ffff), u64::MAX);
    }

    #[test]
    fn test_any_word_decodes() {
        for raw in [0u32, u32::MAX, 0xdead_beef, 0x8000_0000] {
            let inst = Instruction::new(raw);
            assert_eq!(inst.raw_inst, raw);
        }
        assert_eq!(Instruction::new(u32::MAX).function, Function::MOV);
    }
}
