//! Control unit: opcode to control signals

use super::Controls;
use crate::alu::ALUOp;
use crate::alu::ALUSrc;

/// Combinational decode of an opcode into its control tuple.
/// The mode bit is not consulted here; the ALU reinterprets by mode.
pub fn get_controls(opcode: u32) -> Controls {
    match opcode {
        // Arithmetic, logic, compare and shift
        0x0..=0xc => Controls {
            reg_write: true,
            mem_read: false,
            mem_write: false,
            alu_op: ALUOp::Overloaded(opcode),
            alu_src: ALUSrc::REG,
        },
        // Load
        0xd => Controls {
            reg_write: true,
            mem_read: true,
            mem_write: false,
            alu_op: ALUOp::Address,
            alu_src: ALUSrc::IMM,
        },
        // Store
        0xe => Controls {
            reg_write: false,
            mem_read: false,
            mem_write: true,
            alu_op: ALUOp::Address,
            alu_src: ALUSrc::IMM,
        },
        // Move, regardless of mode
        0xf => Controls {
            reg_write: true,
            mem_read: false,
            mem_write: false,
            alu_op: ALUOp::Pass,
            alu_src: ALUSrc::REG,
        },
        // Unknown: no-op
        _ => Controls {
            reg_write: false,
            mem_read: false,
            mem_write: false,
            alu_op: ALUOp::Nop,
            alu_src: ALUSrc::REG,
        },
    }
}
