//! Host-facing request and response lines

use super::AccelOpcode;
use super::Status;

/// Request lines sampled once per cycle slot
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HostRequest {
    pub valid: bool,
    pub write: bool,
    /// 3-bit opcode
    pub opcode: u8,
    pub operand_a: u16,
    pub operand_b: u16,
    pub local_ram_addr: u32,
    pub external_addr: u32,
    pub external_write_data: u16,
}

impl HostRequest {
    /// No request this cycle
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn arithmetic(opcode: AccelOpcode, operand_a: u16, operand_b: u16) -> Self {
        Self { valid: true, opcode: opcode as u8, operand_a, operand_b, ..Self::default() }
    }

    pub fn local_ram_read(address: u32) -> Self {
        Self {
            valid: true,
            opcode: AccelOpcode::LocalRam as u8,
            local_ram_addr: address,
            ..Self::default()
        }
    }

    /// Write data travels on operand A
    pub fn local_ram_write(address: u32, data: u16) -> Self {
        Self { write: true, operand_a: data, ..Self::local_ram_read(address) }
    }

    pub fn external_read(address: u32) -> Self {
        Self {
            valid: true,
            opcode: AccelOpcode::External as u8,
            external_addr: address,
            ..Self::default()
        }
    }

    pub fn external_write(address: u32, data: u16) -> Self {
        Self { write: true, external_write_data: data, ..Self::external_read(address) }
    }

    pub fn accel_opcode(&self) -> AccelOpcode {
        AccelOpcode::from_bits(self.opcode)
    }
}

/// Response lines driven back to the host
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HostResponse {
    /// High for the cycle the controller handled a request
    pub ack: bool,
    /// High while a host request is in flight
    pub busy: bool,
    pub result_out: u16,
    pub status: Status,
}
