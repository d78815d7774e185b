//! Accelerator word format: 1 sign, 8 exponent, 7 explicit mantissa bits.
//!
//! Working significands are 16 bits wide with the implicit bit at
//! position 14, leaving bit 15 for intermediate overflow. Results are
//! truncated, never rounded.

pub const EXPONENT_BIAS: i32 = 127;

/// Shift from an 8-bit significand to the working position
pub const WORKING_SHIFT: u32 = 7;

const OVERFLOW_BIT: u32 = 1 << 15;
const LEADING_BIT: u32 = 1 << 14;

/// Fields of an accelerator word
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decomposed {
    pub sign: u16,
    pub exponent: u16,
    /// Mantissa with the implicit bit prepended (8 bits)
    pub significand: u16,
}

/// Splits a word and prepends the implicit bit:
/// 1 for a nonzero exponent, 0 for denormals
pub fn decompose(word: u16) -> Decomposed {
    let sign = (word >> 15) & 0x1;
    let exponent = (word >> 7) & 0xff;
    let mantissa = word & 0x7f;
    let significand = if exponent != 0 { 0x80 | mantissa } else { mantissa };
    Decomposed { sign, exponent, significand }
}

/// Renormalizes a working significand and packs the result.
/// An overflow into bit 15 shifts right once; otherwise shifts left
/// while the leading bit is clear and the exponent is still positive.
pub fn normalize(sign: u16, exponent: i32, significand: u32) -> u16 {
    if significand == 0 {
        return (sign & 0x1) << 15;
    }
    let mut exponent = exponent;
    let mut significand = significand & 0xffff;
    if significand & OVERFLOW_BIT != 0 {
        significand >>= 1;
        exponent += 1;
    }
    while significand & LEADING_BIT == 0 && exponent > 0 {
        significand <<= 1;
        exponent -= 1;
    }
    pack(sign, exponent, significand)
}

/// Packs {sign, exponent[7:0], significand[13:7]}
pub fn pack(sign: u16, exponent: i32, significand: u32) -> u16 {
    ((sign & 0x1) << 15)
        | (((exponent as u16) & 0xff) << 7)
        | (((significand >> WORKING_SHIFT) & 0x7f) as u16)
}

/// Truncating conversion from `f32`
pub fn from_f32(value: f32) -> u16 {
    (value.to_bits() >> 16) as u16
}

pub fn to_f32(word: u16) -> f32 {
    f32::from_bits((word as u32) << 16)
}
