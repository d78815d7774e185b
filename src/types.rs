//! Data type tags and write-time extension

use std::fmt;

/// 3-bit data type tag carried by every instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DataType {
    INT8,
    INT16,
    INT32,
    #[default]
    INT64,
    FP16,
    BF16,
    FP32,
    FP64,
}

impl DataType {
    /// Decodes the low 3 bits of a type field
    pub fn from_bits(bits: u32) -> Self {
        use DataType::*;
        match bits & 0x7 {
            0 => INT8,
            1 => INT16,
            2 => INT32,
            3 => INT64,
            4 => FP16,
            5 => BF16,
            6 => FP32,
            _ => FP64,
        }
    }

    /// Encodes the tag back into its 3-bit field value
    pub fn to_bits(self) -> u32 {
        use DataType::*;
        match self {
            INT8 => 0,
            INT16 => 1,
            INT32 => 2,
            INT64 => 3,
            FP16 => 4,
            BF16 => 5,
            FP32 => 6,
            FP64 => 7,
        }
    }

    /// Operand width in bits
    pub fn width(self) -> u32 {
        use DataType::*;
        match self {
            INT8 => 8,
            INT16 | FP16 | BF16 => 16,
            INT32 | FP32 => 32,
            INT64 | FP64 => 64,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            DataType::FP16 | DataType::BF16 | DataType::FP32 | DataType::FP64
        )
    }

    /// Mask covering the low `width()` bits
    pub fn mask(self) -> u64 {
        match self.width() {
            64 => u64::MAX,
            w => (1u64 << w) - 1,
        }
    }

    /// Produces the 64-bit stored form of a raw value.
    /// Signed integer widths sign-extend, floating widths zero-extend
    /// (no IEEE conversion), 64-bit widths pass through.
    pub fn extend(self, value: u64) -> u64 {
        use DataType::*;
        match self {
            INT8 => value as u8 as i8 as i64 as u64,
            INT16 => value as u16 as i16 as i64 as u64,
            INT32 => value as u32 as i32 as i64 as u64,
            FP16 | BF16 => value & 0xffff,
            FP32 => value & 0xffff_ffff,
            INT64 | FP64 => value,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_roundtrip() {
        for bits in 0..8 {
            assert_eq!(DataType::from_bits(bits).to_bits(), bits);
        }
        // Only the low 3 bits matter
        assert_eq!(DataType::from_bits(0b1010), DataType::INT32);
    }

    #[test]
    fn test_sign_extension() {
        assert_eq!(DataType::INT8.extend(0xff), u64::MAX);
        assert_eq!(DataType::INT8.extend(0x7f), 0x7f);
        assert_eq!(DataType::INT8.extend(0x1234_5680), 0xffff_ffff_ffff_ff80);
        assert_eq!(DataType::INT16.extend(0x8000), 0xffff_ffff_ffff_8000);
        assert_eq!(DataType::INT32.extend(0xdead_beef), 0xffff_ffff_dead_beef);
        assert_eq!(DataType::INT32.extend(0x1_0000_0001), 1);
    }

    #[test]
    fn test_zero_extension() {
        assert_eq!(DataType::FP16.extend(0xffff_ffff), 0xffff);
        assert_eq!(DataType::BF16.extend(0x1234_40a0), 0x40a0);
        assert_eq!(DataType::FP32.extend(0x3f80_0000), 0x3f80_0000);
        assert_eq!(DataType::FP32.extend(0xffff_ffff_bf80_0000), 0xbf80_0000);
    }

    #[test]
    fn test_pass_through() {
        let v = 0x8123_4567_89ab_cdef;
        assert_eq!(DataType::INT64.extend(v), v);
        assert_eq!(DataType::FP64.extend(v), v);
    }
}
