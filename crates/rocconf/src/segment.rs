//! One contiguous bit range of a parameter inside a single register.

use crate::{
    NUM_REGISTERS,
    bits::{clear_mask, field_mask},
    errors::SpecError,
};

/// Location of one chunk of a parameter: `n_bits` bits starting at `min_bit` of `register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Register index within the page (0..=15).
    pub register: u8,
    /// Lowest bit of the chunk within the register (0..=7).
    pub min_bit: u8,
    /// Width of the chunk (1..=8).
    pub n_bits: u8,
}

impl Segment {
    pub const fn new(register: u8, min_bit: u8, n_bits: u8) -> Self {
        Segment {
            register,
            min_bit,
            n_bits,
        }
    }
}

impl From<(u8, u8, u8)> for Segment {
    fn from((register, min_bit, n_bits): (u8, u8, u8)) -> Self {
        Segment::new(register, min_bit, n_bits)
    }
}

/// A validated [Segment] with its masks and its position in the parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompiledSegment {
    pub register: u8,
    pub min_bit: u8,
    pub n_bits: u8,
    /// `(1 << n_bits) - 1`.
    pub mask: u8,
    /// Register mask with this segment's bits cleared.
    pub clear: u8,
    /// Offset of this chunk within the parameter value (the running bit cursor).
    pub shift: u32,
}

impl CompiledSegment {
    /// Bits of this segment inside its register.
    pub fn register_mask(&self) -> u8 {
        !self.clear
    }
}

impl TryFrom<&Segment> for CompiledSegment {
    type Error = SpecError;

    fn try_from(segment: &Segment) -> Result<Self, Self::Error> {
        if segment.register as usize >= NUM_REGISTERS {
            return Err(SpecError::InvalidRegister(segment.register));
        } else if segment.min_bit > 7 {
            return Err(SpecError::InvalidMinBit(segment.min_bit));
        } else if segment.n_bits == 0 || segment.n_bits > 8 {
            return Err(SpecError::InvalidWidth(segment.n_bits));
        } else if segment.min_bit + segment.n_bits > 8 {
            return Err(SpecError::SegmentOverrunsRegister {
                min_bit: segment.min_bit,
                n_bits: segment.n_bits,
            });
        }

        Ok(CompiledSegment {
            register: segment.register,
            min_bit: segment.min_bit,
            n_bits: segment.n_bits,
            mask: field_mask(segment.n_bits),
            clear: clear_mask(segment.min_bit, segment.n_bits),
            shift: 0,
        })
    }
}
