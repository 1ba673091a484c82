//! Where one parameter's bits live, and how a value is packed into registers.

use crate::{
    NUM_REGISTERS,
    bits::{self, extract_bits},
    errors::SpecError,
    register_file::PageRegisters,
    segment::{CompiledSegment, Segment},
};

/// A validated parameter layout: one or more [Segment]s, least-significant chunk first.
///
/// Segments only carry a register index, so every bit of a parameter lives on the
/// page the parameter is looked up on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitField {
    total_bits: u32,
    segments: Vec<CompiledSegment>,
}

/// One clear-then-insert step produced by [BitField::encode].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    pub register: u8,
    /// Applied to an already written register to erase the field's old bits.
    pub clear_mask: u8,
    /// New field bits, already shifted into place.
    pub bits: u8,
}

impl RegisterWrite {
    /// Applies this write to one register slot. An unset slot starts from 0.
    pub fn apply(&self, slot: &mut Option<u8>) {
        let cleared = match *slot {
            Some(value) => value & self.clear_mask,
            None => 0,
        };
        debug_assert_eq!(cleared & self.bits, 0);

        *slot = Some(cleared | self.bits);
    }
}

impl BitField {
    /// Builds a field from parallel lists as they appear in the chip documentation:
    /// `registers[i]`, `min_bits[i]` and `n_bits[i]` describe segment `i`, LSB chunk first.
    pub fn new(registers: &[u8], min_bits: &[u8], n_bits: &[u8]) -> Result<Self, SpecError> {
        if registers.len() != min_bits.len() || registers.len() != n_bits.len() {
            return Err(SpecError::MismatchedLengths {
                registers: registers.len(),
                min_bits: min_bits.len(),
                n_bits: n_bits.len(),
            });
        }

        let segments: Vec<Segment> = registers
            .iter()
            .zip(min_bits)
            .zip(n_bits)
            .map(|((&register, &min_bit), &n_bits)| Segment::new(register, min_bit, n_bits))
            .collect();

        Self::from_segments(&segments)
    }

    /// Single-segment field.
    pub fn single(register: u8, min_bit: u8, n_bits: u8) -> Result<Self, SpecError> {
        Self::from_segments(&[Segment::new(register, min_bit, n_bits)])
    }

    /// Validates `segments` (ordered LSB chunk first) and computes their masks and shifts.
    pub fn from_segments(segments: &[Segment]) -> Result<Self, SpecError> {
        if segments.is_empty() {
            return Err(SpecError::EmptyField);
        }

        let mut compiled = Vec::with_capacity(segments.len());
        let mut claimed = [0u8; NUM_REGISTERS];
        let mut shift = 0u32;

        for segment in segments {
            let mut compiled_segment = CompiledSegment::try_from(segment)?;

            let slot = &mut claimed[compiled_segment.register as usize];
            if *slot & compiled_segment.register_mask() != 0 {
                return Err(SpecError::OverlappingSegments(compiled_segment.register));
            }
            *slot |= compiled_segment.register_mask();

            compiled_segment.shift = shift;
            shift += compiled_segment.n_bits as u32;

            compiled.push(compiled_segment);
        }

        if shift > 64 {
            return Err(SpecError::FieldTooWide(shift));
        }

        Ok(BitField {
            total_bits: shift,
            segments: compiled,
        })
    }

    /// Sum of all segment widths.
    pub fn total_bits(&self) -> u32 {
        self.total_bits
    }

    /// Largest value that can be stored without losing bits.
    pub fn max_value(&self) -> u64 {
        bits::value_mask(self.total_bits)
    }

    /// True if `value` fits in [BitField::total_bits].
    pub fn fits(&self, value: u64) -> bool {
        bits::fits(value, self.total_bits)
    }

    pub fn segments(&self) -> &[CompiledSegment] {
        &self.segments
    }

    /// Per-register masks of the bits this field occupies.
    pub fn claimed_bits(&self) -> [u8; NUM_REGISTERS] {
        let mut claimed = [0u8; NUM_REGISTERS];
        for segment in &self.segments {
            claimed[segment.register as usize] |= segment.register_mask();
        }

        claimed
    }

    /// Splits `value` into per-register writes, consuming the lowest bits first.
    ///
    /// Bits above [BitField::total_bits] are ignored; range checking is the caller's job.
    pub fn encode(&self, value: u64) -> impl Iterator<Item = RegisterWrite> + '_ {
        self.segments.iter().map(move |segment| {
            let sub_val = ((value >> segment.shift) as u8) & segment.mask;

            RegisterWrite {
                register: segment.register,
                clear_mask: segment.clear,
                bits: (sub_val & segment.mask) << segment.min_bit,
            }
        })
    }

    /// Applies [BitField::encode] to one page's registers.
    pub fn encode_into(&self, value: u64, registers: &mut PageRegisters) {
        for write in self.encode(value) {
            write.apply(&mut registers[write.register as usize]);
        }
    }

    /// Reassembles the value from a page's registers. `None` if any register it uses is unset.
    pub fn decode(&self, registers: &PageRegisters) -> Option<u64> {
        let mut value = 0u64;

        for segment in &self.segments {
            let register = registers[segment.register as usize]?;
            let part = extract_bits(register, segment.min_bit, segment.n_bits) as u64;
            value |= part << segment.shift;
        }

        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tot_vref() -> BitField {
        BitField::new(&[1, 2], &[6, 0], &[2, 8]).unwrap()
    }

    #[test]
    fn test_single_segment_masks() {
        let field = BitField::single(0, 3, 1).unwrap();
        assert_eq!(field.total_bits(), 1);
        assert_eq!(field.segments()[0].mask, 0b1);
        assert_eq!(field.segments()[0].clear, 0b1111_0111);
    }

    #[test]
    fn test_multi_segment_shifts() {
        let field = tot_vref();
        assert_eq!(field.total_bits(), 10);
        assert_eq!(field.max_value(), 1023);
        assert_eq!(field.segments()[0].shift, 0);
        assert_eq!(field.segments()[1].shift, 2);
    }

    #[test]
    fn test_encode_splits_lsb_first() {
        // 432 = 0b01101100_00
        let writes: Vec<RegisterWrite> = tot_vref().encode(432).collect();
        assert_eq!(
            writes,
            vec![
                RegisterWrite {
                    register: 1,
                    clear_mask: 0b0011_1111,
                    bits: 0b00 << 6,
                },
                RegisterWrite {
                    register: 2,
                    clear_mask: 0x00,
                    bits: 0b0110_1100,
                },
            ]
        );
    }

    #[test]
    fn test_encode_ignores_high_bits() {
        let field = BitField::single(0, 4, 4).unwrap();
        let writes: Vec<RegisterWrite> = field.encode(0b1_0101).collect();
        assert_eq!(writes[0].bits, 0b0101_0000);
        assert!(!field.fits(0b1_0101));
    }

    #[test]
    fn test_register_write_starts_from_zero() {
        let mut slot = None;
        RegisterWrite {
            register: 0,
            clear_mask: 0b1111_0111,
            bits: 0b1000,
        }
        .apply(&mut slot);
        assert_eq!(slot, Some(0b1000));
    }

    #[test]
    fn test_register_write_clears_only_its_bits() {
        let mut slot = Some(0b0100_1111);
        RegisterWrite {
            register: 0,
            clear_mask: 0b1111_0111,
            bits: 0,
        }
        .apply(&mut slot);
        assert_eq!(slot, Some(0b0100_0111));
    }

    #[test]
    fn test_encode_into_and_decode() {
        let field = tot_vref();
        let mut registers: PageRegisters = [None; NUM_REGISTERS];
        registers[1] = Some(0b0011_1111);

        field.encode_into(433, &mut registers);
        assert_eq!(registers[1], Some(0b0111_1111));
        assert_eq!(registers[2], Some(0b0110_1100));
        assert_eq!(field.decode(&registers), Some(433));
    }

    #[test]
    fn test_decode_unset_register() {
        let mut registers: PageRegisters = [None; NUM_REGISTERS];
        registers[1] = Some(0);
        assert_eq!(tot_vref().decode(&registers), None);
    }

    #[test]
    fn test_mismatched_lengths() {
        assert_eq!(
            BitField::new(&[1, 2], &[6], &[2, 8]).unwrap_err(),
            SpecError::MismatchedLengths {
                registers: 2,
                min_bits: 1,
                n_bits: 2
            }
        );
    }

    #[test]
    fn test_empty_field() {
        assert_eq!(
            BitField::from_segments(&[]).unwrap_err(),
            SpecError::EmptyField
        );
    }

    #[test]
    fn test_overlapping_segments() {
        assert_eq!(
            BitField::new(&[3, 3], &[0, 2], &[4, 4]).unwrap_err(),
            SpecError::OverlappingSegments(3)
        );
    }

    #[test]
    fn test_field_too_wide() {
        let registers: Vec<u8> = (0..9).collect();
        assert_eq!(
            BitField::new(&registers, &[0; 9], &[8; 9]).unwrap_err(),
            SpecError::FieldTooWide(72)
        );
    }

    #[test]
    fn test_invalid_segment_is_reported() {
        assert_eq!(
            BitField::new(&[0, 16], &[0, 0], &[8, 8]).unwrap_err(),
            SpecError::InvalidRegister(16)
        );
    }

    #[test]
    fn test_claimed_bits() {
        let claimed = tot_vref().claimed_bits();
        assert_eq!(claimed[1], 0b1100_0000);
        assert_eq!(claimed[2], 0xFF);
        assert_eq!(claimed[0], 0);
    }
}
