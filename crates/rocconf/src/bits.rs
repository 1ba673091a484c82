//! Low-level mask helpers for 8-bit registers.
//!
//! Bits are addressed LSB-first within a register: bit 0 is the low bit.

/// Mask covering the low `n_bits` of a byte. `n_bits` must be in 1..=8.
pub fn field_mask(n_bits: u8) -> u8 {
    ((1u16 << n_bits) - 1) as u8
}

/// Mask with the `n_bits` starting at `min_bit` cleared and every other bit set.
///
/// Bits shifted past bit 7 are dropped, so callers must check
/// `min_bit + n_bits <= 8` first.
pub fn clear_mask(min_bit: u8, n_bits: u8) -> u8 {
    (((field_mask(n_bits) as u16) << min_bit) ^ 0xFF) as u8
}

/// Replaces the field at `min_bit`/`n_bits` of `register` with the low bits of `value`.
pub fn insert_bits(register: u8, min_bit: u8, n_bits: u8, value: u8) -> u8 {
    (register & clear_mask(min_bit, n_bits)) | ((value & field_mask(n_bits)) << min_bit)
}

/// Reads the field at `min_bit`/`n_bits` of `register`.
pub fn extract_bits(register: u8, min_bit: u8, n_bits: u8) -> u8 {
    (register >> min_bit) & field_mask(n_bits)
}

/// Mask covering the low `total_bits` of a `u64`. `total_bits` must be in 1..=64.
pub fn value_mask(total_bits: u32) -> u64 {
    u64::MAX >> (64 - total_bits)
}

/// True if `value` has no bit set at or above `total_bits`.
pub fn fits(value: u64, total_bits: u32) -> bool {
    value & !value_mask(total_bits) == 0
}
