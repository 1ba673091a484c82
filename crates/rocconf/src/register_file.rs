//! Accumulator for compiled register values.

use std::collections::BTreeMap;

use crate::{NUM_REGISTERS, bitfield::BitField, bitfield::RegisterWrite};

/// Registers of one page. `None` means no layer has written the register.
pub type PageRegisters = [Option<u8>; NUM_REGISTERS];

/// Register values of every page touched during compilation, keyed by page id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterFile {
    pages: BTreeMap<u16, PageRegisters>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the page's registers, creating them (all unset) on first use.
    pub fn ensure_page(&mut self, page: u16) -> &mut PageRegisters {
        self.pages.entry(page).or_insert([None; NUM_REGISTERS])
    }

    /// Clears `clear_mask`'s zero bits of the register (or starts it at 0) and inserts `bits`.
    pub fn write(&mut self, page: u16, register: u8, clear_mask: u8, bits: u8) {
        self.apply(
            page,
            &RegisterWrite {
                register,
                clear_mask,
                bits,
            },
        );
    }

    pub fn apply(&mut self, page: u16, write: &RegisterWrite) {
        let registers = self.ensure_page(page);
        write.apply(&mut registers[write.register as usize]);
    }

    pub fn page(&self, page: u16) -> Option<&PageRegisters> {
        self.pages.get(&page)
    }

    pub fn get(&self, page: u16, register: u8) -> Option<u8> {
        self.pages
            .get(&page)
            .and_then(|registers| registers.get(register as usize).copied().flatten())
    }

    /// Decodes `field` from the page, if every register it uses has been written.
    pub fn read(&self, page: u16, field: &BitField) -> Option<u64> {
        self.pages.get(&page).and_then(|registers| field.decode(registers))
    }

    /// Ids of touched pages in ascending order.
    pub fn pages(&self) -> impl Iterator<Item = u16> + '_ {
        self.pages.keys().copied()
    }

    /// `(page, register, value)` for every written register, by page id then register index.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u8, u8)> + '_ {
        self.pages.iter().flat_map(|(&page, registers)| {
            registers
                .iter()
                .enumerate()
                .filter_map(move |(register, value)| value.map(|v| (page, register as u8, v)))
        })
    }

    /// Number of written registers.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// No register written, even if some pages exist.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}
