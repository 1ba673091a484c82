//! # rocconf
//!
//! Compiles named HGCROC configuration parameters into the byte written to every
//! (page, register) pair of the chip.
//!
//! Each documented parameter occupies one or more bit ranges of the 16 one-byte
//! registers of a page. Settings are given as ordered layers mapping page-name
//! patterns (regular expressions over the full page name) to parameter values.
//! The documented defaults are applied first, then each layer in order, so later
//! layers override earlier ones for exactly the bits they touch.
//!
//! ## Example
//!
//! ```
//! use rocconf::{compiler::SettingsCompiler, layer::Layer, lut, render::ValueFormat};
//!
//! let registry = lut::hgcroc().unwrap();
//! let layers = vec![
//!     Layer::new().with_page("Reference_Voltage_.", [("Tot_vref", 400)]),
//!     Layer::new().with_page("Reference_Voltage_1", [("Tot_vref", 432)]),
//! ];
//! let registers = SettingsCompiler::new(registry)
//!     .prepend_defaults(false)
//!     .compile(&layers)
//!     .unwrap();
//!
//! assert_eq!(
//!     registers.render(ValueFormat::Hex).to_string(),
//!     "40,1,0x00\n40,2,0x6c\n296,1,0x00\n296,2,0x64\n"
//! );
//! ```

pub mod bitfield;
pub mod bits;
pub mod catalogue;
pub mod compiler;
pub mod defaults;
pub mod errors;
pub mod layer;
pub mod lut;
pub mod pattern;
pub mod register_file;
pub mod registry;
pub mod render;
pub mod segment;
#[cfg(feature = "serde")]
pub mod serde;

/// Addressable pages on the chip (ids 0..300).
pub const NUM_PAGES: u16 = 300;

/// One-byte registers per page.
pub const NUM_REGISTERS: usize = 16;
