//! Error types for catalogue construction, page pattern resolution and settings compilation.

use std::fmt;

/// Errors produced when building a [crate::bitfield::BitField], a
/// [crate::catalogue::ParameterCatalogue] or a [crate::registry::PageRegistry].
///
/// The built-in tables are checked once at startup, so any of these coming out
/// of [crate::lut::hgcroc] means the compiled-in register map is wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    /// Register index is outside 0..=15.
    #[error("register {0} is outside 0..=15")]
    InvalidRegister(u8),
    /// Starting bit is outside 0..=7.
    #[error("minimum bit {0} is outside 0..=7")]
    InvalidMinBit(u8),
    /// Segment width is outside 1..=8.
    #[error("bit width {0} is outside 1..=8")]
    InvalidWidth(u8),
    /// `min_bit + n_bits` runs past bit 7 of the register.
    #[error("{n_bits} bits starting at bit {min_bit} do not fit in one register")]
    SegmentOverrunsRegister { min_bit: u8, n_bits: u8 },
    /// The register, min-bit and width lists have different lengths.
    #[error(
        "segment lists have mismatched lengths ({registers} registers, {min_bits} min bits, {n_bits} widths)"
    )]
    MismatchedLengths {
        registers: usize,
        min_bits: usize,
        n_bits: usize,
    },
    /// Field has no segments.
    #[error("bit field has no segments")]
    EmptyField,
    /// Total width is above 64 bits.
    #[error("bit field is {0} bits wide, values are limited to 64")]
    FieldTooWide(u32),
    /// Two segments of the same field claim the same bit.
    #[error("segments overlap in register {0}")]
    OverlappingSegments(u8),
    /// Parameter name appears twice in a catalogue.
    #[error("parameter `{0}` is defined twice")]
    DuplicateParameter(String),
    /// Two parameters of one catalogue claim the same bit.
    #[error("parameters `{first}` and `{second}` share bits in register {register}")]
    SharedBits {
        first: String,
        second: String,
        register: u8,
    },
    /// Declared default does not fit in the parameter's width.
    #[error("default {default} of `{parameter}` does not fit in {bits} bits")]
    DefaultOutOfRange {
        parameter: String,
        default: u64,
        bits: u32,
    },
    /// A field definition failed; wraps the underlying reason with the parameter name.
    #[error("parameter `{parameter}`: {source}")]
    InvalidParameter {
        parameter: String,
        #[source]
        source: Box<SpecError>,
    },
    /// Page name registered twice.
    #[error("page `{0}` is registered twice")]
    DuplicatePage(String),
    /// Page id registered twice.
    #[error("page id {0} is registered twice")]
    DuplicatePageId(u16),
    /// Page id is not below [crate::NUM_PAGES].
    #[error("page id {0} is outside 0..300")]
    PageIdOutOfRange(u16),
    /// A group's page pattern does not compile.
    #[error("group pattern `{pattern}` is invalid: {message}")]
    InvalidGroupPattern { pattern: String, message: String },
    /// A group's page pattern misses one of its own pages or matches a page of another group.
    #[error("group pattern `{pattern}` does not select exactly its own pages (page `{page}`)")]
    GroupPatternMismatch { pattern: String, page: String },
}

/// Errors produced when resolving a page-name pattern against a registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// The pattern is not a valid regular expression.
    #[error("invalid page pattern: {0}")]
    Invalid(String),
    /// The pattern matched no registered page name.
    #[error("no page names match")]
    NoMatch,
}

/// Position of a layer in a compilation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRef {
    /// The synthetic layer built from catalogue defaults.
    Defaults,
    /// Index into the caller's layer list.
    Index(usize),
}

impl fmt::Display for LayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerRef::Defaults => f.write_str("default layer"),
            LayerRef::Index(index) => write!(f, "layer {index}"),
        }
    }
}

/// Errors produced by [crate::compiler::SettingsCompiler]. Any of them aborts the whole run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A page pattern matched no registered page.
    #[error("{layer}: no page names match `{pattern}`")]
    UnknownPagePattern { layer: LayerRef, pattern: String },
    /// A page pattern is not a valid regular expression.
    #[error("{layer}: `{pattern}` is not a valid page pattern: {message}")]
    InvalidPagePattern {
        layer: LayerRef,
        pattern: String,
        message: String,
    },
    /// The resolved page's catalogue has no such parameter.
    #[error("{layer}: page `{page}` has no parameter `{parameter}`")]
    UnknownParameter {
        layer: LayerRef,
        page: String,
        parameter: String,
    },
    /// The value is wider than the parameter's declared bits.
    #[error("{layer}: value {value} for `{parameter}` on page `{page}` does not fit in {bits} bits")]
    ValueOutOfRange {
        layer: LayerRef,
        page: String,
        parameter: String,
        value: u64,
        bits: u32,
    },
}

impl CompileError {
    /// Layer at which compilation stopped.
    pub fn layer(&self) -> LayerRef {
        match self {
            CompileError::UnknownPagePattern { layer, .. }
            | CompileError::InvalidPagePattern { layer, .. }
            | CompileError::UnknownParameter { layer, .. }
            | CompileError::ValueOutOfRange { layer, .. } => *layer,
        }
    }

    pub(crate) fn from_pattern(error: PatternError, layer: LayerRef, pattern: &str) -> Self {
        match error {
            PatternError::Invalid(message) => CompileError::InvalidPagePattern {
                layer,
                pattern: pattern.to_string(),
                message,
            },
            PatternError::NoMatch => CompileError::UnknownPagePattern {
                layer,
                pattern: pattern.to_string(),
            },
        }
    }
}
