//! Applies override layers, in order, to a [RegisterFile].

use log::{debug, info, trace, warn};

use crate::{
    bitfield::RegisterWrite,
    defaults::default_layer,
    errors::{CompileError, LayerRef},
    layer::Layer,
    pattern::PagePattern,
    register_file::RegisterFile,
    registry::PageRegistry,
};

/// What to do with a value wider than its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Fail with [CompileError::ValueOutOfRange].
    #[default]
    Reject,
    /// Keep the low bits and drop the rest, with a warning.
    Truncate,
}

/// Compiles layers of named settings into register values.
///
/// ```
/// use rocconf::{compiler::SettingsCompiler, layer::Layer, lut};
///
/// let registry = lut::hgcroc().unwrap();
/// let layers = vec![Layer::new().with_page("Global_Analog_0", [("ON_pa", 0)])];
/// let registers = SettingsCompiler::new(registry).compile(&layers).unwrap();
/// assert_eq!(registers.get(297, 0), Some(0x47));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SettingsCompiler<'r> {
    registry: &'r PageRegistry,
    prepend_defaults: bool,
    overflow: OverflowPolicy,
}

impl<'r> SettingsCompiler<'r> {
    /// Compiler over `registry` that writes defaults first and rejects oversized values.
    pub fn new(registry: &'r PageRegistry) -> Self {
        SettingsCompiler {
            registry,
            prepend_defaults: true,
            overflow: OverflowPolicy::default(),
        }
    }

    /// Whether the default layer is applied before the caller's layers.
    pub fn prepend_defaults(mut self, prepend_defaults: bool) -> Self {
        self.prepend_defaults = prepend_defaults;
        self
    }

    pub fn overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn registry(&self) -> &'r PageRegistry {
        self.registry
    }

    /// Applies the default layer (if enabled) then `layers` in order.
    ///
    /// Stops at the first invalid reference; no partially compiled file is returned.
    pub fn compile(&self, layers: &[Layer]) -> Result<RegisterFile, CompileError> {
        let mut registers = RegisterFile::new();

        if self.prepend_defaults {
            let defaults = default_layer(self.registry);
            self.apply_layer(&mut registers, &defaults, LayerRef::Defaults)?;
        }

        for (index, layer) in layers.iter().enumerate() {
            self.apply_layer(&mut registers, layer, LayerRef::Index(index))?;
        }

        Ok(registers)
    }

    /// Applies one layer to `registers`. Every pattern and parameter is resolved
    /// before anything is written, so on error `registers` is left untouched.
    pub fn apply_layer(
        &self,
        registers: &mut RegisterFile,
        layer: &Layer,
        at: LayerRef,
    ) -> Result<(), CompileError> {
        info!("compiling {at}");

        let writes = self.plan(layer, at)?;
        for (page, write) in &writes {
            registers.apply(*page, write);
        }

        Ok(())
    }

    fn plan(&self, layer: &Layer, at: LayerRef) -> Result<Vec<(u16, RegisterWrite)>, CompileError> {
        let mut writes = Vec::new();

        for entry in layer.iter() {
            debug!("compiling pages matching {}", entry.pattern);

            let pages = PagePattern::new(&entry.pattern)
                .and_then(|pattern| pattern.resolve(self.registry))
                .map_err(|error| CompileError::from_pattern(error, at, &entry.pattern))?;

            for page in pages {
                debug!("compiling page {}", page.name());

                for (name, value) in &entry.parameters {
                    let field = page.catalogue().field(name).ok_or_else(|| {
                        CompileError::UnknownParameter {
                            layer: at,
                            page: page.name().to_string(),
                            parameter: name.clone(),
                        }
                    })?;

                    if !field.fits(*value) {
                        match self.overflow {
                            OverflowPolicy::Reject => {
                                return Err(CompileError::ValueOutOfRange {
                                    layer: at,
                                    page: page.name().to_string(),
                                    parameter: name.clone(),
                                    value: *value,
                                    bits: field.total_bits(),
                                });
                            }
                            OverflowPolicy::Truncate => warn!(
                                "{at}: {name} on {} truncated to {} bits",
                                page.name(),
                                field.total_bits()
                            ),
                        }
                    }

                    trace!("{name} set to {value}");
                    writes.extend(field.encode(*value).map(|write| (page.id(), write)));
                }
            }
        }

        Ok(writes)
    }
}

#[cfg(test)]
mod tests {
    use crate::lut;

    use super::*;

    fn compiler() -> SettingsCompiler<'static> {
        SettingsCompiler::new(lut::hgcroc().unwrap())
    }

    #[test]
    fn test_defaults_only() {
        let registers = compiler().compile(&[]).unwrap();

        // ON_dac_trim, ON_input_dac, ON_conv, ON_pa = 1; Gain_conv = 0b0100
        assert_eq!(registers.get(297, 0), Some(0x4F));
        assert_eq!(registers.get(41, 0), Some(0x4F));
        // Tot_vref = 432: low two bits 0b00 at bits 6-7 of register 1, rest in register 2
        assert_eq!(registers.get(296, 2), Some(0b0110_1100));
        assert_eq!(registers.get(296, 1).map(|v| v >> 6), Some(0));
    }

    #[test]
    fn test_user_layer_overrides_one_bit() {
        let layers = vec![Layer::new().with_page("Global_Analog_0", [("ON_pa", 0)])];
        let registers = compiler().compile(&layers).unwrap();

        assert_eq!(registers.get(297, 0), Some(0x47));
        assert_eq!(registers.get(41, 0), Some(0x4F));
    }

    #[test]
    fn test_no_defaults() {
        let layers = vec![Layer::new().with_page("Global_Analog_0", [("ON_pa", 1)])];
        let registers = compiler()
            .prepend_defaults(false)
            .compile(&layers)
            .unwrap();

        assert_eq!(registers.iter().collect::<Vec<_>>(), vec![(297, 0, 0x08)]);
    }

    #[test]
    fn test_later_layer_wins() {
        let layers = vec![
            Layer::new().with_page(r"Channel_\d+", [("Inputdac", 10)]),
            Layer::new().with_page("Channel_42", [("Inputdac", 20)]),
        ];
        let registers = compiler()
            .prepend_defaults(false)
            .compile(&layers)
            .unwrap();

        let channel_41 = lut::hgcroc().unwrap().get("Channel_41").unwrap().id();
        let channel_42 = lut::hgcroc().unwrap().get("Channel_42").unwrap().id();
        assert_eq!(registers.get(channel_41, 0), Some(10));
        assert_eq!(registers.get(channel_42, 0), Some(20));
    }

    #[test]
    fn test_same_layer_applies_in_order() {
        let layers = vec![
            Layer::new()
                .with_page("Top", [("Phase", 3)])
                .with_page("Top", [("Phase", 5)]),
        ];
        let registers = compiler()
            .prepend_defaults(false)
            .compile(&layers)
            .unwrap();
        assert_eq!(registers.get(44, 2), Some(5));
    }

    #[test]
    fn test_multi_register_parameter() {
        let layers = vec![Layer::new().with_page("Reference_Voltage_1", [("Tot_vref", 433)])];
        let registers = compiler()
            .prepend_defaults(false)
            .compile(&layers)
            .unwrap();

        assert_eq!(registers.get(40, 1), Some(0b0100_0000));
        assert_eq!(registers.get(40, 2), Some(0b0110_1100));
    }

    #[test]
    fn test_unknown_page_pattern() {
        let layers = vec![
            Layer::new().with_page("Top", [("RunL", 1)]),
            Layer::new().with_page("Channel_*", [("Inputdac", 1)]),
        ];
        assert_eq!(
            compiler().compile(&layers).unwrap_err(),
            CompileError::UnknownPagePattern {
                layer: LayerRef::Index(1),
                pattern: "Channel_*".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_page_pattern() {
        let layers = vec![Layer::new().with_page("Channel_[", [("Inputdac", 1)])];
        assert!(matches!(
            compiler().compile(&layers).unwrap_err(),
            CompileError::InvalidPagePattern {
                layer: LayerRef::Index(0),
                ..
            }
        ));
    }

    #[test]
    fn test_unbalanced_page_pattern_does_not_escape_anchors() {
        let layers = vec![Layer::new().with_page("Top)|(Global_Analog_.", [("ON_pa", 0)])];
        assert!(matches!(
            compiler().compile(&layers).unwrap_err(),
            CompileError::InvalidPagePattern {
                layer: LayerRef::Index(0),
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_parameter() {
        let layers = vec![Layer::new().with_page("Global_Analog_1", [("Inputdac", 1)])];
        assert_eq!(
            compiler().compile(&layers).unwrap_err(),
            CompileError::UnknownParameter {
                layer: LayerRef::Index(0),
                page: "Global_Analog_1".to_string(),
                parameter: "Inputdac".to_string(),
            }
        );
    }

    #[test]
    fn test_value_out_of_range_rejected() {
        let layers = vec![Layer::new().with_page("Global_Analog_0", [("Gain_conv", 16)])];
        assert_eq!(
            compiler().compile(&layers).unwrap_err(),
            CompileError::ValueOutOfRange {
                layer: LayerRef::Index(0),
                page: "Global_Analog_0".to_string(),
                parameter: "Gain_conv".to_string(),
                value: 16,
                bits: 4,
            }
        );
    }

    #[test]
    fn test_value_out_of_range_truncated() {
        let layers = vec![Layer::new().with_page("Global_Analog_0", [("Gain_conv", 0b1_0010)])];
        let registers = compiler()
            .overflow(OverflowPolicy::Truncate)
            .compile(&layers)
            .unwrap();
        assert_eq!(registers.get(297, 0), Some(0x2F));
    }

    #[test]
    fn test_failed_layer_leaves_registers_untouched() {
        let compiler = compiler();
        let mut registers = compiler.compile(&[]).unwrap();
        let before = registers.clone();

        let layer = Layer::new().with_page(
            "Reference_Voltage_0",
            [("Tot_vref", 0), ("Not_a_parameter", 1)],
        );
        assert!(
            compiler
                .apply_layer(&mut registers, &layer, LayerRef::Index(0))
                .is_err()
        );
        assert_eq!(registers, before);
    }

    #[test]
    fn test_applying_layer_twice_is_idempotent() {
        let layer = Layer::new()
            .with_page(r"Channel_\d+", [("Inputdac", 17), ("Channel_off", 1)])
            .with_page("Master_TDC_.", [("CTDC_CALIB_FREQUENCY", 0xA5)]);

        let once = compiler().compile(&[layer.clone()]).unwrap();
        let twice = compiler().compile(&[layer.clone(), layer]).unwrap();
        assert_eq!(once, twice);
    }
}
