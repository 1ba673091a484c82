//! Named parameter tables, one per kind of page.

use std::collections::HashMap;

use crate::{NUM_REGISTERS, bitfield::BitField, errors::SpecError, segment::Segment};

/// One documented parameter: its layout and the value the chip documentation recommends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub field: BitField,
    pub default: u64,
}

impl Parameter {
    pub fn new(name: impl Into<String>, field: BitField, default: u64) -> Self {
        Parameter {
            name: name.into(),
            field,
            default,
        }
    }
}

/// Parameter table shared by every page of one kind (e.g. all channel pages).
///
/// Parameters keep their definition order, which is also the order the default
/// layer writes them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterCatalogue {
    name: String,
    parameters: Vec<Parameter>,
    index: HashMap<String, usize>,
}

impl ParameterCatalogue {
    /// Builds a catalogue. Fails on duplicate names, parameters sharing bits, or
    /// defaults wider than their field.
    pub fn new(name: impl Into<String>, parameters: Vec<Parameter>) -> Result<Self, SpecError> {
        let mut index = HashMap::with_capacity(parameters.len());
        let mut owners: [[Option<usize>; 8]; NUM_REGISTERS] = [[None; 8]; NUM_REGISTERS];

        for (i, parameter) in parameters.iter().enumerate() {
            if index.insert(parameter.name.clone(), i).is_some() {
                return Err(SpecError::DuplicateParameter(parameter.name.clone()));
            }

            if !parameter.field.fits(parameter.default) {
                return Err(SpecError::DefaultOutOfRange {
                    parameter: parameter.name.clone(),
                    default: parameter.default,
                    bits: parameter.field.total_bits(),
                });
            }

            for segment in parameter.field.segments() {
                let register = segment.register as usize;
                for bit in segment.min_bit..segment.min_bit + segment.n_bits {
                    let owner = &mut owners[register][bit as usize];
                    if let Some(first) = *owner {
                        return Err(SpecError::SharedBits {
                            first: parameters[first].name.clone(),
                            second: parameter.name.clone(),
                            register: segment.register,
                        });
                    }
                    *owner = Some(i);
                }
            }
        }

        Ok(ParameterCatalogue {
            name: name.into(),
            parameters,
            index,
        })
    }

    /// Builds a catalogue from `(name, segments, default)` rows, segments given as
    /// `(register, min_bit, n_bits)` LSB chunk first.
    pub fn from_table(
        name: impl Into<String>,
        table: &[(&str, &[(u8, u8, u8)], u64)],
    ) -> Result<Self, SpecError> {
        let mut parameters = Vec::with_capacity(table.len());

        for &(parameter, segments, default) in table {
            let segments: Vec<Segment> = segments.iter().copied().map(Into::into).collect();
            let field = BitField::from_segments(&segments).map_err(|source| {
                SpecError::InvalidParameter {
                    parameter: parameter.to_string(),
                    source: Box::new(source),
                }
            })?;

            parameters.push(Parameter::new(parameter, field, default));
        }

        Self::new(name, parameters)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.index.get(name).map(|&i| &self.parameters[i])
    }

    pub fn field(&self, name: &str) -> Option<&BitField> {
        self.get(name).map(|parameter| &parameter.field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    /// `(name, default)` pairs in definition order.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, u64)> {
        self.parameters
            .iter()
            .map(|parameter| (parameter.name.as_str(), parameter.default))
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}
