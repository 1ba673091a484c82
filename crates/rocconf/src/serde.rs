//! Deserializable settings documents.
//!
//! A document is either a single layer object or a list of them:
//!
//! ```json
//! [
//!   { "Channel_.*": { "Inputdac": 31 } },
//!   { "Channel_42": { "Inputdac": 12 } }
//! ]
//! ```
//!
//! Keys keep their document order, since later entries of a layer overwrite
//! earlier ones for any bit they share.

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, SeqAccess, Visitor, value::MapAccessDeserializer},
    ser::SerializeMap,
};

use crate::layer::{Layer, PageSettings};

/// Parameter name → value, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParametersDef(pub Vec<(String, u64)>);

/// One layer object: page pattern → [ParametersDef], in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerDef(pub Vec<(String, ParametersDef)>);

/// Top-level document shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsDef {
    /// A list of layers, applied in order.
    Layers(Vec<LayerDef>),
    /// A single layer.
    Layer(LayerDef),
}

impl SettingsDef {
    pub fn into_layers(self) -> Vec<Layer> {
        match self {
            SettingsDef::Layers(layers) => layers.into_iter().map(Into::into).collect(),
            SettingsDef::Layer(layer) => vec![layer.into()],
        }
    }
}

impl From<LayerDef> for Layer {
    fn from(value: LayerDef) -> Self {
        value
            .0
            .into_iter()
            .map(|(pattern, parameters)| PageSettings {
                pattern,
                parameters: parameters.0,
            })
            .collect()
    }
}

impl From<&Layer> for LayerDef {
    fn from(value: &Layer) -> Self {
        LayerDef(
            value
                .iter()
                .map(|entry| {
                    (
                        entry.pattern.clone(),
                        ParametersDef(entry.parameters.clone()),
                    )
                })
                .collect(),
        )
    }
}

struct OrderedMapVisitor<V> {
    expecting: &'static str,
    marker: std::marker::PhantomData<V>,
}

impl<V> OrderedMapVisitor<V> {
    fn new(expecting: &'static str) -> Self {
        OrderedMapVisitor {
            expecting,
            marker: std::marker::PhantomData,
        }
    }
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = Vec<(String, V)>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(self.expecting)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<String, V>()? {
            entries.push(entry);
        }

        Ok(entries)
    }
}

impl<'de> Deserialize<'de> for ParametersDef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_map(OrderedMapVisitor::new(
                "a map from parameter name to non-negative integer",
            ))
            .map(ParametersDef)
    }
}

impl<'de> Deserialize<'de> for LayerDef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_map(OrderedMapVisitor::new(
                "a map from page pattern to parameter settings",
            ))
            .map(LayerDef)
    }
}

struct SettingsVisitor;

impl<'de> Visitor<'de> for SettingsVisitor {
    type Value = SettingsDef;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a settings layer or a list of settings layers")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut layers = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(layer) = seq.next_element::<LayerDef>()? {
            layers.push(layer);
        }

        Ok(SettingsDef::Layers(layers))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        LayerDef::deserialize(MapAccessDeserializer::new(map)).map(SettingsDef::Layer)
    }
}

impl<'de> Deserialize<'de> for SettingsDef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SettingsVisitor)
    }
}

fn serialize_entries<S: Serializer, V: Serialize>(
    serializer: S,
    entries: &[(String, V)],
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }

    map.end()
}

impl Serialize for ParametersDef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_entries(serializer, &self.0)
    }
}

impl Serialize for LayerDef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_entries(serializer, &self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_layer_document() {
        let def: SettingsDef =
            serde_json::from_str(r#"{ "Global_Analog_0": { "ON_pa": 0, "Gain_conv": 3 } }"#)
                .unwrap();
        let layers = def.into_layers();

        assert_eq!(
            layers,
            vec![Layer::new().with_page("Global_Analog_0", [("ON_pa", 0), ("Gain_conv", 3)])]
        );
    }

    #[test]
    fn test_layer_list_document() {
        let def: SettingsDef = serde_json::from_str(
            r#"[
                { "Channel_.*": { "Inputdac": 31 } },
                { "Channel_42": { "Inputdac": 12 } }
            ]"#,
        )
        .unwrap();

        assert_eq!(
            def.into_layers(),
            vec![
                Layer::new().with_page("Channel_.*", [("Inputdac", 31)]),
                Layer::new().with_page("Channel_42", [("Inputdac", 12)]),
            ]
        );
    }

    #[test]
    fn test_document_order_is_kept() {
        let def: LayerDef = serde_json::from_str(
            r#"{ "Top": { "RunR": 1, "RunL": 1 }, "Master_TDC_.": { "START_COUNTER": 0 }, "CM_.": {} }"#,
        )
        .unwrap();

        let patterns: Vec<&str> = def.0.iter().map(|(pattern, _)| pattern.as_str()).collect();
        assert_eq!(patterns, vec!["Top", "Master_TDC_.", "CM_."]);
        assert_eq!(
            def.0[0].1,
            ParametersDef(vec![("RunR".to_string(), 1), ("RunL".to_string(), 1)])
        );
    }

    #[test]
    fn test_negative_value_is_rejected() {
        assert!(serde_json::from_str::<SettingsDef>(r#"{ "Top": { "RunL": -1 } }"#).is_err());
    }

    #[test]
    fn test_type_error_points_at_value() {
        let document = "[\n  { \"Top\": { \"RunL\": \"1\" } }\n]";
        let error = serde_json::from_str::<SettingsDef>(document)
            .unwrap_err()
            .to_string();
        assert!(error.contains("invalid type: string \"1\""), "{error}");
        assert!(error.contains("line 2"), "{error}");
    }

    #[test]
    fn test_scalar_document_is_rejected() {
        let error = serde_json::from_str::<SettingsDef>("3").unwrap_err().to_string();
        assert!(error.contains("a settings layer or a list of settings layers"), "{error}");
    }

    #[test]
    fn test_serialize_round_trips_order() {
        let layer = Layer::new()
            .with_page("Top", [("RunR", 1), ("RunL", 0)])
            .with_page("CALIB_0", [("Dacb", 7)]);

        let json = serde_json::to_string(&LayerDef::from(&layer)).unwrap();
        assert_eq!(json, r#"{"Top":{"RunR":1,"RunL":0},"CALIB_0":{"Dacb":7}}"#);

        let back: LayerDef = serde_json::from_str(&json).unwrap();
        assert_eq!(Layer::from(back), layer);
    }
}
