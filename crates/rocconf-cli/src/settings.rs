//! Loading settings documents from disk.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::info;
use rocconf::{layer::Layer, serde::SettingsDef};

/// Parses one JSON document: a single layer object or a list of them.
pub fn parse(text: &str) -> serde_json::Result<Vec<Layer>> {
    serde_json::from_str::<SettingsDef>(text).map(SettingsDef::into_layers)
}

pub fn load(path: &Path) -> Result<Vec<Layer>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    parse(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Loads every file in order and concatenates their layers.
pub fn load_all(paths: &[PathBuf]) -> Result<Vec<Layer>> {
    let mut layers = Vec::new();

    for path in paths {
        let loaded = load(path)?;
        info!("loaded {} layer(s) from {}", loaded.len(), path.display());
        layers.extend(loaded);
    }

    Ok(layers)
}

/// Output path used when none is given: the first settings file with a `.csv` extension.
pub fn default_output(first: &Path) -> PathBuf {
    first.with_extension("csv")
}
