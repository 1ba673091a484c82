//! The layer written before any user layer: every parameter at its documented default.

use crate::{
    layer::{Layer, PageSettings},
    registry::PageRegistry,
};

/// One entry per page group, addressed by the group's pattern, setting every
/// catalogue parameter to its default in catalogue order.
pub fn default_layer(registry: &PageRegistry) -> Layer {
    registry
        .groups()
        .iter()
        .filter(|group| !group.pages.is_empty())
        .map(|group| PageSettings::new(group.pattern.clone(), group.catalogue.defaults()))
        .collect()
}
