//! Page names, their numeric ids and the catalogue that governs each page.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{
    NUM_PAGES, catalogue::ParameterCatalogue, errors::SpecError, pattern::PagePattern,
};

/// A registered page.
#[derive(Debug, Clone)]
pub struct Page {
    name: String,
    id: u16,
    catalogue: Arc<ParameterCatalogue>,
}

impl Page {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn catalogue(&self) -> &ParameterCatalogue {
        &self.catalogue
    }
}

/// Pages of one kind sharing a catalogue, plus a pattern selecting exactly those pages.
///
/// The pattern is what the default layer uses to address the group.
#[derive(Debug, Clone)]
pub struct PageGroup {
    pub name: String,
    pub pattern: String,
    pub catalogue: Arc<ParameterCatalogue>,
    pub pages: Vec<(String, u16)>,
}

impl PageGroup {
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        catalogue: Arc<ParameterCatalogue>,
        pages: Vec<(String, u16)>,
    ) -> Self {
        PageGroup {
            name: name.into(),
            pattern: pattern.into(),
            catalogue,
            pages,
        }
    }
}

/// Every known page, in registration order.
#[derive(Debug, Clone)]
pub struct PageRegistry {
    groups: Vec<PageGroup>,
    pages: Vec<Page>,
    by_name: HashMap<String, usize>,
}

impl PageRegistry {
    /// Registers `groups` in order. Page names and ids must be unique, ids below
    /// [NUM_PAGES], and each group pattern must select its own pages and nothing else.
    pub fn new(groups: Vec<PageGroup>) -> Result<Self, SpecError> {
        let mut pages = Vec::new();
        let mut by_name = HashMap::new();
        let mut ids = HashSet::new();

        for group in &groups {
            for (name, id) in &group.pages {
                if *id >= NUM_PAGES {
                    return Err(SpecError::PageIdOutOfRange(*id));
                } else if !ids.insert(*id) {
                    return Err(SpecError::DuplicatePageId(*id));
                } else if by_name.insert(name.clone(), pages.len()).is_some() {
                    return Err(SpecError::DuplicatePage(name.clone()));
                }

                pages.push(Page {
                    name: name.clone(),
                    id: *id,
                    catalogue: Arc::clone(&group.catalogue),
                });
            }
        }

        let registry = PageRegistry {
            groups,
            pages,
            by_name,
        };
        registry.check_group_patterns()?;

        Ok(registry)
    }

    fn check_group_patterns(&self) -> Result<(), SpecError> {
        for group in &self.groups {
            let pattern =
                PagePattern::new(&group.pattern).map_err(|error| SpecError::InvalidGroupPattern {
                    pattern: group.pattern.clone(),
                    message: error.to_string(),
                })?;

            let own: HashSet<&str> = group.pages.iter().map(|(name, _)| name.as_str()).collect();
            for page in &self.pages {
                if pattern.is_match(page.name()) != own.contains(page.name()) {
                    return Err(SpecError::GroupPatternMismatch {
                        pattern: group.pattern.clone(),
                        page: page.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Page> {
        self.by_name.get(name).map(|&i| &self.pages[i])
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn groups(&self) -> &[PageGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
