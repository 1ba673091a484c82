//! Page-name patterns: regular expressions matched against the whole page name.

use regex::Regex;

use crate::{
    errors::PatternError,
    registry::{Page, PageRegistry},
};

/// A compiled page-name pattern.
///
/// Matching is anchored at both ends, so `Channel_1` selects only `Channel_1`
/// and every channel page has to be written as `Channel_.*` (or `Channel_\d+`).
#[derive(Debug, Clone)]
pub struct PagePattern {
    source: String,
    regex: Regex,
}

impl PagePattern {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        // The bare pattern must parse on its own, or an unbalanced `)` could
        // close the anchoring group.
        Regex::new(pattern).map_err(|error| PatternError::Invalid(error.to_string()))?;
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|error| PatternError::Invalid(error.to_string()))?;

        Ok(PagePattern {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written by the user.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, page_name: &str) -> bool {
        self.regex.is_match(page_name)
    }

    /// Registered pages whose full name matches, in registry order.
    /// An empty selection is an error: it means a typo or a stale page name.
    pub fn resolve<'r>(&self, registry: &'r PageRegistry) -> Result<Vec<&'r Page>, PatternError> {
        let pages: Vec<&Page> = registry
            .pages()
            .filter(|page| self.is_match(page.name()))
            .collect();

        if pages.is_empty() {
            return Err(PatternError::NoMatch);
        }

        Ok(pages)
    }
}

impl PartialEq for PagePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for PagePattern {}
