//! Override layers: ordered page-pattern → parameter → value settings.

/// Parameter values for every page matching one pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSettings {
    /// Regular expression matched against whole page names.
    pub pattern: String,
    /// Parameter writes in the order they are applied.
    pub parameters: Vec<(String, u64)>,
}

impl PageSettings {
    pub fn new<K, I>(pattern: impl Into<String>, parameters: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, u64)>,
    {
        PageSettings {
            pattern: pattern.into(),
            parameters: parameters
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

/// One override step. Entries (and the parameters inside them) are applied in
/// insertion order; later layers win over earlier ones for every bit they touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    entries: Vec<PageSettings>,
}

impl Layer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the settings for `pattern` and returns the layer, for chaining.
    pub fn with_page<K, I>(mut self, pattern: impl Into<String>, parameters: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, u64)>,
    {
        self.push(PageSettings::new(pattern, parameters));
        self
    }

    pub fn push(&mut self, settings: PageSettings) -> &mut Self {
        self.entries.push(settings);
        self
    }

    pub fn entries(&self) -> &[PageSettings] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageSettings> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<PageSettings> for Layer {
    fn from_iter<T: IntoIterator<Item = PageSettings>>(iter: T) -> Self {
        Layer {
            entries: iter.into_iter().collect(),
        }
    }
}
