use std::collections::HashMap;

use crate::types::ImageReference;

/// Default entry for destinations without a curated image.
pub const DEFAULT_FALLBACK: &str = "/images/fallback/default.jpg";

const BUILTIN_FALLBACKS: [(&str, &str); 6] = [
    ("bali", "/images/fallback/bali.jpg"),
    ("dubai", "/images/fallback/dubai.jpg"),
    ("thailand", "/images/fallback/thailand.jpg"),
    ("singapore", "/images/fallback/singapore.jpg"),
    ("maldives", "/images/fallback/maldives.jpg"),
    ("vietnam", "/images/fallback/vietnam.jpg"),
];

/// Maps destination tags to bundled static image paths.
///
/// Lookups are case-insensitive and ignore surrounding whitespace. Unknown
/// tags resolve to the default entry, so a lookup never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTable {
    entries: HashMap<String, String>,
    default: String,
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FallbackTable {
    /// Empty table resolving every tag to `default`.
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            entries: HashMap::new(),
            default: default.into(),
        }
    }

    /// Curated paths for the destinations the site ships with.
    pub fn builtin() -> Self {
        BUILTIN_FALLBACKS
            .iter()
            .fold(Self::new(DEFAULT_FALLBACK), |table, (tag, path)| {
                table.with_entry(tag, *path)
            })
    }

    pub fn with_entry(mut self, tag: &str, path: impl Into<String>) -> Self {
        self.insert(tag, path);
        self
    }

    pub fn insert(&mut self, tag: &str, path: impl Into<String>) {
        self.entries.insert(normalize_tag(tag), path.into());
    }

    pub fn set_default(&mut self, path: impl Into<String>) {
        self.default = path.into();
    }

    pub fn default_path(&self) -> &str {
        &self.default
    }

    pub fn path_for(&self, tag: &str) -> &str {
        self.entries
            .get(&normalize_tag(tag))
            .map(String::as_str)
            .unwrap_or(&self.default)
    }

    pub fn resolve(&self, tag: &str) -> ImageReference {
        ImageReference::path(self.path_for(tag))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}
