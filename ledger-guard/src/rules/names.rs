//! Column-name vocabularies the rules match against.

use once_cell::sync::OnceCell;
use regex::{Regex, RegexBuilder};

use crate::profiler::{ColumnProfile, DatasetProfile};

/// A case-insensitive, unanchored column-name pattern.
///
/// Patterns are compile-time constants; the regex is built on first use.
pub struct NamePattern {
    pattern: &'static str,
    regex: OnceCell<Regex>,
}

impl NamePattern {
    pub const fn new(pattern: &'static str) -> Self {
        Self {
            pattern,
            regex: OnceCell::new(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.pattern
    }

    #[allow(clippy::expect_used)]
    fn regex(&self) -> &Regex {
        self.regex.get_or_init(|| {
            RegexBuilder::new(self.pattern)
                .case_insensitive(true)
                .build()
                .expect("Hard-coded name pattern should compile")
        })
    }

    /// True when the pattern occurs anywhere in `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.regex().is_match(name)
    }

    /// Columns whose name matches, in source order.
    pub fn columns<'a>(
        &'a self,
        profile: &'a DatasetProfile,
    ) -> impl Iterator<Item = &'a ColumnProfile> + 'a {
        profile
            .columns()
            .iter()
            .filter(move |column| self.matches(&column.name))
    }

    /// True when at least one column matches.
    pub fn any(&self, profile: &DatasetProfile) -> bool {
        self.columns(profile).next().is_some()
    }
}

impl std::fmt::Debug for NamePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NamePattern").field(&self.pattern).finish()
    }
}
