//! The fixed set of value formats measured on text columns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value format whose full-value match rate is recorded for every text
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuePattern {
    Email,
    Phone,
    IsoDate,
    CurrencyCode,
    CountryCode,
}

impl ValuePattern {
    /// All patterns, in the order they are reported.
    pub const ALL: [ValuePattern; 5] = [
        ValuePattern::Email,
        ValuePattern::Phone,
        ValuePattern::IsoDate,
        ValuePattern::CurrencyCode,
        ValuePattern::CountryCode,
    ];

    /// Stable snake_case name, also used as the SQL column alias.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValuePattern::Email => "email",
            ValuePattern::Phone => "phone",
            ValuePattern::IsoDate => "iso_date",
            ValuePattern::CurrencyCode => "currency_code",
            ValuePattern::CountryCode => "country_code",
        }
    }

    /// Anchored regular expression a whole value must match.
    pub fn regex(&self) -> &'static str {
        match self {
            ValuePattern::Email => r"^[^@]+@[^@]+\.[^@]+$",
            ValuePattern::Phone => r"^\+?1?\d{9,15}$",
            ValuePattern::IsoDate => r"^\d{4}-\d{2}-\d{2}$",
            ValuePattern::CurrencyCode => r"^[A-Z]{3}$",
            ValuePattern::CountryCode => r"^[A-Z]{2,3}$",
        }
    }
}

impl fmt::Display for ValuePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
