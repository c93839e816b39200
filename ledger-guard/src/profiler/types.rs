//! Profile types produced by the [`ColumnProfiler`](super::ColumnProfiler).
//!
//! A profile holds counts, percentages, numeric extrema and derived date
//! bounds. It never holds a cell value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::patterns::ValuePattern;

/// Broad value category a column is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueCategory {
    /// Arrow numeric types, or strings whose every value parses as a number
    Numeric,
    /// Strings, booleans and temporal values in their string form
    Text,
    /// Null-typed, binary or nested columns, and non-numeric columns without values
    Other,
}

/// Statistics over the non-null values of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub negative_count: u64,
}

/// How many values of a text column match one [`ValuePattern`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub match_count: u64,
    /// Share of all rows, nulls included, rounded to 2 decimals
    pub match_percentage: f64,
}

/// Pattern rates and derived date bounds of a text column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextStatistics {
    pub patterns: BTreeMap<ValuePattern, PatternMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
}

/// Privacy-preserving summary of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub value_category: ValueCategory,
    pub null_count: u64,
    pub null_percentage: f64,
    pub unique_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextStatistics>,
}

impl ColumnProfile {
    /// Creates a profile carrying only null and distinct counts.
    pub fn new(
        name: impl Into<String>,
        value_category: ValueCategory,
        null_count: u64,
        null_percentage: f64,
        unique_count: u64,
    ) -> Self {
        Self {
            name: name.into(),
            value_category,
            null_count,
            null_percentage,
            unique_count,
            numeric: None,
            text: None,
        }
    }

    pub fn with_numeric(mut self, stats: NumericStatistics) -> Self {
        self.numeric = Some(stats);
        self
    }

    pub fn with_text(mut self, stats: TextStatistics) -> Self {
        self.text = Some(stats);
        self
    }

    /// Minimum of a numeric column, when one was computed.
    pub fn min(&self) -> Option<f64> {
        self.numeric.as_ref().map(|stats| stats.min)
    }

    /// Match percentage for `pattern`, when the column carries pattern rates.
    pub fn pattern_percentage(&self, pattern: ValuePattern) -> Option<f64> {
        self.text
            .as_ref()
            .and_then(|stats| stats.patterns.get(&pattern))
            .map(|matched| matched.match_percentage)
    }

    /// Latest derived date, in ISO 8601 form.
    pub fn max_date(&self) -> Option<&str> {
        self.text.as_ref().and_then(|stats| stats.max_date.as_deref())
    }

    pub fn is_numeric(&self) -> bool {
        self.value_category == ValueCategory::Numeric
    }
}

/// Profile of a whole dataset: row count and one [`ColumnProfile`] per column
/// in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub total_rows: u64,
    pub total_columns: usize,
    #[serde(with = "ordered_columns")]
    columns: Vec<ColumnProfile>,
}

impl DatasetProfile {
    /// Builds a profile, keeping the first occurrence of a repeated column name.
    pub fn new(total_rows: u64, columns: Vec<ColumnProfile>) -> Self {
        let mut unique: Vec<ColumnProfile> = Vec::with_capacity(columns.len());
        for column in columns {
            if !unique.iter().any(|existing| existing.name == column.name) {
                unique.push(column);
            }
        }

        Self {
            total_rows,
            total_columns: unique.len(),
            columns: unique,
        }
    }

    /// Profile of a dataset with no rows and no columns.
    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    /// Column profiles in source order.
    pub fn columns(&self) -> &[ColumnProfile] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }
}

/// Serializes the column list as a JSON object keyed by column name, keeping
/// source order.
mod ordered_columns {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use super::ColumnProfile;

    pub fn serialize<S>(columns: &[ColumnProfile], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for column in columns {
            map.serialize_entry(&column.name, column)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<ColumnProfile>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ColumnsVisitor;

        impl<'de> Visitor<'de> for ColumnsVisitor {
            type Value = Vec<ColumnProfile>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column name to column profile")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut columns = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, mut column)) =
                    access.next_entry::<String, ColumnProfile>()?
                {
                    column.name = name;
                    columns.push(column);
                }
                Ok(columns)
            }
        }

        deserializer.deserialize_map(ColumnsVisitor)
    }
}
