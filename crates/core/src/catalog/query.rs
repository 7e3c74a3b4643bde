//! Search conditions and their translation into a parameterized `WHERE` clause.

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use super::types::DifficultyTier;

const COL_TITLE: &str = "track_title";
const COL_ARTIST: &str = "track_artist";
const COL_CHARTER: &str = "charter";
const COL_CLIP_DURATION: &str = "clip_duration";

/// Filter criteria for a chart search.
///
/// Positive text lists OR across their values; exclude lists AND across
/// theirs. Every populated group is ANDed with the others, and an empty
/// condition matches every chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCondition {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artist: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charter: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_diff_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_diff_level: Option<u32>,
    /// Inclusive lower bound on the clip length, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_duration: Option<u32>,
    /// Inclusive upper bound on the clip length, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_artist: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_charter: Vec<String>,
}

impl SearchCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.title = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_artist<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artist = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_charter<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.charter = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_min_diff_level(mut self, level: u32) -> Self {
        self.min_diff_level = Some(level);
        self
    }

    pub fn with_max_diff_level(mut self, level: u32) -> Self {
        self.max_diff_level = Some(level);
        self
    }

    pub fn with_min_duration(mut self, seconds: u32) -> Self {
        self.min_duration = Some(seconds);
        self
    }

    pub fn with_max_duration(mut self, seconds: u32) -> Self {
        self.max_duration = Some(seconds);
        self
    }

    pub fn with_exclude_artist<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_artist = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exclude_charter<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_charter = values.into_iter().map(Into::into).collect();
        self
    }

    /// Builds the predicate for this condition.
    pub fn to_where_clause(&self) -> WhereClause {
        let mut clause = WhereClause::default();

        clause.push_contains_any(COL_TITLE, &self.title);
        clause.push_contains_any(COL_ARTIST, &self.artist);
        clause.push_contains_any(COL_CHARTER, &self.charter);

        if let Some(level) = self.min_diff_level {
            clause.push_any_tier(">=", level);
        }
        if let Some(level) = self.max_diff_level {
            clause.push_any_tier("<=", level);
        }

        if let Some(seconds) = self.min_duration {
            clause.push_comparison(COL_CLIP_DURATION, ">=", seconds);
        }
        if let Some(seconds) = self.max_duration {
            clause.push_comparison(COL_CLIP_DURATION, "<=", seconds);
        }

        clause.push_contains_none(COL_ARTIST, &self.exclude_artist);
        clause.push_contains_none(COL_CHARTER, &self.exclude_charter);

        clause
    }
}

/// A `WHERE` predicate with its positional parameters.
///
/// `sql` never contains user values; they are carried in `params` and bound
/// by the statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    groups: Vec<String>,
    params: Vec<Value>,
}

impl WhereClause {
    /// True when the clause imposes no constraint.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The predicate body, without the `WHERE` keyword. Empty when unconstrained.
    pub fn sql(&self) -> String {
        self.groups.join(" AND ")
    }

    /// `WHERE …` with a leading space, or an empty string.
    pub fn to_sql_suffix(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.sql())
        }
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    fn push_contains_any(&mut self, column: &str, values: &[String]) {
        // A blank first entry means the field was left empty.
        let populated = values.first().is_some_and(|v| !v.trim().is_empty());
        if !populated {
            return;
        }

        let parts: Vec<String> = values
            .iter()
            .filter(|v| !v.trim().is_empty())
            .map(|value| {
                self.params.push(Value::Text(like_pattern(value)));
                format!("{column} LIKE ? ESCAPE '\\'")
            })
            .collect();
        self.groups.push(format!("({})", parts.join(" OR ")));
    }

    fn push_contains_none(&mut self, column: &str, values: &[String]) {
        let parts: Vec<String> = values
            .iter()
            .filter(|v| !v.trim().is_empty())
            .map(|value| {
                self.params.push(Value::Text(like_pattern(value)));
                format!("{column} NOT LIKE ? ESCAPE '\\'")
            })
            .collect();
        if parts.is_empty() {
            return;
        }
        self.groups.push(format!("({})", parts.join(" AND ")));
    }

    fn push_any_tier(&mut self, op: &str, level: u32) {
        let parts: Vec<String> = DifficultyTier::ALL
            .iter()
            .map(|tier| {
                self.params.push(Value::Integer(i64::from(level)));
                format!("{} {op} ?", tier.column())
            })
            .collect();
        self.groups.push(format!("({})", parts.join(" OR ")));
    }

    fn push_comparison(&mut self, column: &str, op: &str, bound: u32) {
        self.params.push(Value::Integer(i64::from(bound)));
        self.groups.push(format!("{column} {op} ?"));
    }
}

/// `%value%` with LIKE wildcards in `value` escaped, so it matches literally.
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
