//! Operating-constraint models.
//!
//! A [`ConstraintSet`] is one sampled artifact after parsing; an
//! [`AggregatedConstraintSet`] is the consensus over all samples.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Column width for variable names in the aggregated artifact.
pub const NAME_WIDTH: usize = 25;

/// Normalize a variable name: trimmed, lower-cased, spaces replaced by underscores.
pub fn normalize_variable_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Round to one decimal place, ties to even.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Inclusive numeric range for one variable, with its display unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintRange {
    pub low: f64,
    pub high: f64,
    pub unit: String,
}

/// One sample's parsed constraints, in artifact line order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConstraintSet {
    entries: Vec<(String, ConstraintRange)>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a range under its normalized name.
    ///
    /// A repeated name replaces the earlier range in place. Ranges with
    /// `low > high` are rejected and `false` is returned.
    pub fn insert(&mut self, name: &str, range: ConstraintRange) -> bool {
        if range.low > range.high {
            return false;
        }
        let key = normalize_variable_name(name);
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = range;
        } else {
            self.entries.push((key, range));
        }
        true
    }

    pub fn get(&self, name: &str) -> Option<&ConstraintRange> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, range)| range)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConstraintRange)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Consensus constraints: variable name to `[avg_low, avg_high]`.
///
/// Bounds are already rounded to one decimal; `Display` renders the
/// aggregated artifact text with two decimals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedConstraintSet {
    entries: Vec<(String, [f64; 2])>,
}

impl AggregatedConstraintSet {
    pub(crate) fn from_entries(entries: Vec<(String, [f64; 2])>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<[f64; 2]> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, bounds)| *bounds)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, [f64; 2])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Artifact text: one padded line per variable, trailing newline.
    pub fn to_artifact_text(&self) -> String {
        let mut text = self.to_string();
        text.push('\n');
        text
    }
}

impl fmt::Display for AggregatedConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, [low, high])) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{name:<NAME_WIDTH$}: [{low:.2}, {high:.2}]")?;
        }
        Ok(())
    }
}

impl Serialize for AggregatedConstraintSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, bounds) in &self.entries {
            map.serialize_entry(name, bounds)?;
        }
        map.end()
    }
}
