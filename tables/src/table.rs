//! Random table model: entries keyed by roll ranges, resolved by drawing.
//!
//! DESIGN
//! ======
//! A draw rolls the table's formula once and resolves every entry whose
//! inclusive range contains the roll. Overlapping ranges are allowed and
//! yield several lines. `document` entries name another table; resolving
//! them draws on that table through the supplied [`TableMap`], bounded by
//! [`MAX_LINK_DEPTH`] so cyclic links fail instead of recursing forever.
//! Overlapping links fan out, so one top-level draw may also perform at
//! most [`MAX_LINKED_DRAWS`] draws in total.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dice::{DiceError, Formula};

/// Deepest chain of linked draws a single draw may follow.
pub const MAX_LINK_DEPTH: usize = 16;

/// Most draws, the top-level one included, a single draw may perform.
pub const MAX_LINKED_DRAWS: usize = 1024;

/// Tables by name, used to resolve `document` links.
pub type TableMap = BTreeMap<String, RandomTable>;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("min_roll {min} is greater than max_roll {max}")]
    InvalidRange { min: i64, max: i64 },
    #[error("table name must not be empty")]
    EmptyName,
    #[error("invalid formula: {0}")]
    Formula(#[from] DiceError),
    #[error("linked tables nested deeper than {limit} levels at `{table}`")]
    LinkDepthExceeded { table: String, limit: usize },
    #[error("draw needed more than {limit} linked draws at `{table}`")]
    DrawLimitExceeded { table: String, limit: usize },
}

// =============================================================================
// ENTRY
// =============================================================================

/// How an entry's target is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Target is literal text.
    #[default]
    Text,
    /// Target is the name of another table to draw on.
    Document,
}

impl EntryKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Document => "document",
        }
    }
}

/// One row of a table: an inclusive roll range mapped to a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub min_roll: i64,
    pub max_roll: i64,
    pub target: String,
}

impl Entry {
    /// # Errors
    ///
    /// Returns [`TableError::InvalidRange`] when `min_roll > max_roll`.
    pub fn new(kind: EntryKind, min_roll: i64, max_roll: i64, target: impl Into<String>) -> Result<Self, TableError> {
        if min_roll > max_roll {
            return Err(TableError::InvalidRange { min: min_roll, max: max_roll });
        }
        Ok(Self { kind, min_roll, max_roll, target: target.into() })
    }

    #[must_use]
    pub fn contains(&self, roll: i64) -> bool {
        self.min_roll <= roll && roll <= self.max_roll
    }

    /// `"3"` for a single value, `"2-5"` for a span.
    #[must_use]
    pub fn range_label(&self) -> String {
        range_label(self.min_roll, self.max_roll)
    }
}

/// Render an inclusive roll range the way tables display it.
#[must_use]
pub fn range_label(min_roll: i64, max_roll: i64) -> String {
    if min_roll == max_roll { min_roll.to_string() } else { format!("{min_roll}-{max_roll}") }
}

// =============================================================================
// TABLE
// =============================================================================

/// Outcome of one draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draw {
    pub result: String,
    pub roll: i64,
}

impl fmt::Display for Draw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.roll, self.result)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomTable {
    pub name: String,
    pub formula: Formula,
    pub entries: Vec<Entry>,
}

impl RandomTable {
    /// # Errors
    ///
    /// Returns [`TableError::EmptyName`] for a blank name.
    pub fn new(name: impl Into<String>, formula: Formula, entries: Vec<Entry>) -> Result<Self, TableError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TableError::EmptyName);
        }
        Ok(Self { name, formula, entries })
    }

    /// Entries whose range contains `roll`, in table order.
    pub fn entries_for(&self, roll: i64) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |e| e.contains(roll))
    }

    /// Smallest and largest roll covered by any entry.
    #[must_use]
    pub fn roll_bounds(&self) -> Option<(i64, i64)> {
        let min = self.entries.iter().map(|e| e.min_roll).min()?;
        let max = self.entries.iter().map(|e| e.max_roll).max()?;
        Some((min, max))
    }

    /// Roll the formula and resolve all matching entries.
    ///
    /// `linked` supplies the tables that `document` entries may name.
    ///
    /// # Errors
    ///
    /// Fails if the formula cannot be evaluated, links nest too deeply, or
    /// links fan out past [`MAX_LINKED_DRAWS`].
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R, linked: Option<&TableMap>) -> Result<Draw, TableError> {
        let mut draws = 0;
        self.draw_at_depth(rng, linked, 0, &mut draws)
    }

    /// [`Self::draw`] rendered as `"<roll> : <result>"`.
    ///
    /// # Errors
    ///
    /// See [`Self::draw`].
    pub fn formatted_draw<R: Rng + ?Sized>(&self, rng: &mut R, linked: Option<&TableMap>) -> Result<String, TableError> {
        Ok(self.draw(rng, linked)?.to_string())
    }

    fn draw_at_depth<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        linked: Option<&TableMap>,
        depth: usize,
        draws: &mut usize,
    ) -> Result<Draw, TableError> {
        if depth > MAX_LINK_DEPTH {
            return Err(TableError::LinkDepthExceeded { table: self.name.clone(), limit: MAX_LINK_DEPTH });
        }
        *draws += 1;
        if *draws > MAX_LINKED_DRAWS {
            return Err(TableError::DrawLimitExceeded { table: self.name.clone(), limit: MAX_LINKED_DRAWS });
        }

        let roll = self.formula.roll(rng)?.total;
        let mut lines = Vec::new();
        for entry in self.entries_for(roll) {
            lines.push(self.resolve(entry, rng, linked, depth, draws)?);
        }
        Ok(Draw { result: lines.join("\n"), roll })
    }

    fn resolve<R: Rng + ?Sized>(
        &self,
        entry: &Entry,
        rng: &mut R,
        linked: Option<&TableMap>,
        depth: usize,
        draws: &mut usize,
    ) -> Result<String, TableError> {
        match entry.kind {
            EntryKind::Text => Ok(entry.target.clone()),
            EntryKind::Document => match linked.and_then(|tables| tables.get(&entry.target)) {
                Some(table) => Ok(table.draw_at_depth(rng, linked, depth + 1, draws)?.result),
                None => {
                    warn!(table = %self.name, target = %entry.target, "cannot resolve linked table");
                    Ok(String::new())
                }
            },
        }
    }
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
