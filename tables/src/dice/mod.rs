//! Dice formula parser and roller.
//!
//! DESIGN
//! ======
//! Formulas are tokenized and parsed once into an [`ast::Expr`]; rolling
//! walks the tree with a caller-supplied random source so tests can use a
//! seeded generator. Dice bind tighter than `*` and `/`, which bind tighter
//! than `+` and `-`. All arithmetic is integer and overflow-checked.

pub mod ast;
pub mod eval;
pub mod parse;

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use parse::parse;

/// Largest number of dice a single `NdS` group may roll.
pub const MAX_DICE_PER_GROUP: i64 = 10_000;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    #[error("unexpected token `{token}` at position {position}")]
    UnexpectedToken { token: String, position: usize },
    #[error("expected dice at position {position}, found `{token}`")]
    ExpectedDice { token: String, position: usize },
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    #[error("number too large: {0}")]
    NumberTooLarge(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("too many dice: {count} (limit {limit})")]
    TooManyDice { count: i64, limit: i64 },
}

/// One `NdS` group as rolled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiceRoll {
    pub count: i64,
    pub sides: i64,
    /// Individual die faces, before modifiers.
    pub faces: Vec<i64>,
}

impl DiceRoll {
    /// `NdS` label for this group.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}d{}", self.count, self.sides)
    }
}

/// Result of rolling a formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roll {
    pub total: i64,
    pub rolls: Vec<DiceRoll>,
}

// =============================================================================
// FORMULA
// =============================================================================

/// A validated dice formula that keeps its source text.
///
/// Serializes as the source string so table files round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    source: String,
    expr: ast::Expr,
}

impl Formula {
    /// Parse and validate a formula.
    ///
    /// # Errors
    ///
    /// Returns a [`DiceError`] if the text is not a valid formula.
    pub fn parse(source: &str) -> Result<Self, DiceError> {
        let expr = parse(source)?;
        Ok(Self { source: source.trim().to_owned(), expr })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn expr(&self) -> &ast::Expr {
        &self.expr
    }

    /// Roll the formula once.
    ///
    /// # Errors
    ///
    /// See [`eval::evaluate`].
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Roll, DiceError> {
        eval::evaluate(&self.expr, rng)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Formula {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Formula {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Formula {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Self::parse(&source).map_err(serde::de::Error::custom)
    }
}

/// Guess a formula producing results in `min..=max`.
///
/// `NdS` when `min` dice of `max / min` sides fit exactly, otherwise `1dmax`.
#[must_use]
pub fn guess_formula(min: i64, max: i64) -> String {
    if min > 0 && max % min == 0 {
        format!("{min}d{}", max / min)
    } else {
        format!("1d{max}")
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
