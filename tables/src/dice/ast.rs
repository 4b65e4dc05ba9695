//! AST types for dice formulas.

/// A parsed dice formula expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Integer literal.
    Constant(i64),
    /// `left op right` arithmetic.
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    /// A dice group or pool, summed after modifiers.
    Dice(Dice),
}

/// Arithmetic operators, all integer-valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// Floor division.
    Div,
}

/// Something that produces a list of values, filtered by modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dice {
    pub source: DiceSource,
    pub modifiers: Vec<Modifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiceSource {
    /// `NdS`: each die is one value.
    Simple { count: Box<Expr>, sides: Box<Expr> },
    /// `{a, b, c}`: each member's total is one value.
    Pool(Vec<Dice>),
}

/// List filters applied left to right before summing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// `kh n`: keep the n highest values (default 1).
    KeepHighest(Option<i64>),
    /// `kl n`: keep the n lowest values (default 1).
    KeepLowest(Option<i64>),
    /// `dh n`: drop the n highest values (default 1).
    DropHighest(Option<i64>),
    /// `dl n`: drop the n lowest values (default 1).
    DropLowest(Option<i64>),
    /// `min n`: raise values below n to n. No-op without n.
    Min(Option<i64>),
    /// `max n`: lower values above n to n. No-op without n.
    Max(Option<i64>),
}
