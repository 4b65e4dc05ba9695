//! Evaluation of parsed dice formulas against a random source.

use rand::Rng;

use super::ast::{BinaryOp, Dice, DiceSource, Expr, Modifier};
use super::{DiceError, DiceRoll, MAX_DICE_PER_GROUP, Roll};

/// Evaluate an expression, recording every dice group rolled along the way.
///
/// # Errors
///
/// Returns an error on division by zero, arithmetic overflow, or a dice
/// group larger than [`MAX_DICE_PER_GROUP`].
pub fn evaluate<R: Rng + ?Sized>(expr: &Expr, rng: &mut R) -> Result<Roll, DiceError> {
    let mut rolls = Vec::new();
    let total = eval_expr(expr, rng, &mut rolls)?;
    Ok(Roll { total, rolls })
}

fn eval_expr<R: Rng + ?Sized>(expr: &Expr, rng: &mut R, rolls: &mut Vec<DiceRoll>) -> Result<i64, DiceError> {
    match expr {
        Expr::Constant(n) => Ok(*n),
        Expr::Binary { op, left, right } => {
            let l = eval_expr(left, rng, rolls)?;
            let r = eval_expr(right, rng, rolls)?;
            apply_binary(*op, l, r)
        }
        Expr::Dice(dice) => sum(&eval_dice(dice, rng, rolls)?),
    }
}

fn apply_binary(op: BinaryOp, l: i64, r: i64) -> Result<i64, DiceError> {
    match op {
        BinaryOp::Add => l.checked_add(r).ok_or(DiceError::Overflow),
        BinaryOp::Sub => l.checked_sub(r).ok_or(DiceError::Overflow),
        BinaryOp::Mul => l.checked_mul(r).ok_or(DiceError::Overflow),
        BinaryOp::Div => floor_div(l, r),
    }
}

/// Integer division rounding toward negative infinity.
fn floor_div(l: i64, r: i64) -> Result<i64, DiceError> {
    if r == 0 {
        return Err(DiceError::DivisionByZero);
    }
    let q = l.checked_div(r).ok_or(DiceError::Overflow)?;
    if (l % r != 0) && ((l < 0) != (r < 0)) { Ok(q - 1) } else { Ok(q) }
}

fn sum(values: &[i64]) -> Result<i64, DiceError> {
    values
        .iter()
        .try_fold(0_i64, |acc, v| acc.checked_add(*v))
        .ok_or(DiceError::Overflow)
}

/// Produce the modified value list for a dice group or pool.
fn eval_dice<R: Rng + ?Sized>(dice: &Dice, rng: &mut R, rolls: &mut Vec<DiceRoll>) -> Result<Vec<i64>, DiceError> {
    let values = match &dice.source {
        DiceSource::Simple { count, sides } => {
            let count = eval_expr(count, rng, rolls)?;
            let sides = eval_expr(sides, rng, rolls)?;
            let faces = roll_faces(count, sides, rng)?;
            rolls.push(DiceRoll { count, sides, faces: faces.clone() });
            faces
        }
        DiceSource::Pool(members) => {
            let mut totals = Vec::with_capacity(members.len());
            for member in members {
                totals.push(sum(&eval_dice(member, rng, rolls)?)?);
            }
            totals
        }
    };

    Ok(dice
        .modifiers
        .iter()
        .fold(values, |values, modifier| apply_modifier(*modifier, values)))
}

fn roll_faces<R: Rng + ?Sized>(count: i64, sides: i64, rng: &mut R) -> Result<Vec<i64>, DiceError> {
    if count <= 0 || sides <= 0 {
        return Ok(Vec::new());
    }
    if count > MAX_DICE_PER_GROUP {
        return Err(DiceError::TooManyDice { count, limit: MAX_DICE_PER_GROUP });
    }
    Ok((0..count).map(|_| rng.random_range(1..=sides)).collect())
}

fn apply_modifier(modifier: Modifier, mut values: Vec<i64>) -> Vec<i64> {
    match modifier {
        Modifier::KeepHighest(n) => {
            values.sort_unstable_by(|a, b| b.cmp(a));
            values.truncate(as_len(n.unwrap_or(1)));
            values
        }
        Modifier::KeepLowest(n) => {
            values.sort_unstable();
            values.truncate(as_len(n.unwrap_or(1)));
            values
        }
        Modifier::DropHighest(n) => {
            values.sort_unstable();
            let keep = values.len().saturating_sub(as_len(n.unwrap_or(1)));
            values.truncate(keep);
            values
        }
        Modifier::DropLowest(n) => {
            values.sort_unstable_by(|a, b| b.cmp(a));
            let keep = values.len().saturating_sub(as_len(n.unwrap_or(1)));
            values.truncate(keep);
            values
        }
        Modifier::Min(Some(floor)) => values.into_iter().map(|v| v.max(floor)).collect(),
        Modifier::Max(Some(ceiling)) => values.into_iter().map(|v| v.min(ceiling)).collect(),
        Modifier::Min(None) | Modifier::Max(None) => values,
    }
}

fn as_len(n: i64) -> usize {
    usize::try_from(n.max(0)).unwrap_or(usize::MAX)
}
