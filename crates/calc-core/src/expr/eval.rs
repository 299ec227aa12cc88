//! Left-to-right expression evaluation.
//!
//! There is no operator precedence: `2+3*4` evaluates as `(2+3)*4 = 20`.
//! The operator applied together with `operands[i]` is `operators[i]` — the
//! token at the *same* index, not the one separating it from the previous
//! operand.  An unrecognised operator token does not abort evaluation: the
//! step is skipped (the running result is left untouched and the operand of
//! that step is never parsed) and the outcome is flagged so the session
//! layer can emit a diagnostic before the result line.

use thiserror::Error;

use crate::expr::tokenize::tokenize;

/// Error type for expression evaluation.
///
/// Both variants are recoverable at the session level: the client receives
/// a diagnostic line and the session continues.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvalError {
    /// Operand and operator token counts differ; the line is malformed.
    #[error("operand and operator token counts differ")]
    Structure,

    /// A token in operand position does not parse as a number.
    #[error("operand '{token}' is not a number")]
    NumericParse { token: String },
}

/// Outcome of evaluating one well-formed line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// The folded result.  Division by zero follows IEEE 754 semantics, so
    /// this may be infinite or NaN.
    pub value: f32,
    /// Set when at least one operator token was not one of `+ - * /`.
    pub unknown_operator: bool,
}

/// Evaluates a whitespace-stripped input line.
///
/// Pure and stateless: the same line always yields the same result.
///
/// # Errors
///
/// Returns [`EvalError::Structure`] for a malformed token structure and
/// [`EvalError::NumericParse`] when an operand of an applied step does not
/// parse as `f32`.
pub fn evaluate(line: &str) -> Result<Evaluation, EvalError> {
    let expr = tokenize(line)?;

    // The count check never lets both lists come out empty, but avoid
    // indexing into the first slot all the same.
    let first = expr.operands.first().ok_or(EvalError::Structure)?;
    let mut value = parse_operand(first)?;
    let mut unknown_operator = false;

    for i in 1..expr.operands.len() {
        match expr.operators[i].as_str() {
            "+" => value += parse_operand(&expr.operands[i])?,
            "-" => value -= parse_operand(&expr.operands[i])?,
            "*" => value *= parse_operand(&expr.operands[i])?,
            "/" => value /= parse_operand(&expr.operands[i])?,
            // Skipped step: the operand stays unparsed.
            _ => unknown_operator = true,
        }
    }

    Ok(Evaluation {
        value,
        unknown_operator,
    })
}

fn parse_operand(token: &str) -> Result<f32, EvalError> {
    token.parse::<f32>().map_err(|_| EvalError::NumericParse {
        token: token.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
