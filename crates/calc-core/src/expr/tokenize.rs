//! Line tokenization.
//!
//! A line is split **twice** over the same text:
//!
//! 1. on the operator characters `+ - * /` to obtain the operand tokens,
//! 2. on the ASCII digits `0`–`9` to obtain the operator tokens.
//!
//! The two token lists must have the same length for the line to be
//! well-formed.  Because the second split uses *single digits* as
//! delimiters, a multi-digit operand injects extra empty operator segments
//! and fails the count check — `12+3` is rejected while `1+3` is accepted.
//! This asymmetry is kept on purpose: it is observable behaviour of the
//! wire protocol, not an implementation detail (see DESIGN.md).

use crate::expr::eval::EvalError;

/// The four characters recognised as arithmetic operators.
pub const OPERATOR_CHARS: [char; 4] = ['+', '-', '*', '/'];

/// Tokenized form of one input line.
///
/// Invariant (enforced by [`tokenize`]): `operands.len() == operators.len()`.
/// `operators[0]` is the text *before* the first digit run and is never
/// applied; `operators[i]` for `i >= 1` is the operator applied together
/// with `operands[i]` during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub operands: Vec<String>,
    pub operators: Vec<String>,
}

/// Splits `line` into operand and operator token sequences.
///
/// # Errors
///
/// Returns [`EvalError::Structure`] when the two token counts differ, which
/// covers consecutive operators (`1//2`), trailing operators (`1+`),
/// multi-character junk between operand runs, and multi-digit operands.
pub fn tokenize(line: &str) -> Result<Expression, EvalError> {
    let operands = delimited_segments(line, |c| OPERATOR_CHARS.contains(&c));
    let operators = delimited_segments(line, |c| c.is_ascii_digit());

    if operands.len() != operators.len() {
        return Err(EvalError::Structure);
    }

    Ok(Expression {
        operands,
        operators,
    })
}

/// Splits `input` on every character matching `is_delim`.
///
/// Segment rules: when the delimiter never matches, the result is a single
/// segment holding the whole input (even when the input is empty).
/// Otherwise all segments are collected and *trailing* empty segments are
/// dropped; leading and interior empty segments are kept.
fn delimited_segments(input: &str, is_delim: impl Fn(char) -> bool) -> Vec<String> {
    if !input.chars().any(&is_delim) {
        return vec![input.to_string()];
    }

    let mut segments: Vec<String> = input
        .split(|c: char| is_delim(c))
        .map(str::to_string)
        .collect();

    while segments.last().is_some_and(String::is_empty) {
        segments.pop();
    }

    segments
}

// ── Tests ─────────────────────────────────────────────────────────────────────
