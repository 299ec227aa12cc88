//! # calc-core
//!
//! Shared library for Calc-Over-TCP containing the expression evaluator and
//! the text constants of the wire protocol.
//!
//! This crate is used by the server binary and by the integration tests.
//! It has zero dependencies on sockets or the async runtime, so the whole
//! evaluation pipeline is testable as plain synchronous code.
//!
//! The two modules are:
//!
//! - **`expr`** – Tokenization and left-to-right evaluation of a single
//!   input line.  A line like `2+3*4` is split into operand tokens and
//!   operator tokens, then folded into one `f32` result with no operator
//!   precedence.
//!
//! - **`protocol`** – The exact text exchanged with clients: welcome banner,
//!   prompt, diagnostic lines, the termination command, and response
//!   formatting.

pub mod expr;
pub mod protocol;

// Re-export the most-used items at the crate root so callers can write
// `calc_core::evaluate` instead of `calc_core::expr::eval::evaluate`.
pub use expr::eval::{evaluate, EvalError, Evaluation};
pub use expr::tokenize::{tokenize, Expression};
