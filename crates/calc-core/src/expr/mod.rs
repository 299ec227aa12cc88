//! Expression pipeline: a line of text is tokenized into operand and
//! operator token sequences, then evaluated strictly left to right.

pub mod eval;
pub mod tokenize;

pub use eval::{evaluate, EvalError, Evaluation};
pub use tokenize::{tokenize, Expression};
