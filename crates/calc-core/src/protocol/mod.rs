//! Wire-protocol text.
//!
//! Everything the server writes is a newline-terminated plain-text line.
//! The constants here are the single source of truth for that text, shared
//! by the session handler and the integration tests.
//!
//! The diagnostic lines are kept verbatim from the deployed protocol
//! (including their French wording): clients match on them, so they are
//! observable behaviour and not free to change.

/// First line of the greeting.
pub const WELCOME_LINE: &str = "Welcome to the Calculator Server.";

/// Second line of the greeting.
pub const INSTRUCTION_LINE: &str =
    "Send me arithmetic expressions and conclude with the BYE command.";

/// Prompt line, sent after the greeting and after every response.
pub const PROMPT: &str = "What computation do you want ?";

/// Diagnostic for a malformed token structure.
pub const STRUCTURE_DIAGNOSTIC: &str =
    "Seule les nombres et les caracteres suivants sont autorise [*/+-]";

/// Diagnostic for an unrecognised operator token.
pub const OPERATOR_DIAGNOSTIC: &str = "Seule les operateurs suivants sont autorise [*/+-]";

/// Generic message for a numeric parse failure.
pub const INTERNAL_ERROR: &str = "Erreur interne";

/// Command that ends a session, matched case-insensitively.
pub const TERMINATION_COMMAND: &str = "bye";

/// Returns `true` when `line` is the termination command.
///
/// The comparison runs against the raw line, before whitespace stripping,
/// so `" bye"` does not terminate a session.
pub fn is_termination(line: &str) -> bool {
    line.eq_ignore_ascii_case(TERMINATION_COMMAND)
}

/// Removes all whitespace from an input line before evaluation.
pub fn strip_whitespace(line: &str) -> String {
    line.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Renders a result value the way it appears on the wire.
///
/// Integral values keep a decimal point (`3` → `"3.0"`); infinities render
/// as `"inf"`/`"-inf"` and NaN as `"NaN"`.
pub fn format_result(value: f32) -> String {
    format!("{value:?}")
}

/// Builds the response line for a successfully evaluated input.
pub fn format_response(stripped_line: &str, value: f32) -> String {
    format!("{stripped_line} = {}", format_result(value))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
