use thiserror::Error;

use crate::tree::Position;

/// Error returned by formatting, minifying, and serializing operations.
///
/// Covers bad input syntax (unexpected characters, unterminated strings or
/// comments, misplaced commas and colons), policy violations (comments when
/// the policy forbids them, trailing commas when disallowed, a second
/// top-level element), and conversion failures (recursion limit exceeded).
///
/// When the error comes from a specific spot in the input, `position` holds
/// the zero-indexed location and the message includes it in readable form.
///
/// ```rust
/// use tidyjson::Formatter;
///
/// let mut fmt = Formatter::new();
/// if let Err(e) = fmt.reformat("{ oops }", 0) {
///     if let Some(pos) = e.position {
///         eprintln!("bad input at row {}, col {}", pos.row, pos.column);
///     }
/// }
/// ```
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TidyError {
    /// Human-readable description, including the position when known.
    pub message: String,

    /// Where in the input the problem was found, if applicable.
    pub position: Option<Position>,
}

impl TidyError {
    /// An error pinned to a location in the input text.
    pub fn at(message: impl Into<String>, pos: Position) -> Self {
        let message = format!(
            "{} at idx={}, row={}, col={}",
            message.into(),
            pos.index,
            pos.row,
            pos.column
        );
        Self {
            message,
            position: Some(pos),
        }
    }

    /// An error with no particular location.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }
}
