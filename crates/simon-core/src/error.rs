//! Library error type.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// Generation needs at least one color to draw from.
    #[error("color palette is empty")]
    EmptyPalette,

    #[error("unknown color '{0}'")]
    UnknownColor(String),
}
