#![forbid(unsafe_code)]

//! Session errors.

use std::fmt;

use ctabs_core::IllegalArgument;

/// Errors from [`SessionRegistry`](crate::SessionRegistry) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No registered session carries the requested handle.
    NotFound { handle: String },
    /// A malformed request, rejected before any state changed.
    Argument(IllegalArgument),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { handle } => write!(f, "cannot find session by id {handle:?}"),
            Self::Argument(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Argument(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<IllegalArgument> for SessionError {
    fn from(err: IllegalArgument) -> Self {
        Self::Argument(err)
    }
}
