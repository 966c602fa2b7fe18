#![forbid(unsafe_code)]

//! Precondition checks for public entry points.
//!
//! Every check either returns the validated value or an [`IllegalArgument`]
//! carrying the caller's message verbatim. Callers run their checks before
//! touching any state, so a rejected call leaves the receiver unchanged.
//!
//! # Example
//!
//! ```
//! use ctabs_core::condition::{ensure_at_least, ensure_some};
//!
//! let capacity = ensure_at_least(16_usize, 1, "The capacity must be at least 1")?;
//! assert_eq!(capacity, 16);
//!
//! let missing: Option<&str> = None;
//! let err = ensure_some(missing, "The tag may not be null").unwrap_err();
//! assert_eq!(err.message(), "The tag may not be null");
//! # Ok::<(), ctabs_core::IllegalArgument>(())
//! ```

use std::fmt;

/// An argument violated a precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllegalArgument {
    message: String,
}

impl IllegalArgument {
    /// Create an error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The caller-supplied description of the violated precondition.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for IllegalArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal argument: {}", self.message)
    }
}

impl std::error::Error for IllegalArgument {}

/// Unwrap a required value.
pub fn ensure_some<T>(value: Option<T>, message: &str) -> Result<T, IllegalArgument> {
    value.ok_or_else(|| IllegalArgument::new(message))
}

/// Reject empty strings.
pub fn ensure_not_empty<'a>(value: &'a str, message: &str) -> Result<&'a str, IllegalArgument> {
    if value.is_empty() {
        Err(IllegalArgument::new(message))
    } else {
        Ok(value)
    }
}

/// Reject values below `min`. `NaN` never satisfies the bound.
pub fn ensure_at_least<T: PartialOrd>(value: T, min: T, message: &str) -> Result<T, IllegalArgument> {
    if value >= min {
        Ok(value)
    } else {
        Err(IllegalArgument::new(message))
    }
}

/// Reject values above `max`. `NaN` never satisfies the bound.
pub fn ensure_at_most<T: PartialOrd>(value: T, max: T, message: &str) -> Result<T, IllegalArgument> {
    if value <= max {
        Ok(value)
    } else {
        Err(IllegalArgument::new(message))
    }
}

/// Reject a false condition.
pub fn ensure_true(condition: bool, message: &str) -> Result<(), IllegalArgument> {
    if condition {
        Ok(())
    } else {
        Err(IllegalArgument::new(message))
    }
}

/// Reject two equal values.
pub fn ensure_not_equal<T: PartialEq>(a: T, b: T, message: &str) -> Result<(), IllegalArgument> {
    if a == b {
        Err(IllegalArgument::new(message))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn some_passes_value_through() {
        assert_eq!(ensure_some(Some(3), "missing"), Ok(3));
    }

    #[test]
    fn none_is_rejected_with_message() {
        let err = ensure_some::<u8>(None, "The item may not be null").unwrap_err();
        assert_eq!(err.message(), "The item may not be null");
        assert_eq!(err.to_string(), "illegal argument: The item may not be null");
    }

    #[test]
    fn empty_string_is_rejected() {
        assert!(ensure_not_empty("", "empty").is_err());
        assert_eq!(ensure_not_empty("tab", "empty"), Ok("tab"));
    }

    #[test]
    fn lower_bound_is_inclusive() {
        assert_eq!(ensure_at_least(1, 1, "min"), Ok(1));
        assert!(ensure_at_least(0, 1, "min").is_err());
        assert!(ensure_at_least(-0.5_f32, 0.0, "min").is_err());
    }

    #[test]
    fn nan_fails_both_bounds() {
        assert!(ensure_at_least(f32::NAN, 0.0, "min").is_err());
        assert!(ensure_at_most(f32::NAN, 1.0, "max").is_err());
    }

    #[test]
    fn upper_bound_is_inclusive() {
        assert_eq!(ensure_at_most(1.0_f32, 1.0, "max"), Ok(1.0));
        assert!(ensure_at_most(2, 1, "max").is_err());
    }

    #[test]
    fn true_and_not_equal() {
        assert!(ensure_true(true, "t").is_ok());
        assert!(ensure_true(false, "t").is_err());
        assert!(ensure_not_equal(1, 2, "eq").is_ok());
        assert!(ensure_not_equal("a", "a", "eq").is_err());
    }
}
