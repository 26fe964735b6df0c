#![forbid(unsafe_code)]

//! Login form validation.
//!
//! Client-side checks only; the submit itself is simulated. The email rule
//! reproduces the classic `^[^\s@]+@[^\s@]+\.[^\s@]+$` heuristic without a
//! regex engine: exactly one `@`, no whitespace anywhere, and a dot with
//! text on both sides after the `@`.

/// A failed field check: stable code plus display message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationError {
    /// Stable identifier for programmatic handling.
    pub code: &'static str,
    /// Human-readable message.
    pub message: &'static str,
}

impl ValidationError {
    const fn new(code: &'static str, message: &'static str) -> Self {
        Self { code, message }
    }
}

/// Error for an empty required field.
pub const REQUIRED: ValidationError = ValidationError::new("required", "Required");
/// Error for a malformed email address.
pub const BAD_EMAIL: ValidationError = ValidationError::new("email", "Invalid email address");

/// Reject empty values.
pub fn required(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(REQUIRED)
    } else {
        Ok(())
    }
}

/// Validate an email address per the pattern above.
pub fn email(value: &str) -> Result<(), ValidationError> {
    if value.chars().any(char::is_whitespace) {
        return Err(BAD_EMAIL);
    }
    let Some((local, domain)) = value.split_once('@') else {
        return Err(BAD_EMAIL);
    };
    if local.is_empty() || domain.contains('@') {
        return Err(BAD_EMAIL);
    }
    // The domain needs a dot with non-empty text on both sides.
    let Some((head, tail)) = domain.rsplit_once('.') else {
        return Err(BAD_EMAIL);
    };
    if head.is_empty() || tail.is_empty() {
        return Err(BAD_EMAIL);
    }
    Ok(())
}
