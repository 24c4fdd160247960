//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::state::session::parse_session_date;

/// Validates that a string is a real calendar date formatted as `YYYY-MM-DD`.
///
/// # Examples
///
/// ```ignore
/// validate_iso_date("2024-01-01") // Ok
/// validate_iso_date("01/01/2024") // Err - wrong format
/// validate_iso_date("2023-02-29") // Err - not a real date
/// ```
pub fn validate_iso_date(value: &str) -> Result<(), ValidationError> {
    if parse_session_date(value.trim()).is_err() {
        let mut err = ValidationError::new("iso_date");
        err.message = Some("Date must be a valid YYYY-MM-DD calendar date".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a string contains at least one non-whitespace character.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("Value must not be blank".into());
        return Err(err);
    }

    Ok(())
}
