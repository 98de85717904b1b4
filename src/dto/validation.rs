//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a required text field is present and not blank once trimmed.
///
/// # Examples
///
/// ```ignore
/// validate_required("Skyblock", "mod name must not be empty") // Ok
/// validate_required("   ", "mod name must not be empty")      // Err
/// ```
pub fn validate_required(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(message.into());
        return Err(err);
    }

    Ok(())
}
