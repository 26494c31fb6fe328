//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use shared::error::AppError;

/// Entity names: asset, consumable, inventory task
pub const MAX_NAME_LEN: usize = 200;

/// Approval titles
pub const MAX_TITLE_LEN: usize = 200;

/// Notes, reasons, comments
pub const MAX_NOTE_LEN: usize = 500;

/// User identities, categories, units, external ids
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty"))
            .with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that a count is not negative
pub fn validate_non_negative(value: i64, field: &str) -> Result<(), AppError> {
    if value < 0 {
        return Err(
            AppError::validation(format!("{field} must be non-negative, got {value}"))
                .with_detail("field", field),
        );
    }
    Ok(())
}

/// Validate an optional money amount: finite and not negative
pub fn validate_non_negative_amount(value: Option<f64>, field: &str) -> Result<(), AppError> {
    if let Some(v) = value
        && (!v.is_finite() || v < 0.0)
    {
        return Err(AppError::validation(format!(
            "{field} must be a finite non-negative number, got {v}"
        ))
        .with_detail("field", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_blank_and_long() {
        assert!(validate_required_text("Toner", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required_text(&long, "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn optional_text_allows_none() {
        assert!(validate_optional_text(&None, "note", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("x".repeat(501)), "note", MAX_NOTE_LEN).is_err());
        assert!(validate_non_negative(-1, "safety_stock").is_err());
    }

    #[test]
    fn amount_must_be_finite_and_non_negative() {
        assert!(validate_non_negative_amount(None, "amount").is_ok());
        assert!(validate_non_negative_amount(Some(0.0), "amount").is_ok());
        assert!(validate_non_negative_amount(Some(1299.5), "amount").is_ok());
        assert!(validate_non_negative_amount(Some(-0.01), "amount").is_err());
        assert!(validate_non_negative_amount(Some(f64::NAN), "amount").is_err());
        assert!(validate_non_negative_amount(Some(f64::INFINITY), "amount").is_err());
    }
}
