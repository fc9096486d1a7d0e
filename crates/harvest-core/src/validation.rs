//! Field-level checks run before any storage access.

use chrono::{DateTime, Utc};

use crate::error::{HarvestError, HarvestResult};

pub fn require_non_empty(field: &str, value: &str) -> HarvestResult<()> {
    if value.trim().is_empty() {
        return Err(HarvestError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Accepts digits with an optional leading `+` and common separators,
/// 7 to 15 digits in total.
pub fn validate_phone(value: &str) -> HarvestResult<()> {
    let mut digits = 0usize;
    for (i, c) in value.trim().chars().enumerate() {
        match c {
            '0'..='9' => digits += 1,
            '+' if i == 0 => {}
            ' ' | '-' | '(' | ')' | '.' => {}
            _ => {
                return Err(HarvestError::validation(format!(
                    "phone {value:?} contains invalid character {c:?}"
                )));
            }
        }
    }
    if !(7..=15).contains(&digits) {
        return Err(HarvestError::validation(format!(
            "phone {value:?} must contain 7 to 15 digits"
        )));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> HarvestResult<()> {
    let invalid = || HarvestError::validation(format!("email {value:?} is not well-formed"));
    let (local, domain) = value.trim().split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || !domain.contains('.')
        || value.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_optional_phone(value: Option<&str>) -> HarvestResult<()> {
    value.map(validate_phone).transpose().map(|_| ())
}

pub fn validate_optional_email(value: Option<&str>) -> HarvestResult<()> {
    value.map(validate_email).transpose().map(|_| ())
}

pub fn require_positive(field: &str, value: f64) -> HarvestResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(HarvestError::validation(format!("{field} must be positive")));
    }
    Ok(())
}

pub fn require_non_negative(field: &str, value: f64) -> HarvestResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(HarvestError::validation(format!(
            "{field} must not be negative"
        )));
    }
    Ok(())
}

pub fn require_finite(field: &str, value: f64) -> HarvestResult<()> {
    if !value.is_finite() {
        return Err(HarvestError::validation(format!("{field} must be a number")));
    }
    Ok(())
}

pub fn require_in_range(field: &str, value: i64, min: i64, max: i64) -> HarvestResult<()> {
    if value < min || value > max {
        return Err(HarvestError::validation(format!(
            "{field} must be between {min} and {max}"
        )));
    }
    Ok(())
}

/// `end` must not precede `start`.
pub fn require_ordered(
    start_field: &str,
    start: DateTime<Utc>,
    end_field: &str,
    end: DateTime<Utc>,
) -> HarvestResult<()> {
    if end < start {
        return Err(HarvestError::validation(format!(
            "{end_field} must not be before {start_field}"
        )));
    }
    Ok(())
}
