//! Validation helpers for DTOs.

use std::collections::HashSet;

use validator::{ValidateUrl, ValidationError};

use crate::dto::game::KeyboardControlDto;

/// Rejects strings that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Accepts an empty string (no image) or an absolute URL.
pub fn validate_optional_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_url() {
        return Ok(());
    }
    let mut err = ValidationError::new("url");
    err.message = Some("must be empty or a valid URL".into());
    Err(err)
}

/// Validates keyboard bindings: every key is non-blank and appears once.
///
/// Keys are compared case-insensitively so `W` and `w` count as duplicates.
///
/// # Examples
///
/// ```ignore
/// validate_keyboard_controls(&[control("w", "Up"), control("s", "Down")]) // Ok
/// validate_keyboard_controls(&[control("w", "Up"), control("W", "Jump")]) // Err - duplicate
/// ```
pub fn validate_keyboard_controls(controls: &[KeyboardControlDto]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(controls.len());
    for control in controls {
        let key = control.key.trim();
        if key.is_empty() {
            let mut err = ValidationError::new("keyboard_control_key");
            err.message = Some("keyboard control keys must not be blank".into());
            return Err(err);
        }
        if !seen.insert(key.to_lowercase()) {
            let mut err = ValidationError::new("keyboard_control_duplicate");
            err.message = Some(format!("keyboard control `{key}` is bound twice").into());
            return Err(err);
        }
    }
    Ok(())
}
