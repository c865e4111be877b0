// handlers/input.rs - request field validation shared by the handlers and the CLI

use crate::auth::password::{is_valid_email, password_strength_errors};
use crate::error::ApiError;

pub const MAX_ORG_NAME_LENGTH: usize = 100;

/// Trimmed value, or `None` when absent or blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Email and password must both be present and non-empty.
pub fn require_credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<(String, String), ApiError> {
    match (email, password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            Ok((email, password))
        }
        _ => Err(ApiError::validation_error("Email and password are required")),
    }
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid email format"))
    }
}

pub fn validate_new_password(password: &str) -> Result<(), ApiError> {
    let errors = password_strength_errors(password);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error(format!(
            "Password validation failed: {}",
            errors.join(", ")
        )))
    }
}

pub fn validate_org_name(org_name: Option<String>) -> Result<String, ApiError> {
    let org_name = non_blank(org_name)
        .ok_or_else(|| ApiError::validation_error("Organization name is required"))?;

    if org_name.chars().count() > MAX_ORG_NAME_LENGTH {
        return Err(ApiError::validation_error(format!(
            "Organization name must be at most {} characters",
            MAX_ORG_NAME_LENGTH
        )));
    }
    Ok(org_name)
}
