use uuid::Uuid;

use super::ApiError;

pub fn validate_user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::validation(format!("Invalid user id: {raw}. Expected a UUID")))
}

pub fn validate_badge_key(key: &str) -> Result<&str, ApiError> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("badge_key is required"));
    }

    if trimmed.len() > 64 {
        return Err(ApiError::validation(
            "badge_key must be 64 characters or less",
        ));
    }

    Ok(trimmed)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("email is required"));
    }
    if !trimmed.contains('@') {
        return Err(ApiError::validation("email is invalid"));
    }
    Ok(trimmed)
}
