use super::error::RetrievalError;
use crate::constants::MAX_USER_ID_LEN;

/// Rejects identifiers that are empty, longer than [`MAX_USER_ID_LEN`] bytes, or
/// contain control characters.
pub fn validate_user_id(user_id: &str) -> Result<(), RetrievalError> {
    if user_id.is_empty() {
        return Err(RetrievalError::InvalidRequest(
            "user_id must not be empty".to_string(),
        ));
    }

    if user_id.len() > MAX_USER_ID_LEN {
        return Err(RetrievalError::InvalidRequest(format!(
            "user_id exceeds {} bytes",
            MAX_USER_ID_LEN
        )));
    }

    if user_id.chars().any(char::is_control) {
        return Err(RetrievalError::InvalidRequest(
            "user_id contains control characters".to_string(),
        ));
    }

    Ok(())
}
