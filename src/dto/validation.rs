//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest display name accepted at sign-in, in characters.
pub const MAX_DISPLAY_NAME_CHARS: usize = 40;

/// Validates a display name: 1 to 40 characters once trimmed, no control characters.
///
/// # Examples
///
/// ```ignore
/// validate_display_name("Shredder")  // Ok
/// validate_display_name("   ")       // Err - blank
/// validate_display_name("a\u{7}b")   // Err - control character
/// ```
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    let length = trimmed.chars().count();
    if length == 0 || length > MAX_DISPLAY_NAME_CHARS {
        let mut err = ValidationError::new("display_name_length");
        err.message = Some(
            format!("Display name must be 1 to {MAX_DISPLAY_NAME_CHARS} characters (got {length})")
                .into(),
        );
        return Err(err);
    }

    if trimmed.chars().any(char::is_control) {
        let mut err = ValidationError::new("display_name_format");
        err.message = Some("Display name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a media reference is an absolute `http(s)` URL with a host.
pub fn validate_media_url(url: &str) -> Result<(), ValidationError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    let host = rest
        .and_then(|rest| rest.split(['/', '?', '#']).next())
        .unwrap_or_default();

    if host.is_empty() || url.chars().any(char::is_whitespace) {
        let mut err = ValidationError::new("media_url");
        err.message = Some("Media URL must be an absolute http(s) URL".into());
        return Err(err);
    }

    Ok(())
}
