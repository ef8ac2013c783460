//! Defect photo upload preconditions.

use crate::error::CoreError;

/// Default photo size cap (5 MiB).
pub const DEFAULT_MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Longest file name kept on a stored photo.
pub const MAX_FILE_NAME_LENGTH: usize = 255;

/// Check an uploaded photo against the size cap and metadata rules.
pub fn validate_upload(
    file_name: &str,
    mime_type: &str,
    len: usize,
    max_bytes: usize,
) -> Result<(), CoreError> {
    if file_name.trim().is_empty() {
        return Err(CoreError::invalid("fileName", "must not be empty"));
    }
    if mime_type.trim().is_empty() {
        return Err(CoreError::invalid("mimeType", "must not be empty"));
    }
    if !mime_type.contains('/') {
        return Err(CoreError::invalid(
            "mimeType",
            format!("'{mime_type}' is not a media type"),
        ));
    }
    if len == 0 {
        return Err(CoreError::invalid("photo", "file is empty"));
    }
    if len > max_bytes {
        return Err(CoreError::TooLarge {
            limit: max_bytes,
            actual: len,
        });
    }
    Ok(())
}

/// Reduce a client-supplied file name to something safe for storage and for
/// a `Content-Disposition` header: path components, quotes and control
/// characters are dropped and the result is length-capped.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .take(MAX_FILE_NAME_LENGTH)
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "photo".to_string()
    } else {
        cleaned.to_string()
    }
}
