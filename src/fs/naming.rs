//! Filename generation and sanitization.

use crate::api::types::Photo;
use crate::error::{Error, Result};

/// Longest sanitized component kept intact, in characters.
const MAX_COMPONENT_CHARS: usize = 200;

/// Characters kept from an over-long component before the marker.
const TRUNCATED_KEEP_CHARS: usize = 195;

const TRUNCATED_MARKER: &str = "_truncated";

/// Replace characters that are unsafe or awkward in filenames with `_`.
///
/// Over-long results are cut to 195 characters plus `_truncated`, then
/// leading and trailing dots and spaces are removed. The result may be empty.
pub fn sanitize_component(name: &str) -> String {
    let mut sanitized: Vec<char> = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | '!' | '@' | '#' | '$' | '%'
            | '^' | '&' | '\'' | ';' | '=' | '+' | ',' | '`' | '~' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.len() > MAX_COMPONENT_CHARS {
        sanitized.truncate(TRUNCATED_KEEP_CHARS);
        sanitized.extend(TRUNCATED_MARKER.chars());
    }

    trim_dots(&sanitized.into_iter().collect::<String>()).to_string()
}

/// Strip leading and trailing dots and spaces.
pub fn trim_dots(name: &str) -> &str {
    name.trim_matches(|c| c == '.' || c == ' ')
}

/// Reject names that could escape the output directory.
pub fn validate_filename(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    if name == "." || name == ".." {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    Ok(())
}

/// Build the base filename (without extension) for a photo.
///
/// Layout is `{index+1}_{guid}_{label}`, where the label is the sanitized
/// custom name if given, else the sanitized caption. Missing parts are left
/// out together with their separator.
pub fn compose_base_name(
    photo: &Photo,
    index: Option<usize>,
    custom_filename: Option<&str>,
) -> Result<String> {
    validate_filename(&photo.photo_guid)?;

    let label = custom_filename
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| photo.caption_text())
        .map(sanitize_component)
        .filter(|label| !label.is_empty());

    let mut parts = Vec::with_capacity(3);
    if let Some(index) = index {
        parts.push((index + 1).to_string());
    }
    parts.push(photo.photo_guid.clone());
    if let Some(label) = label {
        parts.push(label);
    }

    let name = parts.join("_");
    validate_filename(&name)?;
    Ok(name)
}
