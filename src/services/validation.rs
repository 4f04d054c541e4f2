use crate::errors::{WallError, WallResult};
use crate::models::{ImageUpload, ANONYMOUS_COMMENTER};

/// Trims `value`, failing with a missing-field error when nothing is left.
pub fn require(value: &str, field: &'static str) -> WallResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(WallError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn require_image(image: Option<ImageUpload>) -> WallResult<ImageUpload> {
    match image {
        Some(image) if !image.is_empty() => Ok(image),
        _ => Err(WallError::MissingField("image")),
    }
}

/// An optional replacement image: blank file inputs count as no image.
pub fn optional_image(image: Option<ImageUpload>) -> Option<ImageUpload> {
    image.filter(|image| !image.is_empty())
}

/// Stored commenter name for a submitted one.
pub fn resolve_commenter(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => ANONYMOUS_COMMENTER.to_string(),
    }
}
