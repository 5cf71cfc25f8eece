//! Inbound multipart form ingestion.
//!
//! # Responsibilities
//! - Drain an inbound multipart body into tagged form fields
//! - Decide Text vs File per field at parse time (filename or content type
//!   present means File)
//! - Validate required fields and image constraints before any upstream call
//! - Log a byte-free summary of what arrived
//!
//! # Design Decisions
//! - File bytes stay opaque from ingestion to re-emission
//! - A malformed multipart body is a caller error (400), not an internal one

use axum::extract::Multipart;

use crate::config::LimitsConfig;
use crate::relay::error::RelayError;
use crate::relay::types::FormField;

/// Drain every part of an inbound multipart body into tagged fields,
/// preserving arrival order.
pub async fn collect_fields(mut multipart: Multipart) -> Result<Vec<FormField>, RelayError> {
    let mut fields = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RelayError::MissingParameter(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        if filename.is_some() || content_type.is_some() {
            let data = field.bytes().await.map_err(|e| {
                RelayError::MissingParameter(format!("Malformed multipart body: {e}"))
            })?;
            fields.push(FormField::File {
                name,
                filename,
                content_type,
                data,
            });
        } else {
            let value = field.text().await.map_err(|e| {
                RelayError::MissingParameter(format!("Malformed multipart body: {e}"))
            })?;
            fields.push(FormField::Text { name, value });
        }
    }

    Ok(fields)
}

/// First file field with the given name.
pub fn find_file<'a>(fields: &'a [FormField], name: &str) -> Option<&'a FormField> {
    fields
        .iter()
        .find(|f| matches!(f, FormField::File { .. }) && f.name() == name)
}

/// First text field with the given name.
pub fn find_text<'a>(fields: &'a [FormField], name: &str) -> Option<&'a str> {
    fields.iter().find_map(|f| match f {
        FormField::Text { name: n, value } if n == name => Some(value.as_str()),
        _ => None,
    })
}

/// Require a file field to be present.
pub fn require_file<'a>(
    fields: &'a [FormField],
    name: &str,
    missing_message: &str,
) -> Result<&'a FormField, RelayError> {
    find_file(fields, name).ok_or_else(|| RelayError::MissingParameter(missing_message.to_string()))
}

/// Require a non-blank text field to be present.
pub fn require_text<'a>(
    fields: &'a [FormField],
    name: &str,
    missing_message: &str,
) -> Result<&'a str, RelayError> {
    match find_text(fields, name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(RelayError::MissingParameter(missing_message.to_string())),
    }
}

/// Validate an uploaded image: declared type must be `image/*` and the size
/// must not exceed the configured ceiling.
pub fn validate_image(field: &FormField, limits: &LimitsConfig) -> Result<(), RelayError> {
    let FormField::File {
        content_type, data, ..
    } = field
    else {
        return Err(RelayError::MissingParameter("No image provided".to_string()));
    };

    match content_type {
        Some(ct) if ct.starts_with("image/") => {}
        _ => {
            return Err(RelayError::MissingParameter(
                "Invalid image type. Please upload a valid image file.".to_string(),
            ));
        }
    }

    if data.len() > limits.max_image_bytes {
        return Err(RelayError::MissingParameter(
            "Image too large. Maximum size is 10MB.".to_string(),
        ));
    }

    Ok(())
}

/// Log what arrived without logging the image bytes themselves.
pub fn log_field_summary(operation: &str, fields: &[FormField]) {
    let image = find_file(fields, "image");
    let (image_content_type, image_size) = match image {
        Some(FormField::File {
            content_type, data, ..
        }) => (content_type.as_deref().unwrap_or("unknown"), data.len()),
        _ => ("unknown", 0),
    };

    tracing::debug!(
        operation,
        field_count = fields.len(),
        has_image = image.is_some(),
        image_content_type,
        image_size,
        prompt = find_text(fields, "prompt").unwrap_or("no prompt"),
        "Form data received"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn image_field(content_type: Option<&str>, size: usize) -> FormField {
        FormField::File {
            name: "image".to_string(),
            filename: Some("photo.png".to_string()),
            content_type: content_type.map(str::to_string),
            data: Bytes::from(vec![0u8; size]),
        }
    }

    fn text_field(name: &str, value: &str) -> FormField {
        FormField::Text {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_find_distinguishes_text_from_file() {
        let fields = vec![text_field("prompt", "a cat"), image_field(Some("image/png"), 4)];

        assert_eq!(find_text(&fields, "prompt"), Some("a cat"));
        assert!(find_file(&fields, "image").is_some());
        assert!(find_file(&fields, "prompt").is_none());
        assert!(find_text(&fields, "image").is_none());
    }

    #[test]
    fn test_require_text_rejects_blank_values() {
        let fields = vec![text_field("prompt", "   ")];
        let err = require_text(&fields, "prompt", "No prompt provided").unwrap_err();
        assert_eq!(err.to_string(), "No prompt provided");
    }

    #[test]
    fn test_validate_image_accepts_png() {
        let limits = LimitsConfig::default();
        assert!(validate_image(&image_field(Some("image/png"), 1024), &limits).is_ok());
    }

    #[test]
    fn test_validate_image_rejects_non_image_type() {
        let limits = LimitsConfig::default();
        let err = validate_image(&image_field(Some("text/plain"), 16), &limits).unwrap_err();
        assert!(err.to_string().contains("Invalid image type"));
    }

    #[test]
    fn test_validate_image_rejects_missing_type() {
        let limits = LimitsConfig::default();
        assert!(validate_image(&image_field(None, 16), &limits).is_err());
    }

    #[test]
    fn test_validate_image_rejects_oversized_file() {
        let limits = LimitsConfig {
            max_image_bytes: 8,
            ..LimitsConfig::default()
        };
        let err = validate_image(&image_field(Some("image/png"), 9), &limits).unwrap_err();
        assert!(err.to_string().contains("Image too large"));
    }
}
