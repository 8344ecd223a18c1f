//! `multipart/form-data` parsing.
//!
//! Text fields become entries of a JSON object and file parts become
//! [`UploadedFile`]s, both in the order the client sent them.

use std::io;

use bytes::Bytes;
use hermes_core::UploadedFile;
use serde_json::Value;

use crate::query::{append, QueryMap};
use crate::{ExtractConfig, ExtractionError, ExtractionSource};

/// A fully read multipart form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    /// Text fields. Repeated names become arrays.
    pub fields: QueryMap,
    /// File parts in arrival order.
    pub files: Vec<UploadedFile>,
}

/// Reads every part of a multipart body.
///
/// # Errors
///
/// Fails when the boundary is missing from `content_type`, the body is
/// malformed, a field exceeds `max_field_size`, or there are more than
/// `max_fields` parts.
pub async fn read_multipart(
    content_type: &str,
    body: Bytes,
    config: &ExtractConfig,
) -> Result<MultipartForm, ExtractionError> {
    let boundary = multer::parse_boundary(content_type).map_err(|_| {
        ExtractionError::invalid_content_type("missing or invalid boundary in multipart Content-Type")
    })?;

    if body.len() > config.max_body_size {
        return Err(ExtractionError::payload_too_large(config.max_body_size));
    }

    let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = MultipartForm::default();
    let mut count = 0usize;

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        count += 1;
        if count > config.max_fields {
            return Err(ExtractionError::too_many_fields(config.max_fields));
        }

        let name = field.name().map(String::from);
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(ToString::to_string);
        let data = field.bytes().await.map_err(malformed)?;

        if data.len() > config.max_field_size {
            return Err(ExtractionError::payload_too_large(config.max_field_size));
        }

        if file_name.is_some() {
            form.files.push(UploadedFile {
                field_name: name,
                file_name,
                content_type,
                data,
            });
            continue;
        }

        let Some(name) = name else {
            continue;
        };
        let text = String::from_utf8(data.to_vec()).map_err(|e| {
            ExtractionError::malformed(
                ExtractionSource::Body,
                format!("field '{name}' is not valid UTF-8: {e}"),
            )
        })?;
        append(&mut form.fields, name, Value::String(text));
    }

    Ok(form)
}

fn malformed(error: multer::Error) -> ExtractionError {
    ExtractionError::malformed(ExtractionSource::Body, format!("multipart parse error: {error}"))
}
