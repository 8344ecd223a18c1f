//! Request body reading and content-type dispatch.

use bytes::Bytes;
use hermes_core::UploadedFile;
use http::{header, HeaderMap};
use http_body::Body;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::Value;
use tracing::debug;

use crate::multipart::read_multipart;
use crate::query::parse_form;
use crate::{ExtractConfig, ExtractionError, ExtractionSource};

/// A parsed request payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    /// Parsed body. `Null` when the request had no body.
    ///
    /// JSON bodies are kept as sent; URL-encoded and multipart text fields
    /// become an object of strings.
    pub body: Value,
    /// Uploaded files, in arrival order.
    pub files: Vec<UploadedFile>,
}

/// Reads a body into memory, failing once it exceeds `limit` bytes.
///
/// # Errors
///
/// Returns `413` when the limit is hit and `400` when the body stream fails.
pub async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, ExtractionError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(error) if error.is::<LengthLimitError>() => {
            Err(ExtractionError::payload_too_large(limit))
        }
        Err(error) => Err(ExtractionError::read_failed(error.to_string())),
    }
}

/// Parses `body` according to the request's `Content-Type`.
///
/// | Content type | Result |
/// |---|---|
/// | none, empty body | `Null` |
/// | `application/json`, `*+json` | parsed JSON |
/// | `application/x-www-form-urlencoded` | object of strings |
/// | `multipart/form-data` | object of text fields + files |
/// | `text/*` | string |
///
/// A body without a content type is parsed as JSON.
///
/// # Example
///
/// ```rust
/// use hermes_extract::{parse_payload, ExtractConfig};
/// use http::{header, HeaderMap, HeaderValue};
/// use serde_json::json;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let mut headers = HeaderMap::new();
/// headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
///
/// let payload = parse_payload(&headers, r#"{"a":1}"#.into(), &ExtractConfig::default())
///     .await
///     .unwrap();
/// assert_eq!(payload.body, json!({"a": 1}));
/// # });
/// ```
pub async fn parse_payload(
    headers: &HeaderMap,
    body: Bytes,
    config: &ExtractConfig,
) -> Result<Payload, ExtractionError> {
    if body.len() > config.max_body_size {
        return Err(ExtractionError::payload_too_large(config.max_body_size));
    }

    let content_type = match headers.get(header::CONTENT_TYPE) {
        Some(value) => Some(value.to_str().map_err(|_| {
            ExtractionError::invalid_content_type("invalid UTF-8 in Content-Type header")
        })?),
        None => None,
    };

    if body.is_empty() {
        return Ok(Payload::default());
    }

    let Some(raw) = content_type else {
        debug!("no content type, parsing body as JSON");
        return parse_json(&body).map(|body| Payload {
            body,
            files: Vec::new(),
        });
    };

    let mime: mime::Mime = raw
        .parse()
        .map_err(|_| ExtractionError::unsupported_media_type(Some(raw)))?;

    match (mime.type_(), mime.subtype()) {
        (mime::APPLICATION, mime::JSON) => Ok(json_payload(&body)?),
        (mime::APPLICATION, _) if mime.suffix() == Some(mime::JSON) => Ok(json_payload(&body)?),
        (mime::APPLICATION, mime::WWW_FORM_URLENCODED) => Ok(Payload {
            body: Value::Object(parse_form(&body)?),
            files: Vec::new(),
        }),
        (mime::MULTIPART, mime::FORM_DATA) => {
            let form = read_multipart(raw, body, config).await?;
            Ok(Payload {
                body: Value::Object(form.fields),
                files: form.files,
            })
        }
        (mime::TEXT, _) => {
            let text = String::from_utf8(body.to_vec()).map_err(|e| {
                ExtractionError::malformed(ExtractionSource::Body, e.to_string())
            })?;
            Ok(Payload {
                body: Value::String(text),
                files: Vec::new(),
            })
        }
        _ => Err(ExtractionError::unsupported_media_type(Some(raw))),
    }
}

fn json_payload(body: &[u8]) -> Result<Payload, ExtractionError> {
    Ok(Payload {
        body: parse_json(body)?,
        files: Vec::new(),
    })
}

fn parse_json(body: &[u8]) -> Result<Value, ExtractionError> {
    serde_json::from_slice(body)
        .map_err(|e| ExtractionError::malformed(ExtractionSource::Body, e.to_string()))
}
