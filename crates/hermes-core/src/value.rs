//! Parameter values flowing between request resolution and validation.

use bytes::Bytes;
use serde_json::Value;

/// A file received in a `multipart/form-data` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Form field name the file was sent under.
    pub field_name: Option<String>,
    /// Original file name supplied by the client.
    pub file_name: Option<String>,
    /// Content-Type of the part.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

impl UploadedFile {
    /// Creates a file with contents and no metadata.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            field_name: None,
            file_name: None,
            content_type: None,
            data: data.into(),
        }
    }

    /// Sets the form field name.
    #[must_use]
    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = Some(name.into());
        self
    }

    /// Sets the client-supplied file name.
    #[must_use]
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Sets the part's content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` for a zero-byte file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A raw or validated parameter value.
///
/// JSON covers everything except uploads, which keep their bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A JSON value (strings from the path, query and headers included).
    Json(Value),
    /// A single uploaded file.
    File(UploadedFile),
    /// Several uploaded files.
    Files(Vec<UploadedFile>),
}

impl ParamValue {
    /// Borrows the JSON value, if this is one.
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes into the JSON value, if this is one.
    #[must_use]
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Borrows the uploaded file, if this is one.
    #[must_use]
    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }

    /// Borrows the uploaded files, if this is a file list.
    #[must_use]
    pub fn as_files(&self) -> Option<&[UploadedFile]> {
        match self {
            Self::Files(files) => Some(files),
            _ => None,
        }
    }

    /// Returns `true` for JSON `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Json(Value::Null))
    }

    /// JSON rendering used when recording an offending value.
    #[must_use]
    pub fn describe(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::File(file) => describe_file(file),
            Self::Files(files) => Value::Array(files.iter().map(describe_file).collect()),
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Json(Value::String(value.to_string()))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Json(Value::String(value))
    }
}

impl From<UploadedFile> for ParamValue {
    fn from(file: UploadedFile) -> Self {
        Self::File(file)
    }
}

impl From<Vec<UploadedFile>> for ParamValue {
    fn from(files: Vec<UploadedFile>) -> Self {
        Self::Files(files)
    }
}

fn describe_file(file: &UploadedFile) -> Value {
    serde_json::json!({
        "fieldname": file.field_name,
        "originalname": file.file_name,
        "mimetype": file.content_type,
        "size": file.len(),
    })
}
