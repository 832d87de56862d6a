use camino::Utf8Path;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::ApiError;

/// A file attached to a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    /// Read a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(field: &str, path: &Utf8Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read {path}: {e}")))?;
        let file_name = path.file_name().unwrap_or(path.as_str()).to_string();

        Ok(Self {
            field: field.to_string(),
            mime: mime_guess::from_path(path).first_or_octet_stream().to_string(),
            file_name,
            bytes,
        })
    }
}

/// Binary form payload; sent as `multipart/form-data`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    /// Flatten a serializable payload into text fields. Strings are sent raw,
    /// arrays and objects as JSON text, nulls are skipped.
    pub fn from_serializable<T: Serialize>(payload: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(payload)
            .map_err(|e| ApiError::Transport(format!("Failed to encode form: {e}")))?;

        let mut form = Self::new();
        if let Value::Object(map) = value {
            for (key, value) in map {
                match value {
                    Value::Null => {}
                    Value::String(s) => form.fields.push((key, s)),
                    other => form.fields.push((key, other.to_string())),
                }
            }
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(FormPayload),
}

/// The options bag passed to [`ApiClient::request`](super::ApiClient::request).
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn json<T: Serialize>(mut self, payload: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(payload)
            .map_err(|e| ApiError::Transport(format!("Failed to encode request body: {e}")))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    pub fn multipart(mut self, form: FormPayload) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreparedBody {
    Json(Value),
    Multipart(FormPayload),
}

/// Fully resolved request handed to a [`Transport`](super::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<PreparedBody>,
}

impl PreparedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
