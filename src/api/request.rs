//! Request and response types exchanged with the backend

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt;

/// HTTP method subset used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        })
    }
}

/// How the caller wants the response body interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Binary,
    Json,
    Empty,
}

/// One field of a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File {
        file_name: String,
        content_type: String,
        data: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub value: PartValue,
}

/// Multipart form body, kept inspectable until the transport encodes it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    parts: Vec<Part>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parts.push(Part {
            name: name.to_string(),
            value: PartValue::Text(value.into()),
        });
        self
    }

    /// Add a text field only when a value is present
    pub fn text_opt(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.text(name, v),
            None => self,
        }
    }

    pub fn file(
        mut self,
        name: &str,
        file_name: impl Into<String>,
        content_type: &str,
        data: Vec<u8>,
    ) -> Self {
        self.parts.push(Part {
            name: name.to_string(),
            value: PartValue::File {
                file_name: file_name.into(),
                content_type: content_type.to_string(),
                data,
            },
        });
        self
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<Part> {
        self.parts
    }

    /// First text value stored under `name`
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|p| match &p.value {
            PartValue::Text(v) if p.name == name => Some(v.as_str()),
            _ => None,
        })
    }

    /// File name of the first file part stored under `name`
    pub fn file_name(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|p| match &p.value {
            PartValue::File { file_name, .. } if p.name == name => Some(file_name.as_str()),
            _ => None,
        })
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    None,
    Json(serde_json::Value),
    Multipart(MultipartBody),
}

/// A request expressed against an endpoint path, before headers are attached
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub expect: ResponseKind,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, expect: ResponseKind) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::None,
            expect,
        }
    }

    pub fn get(path: impl Into<String>, expect: ResponseKind) -> Self {
        Self::new(Method::Get, path, expect)
    }

    pub fn post(path: impl Into<String>, expect: ResponseKind) -> Self {
        Self::new(Method::Post, path, expect)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path, ResponseKind::Empty)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json<T: serde::Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = RequestBody::Multipart(body);
        self
    }
}

/// Request with absolute URL and headers, as handed to a transport
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl PreparedRequest {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn multipart(&self) -> Option<&MultipartBody> {
        match &self.body {
            RequestBody::Multipart(m) => Some(m),
            _ => None,
        }
    }
}

/// Undecoded response as produced by a transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Header names are lowercased
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Binary payload of a successful response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryBody {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
}

/// Explicitly tagged outcome of an API call
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Binary(BinaryBody),
    Json(serde_json::Value),
    Empty,
    Error { status: u16, message: String },
}

impl ApiResponse {
    /// Interpret a raw response according to what the caller expects
    pub fn from_raw(raw: RawResponse, expect: ResponseKind) -> Result<Self> {
        if raw.is_error() {
            return Ok(ApiResponse::Error {
                status: raw.status,
                message: error_message(&raw.body),
            });
        }

        match expect {
            ResponseKind::Binary => Ok(ApiResponse::Binary(BinaryBody {
                content_type: raw.header("content-type").map(str::to_string),
                content_disposition: raw.header("content-disposition").map(str::to_string),
                data: raw.body,
            })),
            ResponseKind::Json => {
                let value = serde_json::from_slice(&raw.body).map_err(|e| {
                    Error::UnexpectedResponse {
                        reason: format!("invalid JSON body: {}", e),
                    }
                })?;
                Ok(ApiResponse::Json(value))
            }
            ResponseKind::Empty => Ok(ApiResponse::Empty),
        }
    }

    pub fn into_binary(self) -> Result<BinaryBody> {
        match self {
            ApiResponse::Binary(body) => Ok(body),
            ApiResponse::Error { status, message } => Err(Error::HttpStatus { status, message }),
            other => Err(unexpected("binary", &other)),
        }
    }

    pub fn into_json<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            ApiResponse::Json(value) => Ok(serde_json::from_value(value)?),
            ApiResponse::Error { status, message } => Err(Error::HttpStatus { status, message }),
            other => Err(unexpected("JSON", &other)),
        }
    }

    pub fn into_empty(self) -> Result<()> {
        match self {
            ApiResponse::Error { status, message } => Err(Error::HttpStatus { status, message }),
            _ => Ok(()),
        }
    }
}

fn unexpected(wanted: &str, got: &ApiResponse) -> Error {
    let got = match got {
        ApiResponse::Binary(_) => "binary",
        ApiResponse::Json(_) => "JSON",
        ApiResponse::Empty => "empty",
        ApiResponse::Error { .. } => "error",
    };
    Error::UnexpectedResponse {
        reason: format!("expected {} response, got {}", wanted, got),
    }
}

/// Extract a human readable message from an error body.
///
/// Understands `{"detail": ..}`, `{"message": ..}`, `{"error": ..}` and
/// plain text bodies.
pub fn error_message(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["detail", "message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.trim().to_string();
            }
        }
        if let Some(text) = value.as_str() {
            return text.trim().to_string();
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    // HTML error pages carry nothing useful for the user
    if text.starts_with('<') {
        return String::new();
    }
    text.chars().take(500).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(br#"{"detail":"File must be PDF format"}"#.as_slice(), "File must be PDF format")]
    #[case(br#"{"message":"Bad credentials"}"#.as_slice(), "Bad credentials")]
    #[case(b"Page order list cannot be empty".as_slice(), "Page order list cannot be empty")]
    #[case(b"<html><body>502</body></html>".as_slice(), "")]
    #[case(b"".as_slice(), "")]
    fn test_error_message(#[case] body: &[u8], #[case] expected: &str) {
        assert_eq!(error_message(body), expected);
    }

    #[test]
    fn test_from_raw_error_status() {
        let raw = RawResponse::new(400, r#"{"detail":"nope"}"#);
        let response = ApiResponse::from_raw(raw, ResponseKind::Binary).unwrap();
        assert_eq!(
            response,
            ApiResponse::Error {
                status: 400,
                message: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_from_raw_binary_keeps_headers() {
        let raw = RawResponse::new(200, b"%PDF-1.7".to_vec())
            .with_header("Content-Type", "application/pdf")
            .with_header("Content-Disposition", "attachment; filename=\"out.pdf\"");
        let body = ApiResponse::from_raw(raw, ResponseKind::Binary)
            .unwrap()
            .into_binary()
            .unwrap();
        assert_eq!(body.data, b"%PDF-1.7");
        assert_eq!(body.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(
            body.content_disposition.as_deref(),
            Some("attachment; filename=\"out.pdf\"")
        );
    }

    #[test]
    fn test_from_raw_invalid_json() {
        let raw = RawResponse::new(200, "not json");
        let result = ApiResponse::from_raw(raw, ResponseKind::Json);
        assert!(matches!(result, Err(Error::UnexpectedResponse { .. })));
    }

    #[test]
    fn test_into_binary_from_json_is_unexpected() {
        let response = ApiResponse::Json(serde_json::json!({}));
        assert!(matches!(
            response.into_binary(),
            Err(Error::UnexpectedResponse { .. })
        ));
    }

    #[test]
    fn test_multipart_accessors() {
        let body = MultipartBody::new()
            .file("pdf", "a.pdf", "application/pdf", b"%PDF".to_vec())
            .text("pages", "1,2")
            .text_opt("output_name", None::<String>);

        assert_eq!(body.field_names(), vec!["pdf", "pages"]);
        assert_eq!(body.text_value("pages"), Some("1,2"));
        assert_eq!(body.file_name("pdf"), Some("a.pdf"));
        assert_eq!(body.text_value("output_name"), None);
    }
}
