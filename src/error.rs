//! Error types for the PDF tools client

use crate::i18n::{Language, Message};
use thiserror::Error;

/// Result type alias for the PDF tools client
pub type Result<T> = std::result::Result<T, Error>;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the form field (wire name, e.g. `split_at_page`)
    pub field: &'static str,
    /// Human readable reason
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Error types for the PDF tools client
#[derive(Error, Debug)]
pub enum Error {
    /// One or more form fields failed validation
    #[error("Validation failed: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// The backend answered with an error status
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Selected file is missing
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Selected file is not a PDF
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// Response body exceeded the configured limit
    #[error("Response too large: {size} bytes (max: {max_size} bytes)")]
    ResponseTooLarge { size: u64, max_size: u64 },

    /// Backend returned a body the client could not interpret
    #[error("Unexpected response: {reason}")]
    UnexpectedResponse { reason: String },

    /// No session is stored
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Session exists but lacks the required role
    #[error("Admin role required")]
    Forbidden,

    /// A submission is already in flight for this operation
    #[error("Operation already in progress")]
    Busy,

    /// The operation was cancelled before the response arrived
    #[error("Operation cancelled")]
    Cancelled,

    /// Invalid client configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Return a sanitized error message safe to show to users.
    /// Internal details (paths, library errors) are omitted.
    /// Full details should be logged via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::Validation(errors) => format_field_errors(errors),
            Error::HttpStatus { status, message } if message.is_empty() => {
                format!("Request failed with status {}", status)
            }
            Error::HttpStatus { message, .. } => message.clone(),
            Error::HttpRequest(_) => "HTTP request failed".to_string(),
            Error::Io(_) => "I/O error".to_string(),
            Error::Serialization(_) => "Serialization error".to_string(),
            Error::FileNotFound { .. } => "File not found".to_string(),
            Error::InvalidPdf { reason } => format!("Invalid PDF file: {}", reason),
            Error::ResponseTooLarge { max_size, .. } => {
                format!("Response exceeds maximum size of {} bytes", max_size)
            }
            Error::UnexpectedResponse { .. } => "Unexpected response from server".to_string(),
            Error::NotAuthenticated => "Please log in first".to_string(),
            Error::Forbidden => "Administrator access required".to_string(),
            Error::Busy => "Operation already in progress".to_string(),
            Error::Cancelled => "Operation cancelled".to_string(),
            Error::InvalidConfig { reason } => format!("Invalid configuration: {}", reason),
        }
    }

    /// Convert into the single display string shown for a failed operation.
    ///
    /// `failure` is the operation's own localized failure message; backend
    /// detail is appended when the server sent any.
    pub fn localized_message(&self, language: Language, failure: Message) -> String {
        match self {
            Error::Validation(_) => self.client_message(),
            Error::HttpStatus { status: 401, .. } => {
                language.text(Message::SessionExpired).to_string()
            }
            Error::HttpStatus { message, .. } if !message.is_empty() => {
                format!("{} ({})", language.text(failure), message)
            }
            Error::HttpStatus { .. } | Error::HttpRequest(_) | Error::ResponseTooLarge { .. } => {
                language.text(failure).to_string()
            }
            Error::NotAuthenticated => language.text(Message::LoginRequired).to_string(),
            Error::Forbidden => language.text(Message::AdminRequired).to_string(),
            Error::Busy | Error::Cancelled | Error::InvalidPdf { .. } => self.client_message(),
            _ => language.text(Message::Unexpected).to_string(),
        }
    }

    /// Field errors carried by a validation failure, empty otherwise
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Error::Validation(errors) => errors,
            _ => &[],
        }
    }

    /// HTTP status code when the backend rejected the request
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::HttpRequest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
