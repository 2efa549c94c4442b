//! PDF Tools client library
//!
//! Client side of a PDF processing service. The backend does the actual PDF
//! work; this crate provides:
//! - `session`: authenticated session, persisted across runs, and route guards
//! - `api`: the configured HTTP client every request goes through
//! - `auth`: login, registration and logout
//! - `pdf`: the ten PDF tools (merge, split, remove / extract / reorder pages,
//!   add / remove password, watermark, rotate, convert to images)
//! - `history`: the admin operation history viewer
//! - `cli`: the `pdf-tools` command-line front end

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod i18n;
pub mod pdf;
pub mod session;

pub use api::{ApiClient, ApiResponse, HttpTransport, Transport};
pub use auth::{AuthService, LoginCredentials, RegisterForm};
pub use cli::{run, App, Cli};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use history::{AdminHistory, HistoryService};
pub use i18n::{Language, Message};
pub use pdf::{ToolForm, ToolKind, ToolOperation};
pub use session::{Role, Session, SessionStore};
