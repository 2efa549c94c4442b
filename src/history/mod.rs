//! Admin operation history: listing, search, deletion and CSV export

pub mod service;
pub mod types;

pub use service::{AdminHistory, HistoryService, DEFAULT_PAGE_SIZE, EXPORT_FILENAME, MAX_PAGE_SIZE};
pub use types::{HistoryPage, HistoryRecord, HistorySearch};
