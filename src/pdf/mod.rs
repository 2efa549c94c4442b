//! PDF tool layer
//!
//! The tool catalog, file selection, per-tool forms, and the operation that
//! sends a tool's request and saves the processed file.

pub mod download;
pub mod forms;
pub mod operation;
pub mod tools;
pub mod upload;

pub use download::{
    filename_from_disposition, resolve_filename, DirectorySink, Download, DownloadSink, MemorySink,
};
pub use forms::{
    can_submit, parse_page_order, validate_submission, ExtractPagesForm, MergeForm, PasswordForm,
    RemovePageForm, ReorderPagesForm, RotatePagesForm, SplitForm, ToImagesForm, ToolForm,
    WatermarkForm,
};
pub use operation::{CancelGuard, CancelHandle, OperationState, SavedDownload, ToolOperation};
pub use tools::{dashboard, ToolCard, ToolKind};
pub use upload::{FileUploader, MultiFileUploader, PdfFile};
