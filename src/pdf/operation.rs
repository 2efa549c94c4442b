//! Submission of one tool's request and delivery of its result
//!
//! A [`ToolOperation`] moves `Idle -> Submitting -> Idle`. While submitting,
//! a second submit is refused with [`Error::Busy`]. A successful response is
//! delivered to the download sink exactly once; any status >= 400 produces a
//! localized message and no download.

use super::download::{resolve_filename, Download, DownloadSink};
use super::forms::{validate_submission, ToolForm};
use super::tools::ToolKind;
use super::upload::{PdfFile, PDF_CONTENT_TYPE};
use crate::api::{ApiClient, ApiRequest, MultipartBody, ResponseKind};
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Idle,
    Submitting,
}

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDownload {
    pub file_name: String,
    pub path: PathBuf,
    pub size: usize,
}

/// Cancels the owning operation's in-flight request
#[derive(Debug, Clone)]
pub struct CancelHandle {
    signal: Arc<watch::Sender<u64>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.signal.send_modify(|generation| *generation += 1);
    }
}

/// Cancels on drop. Hold it for as long as the result is wanted.
#[derive(Debug)]
pub struct CancelGuard {
    handle: CancelHandle,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

/// Multipart field names of the uploaded files
fn file_fields(kind: ToolKind) -> &'static [&'static str] {
    match kind {
        ToolKind::Merge => &["first_pdf", "second_pdf"],
        _ => &["pdf"],
    }
}

/// Build the multipart body for a validated submission
pub fn build_body(files: &[PdfFile], form: &ToolForm) -> Result<MultipartBody> {
    validate_submission(files.len(), form)?;

    let mut body = MultipartBody::new();
    for (field, file) in file_fields(form.kind()).iter().zip(files) {
        body = body.file(field, file.name.clone(), PDF_CONTENT_TYPE, file.data.clone());
    }
    for (name, value) in form.fields()? {
        body = body.text(name, value);
    }
    Ok(body)
}

struct SubmittingGuard<'a> {
    state: &'a Mutex<OperationState>,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock() = OperationState::Idle;
    }
}

/// One PDF tool bound to the shared client and a download sink
pub struct ToolOperation {
    kind: ToolKind,
    client: ApiClient,
    sink: Arc<dyn DownloadSink>,
    state: Mutex<OperationState>,
    last_error: Mutex<Option<String>>,
    cancel: Arc<watch::Sender<u64>>,
}

impl ToolOperation {
    pub fn new(kind: ToolKind, client: ApiClient, sink: Arc<dyn DownloadSink>) -> Self {
        let (cancel, _) = watch::channel(0);
        Self {
            kind,
            client,
            sink,
            state: Mutex::new(OperationState::Idle),
            last_error: Mutex::new(None),
            cancel: Arc::new(cancel),
        }
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn state(&self) -> OperationState {
        *self.state.lock()
    }

    pub fn is_submitting(&self) -> bool {
        self.state() == OperationState::Submitting
    }

    /// Localized message of the most recent failure, cleared on the next submit
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            signal: self.cancel.clone(),
        }
    }

    /// Guard that cancels any in-flight submission when dropped
    pub fn cancel_guard(&self) -> CancelGuard {
        CancelGuard {
            handle: self.cancel_handle(),
        }
    }

    /// Submit and wait for the result, cancellable through this operation's
    /// [`CancelHandle`]s and [`CancelGuard`]s
    pub async fn submit(&self, files: &[PdfFile], form: &ToolForm) -> Result<SavedDownload> {
        let mut cancelled = self.cancel.subscribe();
        self.submit_with_cancel(files, form, async move {
            // A closed channel can never signal; wait forever
            if cancelled.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Submit, abandoning the request as soon as `cancel` completes
    pub async fn submit_with_cancel<C>(
        &self,
        files: &[PdfFile],
        form: &ToolForm,
        cancel: C,
    ) -> Result<SavedDownload>
    where
        C: Future<Output = ()> + Send,
    {
        if form.kind() != self.kind {
            return Err(Error::InvalidConfig {
                reason: format!("{} form given to {} operation", form.kind(), self.kind),
            });
        }

        let _submitting = self.begin()?;
        *self.last_error.lock() = None;

        // Cancellation is checked first on every poll
        let result = tokio::select! {
            biased;
            _ = cancel => {
                tracing::info!(tool = %self.kind, "submission cancelled");
                Err(Error::Cancelled)
            }
            result = self.run(files, form) => result,
        };

        if let Err(ref e) = result {
            tracing::warn!(tool = %self.kind, error = %e, "operation failed");
            *self.last_error.lock() = Some(self.error_message(e));
        }
        result
    }

    /// Localized display text for an error produced by this operation
    pub fn error_message(&self, error: &Error) -> String {
        error.localized_message(self.client.session().language(), self.kind.failure())
    }

    fn begin(&self) -> Result<SubmittingGuard<'_>> {
        let mut state = self.state.lock();
        if *state == OperationState::Submitting {
            return Err(Error::Busy);
        }
        *state = OperationState::Submitting;
        Ok(SubmittingGuard { state: &self.state })
    }

    async fn run(&self, files: &[PdfFile], form: &ToolForm) -> Result<SavedDownload> {
        let body = build_body(files, form)?;
        tracing::info!(tool = %self.kind, endpoint = self.kind.endpoint(), "submitting");

        let request = ApiRequest::post(self.kind.endpoint(), ResponseKind::Binary).multipart(body);
        let binary = self.client.send(request).await?.into_binary()?;

        let file_name = resolve_filename(
            binary.content_disposition.as_deref(),
            self.kind.default_filename(),
        );
        let size = binary.data.len();
        let path = self
            .sink
            .save(Download {
                file_name: file_name.clone(),
                content_type: binary.content_type,
                data: binary.data,
            })
            .await?;

        Ok(SavedDownload {
            file_name,
            path,
            size,
        })
    }
}
