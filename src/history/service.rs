//! Admin history endpoints and the paged viewer state

use super::types::{HistoryPage, HistorySearch};
use crate::api::{ApiClient, ApiRequest, ResponseKind};
use crate::error::{Error, FieldError, Result};
use crate::i18n::Message;
use crate::pdf::{resolve_filename, Download, DownloadSink, SavedDownload};
use std::sync::Arc;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const EXPORT_FILENAME: &str = "pdf_operations_history.csv";

fn check_size(size: u32) -> Result<()> {
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(Error::Validation(vec![FieldError::new(
            "size",
            format!("must be between 1 and {}", MAX_PAGE_SIZE),
        )]));
    }
    Ok(())
}

/// Stateless access to `/history`. Every call requires an admin session.
#[derive(Clone)]
pub struct HistoryService {
    client: ApiClient,
    sink: Arc<dyn DownloadSink>,
}

impl HistoryService {
    pub fn new(client: ApiClient, sink: Arc<dyn DownloadSink>) -> Self {
        Self { client, sink }
    }

    fn require_admin(&self) -> Result<()> {
        let session = self.client.session();
        if !session.is_authenticated() {
            return Err(Error::NotAuthenticated);
        }
        if !session.is_admin() {
            return Err(Error::Forbidden);
        }
        Ok(())
    }

    pub async fn fetch(&self, page: u32, size: u32) -> Result<HistoryPage> {
        self.require_admin()?;
        check_size(size)?;

        let request = ApiRequest::get("/history", ResponseKind::Json)
            .query("page", page)
            .query("size", size);
        self.client.send(request).await?.into_json()
    }

    pub async fn search(
        &self,
        filters: &HistorySearch,
        page: u32,
        size: u32,
    ) -> Result<HistoryPage> {
        self.require_admin()?;
        check_size(size)?;

        let request = ApiRequest::post("/history/search", ResponseKind::Json)
            .query("page", page)
            .query("size", size)
            .json(filters)?;
        self.client.send(request).await?.into_json()
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.require_admin()?;
        self.client
            .send(ApiRequest::delete(format!("/history/{}", id)))
            .await?
            .into_empty()?;
        tracing::info!(id, "history entry deleted");
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<()> {
        self.require_admin()?;
        self.client
            .send(ApiRequest::delete("/history"))
            .await?
            .into_empty()?;
        tracing::info!("history cleared");
        Ok(())
    }

    /// Download the whole history as CSV through the sink
    pub async fn export(&self) -> Result<SavedDownload> {
        self.require_admin()?;

        let binary = self
            .client
            .send(ApiRequest::get("/history/export", ResponseKind::Binary))
            .await?
            .into_binary()?;

        let file_name = resolve_filename(binary.content_disposition.as_deref(), EXPORT_FILENAME);
        let size = binary.data.len();
        let path = self
            .sink
            .save(Download {
                file_name: file_name.clone(),
                content_type: Some("text/csv".to_string()),
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

/// Paged history view with an optional active search.
///
/// Deletes re-fetch the current page, keeping the active search. Failures
/// are kept as a localized message in [`AdminHistory::error`].
pub struct AdminHistory {
    service: HistoryService,
    page: u32,
    size: u32,
    search: Option<HistorySearch>,
    current: Option<HistoryPage>,
    error: Option<String>,
}

impl AdminHistory {
    pub fn new(service: HistoryService) -> Self {
        Self {
            service,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            search: None,
            current: None,
            error: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn active_search(&self) -> Option<&HistorySearch> {
        self.search.as_ref()
    }

    pub fn current(&self) -> Option<&HistoryPage> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Load a page, through the active search when there is one
    pub async fn load(&mut self, page: u32, size: u32) -> Result<&HistoryPage> {
        let result = match self.search {
            Some(ref filters) => self.service.search(filters, page, size).await,
            None => self.service.fetch(page, size).await,
        };
        let failure = if self.search.is_some() {
            Message::HistorySearchFailed
        } else {
            Message::HistoryFetchFailed
        };
        self.apply(result, failure)
    }

    /// Re-fetch the current page
    pub async fn refresh(&mut self) -> Result<&HistoryPage> {
        self.load(self.page, self.size).await
    }

    /// Activate `filters` and show their first page
    pub async fn search(&mut self, filters: HistorySearch) -> Result<&HistoryPage> {
        self.search_at(filters, 0, self.size).await
    }

    /// Activate `filters` and show the given page. Empty filters clear the search.
    pub async fn search_at(
        &mut self,
        filters: HistorySearch,
        page: u32,
        size: u32,
    ) -> Result<&HistoryPage> {
        self.search = (!filters.is_empty()).then_some(filters);
        self.load(page, size).await
    }

    pub async fn clear_search(&mut self) -> Result<&HistoryPage> {
        self.search = None;
        self.load(0, self.size).await
    }

    pub async fn next_page(&mut self) -> Result<&HistoryPage> {
        self.load(self.page + 1, self.size).await
    }

    pub async fn previous_page(&mut self) -> Result<&HistoryPage> {
        self.load(self.page.saturating_sub(1), self.size).await
    }

    pub async fn delete(&mut self, id: i64) -> Result<&HistoryPage> {
        self.error = None;
        let result = self.service.delete(id).await;
        if let Err(e) = result {
            return Err(self.fail(e, Message::HistoryDeleteFailed));
        }
        self.refresh().await
    }

    pub async fn delete_all(&mut self) -> Result<&HistoryPage> {
        self.error = None;
        let result = self.service.delete_all().await;
        if let Err(e) = result {
            return Err(self.fail(e, Message::HistoryDeleteAllFailed));
        }
        self.refresh().await
    }

    pub async fn export(&mut self) -> Result<SavedDownload> {
        self.error = None;
        let result = self.service.export().await;
        result.map_err(|e| self.fail(e, Message::HistoryExportFailed))
    }

    fn apply(&mut self, result: Result<HistoryPage>, failure: Message) -> Result<&HistoryPage> {
        self.error = None;
        match result {
            Ok(page) => {
                self.page = page.page;
                if page.size > 0 {
                    self.size = page.size;
                }
                Ok(self.current.insert(page))
            }
            Err(e) => Err(self.fail(e, failure)),
        }
    }

    fn fail(&mut self, error: Error, failure: Message) -> Error {
        tracing::warn!(error = %error, "history request failed");
        let language = self.service.client.session().language();
        self.error = Some(error.localized_message(language, failure));
        error
    }
}
