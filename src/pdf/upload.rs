//! File selection for single and multi-file tools

use crate::error::{Error, FieldError, Result};
use std::path::Path;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A selected PDF, held in memory until submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl PdfFile {
    /// Wrap raw bytes, rejecting anything without a PDF header
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        // Validate PDF header
        if data.len() < 4 || &data[0..4] != b"%PDF" {
            return Err(Error::InvalidPdf {
                reason: "Not a valid PDF file".to_string(),
            });
        }

        Ok(Self {
            name: name.into(),
            data,
        })
    }

    /// Read a PDF from disk
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let data = tokio::fs::read(path).await.map_err(Error::Io)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        Self::from_bytes(name, data)
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Single file slot. Selecting again replaces the previous file.
#[derive(Debug, Default)]
pub struct FileUploader {
    file: Option<PdfFile>,
}

impl FileUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, file: PdfFile) {
        tracing::debug!(name = %file.name, size = file.size(), "file selected");
        self.file = Some(file);
    }

    pub async fn select_path<P: AsRef<Path>>(&mut self, path: P) -> Result<&PdfFile> {
        let file = PdfFile::open(path).await?;
        tracing::debug!(name = %file.name, size = file.size(), "file selected");
        Ok(&*self.file.insert(file))
    }

    pub fn clear(&mut self) {
        self.file = None;
    }

    pub fn file(&self) -> Option<&PdfFile> {
        self.file.as_ref()
    }

    pub fn take(&mut self) -> Option<PdfFile> {
        self.file.take()
    }
}

/// Ordered multi-file selection with an upper bound
#[derive(Debug)]
pub struct MultiFileUploader {
    files: Vec<PdfFile>,
    max_files: usize,
}

impl MultiFileUploader {
    pub fn new(max_files: usize) -> Self {
        Self {
            files: Vec::with_capacity(max_files),
            max_files,
        }
    }

    pub fn add(&mut self, file: PdfFile) -> Result<()> {
        if self.is_full() {
            return Err(Error::Validation(vec![FieldError::new(
                "files",
                format!("at most {} files can be selected", self.max_files),
            )]));
        }
        tracing::debug!(name = %file.name, index = self.files.len(), "file added");
        self.files.push(file);
        Ok(())
    }

    pub async fn add_path<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let file = PdfFile::open(path).await?;
        self.add(file)
    }

    pub fn remove(&mut self, index: usize) -> Option<PdfFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[PdfFile] {
        &self.files
    }

    pub fn into_files(self) -> Vec<PdfFile> {
        self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.files.len() >= self.max_files
    }
}
