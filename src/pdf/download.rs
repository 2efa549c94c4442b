//! Response-to-file delivery

use crate::error::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static FILENAME_EXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)filename\*\s*=\s*(?:[\w-]+'[\w-]*')?"?([^";]+)"?"#)
        .expect("valid filename* regex")
});

static FILENAME_QUOTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|;)\s*filename\s*=\s*"((?:[^"\\]|\\.)*)""#)
        .expect("valid quoted filename regex")
});

static FILENAME_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|;)\s*filename\s*=\s*([^;\s"]+)"#).expect("valid filename regex")
});

/// File name carried by a `Content-Disposition` header.
///
/// The RFC 5987 `filename*` form wins over plain `filename`. The result is
/// reduced to a bare file name.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    if let Some(caps) = FILENAME_EXT_RE.captures(header) {
        let raw = caps[1].trim();
        let decoded = urlencoding::decode(raw)
            .map(|c| c.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        if let Some(name) = sanitize_filename(&decoded) {
            return Some(name);
        }
    }

    // A quoted value may contain `;`
    if let Some(caps) = FILENAME_QUOTED_RE.captures(header) {
        return sanitize_filename(&unquote(&caps[1]));
    }
    FILENAME_TOKEN_RE
        .captures(header)
        .and_then(|caps| sanitize_filename(&caps[1]))
}

/// Undo backslash escapes of a quoted-string
fn unquote(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            _ => out.push(c),
        }
    }
    out
}

/// Strip directory components; `None` when nothing usable remains
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('"');
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();

    match cleaned.as_str() {
        "" | "." | ".." => None,
        _ => Some(cleaned),
    }
}

/// Header file name, or `fallback` when the header is missing or unusable
pub fn resolve_filename(disposition: Option<&str>, fallback: &str) -> String {
    disposition
        .and_then(filename_from_disposition)
        .unwrap_or_else(|| fallback.to_string())
}

/// A file ready to be handed to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Destination for finished downloads
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Deliver one file and report where it ended up
    async fn save(&self, download: Download) -> Result<PathBuf>;
}

/// Writes downloads into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn save(&self, download: Download) -> Result<PathBuf> {
        // Download names come from the server; never let them escape the directory
        let file_name = sanitize_filename(&download.file_name)
            .unwrap_or_else(|| "download".to_string());
        let path = self.dir.join(file_name);

        // Create parent directories if they don't exist
        if !self.dir.as_os_str().is_empty() && !self.dir.exists() {
            tokio::fs::create_dir_all(&self.dir).await?;
        }

        tokio::fs::write(&path, &download.data).await?;
        tracing::info!(path = %path.display(), size = download.data.len(), "download saved");
        Ok(path)
    }
}

/// Keeps downloads in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    downloads: Mutex<Vec<Download>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.downloads.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.downloads.lock().is_empty()
    }
}

#[async_trait]
impl DownloadSink for MemorySink {
    async fn save(&self, download: Download) -> Result<PathBuf> {
        let path = PathBuf::from(&download.file_name);
        self.downloads.lock().push(download);
        Ok(path)
    }
}
