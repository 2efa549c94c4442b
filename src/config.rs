//! Client configuration

use crate::error::{Error, Result};
use crate::i18n::Language;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default backend location used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Value sent in the `X-Source-Type` header
pub const SOURCE_TYPE: &str = "FRONTEND";

pub const ENV_API_URL: &str = "PDF_TOOLS_API_URL";
pub const ENV_HOME: &str = "PDF_TOOLS_HOME";
pub const ENV_TIMEOUT_SECS: &str = "PDF_TOOLS_TIMEOUT_SECS";
pub const ENV_LANG: &str = "PDF_TOOLS_LANG";

/// Connection, storage and presentation settings for the client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Normalized API base URL (no trailing slash)
    pub base_url: Url,
    /// Per-request timeout (default: 120s)
    pub timeout: Duration,
    /// Maximum accepted response body size (default: 200MB)
    pub max_response_bytes: u64,
    /// Directory holding the persisted session file
    pub state_dir: PathBuf,
    /// Directory downloads are written into
    pub output_dir: PathBuf,
    /// UI language used when no preference is persisted
    pub language: Language,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: normalize_base_url(DEFAULT_API_URL)
                .unwrap_or_else(|_| Url::parse("http://localhost:8080/api").expect("static url")),
            timeout: Duration::from_secs(120),
            max_response_bytes: 200 * 1024 * 1024, // 200MB
            state_dir: default_state_dir(),
            output_dir: PathBuf::from("."),
            language: Language::En,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from `PDF_TOOLS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = normalize_base_url(&url)?;
        }

        if let Some(home) = lookup(ENV_HOME).filter(|v| !v.trim().is_empty()) {
            config.state_dir = PathBuf::from(home);
        }

        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| Error::InvalidConfig {
                reason: format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS),
            })?;
            if secs == 0 {
                return Err(Error::InvalidConfig {
                    reason: format!("{} must be greater than zero", ENV_TIMEOUT_SECS),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(lang) = lookup(ENV_LANG) {
            config.language = Language::from_code_lossy(&lang);
        }

        Ok(config)
    }

    /// Join an endpoint path (e.g. `/pdf/merge`) onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Normalize a user supplied API base URL.
///
/// Trailing slashes are stripped and a bare host is completed with `/api`.
pub fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| Error::InvalidConfig {
        reason: format!("invalid API URL {:?}: {}", raw, e),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidConfig {
            reason: format!("unsupported URL scheme: {}", url.scheme()),
        });
    }

    let path = url.path().trim_end_matches('/').to_string();
    if path.is_empty() {
        url.set_path("/api");
    } else {
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

fn default_state_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".pdf-tools"))
        .unwrap_or_else(|| PathBuf::from(".pdf-tools"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::HashMap;

    #[rstest]
    #[case("http://localhost:8080/api", "http://localhost:8080/api")]
    #[case("http://localhost:8080/api/", "http://localhost:8080/api")]
    #[case("http://localhost:8080", "http://localhost:8080/api")]
    #[case("https://pdf.example.com/", "https://pdf.example.com/api")]
    #[case("https://pdf.example.com/v2/api//", "https://pdf.example.com/v2/api")]
    fn test_normalize_base_url(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_base_url(raw).unwrap().as_str(), expected);
    }

    #[test]
    fn test_normalize_base_url_rejects_garbage() {
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(Error::InvalidConfig { .. })
        ));
        assert!(matches!(
            normalize_base_url("ftp://example.com"),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_endpoint_join() {
        let config = ClientConfig::default();
        assert_eq!(
            config.endpoint("/pdf/merge"),
            "http://localhost:8080/api/pdf/merge"
        );
        assert_eq!(
            config.endpoint("history"),
            "http://localhost:8080/api/history"
        );
    }

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.max_response_bytes, 200 * 1024 * 1024);
        assert_eq!(config.language, Language::En);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_URL, "https://pdf.example.com"),
            (ENV_HOME, "/tmp/pdf-tools-home"),
            (ENV_TIMEOUT_SECS, "30"),
            (ENV_LANG, "sk"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.base_url.as_str(), "https://pdf.example.com/api");
        assert_eq!(config.state_dir, PathBuf::from("/tmp/pdf-tools-home"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.language, Language::Sk);
    }

    #[test]
    fn test_from_lookup_rejects_zero_timeout() {
        let result = ClientConfig::from_lookup(|k| {
            (k == ENV_TIMEOUT_SECS).then(|| "0".to_string())
        });
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }
}
