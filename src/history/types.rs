//! History wire types

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One logged PDF operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    #[serde(alias = "userId")]
    pub user_id: i64,
    #[serde(default, alias = "userName", alias = "username")]
    pub user_name: Option<String>,
    #[serde(default, alias = "userEmail")]
    pub user_email: Option<String>,
    #[serde(alias = "operationType", alias = "operation")]
    pub operation_type: String,
    #[serde(default, alias = "sourceType")]
    pub source_type: Option<String>,
    #[serde(default, alias = "ipAddress")]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, alias = "userAgent")]
    pub user_agent: Option<String>,
    #[serde(alias = "createdAt")]
    pub timestamp: String,
    #[serde(default, alias = "requestDetails", alias = "details")]
    pub request_details: Option<String>,
}

impl HistoryRecord {
    /// Timestamp as UTC. Offset-less values are taken as UTC.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Best available name for the user
    pub fn user_label(&self) -> String {
        self.user_name
            .clone()
            .or_else(|| self.user_email.clone())
            .unwrap_or_else(|| format!("#{}", self.user_id))
    }
}

/// A page of history records. `page` is 0-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(alias = "content")]
    pub items: Vec<HistoryRecord>,
    #[serde(alias = "totalElements")]
    pub total: u64,
    #[serde(alias = "number")]
    pub page: u32,
    pub size: u32,
    #[serde(alias = "totalPages")]
    pub pages: u32,
}

impl HistoryPage {
    pub fn has_next(&self) -> bool {
        self.page + 1 < self.pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }
}

/// Search filters; unset filters are not sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
}

impl HistorySearch {
    pub fn is_empty(&self) -> bool {
        self == &HistorySearch::default()
    }
}
