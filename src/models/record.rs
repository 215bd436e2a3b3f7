//! Source records tracked in the record store.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FetchError;
use crate::models::FieldNames;
use crate::models::property::{PropertyValue, property_text};

/// A record as the store returns it: an id plus schema-tagged properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// Last recorded outcome of a source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordStatus {
    /// Never checked, or reset by an operator
    #[default]
    Default,
    Error,
    Updated,
    /// Any other operator-entered label (preserved, never processed)
    Other(String),
}

impl RecordStatus {
    /// Parse a status label. Blank labels count as `Default`.
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_lowercase().as_str() {
            "" | "default" => Self::Default,
            "error" => Self::Error,
            "updated" => Self::Updated,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => "Default",
            Self::Error => "Error",
            Self::Updated => "Updated",
            Self::Other(label) => label,
        }
    }

    /// Whether a record with this status is checked during a run.
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Default | Self::Error)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked blog or page plus its last-known article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub id: String,
    pub name: String,
    pub status: RecordStatus,
    pub feed_url: Option<String>,
    pub page_url: Option<String>,
    pub selector: Option<String>,
    pub last_title: String,
    pub last_url: String,
}

/// A page to scrape with a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget {
    pub url: String,
    pub selector: String,
}

/// How a record's latest item is extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPlan {
    /// Feed first, optionally falling back to a page selector
    Feed {
        url: String,
        fallback: Option<PageTarget>,
    },
    /// Page selector only
    Page(PageTarget),
}

impl FetchPlan {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Feed { fallback: None, .. } => "feed",
            Self::Feed {
                fallback: Some(_), ..
            } => "feed+selector",
            Self::Page(_) => "selector",
        }
    }
}

impl SourceRecord {
    /// Decode a raw record through the property accessor.
    pub fn from_raw(raw: &RawRecord, fields: &FieldNames) -> Self {
        let props = &raw.properties;
        Self {
            id: raw.id.clone(),
            name: property_text(props, &fields.name).trim().to_string(),
            status: RecordStatus::parse(&property_text(props, &fields.status)),
            feed_url: non_empty(property_text(props, &fields.feed_url)),
            page_url: non_empty(property_text(props, &fields.page_url)),
            selector: non_empty(property_text(props, &fields.selector)),
            last_title: property_text(props, &fields.last_title).trim().to_string(),
            last_url: property_text(props, &fields.last_url).trim().to_string(),
        }
    }

    /// Label used in log lines.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Choose the extraction strategy, or fail if none is configured.
    pub fn plan(&self) -> Result<FetchPlan, FetchError> {
        let page = match (&self.page_url, &self.selector) {
            (Some(url), Some(selector)) => Some(PageTarget {
                url: url.clone(),
                selector: selector.clone(),
            }),
            _ => None,
        };

        match (&self.feed_url, page) {
            (Some(url), fallback) => Ok(FetchPlan::Feed {
                url: url.clone(),
                fallback,
            }),
            (None, Some(page)) => Ok(FetchPlan::Page(page)),
            (None, None) => Err(FetchError::configuration(
                "no feed URL and no page URL with selector",
            )),
        }
    }
}

/// Partial update written back to the store. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpdate {
    pub status: RecordStatus,
    pub last_title: Option<String>,
    pub last_url: Option<String>,
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl RecordUpdate {
    /// Mark a record as failed, preserving its last-known item.
    pub fn error() -> Self {
        Self {
            status: RecordStatus::Error,
            last_title: None,
            last_url: None,
            last_updated_at: None,
        }
    }

    /// Record a newly detected item.
    pub fn updated(
        title: impl Into<String>,
        link: impl Into<String>,
        at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            status: RecordStatus::Updated,
            last_title: Some(title.into()),
            last_url: Some(link.into()),
            last_updated_at: at,
        }
    }

    /// Apply this update to a raw record's properties.
    ///
    /// A status property already tagged `status` keeps that tag; otherwise
    /// the status is written as a `select`.
    pub fn apply(&self, raw: &mut RawRecord, fields: &FieldNames) {
        let props = &mut raw.properties;

        let status_is_tagged_status = props
            .get(&fields.status)
            .map(PropertyValue::decode)
            .is_some_and(|v| matches!(v, PropertyValue::Status(_)));
        let status = if status_is_tagged_status {
            PropertyValue::Status(self.status.as_str().to_string())
        } else {
            PropertyValue::Select(self.status.as_str().to_string())
        };
        props.insert(fields.status.clone(), status.encode());

        if let Some(title) = &self.last_title {
            props.insert(
                fields.last_title.clone(),
                PropertyValue::RichText(title.clone()).encode(),
            );
        }
        if let Some(url) = &self.last_url {
            props.insert(
                fields.last_url.clone(),
                PropertyValue::Url(url.clone()).encode(),
            );
        }
        if let Some(at) = &self.last_updated_at {
            props.insert(
                fields.last_updated.clone(),
                PropertyValue::Date(at.to_rfc3339_opts(SecondsFormat::Secs, true)).encode(),
            );
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
