//! Schema-tagged record properties.
//!
//! Each property in the record store is a JSON object tagged by `type`
//! (`title`, `rich_text`, `select`, `status`, `url`, `date`). Decoding is
//! total: a missing property or an unexpected shape yields empty text, so a
//! single odd field never fails the pipeline.

use serde_json::{Map, Value, json};

/// A decoded property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Title(String),
    RichText(String),
    Select(String),
    Status(String),
    Url(String),
    Date(String),
    Unsupported,
}

impl PropertyValue {
    /// Decode a tagged property object.
    pub fn decode(value: &Value) -> Self {
        let Some(tag) = value.get("type").and_then(Value::as_str) else {
            return Self::Unsupported;
        };

        match tag {
            "title" => Self::Title(join_segments(value.get("title"))),
            "rich_text" => Self::RichText(join_segments(value.get("rich_text"))),
            "select" => Self::Select(option_name(value.get("select"))),
            "status" => Self::Status(option_name(value.get("status"))),
            "url" => Self::Url(string_or_empty(value.get("url"))),
            "date" => Self::Date(string_or_empty(
                value.get("date").and_then(|d| d.get("start")),
            )),
            _ => Self::Unsupported,
        }
    }

    /// Plain text of the value, empty for unsupported properties.
    pub fn as_text(&self) -> &str {
        match self {
            Self::Title(s)
            | Self::RichText(s)
            | Self::Select(s)
            | Self::Status(s)
            | Self::Url(s)
            | Self::Date(s) => s,
            Self::Unsupported => "",
        }
    }

    /// Encode back to the tagged JSON shape the store understands.
    pub fn encode(&self) -> Value {
        match self {
            Self::Title(s) => json!({ "type": "title", "title": text_segments(s) }),
            Self::RichText(s) => json!({ "type": "rich_text", "rich_text": text_segments(s) }),
            Self::Select(s) => json!({ "type": "select", "select": named_option(s) }),
            Self::Status(s) => json!({ "type": "status", "status": named_option(s) }),
            Self::Url(s) if s.is_empty() => json!({ "type": "url", "url": null }),
            Self::Url(s) => json!({ "type": "url", "url": s }),
            Self::Date(s) => json!({ "type": "date", "date": { "start": s } }),
            Self::Unsupported => Value::Null,
        }
    }
}

/// Read a property as text, empty if absent or of unexpected shape.
pub fn property_text(properties: &Map<String, Value>, key: &str) -> String {
    properties
        .get(key)
        .map(PropertyValue::decode)
        .map(|v| v.as_text().to_string())
        .unwrap_or_default()
}

fn join_segments(value: Option<&Value>) -> String {
    let Some(segments) = value.and_then(Value::as_array) else {
        return String::new();
    };

    segments
        .iter()
        .filter_map(|segment| {
            segment
                .get("plain_text")
                .and_then(Value::as_str)
                .or_else(|| {
                    segment
                        .get("text")
                        .and_then(|t| t.get("content"))
                        .and_then(Value::as_str)
                })
        })
        .collect()
}

fn option_name(value: Option<&Value>) -> String {
    string_or_empty(value.and_then(|v| v.get("name")))
}

fn string_or_empty(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn text_segments(content: &str) -> Value {
    if content.is_empty() {
        return json!([]);
    }
    json!([{
        "type": "text",
        "text": { "content": content },
        "plain_text": content,
    }])
}

fn named_option(name: &str) -> Value {
    if name.is_empty() {
        Value::Null
    } else {
        json!({ "name": name })
    }
}
