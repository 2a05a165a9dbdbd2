//! Wire and result types shared by the transport and the services.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Phase;

// ============ Request ============

/// HTTP verbs used against the Cloudflare API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical API call. `path` is relative to the fixed API base and must
/// only contain identifiers that already passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Page-based pagination. Pages are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    /// Requested values, falling back to page 1 and `max_per_page`.
    pub fn new(page: Option<u32>, per_page: Option<u32>, max_per_page: u32) -> Self {
        Self {
            page: page.unwrap_or(1),
            per_page: per_page.unwrap_or(max_per_page),
        }
        .validated(max_per_page)
    }

    /// Clamp `page` to `>= 1` and `per_page` to `1..=max_per_page`.
    #[must_use]
    pub fn validated(self, max_per_page: u32) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, max_per_page),
        }
    }
}

/// Builder for query strings that skips absent and empty values.
#[derive(Debug, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn set_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.set(key, v),
            _ => self,
        }
    }

    pub fn into_vec(self) -> Vec<(String, String)> {
        self.0
    }
}

// ============ Response ============

/// Cloudflare API response envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ApiMessage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<Value>,
}

/// One entry of the envelope's `errors` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl ApiEnvelope {
    /// A successful envelope wrapping `result`.
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            result,
            ..Self::default()
        }
    }

    /// First `(code, message)` pair, or a generic placeholder.
    pub fn first_error(&self) -> (i64, String) {
        self.errors
            .as_ref()
            .and_then(|errors| errors.first())
            .map_or_else(
                || (0, "Unknown error".to_string()),
                |e| (e.code, e.message.clone()),
            )
    }

    /// `retry_after` as seconds, accepting a number or a numeric string.
    pub fn retry_after_hint(&self) -> Option<u64> {
        match self.retry_after.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// `result` as a list; anything else is treated as empty.
    pub fn result_list(&self) -> Vec<Value> {
        self.result.as_array().cloned().unwrap_or_default()
    }

    /// `result` as-is, with `null` replaced by `{}`.
    pub fn result_object(&self) -> Value {
        if self.result.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            self.result.clone()
        }
    }

    /// `result_info` or `{}`.
    pub fn result_info_or_empty(&self) -> Value {
        self.result_info
            .clone()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }

    /// `result.id` when it is a string.
    pub fn result_id(&self) -> Option<String> {
        self.result
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

// ============ Results ============

/// Either the operation's result, or a caller-facing refusal that did not
/// touch the network (e.g. an update with no fields).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Completed(T),
    Declined { error: String },
}

impl<T> Outcome<T> {
    pub fn declined(error: impl Into<String>) -> Self {
        Self::Declined {
            error: error.into(),
        }
    }

    pub fn is_declined(&self) -> bool {
        matches!(self, Self::Declined { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZonePage {
    pub zones: Vec<Value>,
    pub result_info: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneDetail {
    pub zone: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordPage {
    pub records: Vec<Value>,
    pub result_info: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDetail {
    pub record: Value,
}

/// Confirmation returned by every delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub deleted: bool,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulesetView {
    pub ruleset_id: Option<String>,
    pub phase: Phase,
    pub rules: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRuleList {
    pub page_rules: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRuleDetail {
    pub page_rule: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeReceipt {
    pub success: bool,
    pub id: Option<String>,
}
