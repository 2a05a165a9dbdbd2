//! Input validation primitives.
//!
//! Everything here is pure: no I/O, no logging of the values being checked.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CloudflareError, Result};
use crate::utils::log_sanitizer::truncate_for_log;

/// Length of every Cloudflare object identifier.
pub const ID_LEN: usize = 32;

/// Semantic role of an identifier. Only affects error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Zone,
    Record,
    Rule,
    Ruleset,
}

impl IdKind {
    fn field(self) -> &'static str {
        match self {
            Self::Zone => "zone_id",
            Self::Record => "record_id",
            Self::Rule => "rule_id",
            Self::Ruleset => "ruleset_id",
        }
    }
}

/// A zone, record, rule or ruleset identifier: exactly 32 lowercase hex characters.
///
/// Once constructed it is safe to interpolate into a URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn parse(kind: IdKind, value: &str) -> Result<Self> {
        if is_identifier(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(CloudflareError::validation(
                kind.field(),
                format!("{} must be {ID_LEN}-character hex string", kind.field()),
            ))
        }
    }

    pub fn zone(value: &str) -> Result<Self> {
        Self::parse(IdKind::Zone, value)
    }

    pub fn record(value: &str) -> Result<Self> {
        Self::parse(IdKind::Record, value)
    }

    pub fn rule(value: &str) -> Result<Self> {
        Self::parse(IdKind::Rule, value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `^[0-9a-f]{32}$`
pub fn is_identifier(value: &str) -> bool {
    value.len() == ID_LEN && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Check a string's length in characters against `min..=max`.
pub fn check_len(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min {
        return Err(CloudflareError::validation(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    if len > max {
        return Err(CloudflareError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Check an integer against `min..=max`.
pub fn check_range(field: &str, value: i64, min: i64, max: i64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CloudflareError::validation(
            field,
            format!("must be between {min} and {max}"),
        ))
    }
}

/// Range-check an integer and narrow it to the wire type.
pub fn bounded<T: TryFrom<i64>>(field: &str, value: i64, min: i64, max: i64) -> Result<T> {
    check_range(field, value, min, max)?;
    T::try_from(value).map_err(|_| {
        CloudflareError::validation(field, format!("must be between {min} and {max}"))
    })
}

/// Check a list's element count against `min..=max`.
pub fn check_count<T>(field: &str, items: &[T], min: usize, max: usize) -> Result<()> {
    if (min..=max).contains(&items.len()) {
        Ok(())
    } else {
        Err(CloudflareError::validation(
            field,
            format!("must contain between {min} and {max} items"),
        ))
    }
}

/// Deserialize untrusted JSON into a typed input, reporting failures as
/// [`CloudflareError::Validation`] on `field`.
///
/// The detail keeps the failure category, the offending key and what was
/// expected. Values quoted by serde are dropped.
pub fn from_json<T: DeserializeOwned>(field: &str, value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| CloudflareError::validation(field, describe_json_error(&e)))
}

fn describe_json_error(error: &serde_json::Error) -> String {
    let message = error.to_string();
    let (head, expected) = match message.rsplit_once(", expected ") {
        Some((head, expected)) => (head, Some(expected)),
        None => (message.as_str(), None),
    };

    let summary = if let Some(name) = head.strip_prefix("unknown field ") {
        format!("unknown field {}", truncate_for_log(name))
    } else if head.starts_with("missing field ") {
        head.to_string()
    } else {
        ["invalid type", "invalid value", "invalid length", "unknown variant"]
            .into_iter()
            .find(|category| head.starts_with(category))
            .unwrap_or("malformed value")
            .to_string()
    };

    match expected {
        Some(expected) => format!("{summary}, expected {expected}"),
        None => summary,
    }
}
