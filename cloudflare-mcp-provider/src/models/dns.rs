use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CloudflareError, Result};
use crate::validation::{bounded, check_len};

// ============ Record Type ============

/// DNS record kinds accepted by this crate.
///
/// Parsing is case-insensitive; the wire form is always uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Txt,
    Ns,
    Srv,
    Caa,
    Ptr,
}

impl DnsRecordType {
    /// Every supported kind, sorted by wire name.
    pub const ALL: [Self; 9] = [
        Self::A,
        Self::Aaaa,
        Self::Caa,
        Self::Cname,
        Self::Mx,
        Self::Ns,
        Self::Ptr,
        Self::Srv,
        Self::Txt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Ns => "NS",
            Self::Srv => "SRV",
            Self::Caa => "CAA",
            Self::Ptr => "PTR",
        }
    }
}

impl fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DnsRecordType {
    type Err = CloudflareError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|t| t.as_str()).collect();
                CloudflareError::validation(
                    "type",
                    format!("Invalid record type. Allowed: {}", allowed.join(", ")),
                )
            })
    }
}

// ============ Create ============

/// Raw, unvalidated input for a new DNS record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DnsRecordInput {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: Option<i64>,
    pub proxied: Option<bool>,
    pub priority: Option<i64>,
    pub comment: Option<String>,
}

/// A validated record, ready to be sent as a create body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDnsRecord {
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// TTL of `1` means "automatic" at Cloudflare.
const DEFAULT_TTL: i64 = 1;
const MAX_TTL: i64 = 86_400;
const MAX_PRIORITY: i64 = 65_535;
const MAX_NAME_LEN: usize = 255;
const MAX_CONTENT_LEN: usize = 2048;
const MAX_COMMENT_LEN: usize = 500;

impl DnsRecordInput {
    pub fn validate(self) -> Result<NewDnsRecord> {
        let record_type = self.record_type.parse()?;
        check_len("name", &self.name, 1, MAX_NAME_LEN)?;
        check_len("content", &self.content, 1, MAX_CONTENT_LEN)?;
        let ttl = bounded("ttl", self.ttl.unwrap_or(DEFAULT_TTL), 1, MAX_TTL)?;
        let priority = self
            .priority
            .map(|p| bounded("priority", p, 0, MAX_PRIORITY))
            .transpose()?;
        if let Some(comment) = &self.comment {
            check_len("comment", comment, 0, MAX_COMMENT_LEN)?;
        }

        Ok(NewDnsRecord {
            record_type,
            name: self.name,
            content: self.content,
            ttl,
            proxied: self.proxied.unwrap_or(false),
            priority,
            comment: self.comment.filter(|c| !c.is_empty()),
        })
    }
}

// ============ Update ============

/// Raw partial update. Only supplied fields are validated and sent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DnsRecordPatch {
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub name: Option<String>,
    pub content: Option<String>,
    pub ttl: Option<i64>,
    pub proxied: Option<bool>,
    pub priority: Option<i64>,
    pub comment: Option<String>,
}

/// Validated partial update body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DnsRecordChanges {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub record_type: Option<DnsRecordType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    /// An empty string is sent as-is and clears the comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl DnsRecordChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl DnsRecordPatch {
    pub fn validate(self) -> Result<DnsRecordChanges> {
        let record_type = self
            .record_type
            .as_deref()
            .map(str::parse)
            .transpose()?;
        if let Some(name) = &self.name {
            check_len("name", name, 1, MAX_NAME_LEN)?;
        }
        if let Some(content) = &self.content {
            check_len("content", content, 1, MAX_CONTENT_LEN)?;
        }
        let ttl = self
            .ttl
            .map(|t| bounded("ttl", t, 1, MAX_TTL))
            .transpose()?;
        let priority = self
            .priority
            .map(|p| bounded("priority", p, 0, MAX_PRIORITY))
            .transpose()?;
        if let Some(comment) = &self.comment {
            check_len("comment", comment, 0, MAX_COMMENT_LEN)?;
        }

        Ok(DnsRecordChanges {
            record_type,
            name: self.name,
            content: self.content,
            ttl,
            proxied: self.proxied,
            priority,
            comment: self.comment,
        })
    }
}
