//! Validated input models.
//!
//! Each raw input type has a `validate()` smart constructor that either
//! returns the wire-ready body or a [`CloudflareError::Validation`](crate::CloudflareError).

mod cache;
mod dns;
mod page_rules;
mod transform;

pub use cache::{CachePurge, MAX_PURGE_ITEMS, PurgeSelectors};
pub use dns::{DnsRecordChanges, DnsRecordInput, DnsRecordPatch, DnsRecordType, NewDnsRecord};
pub use page_rules::{
    NewPageRule, PageRuleAction, PageRuleChanges, PageRuleInput, PageRuleOrder, PageRulePatch,
    PageRuleStatus,
};
pub use transform::{
    ActionParameters, HeaderAction, HeaderOperation, Phase, RewriteValue, TransformRule,
    UriRewrite,
};
