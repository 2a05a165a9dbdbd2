use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CloudflareError, Result};
use crate::validation::{bounded, check_count, check_len, from_json};

const MAX_TARGETS: usize = 10;
const MAX_ACTIONS: usize = 20;
const MAX_ACTION_ID_LEN: usize = 100;
const DEFAULT_PRIORITY: i64 = 1;
const MAX_PRIORITY: i64 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageRuleStatus {
    #[default]
    Active,
    Disabled,
}

impl PageRuleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
        }
    }
}

impl FromStr for PageRuleStatus {
    type Err = CloudflareError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(Self::Active),
            "disabled" => Ok(Self::Disabled),
            _ => Err(CloudflareError::validation(
                "status",
                "must be one of: active, disabled",
            )),
        }
    }
}

/// Sort key for page rule listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageRuleOrder {
    Status,
    #[default]
    Priority,
}

impl PageRuleOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Priority => "priority",
        }
    }
}

impl FromStr for PageRuleOrder {
    type Err = CloudflareError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "status" => Ok(Self::Status),
            "priority" => Ok(Self::Priority),
            _ => Err(CloudflareError::validation(
                "order",
                "must be one of: status, priority",
            )),
        }
    }
}

/// One `{id, value}` page rule action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageRuleAction {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

fn parse_targets(targets: Vec<Value>) -> Result<Vec<Value>> {
    check_count("targets", &targets, 1, MAX_TARGETS)?;
    if let Some(index) = targets.iter().position(|t| !t.is_object()) {
        return Err(CloudflareError::validation(
            format!("targets[{index}]"),
            "must be an object",
        ));
    }
    Ok(targets)
}

fn parse_actions(actions: Vec<Value>) -> Result<Vec<PageRuleAction>> {
    check_count("actions", &actions, 1, MAX_ACTIONS)?;
    actions
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let field = format!("actions[{index}]");
            let action: PageRuleAction = from_json(&field, raw)?;
            check_len(&format!("{field}.id"), &action.id, 1, MAX_ACTION_ID_LEN)?;
            Ok(action)
        })
        .collect()
}

// ============ Create ============

/// Raw input for a new page rule.
#[derive(Debug, Clone, Default)]
pub struct PageRuleInput {
    pub targets: Vec<Value>,
    pub actions: Vec<Value>,
    pub priority: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPageRule {
    pub targets: Vec<Value>,
    pub actions: Vec<PageRuleAction>,
    pub priority: u16,
    pub status: PageRuleStatus,
}

impl PageRuleInput {
    pub fn validate(self) -> Result<NewPageRule> {
        Ok(NewPageRule {
            targets: parse_targets(self.targets)?,
            actions: parse_actions(self.actions)?,
            priority: bounded(
                "priority",
                self.priority.unwrap_or(DEFAULT_PRIORITY),
                1,
                MAX_PRIORITY,
            )?,
            status: self
                .status
                .as_deref()
                .map(str::parse)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

// ============ Update ============

/// Raw partial update for a page rule.
#[derive(Debug, Clone, Default)]
pub struct PageRulePatch {
    pub targets: Option<Vec<Value>>,
    pub actions: Option<Vec<Value>>,
    pub priority: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageRuleChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<PageRuleAction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PageRuleStatus>,
}

impl PageRuleChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl PageRulePatch {
    pub fn validate(self) -> Result<PageRuleChanges> {
        Ok(PageRuleChanges {
            targets: self.targets.map(parse_targets).transpose()?,
            actions: self.actions.map(parse_actions).transpose()?,
            priority: self
                .priority
                .map(|p| bounded("priority", p, 1, MAX_PRIORITY))
                .transpose()?,
            status: self.status.as_deref().map(str::parse).transpose()?,
        })
    }
}
