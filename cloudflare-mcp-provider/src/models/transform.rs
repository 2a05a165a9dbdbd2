use std::collections::BTreeMap;
use std::fmt;

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{CloudflareError, Result};
use crate::validation::{ID_LEN, check_count, check_len, from_json, is_identifier};

const MAX_EXPRESSION_LEN: usize = 4096;
const MAX_DESCRIPTION_LEN: usize = 500;
const MAX_HEADER_NAME_LEN: usize = 256;
const MAX_VALUE_LEN: usize = 2048;
const MAX_HEADERS_PER_RULE: usize = 10;
const MAX_REF_LEN: usize = 64;
const REWRITE_ACTION: &str = "rewrite";

// ============ Phase ============

/// Ruleset phase a set of transform rules belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Request header modification.
    RequestHeaders,
    /// Response header modification.
    ResponseHeaders,
    /// URL path / query rewrite.
    UrlRewrite,
}

impl Phase {
    /// Cloudflare's phase identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequestHeaders => "http_request_late_transform",
            Self::ResponseHeaders => "http_response_headers_transform",
            Self::UrlRewrite => "http_request_transform",
        }
    }

    /// Name given to a ruleset this crate creates for the phase.
    pub fn managed_ruleset_name(self) -> String {
        format!("MCP Managed {}", self.as_str())
    }

    /// Validate caller-supplied rules for this phase.
    pub fn parse_rules(self, rules: Vec<Value>) -> Result<Vec<TransformRule>> {
        rules
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                let field = format!("rules[{index}]");
                let rule: RawRule = from_json(&field, raw)?;
                rule.validate(self, &field)
            })
            .collect()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============ Rule shapes ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderOperation {
    Set,
    Add,
    Remove,
}

/// One header modification inside `action_parameters.headers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderAction {
    pub operation: HeaderOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

/// A static value or a dynamic expression, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewriteValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UriRewrite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<RewriteValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<RewriteValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, HeaderAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<UriRewrite>,
}

/// A validated transform rule in Cloudflare's wire shape.
///
/// `id` and `ref` are carried over from a listed rule so Cloudflare keeps
/// the rule's identity when the phase is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub expression: String,
    pub description: String,
    pub enabled: bool,
    pub action: &'static str,
    pub action_parameters: ActionParameters,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRule {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "ref")]
    reference: Option<String>,
    // Server-managed, dropped on write.
    #[serde(default, rename = "version")]
    _version: Option<IgnoredAny>,
    #[serde(default, rename = "last_updated")]
    _last_updated: Option<IgnoredAny>,
    expression: String,
    #[serde(default)]
    description: String,
    #[serde(default = "enabled_by_default")]
    enabled: bool,
    #[serde(default)]
    action: Option<String>,
    action_parameters: ActionParameters,
}

fn enabled_by_default() -> bool {
    true
}

impl RawRule {
    fn validate(self, phase: Phase, field: &str) -> Result<TransformRule> {
        if let Some(id) = self.id.as_deref()
            && !is_identifier(id)
        {
            return Err(CloudflareError::validation(
                format!("{field}.id"),
                format!("must be {ID_LEN}-character hex string"),
            ));
        }
        if let Some(reference) = self.reference.as_deref() {
            check_len(&format!("{field}.ref"), reference, 1, MAX_REF_LEN)?;
        }
        check_len(&format!("{field}.expression"), &self.expression, 1, MAX_EXPRESSION_LEN)?;
        check_len(&format!("{field}.description"), &self.description, 0, MAX_DESCRIPTION_LEN)?;
        if let Some(action) = self.action.as_deref()
            && action != REWRITE_ACTION
        {
            return Err(CloudflareError::validation(
                format!("{field}.action"),
                format!("must be \"{REWRITE_ACTION}\""),
            ));
        }

        let params_field = format!("{field}.action_parameters");
        match phase {
            Phase::RequestHeaders | Phase::ResponseHeaders => {
                validate_headers(&params_field, &self.action_parameters)?;
            }
            Phase::UrlRewrite => validate_uri(&params_field, &self.action_parameters)?,
        }

        Ok(TransformRule {
            id: self.id,
            reference: self.reference,
            expression: self.expression,
            description: self.description,
            enabled: self.enabled,
            action: REWRITE_ACTION,
            action_parameters: self.action_parameters,
        })
    }
}

fn validate_headers(field: &str, params: &ActionParameters) -> Result<()> {
    if params.uri.is_some() {
        return Err(CloudflareError::validation(
            field,
            "uri rewrites are not allowed in a header phase",
        ));
    }
    let Some(headers) = &params.headers else {
        return Err(CloudflareError::validation(field, "headers is required"));
    };
    let names: Vec<&String> = headers.keys().collect();
    check_count(&format!("{field}.headers"), &names, 1, MAX_HEADERS_PER_RULE)?;

    for (name, action) in headers {
        let header_field = format!("{field}.headers");
        check_len(&header_field, name, 1, MAX_HEADER_NAME_LEN)?;
        if let Some(value) = &action.value {
            check_len(&header_field, value, 0, MAX_VALUE_LEN)?;
        }
        if let Some(expression) = &action.expression {
            check_len(&header_field, expression, 1, MAX_EXPRESSION_LEN)?;
        }
        let sources = usize::from(action.value.is_some()) + usize::from(action.expression.is_some());
        match action.operation {
            HeaderOperation::Set | HeaderOperation::Add if sources != 1 => {
                return Err(CloudflareError::validation(
                    header_field,
                    "set/add requires exactly one of value or expression",
                ));
            }
            HeaderOperation::Remove if sources != 0 => {
                return Err(CloudflareError::validation(
                    header_field,
                    "remove takes neither value nor expression",
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_uri(field: &str, params: &ActionParameters) -> Result<()> {
    if params.headers.is_some() {
        return Err(CloudflareError::validation(
            field,
            "header modifications are not allowed in the URL rewrite phase",
        ));
    }
    let Some(uri) = &params.uri else {
        return Err(CloudflareError::validation(field, "uri is required"));
    };
    if uri.path.is_none() && uri.query.is_none() {
        return Err(CloudflareError::validation(
            format!("{field}.uri"),
            "at least one of path or query is required",
        ));
    }
    for (part, rewrite) in [("path", &uri.path), ("query", &uri.query)] {
        let Some(rewrite) = rewrite else { continue };
        let part_field = format!("{field}.uri.{part}");
        match (&rewrite.value, &rewrite.expression) {
            (Some(value), None) => check_len(&part_field, value, 0, MAX_VALUE_LEN)?,
            (None, Some(expression)) => {
                check_len(&part_field, expression, 1, MAX_EXPRESSION_LEN)?;
            }
            _ => {
                return Err(CloudflareError::validation(
                    part_field,
                    "requires exactly one of value or expression",
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header_rule() -> Value {
        json!({
            "expression": "true",
            "description": "Add custom header",
            "action": "rewrite",
            "action_parameters": {
                "headers": {
                    "X-Custom-Header": {"operation": "set", "value": "custom-value"}
                }
            }
        })
    }

    fn rewrite_rule() -> Value {
        json!({
            "expression": "http.request.uri.path eq \"/old-path\"",
            "action_parameters": {"uri": {"path": {"value": "/new-path"}}}
        })
    }

    #[test]
    fn phase_identifiers() {
        assert_eq!(Phase::RequestHeaders.as_str(), "http_request_late_transform");
        assert_eq!(Phase::ResponseHeaders.as_str(), "http_response_headers_transform");
        assert_eq!(Phase::UrlRewrite.as_str(), "http_request_transform");
        assert_eq!(
            serde_json::to_value(Phase::UrlRewrite).unwrap(),
            json!("http_request_transform")
        );
        assert_eq!(
            Phase::RequestHeaders.managed_ruleset_name(),
            "MCP Managed http_request_late_transform"
        );
    }

    #[test]
    fn header_rule_round_trips_to_wire_shape() {
        let rules = Phase::RequestHeaders.parse_rules(vec![header_rule()]).unwrap();
        let mut expected = header_rule();
        expected["enabled"] = json!(true);
        assert_eq!(serde_json::to_value(&rules[0]).unwrap(), expected);
    }

    #[test]
    fn defaults_fill_description_enabled_and_action() {
        let rules = Phase::UrlRewrite.parse_rules(vec![rewrite_rule()]).unwrap();
        let wire = serde_json::to_value(&rules[0]).unwrap();
        assert_eq!(wire["description"], "");
        assert_eq!(wire["enabled"], true);
        assert_eq!(wire["action"], "rewrite");
    }

    #[test]
    fn empty_rule_list_is_allowed() {
        assert!(Phase::ResponseHeaders.parse_rules(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn set_requires_a_value_and_remove_forbids_one() {
        let mut missing_value = header_rule();
        missing_value["action_parameters"]["headers"]["X-Custom-Header"] = json!({"operation": "add"});
        assert!(Phase::RequestHeaders.parse_rules(vec![missing_value]).is_err());

        let mut remove_with_value = header_rule();
        remove_with_value["action_parameters"]["headers"]["X-Custom-Header"] =
            json!({"operation": "remove", "value": "x"});
        assert!(Phase::RequestHeaders.parse_rules(vec![remove_with_value]).is_err());

        let mut remove = header_rule();
        remove["action_parameters"]["headers"]["X-Custom-Header"] = json!({"operation": "remove"});
        assert!(Phase::RequestHeaders.parse_rules(vec![remove]).is_ok());
    }

    #[test]
    fn wrong_shape_for_phase_is_rejected() {
        assert!(Phase::UrlRewrite.parse_rules(vec![header_rule()]).is_err());
        assert!(Phase::ResponseHeaders.parse_rules(vec![rewrite_rule()]).is_err());
    }

    #[test]
    fn uri_rewrite_needs_exactly_one_source() {
        let mut both = rewrite_rule();
        both["action_parameters"]["uri"]["path"] = json!({"value": "/a", "expression": "concat(\"/\", \"a\")"});
        assert!(Phase::UrlRewrite.parse_rules(vec![both]).is_err());

        let mut neither = rewrite_rule();
        neither["action_parameters"]["uri"] = json!({});
        assert!(Phase::UrlRewrite.parse_rules(vec![neither]).is_err());
    }

    #[test]
    fn bounds_and_unknown_fields() {
        let mut long_expression = rewrite_rule();
        long_expression["expression"] = json!("x".repeat(4097));
        assert!(Phase::UrlRewrite.parse_rules(vec![long_expression]).is_err());

        let mut extra = rewrite_rule();
        extra["priority"] = json!(1);
        let err = Phase::UrlRewrite.parse_rules(vec![extra]).unwrap_err();
        assert!(matches!(err, CloudflareError::Validation { ref field, .. } if field == "rules[0]"));

        let mut wrong_action = header_rule();
        wrong_action["action"] = json!("block");
        assert!(Phase::RequestHeaders.parse_rules(vec![wrong_action]).is_err());
    }

    #[test]
    fn too_many_headers_is_rejected() {
        let headers: serde_json::Map<String, Value> = (0..11)
            .map(|i| (format!("X-H-{i}"), json!({"operation": "set", "value": "v"})))
            .collect();
        let mut rule = header_rule();
        rule["action_parameters"]["headers"] = Value::Object(headers);
        assert!(Phase::RequestHeaders.parse_rules(vec![rule]).is_err());
    }

    #[test]
    fn listed_rule_can_be_resubmitted() {
        let mut listed = header_rule();
        listed["id"] = json!("2c0fc9fa937b11eaa1b71c4d701ab86e");
        listed["ref"] = json!("2c0fc9fa937b11eaa1b71c4d701ab86e");
        listed["version"] = json!("3");
        listed["last_updated"] = json!("2024-01-01T00:00:00.000000Z");
        listed["enabled"] = json!(false);

        let rules = Phase::ResponseHeaders.parse_rules(vec![listed]).unwrap();
        let wire = serde_json::to_value(&rules[0]).unwrap();
        assert_eq!(wire["id"], "2c0fc9fa937b11eaa1b71c4d701ab86e");
        assert_eq!(wire["ref"], "2c0fc9fa937b11eaa1b71c4d701ab86e");
        assert_eq!(wire["enabled"], false);
        assert!(wire.get("version").is_none());
        assert!(wire.get("last_updated").is_none());
    }

    #[test]
    fn new_rule_omits_identity_fields() {
        let rules = Phase::UrlRewrite.parse_rules(vec![rewrite_rule()]).unwrap();
        let wire = serde_json::to_value(&rules[0]).unwrap();
        assert!(wire.get("id").is_none());
        assert!(wire.get("ref").is_none());
    }

    #[test]
    fn malformed_rule_id_is_rejected() {
        let mut listed = header_rule();
        listed["id"] = json!("../rulesets");
        let err = Phase::RequestHeaders.parse_rules(vec![listed]).unwrap_err();
        assert!(matches!(err, CloudflareError::Validation { ref field, .. } if field == "rules[0].id"));
    }
}
