//! Role permission sets.
//!
//! Roles store their capabilities as JSON, grouped by area, e.g.
//!
//! ```json
//! { "navigation": { "timesheet": true, "project-management": true } }
//! ```
//!
//! Stored data is not trusted to be well formed. [`PermissionSet::resolve`]
//! accepts a missing value, serialized JSON text, or structured JSON, falls
//! back to an empty set on anything else, and always grants
//! `navigation.timesheet`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Grouping that holds page-level navigation flags.
pub const NAVIGATION: &str = "navigation";

/// Navigation keys understood by the API and the frontend.
pub const NAV_TIMESHEET: &str = "timesheet";
pub const NAV_PROJECT_MANAGEMENT: &str = "project-management";
pub const NAV_STAFF_MANAGEMENT: &str = "staff-management";
pub const NAV_APPROVAL_CENTER: &str = "approval-center";
pub const NAV_REPORT_MANAGEMENT: &str = "report-management";
pub const NAV_PROJECT_DASHBOARD: &str = "project-dashboard";
pub const NAV_TEAM_MANAGEMENT: &str = "team-management";
pub const NAV_SYSTEM_MANAGEMENT: &str = "system-management";

/// Normalized permission structure for one role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(Map<String, Value>);

impl PermissionSet {
    /// Normalize stored permission data and apply the mandatory baseline.
    ///
    /// Never fails: malformed input is logged and treated as empty.
    pub fn resolve(raw: Option<&Value>) -> Self {
        let mut map = match raw {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(Value::String(text)) => parse_text(text),
            Some(other) => {
                tracing::warn!(kind = value_kind(other), "Ignoring non-object permission data");
                Map::new()
            }
        };
        force_baseline(&mut map);
        Self(map)
    }

    /// Whether the navigation flag `key` is enabled.
    ///
    /// A flag is enabled when it is `true` or an object with `"enabled": true`.
    pub fn allows(&self, key: &str) -> bool {
        let Some(flag) = self
            .0
            .get(NAVIGATION)
            .and_then(Value::as_object)
            .and_then(|nav| nav.get(key))
        else {
            return false;
        };
        match flag {
            Value::Bool(enabled) => *enabled,
            Value::Object(obj) => obj.get("enabled").and_then(Value::as_bool) == Some(true),
            _ => false,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Validate permission data submitted for storage on a role.
///
/// Only the top-level shape is checked; unknown groupings are kept.
pub fn validate_for_storage(value: &Value) -> Result<(), String> {
    let Some(map) = value.as_object() else {
        return Err("permissions must be a JSON object".to_string());
    };
    if let Some(nav) = map.get(NAVIGATION) {
        if !nav.is_object() {
            return Err("permissions.navigation must be a JSON object".to_string());
        }
    }
    Ok(())
}

fn parse_text(text: &str) -> Map<String, Value> {
    if text.trim().is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!(kind = value_kind(&other), "Ignoring non-object permission text");
            Map::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Malformed permission text, using empty set");
            Map::new()
        }
    }
}

fn force_baseline(map: &mut Map<String, Value>) {
    let nav = map
        .entry(NAVIGATION)
        .or_insert_with(|| Value::Object(Map::new()));
    if !nav.is_object() {
        tracing::warn!("Replacing non-object navigation grouping");
        *nav = Value::Object(Map::new());
    }
    if let Value::Object(nav) = nav {
        nav.insert(NAV_TIMESHEET.to_string(), Value::Bool(true));
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn resolved(raw: Value) -> Value {
        PermissionSet::resolve(Some(&raw)).into_value()
    }

    #[test]
    fn empty_object_gets_baseline() {
        assert_eq!(resolved(json!({})), json!({ "navigation": { "timesheet": true } }));
    }

    #[test]
    fn stored_false_is_overridden() {
        let raw = json!({ "navigation": { "timesheet": false, "other": true } });
        assert_eq!(
            resolved(raw),
            json!({ "navigation": { "timesheet": true, "other": true } })
        );
    }

    #[test]
    fn missing_and_null_give_baseline() {
        let expected = json!({ "navigation": { "timesheet": true } });
        assert_eq!(PermissionSet::resolve(None).into_value(), expected);
        assert_eq!(resolved(Value::Null), expected);
    }

    #[test]
    fn serialized_text_is_parsed() {
        let text = r#"{"navigation":{"project-management":true},"reports":{"export":true}}"#;
        assert_eq!(
            resolved(Value::String(text.into())),
            json!({
                "navigation": { "project-management": true, "timesheet": true },
                "reports": { "export": true }
            })
        );
    }

    #[test]
    fn malformed_text_degrades_to_baseline() {
        let expected = json!({ "navigation": { "timesheet": true } });
        assert_eq!(resolved(Value::String("{not json".into())), expected);
        assert_eq!(resolved(Value::String("[1,2]".into())), expected);
        assert_eq!(resolved(Value::String("".into())), expected);
        assert_eq!(resolved(json!([true])), expected);
        assert_eq!(resolved(json!(7)), expected);
    }

    #[test]
    fn non_object_navigation_is_replaced() {
        let raw = json!({ "navigation": "everything", "other": { "x": 1 } });
        assert_eq!(
            resolved(raw),
            json!({ "navigation": { "timesheet": true }, "other": { "x": 1 } })
        );
    }

    #[test]
    fn allows_checks_navigation_flags() {
        let set = PermissionSet::resolve(Some(&json!({
            "navigation": {
                "project-management": true,
                "approval-center": { "enabled": true },
                "staff-management": false,
                "system-management": "yes"
            }
        })));
        assert!(set.allows(NAV_TIMESHEET));
        assert!(set.allows(NAV_PROJECT_MANAGEMENT));
        assert!(set.allows(NAV_APPROVAL_CENTER));
        assert!(!set.allows(NAV_STAFF_MANAGEMENT));
        assert!(!set.allows(NAV_SYSTEM_MANAGEMENT));
        assert!(!set.allows(NAV_TEAM_MANAGEMENT));
    }

    #[test]
    fn storage_validation() {
        assert!(validate_for_storage(&json!({ "navigation": {} })).is_ok());
        assert!(validate_for_storage(&json!({})).is_ok());
        assert!(validate_for_storage(&json!("text")).is_err());
        assert!(validate_for_storage(&json!({ "navigation": [] })).is_err());
    }

    #[test]
    fn serializes_as_plain_object() {
        let set = PermissionSet::resolve(None);
        let text = serde_json::to_string(&set).unwrap();
        assert_eq!(text, r#"{"navigation":{"timesheet":true}}"#);
    }
}
