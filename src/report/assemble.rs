//! Serializes a report payload into the JSON literal embedded in the
//! standalone HTML document.

use super::error::Result;
use super::types::ReportPayload;
use serde_json::{Map, Value};
use std::fmt;

/// JSON text that is safe to splice into a `<script>` block.
///
/// Every `<` is written as `\u003c`, so no string field can close the
/// surrounding script element early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedPayload(String);

impl EmbeddedPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmbeddedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Assemble a typed payload.
pub fn assemble(payload: &ReportPayload) -> Result<EmbeddedPayload> {
    let json = serde_json::to_string(payload)?;
    log::debug!(
        "Assembled report payload: {} items, {} bytes",
        payload.plan_items.len(),
        json.len()
    );
    Ok(EmbeddedPayload(escape_script_json(&json)))
}

/// Assemble an untyped payload as-is, filling in `planItems: []` and
/// `reportDetail: {}` when they are missing or null.
pub fn assemble_value(data: &Value) -> Result<EmbeddedPayload> {
    let mut obj = match data {
        Value::Object(obj) => obj.clone(),
        _ => Map::new(),
    };
    for (key, default) in [
        ("planItems", Value::Array(Vec::new())),
        ("reportDetail", Value::Object(Map::new())),
    ] {
        let entry = obj.entry(key).or_insert(Value::Null);
        if entry.is_null() {
            *entry = default;
        }
    }
    let json = serde_json::to_string(&Value::Object(obj))?;
    Ok(EmbeddedPayload(escape_script_json(&json)))
}

fn escape_script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::{ItemStatus, PlanItem, PlanSummary};
    use serde_json::json;

    #[test]
    fn test_defaults_for_missing_blocks() {
        let embedded = assemble_value(&json!({ "planSummary": { "planName": "Nightly" } })).unwrap();
        let parsed: Value = serde_json::from_str(embedded.as_str()).unwrap();
        assert_eq!(parsed["planItems"], json!([]));
        assert_eq!(parsed["reportDetail"], json!({}));
        assert_eq!(parsed["planSummary"]["planName"], "Nightly");
    }

    #[test]
    fn test_null_blocks_are_defaulted() {
        let embedded = assemble_value(&json!({ "planItems": null, "reportDetail": null })).unwrap();
        let parsed: Value = serde_json::from_str(embedded.as_str()).unwrap();
        assert_eq!(parsed["planItems"], json!([]));
        assert_eq!(parsed["reportDetail"], json!({}));
    }

    #[test]
    fn test_typed_payload_always_has_items_and_detail() {
        let embedded = assemble(&ReportPayload::default()).unwrap();
        assert_eq!(embedded.as_str(), r#"{"planItems":[],"reportDetail":{}}"#);
    }

    #[test]
    fn test_no_raw_angle_bracket_survives() {
        let payload = ReportPayload {
            plan_summary: Some(PlanSummary {
                plan_name: Some("</script><script>alert(1)</script>".into()),
                ..Default::default()
            }),
            plan_items: vec![PlanItem {
                status: ItemStatus::Failed,
                logs: vec!["<html> returned instead of JSON".into()],
                ..Default::default()
            }],
            ..Default::default()
        };

        let embedded = assemble(&payload).unwrap();
        assert!(!embedded.as_str().contains('<'));
        assert!(embedded.as_str().contains("\\u003c/script>"));

        let back = ReportPayload::from_json_str(embedded.as_str()).unwrap();
        assert_eq!(back, payload);
    }
}
