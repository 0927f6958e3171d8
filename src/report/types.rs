use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Everything a report is generated from.
///
/// Only `planSummary` is expected in practice, but every key is optional on
/// the wire: missing items default to an empty list and a missing detail block
/// to an empty object. Keys not modelled here are carried along in `extra`
/// so the embedded report sees the whole object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_summary: Option<PlanSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub plan_items: Vec<PlanItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub report_detail: ReportDetail,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReportPayload {
    /// Parse a payload, accepting either the bare object or the backend's
    /// `{ "code": .., "data": { .. } }` response envelope.
    pub fn from_json_str(input: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let value = match value {
            Value::Object(mut obj) if is_envelope(&obj) => obj.remove("data").unwrap_or_default(),
            other => other,
        };
        serde_json::from_value(value)
    }

    pub fn plan_name(&self) -> Option<&str> {
        self.plan_summary
            .as_ref()
            .and_then(|s| s.plan_name.as_deref())
            .filter(|name| !name.is_empty())
    }
}

// Both 0 and 200 are used as success codes upstream; only `data` matters here.
fn is_envelope(obj: &Map<String, Value>) -> bool {
    obj.contains_key("code")
        && obj.get("data").is_some_and(Value::is_object)
        && !obj.contains_key("planSummary")
        && !obj.contains_key("planItems")
}

/// Aggregate result of one plan run, as produced by the platform backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_duration_ms: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlanSummary {
    /// Plan id as display text (the backend sends numbers, older exports strings).
    pub fn plan_id_text(&self) -> Option<String> {
        match self.plan_id.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Outcome of a single case or step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Success,
    Failed,
    /// Any status string the backend sends that is neither of the above.
    #[serde(untagged)]
    Other(String),
}

impl ItemStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ItemStatus::Success => "success",
            ItemStatus::Failed => "failed",
            ItemStatus::Other(s) => s,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ItemStatus::Success)
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Failed
    }
}

/// Request or response body: either already structured JSON or raw text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Body {
    RawText(String),
    Structured(Value),
}

impl Body {
    /// A body with nothing to show (`""`, `null`).
    pub fn is_empty(&self) -> bool {
        match self {
            Body::RawText(s) => s.is_empty(),
            Body::Structured(v) => v.is_null(),
        }
    }
}

/// Result of one executed case inside a plan run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_headers: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Body>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<Body>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<BTreeMap<String, Value>>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub steps: Vec<Step>,
    /// Console lines; the engine sends either a list or one `\n`-joined string.
    #[serde(
        default,
        deserialize_with = "log_lines",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlanItem {
    /// Label used in lists: case name, then URL, then `Case #<id>`.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.case_name.as_deref().filter(|s| !s.is_empty()) {
            return name.to_string();
        }
        if let Some(url) = self.url.as_deref().filter(|s| !s.is_empty()) {
            return url.to_string();
        }
        format!("Case #{}", value_text(self.case_id.as_ref()))
    }

    /// First error worth surfacing: a failing step's error, then the item error.
    pub fn failure_message(&self) -> Option<&str> {
        self.steps
            .iter()
            .filter(|s| !s.status.is_success())
            .find_map(|s| s.error.as_deref())
            .or(self.error.as_deref())
    }
}

/// One sub-action of a case execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Supplementary run metadata, passed through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ReportDetail(pub Map<String, Value>);

impl ReportDetail {
    pub fn plan_run_no(&self) -> Option<String> {
        match self.0.get("planRunNo")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// `null` reads as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn log_lines<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let lines = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::String(text) => text
            .split('\n')
            .map(|line| line.trim_end_matches('\r').to_string())
            .filter(|line| !line.is_empty())
            .collect(),
        Value::Array(entries) => entries
            .into_iter()
            .filter(|entry| !entry.is_null())
            .map(|entry| match entry {
                Value::String(line) => line,
                other => other.to_string(),
            })
            .collect(),
        other => vec![other.to_string()],
    };
    Ok(lines)
}

/// Render an optional JSON scalar for display (`-` when absent).
pub fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_blocks_default() {
        let payload = ReportPayload::from_json_str(r#"{"planSummary":{"planName":"Smoke"}}"#).unwrap();
        assert_eq!(payload.plan_name(), Some("Smoke"));
        assert!(payload.plan_items.is_empty());
        assert!(payload.report_detail.0.is_empty());
    }

    #[test]
    fn test_unwraps_backend_envelope() {
        let input = r#"{"code":0,"message":"ok","data":{"planSummary":{"planId":7,"total":2},"planItems":[{"status":"success"}]}}"#;
        let payload = ReportPayload::from_json_str(input).unwrap();
        let summary = payload.plan_summary.unwrap();
        assert_eq!(summary.plan_id_text().as_deref(), Some("7"));
        assert_eq!(payload.plan_items.len(), 1);
    }

    #[test]
    fn test_body_variants() {
        let item: PlanItem = serde_json::from_str(
            r#"{"status":"failed","responseBody":"plain text","requestBody":{"a":1}}"#,
        )
        .unwrap();
        assert_eq!(item.response_body, Some(Body::RawText("plain text".into())));
        assert!(matches!(item.request_body, Some(Body::Structured(_))));
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let item: PlanItem = serde_json::from_str(r#"{"status":"skipped"}"#).unwrap();
        assert_eq!(item.status, ItemStatus::Other("skipped".into()));
        assert_eq!(serde_json::to_value(&item.status).unwrap(), "skipped");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut item = PlanItem {
            case_id: Some(Value::from(42)),
            ..Default::default()
        };
        assert_eq!(item.display_name(), "Case #42");
        item.url = Some("https://api.example.com/users".into());
        assert_eq!(item.display_name(), "https://api.example.com/users");
        item.case_name = Some("List users".into());
        assert_eq!(item.display_name(), "List users");
    }

    #[test]
    fn test_failure_message_prefers_step_error() {
        let item = PlanItem {
            status: ItemStatus::Failed,
            error: Some("case failed".into()),
            steps: vec![
                Step {
                    status: ItemStatus::Success,
                    ..Default::default()
                },
                Step {
                    status: ItemStatus::Failed,
                    error: Some("status assert failed: expected 200 got 500".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            item.failure_message(),
            Some("status assert failed: expected 200 got 500")
        );
    }

    #[test]
    fn test_null_blocks_default() {
        let payload = ReportPayload::from_json_str(
            r#"{"planSummary":null,"planItems":null,"reportDetail":null}"#,
        )
        .unwrap();
        assert!(payload.plan_summary.is_none());
        assert!(payload.plan_items.is_empty());
        assert!(payload.report_detail.0.is_empty());

        let item: PlanItem =
            serde_json::from_str(r#"{"status":null,"steps":null,"logs":null}"#).unwrap();
        assert_eq!(item.status, ItemStatus::Failed);
        assert!(item.steps.is_empty());
        assert!(item.logs.is_empty());
    }

    #[test]
    fn test_logs_accept_joined_string() {
        let payload = ReportPayload::from_json_str(
            r#"{"planItems":[{"status":"success","logs":"GET /a -> 200 (5ms)\nassert status ok\n"}]}"#,
        )
        .unwrap();
        assert_eq!(
            payload.plan_items[0].logs,
            vec!["GET /a -> 200 (5ms)", "assert status ok"]
        );

        let item: PlanItem = serde_json::from_str(r#"{"logs":["one",null,2]}"#).unwrap();
        assert_eq!(item.logs, vec!["one", "2"]);
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let input = r#"{"planSummary":{"planName":"Nightly","planSummaryReportId":99,"items":[1,2]},"planItems":[{"status":"success","executedAt":"2024-05-01 10:00:00","steps":[{"status":"success","screenshot":"s.png"}]}],"reportDetail":{},"exportedFrom":"web"}"#;
        let payload = ReportPayload::from_json_str(input).unwrap();
        let summary = payload.plan_summary.as_ref().unwrap();
        assert_eq!(summary.extra.get("planSummaryReportId"), Some(&Value::from(99)));
        assert_eq!(
            payload.plan_items[0].extra.get("executedAt"),
            Some(&Value::from("2024-05-01 10:00:00"))
        );

        let original: Value = serde_json::from_str(input).unwrap();
        assert_eq!(serde_json::to_value(&payload).unwrap(), original);
    }

    #[test]
    fn test_plan_run_no() {
        let payload = ReportPayload::from_json_str(r#"{"reportDetail":{"planRunNo":3}}"#).unwrap();
        assert_eq!(payload.report_detail.plan_run_no().as_deref(), Some("3"));
    }
}
