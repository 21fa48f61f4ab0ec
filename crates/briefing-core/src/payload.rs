//! Briefing payload types.
//!
//! Payloads come from a host we do not control, so decoding never fails on
//! individual fields: every field falls back to a safe default. Only a
//! payload that is not a JSON object at all is rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::time::parse_timestamp;

/// Range label used when the host omits one.
pub const DEFAULT_RANGE_LABEL: &str = "soon";
/// Title used for items the host sent without one.
pub const UNTITLED: &str = "Untitled";

const ITEMS_KEY: &str = "assignments";
/// Item list name used by older hosts.
const LEGACY_ITEMS_KEY: &str = "highPriority";

/// The full briefing object supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefingPayload {
    /// Summary count. Independent of `assignments.len()`.
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u64,
    #[serde(default = "default_range_label", deserialize_with = "lenient_range_label")]
    pub range_label: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub assignments: Vec<AssignmentItem>,
}

/// A single assignment row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentItem {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default = "default_title", deserialize_with = "lenient_title")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub course: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_opt_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub due_at: Option<DateTime<Utc>>,
    /// Pre-formatted due string from legacy hosts.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub due_at_display: Option<String>,
}

impl Default for BriefingPayload {
    fn default() -> Self {
        Self {
            count: 0,
            range_label: default_range_label(),
            generated_at: None,
            assignments: Vec::new(),
        }
    }
}

impl BriefingPayload {
    /// Decode a payload from host JSON.
    ///
    /// Returns `None` for `null` and for anything that is not an object.
    /// The item list is read from `assignments`, or from `highPriority`
    /// when `assignments` is absent or `null`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let Value::Object(fields) = value else {
            return None;
        };
        let mut fields = fields.clone();
        let legacy = fields.remove(LEGACY_ITEMS_KEY);
        if fields.get(ITEMS_KEY).map_or(true, Value::is_null) {
            if let Some(legacy) = legacy {
                fields.insert(ITEMS_KEY.to_string(), legacy);
            }
        }
        Self::deserialize(&Value::Object(fields)).ok()
    }
}

impl AssignmentItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            course: String::new(),
            category: None,
            url: None,
            due_at: None,
            due_at_display: None,
        }
    }

    pub fn with_course(mut self, course: impl Into<String>) -> Self {
        self.course = course.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_due_at(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn with_due_display(mut self, display: impl Into<String>) -> Self {
        self.due_at_display = Some(display.into());
        self
    }
}

fn default_range_label() -> String {
    DEFAULT_RANGE_LABEL.to_string()
}

fn default_title() -> String {
    UNTITLED.to_string()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(d)?;
    let count = match &value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    };
    Ok(count)
}

fn lenient_range_label<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(default_range_label))
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(parse_timestamp(&value))
}

fn lenient_items<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<AssignmentItem>, D::Error> {
    let value = Value::deserialize(d)?;
    let Value::Array(entries) = value else {
        return Ok(Vec::new());
    };
    Ok(entries
        .iter()
        .filter(|entry| entry.is_object())
        .filter_map(|entry| AssignmentItem::deserialize(entry).ok())
        .collect())
}

fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(scalar_to_string(&value).unwrap_or_default())
}

fn lenient_title<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(scalar_to_string(&value)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default_title))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(scalar_to_string(&value).unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(scalar_to_string(&value).filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn decodes_full_payload() {
        let payload = BriefingPayload::from_value(&json!({
            "count": 2,
            "rangeLabel": "this week",
            "generatedAt": "2025-10-16T12:00:00Z",
            "assignments": [{
                "id": 1,
                "title": "Essay",
                "course": "Eng101",
                "type": "Homework",
                "url": "https://school.example/a/1",
                "dueAt": "2025-10-16T23:59:00Z",
                "dueAtDisplay": "Thu 11:59 PM"
            }]
        }))
        .unwrap();

        assert_eq!(payload.count, 2);
        assert_eq!(payload.range_label, "this week");
        assert_eq!(
            payload.generated_at,
            Some(Utc.with_ymd_and_hms(2025, 10, 16, 12, 0, 0).unwrap())
        );
        let item = &payload.assignments[0];
        assert_eq!(item.id, "1");
        assert_eq!(item.category.as_deref(), Some("Homework"));
        assert_eq!(item.due_at_display.as_deref(), Some("Thu 11:59 PM"));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let payload = BriefingPayload::from_value(&json!({})).unwrap();
        assert_eq!(payload, BriefingPayload::default());
        assert_eq!(payload.range_label, "soon");
    }

    #[test]
    fn malformed_fields_fall_back_to_defaults() {
        let payload = BriefingPayload::from_value(&json!({
            "count": "three",
            "rangeLabel": 42,
            "generatedAt": "yesterday-ish",
            "assignments": {"not": "a list"}
        }))
        .unwrap();

        assert_eq!(payload.count, 0);
        assert_eq!(payload.range_label, "soon");
        assert!(payload.generated_at.is_none());
        assert!(payload.assignments.is_empty());
    }

    #[test]
    fn negative_count_clamps_to_zero() {
        let payload = BriefingPayload::from_value(&json!({"count": -4})).unwrap();
        assert_eq!(payload.count, 0);
        let payload = BriefingPayload::from_value(&json!({"count": 3.0})).unwrap();
        assert_eq!(payload.count, 3);
    }

    #[test]
    fn item_defaults_and_junk_entries() {
        let payload = BriefingPayload::from_value(&json!({
            "assignments": [
                {"id": "a", "title": null, "type": "", "dueAt": null},
                "not an item",
                {"id": "b", "title": "Quiz 3", "type": "Quiz"}
            ]
        }))
        .unwrap();

        assert_eq!(payload.assignments.len(), 2);
        assert_eq!(payload.assignments[0].title, UNTITLED);
        assert!(payload.assignments[0].category.is_none());
        assert!(payload.assignments[0].due_at.is_none());
        assert_eq!(payload.assignments[1].category.as_deref(), Some("Quiz"));
    }

    #[test]
    fn legacy_high_priority_alias() {
        let payload = BriefingPayload::from_value(&json!({
            "highPriority": [{"id": 9, "title": "Lab"}]
        }))
        .unwrap();
        assert_eq!(payload.assignments.len(), 1);
        assert_eq!(payload.assignments[0].id, "9");
    }

    #[test]
    fn assignments_win_over_legacy_list() {
        let payload = BriefingPayload::from_value(&json!({
            "count": 2,
            "assignments": [{"id": 1}],
            "highPriority": [{"id": 2}]
        }))
        .unwrap();
        assert_eq!(payload.count, 2);
        assert_eq!(payload.assignments.len(), 1);
        assert_eq!(payload.assignments[0].id, "1");

        let payload = BriefingPayload::from_value(&json!({
            "assignments": null,
            "highPriority": [{"id": 2}]
        }))
        .unwrap();
        assert_eq!(payload.assignments[0].id, "2");

        let payload = BriefingPayload::from_value(&json!({
            "assignments": [],
            "highPriority": []
        }))
        .unwrap();
        assert!(payload.assignments.is_empty());
    }

    #[test]
    fn non_objects_are_rejected() {
        assert!(BriefingPayload::from_value(&Value::Null).is_none());
        assert!(BriefingPayload::from_value(&json!([1, 2])).is_none());
        assert!(BriefingPayload::from_value(&json!("payload")).is_none());
    }

    #[test]
    fn count_is_not_tied_to_list_length() {
        let payload = BriefingPayload::from_value(&json!({
            "count": 7,
            "assignments": [{"id": 1, "title": "Only one"}]
        }))
        .unwrap();
        assert_eq!(payload.count, 7);
        assert_eq!(payload.assignments.len(), 1);
    }
}
