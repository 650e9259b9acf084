//! Structural diff of two return documents.
//!
//! Both sides are key-sorted first so key order never shows up as a
//! difference. Arrays are compared index by index: a reordered array is
//! reported as changes at every index that differs.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiffError {
    #[error("{side} document is not a JSON object")]
    NotAnObject { side: &'static str },

    #[error("schedule '{0}' is not present in either document")]
    ScheduleNotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Changed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffEntry {
    pub path: String,
    pub kind: DiffKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

impl DiffEntry {
    /// The same difference seen from the other side.
    pub fn reversed(self) -> Self {
        let kind = match self.kind {
            DiffKind::Added => DiffKind::Removed,
            DiffKind::Removed => DiffKind::Added,
            DiffKind::Changed => DiffKind::Changed,
        };
        Self {
            path: self.path,
            kind,
            previous_value: self.new_value,
            new_value: self.previous_value,
        }
    }
}

impl fmt::Display for DiffEntry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let show = |v: &Option<Value>| v.as_ref().map_or_else(String::new, Value::to_string);
        match self.kind {
            DiffKind::Added => write!(f, "+ {}: {}", self.path, show(&self.new_value)),
            DiffKind::Removed => write!(f, "- {}: {}", self.path, show(&self.previous_value)),
            DiffKind::Changed => write!(
                f,
                "~ {}: {} -> {}",
                self.path,
                show(&self.previous_value),
                show(&self.new_value)
            ),
        }
    }
}

/// Returns a copy of `value` with every object's keys in sorted order.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), normalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        other => other.clone(),
    }
}

/// Diffs two arbitrary values, rooted at the empty path.
pub fn diff_values(
    left: &Value,
    right: &Value,
) -> Vec<DiffEntry> {
    let mut entries = Vec::new();
    walk("", &normalize(left), &normalize(right), &mut entries);
    entries
}

/// Diffs two whole documents. Both must be JSON objects.
pub fn diff_documents(
    left: &Value,
    right: &Value,
) -> Result<Vec<DiffEntry>, DiffError> {
    ensure_object(left, "left")?;
    ensure_object(right, "right")?;
    Ok(diff_values(left, right))
}

/// Diffs one schedule of two documents, found either at the top level or
/// under `ITR.<form>`. Paths are relative to the schedule.
pub fn diff_schedule(
    left: &Value,
    right: &Value,
    schedule: &str,
) -> Result<Vec<DiffEntry>, DiffError> {
    ensure_object(left, "left")?;
    ensure_object(right, "right")?;

    let left_schedule = find_schedule(left, schedule);
    let right_schedule = find_schedule(right, schedule);
    match (left_schedule, right_schedule) {
        (None, None) => Err(DiffError::ScheduleNotFound(schedule.to_string())),
        (l, r) => {
            let empty = Value::Object(Map::new());
            Ok(diff_values(l.unwrap_or(&empty), r.unwrap_or(&empty)))
        }
    }
}

fn ensure_object(
    value: &Value,
    side: &'static str,
) -> Result<(), DiffError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(DiffError::NotAnObject { side })
    }
}

fn find_schedule<'a>(
    document: &'a Value,
    schedule: &str,
) -> Option<&'a Value> {
    if let Some(found) = document.get(schedule) {
        return Some(found);
    }
    document
        .get("ITR")?
        .as_object()?
        .values()
        .find_map(|form| form.get(schedule))
}

fn walk(
    path: &str,
    left: &Value,
    right: &Value,
    entries: &mut Vec<DiffEntry>,
) {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            let mut keys: Vec<&String> = l.keys().chain(r.keys()).collect();
            keys.sort();
            keys.dedup();
            for key in keys {
                let child = child_path(path, key);
                match (l.get(key), r.get(key)) {
                    (Some(lv), Some(rv)) => walk(&child, lv, rv, entries),
                    (Some(lv), None) => entries.push(removed(child, lv)),
                    (None, Some(rv)) => entries.push(added(child, rv)),
                    (None, None) => {}
                }
            }
        }
        (Value::Array(l), Value::Array(r)) => {
            for index in 0..l.len().max(r.len()) {
                let child = format!("{path}[{index}]");
                match (l.get(index), r.get(index)) {
                    (Some(lv), Some(rv)) => walk(&child, lv, rv, entries),
                    (Some(lv), None) => entries.push(removed(child, lv)),
                    (None, Some(rv)) => entries.push(added(child, rv)),
                    (None, None) => {}
                }
            }
        }
        (l, r) if l != r => entries.push(DiffEntry {
            path: path.to_string(),
            kind: DiffKind::Changed,
            previous_value: Some(l.clone()),
            new_value: Some(r.clone()),
        }),
        _ => {}
    }
}

fn child_path(
    parent: &str,
    key: &str,
) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn added(
    path: String,
    value: &Value,
) -> DiffEntry {
    DiffEntry {
        path,
        kind: DiffKind::Added,
        previous_value: None,
        new_value: Some(value.clone()),
    }
}

fn removed(
    path: String,
    value: &Value,
) -> DiffEntry {
    DiffEntry {
        path,
        kind: DiffKind::Removed,
        previous_value: Some(value.clone()),
        new_value: None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn key_order_does_not_produce_differences() {
        let left = json!({"a": 1, "b": {"x": 1, "y": 2}});
        let right = json!({"b": {"y": 2, "x": 1}, "a": 1});

        assert_eq!(diff_documents(&left, &right), Ok(vec![]));
    }

    #[test]
    fn reports_added_removed_and_changed() {
        let left = json!({"keep": 1, "gone": true, "nested": {"v": "a"}});
        let right = json!({"keep": 1, "new": [1], "nested": {"v": "b"}});

        let entries = diff_documents(&left, &right).unwrap();

        assert_eq!(
            entries,
            vec![
                DiffEntry {
                    path: "gone".to_string(),
                    kind: DiffKind::Removed,
                    previous_value: Some(json!(true)),
                    new_value: None,
                },
                DiffEntry {
                    path: "nested.v".to_string(),
                    kind: DiffKind::Changed,
                    previous_value: Some(json!("a")),
                    new_value: Some(json!("b")),
                },
                DiffEntry {
                    path: "new".to_string(),
                    kind: DiffKind::Added,
                    previous_value: None,
                    new_value: Some(json!([1])),
                },
            ]
        );
    }

    #[test]
    fn arrays_compare_by_index() {
        let left = json!({"list": [1, 2, 3]});
        let right = json!({"list": [1, 3]});

        let paths: Vec<(String, DiffKind)> = diff_documents(&left, &right)
            .unwrap()
            .into_iter()
            .map(|e| (e.path, e.kind))
            .collect();

        assert_eq!(
            paths,
            vec![
                ("list[1]".to_string(), DiffKind::Changed),
                ("list[2]".to_string(), DiffKind::Removed),
            ]
        );
    }

    #[test]
    fn type_mismatch_is_a_change() {
        let entries = diff_documents(&json!({"a": {"b": 1}}), &json!({"a": [1]})).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "a");
        assert_eq!(entries[0].kind, DiffKind::Changed);
    }

    #[test]
    fn diff_is_symmetric() {
        let left = json!({"a": 1, "b": [1, 2], "c": {"d": null}});
        let right = json!({"a": 2, "b": [1], "e": "x"});

        let forward = diff_documents(&left, &right).unwrap();
        let backward: Vec<DiffEntry> = diff_documents(&right, &left)
            .unwrap()
            .into_iter()
            .map(DiffEntry::reversed)
            .collect();

        assert_eq!(forward, backward);
    }

    #[test]
    fn non_object_input_is_rejected() {
        assert_eq!(
            diff_documents(&json!([1]), &json!({})),
            Err(DiffError::NotAnObject { side: "left" })
        );
    }

    #[test]
    fn schedule_is_found_under_form() {
        let left = json!({"ITR": {"ITR2": {"ScheduleS": {"NetSalary": 100}}}});
        let right = json!({"ITR": {"ITR2": {"ScheduleS": {"NetSalary": 120}}}});

        let entries = diff_schedule(&left, &right, "ScheduleS").unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "NetSalary");
    }

    #[test]
    fn schedule_missing_on_one_side_is_all_added() {
        let left = json!({"ITR": {"ITR2": {}}});
        let right = json!({"ScheduleVIA": {"Total": 5}});

        let entries = diff_schedule(&left, &right, "ScheduleVIA").unwrap();

        assert_eq!(entries[0].kind, DiffKind::Added);
        assert_eq!(entries[0].path, "Total");
    }

    #[test]
    fn schedule_missing_on_both_sides_is_an_error() {
        let result = diff_schedule(&json!({}), &json!({}), "ScheduleS");

        assert_eq!(result, Err(DiffError::ScheduleNotFound("ScheduleS".to_string())));
    }

    #[test]
    fn display_renders_one_line_per_entry() {
        let entry = DiffEntry {
            path: "a.b".to_string(),
            kind: DiffKind::Changed,
            previous_value: Some(json!(1)),
            new_value: Some(json!(2)),
        };

        assert_eq!(entry.to_string(), "~ a.b: 1 -> 2");
    }
}
