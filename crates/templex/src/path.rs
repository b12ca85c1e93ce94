// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Dotted path resolution over context values.
//!
//! A path such as `.tasks.first.started_at` is split on `.` and applied one
//! segment at a time. How a segment is applied depends on the shape of the
//! current value:
//!
//! | Shape | Segment |
//! |-------|---------|
//! | Record | field name or alias, via [`Record::lookup`](crate::Record::lookup) |
//! | Map | exact key |
//! | List | `first`, `last` or a decimal index below the length |
//! | Scalar | never resolves |
//!
//! Any segment that does not resolve makes the whole path unresolved. There
//! is no error for a missing path, only `None`.

use crate::value::Value;
use std::borrow::Cow;

/// Splits a path into its segments, skipping empty ones such as the one
/// before a leading `.`.
///
/// Returns `None` when the last segment is empty, so `""`, `"."` and
/// `"tasks."` name nothing.
pub fn segments(path: &str) -> Option<impl Iterator<Item = &str>> {
    if path.is_empty() || path.ends_with('.') {
        return None;
    }
    Some(path.split('.').filter(|segment| !segment.is_empty()))
}

/// Resolves `path` against `value`.
///
/// A path that is empty or ends in `.` does not resolve. Values found inside
/// maps and lists are borrowed; values produced by records are owned.
///
/// # Example
///
/// ```rust
/// use templex::{path::resolve, Value};
/// use serde_json::json;
///
/// let ctx = Value::from(json!({ "items": ["a", "b", "c"] }));
/// assert_eq!(resolve(&ctx, ".items.last").as_deref(), Some(&Value::from("c")));
/// assert!(resolve(&ctx, ".items.3").is_none());
/// assert!(resolve(&ctx, ".items.").is_none());
/// ```
pub fn resolve<'a>(value: &'a Value, path: &str) -> Option<Cow<'a, Value>> {
    resolve_segments(value, segments(path)?)
}

/// Resolves pre-split segments against `value`.
pub fn resolve_segments<'a, 'p>(
    value: &'a Value,
    segments: impl IntoIterator<Item = &'p str>,
) -> Option<Cow<'a, Value>> {
    let mut current = Cow::Borrowed(value);
    for segment in segments {
        current = match current {
            Cow::Borrowed(value) => child(value, segment)?,
            Cow::Owned(value) => Cow::Owned(child(&value, segment)?.into_owned()),
        };
    }
    Some(current)
}

/// Applies a single segment to a value.
pub fn child<'a>(value: &'a Value, segment: &str) -> Option<Cow<'a, Value>> {
    match value {
        Value::Record(record) => record.lookup(segment).map(Cow::Owned),
        Value::Map(map) => map.get(segment).map(Cow::Borrowed),
        Value::List(items) => list_index(segment, items.len()).map(|i| Cow::Borrowed(&items[i])),
        Value::Scalar(_) => None,
    }
}

/// Maps a list segment to an index that is in bounds for `len`.
fn list_index(segment: &str, len: usize) -> Option<usize> {
    let index = match segment {
        "first" => 0,
        "last" => len.checked_sub(1)?,
        _ if segment.bytes().all(|b| b.is_ascii_digit()) => segment.parse().ok()?,
        _ => return None,
    };
    (index < len).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Field, Record};
    use serde_json::json;

    fn context() -> Value {
        Value::from(json!({
            "task_count": 3,
            "tasks": [
                { "started_at": 1001001, "ended_at": 1001005 },
                { "started_at": 1001002, "ended_at": 1001006 },
                { "started_at": 1001003, "ended_at": 1001007 }
            ],
            "empty": [],
            "owner": { "name": "ops" }
        }))
    }

    fn get(ctx: &Value, path: &str) -> Option<Value> {
        resolve(ctx, path).map(Cow::into_owned)
    }

    #[test]
    fn map_keys_and_nesting() {
        let ctx = context();
        assert_eq!(get(&ctx, ".task_count"), Some(Value::from(3i64)));
        assert_eq!(get(&ctx, ".owner.name"), Some(Value::from("ops")));
        assert_eq!(get(&ctx, "owner.name"), Some(Value::from("ops")));
    }

    #[test]
    fn list_first_last_and_index() {
        let ctx = context();
        assert_eq!(get(&ctx, ".tasks.first.started_at"), Some(Value::from(1001001i64)));
        assert_eq!(get(&ctx, ".tasks.last.ended_at"), Some(Value::from(1001007i64)));
        assert_eq!(get(&ctx, ".tasks.1.started_at"), Some(Value::from(1001002i64)));
    }

    #[test]
    fn index_equal_to_length_is_out_of_range() {
        let ctx = context();
        assert_eq!(get(&ctx, ".tasks.3"), None);
        assert_eq!(get(&ctx, ".tasks.2.started_at"), Some(Value::from(1001003i64)));
    }

    #[test]
    fn empty_list_has_no_first_or_last() {
        let ctx = context();
        assert_eq!(get(&ctx, ".empty.first"), None);
        assert_eq!(get(&ctx, ".empty.last"), None);
    }

    #[test]
    fn invalid_list_segments() {
        let ctx = context();
        for path in [".tasks.-1", ".tasks.+1", ".tasks.one", ".tasks.started_at"] {
            assert_eq!(get(&ctx, path), None, "path {}", path);
        }
    }

    #[test]
    fn missing_and_scalar_segments() {
        let ctx = context();
        assert_eq!(get(&ctx, ".missing"), None);
        assert_eq!(get(&ctx, ".owner.missing"), None);
        assert_eq!(get(&ctx, ".task_count.value"), None);
    }

    #[test]
    fn empty_or_trailing_dot_paths_do_not_resolve() {
        let ctx = context();
        assert_eq!(get(&ctx, ""), None);
        assert_eq!(get(&ctx, "."), None);
        assert_eq!(get(&ctx, ".."), None);
        assert!(get(&ctx, "owner").is_some());
        assert_eq!(get(&ctx, "owner."), None);
        assert_eq!(get(&ctx, ".owner.name."), None);
        // Empty segments before the last one are skipped.
        assert_eq!(get(&ctx, "..owner..name"), get(&ctx, ".owner.name"));
    }

    #[test]
    fn records_and_owned_values_chain() {
        #[derive(Debug)]
        struct Schedule {
            tasks: Vec<i64>,
        }

        impl Record for Schedule {
            fn fields(&self) -> &[Field] {
                const FIELDS: &[Field] = &[Field::new("tasks").alias("jobs")];
                FIELDS
            }

            fn field(&self, name: &str) -> Option<Value> {
                (name == "tasks").then(|| self.tasks.clone().into())
            }
        }

        let ctx: Value = [(
            "schedule",
            Value::record(Schedule {
                tasks: vec![5, 6, 7],
            }),
        )]
        .into_iter()
        .collect();

        assert_eq!(get(&ctx, ".schedule.jobs.last"), Some(Value::from(7i64)));
        assert_eq!(get(&ctx, ".schedule.tasks.0"), Some(Value::from(5i64)));
        assert_eq!(get(&ctx, ".schedule.other"), None);
    }
}
