// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recursive flattening of nested reason trees.
//!
//! Structured error payloads nest their sub-failures under `reason`,
//! `obj`, or a `status.checklist.items` path, sometimes several levels
//! deep and sometimes mixing bare strings into a record list. [`flatten`]
//! walks any of those shapes depth-first, left to right, and produces the
//! flat ordered [`Reason`] sequence the taxonomy carries.

use faultline_core::Reason;
use serde_json::{Map, Value};

/// Hard cap on recursion depth while walking nested structures.
///
/// Natural payloads are two or three levels deep; the cap guarantees
/// termination on adversarial nesting.
pub(crate) const MAX_DEPTH: usize = 16;

/// Keys a non-record mapping may nest further reasons under, in descent
/// order. `status` → `checklist` → `items` is the checklist path.
const NESTING_KEYS: &[&str] = &["reason", "obj", "status", "checklist", "items"];

/// Flatten `node` into an ordered sequence of [`Reason`]s.
///
/// Accepts a single reason-shaped mapping, a sequence of them, or a
/// nested mapping carrying any of `reason`, `obj`, or
/// `status.checklist.items`. Bare strings inside a reason list become
/// description-only records — the upstream mixes both in one list. Empty
/// or absent structures flatten to an empty vector, never an error.
#[must_use]
pub fn flatten(node: &Value) -> Vec<Reason> {
    let mut out = Vec::new();
    walk(node, 0, &mut out);
    out
}

/// Project `node` to plain description strings.
///
/// A bare string or a list of strings passes through unchanged; anything
/// else is flattened first. The upstream sends `reason` in both forms for
/// the same conceptual field.
#[must_use]
pub fn flatten_to_strings(node: &Value) -> Vec<String> {
    match node {
        Value::String(text) => vec![text.clone()],
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        other => flatten(other).into_iter().map(|r| r.description).collect(),
    }
}

fn walk(node: &Value, depth: usize, out: &mut Vec<Reason>) {
    if depth > MAX_DEPTH {
        return;
    }
    match node {
        Value::Array(items) => {
            for item in items {
                walk(item, depth + 1, out);
            }
        }
        Value::Object(map) if is_record(map) => out.push(record(map)),
        Value::Object(map) => {
            for key in NESTING_KEYS {
                if let Some(inner) = map.get(*key) {
                    walk(inner, depth + 1, out);
                }
            }
        }
        Value::String(text) => out.push(Reason {
            obj: String::new(),
            module: String::new(),
            description: text.clone(),
            name: None,
            url: None,
        }),
        _ => {}
    }
}

/// A mapping counts as a leaf record when it carries `obj_type`, or a
/// `description` without any nesting key (a checklist node also carries a
/// `description`, but its `items` mark it as structure, not record).
fn is_record(map: &Map<String, Value>) -> bool {
    map.contains_key("obj_type")
        || (map.contains_key("description") && !NESTING_KEYS.iter().any(|k| map.contains_key(*k)))
}

fn record(map: &Map<String, Value>) -> Reason {
    let obj = str_field(map, "obj_type").unwrap_or_default();
    // The in-use payload labels the owning module `name` instead.
    let module = str_field(map, "module")
        .or_else(|| str_field(map, "name"))
        .unwrap_or_default();
    let name = str_field(map, "obj_name");
    let url = str_field(map, "url");
    let description = match str_field(map, "description") {
        Some(description) => description,
        None => synthesize_label(&module, &obj, name.as_deref()),
    };
    Reason {
        obj,
        module,
        description,
        name,
        url,
    }
}

/// Stand-in description built from whatever labeling fields are present.
fn synthesize_label(module: &str, obj: &str, name: Option<&str>) -> String {
    let parts: Vec<&str> = [module, obj, name.unwrap_or("")]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        "unknown error".to_owned()
    } else {
        parts.join(" - ")
    }
}

fn str_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_owned)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
