// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Shape classification for appliance error payloads.
//!
//! The control API has no single error schema: depending on which
//! operation failed, the payload may be a bare string, a `{message}`
//! object, a nested reason or checklist tree, a field-path validation
//! map, or a sequence of per-item failure records. [`classify`] inspects
//! one decoded body together with the request metadata and collapses it
//! into a single [`Fault`] using an ordered set of pattern rules, most
//! specific first. Classification never fails — anything unmatched
//! degrades to [`Fault::Generic`] over the stringified body.

mod flatten;

pub use flatten::{flatten, flatten_to_strings};

use faultline_core::{Fault, FieldError, Reason};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

// ---------------------------------------------------------------------------
// RequestContext
// ---------------------------------------------------------------------------

/// Request metadata extracted from the response envelope.
///
/// The four fields ride at the top level of the response, next to the
/// `error` payload. Absent fields are distinct from empty strings: an
/// unset `name` suppresses the `Error for <name>:` prefix entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Object type the request addressed (e.g. `"profile"`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub obj_type: Option<String>,
    /// API method (e.g. `"create"`, `"delete"`, `"smartapply"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Module the request addressed (e.g. `"sip"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Name of the object the request addressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RequestContext {
    /// Context with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the context fields from a full response envelope.
    ///
    /// Non-mapping responses (e.g. a bare string body) carry no context.
    #[must_use]
    pub fn from_envelope(response: &Value) -> Self {
        let Some(map) = response.as_object() else {
            return Self::default();
        };
        let field = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_owned);
        Self {
            obj_type: field("type"),
            method: field("method"),
            module: field("module"),
            name: field("name"),
        }
    }

    /// Set the object type.
    #[must_use]
    pub fn with_obj_type(mut self, obj_type: impl Into<String>) -> Self {
        self.obj_type = Some(obj_type.into());
        self
    }

    /// Set the API method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the module.
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Set the object name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// `true` when the context describes a create-type operation.
    #[must_use]
    pub fn is_create(&self) -> bool {
        self.method.as_deref() == Some("create")
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Literal marker the upstream embeds in a `message` when a delete target
/// is still referenced. Exact upstream wording; do not loosen.
const IN_USE_MARKER: &str = "is use by";

/// Literal `message` the upstream sends when a create hits an existing key.
const CONFLICT_MARKER: &str = "Conflict";

/// Summary used when an apply/commit payload carries no usable `message`.
const APPLY_FALLBACK_SUMMARY: &str = "Apply changes failed";

/// Fixed summary for bulk record-sequence bodies.
const BULK_SUMMARY: &str = "Failed to apply changes";

/// Top-level keys of an error mapping that never name a configuration
/// field.
const RESERVED_KEYS: &[&str] = &["message", "reason", "status", "obj"];

/// Parts of a bulk record that make up its report line, in render order.
const BULK_LINE_KEYS: &[&str] = &["module", "obj_type", "description", "type"];

/// Collapse one decoded response body into a [`Fault`].
///
/// The body is the full response mapping (its `error` key holding the
/// payload), a bare message string, or a record sequence. First matching
/// rule wins; unmatched or malformed shapes degrade to [`Fault::Generic`]
/// carrying the stringified body.
#[must_use]
pub fn classify(body: &Value, ctx: &RequestContext) -> Fault {
    let fault = match body {
        Value::String(text) => Fault::Generic { text: text.clone() },
        Value::Array(items) => classify_sequence(body, items, ctx),
        Value::Object(map) => match map.get("error") {
            Some(error) => classify_error(error, ctx),
            None => Fault::Generic {
                text: stringify(body),
            },
        },
        other => Fault::Generic {
            text: stringify(other),
        },
    };
    debug!(target: "faultline.classify", kind = fault.kind(), "classified response");
    fault
}

/// One-shot normalization of a full response envelope.
///
/// Extracts the request context from the response's top-level fields,
/// then classifies the response.
#[must_use]
pub fn normalize(response: &Value) -> Fault {
    classify(response, &RequestContext::from_envelope(response))
}

fn classify_sequence(body: &Value, items: &[Value], ctx: &RequestContext) -> Fault {
    if items.first().is_some_and(Value::is_object) {
        return Fault::BulkApplyFailed {
            summary: BULK_SUMMARY.to_owned(),
            lines: items.iter().map(bulk_line).collect(),
        };
    }
    match join_lines(body) {
        Some(text) => named_or_generic(text, ctx),
        None => Fault::Generic {
            text: stringify(body),
        },
    }
}

fn classify_error(error: &Value, ctx: &RequestContext) -> Fault {
    match error {
        Value::String(text) => named_or_generic(text.clone(), ctx),
        Value::Array(items) => classify_sequence(error, items, ctx),
        Value::Object(map) => classify_error_object(error, map, ctx),
        other => Fault::Generic {
            text: stringify(other),
        },
    }
}

fn classify_error_object(error: &Value, map: &Map<String, Value>, ctx: &RequestContext) -> Fault {
    // An empty message is as good as a missing one.
    let message = map
        .get("message")
        .and_then(join_lines)
        .filter(|m| !m.is_empty());

    // Apply-style: a reason that is plain text (string or list of strings).
    if let Some(reason) = map.get("reason")
        && let Some(lines) = string_lines(reason)
    {
        return Fault::ApplyFailed {
            summary: message.unwrap_or_else(|| APPLY_FALLBACK_SUMMARY.to_owned()),
            reasons: lines,
        };
    }

    // In-use: the message carries the literal marker and the holder rides
    // under `obj` (occasionally `reason`) as a single record.
    if let Some(text) = message.as_deref()
        && text.contains(IN_USE_MARKER)
        && let Some(holder) = single_record(map)
    {
        return match &ctx.name {
            Some(name) => Fault::ConfigurationInUse {
                name: name.clone(),
                holder,
            },
            // No subject to prefix with; keep the friendlier text anyway.
            None => Fault::Generic {
                text: format!("In use by {} '{}'", holder.obj, holder.label()),
            },
        };
    }

    // Commit-style: structured (possibly mixed) reason records.
    if let Some(reason) = map.get("reason") {
        let reasons = flatten(reason);
        if !reasons.is_empty() {
            return Fault::CommitFailed {
                summary: message
                    .clone()
                    .unwrap_or_else(|| APPLY_FALLBACK_SUMMARY.to_owned()),
                reasons,
            };
        }
    }

    // Checklist: per-item commit failures under `status.checklist.items`.
    if let Some(items) = map
        .get("status")
        .and_then(|status| status.get("checklist"))
        .and_then(|checklist| checklist.get("items"))
    {
        let reasons = flatten(items);
        if !reasons.is_empty() {
            return Fault::CommitFailed {
                summary: message
                    .clone()
                    .unwrap_or_else(|| APPLY_FALLBACK_SUMMARY.to_owned()),
                reasons,
            };
        }
    }

    // Message-only: the conflict marker on create, else named/generic text.
    if let Some(text) = message {
        if text == CONFLICT_MARKER
            && ctx.is_create()
            && let Some(name) = &ctx.name
        {
            return Fault::ConfigurationConflict { key: name.clone() };
        }
        return named_or_generic(text, ctx);
    }

    // Field-path validation map: no message, every remaining entry a
    // string or a nested mapping of strings.
    if let Some(fields) = field_errors(map) {
        return Fault::Validation { fields };
    }

    Fault::Generic {
        text: stringify(error),
    }
}

// ---------------------------------------------------------------------------
// Shape helpers
// ---------------------------------------------------------------------------

/// The single multi-line policy: a string passes through unchanged, a
/// list of strings joins with one newline, order preserved.
fn join_lines(value: &Value) -> Option<String> {
    string_lines(value).map(|lines| lines.join("\n"))
}

fn string_lines(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(text) => Some(vec![text.clone()]),
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_string) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
        ),
        _ => None,
    }
}

fn named_or_generic(text: String, ctx: &RequestContext) -> Fault {
    match &ctx.name {
        Some(name) => Fault::Named {
            name: name.clone(),
            text,
        },
        None => Fault::Generic { text },
    }
}

/// The single record referenced by an in-use payload, if there is exactly
/// one.
fn single_record(map: &Map<String, Value>) -> Option<Reason> {
    let node = map.get("obj").or_else(|| map.get("reason"))?;
    let mut reasons = flatten(node);
    if reasons.len() == 1 { reasons.pop() } else { None }
}

fn bulk_line(item: &Value) -> String {
    match item {
        Value::String(text) => text.clone(),
        Value::Object(map) => {
            let parts: Vec<&str> = BULK_LINE_KEYS
                .iter()
                .filter_map(|key| map.get(*key).and_then(Value::as_str))
                .collect();
            if parts.is_empty() {
                stringify(item)
            } else {
                parts.join(" - ")
            }
        }
        other => stringify(other),
    }
}

fn field_errors(map: &Map<String, Value>) -> Option<Vec<FieldError>> {
    let mut fields = Vec::new();
    for (key, value) in map {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        if !collect_field(key.clone(), value, 0, &mut fields) {
            return None;
        }
    }
    (!fields.is_empty()).then_some(fields)
}

/// Returns `false` when a value cannot be a validation message, aborting
/// the validation interpretation for the whole mapping.
fn collect_field(path: String, value: &Value, depth: usize, out: &mut Vec<FieldError>) -> bool {
    if depth > flatten::MAX_DEPTH {
        return false;
    }
    match value {
        Value::Object(inner) => {
            for (key, value) in inner {
                if !collect_field(format!("{path}/{key}"), value, depth + 1, out) {
                    return false;
                }
            }
            true
        }
        Value::String(message) if !message.is_empty() => {
            out.push(FieldError {
                path,
                message: message.clone(),
            });
            true
        }
        Value::String(_) | Value::Null => {
            out.push(FieldError {
                path,
                message: "unknown error".to_owned(),
            });
            true
        }
        _ => false,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
