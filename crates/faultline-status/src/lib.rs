// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Pending-change bookkeeping for appliance apply cycles.
//!
//! After configuration edits, the appliance reports which items still
//! need action before the running state matches the stored one. Newer
//! firmware splits the pending set into `reload`, `restart`, and `apply`
//! sections depending on the kind of change and the running state; older
//! firmware reports a flat `reloadable` map. [`parse_pending`] reads
//! both.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Sections newer firmware splits the pending set into.
const SECTIONS: &[&str] = &["reload", "restart", "apply"];

// ---------------------------------------------------------------------------
// PendingChange
// ---------------------------------------------------------------------------

/// One configuration item awaiting a reload, restart, or apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChange {
    /// Module the change belongs to.
    pub module: String,
    /// Reported state (e.g. `"reload"`, `"restart"`).
    pub status: String,
    /// Human-readable description; falls back to the module name.
    pub description: String,
}

impl PendingChange {
    /// Build a pending change, defaulting the description to the module
    /// name when the payload carries none.
    #[must_use]
    pub fn new(
        module: impl Into<String>,
        status: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        let module = module.into();
        let description = description.unwrap_or_else(|| module.clone());
        Self {
            module,
            status: status.into(),
            description,
        }
    }

    fn from_item(item: &Value) -> Option<Self> {
        let module = item.get("module")?.as_str()?;
        let status = item.get("status")?.as_str()?;
        let description = item
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Some(Self::new(module, status, description))
    }
}

impl fmt::Display for PendingChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.description)
    }
}

// ---------------------------------------------------------------------------
// parse_pending
// ---------------------------------------------------------------------------

/// Collect every pending change advertised by an appliance status payload.
///
/// Reads the sectioned shape (`reload`/`restart`/`apply`, each holding
/// `{items: [{module, status, description}]}`) and the legacy flat
/// `reloadable` map (`{module: {configuration: state}}`). Items missing
/// required fields are skipped; a non-mapping payload yields an empty
/// vector.
#[must_use]
pub fn parse_pending(status: &Value) -> Vec<PendingChange> {
    let mut pending = Vec::new();
    let Some(map) = status.as_object() else {
        return pending;
    };

    for section in SECTIONS {
        if let Some(items) = map
            .get(*section)
            .and_then(|s| s.get("items"))
            .and_then(Value::as_array)
        {
            pending.extend(items.iter().filter_map(PendingChange::from_item));
        }
    }

    // Legacy firmware compatibility.
    if let Some(legacy) = map.get("reloadable").and_then(Value::as_object) {
        for (module, entry) in legacy {
            if let Some(state) = entry.get("configuration").and_then(Value::as_str) {
                pending.push(PendingChange::new(module.clone(), state, None));
            }
        }
    }

    pending
}

// ---------------------------------------------------------------------------
// ApplyIncomplete
// ---------------------------------------------------------------------------

/// An apply cycle finished but left changes pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("Failed to apply all changes: {}", join_pending(pending))]
pub struct ApplyIncomplete {
    /// The items still awaiting action, in reported order.
    pub pending: Vec<PendingChange>,
}

impl ApplyIncomplete {
    /// Wrap the still-pending items.
    #[must_use]
    pub fn new(pending: Vec<PendingChange>) -> Self {
        Self { pending }
    }
}

fn join_pending(pending: &[PendingChange]) -> String {
    pending
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
