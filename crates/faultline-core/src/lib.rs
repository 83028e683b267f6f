// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Normalized fault taxonomy for appliance control API responses.
//!
//! The upstream API reports failures in wildly inconsistent JSON shapes:
//! bare strings, `{message}` objects, nested reason/checklist trees,
//! field-path maps, and per-item record sequences. [`Fault`] is the closed
//! set of outcomes those shapes collapse into. Every variant carries its
//! payload as ordinary structured fields — callers pattern-match to get at
//! them — and renders to a deterministic, human-readable line via
//! [`Display`](std::fmt::Display).

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Reason
// ---------------------------------------------------------------------------

/// One normalized sub-failure extracted from a structured error payload.
///
/// Ordering within a sequence of reasons is significant: it is the
/// first-seen, depth-first order of the payload they were flattened from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    /// Object-type label reported by the appliance (e.g. `"profile"`).
    pub obj: String,
    /// Module that owns the failing object (e.g. `"sip"`).
    pub module: String,
    /// Human-readable description of the failure.
    pub description: String,
    /// Name of the specific object, when the payload carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Appliance backlink to the failing object, when the payload carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Reason {
    /// Label naming the object itself: its name when the payload carried
    /// one, the owning module otherwise.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.module)
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

// ---------------------------------------------------------------------------
// FieldError
// ---------------------------------------------------------------------------

/// A single field-validation failure keyed by its configuration path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Slash-separated path of the rejected field (e.g. `"global/hostname"`).
    pub path: String,
    /// What the appliance said is wrong with it.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

// ---------------------------------------------------------------------------
// Fault
// ---------------------------------------------------------------------------

/// Normalized failure reported by the appliance control API.
///
/// Exactly one variant is produced per classified response. Construction
/// is the classifier's job; values are immutable once built and safe to
/// send across threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fault {
    /// Any shape no narrower rule matched; carries the best available text.
    #[error("{text}")]
    Generic {
        /// Verbatim (or minimally joined) message text.
        text: String,
    },

    /// A generic failure tied to a specific object name.
    #[error("Error for {name}: {text}")]
    Named {
        /// Name of the object the request addressed.
        name: String,
        /// Message text.
        text: String,
    },

    /// A create operation was refused because the key already exists.
    #[error("The key '{key}' conflicts with the system")]
    ConfigurationConflict {
        /// The conflicting key (the object name from the request).
        key: String,
    },

    /// A delete was refused because another object still references this one.
    #[error("Error for {name}: In use by {} '{}'", holder.obj, holder.label())]
    ConfigurationInUse {
        /// Name of the object that could not be deleted.
        name: String,
        /// The object holding the reference.
        holder: Reason,
    },

    /// Per-field validation failures, in the order the appliance sent them.
    #[error("{}", join_fields(fields))]
    Validation {
        /// The rejected fields, document order preserved.
        fields: Vec<FieldError>,
    },

    /// An apply-style failure with plain-text reasons.
    #[error("{summary}: {}", reasons.join("\n"))]
    ApplyFailed {
        /// Joined upstream message.
        summary: String,
        /// The upstream reason lines, order preserved.
        reasons: Vec<String>,
    },

    /// A commit/checklist failure with structured sub-failures.
    #[error("{summary}: {}", join_reasons(reasons))]
    CommitFailed {
        /// Joined upstream message.
        summary: String,
        /// The flattened sub-failures, depth-first order preserved.
        reasons: Vec<Reason>,
    },

    /// The response body itself was a sequence of per-item failure records.
    #[error("{summary}: {}", lines.join("\n"))]
    BulkApplyFailed {
        /// Fixed summary for the bulk shape.
        summary: String,
        /// One formatted line per record, input order preserved.
        lines: Vec<String>,
    },
}

impl Fault {
    /// Structured sub-failures carried by commit-style faults.
    ///
    /// Empty for every other variant, so callers can always iterate.
    #[must_use]
    pub fn reasons(&self) -> &[Reason] {
        match self {
            Self::CommitFailed { reasons, .. } => reasons,
            _ => &[],
        }
    }

    /// Name of the object this fault is scoped to, when the variant
    /// carries one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named { name, .. } | Self::ConfigurationInUse { name, .. } => Some(name),
            Self::ConfigurationConflict { key } => Some(key),
            _ => None,
        }
    }

    /// Stable snake_case tag identifying the variant.
    ///
    /// Equal to the serde `kind` tag, so a serialized fault can be matched
    /// against it without deserializing.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Generic { .. } => "generic",
            Self::Named { .. } => "named",
            Self::ConfigurationConflict { .. } => "configuration_conflict",
            Self::ConfigurationInUse { .. } => "configuration_in_use",
            Self::Validation { .. } => "validation",
            Self::ApplyFailed { .. } => "apply_failed",
            Self::CommitFailed { .. } => "commit_failed",
            Self::BulkApplyFailed { .. } => "bulk_apply_failed",
        }
    }
}

fn join_reasons(reasons: &[Reason]) -> String {
    reasons
        .iter()
        .map(|r| r.description.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
