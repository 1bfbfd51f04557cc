//! Change planning
//!
//! Decides which lifecycle operation brings tracked state in line with a
//! declaration. `domain` and `type` cannot change in place: a difference in
//! either is planned as a replacement (delete, then create).

use crate::record::{RecordSpec, RecordState};

/// The operation needed to converge a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Nothing tracked yet
    Create,
    /// Mutable fields drifted
    Update {
        /// Attributes that differ
        changed: Vec<&'static str>,
    },
    /// An immutable field differs
    Replace {
        /// Attribute that forces replacement
        reason: &'static str,
    },
    /// Tracked state matches the declaration
    NoChange,
}

impl Plan {
    /// Plan the operation for a resource
    pub fn for_resource(prior: Option<&RecordState>, desired: &RecordSpec) -> Self {
        let Some(prior) = prior else {
            return Plan::Create;
        };

        if prior.domain != desired.domain {
            return Plan::Replace { reason: "domain" };
        }
        if prior.record_type != desired.record_type {
            return Plan::Replace { reason: "type" };
        }

        let changed = changed_fields(prior, desired);
        if changed.is_empty() {
            Plan::NoChange
        } else {
            Plan::Update { changed }
        }
    }

    /// Whether the plan calls the API at all
    pub fn has_changes(&self) -> bool {
        !matches!(self, Plan::NoChange)
    }
}

fn changed_fields(prior: &RecordState, desired: &RecordSpec) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if prior.name != desired.name {
        changed.push("name");
    }
    if prior.value != desired.value {
        changed.push("value");
    }
    if prior.regions != desired.regions {
        changed.push("regions");
    }
    if drifted(&prior.ttl, Some(&desired.ttl)) {
        changed.push("ttl");
    }
    // computed when not declared
    if drifted(&prior.priority, desired.priority.as_deref()) {
        changed.push("priority");
    }
    changed
}

/// Whether a declared string-encoded integer differs from the tracked one
///
/// A value that does not parse is never sent to the API, so it counts as
/// not declared and cannot drift.
fn drifted(tracked: &str, declared: Option<&str>) -> bool {
    let Some(declared) = declared.and_then(|raw| raw.trim().parse::<i64>().ok()) else {
        return false;
    };
    tracked.trim().parse::<i64>().ok() != Some(declared)
}
