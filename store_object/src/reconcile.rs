//! Resource reconciler
//!
//! Diffs an incoming (partial) resource against the stored one and classifies each changed
//! field as an attribute change or a relationship change.

use crate::registry::ResourceEntry;
use signal_system::{Change, ChangeAction, ChangeSet};
use type_mapping::{Record, SqlValue};

/// Outcome of reconciling one write
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    /// Full resource after the write
    pub resource: Record,
    /// Changed fields in resource field order
    pub changes: ChangeSet,
    /// No stored resource existed
    pub is_new: bool,
}

impl Reconciled {
    /// An existing resource with nothing to change
    pub fn is_noop(&self) -> bool {
        !self.is_new && self.changes.is_empty()
    }
}

/// Merge `incoming` over `current` (or over fresh defaults when there is no current resource)
/// and compute the change set.
///
/// Values are compared by content, so two byte buffers with the same bytes are equal.
pub fn reconcile(entry: &ResourceEntry, current: Option<&Record>, incoming: Record) -> Reconciled {
    let mut resource = match current {
        Some(current) => current.clone(),
        None => entry.defaults.materialize(),
    };
    resource.extend(incoming);

    let mut changes = ChangeSet::new();
    for (field, next) in &resource {
        let previous = match current {
            Some(current) => {
                let previous = current.get(field);
                if previous == Some(next) {
                    continue;
                }
                Some(previous.unwrap_or(&SqlValue::Null))
            }
            None => None,
        };

        let change = match entry.relationship(field) {
            Some(related) => Change::Relationship {
                action: ChangeAction::classify(previous, next),
                rel_type: related.to_string(),
                rel_id: next.to_text(),
            },
            None => Change::Attribute {
                prev: previous.cloned().unwrap_or(SqlValue::Null),
                next: next.clone(),
            },
        };
        changes.insert(field.clone(), change);
    }

    Reconciled {
        resource,
        changes,
        is_new: current.is_none(),
    }
}
