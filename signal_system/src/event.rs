//! Mutation event types and definitions
//!
//! This module defines the change sets computed for a write and the domain events
//! that flow through the signal system afterwards.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use type_mapping::{record_to_json, value_to_json, Record, SqlValue};

/// Who is performing a mutation. Carried opaquely into audit records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Correlation id of the inbound request
    pub request_id: Option<String>,
    /// Calling client application
    pub client_id: Option<String>,
    /// Acting user, when the caller is authenticated as one
    pub user_id: Option<String>,
    /// Remote address of the caller
    pub ip: Option<String>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self {
            request_id: Some(uuid::Uuid::new_v4().to_string()),
            ..Self::default()
        }
    }

    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }
}

/// How a relationship field changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Added,
    Changed,
    Deleted,
}

impl ChangeAction {
    /// Classify a relationship transition.
    ///
    /// `current` is `None` for a brand new resource. A transition from nothing (or null) to a
    /// value is `Added`, a value to null is `Deleted`, and everything else is `Changed`.
    pub fn classify(current: Option<&SqlValue>, next: &SqlValue) -> Self {
        match current {
            None => ChangeAction::Added,
            Some(prev) if prev.is_null() && !next.is_null() => ChangeAction::Added,
            Some(prev) if !prev.is_null() && next.is_null() => ChangeAction::Deleted,
            Some(_) => ChangeAction::Changed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Added => "added",
            ChangeAction::Changed => "changed",
            ChangeAction::Deleted => "deleted",
        }
    }
}

/// One changed field of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "lowercase")]
pub enum Change {
    /// Plain column change
    #[serde(rename = "attr")]
    Attribute { prev: SqlValue, next: SqlValue },
    /// Change of a field pointing at another resource type
    #[serde(rename = "rel", rename_all = "camelCase")]
    Relationship {
        action: ChangeAction,
        rel_type: String,
        rel_id: Option<String>,
    },
}

impl Change {
    pub fn is_relationship(&self) -> bool {
        matches!(self, Change::Relationship { .. })
    }

    /// JSON form used in audit payloads
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Change::Attribute { prev, next } => serde_json::json!({
                "t": "attr",
                "prev": value_to_json(prev),
                "next": value_to_json(next),
            }),
            Change::Relationship {
                action,
                rel_type,
                rel_id,
            } => serde_json::json!({
                "t": "rel",
                "action": action.as_str(),
                "relType": rel_type,
                "relId": rel_id,
            }),
        }
    }
}

/// Field-level diff of one write, in field order of the merged resource
pub type ChangeSet = IndexMap<String, Change>;

/// JSON form of a whole change set
pub fn change_set_to_json(changes: &ChangeSet) -> serde_json::Value {
    serde_json::Value::Object(
        changes
            .iter()
            .map(|(field, change)| (field.clone(), change.to_json()))
            .collect(),
    )
}

/// Kind of mutation a domain event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Created,
    Updated,
    Deleted,
}

impl EventAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventAction::Created => "created",
            EventAction::Updated => "updated",
            EventAction::Deleted => "deleted",
        }
    }
}

/// Domain event published after a resource is written or removed
#[derive(Debug, Clone, PartialEq)]
pub struct DomainEvent {
    pub action: EventAction,
    /// Tag of the resource type
    pub resource_type: String,
    /// Full resource as stored
    pub resource: Record,
    /// Event timestamp (UTC)
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl DomainEvent {
    pub fn new(action: EventAction, resource_type: impl Into<String>, resource: Record) -> Self {
        Self {
            action,
            resource_type: resource_type.into(),
            resource,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Wire payload: `{action, resource: {type, ...fields}}`
    pub fn payload(&self) -> serde_json::Value {
        let mut resource = serde_json::Map::new();
        resource.insert(
            "type".to_string(),
            serde_json::Value::String(self.resource_type.clone()),
        );
        if let serde_json::Value::Object(fields) = record_to_json(&self.resource) {
            resource.extend(fields);
        }
        serde_json::json!({
            "action": self.action.as_str(),
            "resource": resource,
        })
    }
}
