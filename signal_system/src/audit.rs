//! Audit client seam
//!
//! Writes report who created, changed or removed which resource. The transport is up to
//! the implementor; failures are surfaced as `anyhow::Error` and propagate to the caller
//! of the write.

use crate::event::{AuthContext, ChangeSet};
use async_trait::async_trait;
use serde::Serialize;

/// Target of an audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTarget {
    pub target_type: String,
    pub target_id: String,
}

impl AuditTarget {
    pub fn new(target_type: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            target_id: target_id.into(),
        }
    }
}

/// Records resource lifecycle events
#[async_trait]
pub trait AuditClient: Send + Sync {
    async fn record_create(&self, auth: &AuthContext, target: AuditTarget) -> anyhow::Result<()>;

    async fn record_update(
        &self,
        auth: &AuthContext,
        target: AuditTarget,
        changes: &ChangeSet,
    ) -> anyhow::Result<()>;

    async fn record_delete(&self, auth: &AuthContext, target: AuditTarget) -> anyhow::Result<()>;
}

/// Audit client that writes each record as a structured log line
#[derive(Debug, Default, Clone)]
pub struct TracingAuditClient;

#[async_trait]
impl AuditClient for TracingAuditClient {
    async fn record_create(&self, auth: &AuthContext, target: AuditTarget) -> anyhow::Result<()> {
        tracing::info!(
            target_type = %target.target_type,
            target_id = %target.target_id,
            user = ?auth.user_id,
            request = ?auth.request_id,
            "audit: create"
        );
        Ok(())
    }

    async fn record_update(
        &self,
        auth: &AuthContext,
        target: AuditTarget,
        changes: &ChangeSet,
    ) -> anyhow::Result<()> {
        tracing::info!(
            target_type = %target.target_type,
            target_id = %target.target_id,
            user = ?auth.user_id,
            request = ?auth.request_id,
            changes = %crate::event::change_set_to_json(changes),
            "audit: update"
        );
        Ok(())
    }

    async fn record_delete(&self, auth: &AuthContext, target: AuditTarget) -> anyhow::Result<()> {
        tracing::info!(
            target_type = %target.target_type,
            target_id = %target.target_id,
            user = ?auth.user_id,
            request = ?auth.request_id,
            "audit: delete"
        );
        Ok(())
    }
}
