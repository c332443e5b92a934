//! Convenience re-exports for common signal-system usage

// Core signal system components
pub use crate::audit::{AuditClient, AuditTarget, TracingAuditClient};
pub use crate::event::{AuthContext, Change, ChangeAction, ChangeSet, DomainEvent, EventAction};
pub use crate::manager::SignalManager;
pub use crate::types::{EventCallback, Publisher};

// Common external dependencies
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use serde_json;
pub use tokio;
