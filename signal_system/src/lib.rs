//! Signal system for resource mutation events
//!
//! This crate provides change sets, audit records and async domain event publication
//! for resource writes in the ResourceHaus ecosystem.

pub mod audit;
pub mod event;
pub mod manager;
pub mod prelude;
pub mod types;

pub use audit::{AuditClient, AuditTarget, TracingAuditClient};
pub use event::{
    change_set_to_json, AuthContext, Change, ChangeAction, ChangeSet, DomainEvent, EventAction,
};
pub use manager::SignalManager;
pub use types::{EventCallback, EventProcessingError, Publisher};
