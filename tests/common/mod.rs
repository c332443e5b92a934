//! Shared fixtures for the store integration tests
#![allow(dead_code)]

use resourcehaus::prelude::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ResourceKind)]
pub enum Resource {
    Users,
    Addresses,
    Organizations,
    #[resource(tag = "org-roles", table = "organization-roles")]
    OrgRoles,
    #[resource(primary_key = "petId")]
    Pets,
}

pub fn registry() -> ResourceRegistry<Resource> {
    ResourceRegistry::build(|kind| match kind {
        Resource::Users => ResourceSpec::new().defaults(
            text_id_default()
                .merge(Defaults::new().literal("status", "active")),
        ),
        Resource::Addresses => ResourceSpec::new().relationship("userId", "users"),
        Resource::Organizations => ResourceSpec::new(),
        Resource::OrgRoles => ResourceSpec::new()
            .relationship("organizationId", "organizations")
            .relationship("userId", "users"),
        Resource::Pets => ResourceSpec::new(),
    })
    .unwrap()
}

pub fn record(fields: &[(&str, SqlValue)]) -> Record {
    fields
        .iter()
        .map(|(field, value)| (field.to_string(), value.clone()))
        .collect()
}

pub fn text(value: &str) -> SqlValue {
    SqlValue::Text(value.to_string())
}

/// One statement seen by [`MockSql`]
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub query: String,
    pub params: Option<Vec<SqlValue>>,
}

/// Executor that records statements and replays scripted results.
///
/// Statements without a scripted result return no rows.
#[derive(Default)]
pub struct MockSql {
    executed: Mutex<Vec<Executed>>,
    responses: Mutex<VecDeque<Result<Vec<Record>, String>>>,
}

impl MockSql {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, rows: Vec<Record>) {
        self.responses.lock().unwrap().push_back(Ok(rows));
    }

    pub fn fail(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.executed.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.executed().into_iter().map(|e| e.query).collect()
    }
}

#[async_trait]
impl SqlExecutor for MockSql {
    async fn execute(
        &self,
        query: &str,
        params: Option<&[SqlValue]>,
    ) -> Result<Vec<Record>, StoreError> {
        self.executed.lock().unwrap().push(Executed {
            query: query.to_string(),
            params: params.map(|p| p.to_vec()),
        });
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(rows)) => Ok(rows),
            Some(Err(message)) => Err(StoreError::DatabaseError(message)),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuditEntry {
    Create(AuditTarget),
    Update(AuditTarget, ChangeSet),
    Delete(AuditTarget),
}

#[derive(Default)]
pub struct RecordingAudit {
    entries: Mutex<Vec<AuditEntry>>,
    failing: AtomicBool,
}

impl RecordingAudit {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let audit = Self::default();
        audit.failing.store(true, Ordering::SeqCst);
        Arc::new(audit)
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }

    fn push(&self, entry: AuditEntry) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("audit service unavailable");
        }
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

#[async_trait]
impl AuditClient for RecordingAudit {
    async fn record_create(&self, _auth: &AuthContext, target: AuditTarget) -> anyhow::Result<()> {
        self.push(AuditEntry::Create(target))
    }

    async fn record_update(
        &self,
        _auth: &AuthContext,
        target: AuditTarget,
        changes: &ChangeSet,
    ) -> anyhow::Result<()> {
        self.push(AuditEntry::Update(target, changes.clone()))
    }

    async fn record_delete(&self, _auth: &AuthContext, target: AuditTarget) -> anyhow::Result<()> {
        self.push(AuditEntry::Delete(target))
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<DomainEvent>>,
    failing: AtomicBool,
}

impl RecordingPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let publisher = Self::default();
        publisher.failing.store(true, Ordering::SeqCst);
        Arc::new(publisher)
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, event: DomainEvent) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("broker unavailable");
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Store over `sql` with default configuration and no cache, audit or publisher
pub fn store(sql: &Arc<MockSql>) -> ResourceStore<Resource> {
    ResourceStore::new(sql.clone(), registry())
}

/// Store with audit and publisher attached
pub fn observed_store(
    sql: &Arc<MockSql>,
    audit: &Arc<RecordingAudit>,
    publisher: &Arc<RecordingPublisher>,
) -> ResourceStore<Resource> {
    store(sql)
        .with_audit(audit.clone())
        .with_publisher(publisher.clone())
}

pub fn cached_store(sql: &Arc<MockSql>) -> ResourceStore<Resource> {
    store(sql).with_cache(CacheParams::new(Arc::new(CacheManager::in_memory(60))))
}
