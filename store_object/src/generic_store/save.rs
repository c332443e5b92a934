//! Writes: insert-or-update with change tracking

use super::core::ResourceStore;
use crate::errors::StoreError;
use crate::id_type::{id_to_text, text_to_id};
use crate::query_builder::{Constraint, RenderedQuery};
use crate::reconcile::{reconcile, Reconciled};
use crate::traits::ResourceKind;
use crate::validation::sanitize_field_name;
use signal_system::{AuditTarget, AuthContext, DomainEvent, EventAction};
use tracing::{debug, error, info};
use type_mapping::{Record, SqlValue};

/// Id as shown in logs and error messages
pub(crate) fn display_id(value: &SqlValue) -> String {
    match value {
        SqlValue::Bytes(bytes) => id_to_text(bytes),
        other => other.to_string(),
    }
}

fn present_key(value: Option<&SqlValue>) -> Option<&SqlValue> {
    value.filter(|v| !v.is_null())
}

/// Turn id text back into bytes wherever the stored row holds bytes for that field
fn restore_binary(current: &Record, mut incoming: Record) -> Record {
    for (field, value) in incoming.iter_mut() {
        let (Some(SqlValue::Bytes(_)), SqlValue::Text(shown)) = (current.get(field), &*value)
        else {
            continue;
        };
        if let Ok(bytes) = text_to_id(shown) {
            *value = SqlValue::Bytes(bytes);
        }
    }
    incoming
}

impl<R: ResourceKind> ResourceStore<R> {
    /// Create or update a resource.
    ///
    /// A resource whose primary key matches a stored row is diffed against it and only the
    /// changed fields are written. Anything else is inserted on top of the configured defaults.
    /// The returned record holds stored values (binary ids stay bytes), so it can be saved again.
    pub async fn save(
        &self,
        kind: R,
        resource: Record,
        auth: &AuthContext,
    ) -> Result<Record, StoreError> {
        let pk = self.entry(kind).primary_key.as_str();
        let key = present_key(resource.get(pk)).cloned();

        let current = match &key {
            Some(value) => {
                self.fetch_stored(kind, &Constraint::by(pk, value.clone()))
                    .await?
            }
            None => None,
        };

        self.save_with_current(kind, resource, auth, current, key).await
    }

    /// Merge `partial` over the stored resource with primary key `primary_key` and save it
    pub async fn update(
        &self,
        kind: R,
        primary_key: SqlValue,
        partial: Record,
        auth: &AuthContext,
    ) -> Result<Record, StoreError> {
        let pk = self.entry(kind).primary_key.clone();
        let shown = display_id(&primary_key);
        info!("Updating {}:'{}'", kind.tag(), shown);

        let current = self
            .fetch_stored(kind, &Constraint::by(pk.as_str(), primary_key.clone()))
            .await?
            .ok_or_else(|| {
                StoreError::not_found_with_code(
                    format!(
                        "Resource of type '{}', {} '{}', was not found.",
                        kind.tag(),
                        pk,
                        shown
                    ),
                    format!("RESOURCE-NOT-FOUND.{}", kind.tag().to_uppercase()),
                )
            })?;

        let mut partial = partial;
        partial.shift_remove(&pk);

        let mut resource = current.clone();
        resource.extend(partial);

        self.save_with_current(kind, resource, auth, Some(current), Some(primary_key))
            .await
    }

    async fn save_with_current(
        &self,
        kind: R,
        incoming: Record,
        auth: &AuthContext,
        current: Option<Record>,
        key: Option<SqlValue>,
    ) -> Result<Record, StoreError> {
        let entry = self.entry(kind);
        match &key {
            Some(value) => info!("Saving resource '{}:{}'", kind.tag(), display_id(value)),
            None => info!("Saving resource '{}'", kind.tag()),
        }

        let incoming = match &current {
            Some(stored) => restore_binary(stored, incoming),
            None => incoming,
        };
        let reconciled = reconcile(entry, current.as_ref(), incoming);
        if reconciled.is_noop() {
            debug!(resource = kind.tag(), "No changes to save");
            return Ok(reconciled.resource);
        }

        let statement = if reconciled.is_new {
            self.insert_statement(kind, &reconciled)
        } else {
            let where_key = key
                .or_else(|| present_key(reconciled.resource.get(&entry.primary_key)).cloned())
                .unwrap_or(SqlValue::Null);
            match self.update_statement(kind, &reconciled, where_key) {
                Some(statement) => statement,
                None => {
                    debug!(resource = kind.tag(), "Only the primary key differs; nothing to write");
                    return Ok(reconciled.resource);
                }
            }
        };

        self.run(&statement).await?;
        self.invalidate_cache(kind).await?;
        self.announce_saved(kind, &reconciled, auth).await?;

        Ok(reconciled.resource)
    }

    fn insert_statement(&self, kind: R, reconciled: &Reconciled) -> RenderedQuery {
        let entry = self.entry(kind);
        let columns: Vec<String> = reconciled
            .changes
            .keys()
            .map(|field| format!("`{}`", sanitize_field_name(field)))
            .collect();
        let values: Vec<SqlValue> = reconciled
            .changes
            .keys()
            .map(|field| {
                reconciled
                    .resource
                    .get(field)
                    .cloned()
                    .unwrap_or(SqlValue::Null)
            })
            .collect();

        RenderedQuery {
            text: format!(
                "INSERT INTO {} ({}) VALUES (?)",
                entry.table.quoted(),
                columns.join(", ")
            ),
            params: Some(vec![SqlValue::Array(values)]),
        }
    }

    /// `None` when nothing but the primary key changed
    fn update_statement(
        &self,
        kind: R,
        reconciled: &Reconciled,
        where_key: SqlValue,
    ) -> Option<RenderedQuery> {
        let entry = self.entry(kind);
        let fields: Vec<&String> = reconciled
            .changes
            .keys()
            .filter(|field| **field != entry.primary_key)
            .collect();
        if fields.is_empty() {
            return None;
        }

        let assignments: Vec<String> = fields
            .iter()
            .map(|field| format!("`{}` = ?", sanitize_field_name(field)))
            .collect();
        let mut params: Vec<SqlValue> = fields
            .iter()
            .map(|field| {
                reconciled
                    .resource
                    .get(*field)
                    .cloned()
                    .unwrap_or(SqlValue::Null)
            })
            .collect();
        params.push(where_key);

        Some(RenderedQuery {
            text: format!(
                "UPDATE {} SET {} WHERE `{}` = ?",
                entry.table.quoted(),
                assignments.join(", "),
                sanitize_field_name(&entry.primary_key)
            ),
            params: Some(params),
        })
    }

    /// Audit and publish a completed write. Audit failures propagate; publish failures are logged.
    async fn announce_saved(
        &self,
        kind: R,
        reconciled: &Reconciled,
        auth: &AuthContext,
    ) -> Result<(), StoreError> {
        let entry = self.entry(kind);
        let target_id = reconciled
            .resource
            .get(&entry.primary_key)
            .and_then(SqlValue::to_text)
            .unwrap_or_default();

        let audit = async {
            let Some(audit) = &self.audit else {
                return Ok(());
            };
            debug!(resource = kind.tag(), "Publishing audit message");
            let target = AuditTarget::new(kind.tag(), target_id);
            let result = if reconciled.is_new {
                audit.record_create(auth, target).await
            } else {
                audit
                    .record_update(auth, target, &reconciled.changes)
                    .await
            };
            result.map_err(StoreError::Audit)
        };

        let publish = async {
            if self.publisher.is_none() {
                return;
            }
            let action = if reconciled.is_new {
                EventAction::Created
            } else {
                EventAction::Updated
            };
            let event = DomainEvent::new(
                action,
                kind.tag(),
                self.present(kind, reconciled.resource.clone()),
            );
            if let Err(e) = self.publish(event).await {
                error!(
                    resource = kind.tag(),
                    error = %e,
                    "Couldn't publish '{}' resource",
                    action.as_str()
                );
            }
        };

        let (audit_result, ()) = futures::future::join(audit, publish).await;
        audit_result
    }
}
