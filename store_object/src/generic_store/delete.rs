//! Batched deletes by filter or constraint

use super::core::ResourceStore;
use super::save::display_id;
use crate::errors::StoreError;
use crate::query_builder::{CollectionParams, PageRequest, Query, QueryParts};
use crate::request::DeleteTarget;
use crate::traits::ResourceKind;
use futures::future::join_all;
use signal_system::{AuditTarget, AuthContext, DomainEvent, EventAction};
use tracing::{debug, error, info};
use type_mapping::Record;

impl<R: ResourceKind> ResourceStore<R> {
    /// Delete every resource matching `target`.
    ///
    /// A filter delete works through the matches one batch at a time until a short batch comes
    /// back. A constraint delete removes at most one resource. Each deleted resource is audited
    /// and published.
    pub async fn delete(
        &self,
        kind: R,
        target: impl Into<DeleteTarget>,
        auth: &AuthContext,
    ) -> Result<(), StoreError> {
        let target = target.into();
        let batch = self.config.delete_batch_size;
        let page = CollectionParams::new().with_page(PageRequest::new().with_size(batch));

        loop {
            let (resources, more) = match &target {
                DeleteTarget::Constraint(constraint) => {
                    debug!(resource = kind.tag(), "Getting resource to delete by constraint");
                    let found = self.get_one(kind, constraint).await?;
                    (found.into_iter().collect::<Vec<_>>(), false)
                }
                DeleteTarget::Filter(filter) => {
                    debug!(resource = kind.tag(), "Getting resources to delete by filter");
                    let collection = self.get_collection(kind, Some(filter), Some(&page)).await?;
                    let more = collection.data.len() as u64 >= batch;
                    (collection.data, more)
                }
            };

            if resources.is_empty() {
                info!(resource = kind.tag(), "Resource(s) not found. Nothing to delete.");
                break;
            }

            debug!("Deleting {} {}", resources.len(), kind.tag());
            let statement = self.delete_statement(kind, &target, batch)?;
            self.run(&statement.render()).await?;
            self.invalidate_cache(kind).await?;
            self.announce_deleted(kind, resources, auth).await?;

            if !more {
                break;
            }
        }

        Ok(())
    }

    fn delete_statement(
        &self,
        kind: R,
        target: &DeleteTarget,
        batch: u64,
    ) -> Result<Query, StoreError> {
        let mut query = Query::delete_from(&self.entry(kind).table)
            .merge(QueryParts::new().limit(batch.to_string()));

        match target {
            DeleteTarget::Filter(filter) => {
                for (field, value) in filter.defined() {
                    query = query.merge(self.strategy.filter_field(kind, field, value)?);
                }
            }
            DeleteTarget::Constraint(constraint) => {
                let parts = self.strategy.constraint(kind, constraint);
                if parts.where_clauses.is_empty() {
                    return Err(StoreError::InternalServerError(format!(
                        "No constraints passed for resource '{}'. Constraint: {:?}",
                        kind.tag(),
                        constraint
                    )));
                }
                let Some(parts) = parts.to_query_parts() else {
                    return Err(StoreError::not_found(format!(
                        "No constraint value passed for {}, so the resource cannot be found.",
                        kind.tag()
                    )));
                };
                query = query.merge(parts);
            }
        }

        Ok(query)
    }

    async fn announce_deleted(
        &self,
        kind: R,
        resources: Vec<Record>,
        auth: &AuthContext,
    ) -> Result<(), StoreError> {
        let pk = self.entry(kind).primary_key.as_str();

        let notices = resources.into_iter().map(|resource| async move {
            let target_id = resource.get(pk).map(display_id).unwrap_or_default();

            let audit = async {
                match &self.audit {
                    Some(audit) => audit
                        .record_delete(auth, AuditTarget::new(kind.tag(), target_id.clone()))
                        .await
                        .map_err(StoreError::Audit),
                    None => Ok(()),
                }
            };

            let publish = async {
                if self.publisher.is_none() {
                    return;
                }
                let event = DomainEvent::new(EventAction::Deleted, kind.tag(), resource.clone());
                if let Err(e) = self.publish(event).await {
                    error!(
                        resource = kind.tag(),
                        id = %target_id,
                        error = %e,
                        "Couldn't publish 'deleted' resource"
                    );
                }
            };

            let (audited, ()) = futures::future::join(audit, publish).await;
            audited
        });

        join_all(notices)
            .await
            .into_iter()
            .collect::<Result<Vec<()>, StoreError>>()?;
        Ok(())
    }
}
