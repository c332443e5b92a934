//! Reads: collections by filter, single resources by constraint

use super::core::ResourceStore;
use crate::errors::StoreError;
use crate::query_builder::{CollectionParams, Constraint, Filter, Query, QueryParts};
use crate::request::{Collection, CollectionMeta, GetRequest, GetResponse};
use crate::traits::ResourceKind;
use tracing::{debug, info, warn};
use type_mapping::Record;

impl<R: ResourceKind> ResourceStore<R> {
    /// Fetch whatever `request` describes
    pub async fn get(&self, kind: R, request: GetRequest) -> Result<GetResponse, StoreError> {
        let resolved = request.resolve();
        match resolved.constraint {
            Some(constraint) if resolved.filter.is_none() => Ok(GetResponse::One(
                self.find_one(kind, &constraint, resolved.throw).await?,
            )),
            _ => Ok(GetResponse::Collection(
                self.get_collection(
                    kind,
                    resolved.filter.as_ref(),
                    resolved.collection_params.as_ref(),
                )
                .await?,
            )),
        }
    }

    /// One page of resources matching `filter`
    pub async fn get_collection(
        &self,
        kind: R,
        filter: Option<&Filter>,
        params: Option<&CollectionParams>,
    ) -> Result<Collection, StoreError> {
        let entry = self.entry(kind);
        debug!(resource = kind.tag(), filter = ?filter, "Getting resources by filter");

        let mut query = Query::select_all(&entry.table);
        if let Some(filter) = filter {
            for (field, value) in filter.defined() {
                query = query.merge(self.strategy.filter_field(kind, field, value)?);
            }
        }

        let paging = self
            .strategy
            .collection_params(kind, params, self.config.default_page_size)?;
        query = query.merge(paging.parts);

        let rows = self.run(&query.render()).await?;
        debug!(resource = kind.tag(), count = rows.len(), "Returning resources");

        let data: Vec<Record> = rows.into_iter().map(|r| self.present(kind, r)).collect();

        let mut pg = paging.meta;
        if (data.len() as u64) < pg.size {
            pg.next_cursor = None;
        }

        Ok(Collection {
            data,
            meta: CollectionMeta { pg },
        })
    }

    /// The resource matching `constraint`, if any
    pub async fn get_one(
        &self,
        kind: R,
        constraint: &Constraint,
    ) -> Result<Option<Record>, StoreError> {
        self.find_one(kind, constraint, false).await
    }

    /// The resource matching `constraint`; a miss is NotFound
    pub async fn get_required(
        &self,
        kind: R,
        constraint: &Constraint,
    ) -> Result<Record, StoreError> {
        self.find_one(kind, constraint, true).await?.ok_or_else(|| {
            StoreError::not_found(format!(
                "{} not found for the given parameters",
                kind.tag()
            ))
        })
    }

    pub(crate) async fn find_one(
        &self,
        kind: R,
        constraint: &Constraint,
        throw: bool,
    ) -> Result<Option<Record>, StoreError> {
        let parts = self.strategy.constraint(kind, constraint);

        if parts.where_clauses.is_empty() {
            return Err(StoreError::InternalServerError(format!(
                "No constraints passed for resource '{}'. Constraint: {:?}",
                kind.tag(),
                constraint
            )));
        }

        let description = parts.to_json();
        debug!(resource = kind.tag(), constraint = %description, "Getting resource from database");

        let Some(query_parts) = parts.to_query_parts() else {
            info!(constraint = %description, "Constraint is incomplete. Cannot use.");
            return if throw {
                Err(StoreError::not_found(format!(
                    "No constraint value passed for {}, so the resource cannot be found.",
                    kind.tag()
                )))
            } else {
                Ok(None)
            };
        };

        let fetch = move || async move {
            let found = self.select_one(kind, query_parts).await?;
            Ok::<_, StoreError>(found.map(|r| self.present(kind, r)))
        };

        let found = match &self.cache {
            Some(cache) => {
                cache
                    .manager
                    .get_or_populate(
                        kind.tag(),
                        &description.to_string(),
                        cache.effective_ttl(),
                        fetch,
                    )
                    .await?
            }
            None => fetch().await?,
        };

        match found {
            Some(record) => Ok(Some(record)),
            None if throw => Err(StoreError::not_found(format!(
                "{} not found for the given parameters",
                kind.tag()
            ))),
            None => Ok(None),
        }
    }

    /// Stored form of the resource matching `constraint`, read past the cache.
    ///
    /// Writes diff against this so binary values compare as bytes.
    pub(crate) async fn fetch_stored(
        &self,
        kind: R,
        constraint: &Constraint,
    ) -> Result<Option<Record>, StoreError> {
        let parts = self.strategy.constraint(kind, constraint);
        if parts.where_clauses.is_empty() {
            return Err(StoreError::InternalServerError(format!(
                "No constraints passed for resource '{}'. Constraint: {:?}",
                kind.tag(),
                constraint
            )));
        }
        match parts.to_query_parts() {
            Some(query_parts) => self.select_one(kind, query_parts).await,
            None => Ok(None),
        }
    }

    async fn select_one(&self, kind: R, parts: QueryParts) -> Result<Option<Record>, StoreError> {
        let rendered = Query::select_all(&self.entry(kind).table)
            .merge(parts)
            .render();
        let rows = self.run(&rendered).await?;

        if rows.len() > 1 {
            warn!(
                resource = kind.tag(),
                query = %rendered.text,
                params = ?rendered.params,
                "More than one resource found when searching with constraint"
            );
        }

        Ok(rows.into_iter().next())
    }
}
