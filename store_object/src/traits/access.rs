//! Public resource-access interface

use crate::errors::StoreError;
use crate::request::{DeleteTarget, GetRequest, GetResponse};
use crate::traits::resource_kind::ResourceKind;
use async_trait::async_trait;
use signal_system::AuthContext;
use type_mapping::{Record, SqlValue};

/// Uniform get/save/update/delete over every resource type of `R`
#[async_trait]
pub trait ResourceAccess<R: ResourceKind>: Send + Sync {
    /// Fetch a collection or a single resource
    async fn get(&self, kind: R, request: GetRequest) -> Result<GetResponse, StoreError>;

    /// Insert or update, diffing against the stored resource
    async fn save(
        &self,
        kind: R,
        resource: Record,
        auth: &AuthContext,
    ) -> Result<Record, StoreError>;

    /// Update an existing resource by primary key; a miss is NotFound
    async fn update(
        &self,
        kind: R,
        primary_key: SqlValue,
        partial: Record,
        auth: &AuthContext,
    ) -> Result<Record, StoreError>;

    /// Delete every resource matching a filter, or the one matching a constraint
    async fn delete(
        &self,
        kind: R,
        target: DeleteTarget,
        auth: &AuthContext,
    ) -> Result<(), StoreError>;
}
