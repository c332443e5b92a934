//! [`ResourceAccess`] for [`ResourceStore`]

use super::core::ResourceStore;
use crate::errors::StoreError;
use crate::request::{DeleteTarget, GetRequest, GetResponse};
use crate::traits::{ResourceAccess, ResourceKind};
use async_trait::async_trait;
use signal_system::AuthContext;
use type_mapping::{Record, SqlValue};

#[async_trait]
impl<R: ResourceKind> ResourceAccess<R> for ResourceStore<R> {
    async fn get(&self, kind: R, request: GetRequest) -> Result<GetResponse, StoreError> {
        ResourceStore::get(self, kind, request).await
    }

    async fn save(
        &self,
        kind: R,
        resource: Record,
        auth: &AuthContext,
    ) -> Result<Record, StoreError> {
        ResourceStore::save(self, kind, resource, auth).await
    }

    async fn update(
        &self,
        kind: R,
        primary_key: SqlValue,
        partial: Record,
        auth: &AuthContext,
    ) -> Result<Record, StoreError> {
        ResourceStore::update(self, kind, primary_key, partial, auth).await
    }

    async fn delete(
        &self,
        kind: R,
        target: DeleteTarget,
        auth: &AuthContext,
    ) -> Result<(), StoreError> {
        ResourceStore::delete(self, kind, target, auth).await
    }
}
