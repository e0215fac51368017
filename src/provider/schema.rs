//! Schema-qualifying proxy: rewrites logical resource names to `schema.resource`
//! before delegating. Params and results are passed through untouched.

use super::*;
use crate::config::{BackendIdentifier, NamespaceMapping};
use crate::error::ProviderError;
use async_trait::async_trait;
use std::sync::Arc;

pub struct SchemaQualifiedProvider<P> {
    inner: P,
    mapping: Arc<NamespaceMapping>,
}

impl<P: DataProvider> SchemaQualifiedProvider<P> {
    pub fn new(inner: P, mapping: Arc<NamespaceMapping>) -> Self {
        SchemaQualifiedProvider { inner, mapping }
    }

    pub fn mapping(&self) -> &NamespaceMapping {
        &self.mapping
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn qualify(&self, operation: &'static str, resource: &str) -> Result<String, ProviderError> {
        let backend: BackendIdentifier = self.mapping.qualify(resource).map_err(|e| {
            tracing::error!(operation, resource, "resource has no namespace mapping");
            e
        })?;
        let backend = backend.to_string();
        tracing::debug!(operation, resource, backend = %backend, "delegating");
        Ok(backend)
    }
}

#[async_trait]
impl<P: DataProvider> DataProvider for SchemaQualifiedProvider<P> {
    async fn get_list(&self, resource: &str, params: GetListParams) -> Result<GetListResult, ProviderError> {
        let backend = self.qualify("get_list", resource)?;
        self.inner.get_list(&backend, params).await
    }

    async fn get_one(&self, resource: &str, params: GetOneParams) -> Result<GetOneResult, ProviderError> {
        let backend = self.qualify("get_one", resource)?;
        self.inner.get_one(&backend, params).await
    }

    async fn get_many(&self, resource: &str, params: GetManyParams) -> Result<GetManyResult, ProviderError> {
        let backend = self.qualify("get_many", resource)?;
        self.inner.get_many(&backend, params).await
    }

    async fn get_many_reference(
        &self,
        resource: &str,
        params: GetManyReferenceParams,
    ) -> Result<GetManyReferenceResult, ProviderError> {
        let backend = self.qualify("get_many_reference", resource)?;
        self.inner.get_many_reference(&backend, params).await
    }

    async fn create(&self, resource: &str, params: CreateParams) -> Result<CreateResult, ProviderError> {
        let backend = self.qualify("create", resource)?;
        self.inner.create(&backend, params).await
    }

    async fn update(&self, resource: &str, params: UpdateParams) -> Result<UpdateResult, ProviderError> {
        let backend = self.qualify("update", resource)?;
        self.inner.update(&backend, params).await
    }

    async fn update_many(&self, resource: &str, params: UpdateManyParams) -> Result<UpdateManyResult, ProviderError> {
        let backend = self.qualify("update_many", resource)?;
        self.inner.update_many(&backend, params).await
    }

    async fn delete(&self, resource: &str, params: DeleteParams) -> Result<DeleteResult, ProviderError> {
        let backend = self.qualify("delete", resource)?;
        self.inner.delete(&backend, params).await
    }

    async fn delete_many(&self, resource: &str, params: DeleteManyParams) -> Result<DeleteManyResult, ProviderError> {
        let backend = self.qualify("delete_many", resource)?;
        self.inner.delete_many(&backend, params).await
    }
}
