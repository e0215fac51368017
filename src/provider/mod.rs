//! Data provider contract and its implementations.
//!
//! [`DataProvider`] is the nine-operation CRUD surface an admin console talks to.
//! [`SchemaQualifiedProvider`] wraps any provider and schema-qualifies resource names;
//! [`PgDataProvider`] is the PostgreSQL client it usually wraps.

mod postgres;
mod schema;
mod types;

pub use postgres::PgDataProvider;
pub use schema::SchemaQualifiedProvider;
pub use types::*;

use crate::error::ProviderError;
use async_trait::async_trait;
use std::sync::Arc;

/// Nine CRUD operations keyed by resource name. Params and results pass through as-is.
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn get_list(&self, resource: &str, params: GetListParams) -> Result<GetListResult, ProviderError>;

    async fn get_one(&self, resource: &str, params: GetOneParams) -> Result<GetOneResult, ProviderError>;

    async fn get_many(&self, resource: &str, params: GetManyParams) -> Result<GetManyResult, ProviderError>;

    async fn get_many_reference(
        &self,
        resource: &str,
        params: GetManyReferenceParams,
    ) -> Result<GetManyReferenceResult, ProviderError>;

    async fn create(&self, resource: &str, params: CreateParams) -> Result<CreateResult, ProviderError>;

    async fn update(&self, resource: &str, params: UpdateParams) -> Result<UpdateResult, ProviderError>;

    async fn update_many(&self, resource: &str, params: UpdateManyParams) -> Result<UpdateManyResult, ProviderError>;

    async fn delete(&self, resource: &str, params: DeleteParams) -> Result<DeleteResult, ProviderError>;

    async fn delete_many(&self, resource: &str, params: DeleteManyParams) -> Result<DeleteManyResult, ProviderError>;
}

#[async_trait]
impl<P> DataProvider for Arc<P>
where
    P: DataProvider + ?Sized,
{
    async fn get_list(&self, resource: &str, params: GetListParams) -> Result<GetListResult, ProviderError> {
        (**self).get_list(resource, params).await
    }

    async fn get_one(&self, resource: &str, params: GetOneParams) -> Result<GetOneResult, ProviderError> {
        (**self).get_one(resource, params).await
    }

    async fn get_many(&self, resource: &str, params: GetManyParams) -> Result<GetManyResult, ProviderError> {
        (**self).get_many(resource, params).await
    }

    async fn get_many_reference(
        &self,
        resource: &str,
        params: GetManyReferenceParams,
    ) -> Result<GetManyReferenceResult, ProviderError> {
        (**self).get_many_reference(resource, params).await
    }

    async fn create(&self, resource: &str, params: CreateParams) -> Result<CreateResult, ProviderError> {
        (**self).create(resource, params).await
    }

    async fn update(&self, resource: &str, params: UpdateParams) -> Result<UpdateResult, ProviderError> {
        (**self).update(resource, params).await
    }

    async fn update_many(&self, resource: &str, params: UpdateManyParams) -> Result<UpdateManyResult, ProviderError> {
        (**self).update_many(resource, params).await
    }

    async fn delete(&self, resource: &str, params: DeleteParams) -> Result<DeleteResult, ProviderError> {
        (**self).delete(resource, params).await
    }

    async fn delete_many(&self, resource: &str, params: DeleteManyParams) -> Result<DeleteManyResult, ProviderError> {
        (**self).delete_many(resource, params).await
    }
}
