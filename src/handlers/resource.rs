//! Resource handlers: one per data provider operation. Resource names are logical;
//! the provider in state decides where they live.

use crate::error::ProviderError;
use crate::extractors::{IdsQuery, ListRequest, ReferenceRequest};
use crate::provider::{
    CreateParams, DeleteManyParams, DeleteParams, GetManyParams, GetOneParams, Identifier, UpdateManyParams,
    UpdateParams,
};
use crate::response::{success_many, success_one, success_one_ok, success_page};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

fn require_object(body: &Value) -> Result<(), ProviderError> {
    match body {
        Value::Object(_) => Ok(()),
        _ => Err(ProviderError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    ListRequest(params): ListRequest,
) -> Result<impl IntoResponse, ProviderError> {
    let result = state.provider.get_list(&resource, params).await?;
    Ok(success_page(result.data, result.total))
}

pub async fn read(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ProviderError> {
    let params = GetOneParams {
        id: Identifier::parse(&id),
        meta: None,
    };
    let result = state.provider.get_one(&resource, params).await?;
    Ok(success_one_ok(result.data))
}

pub async fn read_many(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    IdsQuery(ids): IdsQuery,
) -> Result<impl IntoResponse, ProviderError> {
    let result = state.provider.get_many(&resource, GetManyParams { ids, meta: None }).await?;
    Ok(success_many(result.data))
}

pub async fn list_reference(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    ReferenceRequest(params): ReferenceRequest,
) -> Result<impl IntoResponse, ProviderError> {
    let result = state.provider.get_many_reference(&resource, params).await?;
    Ok(success_page(result.data, result.total))
}

pub async fn create(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ProviderError> {
    require_object(&body)?;
    let result = state
        .provider
        .create(&resource, CreateParams { data: body, meta: None })
        .await?;
    Ok(success_one(result.data))
}

pub async fn update(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ProviderError> {
    require_object(&body)?;
    let params = UpdateParams {
        id: Identifier::parse(&id),
        data: body,
        previous_data: None,
        meta: None,
    };
    let result = state.provider.update(&resource, params).await?;
    Ok(success_one_ok(result.data))
}

pub async fn update_many(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    IdsQuery(ids): IdsQuery,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ProviderError> {
    require_object(&body)?;
    let result = state
        .provider
        .update_many(&resource, UpdateManyParams { ids, data: body, meta: None })
        .await?;
    Ok(success_many(result.data))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ProviderError> {
    let params = DeleteParams {
        id: Identifier::parse(&id),
        previous_data: None,
        meta: None,
    };
    let result = state.provider.delete(&resource, params).await?;
    Ok(success_one_ok(result.data))
}

pub async fn delete_many(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    IdsQuery(ids): IdsQuery,
) -> Result<impl IntoResponse, ProviderError> {
    let result = state
        .provider
        .delete_many(&resource, DeleteManyParams { ids, meta: None })
        .await?;
    Ok(success_many(result.data))
}
