//! Extract list, reference and id-list parameters from the query string.
//!
//! `?page=2&perPage=25&sort=item_number&order=DESC&filter={"item_type":"ASY"}`

use crate::error::ProviderError;
use crate::provider::{Filter, GetListParams, GetManyReferenceParams, Identifier, Pagination, Sort, SortOrder};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde_json::Value;
use std::collections::HashMap;

/// Page size used when only `page` is given.
pub const DEFAULT_PER_PAGE: u32 = 100;

fn query_map(parts: &Parts) -> Result<HashMap<String, String>, ProviderError> {
    Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(m)| m)
        .map_err(|e| ProviderError::BadRequest(e.to_string()))
}

fn parse_u32(params: &HashMap<String, String>, keys: &[&str]) -> Result<Option<u32>, ProviderError> {
    for key in keys {
        if let Some(v) = params.get(*key) {
            return v
                .parse()
                .map(Some)
                .map_err(|_| ProviderError::BadRequest(format!("{} must be a non-negative integer", key)));
        }
    }
    Ok(None)
}

fn pagination(params: &HashMap<String, String>) -> Result<Option<Pagination>, ProviderError> {
    let page = parse_u32(params, &["page"])?;
    let per_page = parse_u32(params, &["perPage", "per_page"])?;
    if page.is_none() && per_page.is_none() {
        return Ok(None);
    }
    Ok(Some(Pagination {
        page: page.unwrap_or(1).max(1),
        per_page: per_page.unwrap_or(DEFAULT_PER_PAGE),
    }))
}

fn sort(params: &HashMap<String, String>) -> Result<Option<Sort>, ProviderError> {
    let Some(field) = params.get("sort").filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let order = match params.get("order") {
        Some(o) => SortOrder::parse(o)
            .ok_or_else(|| ProviderError::BadRequest(format!("order must be ASC or DESC, got {}", o)))?,
        None => SortOrder::Asc,
    };
    Ok(Some(Sort {
        field: field.clone(),
        order,
    }))
}

fn filter(params: &HashMap<String, String>) -> Result<Filter, ProviderError> {
    match params.get("filter").filter(|s| !s.is_empty()) {
        None => Ok(Filter::new()),
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(m)) => Ok(m),
            _ => Err(ProviderError::BadRequest("filter must be a JSON object".into())),
        },
    }
}

/// Comma separated ids: `?ids=1,2,3`.
pub fn parse_ids(raw: &str) -> Vec<Identifier> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Identifier::parse)
        .collect()
}

/// `GET /:resource` parameters.
#[derive(Clone, Debug)]
pub struct ListRequest(pub GetListParams);

#[async_trait]
impl<S> FromRequestParts<S> for ListRequest
where
    S: Send + Sync,
{
    type Rejection = ProviderError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let params = query_map(parts)?;
        Ok(ListRequest(GetListParams {
            pagination: pagination(&params)?,
            sort: sort(&params)?,
            filter: filter(&params)?,
            meta: None,
        }))
    }
}

/// `GET /:resource/reference?target=bom_id&id=7` parameters.
#[derive(Clone, Debug)]
pub struct ReferenceRequest(pub GetManyReferenceParams);

#[async_trait]
impl<S> FromRequestParts<S> for ReferenceRequest
where
    S: Send + Sync,
{
    type Rejection = ProviderError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let params = query_map(parts)?;
        let target = params
            .get("target")
            .filter(|s| !s.is_empty())
            .cloned()
            .ok_or_else(|| ProviderError::BadRequest("target is required".into()))?;
        let id = params
            .get("id")
            .filter(|s| !s.is_empty())
            .map(|s| Identifier::parse(s))
            .ok_or_else(|| ProviderError::BadRequest("id is required".into()))?;
        Ok(ReferenceRequest(GetManyReferenceParams {
            target,
            id,
            pagination: pagination(&params)?,
            sort: sort(&params)?,
            filter: filter(&params)?,
            meta: None,
        }))
    }
}

/// `?ids=1,2,3` for the bulk routes.
#[derive(Clone, Debug)]
pub struct IdsQuery(pub Vec<Identifier>);

#[async_trait]
impl<S> FromRequestParts<S> for IdsQuery
where
    S: Send + Sync,
{
    type Rejection = ProviderError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let params = query_map(parts)?;
        let raw = params
            .get("ids")
            .ok_or_else(|| ProviderError::BadRequest("ids is required".into()))?;
        Ok(IdsQuery(parse_ids(raw)))
    }
}
