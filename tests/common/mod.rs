//! Recording in-memory provider shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use schema_provider::provider::*;
use schema_provider::ProviderError;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub operation: &'static str,
    pub resource: String,
    pub params: Value,
}

/// Records every call and answers with canned data derived from the request,
/// or with the configured failure.
#[derive(Default)]
pub struct RecordingProvider {
    calls: Mutex<Vec<Call>>,
    failure: Option<fn() -> ProviderError>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failure: fn() -> ProviderError) -> Self {
        RecordingProvider {
            calls: Mutex::new(Vec::new()),
            failure: Some(failure),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record<P: Serialize>(&self, operation: &'static str, resource: &str, params: &P) -> Result<(), ProviderError> {
        self.calls.lock().unwrap().push(Call {
            operation,
            resource: resource.to_string(),
            params: serde_json::to_value(params).unwrap(),
        });
        match self.failure {
            Some(f) => Err(f()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DataProvider for RecordingProvider {
    async fn get_list(&self, resource: &str, params: GetListParams) -> Result<GetListResult, ProviderError> {
        self.record("get_list", resource, &params)?;
        Ok(GetListResult {
            data: vec![json!({ "id": 1, "table": resource })],
            total: Some(1),
        })
    }

    async fn get_one(&self, resource: &str, params: GetOneParams) -> Result<GetOneResult, ProviderError> {
        self.record("get_one", resource, &params)?;
        Ok(GetOneResult {
            data: json!({ "id": params.id, "table": resource }),
        })
    }

    async fn get_many(&self, resource: &str, params: GetManyParams) -> Result<GetManyResult, ProviderError> {
        self.record("get_many", resource, &params)?;
        Ok(GetManyResult {
            data: params.ids.iter().map(|id| json!({ "id": id, "table": resource })).collect(),
        })
    }

    async fn get_many_reference(
        &self,
        resource: &str,
        params: GetManyReferenceParams,
    ) -> Result<GetManyReferenceResult, ProviderError> {
        self.record("get_many_reference", resource, &params)?;
        Ok(GetListResult {
            data: vec![json!({ "id": 10, "target": params.target, "target_id": params.id })],
            total: Some(1),
        })
    }

    async fn create(&self, resource: &str, params: CreateParams) -> Result<CreateResult, ProviderError> {
        self.record("create", resource, &params)?;
        let mut data = params.data;
        if let Value::Object(m) = &mut data {
            m.insert("id".into(), json!(100));
        }
        Ok(CreateResult { data })
    }

    async fn update(&self, resource: &str, params: UpdateParams) -> Result<UpdateResult, ProviderError> {
        self.record("update", resource, &params)?;
        let mut data = params.data;
        if let Value::Object(m) = &mut data {
            m.insert("id".into(), params.id.to_json());
        }
        Ok(UpdateResult { data })
    }

    async fn update_many(&self, resource: &str, params: UpdateManyParams) -> Result<UpdateManyResult, ProviderError> {
        self.record("update_many", resource, &params)?;
        Ok(UpdateManyResult { data: params.ids })
    }

    async fn delete(&self, resource: &str, params: DeleteParams) -> Result<DeleteResult, ProviderError> {
        self.record("delete", resource, &params)?;
        Ok(DeleteResult {
            data: json!({ "id": params.id }),
        })
    }

    async fn delete_many(&self, resource: &str, params: DeleteManyParams) -> Result<DeleteManyResult, ProviderError> {
        self.record("delete_many", resource, &params)?;
        Ok(DeleteManyResult { data: params.ids })
    }
}
