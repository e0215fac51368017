mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common::RecordingProvider;
use schema_provider::provider::Identifier;
use schema_provider::{common_routes, resource_routes, AppState, NamespaceMapping, ProviderError, SchemaQualifiedProvider};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(inner: &Arc<RecordingProvider>) -> Router {
    let provider = SchemaQualifiedProvider::new(inner.clone(), Arc::new(NamespaceMapping::uniform("ConfigDB")));
    Router::new()
        .merge(common_routes())
        .nest("/api/v1", resource_routes(AppState::new(provider)))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn list_returns_page_envelope() {
    let inner = Arc::new(RecordingProvider::new());
    let (status, body) = send(app(&inner), Method::GET, "/api/v1/boms?page=1&perPage=10", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([{ "id": 1, "table": "ConfigDB.boms" }]));
    assert_eq!(body["meta"], json!({ "count": 1, "total": 1 }));
    let calls = inner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].resource, "ConfigDB.boms");
    assert_eq!(calls[0].params["pagination"], json!({ "page": 1, "perPage": 10 }));
}

#[tokio::test]
async fn get_one_parses_numeric_id() {
    let inner = Arc::new(RecordingProvider::new());
    let (status, body) = send(app(&inner), Method::GET, "/api/v1/items/42", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "id": 42, "table": "ConfigDB.items" }));
    assert_eq!(inner.calls()[0].operation, "get_one");
}

#[tokio::test]
async fn zero_padded_path_ids_stay_text() {
    let inner = Arc::new(RecordingProvider::new());
    let (status, body) = send(app(&inner), Method::GET, "/api/v1/items/007", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], json!("007"));

    let (status, _) = send(app(&inner), Method::DELETE, "/api/v1/items/+5", None).await;
    assert_eq!(status, StatusCode::OK);

    let calls = inner.calls();
    assert_eq!(calls[0].params["id"], json!("007"));
    assert_eq!(calls[1].operation, "delete");
    assert_eq!(calls[1].params["id"], json!("+5"));
}

#[tokio::test]
async fn create_returns_created() {
    let inner = Arc::new(RecordingProvider::new());
    let (status, body) = send(
        app(&inner),
        Method::POST,
        "/api/v1/items",
        Some(json!({ "item_number": "100-200", "item_type": "PCA" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], json!(100));
    assert_eq!(body["data"]["item_number"], json!("100-200"));
    let calls = inner.calls();
    assert_eq!(calls[0].operation, "create");
    assert_eq!(calls[0].resource, "ConfigDB.items");
    assert_eq!(calls[0].params["data"], json!({ "item_number": "100-200", "item_type": "PCA" }));
}

#[tokio::test]
async fn update_patches_one_record() {
    let inner = Arc::new(RecordingProvider::new());
    let (status, body) = send(
        app(&inner),
        Method::PATCH,
        "/api/v1/bom_lines/7",
        Some(json!({ "quantity": 4 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "quantity": 4, "id": 7 }));
    assert_eq!(inner.calls()[0].resource, "ConfigDB.bom_lines");
}

#[tokio::test]
async fn reference_route_is_not_taken_for_an_id() {
    let inner = Arc::new(RecordingProvider::new());
    let (status, body) = send(
        app(&inner),
        Method::GET,
        "/api/v1/bom_lines/reference?target=bom_id&id=3&sort=line_number&order=ASC",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["target"], json!("bom_id"));
    let calls = inner.calls();
    assert_eq!(calls[0].operation, "get_many_reference");
    assert_eq!(calls[0].params["target"], json!("bom_id"));
    assert_eq!(calls[0].params["id"], json!(3));
    assert_eq!(calls[0].params["sort"], json!({ "field": "line_number", "order": "ASC" }));
}

#[tokio::test]
async fn delete_many_takes_ids_from_query() {
    let inner = Arc::new(RecordingProvider::new());
    let (status, body) = send(app(&inner), Method::DELETE, "/api/v1/item_variants/many?ids=1,2,3", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([1, 2, 3]));
    assert_eq!(body["meta"]["count"], json!(3));
    let calls = inner.calls();
    assert_eq!(calls[0].operation, "delete_many");
    assert_eq!(calls[0].resource, "ConfigDB.item_variants");
}

#[tokio::test]
async fn get_many_keeps_text_ids() {
    let inner = Arc::new(RecordingProvider::new());
    let (status, body) = send(app(&inner), Method::GET, "/api/v1/items/many?ids=5,A-2", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], json!(2));
    assert_eq!(
        inner.calls()[0].params["ids"],
        json!([Identifier::Int(5), Identifier::Text("A-2".into())])
    );
}

#[tokio::test]
async fn unmapped_resource_is_a_config_error() {
    let inner = Arc::new(RecordingProvider::new());
    let provider = SchemaQualifiedProvider::new(inner.clone(), Arc::new(NamespaceMapping::default()));
    let app = resource_routes(AppState::new(provider));

    let (status, body) = send(app, Method::GET, "/items", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], json!("config_error"));
    assert!(inner.calls().is_empty());
}

#[tokio::test]
async fn backend_not_found_maps_to_404() {
    let inner = Arc::new(RecordingProvider::failing(|| ProviderError::NotFound("ConfigDB.items 9".into())));
    let (status, body) = send(app(&inner), Method::DELETE, "/api/v1/items/9", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "error": { "code": "not_found", "message": "not found: ConfigDB.items 9" } })
    );
    assert_eq!(inner.calls().len(), 1);
}

#[tokio::test]
async fn non_object_body_is_rejected_before_provider() {
    let inner = Arc::new(RecordingProvider::new());
    let (status, body) = send(app(&inner), Method::POST, "/api/v1/items", Some(json!([1, 2]))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("bad_request"));
    assert!(inner.calls().is_empty());
}

#[tokio::test]
async fn bad_filter_is_rejected() {
    let inner = Arc::new(RecordingProvider::new());
    let (status, _) = send(app(&inner), Method::GET, "/api/v1/items?filter=notjson", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(inner.calls().is_empty());
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let inner = Arc::new(RecordingProvider::new());
    let (status, body) = send(app(&inner), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, body) = send(app(&inner), Method::GET, "/nope/at/all/here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": { "code": "not_found", "message": "no such route" } }));
}
