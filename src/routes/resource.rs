//! Resource data routes. `/:resource/many` and `/:resource/reference` are matched
//! before `/:resource/:id`.

use crate::handlers::resource::{
    create, delete as delete_handler, delete_many, list, list_reference, read, read_many, update, update_many,
};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

pub fn resource_routes(state: AppState) -> Router {
    Router::new()
        .route("/:resource", get(list).post(create))
        .route(
            "/:resource/many",
            get(read_many).patch(update_many).delete(delete_many),
        )
        .route("/:resource/reference", get(list_reference))
        .route(
            "/:resource/:id",
            get(read).patch(update).delete(delete_handler),
        )
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES)))
        .with_state(state)
}
