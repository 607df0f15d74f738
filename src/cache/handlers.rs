use axum::extract::DefaultBodyLimit;
use axum::{Extension, Json, Router, http::StatusCode, routing::post};
use std::sync::Arc;

use super::node::CacheNode;
use super::protocol::{ENDPOINT_PIPELINE, PipelineRequest, PipelineResponse};

/// Routes of a cache node.
///
/// A fan-out pipeline carries one command per recipient, so request bodies
/// are not capped.
pub fn router(node: Arc<CacheNode>) -> Router {
    Router::new()
        .route(ENDPOINT_PIPELINE, post(handle_pipeline))
        .layer(DefaultBodyLimit::disable())
        .layer(Extension(node))
}

pub async fn handle_pipeline(
    Extension(node): Extension<Arc<CacheNode>>,
    Json(req): Json<PipelineRequest>,
) -> (StatusCode, Json<PipelineResponse>) {
    tracing::debug!("Executing pipeline of {} command(s)", req.commands.len());

    let replies = node.execute(&req.commands);

    (StatusCode::OK, Json(PipelineResponse { replies }))
}
