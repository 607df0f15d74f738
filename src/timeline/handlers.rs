use axum::{Extension, Json, http::StatusCode};
use std::sync::Arc;

use super::protocol::{
    ReadHomeTimelineRequest, ReadHomeTimelineResponse, WriteHomeTimelineRequest,
    WriteHomeTimelineResponse,
};
use super::service::HomeTimelineService;

pub async fn handle_write_home_timeline(
    Extension(service): Extension<Arc<HomeTimelineService>>,
    Json(req): Json<WriteHomeTimelineRequest>,
) -> (StatusCode, Json<WriteHomeTimelineResponse>) {
    match service
        .write_home_timeline(
            req.req_id,
            req.post_id,
            req.user_id,
            req.timestamp,
            &req.user_mentions_id,
            &req.carrier,
        )
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(WriteHomeTimelineResponse {
                success: true,
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!("WriteHomeTimeline failed for post {}: {}", req.post_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(WriteHomeTimelineResponse {
                    success: false,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

pub async fn handle_read_home_timeline(
    Extension(service): Extension<Arc<HomeTimelineService>>,
    Json(req): Json<ReadHomeTimelineRequest>,
) -> (StatusCode, Json<ReadHomeTimelineResponse>) {
    match service
        .read_home_timeline(req.req_id, req.user_id, req.start, req.stop, &req.carrier)
        .await
    {
        Ok(posts) => (
            StatusCode::OK,
            Json(ReadHomeTimelineResponse { posts, error: None }),
        ),
        Err(e) => {
            tracing::error!("ReadHomeTimeline failed for user {}: {}", req.user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ReadHomeTimelineResponse {
                    posts: Vec::new(),
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
