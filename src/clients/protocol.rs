//! Collaborator Wire Protocol
//!
//! Endpoints and DTOs of the social graph and post storage services, as consumed by the
//! home timeline. Every request carries the request id and the trace carrier.

use super::types::{Post, PostId, UserId};
use crate::telemetry::context::TraceContext;
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Social graph: list the followers of a user.
pub const ENDPOINT_GET_FOLLOWERS: &str = "/social_graph/followers";
/// Post storage: hydrate post ids into posts, preserving the requested order.
pub const ENDPOINT_READ_POSTS: &str = "/post_storage/read_posts";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct GetFollowersRequest {
    #[serde(default)]
    pub req_id: i64,
    pub user_id: UserId,
    #[serde(default)]
    pub carrier: TraceContext,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetFollowersResponse {
    pub followers: Vec<UserId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadPostsRequest {
    #[serde(default)]
    pub req_id: i64,
    pub post_ids: Vec<PostId>,
    #[serde(default)]
    pub carrier: TraceContext,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadPostsResponse {
    pub posts: Vec<Post>,
}
