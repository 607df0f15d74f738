//! Home Timeline HTTP Protocol
//!
//! Endpoints and DTOs exposed by the home timeline service to its callers
//! (the post composition workflow on write, front ends on read).

use crate::clients::types::{Post, PostId, UserId};
use crate::telemetry::context::TraceContext;
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Fan a newly composed post out to its recipients' timelines.
pub const ENDPOINT_WRITE_HOME_TIMELINE: &str = "/home_timeline/write";
/// Read one page of a user's home timeline.
pub const ENDPOINT_READ_HOME_TIMELINE: &str = "/home_timeline/read";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct WriteHomeTimelineRequest {
    #[serde(default)]
    pub req_id: i64,
    pub post_id: PostId,
    /// The post's author.
    pub user_id: UserId,
    pub timestamp: i64,
    #[serde(default)]
    pub user_mentions_id: Vec<UserId>,
    #[serde(default)]
    pub carrier: TraceContext,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WriteHomeTimelineResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadHomeTimelineRequest {
    #[serde(default)]
    pub req_id: i64,
    pub user_id: UserId,
    pub start: i32,
    pub stop: i32,
    #[serde(default)]
    pub carrier: TraceContext,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadHomeTimelineResponse {
    pub posts: Vec<Post>,
    /// Set on failure; `posts` is then empty, never partial.
    #[serde(default)]
    pub error: Option<String>,
}
