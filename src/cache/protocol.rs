//! Cache Node Wire Protocol
//!
//! Defines the endpoint and the Data Transfer Objects exchanged between a
//! `RemoteConnection` and a cache node. A request carries a whole pipeline so
//! that one HTTP round trip executes every command destined for that node.

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Endpoint executing a pipeline of commands against one cache node.
pub const ENDPOINT_PIPELINE: &str = "/cache/pipeline";

// --- Commands ---

/// A single operation against a keyed ordered index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Command {
    /// Insert `member` with `score` only if `member` is not already in the index.
    ZAddNx {
        key: String,
        member: String,
        score: i64,
    },
    /// Members ranked `[start, stop]` (inclusive), highest score first.
    ZRevRange { key: String, start: i64, stop: i64 },
}

/// The result of one `Command`, returned in pipeline order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Reply {
    /// Number of members actually inserted (0 when the member already existed).
    Added(u64),
    Members(Vec<String>),
}

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub commands: Vec<Command>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PipelineResponse {
    pub replies: Vec<Reply>,
}
