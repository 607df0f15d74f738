use super::error::ClientError;
use super::http::JsonRpcClient;
use super::protocol::{ENDPOINT_READ_POSTS, ReadPostsRequest, ReadPostsResponse};
use super::types::{Post, PostId};
use crate::telemetry::context::TraceContext;

use async_trait::async_trait;
use std::time::Duration;

/// Batch hydration offered by the post storage service.
///
/// Implementations must return posts in the order of `post_ids`.
#[async_trait]
pub trait PostStorage: Send + Sync {
    async fn read_posts(
        &self,
        req_id: i64,
        post_ids: &[PostId],
        trace: &TraceContext,
    ) -> Result<Vec<Post>, ClientError>;
}

pub struct HttpPostStorage {
    client: JsonRpcClient,
}

impl HttpPostStorage {
    pub fn new(addr: &str, connections: usize, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: JsonRpcClient::new("post-storage-service", addr, connections, timeout)?,
        })
    }
}

#[async_trait]
impl PostStorage for HttpPostStorage {
    async fn read_posts(
        &self,
        req_id: i64,
        post_ids: &[PostId],
        trace: &TraceContext,
    ) -> Result<Vec<Post>, ClientError> {
        let request = ReadPostsRequest {
            req_id,
            post_ids: post_ids.to_vec(),
            carrier: trace.clone(),
        };
        let response: ReadPostsResponse = self.client.post(ENDPOINT_READ_POSTS, &request).await?;
        Ok(response.posts)
    }
}
