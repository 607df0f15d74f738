use super::error::StoreError;
use super::node::CacheNode;
use super::protocol::{Command, ENDPOINT_PIPELINE, PipelineRequest, PipelineResponse, Reply};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A borrowed handle to one cache node.
///
/// Implementations must be safe to share between concurrent requests. A call
/// to `execute` is exactly one round trip to the node, whatever the number of
/// commands it carries.
#[async_trait]
pub trait CacheConnection: Send + Sync {
    /// Human-readable identity of the node, used in logs and errors.
    fn endpoint(&self) -> &str;

    async fn execute(&self, commands: Vec<Command>) -> Result<Vec<Reply>, StoreError>;
}

/// Connection to a node living in the same process.
pub struct LocalConnection {
    name: String,
    node: Arc<CacheNode>,
}

impl LocalConnection {
    pub fn new(name: &str, node: Arc<CacheNode>) -> Self {
        Self {
            name: name.to_string(),
            node,
        }
    }

    pub fn node(&self) -> &Arc<CacheNode> {
        &self.node
    }
}

#[async_trait]
impl CacheConnection for LocalConnection {
    fn endpoint(&self) -> &str {
        &self.name
    }

    async fn execute(&self, commands: Vec<Command>) -> Result<Vec<Reply>, StoreError> {
        Ok(self.node.execute(&commands))
    }
}

/// HTTP connection to a cache node started with `--cache-node`.
///
/// Never retries: a failed round trip surfaces immediately as a `StoreError`.
pub struct RemoteConnection {
    addr: String,
    url: String,
    http_client: reqwest::Client,
}

impl RemoteConnection {
    pub fn new(addr: &str, connections: usize, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(connections)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            addr: addr.to_string(),
            url: format!("http://{}{}", addr, ENDPOINT_PIPELINE),
            http_client,
        })
    }
}

#[async_trait]
impl CacheConnection for RemoteConnection {
    fn endpoint(&self) -> &str {
        &self.addr
    }

    async fn execute(&self, commands: Vec<Command>) -> Result<Vec<Reply>, StoreError> {
        let expected = commands.len();
        let transport = |source| StoreError::Transport {
            endpoint: self.addr.clone(),
            source,
        };

        let response = self
            .http_client
            .post(&self.url)
            .json(&PipelineRequest { commands })
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(StoreError::Status {
                endpoint: self.addr.clone(),
                status: response.status().as_u16(),
            });
        }

        let body: PipelineResponse = response
            .json()
            .await
            .map_err(|e| StoreError::protocol(&self.addr, format!("undecodable reply: {}", e)))?;
        if body.replies.len() != expected {
            return Err(StoreError::protocol(
                &self.addr,
                format!("expected {} replies, got {}", expected, body.replies.len()),
            ));
        }

        Ok(body.replies)
    }
}
