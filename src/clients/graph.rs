use super::error::ClientError;
use super::http::JsonRpcClient;
use super::protocol::{ENDPOINT_GET_FOLLOWERS, GetFollowersRequest, GetFollowersResponse};
use super::types::UserId;
use crate::telemetry::context::TraceContext;

use async_trait::async_trait;
use std::time::Duration;

/// Follower lookup offered by the social graph service.
#[async_trait]
pub trait SocialGraph: Send + Sync {
    async fn get_followers(
        &self,
        req_id: i64,
        user_id: UserId,
        trace: &TraceContext,
    ) -> Result<Vec<UserId>, ClientError>;
}

pub struct HttpSocialGraph {
    client: JsonRpcClient,
}

impl HttpSocialGraph {
    pub fn new(addr: &str, connections: usize, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: JsonRpcClient::new("social-graph-service", addr, connections, timeout)?,
        })
    }
}

#[async_trait]
impl SocialGraph for HttpSocialGraph {
    async fn get_followers(
        &self,
        req_id: i64,
        user_id: UserId,
        trace: &TraceContext,
    ) -> Result<Vec<UserId>, ClientError> {
        let request = GetFollowersRequest {
            req_id,
            user_id,
            carrier: trace.clone(),
        };
        let response: GetFollowersResponse =
            self.client.post(ENDPOINT_GET_FOLLOWERS, &request).await?;
        Ok(response.followers)
    }
}
