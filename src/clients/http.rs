use super::error::ClientError;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// JSON-over-HTTP caller shared by the collaborator clients.
///
/// Single attempt per call; retry policy belongs to whoever invoked the
/// home timeline operation.
#[derive(Clone)]
pub struct JsonRpcClient {
    service: &'static str,
    base_url: String,
    http_client: reqwest::Client,
}

impl JsonRpcClient {
    pub fn new(
        service: &'static str,
        addr: &str,
        connections: usize,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(connections)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            service,
            base_url: format!("http://{}", addr.trim_end_matches('/')),
            http_client,
        })
    }

    pub async fn post<Req, Resp>(&self, endpoint: &str, payload: &Req) -> Result<Resp, ClientError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let service = self.service;
        let transport = |source| ClientError::Transport { service, source };

        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, endpoint))
            .json(payload)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                service,
                status: response.status().as_u16(),
            });
        }

        response.json().await.map_err(transport)
    }
}
