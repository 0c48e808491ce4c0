// Worker API client setup
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Method};
use serde_json::Value;
use tracing::error;

use crate::config::{MigrationConfig, USER_AGENT, USER_ID_HEADER};
use crate::error::{MigrationError, Result};
use crate::migration::transform::is_truthy;
use crate::supabase::http_client;

/// Write access to the destination Worker API.
///
/// Every call is scoped to one user through the `X-User-Id` header.
#[async_trait]
pub trait WorkerApi: Send + Sync {
    /// Send `body` as JSON to `path` and return the decoded JSON response.
    async fn send(&self, method: Method, path: &str, user_id: &str, body: &Value) -> Result<Value>;
}

/// Client for the Cloudflare Worker in front of D1.
pub struct WorkerClient {
    base_url: String,
    client: ReqwestClient,
}

impl WorkerClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client()?,
        })
    }
}

/// Create the Worker client from configuration
pub fn connect(config: &MigrationConfig) -> Result<WorkerClient> {
    WorkerClient::new(&config.worker_url)
}

#[async_trait]
impl WorkerApi for WorkerClient {
    async fn send(&self, method: Method, path: &str, user_id: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .request(method, &url)
            .header(USER_ID_HEADER, user_id)
            .header("User-Agent", USER_AGENT)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MigrationError::Status { status, url });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Submit one request, swallowing failures.
///
/// Returns `None` when the call fails or the Worker answers with an empty
/// (falsy) body. Errors are logged here and never propagated.
pub async fn submit<W>(
    api: &W,
    method: Method,
    path: &str,
    user_id: &str,
    body: &Value,
) -> Option<Value>
where
    W: WorkerApi + ?Sized,
{
    match api.send(method.clone(), path, user_id, body).await {
        Ok(result) if is_truthy(&result) => Some(result),
        Ok(_) => None,
        Err(e) => {
            error!("  ❌ Error {} {}: {}", method, path, e);
            None
        }
    }
}
