// Supabase REST client setup
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;

use crate::config::MigrationConfig;
use crate::error::{MigrationError, Result};
use crate::models::Row;

/// HTTP client that closes every connection once its request completes.
///
/// Idle pooling is disabled, so no connection outlives a single call.
pub fn http_client() -> Result<ReqwestClient> {
    Ok(ReqwestClient::builder().pool_max_idle_per_host(0).build()?)
}

/// Read access to the source tables.
///
/// Production code uses [`SupabaseClient`]; tests use
/// [`MockSupabase`](crate::mock::MockSupabase).
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Fetch every row of `table`, all columns, no pagination.
    async fn fetch_table(&self, table: &str) -> Result<Vec<Row>>;
}

/// Client for the Supabase PostgREST endpoint, authenticated with a static key.
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: ReqwestClient,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: http_client()?,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

/// Create the Supabase client from configuration
pub fn connect(config: &MigrationConfig) -> Result<SupabaseClient> {
    SupabaseClient::new(&config.supabase_url, &config.supabase_key)
}

#[async_trait]
impl SourceReader for SupabaseClient {
    async fn fetch_table(&self, table: &str) -> Result<Vec<Row>> {
        let url = self.table_url(table);
        let response = self
            .client
            .get(&url)
            .query(&[("select", "*")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MigrationError::Status { status, url });
        }

        let bytes = response.bytes().await?;
        let rows: Vec<Row> = serde_json::from_slice(&bytes)?;
        Ok(rows)
    }
}
