//! In-memory stand-ins for Supabase and the Worker API.
//!
//! `MockSupabase` serves pre-registered tables and `MockWorker` records every
//! request it receives, so a full migration can run without network access.
//!
//! # Example
//!
//! ```ignore
//! use d1_migrate::mock::{MockSupabase, MockWorker};
//! use serde_json::json;
//!
//! let source = MockSupabase::new();
//! source.register_table("users", json!([{"id": "u1", "telegram_id": 555}]));
//!
//! let worker = MockWorker::new();
//! worker.respond("/api/profile", json!({"telegram_id": "555"}));
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::time::Instant;

use crate::error::{MigrationError, Result};
use crate::models::Row;
use crate::supabase::SourceReader;
use crate::worker::WorkerApi;

/// Mock source store. Unregistered tables are served as empty.
#[derive(Default)]
pub struct MockSupabase {
    tables: RwLock<HashMap<String, Value>>,
    failing: RwLock<HashSet<String>>,
    fetches: RwLock<HashMap<String, usize>>,
}

impl MockSupabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `rows` (a JSON value, normally an array of objects) for `table`.
    pub fn register_table(&self, table: &str, rows: Value) {
        self.tables.write().unwrap().insert(table.to_string(), rows);
    }

    /// Make every fetch of `table` fail with a 500.
    pub fn fail_table(&self, table: &str) {
        self.failing.write().unwrap().insert(table.to_string());
    }

    pub fn fetch_count(&self, table: &str) -> usize {
        self.fetches.read().unwrap().get(table).copied().unwrap_or(0)
    }
}

#[async_trait]
impl SourceReader for MockSupabase {
    async fn fetch_table(&self, table: &str) -> Result<Vec<Row>> {
        *self
            .fetches
            .write()
            .unwrap()
            .entry(table.to_string())
            .or_insert(0) += 1;

        if self.failing.read().unwrap().contains(table) {
            return Err(MigrationError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                url: format!("mock://supabase/rest/v1/{}", table),
            });
        }

        match self.tables.read().unwrap().get(table) {
            Some(rows) => Ok(serde_json::from_value(rows.clone())?),
            None => Ok(Vec::new()),
        }
    }
}

/// One request received by [`MockWorker`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub user_id: String,
    pub body: Value,
    pub at: Instant,
}

/// Mock Worker API.
///
/// Paths without a configured response answer `{}` (an empty result).
#[derive(Default)]
pub struct MockWorker {
    responses: RwLock<HashMap<String, Value>>,
    failing: RwLock<HashSet<String>>,
    calls: RwLock<Vec<RecordedCall>>,
}

impl MockWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request to `path` with `response`.
    pub fn respond(&self, path: &str, response: Value) {
        self.responses
            .write()
            .unwrap()
            .insert(path.to_string(), response);
    }

    /// Make every request to `path` fail with a 500.
    pub fn fail(&self, path: &str) {
        self.failing.write().unwrap().insert(path.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.path == path)
            .collect()
    }
}

#[async_trait]
impl WorkerApi for MockWorker {
    async fn send(&self, method: Method, path: &str, user_id: &str, body: &Value) -> Result<Value> {
        self.calls.write().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            user_id: user_id.to_string(),
            body: body.clone(),
            at: Instant::now(),
        });

        if self.failing.read().unwrap().contains(path) {
            return Err(MigrationError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                url: format!("mock://worker{}", path),
            });
        }

        Ok(self
            .responses
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default())))
    }
}
