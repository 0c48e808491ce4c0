//! One-shot migration of Stitch Tracker data from Supabase to Cloudflare D1.
//!
//! The run exports every source table to a JSON snapshot, maps Supabase user
//! uuids to telegram ids, replays each entity kind against the Worker API in
//! dependency order and writes the identifier mappings it built.
//!
//! - [`supabase`]: source reader and table export
//! - [`worker`]: Worker API client and per-entity import steps
//! - [`migration`]: identity mapping, row transforms and the executor
//! - [`mock`]: in-memory source and Worker used by tests

pub mod config;
pub mod error;
pub mod migration;
pub mod mock;
pub mod models;
pub mod supabase;
pub mod worker;

pub use config::MigrationConfig;
pub use error::{MigrationError, Result};
pub use migration::MigrationExecutor;
