// Configuration constants and environment helpers
use std::path::PathBuf;
use std::time::Duration;

// Bundled endpoints, overridable from the environment
pub const DEFAULT_SUPABASE_URL: &str = "https://mektzrsvpdjleanblpas.supabase.co";
pub const DEFAULT_SUPABASE_KEY: &str = "sb_publishable_IfRO370wyTbY2MXM5JXGNg_97JIboKl";
pub const DEFAULT_WORKER_URL: &str = "https://stitch-tracker-api.stitch-tracker-api.workers.dev";
pub const DEFAULT_OUTPUT_DIR: &str = ".tmp";

// Batch processing configuration
pub const TASK_BATCH_SIZE: usize = 50;
pub const TASK_BATCH_DELAY: Duration = Duration::from_millis(100);

// Worker request identification
pub const USER_AGENT: &str = "StitchTracker-Migration/1.0";
pub const USER_ID_HEADER: &str = "X-User-Id";

// Filesystem outputs
pub const MAPPING_FILE_NAME: &str = "_migration_mapping.json";

// Field defaults applied when a source row lacks the key entirely
pub const DEFAULT_TIMEZONE: &str = "Europe/Moscow";
pub const DEFAULT_HABIT_ICON: &str = "⭐";
pub const DEFAULT_HABIT_COLOR: &str = "#6366f1";
pub const DEFAULT_GOAL_YEAR: i64 = 2026;

/// Runtime configuration, built once in `main` and handed to every collaborator.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub supabase_url: String,
    pub supabase_key: String,
    pub worker_url: String,
    pub output_dir: PathBuf,
    pub task_batch_size: usize,
    pub task_batch_delay: Duration,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            supabase_url: DEFAULT_SUPABASE_URL.to_string(),
            supabase_key: DEFAULT_SUPABASE_KEY.to_string(),
            worker_url: DEFAULT_WORKER_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            task_batch_size: TASK_BATCH_SIZE,
            task_batch_delay: TASK_BATCH_DELAY,
        }
    }
}

impl MigrationConfig {
    /// Read SUPABASE_URL, SUPABASE_KEY, WORKER_URL and MIGRATION_OUTPUT_DIR
    /// from the process environment, falling back to the bundled defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            supabase_url: lookup("SUPABASE_URL").unwrap_or(defaults.supabase_url),
            supabase_key: lookup("SUPABASE_KEY").unwrap_or(defaults.supabase_key),
            worker_url: lookup("WORKER_URL").unwrap_or(defaults.worker_url),
            output_dir: lookup("MIGRATION_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            ..defaults
        }
    }

    /// Path of the snapshot file for one source table.
    pub fn snapshot_path(&self, table: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", table))
    }

    /// Path of the identifier mapping file written at the end of a run.
    pub fn mapping_path(&self) -> PathBuf {
        self.output_dir.join(MAPPING_FILE_NAME)
    }
}
