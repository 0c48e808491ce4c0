// Migration executor - orchestrates the migration flow
use std::time::Instant;

use tracing::info;

use crate::config::MigrationConfig;
use crate::error::Result;
use crate::migration::identity::IdentityMap;
use crate::migration::recorder::MigrationMapping;
use crate::models::{MigrationSummary, SourceTable, StepReport};
use crate::supabase::{self, SourceReader};
use crate::worker::{Importer, WorkerApi};

const RULE: &str = "============================================================";

/// Migration executor that coordinates export, identity mapping, import and
/// mapping persistence.
pub struct MigrationExecutor<S, W> {
    source: S,
    worker: W,
    config: MigrationConfig,
}

impl<S: SourceReader, W: WorkerApi> MigrationExecutor<S, W> {
    /// Create a new migration executor
    pub fn new(source: S, worker: W, config: MigrationConfig) -> Self {
        Self {
            source,
            worker,
            config,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn worker(&self) -> &W {
        &self.worker
    }

    /// Execute the full migration process
    pub async fn execute(&self) -> Result<MigrationSummary> {
        let start_time = Instant::now();
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        info!("{}", RULE);
        info!("Supabase → D1 Data Migration");
        info!("{}", RULE);

        // Step 1: Export every table from Supabase
        let exported = supabase::export_tables(&self.source, &self.config).await;

        // Step 2: Build user id mapping
        let identities = IdentityMap::from_users(exported.rows(SourceTable::Users));
        info!("🔗 User ID mapping ({} users):", identities.len());
        for (uuid, telegram_id) in identities.iter() {
            info!("   {} → {}", uuid, telegram_id);
        }

        // Step 3: Import in dependency order
        info!("{}", RULE);
        info!("📤 Importing to D1...");
        info!("{}", RULE);

        let mut importer = Importer::new(&self.worker, &identities, &self.config);
        let users = importer.import_users(exported.rows(SourceTable::Users)).await?;
        let tasks = importer.import_tasks(exported.rows(SourceTable::Tasks)).await?;
        let habits = importer.import_habits(exported.rows(SourceTable::Habits)).await?;
        let habit_logs = importer
            .import_habit_logs(exported.rows(SourceTable::HabitLogs))
            .await?;
        let journal = importer.import_journal(exported.rows(SourceTable::Journal)).await?;
        let goals = importer.import_goals(exported.rows(SourceTable::Goals)).await?;
        let habit_ids = importer.into_habit_ids();

        // Step 4: Save mapping for reference
        let mapping_path = self.config.mapping_path();
        MigrationMapping::new(&identities, &habit_ids)
            .write(&mapping_path)
            .await?;

        let summary = MigrationSummary {
            exported: SourceTable::ALL
                .iter()
                .map(|table| (*table, exported.rows(*table).len()))
                .collect(),
            mapped_users: identities.len(),
            mapped_habits: habit_ids.len(),
            users,
            tasks,
            habits,
            habit_logs,
            journal,
            goals,
        };

        // Step 5: Report statistics
        info!("{}", RULE);
        info!("✅ Migration complete!");
        info!("Total time: {:.2}s", start_time.elapsed().as_secs_f64());
        report_step("Users", &summary.users);
        report_step("Tasks", &summary.tasks);
        report_step("Habits", &summary.habits);
        report_step("Habit logs", &summary.habit_logs);
        report_step("Journal", &summary.journal);
        report_step("Goals", &summary.goals);
        info!("📁 JSON backups in: {}", self.config.output_dir.display());
        info!("📁 ID mapping: {}", mapping_path.display());
        info!("{}", RULE);

        Ok(summary)
    }
}

fn report_step(label: &str, report: &StepReport) {
    info!(
        "{}: {} imported, {} skipped, {} failed (of {})",
        label, report.imported, report.skipped, report.failed, report.attempted
    );
}
