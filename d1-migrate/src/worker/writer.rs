// Worker import steps, one per entity kind
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::MigrationConfig;
use crate::error::Result;
use crate::migration::identity::IdentityMap;
use crate::migration::transform::{self, id_string, owner_id, required_id};
use crate::models::{Row, SourceTable, StepReport};
use crate::worker::{submit, WorkerApi};

pub const PROFILE_PATH: &str = "/api/profile";
pub const TASKS_PATH: &str = "/api/tasks";
pub const HABITS_PATH: &str = "/api/habits";
pub const HABIT_LOGS_PATH: &str = "/api/habit-logs";
pub const JOURNAL_PATH: &str = "/api/journal";
pub const GOALS_PATH: &str = "/api/goals";

/// Source habit id -> habit id minted by the Worker.
pub type HabitIdMap = BTreeMap<String, String>;

/// Submits transformed rows to the Worker, one entity kind at a time.
///
/// Steps must run in dependency order: habit logs can only be remapped after
/// [`Importer::import_habits`] has filled the habit id map.
pub struct Importer<'a, W: WorkerApi + ?Sized> {
    api: &'a W,
    identities: &'a IdentityMap,
    habit_ids: HabitIdMap,
    batch_size: usize,
    batch_delay: Duration,
}

impl<'a, W: WorkerApi + ?Sized> Importer<'a, W> {
    pub fn new(api: &'a W, identities: &'a IdentityMap, config: &MigrationConfig) -> Self {
        Self {
            api,
            identities,
            habit_ids: HabitIdMap::new(),
            batch_size: config.task_batch_size.max(1),
            batch_delay: config.task_batch_delay,
        }
    }

    pub fn habit_ids(&self) -> &HabitIdMap {
        &self.habit_ids
    }

    pub fn into_habit_ids(self) -> HabitIdMap {
        self.habit_ids
    }

    fn resolve_owner(&self, row: &Row, table: SourceTable) -> Result<String> {
        let source_id = owner_id(row, table)?;
        Ok(self.identities.resolve(&source_id).to_string())
    }

    async fn post<T: Serialize>(&self, path: &str, user_id: &str, payload: &T) -> Result<Option<Value>> {
        let body = serde_json::to_value(payload)?;
        Ok(submit(self.api, Method::POST, path, user_id, &body).await)
    }

    /// Upsert one profile per user, keyed by the external identity.
    pub async fn import_users(&mut self, users: &[Row]) -> Result<StepReport> {
        info!("👤 Migrating {} users...", users.len());
        let mut report = StepReport {
            attempted: users.len(),
            ..StepReport::default()
        };

        for user in users {
            let external_id = id_string(user.get("telegram_id"));
            if external_id.is_empty() {
                warn!("   ⚠️ Skipping user without telegram_id");
                report.skipped += 1;
                continue;
            }

            let body = serde_json::to_value(transform::profile_payload(user))?;
            match submit(self.api, Method::PUT, PROFILE_PATH, &external_id, &body).await {
                Some(_) => {
                    info!("   ✅ User {}: {}", external_id, show_value(user.get("first_name")));
                    report.imported += 1;
                }
                None => report.failed += 1,
            }
        }

        Ok(report)
    }

    /// Bulk-create tasks per user in chunks, pausing after every chunk.
    pub async fn import_tasks(&mut self, tasks: &[Row]) -> Result<StepReport> {
        info!("📝 Migrating {} tasks...", tasks.len());
        let mut report = StepReport {
            attempted: tasks.len(),
            ..StepReport::default()
        };

        let grouped = group_by_owner(tasks, |task| self.resolve_owner(task, SourceTable::Tasks))?;

        for (external_id, user_tasks) in grouped {
            for chunk in user_tasks.chunks(self.batch_size) {
                let payloads = chunk
                    .iter()
                    .map(|task| transform::task_payload(task))
                    .collect::<Result<Vec<_>>>()?;

                match self.post(TASKS_PATH, &external_id, &payloads).await? {
                    Some(_) => {
                        info!("   ✅ User {}: {} tasks imported", external_id, chunk.len());
                        report.imported += chunk.len();
                    }
                    None => report.failed += chunk.len(),
                }

                tokio::time::sleep(self.batch_delay).await;
            }
        }

        Ok(report)
    }

    /// Create habits one by one, recording the id the Worker assigns to each.
    pub async fn import_habits(&mut self, habits: &[Row]) -> Result<StepReport> {
        info!("🔁 Migrating {} habits...", habits.len());
        let mut report = StepReport {
            attempted: habits.len(),
            ..StepReport::default()
        };

        for habit in habits {
            let external_id = self.resolve_owner(habit, SourceTable::Habits)?;
            let payload = transform::habit_payload(habit)?;

            match self.post(HABITS_PATH, &external_id, &payload).await? {
                Some(result) => {
                    let new_id = id_string(result.get("id"));
                    let old_id = id_string(habit.get("id"));
                    info!(
                        "   ✅ Habit: {} ({} → {})",
                        show_value(Some(&payload.title)),
                        old_id,
                        new_id
                    );
                    self.habit_ids.insert(old_id, new_id);
                    report.imported += 1;
                }
                None => report.failed += 1,
            }
        }

        Ok(report)
    }

    /// Create habit logs against the remapped habit ids. Logs whose habit was
    /// not imported are dropped.
    pub async fn import_habit_logs(&mut self, logs: &[Row]) -> Result<StepReport> {
        info!("📊 Migrating {} habit logs...", logs.len());
        let mut report = StepReport {
            attempted: logs.len(),
            ..StepReport::default()
        };

        for log in logs {
            let external_id = self.resolve_owner(log, SourceTable::HabitLogs)?;
            let old_habit_id = required_id(log, SourceTable::HabitLogs, "habit_id")?;

            let new_habit_id = match self.habit_ids.get(&old_habit_id) {
                Some(id) if !id.is_empty() => id.clone(),
                _ => {
                    warn!("   ⚠️ Skipping log: habit {} not found in mapping", old_habit_id);
                    report.skipped += 1;
                    continue;
                }
            };

            let payload = transform::habit_log_payload(log, &new_habit_id);
            match self.post(HABIT_LOGS_PATH, &external_id, &payload).await? {
                Some(_) => {
                    info!(
                        "   ✅ Log: habit {} on {}",
                        new_habit_id,
                        show_value(log.get("completed_at"))
                    );
                    report.imported += 1;
                }
                None => report.failed += 1,
            }
        }

        Ok(report)
    }

    pub async fn import_journal(&mut self, entries: &[Row]) -> Result<StepReport> {
        info!("📔 Migrating {} journal entries...", entries.len());
        let mut report = StepReport {
            attempted: entries.len(),
            ..StepReport::default()
        };

        for entry in entries {
            let external_id = self.resolve_owner(entry, SourceTable::Journal)?;
            let payload = transform::journal_payload(entry)?;

            match self.post(JOURNAL_PATH, &external_id, &payload).await? {
                Some(_) => {
                    info!(
                        "   ✅ Journal: {} on {}",
                        show_value(Some(&payload.entry_type)),
                        show_value(entry.get("date"))
                    );
                    report.imported += 1;
                }
                None => report.failed += 1,
            }
        }

        Ok(report)
    }

    pub async fn import_goals(&mut self, goals: &[Row]) -> Result<StepReport> {
        info!("🎯 Migrating {} goals...", goals.len());
        let mut report = StepReport {
            attempted: goals.len(),
            ..StepReport::default()
        };

        for goal in goals {
            let external_id = self.resolve_owner(goal, SourceTable::Goals)?;
            let payload = transform::goal_payload(goal)?;

            match self.post(GOALS_PATH, &external_id, &payload).await? {
                Some(_) => {
                    info!("   ✅ Goal: {}", show_value(Some(&payload.title)));
                    report.imported += 1;
                }
                None => report.failed += 1,
            }
        }

        Ok(report)
    }
}

/// Group rows by resolved owner, keeping owners in first-seen order.
fn group_by_owner<'r, F>(rows: &'r [Row], mut owner: F) -> Result<Vec<(String, Vec<&'r Row>)>>
where
    F: FnMut(&Row) -> Result<String>,
{
    let mut groups: Vec<(String, Vec<&Row>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let key = owner(row)?;
        match index.get(&key) {
            Some(&i) => groups[i].1.push(row),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![row]));
            }
        }
    }

    Ok(groups)
}

fn show_value(value: Option<&Value>) -> String {
    match value {
        None => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
