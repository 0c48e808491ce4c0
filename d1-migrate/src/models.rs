// Data models for migration
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// One exported row: a flat mapping of column name to value.
pub type Row = Map<String, Value>;

/// Source tables, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTable {
    Users,
    Tasks,
    Habits,
    HabitLogs,
    Journal,
    Goals,
}

impl SourceTable {
    pub const ALL: [SourceTable; 6] = [
        SourceTable::Users,
        SourceTable::Tasks,
        SourceTable::Habits,
        SourceTable::HabitLogs,
        SourceTable::Journal,
        SourceTable::Goals,
    ];

    /// Table name as exposed by the Supabase REST interface.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTable::Users => "users",
            SourceTable::Tasks => "tasks",
            SourceTable::Habits => "habits",
            SourceTable::HabitLogs => "habit_logs",
            SourceTable::Journal => "journal",
            SourceTable::Goals => "goals",
        }
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rows of every exported table. A table that failed to export is empty.
#[derive(Debug, Clone, Default)]
pub struct ExportedTables {
    tables: HashMap<SourceTable, Vec<Row>>,
}

impl ExportedTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: SourceTable, rows: Vec<Row>) {
        self.tables.insert(table, rows);
    }

    pub fn rows(&self, table: SourceTable) -> &[Row] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }
}

// Worker API payloads. Fields typed as `Value` are copied from the source row
// as-is, including `null`.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfilePayload {
    pub username: Value,
    pub first_name: Value,
    pub last_name: Value,
    pub avatar_url: Value,
    pub email: Value,
    pub timezone: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskPayload {
    pub title: Value,
    pub date: Value,
    pub is_completed: u8,
    pub is_important: u8,
    pub has_notification: u8,
    pub notification_time: Value,
    pub recurrence_rule: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitPayload {
    pub title: Value,
    pub icon: Value,
    pub color: Value,
    pub start_date: Value,
    pub end_date: Value,
    pub has_notification: u8,
    pub notification_time: Value,
    pub recurrence_rule: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitLogPayload {
    pub habit_id: String,
    pub completed_at: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalPayload {
    #[serde(rename = "type")]
    pub entry_type: Value,
    pub content: Value,
    pub date: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalPayload {
    pub title: Value,
    pub description: Value,
    pub year: Value,
    pub deadline: Value,
}

/// Outcome counters for one import step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Records read from the export.
    pub attempted: usize,
    /// Records the Worker acknowledged with a non-empty response.
    pub imported: usize,
    /// Records never sent (missing identity or unmapped habit).
    pub skipped: usize,
    /// Records sent but not acknowledged.
    pub failed: usize,
}

/// Counters for a whole run, logged at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub exported: Vec<(SourceTable, usize)>,
    pub mapped_users: usize,
    pub mapped_habits: usize,
    pub users: StepReport,
    pub tasks: StepReport,
    pub habits: StepReport,
    pub habit_logs: StepReport,
    pub journal: StepReport,
    pub goals: StepReport,
}
