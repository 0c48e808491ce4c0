// Row -> Worker payload transforms
use serde_json::Value;

use crate::config::{DEFAULT_GOAL_YEAR, DEFAULT_HABIT_COLOR, DEFAULT_HABIT_ICON, DEFAULT_TIMEZONE};
use crate::error::{MigrationError, Result};
use crate::models::{
    GoalPayload, HabitLogPayload, HabitPayload, JournalPayload, ProfilePayload, Row, SourceTable,
    TaskPayload,
};

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// String form of an identifier column. Missing and `null` become "".
pub fn id_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Column value, `null` when the key is absent.
fn field(row: &Row, key: &str) -> Value {
    row.get(key).cloned().unwrap_or(Value::Null)
}

/// Column value, `default` only when the key is absent. A present `null` stays `null`.
fn field_or(row: &Row, key: &str, default: impl Into<Value>) -> Value {
    row.get(key).cloned().unwrap_or_else(|| default.into())
}

fn required(row: &Row, table: SourceTable, key: &'static str) -> Result<Value> {
    row.get(key)
        .cloned()
        .ok_or_else(|| MigrationError::missing_field(table.as_str(), key))
}

fn flag(row: &Row, key: &str) -> u8 {
    row.get(key).map(is_truthy).map(u8::from).unwrap_or(0)
}

/// String form of a required reference column.
pub fn required_id(row: &Row, table: SourceTable, key: &'static str) -> Result<String> {
    let value = required(row, table, key)?;
    Ok(id_string(Some(&value)))
}

/// Source user id owning a row, as a string.
pub fn owner_id(row: &Row, table: SourceTable) -> Result<String> {
    required_id(row, table, "user_id")
}

/// Best-effort decode of a recurrence rule stored as a JSON string.
///
/// Structured values and strings that fail to parse are returned unchanged.
pub fn decode_recurrence_rule(rule: Value) -> Value {
    match rule {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        other => other,
    }
}

pub fn profile_payload(user: &Row) -> ProfilePayload {
    let avatar = field(user, "avatar_url");
    let avatar_url = if is_truthy(&avatar) {
        avatar
    } else {
        field(user, "photo_url")
    };

    ProfilePayload {
        username: field(user, "username"),
        first_name: field(user, "first_name"),
        last_name: field(user, "last_name"),
        avatar_url,
        email: field(user, "email"),
        timezone: field_or(user, "timezone", DEFAULT_TIMEZONE),
    }
}

pub fn task_payload(task: &Row) -> Result<TaskPayload> {
    Ok(TaskPayload {
        title: required(task, SourceTable::Tasks, "title")?,
        date: field_or(task, "date", ""),
        is_completed: flag(task, "is_completed"),
        is_important: flag(task, "is_important"),
        has_notification: flag(task, "has_notification"),
        notification_time: field(task, "notification_time"),
        recurrence_rule: decode_recurrence_rule(field(task, "recurrence_rule")),
    })
}

pub fn habit_payload(habit: &Row) -> Result<HabitPayload> {
    Ok(HabitPayload {
        title: required(habit, SourceTable::Habits, "title")?,
        icon: field_or(habit, "icon", DEFAULT_HABIT_ICON),
        color: field_or(habit, "color", DEFAULT_HABIT_COLOR),
        start_date: field(habit, "start_date"),
        end_date: field(habit, "end_date"),
        has_notification: flag(habit, "has_notification"),
        notification_time: field(habit, "notification_time"),
        recurrence_rule: decode_recurrence_rule(field(habit, "recurrence_rule")),
    })
}

pub fn habit_log_payload(log: &Row, new_habit_id: &str) -> HabitLogPayload {
    HabitLogPayload {
        habit_id: new_habit_id.to_string(),
        completed_at: field_or(log, "completed_at", ""),
    }
}

pub fn journal_payload(entry: &Row) -> Result<JournalPayload> {
    Ok(JournalPayload {
        entry_type: required(entry, SourceTable::Journal, "type")?,
        content: required(entry, SourceTable::Journal, "content")?,
        date: field_or(entry, "date", ""),
    })
}

pub fn goal_payload(goal: &Row) -> Result<GoalPayload> {
    Ok(GoalPayload {
        title: required(goal, SourceTable::Goals, "title")?,
        description: field(goal, "description"),
        year: field_or(goal, "year", DEFAULT_GOAL_YEAR),
        deadline: field(goal, "deadline"),
    })
}
