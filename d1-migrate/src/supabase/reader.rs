// Supabase export: fetch every table and write its snapshot
use std::path::Path;

use tracing::{error, info};

use crate::config::MigrationConfig;
use crate::error::Result;
use crate::models::{ExportedTables, Row, SourceTable};
use crate::supabase::SourceReader;

/// Export all source tables in order.
///
/// A table whose fetch or snapshot write fails is logged and left empty; the
/// remaining tables are still exported.
pub async fn export_tables<R>(reader: &R, config: &MigrationConfig) -> ExportedTables
where
    R: SourceReader + ?Sized,
{
    let mut exported = ExportedTables::new();

    for table in SourceTable::ALL {
        info!("📥 Exporting {}...", table);

        let rows = match export_table(reader, table, &config.snapshot_path(table.as_str())).await {
            Ok(rows) => {
                info!("   ✅ {} rows exported", rows.len());
                rows
            }
            Err(e) => {
                error!("   ❌ Error: {}", e);
                Vec::new()
            }
        };

        exported.insert(table, rows);
    }

    exported
}

/// Fetch one table and write it, pretty-printed, to `snapshot_path`.
pub async fn export_table<R>(reader: &R, table: SourceTable, snapshot_path: &Path) -> Result<Vec<Row>>
where
    R: SourceReader + ?Sized,
{
    let rows = reader.fetch_table(table.as_str()).await?;
    write_snapshot(snapshot_path, &rows).await?;
    Ok(rows)
}

async fn write_snapshot(path: &Path, rows: &[Row]) -> Result<()> {
    let json = serde_json::to_string_pretty(rows)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSupabase;
    use serde_json::{json, Value};

    fn config_in(dir: &Path) -> MigrationConfig {
        MigrationConfig {
            output_dir: dir.to_path_buf(),
            ..MigrationConfig::default()
        }
    }

    #[tokio::test]
    async fn test_export_writes_snapshot_per_table() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockSupabase::new();
        source.register_table("users", json!([{"id": "u1", "telegram_id": 555, "first_name": "Žofia"}]));
        source.register_table("tasks", json!([]));

        let exported = export_tables(&source, &config_in(dir.path())).await;

        assert_eq!(exported.rows(SourceTable::Users).len(), 1);
        assert!(exported.rows(SourceTable::Tasks).is_empty());

        let users = std::fs::read_to_string(dir.path().join("users.json")).unwrap();
        assert!(users.contains("Žofia"));
        assert!(users.contains("\n  {"));
        let parsed: Value = serde_json::from_str(&users).unwrap();
        assert_eq!(parsed, json!([{"id": "u1", "telegram_id": 555, "first_name": "Žofia"}]));

        for table in SourceTable::ALL {
            assert_eq!(source.fetch_count(table.as_str()), 1);
        }
    }

    #[tokio::test]
    async fn test_snapshot_keeps_source_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockSupabase::new();
        source.register_table("users", json!([{"telegram_id": 555, "id": "u1", "a": 1}]));

        export_tables(&source, &config_in(dir.path())).await;

        let users = std::fs::read_to_string(dir.path().join("users.json")).unwrap();
        let telegram = users.find("\"telegram_id\"").unwrap();
        let id = users.find("\"id\"").unwrap();
        let a = users.find("\"a\"").unwrap();
        assert!(telegram < id && id < a, "columns reordered: {}", users);
    }

    #[tokio::test]
    async fn test_failed_table_defaults_to_empty_and_export_continues() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockSupabase::new();
        source.fail_table("tasks");
        source.register_table("goals", json!([{"user_id": "u1", "title": "Ship"}]));

        let exported = export_tables(&source, &config_in(dir.path())).await;

        assert!(exported.rows(SourceTable::Tasks).is_empty());
        assert_eq!(exported.rows(SourceTable::Goals).len(), 1);
        assert!(!dir.path().join("tasks.json").exists());
        assert!(dir.path().join("goals.json").exists());
    }

    #[tokio::test]
    async fn test_snapshot_write_failure_empties_table() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockSupabase::new();
        source.register_table("users", json!([{"id": "u1", "telegram_id": 1}]));

        let missing = dir.path().join("does-not-exist");
        let exported = export_tables(&source, &config_in(&missing)).await;

        assert!(exported.rows(SourceTable::Users).is_empty());
    }
}
