// Identifier mapping file written at the end of a run
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::migration::identity::IdentityMap;
use crate::worker::HabitIdMap;

/// Both identifier maps built during a run, kept for audit and manual reuse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationMapping {
    pub uuid_to_telegram: BTreeMap<String, String>,
    pub old_habit_to_new: HabitIdMap,
}

impl MigrationMapping {
    pub fn new(identities: &IdentityMap, habit_ids: &HabitIdMap) -> Self {
        Self {
            uuid_to_telegram: identities
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            old_habit_to_new: habit_ids.clone(),
        }
    }

    /// Write the mapping, pretty-printed and ASCII-only, to `path`.
    pub async fn write(&self, path: &Path) -> Result<()> {
        let json = escape_non_ascii(&serde_json::to_string_pretty(self)?);
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Replace every non-ASCII char with its `\uXXXX` escape (UTF-16 surrogate
/// pairs above the BMP). Only valid on serialized JSON, where such chars can
/// appear inside strings alone.
fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut units = [0u16; 2];

    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }

    out
}
