// Supabase user uuid -> external identity (telegram id) lookup
//
// A `null` telegram_id counts as empty and the user is skipped. This is
// deliberate: such users are not migrated under the literal string "None".
use std::collections::BTreeMap;

use serde::Serialize;

use crate::migration::transform::id_string;
use crate::models::Row;

/// Maps opaque Supabase user ids to the string form of `telegram_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdentityMap {
    inner: BTreeMap<String, String>,
}

impl IdentityMap {
    /// Build the map from exported user rows.
    ///
    /// A user contributes only when both its `id` and its `telegram_id` are
    /// non-empty. Duplicate ids keep the last row seen.
    pub fn from_users(users: &[Row]) -> Self {
        let mut inner = BTreeMap::new();

        for user in users {
            let source_id = id_string(user.get("id"));
            let external_id = id_string(user.get("telegram_id"));

            if !source_id.is_empty() && !external_id.is_empty() {
                inner.insert(source_id, external_id);
            }
        }

        Self { inner }
    }

    /// Mapped identity for `source_id`, or `source_id` itself when unmapped.
    pub fn resolve<'a>(&'a self, source_id: &'a str) -> &'a str {
        self.inner
            .get(source_id)
            .map(String::as_str)
            .unwrap_or(source_id)
    }

    pub fn get(&self, source_id: &str) -> Option<&str> {
        self.inner.get(source_id).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
