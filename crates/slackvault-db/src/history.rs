use std::collections::HashSet;

use rusqlite::{Transaction, params};
use slackvault_common::{Error, Result};

use crate::store::Store;

/// Persistent record of which migrations have been applied.
/// The primary key on the timestamp id guarantees no migration is ever
/// recorded twice.
pub struct MigrationHistory<'a> {
    store: &'a Store,
}

impl<'a> MigrationHistory<'a> {
    /// Creates the `migration_history` table if absent.
    pub fn ensure(store: &'a Store) -> Result<Self> {
        let conn = store.connection()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS migration_history (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );",
        )
        .map_err(|e| Error::Connection(format!("failed to create migration_history: {e}")))?;

        drop(conn);
        Ok(Self { store })
    }

    pub fn applied_ids(&self) -> Result<HashSet<String>> {
        let conn = self.store.connection()?;
        let mut stmt = conn
            .prepare("SELECT id FROM migration_history")
            .map_err(|e| Error::Connection(format!("failed to query migration history: {e}")))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| Error::Connection(format!("failed to read migration history: {e}")))?;

        rows.collect::<std::result::Result<HashSet<_>, _>>()
            .map_err(|e| Error::Database(format!("failed to collect migration ids: {e}")))
    }

    /// Records one applied migration inside the caller's transaction, so
    /// the history row lands or rolls back together with its script.
    pub fn record_applied(tx: &Transaction<'_>, id: &str, name: &str) -> Result<()> {
        tx.execute(
            "INSERT INTO migration_history (id, name) VALUES (?1, ?2)",
            params![id, name],
        )
        .map_err(|e| Store::classify(e, "record applied migration"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MigrationHistory;
    use crate::store::Store;

    #[test]
    fn ensure_creates_table_and_starts_empty() {
        let store = Store::in_memory().expect("store should open");
        let history = MigrationHistory::ensure(&store).expect("ensure should succeed");
        assert!(history.applied_ids().expect("query should succeed").is_empty());
    }

    #[test]
    fn record_applied_is_visible_after_commit() {
        let store = Store::in_memory().expect("store should open");
        let history = MigrationHistory::ensure(&store).expect("ensure should succeed");

        {
            let mut conn = store.connection().expect("lock should not be poisoned");
            let tx = conn.transaction().expect("transaction should open");
            MigrationHistory::record_applied(&tx, "20240101000000", "init")
                .expect("record should succeed");
            tx.commit().expect("commit should succeed");
        }

        let applied = history.applied_ids().expect("query should succeed");
        assert!(applied.contains("20240101000000"));
        assert_eq!(applied.len(), 1);
    }

    #[test]
    fn duplicate_record_is_already_exists() {
        let store = Store::in_memory().expect("store should open");
        let _history = MigrationHistory::ensure(&store).expect("ensure should succeed");

        let mut conn = store.connection().expect("lock should not be poisoned");
        let tx = conn.transaction().expect("transaction should open");
        MigrationHistory::record_applied(&tx, "20240101000000", "init")
            .expect("first record should succeed");
        let err = MigrationHistory::record_applied(&tx, "20240101000000", "init")
            .expect_err("duplicate record should fail");
        assert!(err.is_already_exists());
    }
}
