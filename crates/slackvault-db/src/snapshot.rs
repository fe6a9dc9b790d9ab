use chrono::{SecondsFormat, Utc};
use rusqlite::params;
use slackvault_common::{Error, Result};

use crate::store::Store;

/// Append-only snapshot tables sharing the `(public_id, data,
/// observed_at)` shape. Table names come from this enum, never from
/// caller strings — SQL identifiers cannot be bound as parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Channel,
    User,
}

impl SnapshotKind {
    fn table(self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::User => "user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Inserted,
    Skipped,
}

/// Dedup-and-append primitive over the snapshot tables. A new row lands
/// only when the payload differs from the latest recorded snapshot for
/// that entity; unchanged state writes nothing.
pub struct SnapshotStore<'a> {
    store: &'a Store,
}

impl<'a> SnapshotStore<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert a snapshot unless the latest one for `public_id` already
    /// carries the same payload. The comparison and the insert are one
    /// statement, so there is no window between check and write. A
    /// unique-constraint rejection from a concurrent insert means the
    /// row is already current and is reported as skipped.
    pub fn sync_snapshot(
        &self,
        kind: SnapshotKind,
        public_id: &str,
        payload: &str,
    ) -> Result<SyncOutcome> {
        let table = kind.table();
        let sql = format!(
            "INSERT INTO \"{table}\" (public_id, data, observed_at)
             SELECT ?1, ?2, ?3
             WHERE NOT EXISTS (
                 SELECT 1 FROM (
                     SELECT data FROM \"{table}\"
                     WHERE public_id = ?1
                     ORDER BY observed_at DESC, id DESC
                     LIMIT 1
                 ) latest
                 WHERE latest.data = ?2
             )"
        );

        let conn = self.store.connection()?;
        let inserted = conn
            .execute(&sql, params![public_id, payload, observation_timestamp()])
            .map(|n| n == 1);

        match inserted {
            Ok(true) => Ok(SyncOutcome::Inserted),
            Ok(false) => Ok(SyncOutcome::Skipped),
            Err(e) => match Store::classify(e, "insert snapshot") {
                Error::AlreadyExists => Ok(SyncOutcome::Skipped),
                other => Err(other),
            },
        }
    }

    /// Emoji snapshots carry the source URL and the blob-store file id
    /// instead of a serialized payload. Change detection happens on the
    /// URL before upload, so this is a plain append.
    pub fn insert_emoji(
        &self,
        public_id: &str,
        slack_url: &str,
        file_id: &str,
    ) -> Result<SyncOutcome> {
        let conn = self.store.connection()?;
        let result = conn.execute(
            "INSERT INTO emoji (public_id, slack_url, file_id, observed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![public_id, slack_url, file_id, observation_timestamp()],
        );

        match result {
            Ok(_) => Ok(SyncOutcome::Inserted),
            Err(e) => match Store::classify(e, "insert emoji snapshot") {
                Error::AlreadyExists => Ok(SyncOutcome::Skipped),
                other => Err(other),
            },
        }
    }

    /// The change signal for an emoji is its source URL: true when the
    /// latest snapshot for `public_id` records exactly this URL.
    pub fn latest_emoji_url_matches(&self, public_id: &str, slack_url: &str) -> Result<bool> {
        let conn = self.store.connection()?;
        conn.query_row(
            "SELECT EXISTS (
                 SELECT 1 FROM (
                     SELECT slack_url FROM emoji
                     WHERE public_id = ?1
                     ORDER BY observed_at DESC, id DESC
                     LIMIT 1
                 ) latest
                 WHERE latest.slack_url = ?2
             )",
            params![public_id, slack_url],
            |row| row.get(0),
        )
        .map_err(|e| Store::classify(e, "check emoji snapshot"))
    }

    /// Messages keep only their current state: insert, or overwrite the
    /// payload in place when the public id is already recorded.
    pub fn upsert_message(&self, public_id: &str, channel_rowid: i64, payload: &str) -> Result<()> {
        let conn = self.store.connection()?;
        conn.execute(
            "INSERT INTO message (public_id, channel_id, data)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (public_id) DO UPDATE SET data = excluded.data",
            params![public_id, channel_rowid, payload],
        )
        .map_err(|e| Store::classify(e, "upsert message"))?;
        Ok(())
    }

    /// Surrogate id of the channel's latest snapshot row, used as the
    /// foreign key for its messages.
    pub fn channel_rowid(&self, public_id: &str) -> Result<i64> {
        let conn = self.store.connection()?;
        conn.query_row(
            "SELECT id FROM channel
             WHERE public_id = ?1
             ORDER BY observed_at DESC, id DESC
             LIMIT 1",
            params![public_id],
            |row| row.get(0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                Error::NotFound(format!("no channel snapshot for public_id {public_id}"))
            }
            other => Store::classify(other, "resolve channel rowid"),
        })
    }
}

fn observation_timestamp() -> String {
    // Fixed-width UTC timestamps so string comparison orders
    // observations chronologically.
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
