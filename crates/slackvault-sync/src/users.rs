use slackvault_common::{Result, canonical_json};
use slackvault_db::{SnapshotKind, SnapshotStore, Store};
use slackvault_source::ExportSource;
use tracing::{error, info};

use crate::report::PhaseReport;

/// Mirror the workspace user list into append-only snapshots.
pub async fn sync_users(source: &dyn ExportSource, store: &Store) -> Result<PhaseReport> {
    let users = source.list_users().await?;
    info!("syncing {} user(s)", users.len());

    let snapshots = SnapshotStore::new(store);
    let mut report = PhaseReport::default();

    for user in &users {
        let payload = match canonical_json(user) {
            Ok(p) => p,
            Err(e) => {
                error!("serialize failed for user {}: {e}", user.id);
                report.failed += 1;
                continue;
            }
        };

        match snapshots.sync_snapshot(SnapshotKind::User, &user.id, &payload) {
            Ok(outcome) => report.record(outcome),
            Err(e) => {
                error!("insert failed for user {}: {e}", user.id);
                report.failed += 1;
            }
        }
    }

    report.print_summary("user");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::sync_users;
    use crate::testutil::{FakeSource, open_with_schema};

    #[tokio::test]
    async fn unchanged_users_are_skipped_on_the_second_run() {
        let store = open_with_schema();
        let source = FakeSource::default()
            .with_user("U01", "alice")
            .with_user("U02", "bob");

        let first = sync_users(&source, &store)
            .await
            .expect("first sync should succeed");
        assert_eq!(first.inserted, 2);

        let second = sync_users(&source, &store)
            .await
            .expect("second sync should succeed");
        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped, 2);
    }

    #[tokio::test]
    async fn one_changed_user_produces_exactly_one_new_row() {
        let store = open_with_schema();
        let source = FakeSource::default()
            .with_user("U01", "alice")
            .with_user("U02", "bob");
        sync_users(&source, &store)
            .await
            .expect("first sync should succeed");

        let changed = FakeSource::default()
            .with_user("U01", "alice")
            .with_user("U02", "bob-renamed");
        let report = sync_users(&changed, &store)
            .await
            .expect("second sync should succeed");

        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped, 1);
    }
}
