use slackvault_common::{Result, canonical_json};
use slackvault_db::{SnapshotKind, SnapshotStore, Store};
use slackvault_source::{Channel, ChannelVisibility, ExportSource};
use tracing::{error, info};

use crate::report::PhaseReport;

/// Mirror the public channel list into append-only snapshots. Returns
/// the fetched channels so the message pass can reuse them without a
/// second fetch.
pub async fn sync_channels(
    source: &dyn ExportSource,
    store: &Store,
) -> Result<(Vec<Channel>, PhaseReport)> {
    let channels = source.list_channels(ChannelVisibility::Public).await?;
    info!("syncing {} channel(s)", channels.len());

    let snapshots = SnapshotStore::new(store);
    let mut report = PhaseReport::default();

    for channel in &channels {
        let payload = match canonical_json(channel) {
            Ok(p) => p,
            Err(e) => {
                error!("serialize failed for channel {}: {e}", channel.id);
                report.failed += 1;
                continue;
            }
        };

        match snapshots.sync_snapshot(SnapshotKind::Channel, &channel.id, &payload) {
            Ok(outcome) => report.record(outcome),
            Err(e) => {
                error!("insert failed for channel {}: {e}", channel.id);
                report.failed += 1;
            }
        }
    }

    report.print_summary("channel");
    Ok((channels, report))
}
