use slackvault_common::canonical_json;
use slackvault_db::{SnapshotStore, Store};
use slackvault_source::{Channel, ExportSource};
use tracing::{error, warn};

use crate::report::{ChannelMessageOutcome, MessageReport};

/// Mirror message history for every channel. Channels are isolated from
/// each other: one channel failing never stops the next.
pub async fn sync_messages(
    source: &dyn ExportSource,
    store: &Store,
    channels: &[Channel],
) -> MessageReport {
    let mut report = MessageReport::default();

    for channel in channels {
        let outcome = sync_channel_messages(source, store, channel).await;
        report.channels.push((channel.id.clone(), outcome));
    }

    report.print_summary();
    report
}

/// One channel's message pass. Messages keep only their current state,
/// so each one is upserted keyed by its `ts`; a failing message is
/// counted and the rest of the channel continues.
pub async fn sync_channel_messages(
    source: &dyn ExportSource,
    store: &Store,
    channel: &Channel,
) -> ChannelMessageOutcome {
    let messages = match source.dump_all_messages(&channel.id).await {
        Ok(m) => m,
        Err(e) => {
            error!("history fetch failed for channel {}: {e}", channel.id);
            return ChannelMessageOutcome::Aborted {
                reason: e.to_string(),
            };
        }
    };

    let snapshots = SnapshotStore::new(store);

    // A message cannot be recorded without its parent channel snapshot.
    let channel_rowid = match snapshots.channel_rowid(&channel.id) {
        Ok(id) => id,
        Err(e) => {
            error!("failed to resolve channel {}: {e}", channel.id);
            return ChannelMessageOutcome::Aborted {
                reason: e.to_string(),
            };
        }
    };

    let mut upserted = 0;
    let mut failed = 0;

    for message in &messages {
        let payload = match canonical_json(message) {
            Ok(p) => p,
            Err(e) => {
                warn!("serialize failed for message {}: {e}", message.ts);
                failed += 1;
                continue;
            }
        };

        match snapshots.upsert_message(&message.ts, channel_rowid, &payload) {
            Ok(()) => upserted += 1,
            Err(e) => {
                warn!("upsert failed for message {}: {e}", message.ts);
                failed += 1;
            }
        }
    }

    if failed == 0 {
        ChannelMessageOutcome::Updated { upserted }
    } else if upserted > 0 {
        ChannelMessageOutcome::Partial { upserted, failed }
    } else {
        ChannelMessageOutcome::Failed { failed }
    }
}
