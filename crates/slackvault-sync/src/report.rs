use slackvault_db::SyncOutcome;

/// Per-phase counters, reported to the console at the end of each
/// syncer. Callers never branch on these — they exist for visibility.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PhaseReport {
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl PhaseReport {
    pub fn record(&mut self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Inserted => self.inserted += 1,
            SyncOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn print_summary(&self, entity: &str) {
        if self.inserted == 0 && self.failed == 0 {
            println!("{entity} snapshots are up-to-date");
            return;
        }
        println!(
            "{entity}: {} inserted, {} skipped, {} failed",
            self.inserted, self.skipped, self.failed
        );
    }
}

/// How one channel's message pass went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelMessageOutcome {
    /// Every message landed.
    Updated { upserted: usize },
    /// Some messages failed, the rest landed.
    Partial { upserted: usize, failed: usize },
    /// Every upsert failed.
    Failed { failed: usize },
    /// The channel never got as far as upserting: history fetch or
    /// parent snapshot resolution failed.
    Aborted { reason: String },
}

#[derive(Debug, Default)]
pub struct MessageReport {
    pub channels: Vec<(String, ChannelMessageOutcome)>,
}

impl MessageReport {
    pub fn print_summary(&self) {
        for (channel_id, outcome) in &self.channels {
            match outcome {
                ChannelMessageOutcome::Updated { upserted } => {
                    println!("message snapshots updated ({upserted}) for channel {channel_id}");
                }
                ChannelMessageOutcome::Partial { upserted, failed } => {
                    println!(
                        "message snapshots partially updated for channel {channel_id}: \
                         {upserted} landed, {failed} failed"
                    );
                }
                ChannelMessageOutcome::Failed { failed } => {
                    println!("no message snapshots updated ({failed} failures) for channel {channel_id}");
                }
                ChannelMessageOutcome::Aborted { reason } => {
                    println!("message sync skipped for channel {channel_id}: {reason}");
                }
            }
        }
    }
}
