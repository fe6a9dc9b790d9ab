use std::collections::HashMap;

use slackvault_blob::BlobStore;
use slackvault_common::Result;
use slackvault_db::{SnapshotStore, Store};
use slackvault_source::ExportSource;
use tracing::{error, info, warn};

use crate::report::PhaseReport;

const ALIAS_PREFIX: &str = "alias:";

/// What became of an alias once its target was visited.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AliasResolution {
    /// The target's latest snapshot already matches — nothing to write
    /// for the alias either.
    Unchanged,
    /// The target was (re)uploaded; the alias shares its file id.
    Resolved(String),
}

/// Mirror the emoji mapping. Originals carry a direct asset URL and are
/// uploaded to the blob store when their URL changed; aliases reference
/// an original by name and share its stored file id.
pub async fn sync_emojis(
    source: &dyn ExportSource,
    store: &Store,
    blob: &dyn BlobStore,
) -> Result<PhaseReport> {
    let emojis = source.dump_emojis().await?;
    info!("syncing {} emoji", emojis.len());

    let mut originals: Vec<(&str, &str)> = Vec::new();
    let mut aliases: HashMap<&str, &str> = HashMap::new();
    for (id, value) in &emojis {
        match value.strip_prefix(ALIAS_PREFIX) {
            Some(target) => {
                aliases.insert(id.as_str(), target);
            }
            None => originals.push((id.as_str(), value.as_str())),
        }
    }
    // Deterministic visit order; resolutions accumulate in their own
    // map rather than mutating the alias set mid-iteration.
    originals.sort_unstable();

    let snapshots = SnapshotStore::new(store);
    let mut report = PhaseReport::default();
    let mut resolutions: HashMap<&str, AliasResolution> = HashMap::new();

    for &(id, url) in &originals {
        match snapshots.latest_emoji_url_matches(id, url) {
            Ok(true) => {
                // The original has not changed, so neither have the
                // aliases pointing at it.
                for (&alias, &target) in &aliases {
                    if target == id {
                        resolutions.insert(alias, AliasResolution::Unchanged);
                    }
                }
                report.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                error!("snapshot check failed for emoji '{id}': {e}");
                report.failed += 1;
                continue;
            }
        }

        let file_id = match blob.upload_from_url(url).await {
            Ok(f) => f,
            Err(e) => {
                warn!("upload failed for emoji '{id}': {e}");
                report.failed += 1;
                continue;
            }
        };

        for (&alias, &target) in &aliases {
            if target == id {
                resolutions.insert(alias, AliasResolution::Resolved(file_id.clone()));
            }
        }

        match snapshots.insert_emoji(id, url, &file_id) {
            Ok(outcome) => report.record(outcome),
            Err(e) => {
                error!("insert failed for emoji '{id}': {e}");
                report.failed += 1;
            }
        }
    }

    let mut alias_ids: Vec<&str> = aliases.keys().copied().collect();
    alias_ids.sort_unstable();

    for alias in alias_ids {
        match resolutions.get(alias) {
            None => {
                // The alias points at a name that never appeared among
                // the originals: a broken or forward reference.
                error!(
                    "no file id for alias emoji '{alias}' (target '{}')",
                    aliases[alias]
                );
                report.failed += 1;
            }
            Some(AliasResolution::Unchanged) => {
                report.skipped += 1;
            }
            Some(AliasResolution::Resolved(file_id)) => {
                // The alias row keeps its own `alias:<target>` marker as
                // the URL column, sharing the target's file id.
                let marker = emojis[alias].as_str();
                match snapshots.insert_emoji(alias, marker, file_id) {
                    Ok(outcome) => report.record(outcome),
                    Err(e) => {
                        error!("insert failed for alias emoji '{alias}': {e}");
                        report.failed += 1;
                    }
                }
            }
        }
    }

    report.print_summary("emoji");
    Ok(report)
}
