use std::collections::HashSet;
use std::path::Path;

use slackvault_common::{Error, Result};
use tracing::{debug, info};

use crate::catalog::{Migration, MigrationCatalog};
use crate::history::MigrationHistory;
use crate::store::Store;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub applied: usize,
    pub skipped: usize,
}

/// Applies pending migrations in timestamp order, all inside one
/// transaction: a batch of N pending migrations either fully lands or
/// fully fails.
pub struct MigrationRunner<'a> {
    store: &'a Store,
}

impl<'a> MigrationRunner<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn run(&self, migrations_dir: &Path) -> Result<MigrationSummary> {
        let catalog = MigrationCatalog::load(migrations_dir)?;
        let history = MigrationHistory::ensure(self.store)?;
        let applied = history.applied_ids()?;

        // Gap detection happens on the full ordered catalog before any
        // script runs, so an inconsistent history leaves the database
        // untouched.
        let pending = classify(catalog.migrations(), &applied)?;
        let skipped = catalog.len() - pending.len();

        if pending.is_empty() {
            info!("no pending migrations ({} already applied)", skipped);
            return Ok(MigrationSummary {
                applied: 0,
                skipped,
            });
        }

        let mut conn = self.store.connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(format!("failed to begin migration transaction: {e}")))?;

        for migration in &pending {
            info!(
                "applying migration {} ({})",
                migration.timestamp, migration.name
            );
            tx.execute_batch(&migration.content).map_err(|e| {
                Error::Database(format!(
                    "migration {} ({}) failed: {e}",
                    migration.timestamp, migration.name
                ))
            })?;
            MigrationHistory::record_applied(&tx, &migration.timestamp, &migration.name)?;
        }

        tx.commit()
            .map_err(|e| Error::Database(format!("failed to commit migrations: {e}")))?;

        info!("applied {} migration(s)", pending.len());
        Ok(MigrationSummary {
            applied: pending.len(),
            skipped,
        })
    }
}

/// Splits the ordered catalog into applied and pending. Once a pending
/// migration is seen, every later one must also be pending; an applied
/// id after a pending one means the history has a gap.
fn classify<'m>(
    migrations: &'m [Migration],
    applied: &HashSet<String>,
) -> Result<Vec<&'m Migration>> {
    let mut pending: Vec<&Migration> = Vec::new();

    for migration in migrations {
        if applied.contains(&migration.timestamp) {
            if let Some(first_pending) = pending.first() {
                return Err(Error::MigrationGap {
                    pending: first_pending.timestamp.clone(),
                    applied: migration.timestamp.clone(),
                });
            }
            debug!("migration {} already applied", migration.timestamp);
        } else {
            pending.push(migration);
        }
    }

    Ok(pending)
}
