pub mod catalog;
pub mod history;
pub mod runner;
pub mod snapshot;
pub mod store;

pub use catalog::{Direction, Migration, MigrationCatalog};
pub use history::MigrationHistory;
pub use runner::{MigrationRunner, MigrationSummary};
pub use snapshot::{SnapshotKind, SnapshotStore, SyncOutcome};
pub use store::Store;
