use std::path::Path;

use slackvault_common::{Error, Result};
use tracing::warn;

/// One schema-change script, immutable once loaded.
/// Filename convention: `<14-digit-timestamp>_<name>.<up|down>.sql`.
#[derive(Debug, Clone)]
pub struct Migration {
    pub timestamp: String,
    pub name: String,
    pub direction: Direction,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Ordered set of `up` migrations from a directory. `down` scripts are
/// parsed for validation but never kept — schema evolution here is
/// forward-only.
#[derive(Debug)]
pub struct MigrationCatalog {
    migrations: Vec<Migration>,
}

impl MigrationCatalog {
    pub fn load(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            Error::MigrationLoad(format!(
                "failed to read migrations directory {}: {e}",
                dir.display()
            ))
        })?;

        let mut migrations = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                Error::MigrationLoad(format!("failed to read directory entry: {e}"))
            })?;

            let path = entry.path();
            if path.is_dir() {
                continue;
            }

            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            let Some((timestamp, name, direction)) = parse_file_name(&file_name) else {
                if file_name.ends_with(".sql") {
                    warn!("skipping migration with unrecognized filename: {file_name}");
                }
                continue;
            };

            if direction == Direction::Down {
                continue;
            }

            let content = std::fs::read_to_string(&path).map_err(|e| {
                Error::MigrationLoad(format!(
                    "failed to read migration file {}: {e}",
                    path.display()
                ))
            })?;

            migrations.push(Migration {
                timestamp: timestamp.to_string(),
                name: name.to_string(),
                direction,
                content,
            });
        }

        // Fixed-width zero-padded timestamps, so string order is
        // chronological order regardless of directory listing order.
        migrations.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        Ok(Self { migrations })
    }

    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }
}

fn parse_file_name(file_name: &str) -> Option<(&str, &str, Direction)> {
    let stem = file_name.strip_suffix(".sql")?;
    let (stem, direction) = if let Some(s) = stem.strip_suffix(".up") {
        (s, Direction::Up)
    } else if let Some(s) = stem.strip_suffix(".down") {
        (s, Direction::Down)
    } else {
        return None;
    };

    let (timestamp, name) = stem.split_once('_')?;
    if timestamp.len() != 14 || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if name.is_empty() {
        return None;
    }

    Some((timestamp, name, direction))
}

#[cfg(test)]
mod tests {
    use super::{Direction, MigrationCatalog, parse_file_name};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "slackvault-catalog-test-{}-{}-{}",
            label,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    #[test]
    fn parses_up_and_down_file_names() {
        let (ts, name, dir) = parse_file_name("20240101120000_init.up.sql").unwrap();
        assert_eq!(ts, "20240101120000");
        assert_eq!(name, "init");
        assert_eq!(dir, Direction::Up);

        let (_, _, dir) = parse_file_name("20240101120000_init.down.sql").unwrap();
        assert_eq!(dir, Direction::Down);
    }

    #[test]
    fn rejects_malformed_file_names() {
        assert!(parse_file_name("init.up.sql").is_none());
        assert!(parse_file_name("2024_init.up.sql").is_none());
        assert!(parse_file_name("20240101120000_init.sql").is_none());
        assert!(parse_file_name("20240101120000_.up.sql").is_none());
        assert!(parse_file_name("README.md").is_none());
    }

    #[test]
    fn load_sorts_by_timestamp_not_listing_order() {
        let dir = temp_dir("ordering");
        fs::write(
            dir.join("20240101000000_later.up.sql"),
            "CREATE TABLE later (id INTEGER);",
        )
        .unwrap();
        fs::write(
            dir.join("20231231000000_earlier.up.sql"),
            "CREATE TABLE earlier (id INTEGER);",
        )
        .unwrap();

        let catalog = MigrationCatalog::load(&dir).expect("load should succeed");
        let ids: Vec<&str> = catalog
            .migrations()
            .iter()
            .map(|m| m.timestamp.as_str())
            .collect();
        assert_eq!(ids, vec!["20231231000000", "20240101000000"]);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn load_discards_down_migrations_and_skips_strays() {
        let dir = temp_dir("filtering");
        fs::write(
            dir.join("20240101000000_init.up.sql"),
            "CREATE TABLE t (id INTEGER);",
        )
        .unwrap();
        fs::write(dir.join("20240101000000_init.down.sql"), "DROP TABLE t;").unwrap();
        fs::write(dir.join("notes.sql"), "-- not a migration").unwrap();
        fs::write(dir.join(".gitkeep"), "").unwrap();

        let catalog = MigrationCatalog::load(&dir).expect("load should succeed");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.migrations()[0].name, "init");

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn load_fails_on_missing_directory() {
        let dir = temp_dir("missing").join("does-not-exist");
        let err = MigrationCatalog::load(&dir).expect_err("load should fail");
        assert!(matches!(
            err,
            slackvault_common::Error::MigrationLoad(_)
        ));
    }
}
