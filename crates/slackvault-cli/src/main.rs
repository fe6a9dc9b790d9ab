use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use slackvault_blob::SeaweedClient;
use slackvault_config::{AppConfig, ConfigLoader};
use slackvault_db::{MigrationRunner, Store};
use slackvault_source::SlackClient;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slackvault",
    version,
    about = "Append-only snapshot mirror for Slack workspaces"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config directory (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides the
    /// configured one; `RUST_LOG` wins over both.
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate {
        /// Migrations directory (overrides the configured one)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Mirror workspace entities into snapshots. With no phase flags,
    /// all phases run.
    Sync {
        /// Sync channels
        #[arg(long)]
        channels: bool,

        /// Sync users
        #[arg(long)]
        users: bool,

        /// Sync emoji
        #[arg(long)]
        emoji: bool,

        /// Sync messages (implies fetching channels)
        #[arg(long)]
        messages: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let loader = match &cli.config {
        Some(dir) => ConfigLoader::with_dir(dir),
        None => ConfigLoader::new().context("failed to locate config directory")?,
    };
    let config = loader.load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(log_directive(
                cli.log_level.as_deref(),
                config.log_level.as_deref(),
            ))
        }))
        .init();

    let store = Store::open(&config.database.path)
        .context("failed to open the snapshot database")?;

    match cli.command {
        Commands::Migrate { dir } => {
            let dir = dir.unwrap_or_else(|| config.migrations_dir.clone());
            let summary = MigrationRunner::new(&store)
                .run(&dir)
                .context("migration run failed")?;
            println!(
                "migrations: {} applied, {} already up-to-date",
                summary.applied, summary.skipped
            );
        }
        Commands::Sync {
            channels,
            users,
            emoji,
            messages,
        } => {
            let all = !channels && !users && !emoji && !messages;
            run_sync(
                &config,
                &store,
                SyncPhases {
                    channels: all || channels,
                    users: all || users,
                    emoji: all || emoji,
                    messages: all || messages,
                },
            )
            .await?;
        }
    }

    Ok(())
}

/// Log filter when `RUST_LOG` is unset: the `--log-level` flag beats
/// the configured level, which beats "info".
fn log_directive(flag: Option<&str>, configured: Option<&str>) -> String {
    flag.or(configured).unwrap_or("info").to_string()
}

struct SyncPhases {
    channels: bool,
    users: bool,
    emoji: bool,
    messages: bool,
}

/// Runs the requested phases in sequence. Phases are failure-isolated:
/// one failing phase is logged and the rest still run, and the process
/// exits zero. Only missing credentials or an unopenable store are
/// fatal.
async fn run_sync(config: &AppConfig, store: &Store, phases: SyncPhases) -> Result<()> {
    let (Some(token), Some(cookie)) = (&config.slack.token, &config.slack.cookie) else {
        bail!(
            "Slack credentials missing: set SLACK_AUTH_TOKEN and SLACK_AUTH_COOKIE \
             or the slack section of the config file"
        );
    };
    let source = SlackClient::new(token.as_str(), cookie.as_str());

    let mut fetched_channels = None;
    if phases.channels || phases.messages {
        match slackvault_sync::sync_channels(&source, store).await {
            Ok((channels, _report)) => fetched_channels = Some(channels),
            Err(e) => error!("channel sync failed: {e}"),
        }
    }

    if phases.messages {
        // Messages reuse the channel list from this run; if the channel
        // fetch failed there is nothing to walk.
        if let Some(channels) = &fetched_channels {
            slackvault_sync::sync_messages(&source, store, channels).await;
        } else {
            error!("skipping message sync: channel list unavailable");
        }
    }

    if phases.users {
        if let Err(e) = slackvault_sync::sync_users(&source, store).await {
            error!("user sync failed: {e}");
        }
    }

    if phases.emoji {
        match &config.blob.master_url {
            Some(master_url) => {
                let blob = SeaweedClient::new(master_url.as_str());
                if let Err(e) = slackvault_sync::sync_emojis(&source, store, &blob).await {
                    error!("emoji sync failed: {e}");
                }
            }
            None => error!(
                "skipping emoji sync: blob store not configured \
                 (set SEAWEEDFS_MASTER_URL)"
            ),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::log_directive;

    #[test]
    fn log_directive_prefers_flag_then_config_then_info() {
        assert_eq!(log_directive(Some("debug"), Some("warn")), "debug");
        assert_eq!(log_directive(None, Some("warn")), "warn");
        assert_eq!(log_directive(None, None), "info");
    }
}
