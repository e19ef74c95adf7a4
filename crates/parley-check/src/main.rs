mod config;
mod report;

use std::path::Path;

use anyhow::{Context, bail};
use serde::de::DeserializeOwned;
use tracing::info;

use parley_types::{Channel, ChannelMessage, ChannelWebhook, Directory, User, wire};

use crate::config::Config;
use crate::report::Report;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley_check=info,parley_types=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let (channel_path, user_path) = match &config.directory_paths {
        Some((channels, users)) => (Some(channels.as_path()), Some(users.as_path())),
        None => (None, None),
    };

    let (messages, webhooks, channels, users) = tokio::try_join!(
        load::<ChannelMessage>(config.messages_path.as_deref()),
        load::<ChannelWebhook>(config.webhooks_path.as_deref()),
        load::<Channel>(channel_path),
        load::<User>(user_path),
    )?;

    let directory = config.directory_paths.is_some().then(|| {
        let directory = Directory::from_records(&channels, &users);
        info!(
            "Reference directory: {} channel(s), {} user(s)",
            directory.channel_count(),
            directory.user_count()
        );
        directory
    });

    let report = Report::build(&messages, &webhooks, directory.as_ref());
    report.log(config.max_reported);

    if !report.is_clean() {
        bail!("{} integrity violation(s) found", report.violations.len());
    }

    info!("All records consistent");
    Ok(())
}

/// Reads one payload file. A missing path yields no records.
async fn load<T: DeserializeOwned>(path: Option<&Path>) -> anyhow::Result<Vec<T>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<T> = wire::decode_batch(&raw)
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    info!("Loaded {} record(s) from {}", records.len(), path.display());
    Ok(records)
}
