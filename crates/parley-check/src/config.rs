use std::path::PathBuf;

use anyhow::{Result, bail};

const DEFAULT_MAX_REPORTED: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub messages_path: Option<PathBuf>,
    pub webhooks_path: Option<PathBuf>,
    /// Channel and user lists for reference checks. Either both or neither.
    pub directory_paths: Option<(PathBuf, PathBuf)>,
    pub max_reported: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);

        let messages_path = path("PARLEY_MESSAGES_PATH");
        let webhooks_path = path("PARLEY_WEBHOOKS_PATH");
        if messages_path.is_none() && webhooks_path.is_none() {
            bail!("Nothing to check: set PARLEY_MESSAGES_PATH and/or PARLEY_WEBHOOKS_PATH");
        }

        let directory_paths = match (path("PARLEY_CHANNELS_PATH"), path("PARLEY_USERS_PATH")) {
            (Some(channels), Some(users)) => Some((channels, users)),
            (None, None) => None,
            _ => bail!("PARLEY_CHANNELS_PATH and PARLEY_USERS_PATH must be set together"),
        };

        let max_reported = match lookup("PARLEY_MAX_REPORTED") {
            Some(raw) => raw.parse()?,
            None => DEFAULT_MAX_REPORTED,
        };

        Ok(Self {
            messages_path,
            webhooks_path,
            directory_paths,
            max_reported,
        })
    }
}
