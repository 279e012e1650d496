use std::path::PathBuf;
use std::time::Duration;

use eyre::{Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::fetch::DEFAULT_USER_AGENT;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Caption language requested from both tiers
    pub lang: String,
    pub user_agent: String,
    pub http_timeout_secs: u64,
    pub resolver_timeout_secs: u64,
    /// yt-dlp binary, looked up on PATH unless absolute
    pub yt_dlp: PathBuf,
    /// Word limit for transcripts built from caption tracks
    pub word_limit: usize,
    /// Character limit for transcripts from the alternate api
    pub alternate_char_limit: usize,
    /// Try the alternate api when caption tracks yield nothing
    pub fallback: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout_secs: 30,
            resolver_timeout_secs: 120,
            yt_dlp: PathBuf::from("yt-dlp"),
            word_limit: 400,
            alternate_char_limit: 2000,
            fallback: true,
        }
    }
}

impl Config {
    /// Load config from ~/.config/captx/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    /// Limits of zero would truncate every transcript to nothing
    pub fn validate(&self) -> Result<()> {
        if self.word_limit == 0 {
            bail!("word_limit must be at least 1");
        }
        if self.alternate_char_limit == 0 {
            bail!("alternate_char_limit must be at least 1");
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn resolver_timeout(&self) -> Duration {
        Duration::from_secs(self.resolver_timeout_secs)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("captx")
        .join("config.toml")
}
