use std::time::Duration;

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use log::debug;

use crate::caption::{CaptionFormat, CaptionTrack};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Downloaded caption content, tagged with the format it should be read as
#[derive(Debug, Clone)]
pub struct RawCaptionPayload {
    pub format: CaptionFormat,
    pub content: String,
}

/// Downloads the content behind a caption track URL
#[async_trait]
pub trait CaptionFetcher: Send + Sync {
    async fn fetch(&self, track: &CaptionTrack) -> Result<RawCaptionPayload>;
}

/// Plain HTTP GET that identifies itself as a desktop browser
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .wrap_err("failed to build http client")?;
        Ok(Self::with_client(client, user_agent))
    }

    pub fn with_client(client: reqwest::Client, user_agent: &str) -> Self {
        Self {
            client,
            user_agent: user_agent.to_string(),
        }
    }
}

#[async_trait]
impl CaptionFetcher for HttpFetcher {
    async fn fetch(&self, track: &CaptionTrack) -> Result<RawCaptionPayload> {
        debug!("Fetching {} {} captions: {}", track.kind, track.format, track.url);

        let content = self
            .client
            .get(&track.url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        debug!("Downloaded {} bytes of {} captions", content.len(), track.kind);

        Ok(RawCaptionPayload {
            format: CaptionFormat::detect(&track.format, &track.url),
            content,
        })
    }
}
