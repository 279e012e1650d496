use async_trait::async_trait;
use eyre::{Result, eyre};
use log::debug;
use yt_transcript_rs::api::YouTubeTranscriptApi;

/// A transcript source keyed only by video ID, with no format negotiation
#[async_trait]
pub trait AlternateSource: Send + Sync {
    /// Full transcript text, snippets joined by single spaces
    async fn fetch_text(&self, video_id: &str) -> Result<String>;
}

/// Transcript retrieval through the `yt-transcript-rs` client
pub struct TranscriptApiSource {
    api: YouTubeTranscriptApi,
    lang: String,
}

impl TranscriptApiSource {
    pub fn new(lang: &str) -> Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| eyre!("could not create transcript api client: {e}"))?;
        Ok(Self {
            api,
            lang: lang.to_string(),
        })
    }
}

#[async_trait]
impl AlternateSource for TranscriptApiSource {
    async fn fetch_text(&self, video_id: &str) -> Result<String> {
        debug!("Fetching transcript via transcript api: video={video_id} lang={}", self.lang);

        let languages = [self.lang.as_str()];
        let transcript = self
            .api
            .fetch_transcript(video_id, &languages, false)
            .await
            .map_err(|e| eyre!("{e}"))?;

        let text = transcript
            .snippets
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        debug!("Transcript api returned {} snippets", transcript.snippets.len());
        Ok(text)
    }
}
