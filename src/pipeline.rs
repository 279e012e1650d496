use eyre::{Result, WrapErr};
use log::{debug, info, warn};

use crate::alternate::{AlternateSource, TranscriptApiSource};
use crate::config::Config;
use crate::fetch::{CaptionFetcher, HttpFetcher};
use crate::parse::parse;
use crate::resolve::{MetadataResolver, YtDlpResolver};
use crate::select::select;
use crate::{Failure, FailureKind, NormalizedTranscript, Transcript, TranscriptResult, TranscriptSource};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub lang: String,
    pub word_limit: usize,
    pub alternate_char_limit: usize,
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            lang: config.lang.clone(),
            word_limit: config.word_limit,
            alternate_char_limit: config.alternate_char_limit,
        }
    }
}

/// Caption tracks first, alternate transcript api second
pub struct TranscriptPipeline {
    resolver: Box<dyn MetadataResolver>,
    fetcher: Box<dyn CaptionFetcher>,
    alternate: Option<Box<dyn AlternateSource>>,
    options: PipelineOptions,
}

impl TranscriptPipeline {
    pub fn new(
        resolver: Box<dyn MetadataResolver>,
        fetcher: Box<dyn CaptionFetcher>,
        alternate: Option<Box<dyn AlternateSource>>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            alternate,
            options,
        }
    }

    /// Wire up yt-dlp, the HTTP fetcher and (if enabled) the transcript api
    pub fn from_config(config: &Config) -> Result<Self> {
        let resolver = YtDlpResolver::new(&config.yt_dlp, &config.lang, config.resolver_timeout());
        let fetcher = HttpFetcher::new(&config.user_agent, config.http_timeout())?;
        let alternate: Option<Box<dyn AlternateSource>> = if config.fallback {
            Some(Box::new(TranscriptApiSource::new(&config.lang)?))
        } else {
            None
        };

        Ok(Self::new(
            Box::new(resolver),
            Box::new(fetcher),
            alternate,
            PipelineOptions::from(config),
        ))
    }

    /// Produce a transcript for `video_id`. Never fails; every problem ends up
    /// in the returned result.
    pub async fn get_transcript(&self, video_id: &str) -> TranscriptResult {
        let primary = match self.caption_transcript(video_id).await {
            Ok(transcript) => return TranscriptResult::Success(transcript),
            Err(failure) => failure,
        };

        if primary.kind.is_unavailable() {
            info!("No caption transcript for {video_id}: {primary}");
        } else {
            warn!("Caption transcript failed for {video_id} ({}): {primary}", primary.kind);
        }

        let Some(source) = &self.alternate else {
            return TranscriptResult::Failure {
                primary,
                alternate: None,
            };
        };

        info!("Trying alternate transcript api for {video_id}");
        match self.alternate_transcript(source.as_ref(), video_id).await {
            Ok(transcript) => TranscriptResult::Success(transcript),
            Err(alternate) => {
                warn!("Alternate transcript failed for {video_id}: {alternate}");
                TranscriptResult::Failure {
                    primary,
                    alternate: Some(alternate),
                }
            }
        }
    }

    async fn caption_transcript(&self, video_id: &str) -> Result<Transcript, Failure> {
        let lang = &self.options.lang;

        let metadata = self
            .resolver
            .resolve(video_id)
            .await
            .wrap_err_with(|| format!("could not resolve video {video_id}"))
            .map_err(|e| Failure::from_report(FailureKind::Resolution, &e))?;

        let Some(track) = select(&metadata, lang) else {
            return Err(Failure::new(
                FailureKind::NoCaptions,
                format!("no '{lang}' transcript available for this video"),
            ));
        };

        let payload = self
            .fetcher
            .fetch(&track)
            .await
            .wrap_err_with(|| format!("could not download {} captions", track.kind))
            .map_err(|e| Failure::from_report(FailureKind::Fetch, &e))?;
        info!("Downloaded {} captions ({})", track.kind, payload.format);

        let fragments = parse(&payload.content, &payload.format).ok_or_else(|| {
            Failure::new(
                FailureKind::Parse,
                format!("could not read {} {} captions", track.kind, payload.format),
            )
        })?;
        let transcript = NormalizedTranscript::by_words(&fragments.join(" "), self.options.word_limit);

        debug!(
            "Caption transcript: {} words, truncated={}",
            transcript.word_count(),
            transcript.truncated
        );

        Ok(Transcript {
            video_id: video_id.to_string(),
            title: metadata.title,
            source: TranscriptSource::Captions {
                kind: track.kind,
                format: payload.format,
            },
            transcript,
        })
    }

    async fn alternate_transcript(&self, source: &dyn AlternateSource, video_id: &str) -> Result<Transcript, Failure> {
        let text = source
            .fetch_text(video_id)
            .await
            .map_err(|e| Failure::from_report(FailureKind::Alternate, &e))?;

        if text.trim().is_empty() {
            return Err(Failure::new(FailureKind::Alternate, "transcript api returned no text"));
        }
        let transcript = NormalizedTranscript::by_chars(&text, self.options.alternate_char_limit);

        Ok(Transcript {
            video_id: video_id.to_string(),
            title: None,
            source: TranscriptSource::Alternate,
            transcript,
        })
    }
}
