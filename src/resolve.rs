use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use eyre::{Result, WrapErr, bail};
use log::{debug, info};
use serde::Deserialize;
use tokio::process::Command;

use crate::caption::{CaptionFormat, CaptionMetadata, CaptionTrack, TrackKind};

/// Subset of yt-dlp's info JSON that describes caption tracks
#[derive(Debug, Deserialize)]
struct InfoJson {
    title: Option<String>,
    automatic_captions: Option<HashMap<String, Vec<InfoTrack>>>,
    subtitles: Option<HashMap<String, Vec<InfoTrack>>>,
}

#[derive(Debug, Deserialize)]
struct InfoTrack {
    ext: Option<String>,
    url: Option<String>,
}

/// Looks up which caption tracks a video has
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(&self, video_id: &str) -> Result<CaptionMetadata>;
}

/// Resolves caption metadata by running yt-dlp without downloading the video
pub struct YtDlpResolver {
    program: PathBuf,
    lang: String,
    timeout: Duration,
}

impl YtDlpResolver {
    pub fn new(program: impl Into<PathBuf>, lang: &str, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            lang: lang.to_string(),
            timeout,
        }
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

#[async_trait]
impl MetadataResolver for YtDlpResolver {
    async fn resolve(&self, video_id: &str) -> Result<CaptionMetadata> {
        let url = watch_url(video_id);
        let program = self.program.display().to_string();
        debug!("Resolving caption metadata via {program}: {url}");

        let mut cmd = Command::new(&self.program);
        cmd.args([
            "--skip-download",
            "--write-subs",
            "--write-auto-subs",
            "--sub-langs",
            self.lang.as_str(),
            "--dump-single-json",
            "--no-warnings",
            "--no-playlist",
            url.as_str(),
        ])
        .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                bail!(
                    "{program} not found. Install it to resolve caption tracks:\n  \
                     pip install yt-dlp\n  \
                     or: brew install yt-dlp"
                );
            }
            Ok(Err(e)) => return Err(e).wrap_err(format!("failed to run {program}")),
            Err(_) => bail!("{program} timed out after {}s", self.timeout.as_secs()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{program} exited with {}: {}", output.status, stderr.trim());
        }

        let json = String::from_utf8_lossy(&output.stdout);
        let metadata = metadata_from_json(&json, &self.lang)
            .wrap_err_with(|| format!("unreadable metadata for video {video_id}"))?;

        info!("Video title: {}", metadata.title.as_deref().unwrap_or("Unknown"));
        Ok(metadata)
    }
}

/// Build caption metadata for `lang` from yt-dlp's info JSON
pub fn metadata_from_json(json: &str, lang: &str) -> Result<CaptionMetadata> {
    let info: InfoJson = serde_json::from_str(json)?;

    let mut metadata = CaptionMetadata::new(info.title);
    for (kind, tiers) in [
        (TrackKind::Automatic, info.automatic_captions),
        (TrackKind::Manual, info.subtitles),
    ] {
        let Some(mut tiers) = tiers else { continue };
        let Some(tracks) = tiers.remove(lang) else { continue };

        let tracks: Vec<CaptionTrack> = tracks
            .into_iter()
            .filter_map(|t| {
                Some(CaptionTrack {
                    language: lang.to_string(),
                    format: CaptionFormat::from_ext(t.ext.as_deref().unwrap_or_default()),
                    url: t.url?,
                    kind,
                })
            })
            .collect();

        debug!("Found {} {kind} track(s) for lang={lang}", tracks.len());
        metadata.insert(kind, lang, tracks);
    }

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO: &str = r#"{
        "id": "abc123",
        "title": "Test Video",
        "automatic_captions": {
            "en": [
                {"ext": "json3", "url": "https://example.com/auto?fmt=json3", "name": "English"},
                {"ext": "vtt", "url": "https://example.com/auto?fmt=vtt", "name": "English"}
            ],
            "en-orig": [
                {"ext": "json3", "url": "https://example.com/orig?fmt=json3"}
            ],
            "de": []
        },
        "subtitles": {
            "en": [
                {"ext": "srv3", "url": "https://example.com/manual?fmt=srv3"},
                {"ext": "ttml"}
            ]
        }
    }"#;

    #[test]
    fn test_metadata_from_json() {
        let meta = metadata_from_json(INFO, "en").unwrap();
        assert_eq!(meta.title.as_deref(), Some("Test Video"));

        let auto = meta.tracks(TrackKind::Automatic, "en");
        assert_eq!(auto.len(), 2);
        assert_eq!(auto[0].format, CaptionFormat::Json3);
        assert_eq!(auto[1].url, "https://example.com/auto?fmt=vtt");

        let manual = meta.tracks(TrackKind::Manual, "en");
        assert_eq!(manual.len(), 1, "track without url is skipped");
        assert_eq!(manual[0].kind, TrackKind::Manual);
    }

    #[test]
    fn test_metadata_restricted_to_language() {
        let meta = metadata_from_json(INFO, "en").unwrap();
        assert_eq!(meta.languages(TrackKind::Automatic).collect::<Vec<_>>(), vec!["en"]);
    }

    #[test]
    fn test_metadata_empty_language_absent() {
        let meta = metadata_from_json(INFO, "de").unwrap();
        assert!(meta.is_empty());
    }

    #[test]
    fn test_metadata_null_tiers() {
        let meta = metadata_from_json(r#"{"automatic_captions": null, "subtitles": null}"#, "en").unwrap();
        assert!(meta.is_empty());
        assert!(meta.title.is_none());
    }

    #[test]
    fn test_metadata_malformed() {
        assert!(metadata_from_json("ERROR: Video unavailable", "en").is_err());
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(watch_url("dQw4w9WgXcQ"), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn test_missing_program_is_error() {
        let resolver = YtDlpResolver::new("/nonexistent/yt-dlp", "en", Duration::from_secs(5));
        let err = resolver.resolve("abc123").await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
