pub mod alternate;
pub mod caption;
pub mod config;
pub mod fetch;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod resolve;
pub mod select;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use caption::{CaptionFormat, TrackKind};

/// Marker appended to a transcript that was cut short
pub const ELLIPSIS: &str = "...";

static URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"youtube\.com/watch\?(?:.*&)?v=([a-zA-Z0-9_-]+)",
        r"youtu\.be/([a-zA-Z0-9_-]+)",
        r"youtube\.com/embed/([a-zA-Z0-9_-]+)",
        r"youtube\.com/shorts/([a-zA-Z0-9_-]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Spoken text reduced to whitespace-separated words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTranscript {
    pub words: Vec<String>,
    pub truncated: bool,
}

impl NormalizedTranscript {
    /// Keep at most `limit` words
    pub fn by_words(text: &str, limit: usize) -> Self {
        let mut words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        let truncated = words.len() > limit;
        words.truncate(limit);
        Self { words, truncated }
    }

    /// Keep at most `limit` characters, then split into words
    pub fn by_chars(text: &str, limit: usize) -> Self {
        let truncated = text.chars().count() > limit;
        let kept: String = text.chars().take(limit).collect();
        Self {
            words: kept.split_whitespace().map(str::to_string).collect(),
            truncated,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Words joined by single spaces, with the ellipsis marker when truncated
    pub fn text(&self) -> String {
        let mut text = self.words.join(" ");
        if self.truncated {
            text.push_str(ELLIPSIS);
        }
        text
    }
}

impl std::fmt::Display for NormalizedTranscript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// Where the transcript text came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptSource {
    Captions { kind: TrackKind, format: CaptionFormat },
    Alternate,
}

impl std::fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptSource::Captions { kind, format } => write!(f, "{kind} captions ({format})"),
            TranscriptSource::Alternate => write!(f, "alternate transcript api"),
        }
    }
}

/// Successful transcript for a video
#[derive(Debug, Clone)]
pub struct Transcript {
    pub video_id: String,
    pub title: Option<String>,
    pub source: TranscriptSource,
    pub transcript: NormalizedTranscript,
}

/// Why a transcript could not be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Metadata could not be obtained from the extraction tool
    Resolution,
    /// No usable track in either tier
    NoCaptions,
    /// The selected track could not be downloaded
    Fetch,
    /// The downloaded payload held no usable text
    Parse,
    /// The alternate transcript api failed
    Alternate,
}

impl FailureKind {
    /// The platform simply has nothing for us, as opposed to something breaking
    pub fn is_unavailable(&self) -> bool {
        matches!(self, FailureKind::NoCaptions | FailureKind::Parse)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Resolution => write!(f, "resolution"),
            FailureKind::NoCaptions => write!(f, "no-captions"),
            FailureKind::Fetch => write!(f, "fetch"),
            FailureKind::Parse => write!(f, "parse"),
            FailureKind::Alternate => write!(f, "alternate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Keep the whole cause chain of an eyre report in the message
    pub fn from_report(kind: FailureKind, report: &eyre::Report) -> Self {
        Self::new(kind, format!("{report:#}"))
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Outcome of a transcript request
#[derive(Debug, Clone)]
pub enum TranscriptResult {
    Success(Transcript),
    Failure {
        primary: Failure,
        alternate: Option<Failure>,
    },
}

impl TranscriptResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TranscriptResult::Success(_))
    }

    /// Transcript text, or an `Error:` line listing every failed attempt
    pub fn render(&self) -> String {
        match self {
            TranscriptResult::Success(t) => t.transcript.text(),
            TranscriptResult::Failure { primary, alternate } => match alternate {
                Some(alt) => format!("Error: {primary}; alternate method failed: {alt}"),
                None => format!("Error: {primary}"),
            },
        }
    }
}

/// Extract a video ID from a watch URL, short link, embed or shorts URL.
/// Anything else that is non-empty and not a URL is taken as the ID itself.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    for re in URL_PATTERNS.iter() {
        if let Some(caps) = re.captures(input) {
            return Some(caps[1].to_string());
        }
    }

    if input.contains("://") || input.contains(char::is_whitespace) {
        return None;
    }

    Some(input.to_string())
}
