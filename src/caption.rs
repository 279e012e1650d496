use std::collections::BTreeMap;

use serde::Serialize;

/// Caption file format, as advertised by a track's extension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionFormat {
    Json3,
    Vtt,
    Srv3,
    Srv1,
    Ttml,
    Other(String),
}

impl CaptionFormat {
    /// Formats we know how to read, most preferred first
    pub const PREFERENCE: [CaptionFormat; 5] = [
        CaptionFormat::Json3,
        CaptionFormat::Vtt,
        CaptionFormat::Srv3,
        CaptionFormat::Srv1,
        CaptionFormat::Ttml,
    ];

    pub fn from_ext(ext: &str) -> Self {
        match ext.trim().to_ascii_lowercase().as_str() {
            "json3" => CaptionFormat::Json3,
            "vtt" | "webvtt" => CaptionFormat::Vtt,
            "srv3" => CaptionFormat::Srv3,
            "srv1" => CaptionFormat::Srv1,
            "ttml" => CaptionFormat::Ttml,
            other => CaptionFormat::Other(other.to_string()),
        }
    }

    /// Position in the preference order; `None` for formats never selected
    pub fn rank(&self) -> Option<usize> {
        Self::PREFERENCE.iter().position(|f| f == self)
    }

    /// Use the declared format, or sniff the URL when the declaration is unhelpful
    pub fn detect(declared: &CaptionFormat, url: &str) -> CaptionFormat {
        if !matches!(declared, CaptionFormat::Other(_)) {
            return declared.clone();
        }
        if let Some(fmt) = url
            .split(['?', '&'])
            .find_map(|pair| pair.strip_prefix("fmt="))
        {
            return Self::from_ext(fmt);
        }
        let path = url.split('?').next().unwrap_or(url);
        match path.rsplit_once('.') {
            Some((_, ext)) if !ext.contains('/') => Self::from_ext(ext),
            _ => declared.clone(),
        }
    }
}

impl std::fmt::Display for CaptionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptionFormat::Json3 => write!(f, "json3"),
            CaptionFormat::Vtt => write!(f, "vtt"),
            CaptionFormat::Srv3 => write!(f, "srv3"),
            CaptionFormat::Srv1 => write!(f, "srv1"),
            CaptionFormat::Ttml => write!(f, "ttml"),
            CaptionFormat::Other(ext) => write!(f, "{ext}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Automatic,
    Manual,
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackKind::Automatic => write!(f, "automatic"),
            TrackKind::Manual => write!(f, "manual"),
        }
    }
}

/// One downloadable caption track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub language: String,
    pub format: CaptionFormat,
    pub url: String,
    pub kind: TrackKind,
}

/// Caption tracks available for a video, split by tier and keyed by language.
///
/// A language with no tracks is absent rather than mapped to an empty list.
#[derive(Debug, Clone, Default)]
pub struct CaptionMetadata {
    pub title: Option<String>,
    automatic: BTreeMap<String, Vec<CaptionTrack>>,
    manual: BTreeMap<String, Vec<CaptionTrack>>,
}

impl CaptionMetadata {
    pub fn new(title: Option<String>) -> Self {
        Self {
            title,
            ..Default::default()
        }
    }

    /// Add tracks for one language; empty lists are ignored
    pub fn insert(&mut self, kind: TrackKind, language: &str, tracks: Vec<CaptionTrack>) {
        if tracks.is_empty() {
            return;
        }
        let map = match kind {
            TrackKind::Automatic => &mut self.automatic,
            TrackKind::Manual => &mut self.manual,
        };
        map.entry(language.to_string()).or_default().extend(tracks);
    }

    pub fn tracks(&self, kind: TrackKind, language: &str) -> &[CaptionTrack] {
        let map = match kind {
            TrackKind::Automatic => &self.automatic,
            TrackKind::Manual => &self.manual,
        };
        map.get(language).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn languages(&self, kind: TrackKind) -> impl Iterator<Item = &str> {
        let map = match kind {
            TrackKind::Automatic => &self.automatic,
            TrackKind::Manual => &self.manual,
        };
        map.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.automatic.is_empty() && self.manual.is_empty()
    }
}
