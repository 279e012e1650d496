use eyre::Result;
use serde::Serialize;

use crate::{Failure, TranscriptResult, TranscriptSource};

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Report<'a> {
    Success {
        video_id: &'a str,
        title: Option<&'a str>,
        source: &'a TranscriptSource,
        text: String,
        word_count: usize,
        truncated: bool,
    },
    Failure {
        video_id: &'a str,
        primary: &'a Failure,
        alternate: Option<&'a Failure>,
    },
}

/// Render as plain text: the transcript, or a single `Error:` line
pub fn render_text(result: &TranscriptResult) -> String {
    result.render()
}

fn report<'a>(video_id: &'a str, result: &'a TranscriptResult) -> Report<'a> {
    match result {
        TranscriptResult::Success(t) => Report::Success {
            video_id: &t.video_id,
            title: t.title.as_deref(),
            source: &t.source,
            text: t.transcript.text(),
            word_count: t.transcript.word_count(),
            truncated: t.transcript.truncated,
        },
        TranscriptResult::Failure { primary, alternate } => Report::Failure {
            video_id,
            primary,
            alternate: alternate.as_ref(),
        },
    }
}

/// Render every result as one JSON array of objects tagged by `status`
pub fn render_json(results: &[(String, TranscriptResult)]) -> Result<String> {
    let reports: Vec<Report<'_>> = results
        .iter()
        .map(|(video_id, result)| report(video_id, result))
        .collect();
    Ok(serde_json::to_string_pretty(&reports)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption::{CaptionFormat, TrackKind};
    use crate::{FailureKind, NormalizedTranscript, Transcript};

    fn sample_success() -> TranscriptResult {
        TranscriptResult::Success(Transcript {
            video_id: "test123".to_string(),
            title: Some("Test Video".to_string()),
            source: TranscriptSource::Captions {
                kind: TrackKind::Automatic,
                format: CaptionFormat::Json3,
            },
            transcript: NormalizedTranscript::by_words("one two three four", 3),
        })
    }

    #[test]
    fn test_render_text() {
        assert_eq!(render_text(&sample_success()), "one two three...");
    }

    #[test]
    fn test_render_text_failure() {
        let result = TranscriptResult::Failure {
            primary: Failure::new(FailureKind::NoCaptions, "no 'en' transcript available for this video"),
            alternate: None,
        };
        assert_eq!(render_text(&result), "Error: no 'en' transcript available for this video");
    }

    #[test]
    fn test_render_json_success() {
        let results = vec![("test123".to_string(), sample_success())];
        let json: serde_json::Value = serde_json::from_str(&render_json(&results).unwrap()).unwrap();
        let json = &json[0];
        assert_eq!(json["status"], "success");
        assert_eq!(json["title"], "Test Video");
        assert_eq!(json["source"]["type"], "captions");
        assert_eq!(json["source"]["kind"], "automatic");
        assert_eq!(json["source"]["format"], "json3");
        assert_eq!(json["text"], "one two three...");
        assert_eq!(json["word_count"], 3);
        assert_eq!(json["truncated"], true);
    }

    #[test]
    fn test_render_json_many_is_one_document() {
        let failure = TranscriptResult::Failure {
            primary: Failure::new(FailureKind::NoCaptions, "no 'en' transcript available for this video"),
            alternate: None,
        };
        let results = vec![
            ("test123".to_string(), sample_success()),
            ("other".to_string(), failure),
        ];
        let json: serde_json::Value = serde_json::from_str(&render_json(&results).unwrap()).unwrap();
        let reports = json.as_array().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0]["status"], "success");
        assert_eq!(reports[1]["status"], "failure");
        assert_eq!(reports[1]["video_id"], "other");
        assert!(reports[1]["alternate"].is_null());
    }

    #[test]
    fn test_render_json_failure() {
        let result = TranscriptResult::Failure {
            primary: Failure::new(FailureKind::Resolution, "could not resolve video abc"),
            alternate: Some(Failure::new(FailureKind::Alternate, "transcripts disabled")),
        };
        let results = vec![("abc".to_string(), result)];
        let json: serde_json::Value = serde_json::from_str(&render_json(&results).unwrap()).unwrap();
        let json = &json[0];
        assert_eq!(json["status"], "failure");
        assert_eq!(json["video_id"], "abc");
        assert_eq!(json["primary"]["kind"], "resolution");
        assert_eq!(json["alternate"]["kind"], "alternate");
        assert_eq!(json["alternate"]["message"], "transcripts disabled");
    }
}
