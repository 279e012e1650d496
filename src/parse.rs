use std::sync::LazyLock;

use eyre::{Result, WrapErr};
use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;

use crate::caption::CaptionFormat;

static MARKUP_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static LEADING_CLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}").unwrap());
static CLOCK_HMS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}:\d{2}\.\d{3}").unwrap());
static CLOCK_MS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}\.\d{3}").unwrap());

#[derive(Debug, Deserialize)]
struct Json3Payload {
    events: Option<Vec<Json3Event>>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    segs: Option<Vec<Json3Segment>>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    utf8: Option<String>,
}

/// Reduce a caption payload to its spoken text, in order.
///
/// Returns `None` when the payload cannot be read as `format` or holds no text.
pub fn parse(content: &str, format: &CaptionFormat) -> Option<Vec<String>> {
    let fragments = match format {
        CaptionFormat::Json3 => match parse_json3(content) {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!("Failed to parse json3 captions: {e:#}");
                return None;
            }
        },
        CaptionFormat::Vtt => parse_vtt(content),
        _ => parse_generic(content),
    };

    if fragments.is_empty() {
        debug!("No text found in {format} captions");
        return None;
    }
    Some(fragments)
}

fn parse_json3(content: &str) -> Result<Vec<String>> {
    let payload: Json3Payload = serde_json::from_str(content).wrap_err("malformed json3 payload")?;

    Ok(payload
        .events
        .unwrap_or_default()
        .into_iter()
        .flat_map(|event| event.segs.unwrap_or_default())
        .filter_map(|seg| {
            let text = seg.utf8?.trim().to_string();
            // [Music], [Applause] and friends
            if text.is_empty() || text.starts_with('[') {
                return None;
            }
            Some(text)
        })
        .collect())
}

fn parse_vtt(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut in_header = false;
    let mut in_block = false;
    let mut at_block_start = true;

    for line in content.lines() {
        let line = line.trim_start_matches('\u{feff}').trim();

        if line.is_empty() {
            in_header = false;
            in_block = false;
            at_block_start = true;
            continue;
        }

        let block_start = std::mem::replace(&mut at_block_start, false);

        if line.starts_with("-->") || LEADING_CLOCK.is_match(line) {
            // a cue timing line ends any header or comment block
            in_header = false;
            in_block = false;
            continue;
        }

        if block_start && line.starts_with("WEBVTT") {
            in_header = true;
            continue;
        }

        if in_header || in_block {
            continue;
        }

        if block_start && (is_block_keyword(line, "NOTE") || is_block_keyword(line, "STYLE")) {
            in_block = true;
            continue;
        }

        let text = collapse_whitespace(&decode_entities(&MARKUP_TAG.replace_all(line, "")));
        if !text.is_empty() {
            lines.push(text);
        }
    }

    lines
}

/// `keyword` alone, or followed by a space or tab
fn is_block_keyword(line: &str, keyword: &str) -> bool {
    match line.strip_prefix(keyword) {
        Some(rest) => rest.is_empty() || rest.starts_with([' ', '\t']),
        None => false,
    }
}

fn parse_generic(content: &str) -> Vec<String> {
    let text = MARKUP_TAG.replace_all(content, "");
    let text = CLOCK_HMS.replace_all(&text, "");
    let text = CLOCK_MS.replace_all(&text, "");
    let text = collapse_whitespace(&decode_entities(&text));

    if text.is_empty() { vec![] } else { vec![text] }
}

fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(content: &str, format: CaptionFormat) -> Option<String> {
        parse(content, &format).map(|f| f.join(" "))
    }

    #[test]
    fn test_vtt_example() {
        let vtt = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHello world\n\nNOTE comment\n00:00:02.000 --> 00:00:03.000\nSecond line";
        assert_eq!(joined(vtt, CaptionFormat::Vtt).as_deref(), Some("Hello world Second line"));
    }

    #[test]
    fn test_vtt_header_metadata_and_blocks() {
        let vtt = r#"WEBVTT
Kind: captions
Language: en

STYLE
::cue { color: yellow }

NOTE this is
a multi-line comment

00:00:00.500 --> 00:00:02.000 align:start position:0%
First <c.colorE5E5E5>cue</c>

00:00:02.000 --> 00:00:04.000
Fish &amp; chips
-->
"#;
        assert_eq!(joined(vtt, CaptionFormat::Vtt).as_deref(), Some("First cue Fish & chips"));
    }

    #[test]
    fn test_vtt_no_residual_timestamps() {
        let vtt = "WEBVTT\n\n00:01.000 --> 00:02.000\none\n00:02.000 --> 00:03.000\ntwo\n\n12:34:56.789 --> 12:34:57.000\nthree\n";
        let out = joined(vtt, CaptionFormat::Vtt).unwrap();
        assert_eq!(out, "one two three");
        assert!(!out.contains(':'));
    }

    #[test]
    fn test_vtt_keyword_inside_cue_is_text() {
        let vtt = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nNOTES ON THE PLAN\nkeep this line\n\n00:00:02.000 --> 00:00:03.000\nNOTE to self\nSTYLE IS EVERYTHING\n";
        assert_eq!(
            joined(vtt, CaptionFormat::Vtt).as_deref(),
            Some("NOTES ON THE PLAN keep this line NOTE to self STYLE IS EVERYTHING")
        );
    }

    #[test]
    fn test_vtt_keyword_must_be_whole_word() {
        let vtt = "WEBVTT\n\nNOTEWORTHY first\n\nNOTE\nskipped comment\n\nSTYLE\n::cue {}\n\n00:00:01.000 --> 00:00:02.000\nsecond\n";
        assert_eq!(joined(vtt, CaptionFormat::Vtt).as_deref(), Some("NOTEWORTHY first second"));
    }

    #[test]
    fn test_vtt_without_header() {
        assert_eq!(joined("just text\n", CaptionFormat::Vtt).as_deref(), Some("just text"));
    }

    #[test]
    fn test_vtt_only_timing_is_none() {
        assert!(parse("WEBVTT\n\n00:00:01.000 --> 00:00:02.000\n", &CaptionFormat::Vtt).is_none());
    }

    #[test]
    fn test_json3_event_then_segment_order() {
        let json = serde_json::json!({
            "wireMagic": "pb3",
            "events": [
                {"tStartMs": 0, "dDurationMs": 1000},
                {"tStartMs": 0, "segs": [{"utf8": "Hello"}, {"utf8": " world", "tOffsetMs": 400}]},
                {"tStartMs": 1000, "segs": [{"utf8": "\n"}]},
                {"tStartMs": 1500, "segs": [{"utf8": "[Music]"}, {"utf8": "again"}]}
            ]
        })
        .to_string();
        let fragments = parse(&json, &CaptionFormat::Json3).unwrap();
        assert_eq!(fragments, vec!["Hello", "world", "again"]);
    }

    #[test]
    fn test_json3_bracketed_only_is_none() {
        let json = r#"{"events": [{"segs": [{"utf8": "[Applause]"}, {"utf8": "  "}]}]}"#;
        assert!(parse(json, &CaptionFormat::Json3).is_none());
    }

    #[test]
    fn test_json3_malformed_is_none() {
        assert!(parse("{not json", &CaptionFormat::Json3).is_none());
        assert!(parse(r#"{"events": 5}"#, &CaptionFormat::Json3).is_none());
    }

    #[test]
    fn test_json3_missing_fields() {
        let json = r#"{"events": [{"segs": null}, {"segs": [{}, {"utf8": "ok"}]}]}"#;
        assert_eq!(joined(json, CaptionFormat::Json3).as_deref(), Some("ok"));
    }

    #[test]
    fn test_generic_srv3() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><timedtext format="3">
<body>
<p t="160" d="2000"><s ac="0">it&#39;s</s><s t="400" ac="0"> a</s><s t="800"> test</s></p>
<p t="2200" d="1500">second   line</p>
</body>
</timedtext>"#;
        assert_eq!(joined(xml, CaptionFormat::Srv3).as_deref(), Some("it's a test second line"));
    }

    #[test]
    fn test_generic_strips_timestamps() {
        let text = "0:00:01.000 hello 1:02.500 there 12:00:00.000";
        assert_eq!(joined(text, CaptionFormat::Ttml).as_deref(), Some("hello there"));
    }

    #[test]
    fn test_generic_ttml() {
        let ttml = r#"<tt xmlns="http://www.w3.org/ns/ttml"><body><div>
<p begin="00:00:00.000" end="00:00:01.000">One</p>
<p begin="00:00:01.000" end="00:00:02.000">Two &amp; three</p>
</div></body></tt>"#;
        assert_eq!(joined(ttml, CaptionFormat::Ttml).as_deref(), Some("One Two & three"));
    }

    #[test]
    fn test_generic_empty_is_none() {
        assert!(parse("<transcript></transcript>", &CaptionFormat::Srv1).is_none());
    }
}
