use log::debug;

use crate::caption::{CaptionMetadata, CaptionTrack, TrackKind};

/// Tiers in the order they are tried
const TIER_ORDER: [TrackKind; 2] = [TrackKind::Automatic, TrackKind::Manual];

/// Pick the caption track to download for `lang`.
///
/// Within a tier every track is ranked by format preference and the best one
/// wins; ties keep the order the extraction tool listed them in. `None` means
/// the video has no usable track in either tier.
pub fn select(metadata: &CaptionMetadata, lang: &str) -> Option<CaptionTrack> {
    for kind in TIER_ORDER {
        let best = metadata
            .tracks(kind, lang)
            .iter()
            .filter_map(|t| t.format.rank().map(|rank| (rank, t)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, t)| t);

        match best {
            Some(track) => {
                debug!("Selected {kind} track: lang={lang} format={}", track.format);
                return Some(track.clone());
            }
            None => debug!("No usable {kind} track for lang={lang}"),
        }
    }
    None
}
