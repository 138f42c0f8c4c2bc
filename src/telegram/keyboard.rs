//! Inline keyboards and the callback-data codec.
//!
//! Callback data is colon-separated: `dl:<kind>:<video_id>` opens the
//! quality submenu, `dl:<kind>:<tier>:<video_id>` starts a download. Video
//! ids never contain `:`, so the format is unambiguous, and the longest
//! variant stays well under Telegram's 64-byte callback-data cap.

use strum::IntoEnumIterator;
use teloxide::types::InlineKeyboardMarkup;

use crate::download::selector::{AudioQuality, QualityRequest, StreamKind, VideoQuality};
use crate::telegram::cb;
use crate::core::validation::is_valid_video_id;

/// A parsed callback-query payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    /// User picked audio or video; show the tier submenu.
    ChooseKind { kind: StreamKind, video_id: String },
    /// User picked a tier; start the download.
    Download {
        request: QualityRequest,
        video_id: String,
    },
}

/// Parses callback data produced by the keyboards below.
///
/// Returns `None` for anything malformed — unknown prefixes, bad tiers,
/// ids that don't have the YouTube shape. Stale buttons from older bot
/// versions fall into that bucket and get the generic usage reply.
pub fn parse_callback(data: &str) -> Option<Callback> {
    let parts: Vec<&str> = data.split(':').collect();
    match parts.as_slice() {
        ["dl", kind, video_id] if is_valid_video_id(video_id) => {
            let kind = kind.parse::<StreamKind>().ok()?;
            Some(Callback::ChooseKind {
                kind,
                video_id: (*video_id).to_string(),
            })
        }
        ["dl", kind, tier, video_id] if is_valid_video_id(video_id) => {
            let kind = kind.parse::<StreamKind>().ok()?;
            let request = QualityRequest::parse(kind, tier)?;
            Some(Callback::Download {
                request,
                video_id: (*video_id).to_string(),
            })
        }
        _ => None,
    }
}

/// First keyboard: `[Audio | Video]`.
pub fn kind_keyboard(video_id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        cb("Audio", format!("dl:audio:{}", video_id)),
        cb("Video", format!("dl:video:{}", video_id)),
    ]])
}

/// Second keyboard: one row of tier buttons for the chosen kind.
pub fn quality_keyboard(kind: StreamKind, video_id: &str) -> InlineKeyboardMarkup {
    let row = match kind {
        StreamKind::Audio => AudioQuality::iter()
            .map(|tier| cb(tier.to_string(), format!("dl:audio:{}:{}", tier, video_id)))
            .collect::<Vec<_>>(),
        StreamKind::Video => VideoQuality::iter()
            .map(|tier| cb(tier.to_string(), format!("dl:video:{}:{}", tier, video_id)))
            .collect::<Vec<_>>(),
    };
    InlineKeyboardMarkup::new(vec![row])
}
