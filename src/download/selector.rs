//! Stream selection policy.
//!
//! Given the snapshot of a video's available streams and a requested
//! quality tier, pick exactly one stream to download. Pure functions, no
//! I/O: the stream list is fetched once by the metadata provider and passed
//! in, so the same inputs always produce the same choice.
//!
//! Audio tiers map to bitrate extremes plus an upper-middle "medium" pick;
//! video tiers match the resolution label exactly and otherwise degrade by
//! scanning all known tiers from the highest resolution down, taking the
//! first one present. The degrade scan is top-down regardless of where the
//! requested tier sits, so asking for 240p when only 480p exists still
//! yields 480p.

use std::fmt;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Whether a stream carries audio or video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum StreamKind {
    Audio,
    Video,
}

/// One available encoded rendition of a video.
///
/// Immutable snapshot taken from the video metadata; `handle` is the
/// opaque format id handed back to yt-dlp to trigger the actual download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub kind: StreamKind,
    /// Average bitrate in kbit/s. Always present on audio descriptors that
    /// reach the selector (non-numeric bitrates are dropped during mapping).
    pub bitrate: Option<u32>,
    /// Resolution label such as `480p`. Video only.
    pub resolution: Option<String>,
    /// yt-dlp format id used to download this stream.
    pub handle: String,
}

/// Requested audio quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum AudioQuality {
    Best,
    Medium,
    Low,
}

/// Requested video quality tier, ordered by resolution height.
///
/// The numeric height is explicit — ordering never goes through the string
/// label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString, EnumIter)]
pub enum VideoQuality {
    #[strum(serialize = "240p")]
    P240,
    #[strum(serialize = "360p")]
    P360,
    #[strum(serialize = "480p")]
    P480,
    #[strum(serialize = "720p")]
    P720,
    #[strum(serialize = "1080p")]
    P1080,
}

impl VideoQuality {
    /// Resolution height in pixels.
    pub const fn height(self) -> u32 {
        match self {
            VideoQuality::P240 => 240,
            VideoQuality::P360 => 360,
            VideoQuality::P480 => 480,
            VideoQuality::P720 => 720,
            VideoQuality::P1080 => 1080,
        }
    }

    /// Resolution label as it appears in stream descriptors.
    pub const fn label(self) -> &'static str {
        match self {
            VideoQuality::P240 => "240p",
            VideoQuality::P360 => "360p",
            VideoQuality::P480 => "480p",
            VideoQuality::P720 => "720p",
            VideoQuality::P1080 => "1080p",
        }
    }
}

/// A download request: which kind of stream, at which tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityRequest {
    Audio(AudioQuality),
    Video(VideoQuality),
}

impl QualityRequest {
    /// Parses a `(kind, tier)` pair such as `video` + `720p`.
    pub fn parse(kind: StreamKind, tier: &str) -> Option<Self> {
        match kind {
            StreamKind::Audio => tier.parse().ok().map(QualityRequest::Audio),
            StreamKind::Video => tier.parse().ok().map(QualityRequest::Video),
        }
    }
}

impl fmt::Display for QualityRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityRequest::Audio(tier) => write!(f, "audio/{}", tier),
            QualityRequest::Video(tier) => write!(f, "video/{}", tier),
        }
    }
}

/// Outcome of a selection.
///
/// `Unavailable` is a normal result, not an error: the caller is expected to
/// tell the user rather than retry. `Degraded` reports which resolution was
/// substituted so the caller can say so.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionResult<'a> {
    /// A stream matching the requested tier exactly.
    Selected(&'a StreamDescriptor),
    /// The requested tier was absent; the closest available (preferring
    /// higher resolutions) was chosen instead.
    Degraded {
        stream: &'a StreamDescriptor,
        requested: VideoQuality,
        substituted: VideoQuality,
    },
    /// No stream of the requested kind exists for this video.
    Unavailable,
}

impl<'a> SelectionResult<'a> {
    /// The chosen stream, if any.
    pub fn stream(&self) -> Option<&'a StreamDescriptor> {
        match self {
            SelectionResult::Selected(s) => Some(s),
            SelectionResult::Degraded { stream, .. } => Some(stream),
            SelectionResult::Unavailable => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, SelectionResult::Unavailable)
    }
}

/// Picks an audio stream for the requested tier.
///
/// Only audio streams with a numeric bitrate are considered. `Best` takes
/// the maximum bitrate, `Low` the minimum (first encountered wins ties),
/// and `Medium` sorts ascending and takes the element at `floor(n / 2)` —
/// the upper-middle element for even counts. That index is load-bearing:
/// existing users see the same rendition for "medium" across requests.
pub fn select_audio(streams: &[StreamDescriptor], tier: AudioQuality) -> SelectionResult<'_> {
    let candidates: Vec<&StreamDescriptor> = streams
        .iter()
        .filter(|s| s.kind == StreamKind::Audio && s.bitrate.is_some())
        .collect();

    if candidates.is_empty() {
        return SelectionResult::Unavailable;
    }

    let chosen = match tier {
        AudioQuality::Best => candidates
            .iter()
            .copied()
            .reduce(|best, s| if s.bitrate > best.bitrate { s } else { best }),
        AudioQuality::Low => candidates
            .iter()
            .copied()
            .reduce(|low, s| if s.bitrate < low.bitrate { s } else { low }),
        AudioQuality::Medium => {
            let mut sorted = candidates.clone();
            sorted.sort_by_key(|s| s.bitrate);
            sorted.get(sorted.len() / 2).copied()
        }
    };

    match chosen {
        Some(stream) => SelectionResult::Selected(stream),
        None => SelectionResult::Unavailable,
    }
}

/// Picks a video stream for the requested tier.
///
/// Exact label match first. When the tier is absent, all tiers are scanned
/// from the highest resolution down and the first one with a stream wins —
/// "closest available, preferring higher", not nearest-by-distance. The
/// substitution is logged and reported in the result.
pub fn select_video(streams: &[StreamDescriptor], tier: VideoQuality) -> SelectionResult<'_> {
    let find = |label: &str| {
        streams
            .iter()
            .find(|s| s.kind == StreamKind::Video && s.resolution.as_deref() == Some(label))
    };

    if let Some(stream) = find(tier.label()) {
        return SelectionResult::Selected(stream);
    }

    for candidate in VideoQuality::iter().rev() {
        if let Some(stream) = find(candidate.label()) {
            log::info!(
                "Requested quality '{}' not available, downloading closest: '{}'",
                tier,
                candidate
            );
            return SelectionResult::Degraded {
                stream,
                requested: tier,
                substituted: candidate,
            };
        }
    }

    SelectionResult::Unavailable
}

/// Dispatches a [`QualityRequest`] to the matching selector.
pub fn select(streams: &[StreamDescriptor], request: QualityRequest) -> SelectionResult<'_> {
    match request {
        QualityRequest::Audio(tier) => select_audio(streams, tier),
        QualityRequest::Video(tier) => select_video(streams, tier),
    }
}
