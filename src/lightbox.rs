//! Lightbox rendering model: per-kind dispatch, video slot state machine,
//! wrap-around navigation.
//!
//! Given the asset a [`crate::view::ViewState`] lightbox points at, this
//! module decides *what* to render. [`slide_media`] maps an asset onto a
//! [`SlideMedia`] value the display layer consumes:
//!
//! - images display their source directly
//! - videos get a playback surface driven by a [`VideoSlot`]
//! - heic assets are a tri-state: converting (no record yet), converted
//!   (show the transcoded JPEG), or failed (show a visible placeholder —
//!   never a broken image, never an automatic retry)
//! - unknown assets render a textual fallback naming the file, never the
//!   raw bytes
//!
//! A failure is scoped to its own slide; neighbors render and navigate
//! normally.
//!
//! ## Navigation
//!
//! Next/previous wrap at both ends of the effective list: advancing past
//! the last slide lands on the first and vice versa. Wrapping (rather than
//! clamping) keeps the two navigation controls meaningful on every slide.
//!
//! ## Video slots
//!
//! A video slide is either showing its poster or actively playing, never
//! both: `Thumbnail → (click) → Playing → (ended or close) → Thumbnail`.

use crate::classify::MediaKind;
use crate::types::{Asset, ConversionRecord};
use std::path::Path;

/// What the display layer should render for one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideMedia<'a> {
    /// Plain raster image: display the source as-is.
    Image { source: &'a Path },
    /// Video: playback surface with a poster/playing handoff.
    Video { source: &'a Path },
    /// Heic with a finished conversion: display the transcoded JPEG.
    Converted { output: &'a Path },
    /// Heic not yet converted: loading state.
    Converting,
    /// Heic whose conversion failed: visible placeholder, no retry.
    ConversionFailed { reason: &'a str },
    /// Unclassifiable file: textual fallback naming it.
    Unsupported { file_name: &'a str },
}

/// Decide how to render an asset. Total over every kind and conversion
/// state.
pub fn slide_media(asset: &Asset) -> SlideMedia<'_> {
    match asset.kind {
        MediaKind::Image => SlideMedia::Image {
            source: &asset.path,
        },
        MediaKind::Video => SlideMedia::Video {
            source: &asset.path,
        },
        MediaKind::Heic => match &asset.conversion {
            Some(ConversionRecord::Ready { output }) => SlideMedia::Converted { output },
            Some(ConversionRecord::Failed { reason }) => SlideMedia::ConversionFailed { reason },
            None => SlideMedia::Converting,
        },
        MediaKind::Unknown => SlideMedia::Unsupported {
            file_name: &asset.file_name,
        },
    }
}

/// Download is offered for everything except videos.
pub fn can_download(kind: MediaKind) -> bool {
    kind != MediaKind::Video
}

/// Next slide position, wrapping past the end of a `len`-slide list.
pub fn next_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (index + 1) % len }
}

/// Previous slide position, wrapping before the start.
pub fn prev_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (index + len - 1) % len }
}

/// Playback state of one video slide. Exactly one of the two surfaces
/// (poster or player) is shown at a time; no other states exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VideoSlot {
    #[default]
    Thumbnail,
    Playing,
}

impl VideoSlot {
    /// Poster clicked: start playback. Already playing stays playing.
    pub fn play(&mut self) {
        *self = VideoSlot::Playing;
    }

    /// Playback ended, or the user closed the player: back to the poster.
    pub fn stop(&mut self) {
        *self = VideoSlot::Thumbnail;
    }

    pub fn is_playing(&self) -> bool {
        *self == VideoSlot::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn asset(name: &str, conversion: Option<ConversionRecord>) -> Asset {
        Asset {
            path: PathBuf::from(format!("spring-gala/{name}")),
            file_name: name.to_string(),
            kind: crate::classify::classify(name).kind,
            caption: None,
            tags: Vec::new(),
            conversion,
        }
    }

    // =========================================================================
    // Slide dispatch
    // =========================================================================

    #[test]
    fn image_displays_its_source() {
        let a = asset("a.jpg", None);
        assert_eq!(
            slide_media(&a),
            SlideMedia::Image {
                source: Path::new("spring-gala/a.jpg"),
            }
        );
    }

    #[test]
    fn video_gets_a_playback_surface() {
        let a = asset("b.mp4", None);
        assert_eq!(
            slide_media(&a),
            SlideMedia::Video {
                source: Path::new("spring-gala/b.mp4"),
            }
        );
    }

    #[test]
    fn unconverted_heic_is_loading() {
        let a = asset("c.heic", None);
        assert_eq!(slide_media(&a), SlideMedia::Converting);
    }

    #[test]
    fn converted_heic_displays_the_jpeg() {
        let a = asset(
            "c.heic",
            Some(ConversionRecord::Ready {
                output: PathBuf::from("spring-gala/c.jpg"),
            }),
        );
        assert_eq!(
            slide_media(&a),
            SlideMedia::Converted {
                output: Path::new("spring-gala/c.jpg"),
            }
        );
    }

    #[test]
    fn failed_heic_is_a_visible_placeholder() {
        let a = asset(
            "c.heic",
            Some(ConversionRecord::Failed {
                reason: "unsupported payload".to_string(),
            }),
        );
        assert_eq!(
            slide_media(&a),
            SlideMedia::ConversionFailed {
                reason: "unsupported payload",
            }
        );
    }

    #[test]
    fn unknown_renders_a_textual_fallback() {
        let a = asset("notes.txt", None);
        assert_eq!(
            slide_media(&a),
            SlideMedia::Unsupported {
                file_name: "notes.txt",
            }
        );
    }

    #[test]
    fn failed_conversion_does_not_affect_siblings() {
        let failed = asset(
            "c.heic",
            Some(ConversionRecord::Failed {
                reason: "read error".to_string(),
            }),
        );
        let sibling = asset("a.jpg", None);
        let slides = [slide_media(&sibling), slide_media(&failed)];

        assert!(matches!(slides[1], SlideMedia::ConversionFailed { .. }));
        // The neighbor still renders normally, and navigation from the
        // failed slide reaches it
        assert!(matches!(slides[0], SlideMedia::Image { .. }));
        assert_eq!(next_index(1, slides.len()), 0);
    }

    // =========================================================================
    // Download affordance
    // =========================================================================

    #[test]
    fn download_offered_for_non_video_kinds() {
        assert!(can_download(MediaKind::Image));
        assert!(can_download(MediaKind::Heic));
        assert!(can_download(MediaKind::Unknown));
    }

    #[test]
    fn download_not_offered_for_video() {
        assert!(!can_download(MediaKind::Video));
    }

    // =========================================================================
    // Wrap navigation
    // =========================================================================

    #[test]
    fn next_moves_forward_inside_the_list() {
        assert_eq!(next_index(0, 3), 1);
        assert_eq!(next_index(1, 3), 2);
    }

    #[test]
    fn next_wraps_at_the_end() {
        assert_eq!(next_index(2, 3), 0);
    }

    #[test]
    fn prev_moves_backward_inside_the_list() {
        assert_eq!(prev_index(2, 3), 1);
        assert_eq!(prev_index(1, 3), 0);
    }

    #[test]
    fn prev_wraps_at_the_start() {
        assert_eq!(prev_index(0, 3), 2);
    }

    #[test]
    fn single_slide_wraps_to_itself() {
        assert_eq!(next_index(0, 1), 0);
        assert_eq!(prev_index(0, 1), 0);
    }

    #[test]
    fn empty_list_navigation_is_inert() {
        assert_eq!(next_index(0, 0), 0);
        assert_eq!(prev_index(0, 0), 0);
    }

    #[test]
    fn wrap_round_trip_returns_to_start() {
        let len = 4;
        let mut i = 3;
        i = next_index(i, len); // wraps to 0
        i = prev_index(i, len); // back to 3
        assert_eq!(i, 3);
    }

    // =========================================================================
    // Video slot state machine
    // =========================================================================

    #[test]
    fn slot_starts_on_the_thumbnail() {
        let slot = VideoSlot::default();
        assert_eq!(slot, VideoSlot::Thumbnail);
        assert!(!slot.is_playing());
    }

    #[test]
    fn click_moves_thumbnail_to_playing() {
        let mut slot = VideoSlot::default();
        slot.play();
        assert!(slot.is_playing());
    }

    #[test]
    fn playback_end_returns_to_thumbnail() {
        let mut slot = VideoSlot::default();
        slot.play();
        slot.stop();
        assert_eq!(slot, VideoSlot::Thumbnail);
    }

    #[test]
    fn close_returns_to_thumbnail() {
        // Close and playback-end are the same transition
        let mut slot = VideoSlot::default();
        slot.play();
        slot.stop();
        slot.play();
        slot.stop();
        assert_eq!(slot, VideoSlot::Thumbnail);
    }

    #[test]
    fn repeated_events_stay_within_the_two_states() {
        let mut slot = VideoSlot::default();
        slot.stop(); // stop on the poster: still the poster
        assert_eq!(slot, VideoSlot::Thumbnail);

        slot.play();
        slot.play(); // play while playing: still playing
        assert!(slot.is_playing());
    }
}
