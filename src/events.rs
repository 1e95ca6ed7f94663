use std::time::Duration;

use crate::discovery::Slide;
use crate::sort::{Direction, SortBy};

/// Commands originating from user input.
#[derive(Debug)]
pub enum ControlEvent {
    Next,
    Prev,
    TogglePlay,
    /// Jump to a zero-based position; out-of-range values wrap.
    Goto(i64),
    SetInterval(Duration),
    SetMargin(u8),
    /// Nudge the margin by a signed step, clamped to the valid range.
    AdjustMargin(i8),
    SetSort(SortBy, Direction),
    ToggleAudio,
    SaveSettings,
    Quit,
}

/// Typed interface the presentation surface consumes in place of any
/// direct rendering calls from the playback core.
#[derive(Debug)]
pub enum ViewerEvent {
    ShowSlide {
        slide: Slide,
        index: usize,
        total: usize,
    },
    Playing(bool),
    Margin(u8),
    AudioMuted(bool),
    Notice(String),
}

/// Ask the loader to warm the cache for the given slides.
#[derive(Debug)]
pub struct Prefetch(pub Vec<Slide>);
