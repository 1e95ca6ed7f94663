//! Playback state machine: current position, wraparound navigation, and
//! the autoplay deadline.
//!
//! The controller owns all playback state explicitly so several instances
//! can coexist and unit tests need no live presentation surface. It never
//! sleeps itself; the player task awaits `deadline()` and feeds the elapsed
//! instant back through `tick()`, which makes one live timer a structural
//! property rather than a bookkeeping one.

use std::time::Duration;

use tokio::time::Instant;

use crate::discovery::Slide;

pub struct PlaybackController {
    slides: Vec<Slide>,
    current: usize,
    playing: bool,
    interval: Duration,
    deadline: Option<Instant>,
}

impl PlaybackController {
    pub fn new(slides: Vec<Slide>, interval: Duration) -> Self {
        Self {
            slides,
            current: 0,
            playing: false,
            interval: interval.max(Duration::from_secs(1)),
            deadline: None,
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.slides.get(self.current)
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Normalize `index` into `[0, N)` (negative input wraps from the end)
    /// and make it current. `None` on an empty list.
    pub fn set_slide(&mut self, index: i64) -> Option<&Slide> {
        if self.slides.is_empty() {
            return None;
        }
        let n = self.slides.len() as i64;
        self.current = index.rem_euclid(n) as usize;
        self.slides.get(self.current)
    }

    /// Manual step forward. Manual navigation always drops out of autoplay.
    pub fn next(&mut self) -> Option<&Slide> {
        self.pause();
        self.set_slide(self.current as i64 + 1)
    }

    /// Manual step backward. Manual navigation always drops out of autoplay.
    pub fn prev(&mut self) -> Option<&Slide> {
        self.pause();
        self.set_slide(self.current as i64 - 1)
    }

    /// Manual jump. Manual navigation always drops out of autoplay.
    pub fn goto(&mut self, index: i64) -> Option<&Slide> {
        self.pause();
        self.set_slide(index)
    }

    /// Start autoplay. No-op while already playing or with nothing to show.
    pub fn play(&mut self, now: Instant) {
        if self.playing || self.slides.is_empty() {
            return;
        }
        self.playing = true;
        self.deadline = Some(now + self.interval);
    }

    /// Stop autoplay and drop the pending deadline. Idempotent.
    pub fn pause(&mut self) {
        self.playing = false;
        self.deadline = None;
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.playing {
            self.pause();
        } else {
            self.play(now);
        }
    }

    /// Change the autoplay period. While playing the deadline is re-armed at
    /// the new period, replacing the old one outright.
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval.max(Duration::from_secs(1));
        if self.playing {
            self.deadline = Some(now + self.interval);
        }
    }

    /// When the next auto-advance is due. `None` while paused.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Auto-advance on timer expiry: step forward, stay playing, re-arm.
    pub fn tick(&mut self, now: Instant) -> Option<&Slide> {
        if !self.playing {
            return None;
        }
        self.deadline = Some(now + self.interval);
        self.set_slide(self.current as i64 + 1)
    }

    /// The immediate neighbors worth prefetching around the current slide.
    pub fn neighbors(&self) -> Vec<Slide> {
        let n = self.slides.len();
        if n < 2 {
            return Vec::new();
        }
        let next = (self.current + 1) % n;
        let prev = (self.current + n - 1) % n;
        let mut out = vec![self.slides[next].clone()];
        if prev != next {
            out.push(self.slides[prev].clone());
        }
        out
    }

    /// Swap in a new ordering. The current index is renormalized against the
    /// new length so it can never dangle; an empty list also stops autoplay.
    pub fn replace_slides(&mut self, slides: Vec<Slide>) {
        self.slides = slides;
        if self.slides.is_empty() {
            self.current = 0;
            self.pause();
        } else {
            self.current %= self.slides.len();
        }
    }
}
