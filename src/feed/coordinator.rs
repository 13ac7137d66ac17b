use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Second tap within this window (inclusive) of the first is a double tap.
pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);
pub const HEART_DURATION: Duration = Duration::from_millis(600);
/// Minimum time between two accepted scrolls.
pub const SCROLL_SETTLE: Duration = Duration::from_millis(500);
pub const CART_NOTICE_DURATION: Duration = Duration::from_millis(3000);

/// A flag that is visible until a deadline and then clears on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transient {
    until: Option<Instant>,
}

impl Transient {
    /// Shows the flag for `duration` from `now`. Re-triggering extends it.
    pub fn trigger(&mut self, now: Instant, duration: Duration) {
        self.until = Some(now + duration);
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    pub fn clear(&mut self) {
        self.until = None;
    }
}

/// Single/double tap classification on one media surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct TapTracker {
    last_tap: Option<Instant>,
}

impl TapTracker {
    /// Returns `true` when this tap completes a double tap. A double tap resets
    /// the tracker so a third tap starts over.
    pub fn register(&mut self, now: Instant) -> bool {
        let is_double = self
            .last_tap
            .is_some_and(|last| now.saturating_duration_since(last) <= DOUBLE_TAP_WINDOW);
        self.last_tap = if is_double { None } else { Some(now) };
        is_double
    }

    pub fn reset(&mut self) {
        self.last_tap = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Comments,
    Likes,
    CartPanel,
}

/// Open/closed state of the feed's overlays. Opening one closes the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overlays {
    pub comments: bool,
    pub likes: bool,
    pub cart_panel: bool,
}

impl Overlays {
    pub fn open(&mut self, overlay: Overlay) {
        *self = Overlays::default();
        match overlay {
            Overlay::Comments => self.comments = true,
            Overlay::Likes => self.likes = true,
            Overlay::CartPanel => self.cart_panel = true,
        }
    }

    pub fn close(&mut self, overlay: Overlay) {
        match overlay {
            Overlay::Comments => self.comments = false,
            Overlay::Likes => self.likes = false,
            Overlay::CartPanel => self.cart_panel = false,
        }
    }

    pub fn is_open(&self, overlay: Overlay) -> bool {
        match overlay {
            Overlay::Comments => self.comments,
            Overlay::Likes => self.likes,
            Overlay::CartPanel => self.cart_panel,
        }
    }

    pub fn any_open(&self) -> bool {
        self.comments || self.likes || self.cart_panel
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    Moved { index: usize },
    /// A previous scroll has not settled yet; the request was dropped.
    Settling,
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    Intercepted(ScrollOutcome),
    /// An overlay is open and scrolls itself.
    PassThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    TogglePlayback { playing: bool },
    /// `like` is set when the reel was not liked yet; a double tap never unlikes.
    DoubleTap { like: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyIntent {
    ToggleLike,
    OpenComments,
    TogglePlayback,
    CloseOverlays,
}

impl KeyIntent {
    /// Maps a key name as reported by the UI (`"l"`, `" "`, `"Escape"`, ...).
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "l" | "L" => Some(KeyIntent::ToggleLike),
            "c" | "C" => Some(KeyIntent::OpenComments),
            " " | "Space" => Some(KeyIntent::TogglePlayback),
            "Escape" => Some(KeyIntent::CloseOverlays),
            _ => None,
        }
    }
}

/// Session-level feed state. Owns no persistent data.
#[derive(Debug, Clone)]
pub struct FeedCoordinator {
    len: usize,
    active_index: usize,
    settle_until: Option<Instant>,
    playing: bool,
    taps: TapTracker,
    heart: Transient,
    overlays: Overlays,
}

impl FeedCoordinator {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            active_index: 0,
            settle_until: None,
            playing: true,
            taps: TapTracker::default(),
            heart: Transient::default(),
            overlays: Overlays::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Feed reloaded with `len` reels; the active index is clamped.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.active_index = self.active_index.min(len.saturating_sub(1));
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn overlays(&self) -> Overlays {
        self.overlays
    }

    pub fn overlays_mut(&mut self) -> &mut Overlays {
        &mut self.overlays
    }

    pub fn scroll_to(&mut self, index: usize, now: Instant) -> ScrollOutcome {
        if self.settle_until.is_some_and(|until| now < until) {
            debug!(index, "Scroll dropped, previous scroll still settling");
            return ScrollOutcome::Settling;
        }
        if index >= self.len {
            return ScrollOutcome::OutOfRange;
        }

        self.settle_until = Some(now + SCROLL_SETTLE);
        if index != self.active_index {
            self.active_index = index;
            // entering a reel starts it from a clean gesture state
            self.playing = true;
            self.taps.reset();
            self.heart.clear();
        }
        ScrollOutcome::Moved { index }
    }

    pub fn scroll_up(&mut self, now: Instant) -> ScrollOutcome {
        match self.active_index.checked_sub(1) {
            Some(index) => self.scroll_to(index, now),
            None => ScrollOutcome::OutOfRange,
        }
    }

    pub fn scroll_down(&mut self, now: Instant) -> ScrollOutcome {
        self.scroll_to(self.active_index + 1, now)
    }

    /// Wheel input on the feed. Positive `delta_y` scrolls down.
    pub fn on_wheel(&mut self, delta_y: f64, now: Instant) -> WheelOutcome {
        if self.overlays.any_open() {
            return WheelOutcome::PassThrough;
        }
        let outcome = if delta_y > 0.0 {
            self.scroll_down(now)
        } else {
            self.scroll_up(now)
        };
        WheelOutcome::Intercepted(outcome)
    }

    /// Tap on the active reel's media. `liked` is the reel's current like state.
    pub fn on_tap(&mut self, now: Instant, liked: bool) -> TapOutcome {
        if self.taps.register(now) {
            self.heart.trigger(now, HEART_DURATION);
            return TapOutcome::DoubleTap { like: !liked };
        }
        self.playing = !self.playing;
        TapOutcome::TogglePlayback { playing: self.playing }
    }

    /// Applies the local part of a key press and returns what the caller must
    /// still do remotely.
    pub fn on_key(&mut self, key: &str) -> Option<KeyIntent> {
        let intent = KeyIntent::from_key(key)?;
        match intent {
            KeyIntent::TogglePlayback => self.playing = !self.playing,
            KeyIntent::OpenComments => self.overlays.open(Overlay::Comments),
            KeyIntent::CloseOverlays => {
                self.overlays.close(Overlay::Comments);
                self.overlays.close(Overlay::Likes);
            }
            KeyIntent::ToggleLike => {}
        }
        Some(intent)
    }

    /// Scroll arrows are shown only while no overlay is open.
    pub fn shows_scroll_controls(&self) -> bool {
        !self.overlays.any_open()
    }

    pub fn heart_visible(&self, now: Instant) -> bool {
        self.heart.is_visible(now)
    }
}
