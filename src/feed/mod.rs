//! Feed interaction: which reel is active, how taps, wheel and keys are read,
//! and which overlay is open.
//!
//! [`FeedCoordinator`] is a synchronous state machine driven with explicit
//! [`Instant`](tokio::time::Instant)s. [`FeedController`] binds it to the
//! engagement and cart clients.

mod controller;
mod coordinator;

pub use controller::{FeedController, TapReaction};
pub use coordinator::{
    FeedCoordinator, KeyIntent, Overlay, Overlays, ScrollOutcome, TapOutcome, TapTracker, Transient, WheelOutcome,
    CART_NOTICE_DURATION, DOUBLE_TAP_WINDOW, HEART_DURATION, SCROLL_SETTLE,
};
