//! Provides [`ButtonState`], a time-gated debouncer.
//!
//! Mechanical contacts bounce for a few milliseconds. Once a transition has been accepted, any further change is ignored
//! until the debounce delay has passed, so each physical actuation yields exactly one edge.

use crate::{configuration::WiringMode, sampler::Level};
use embassy_time::{Duration, Instant};

/// An accepted button transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEdge {
    /// The button went down.
    Pressed,
    /// The button came back up.
    Released,
}

/// Debounce state for one button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonState {
    wiring: WiringMode,
    /// Last accepted level.
    stable: Level,
    /// When the last transition was accepted.
    last_change: Instant,
}

impl Default for ButtonState {
    fn default() -> Self {
        Self::new(WiringMode::default())
    }
}

impl ButtonState {
    /// Constructs a [`ButtonState`] for a released button.
    pub const fn new(wiring: WiringMode) -> Self {
        Self {
            wiring,
            stable: wiring.released_level(),
            last_change: Instant::from_ticks(0),
        }
    }

    /// Feeds a raw level read at `now`. Returns the edge if a transition is accepted.
    pub fn update(&mut self, raw: Level, now: Instant, debounce_delay: Duration) -> Option<ButtonEdge> {
        if now.saturating_duration_since(self.last_change) <= debounce_delay || raw == self.stable {
            return None;
        }

        self.stable = raw;
        self.last_change = now;

        Some(if raw == self.wiring.pressed_level() {
            ButtonEdge::Pressed
        } else {
            ButtonEdge::Released
        })
    }

    /// Whether the last accepted level is the pressed one.
    pub fn is_pressed(&self) -> bool {
        self.stable == self.wiring.pressed_level()
    }
}
