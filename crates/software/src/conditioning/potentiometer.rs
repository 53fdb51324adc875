//! Provides [`PotentiometerState`], a jitter filter with a movement timeout.
//!
//! Raw potentiometer readings wander by a few counts even when nobody is touching the knob, and forwarding every change
//! floods the host. Instead, a reading that jumps by more than the noise threshold marks the control as moving for a
//! bounded window. While moving, every change of the 7-bit value is reported; once the window lapses, small wobbles are
//! ignored until the next real jump.

use crate::{configuration::Timing, sampler::ANALOG_MAX};
use embassy_time::Instant;
use wmidi::U7;

/// Whether a potentiometer is considered to be in motion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Motion {
    /// No significant jump within the movement timeout; changes are treated as noise.
    #[default]
    Idle,
    /// Within the movement timeout of the last significant jump; changes are reported.
    Settling,
}

/// Conditioning state for one potentiometer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PotentiometerState {
    /// Raw reading as of the last reported value.
    last_raw: u16,
    /// Last reported 7-bit value.
    last_value: U7,
    /// When the reading last jumped by more than the threshold.
    reference: Instant,
    motion: Motion,
}

impl Default for PotentiometerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PotentiometerState {
    /// Constructs a [`PotentiometerState`] resting at zero.
    pub const fn new() -> Self {
        Self {
            last_raw: 0,
            last_value: U7::from_u8_lossy(0),
            reference: Instant::from_ticks(0),
            motion: Motion::Idle,
        }
    }

    /// Feeds a raw reading taken at `now`. Returns the new 7-bit value if it should be sent.
    ///
    /// A value is only ever returned while the control is [`Motion::Settling`], and never twice in a row.
    pub fn update(&mut self, raw: u16, now: Instant, timing: &Timing) -> Option<U7> {
        let raw = raw.min(ANALOG_MAX);

        if raw.abs_diff(self.last_raw) > timing.var_threshold {
            self.reference = now;
        }

        self.motion = if now.saturating_duration_since(self.reference) < timing.movement_timeout {
            Motion::Settling
        } else {
            Motion::Idle
        };

        let value = scale(raw);
        if self.motion == Motion::Settling && value != self.last_value {
            self.last_value = value;
            self.last_raw = raw;
            Some(value)
        } else {
            None
        }
    }

    /// Whether the control is currently considered to be in motion.
    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// The last value reported.
    pub fn last_value(&self) -> U7 {
        self.last_value
    }
}

/// Maps a raw reading onto the MIDI value range, rounding down.
pub fn scale(raw: u16) -> U7 {
    let raw = u32::from(raw.min(ANALOG_MAX));
    // at most 127, so the cast cannot truncate
    U7::from_u8_lossy((raw * 127 / u32::from(ANALOG_MAX)) as u8)
}
