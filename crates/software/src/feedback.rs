//! Reflecting host state onto indicator LEDs.
//!
//! The host reports a few toggles back as Control Change messages. [`FeedbackSink`] looks each one up in the
//! [`FeedbackConfig`] table and sets the matching LED in a [`LedBank`]. Nothing is acknowledged; a lost message just
//! leaves the LED where it was until the next one arrives.

use crate::{
    Error,
    configuration::{ControllerConfig, FeedbackConfig, MAX_LEDS},
    midi::packets,
    sampler::Level,
};
use tinyvec::ArrayVec;
use wmidi::{Channel, MidiMessage};

/// The level of every indicator LED.
///
/// Written by the feedback sink and by buttons mapped to LEDs; read by whatever drives the GPIO.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LedBank {
    levels: ArrayVec<[Level; MAX_LEDS]>,
}

#[cfg(feature = "defmt")]
impl defmt::Format for LedBank {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "LedBank {{ levels: [");
        for (i, level) in self.levels.iter().enumerate() {
            if i != 0 {
                defmt::write!(fmt, ", ");
            }
            defmt::write!(fmt, "{}", level);
        }
        defmt::write!(fmt, "] }}");
    }
}

impl LedBank {
    /// Constructs a bank of `count` dark LEDs. Counts past [`MAX_LEDS`] are truncated.
    pub fn new(count: usize) -> Self {
        let mut levels = ArrayVec::new();
        levels.resize(count.min(MAX_LEDS), Level::Low);
        Self { levels }
    }

    /// Number of LEDs.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the bank has no LEDs at all.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Returns the level of one LED.
    pub fn level(&self, index: usize) -> Result<Level, Error> {
        self.levels
            .get(index)
            .copied()
            .ok_or(Error::LedOutOfRange { index })
    }

    /// Sets one LED. Returns whether its level changed.
    pub fn set(&mut self, index: usize, level: Level) -> Result<bool, Error> {
        let slot = self
            .levels
            .get_mut(index)
            .ok_or(Error::LedOutOfRange { index })?;
        let changed = *slot != level;
        *slot = level;
        Ok(changed)
    }

    /// Flips one LED. Returns its new level.
    pub fn toggle(&mut self, index: usize) -> Result<Level, Error> {
        let level = self.level(index)?.toggled();
        self.set(index, level)?;
        Ok(level)
    }

    /// Flips every LED that differs between `before` and `after`. Returns whether any LED was flipped.
    ///
    /// Lets toggles made on a snapshot be replayed onto a bank that may have changed in the meantime.
    pub fn replay_toggles(&mut self, before: &LedBank, after: &LedBank) -> Result<bool, Error> {
        let mut flipped = false;
        for (index, (old, new)) in before.iter().zip(after.iter()).enumerate() {
            if old != new {
                self.toggle(index)?;
                flipped = true;
            }
        }
        Ok(flipped)
    }

    /// Returns an [`Iterator`] over the levels in LED order.
    pub fn iter(&self) -> impl Iterator<Item = Level> + '_ {
        self.levels.iter().copied()
    }
}

/// An LED level change caused by an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedChange {
    /// Which LED.
    pub led: usize,
    /// Its new level.
    pub level: Level,
}

/// Applies inbound Control Change messages to the LEDs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackSink {
    channel: Channel,
    config: FeedbackConfig,
}

impl FeedbackSink {
    /// Constructs a [`FeedbackSink`]. A feedback table without its own channel listens on `base_channel`.
    pub fn new(config: FeedbackConfig, base_channel: Channel) -> Self {
        Self {
            channel: config.channel_or(base_channel),
            config,
        }
    }

    /// Constructs the [`FeedbackSink`] described by a controller configuration.
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.feedback, config.addressing.midi_channel)
    }

    /// Applies one message. Returns the change made, or `None` if the message was ignored or the LED was already at
    /// the requested level.
    pub fn apply(&self, message: &MidiMessage, leds: &mut LedBank) -> Result<Option<LedChange>, Error> {
        let &MidiMessage::ControlChange(channel, function, value) = message else {
            trace!("Ignoring non-Control Change feedback message");
            return Ok(None);
        };
        if channel != self.channel {
            trace!("Ignoring feedback on channel {}", channel.number());
            return Ok(None);
        }
        let Some(rule) = self.config.rule(function.0) else {
            debug!("No LED mapped to CC {}", u8::from(function));
            return Ok(None);
        };

        let level = rule.polarity.level(value);
        if leds.set(rule.led, level)? {
            info!(
                "CC {} value {} set LED {} to {}",
                u8::from(function),
                u8::from(value),
                rule.led,
                level
            );
            Ok(Some(LedChange {
                led: rule.led,
                level,
            }))
        } else {
            Ok(None)
        }
    }

    /// Applies every message in a buffer of USB-MIDI Event Packets. Returns how many LEDs changed.
    pub fn receive(&self, data: &[u8], leds: &mut LedBank) -> Result<usize, Error> {
        let mut changes = 0;
        for packet in packets(data) {
            if let Some(message) = packet.message() {
                if self.apply(&message, leds)?.is_some() {
                    changes += 1;
                }
            }
        }
        Ok(changes)
    }
}
