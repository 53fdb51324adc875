//! Settings fixed at startup: channel counts, timing constants, MIDI addressing, and the LED lookup tables.
//!
//! Nothing in here changes at runtime. The tables index into one another (buttons and feedback rules name LEDs), so a
//! [`ControllerConfig`] must pass [`ControllerConfig::validate`] before a controller is built from it.

mod addressing;
pub use addressing::*;

mod button;
pub use button::*;

mod feedback;
pub use feedback::*;

mod timing;
pub use timing::*;

use crate::{
    Error,
    sampler::{ChannelKind, InputChannel},
};
use tinyvec::{ArrayVec, array_vec};
use wmidi::Channel;

/// Capacity of the potentiometer state table (direct and multiplexed combined).
pub const MAX_POTENTIOMETERS: usize = 32;
/// Capacity of the button state table.
pub const MAX_BUTTONS: usize = 16;
/// Maximum number of rotary encoders.
pub const MAX_ENCODERS: usize = 4;
/// Capacity of the LED state table.
pub const MAX_LEDS: usize = 8;
/// Capacity of the feedback lookup table.
pub const MAX_FEEDBACK_RULES: usize = 8;

/// Everything the controller needs to know about the hardware it runs on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    /// Noise threshold and time windows.
    pub timing: Timing,
    /// Base channel, controller, and note numbers.
    pub addressing: Addressing,
    /// Potentiometers wired to their own analog pins. These take the lowest logical indices.
    pub direct_potentiometers: usize,
    /// Potentiometers behind the analog multiplexer, numbered after the direct ones.
    pub muxed_potentiometers: usize,
    /// One entry per button, in logical order.
    pub buttons: ArrayVec<[ButtonConfig; MAX_BUTTONS]>,
    /// Number of rotary encoders.
    pub encoders: usize,
    /// Number of indicator LEDs.
    pub leds: usize,
    /// Inbound Control Change to LED mapping.
    pub feedback: FeedbackConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            timing: Timing::default(),
            addressing: Addressing::default(),
            direct_potentiometers: 2,
            muxed_potentiometers: 16,
            buttons: array_vec!([ButtonConfig; MAX_BUTTONS] => ButtonConfig::new().led(1)),
            encoders: 1,
            leds: 3,
            feedback: FeedbackConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Total number of potentiometers, direct and multiplexed.
    pub fn potentiometers(&self) -> usize {
        self.direct_potentiometers + self.muxed_potentiometers
    }

    /// The channel LED feedback is listened for on.
    pub fn feedback_channel(&self) -> Channel {
        self.feedback.channel_or(self.addressing.midi_channel)
    }

    /// Translates a logical potentiometer index into the channel the sampler reads.
    pub fn potentiometer_channel(&self, index: usize) -> Result<InputChannel, Error> {
        if index < self.direct_potentiometers {
            Ok(InputChannel::new(ChannelKind::Potentiometer, index))
        } else if index < self.potentiometers() {
            Ok(InputChannel::new(
                ChannelKind::MuxedPotentiometer,
                index - self.direct_potentiometers,
            ))
        } else {
            Err(Error::ChannelOutOfRange {
                kind: ChannelKind::Potentiometer,
                index,
            })
        }
    }

    /// Checks that every table fits its capacity, every LED reference points at a configured LED, and every control can
    /// be addressed on the MIDI wire.
    pub fn validate(&self) -> Result<(), Error> {
        let capacities = [
            (ChannelKind::Potentiometer, self.potentiometers(), MAX_POTENTIOMETERS),
            (ChannelKind::EncoderPhase, self.encoders, MAX_ENCODERS),
        ];
        for (kind, count, capacity) in capacities {
            if count > capacity {
                return Err(Error::TooManyChannels {
                    kind,
                    count,
                    capacity,
                });
            }
        }
        if self.leds > MAX_LEDS {
            return Err(Error::TooManyLeds {
                count: self.leds,
                capacity: MAX_LEDS,
            });
        }

        let led_references = self
            .buttons
            .iter()
            .filter_map(|button| button.led)
            .chain(self.feedback.rules.iter().map(|rule| rule.led));
        for led in led_references {
            if led >= self.leds {
                return Err(Error::LedOutOfRange { index: led });
            }
        }

        // the potentiometer channel carries the largest offset, so it is the one that can run off the end
        self.addressing.channel(Category::Potentiometer)?;

        let widest = self
            .potentiometers()
            .max(self.buttons.len())
            .max(self.encoders);
        if let Some(last) = widest.checked_sub(1) {
            self.addressing.controller(last)?;
        }
        let uses_notes = self
            .buttons
            .iter()
            .any(|button| button.message == ButtonMessage::Note);
        if uses_notes {
            self.addressing.note(self.buttons.len() - 1)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(Ok(()), ControllerConfig::default().validate());
    }

    #[test]
    fn potentiometer_channels() {
        let config = ControllerConfig::default();
        assert_eq!(
            Ok(InputChannel::new(ChannelKind::Potentiometer, 1)),
            config.potentiometer_channel(1),
            "Expected left but got right"
        );
        assert_eq!(
            Ok(InputChannel::new(ChannelKind::MuxedPotentiometer, 0)),
            config.potentiometer_channel(2),
            "Expected left but got right"
        );
        assert_eq!(
            Ok(InputChannel::new(ChannelKind::MuxedPotentiometer, 15)),
            config.potentiometer_channel(17),
            "Expected left but got right"
        );
        assert_eq!(
            Err(Error::ChannelOutOfRange {
                kind: ChannelKind::Potentiometer,
                index: 18
            }),
            config.potentiometer_channel(18),
            "Expected left but got right"
        );
    }

    #[test]
    fn button_led_beyond_led_count() {
        // two LEDs and a button wired to a third, as left over from a larger panel
        let config = ControllerConfig {
            leds: 2,
            buttons: array_vec!([ButtonConfig; MAX_BUTTONS] => ButtonConfig::new().led(3)),
            feedback: FeedbackConfig {
                rules: ArrayVec::new(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(Err(Error::LedOutOfRange { index: 3 }), config.validate());
    }

    #[test]
    fn feedback_led_beyond_led_count() {
        let config = ControllerConfig {
            leds: 2,
            buttons: ArrayVec::new(),
            ..Default::default()
        };
        assert_eq!(Err(Error::LedOutOfRange { index: 2 }), config.validate());
    }

    #[test]
    fn too_many_leds() {
        let config = ControllerConfig {
            leds: MAX_LEDS + 1,
            ..Default::default()
        };
        assert_eq!(
            Err(Error::TooManyLeds {
                count: MAX_LEDS + 1,
                capacity: MAX_LEDS
            }),
            config.validate(),
            "Expected left but got right"
        );
    }

    #[test]
    fn feedback_channel_follows_base_channel() {
        let config = ControllerConfig {
            addressing: Addressing {
                midi_channel: Channel::Ch5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(Ok(()), config.validate());
        assert_eq!(
            config.addressing.midi_channel,
            config.feedback_channel(),
            "Expected left but got right"
        );
    }

    #[test]
    fn too_many_potentiometers() {
        let config = ControllerConfig {
            muxed_potentiometers: MAX_POTENTIOMETERS,
            ..Default::default()
        };
        assert_eq!(
            Err(Error::TooManyChannels {
                kind: ChannelKind::Potentiometer,
                count: MAX_POTENTIOMETERS + 2,
                capacity: MAX_POTENTIOMETERS
            }),
            config.validate(),
            "Expected left but got right"
        );
    }

    #[test]
    fn base_channel_too_high() {
        let config = ControllerConfig {
            addressing: Addressing {
                midi_channel: Channel::Ch15,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            Err(Error::MidiChannelOutOfRange { index: 16 }),
            config.validate()
        );
    }

    #[test]
    fn controller_numbers_run_past_127() {
        let config = ControllerConfig {
            addressing: Addressing {
                midi_cc: 115,
                ..Default::default()
            },
            ..Default::default()
        };
        // 18 potentiometers starting at CC 115 end at 132
        assert_eq!(
            Err(Error::MessageNumberOutOfRange { number: 132 }),
            config.validate()
        );
    }

    #[test]
    fn note_numbers_checked_only_when_used() {
        let mut config = ControllerConfig {
            addressing: Addressing {
                note_base: 127,
                ..Default::default()
            },
            buttons: array_vec!([ButtonConfig; MAX_BUTTONS] => ButtonConfig::new(), ButtonConfig::new()),
            ..Default::default()
        };
        assert_eq!(Ok(()), config.validate());

        config.buttons[1] = ButtonConfig::new().message(ButtonMessage::Note);
        assert_eq!(
            Err(Error::MessageNumberOutOfRange { number: 128 }),
            config.validate()
        );
    }
}
