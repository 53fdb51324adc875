use super::MAX_FEEDBACK_RULES;
use crate::sampler::Level;
use tinyvec::{ArrayVec, array_vec};
use wmidi::{Channel, ControlValue, U7};

/// How a Control Change value maps onto an LED.
///
/// Host software doesn't agree with itself about which value means "on", so the polarity is recorded per LED.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Value 0 turns the LED off; anything else turns it on.
    #[default]
    Direct,
    /// Value 0 turns the LED on; anything else turns it off.
    Inverted,
}

impl Polarity {
    /// Returns the LED level a Control Change value calls for.
    pub fn level(&self, value: ControlValue) -> Level {
        let zero = u8::from(value) == 0;
        match (self, zero) {
            (Self::Direct, true) | (Self::Inverted, false) => Level::Low,
            (Self::Direct, false) | (Self::Inverted, true) => Level::High,
        }
    }
}

/// One entry of the feedback table: a controller number that drives an LED.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FeedbackRule {
    /// Controller number listened for.
    pub control: U7,
    /// LED driven.
    pub led: usize,
    /// How the value is interpreted.
    pub polarity: Polarity,
}

impl FeedbackRule {
    /// Constructs a [`FeedbackRule`].
    pub const fn new(control: u8, led: usize, polarity: Polarity) -> Self {
        Self {
            control: U7::from_u8_lossy(control),
            led,
            polarity,
        }
    }
}

/// Which inbound Control Change messages drive which LEDs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackConfig {
    /// Only messages on this channel are considered. `None` listens on the base channel of the
    /// [`Addressing`][super::Addressing] it is paired with.
    pub channel: Option<Channel>,
    /// Lookup table keyed by controller number.
    pub rules: ArrayVec<[FeedbackRule; MAX_FEEDBACK_RULES]>,
}

impl Default for FeedbackConfig {
    /// CC 80 lights LED 0 on a nonzero value; CC 81 and CC 82 light LEDs 1 and 2 on a zero value.
    fn default() -> Self {
        Self {
            channel: None,
            rules: array_vec!([FeedbackRule; MAX_FEEDBACK_RULES] =>
                FeedbackRule::new(80, 0, Polarity::Direct),
                FeedbackRule::new(81, 1, Polarity::Inverted),
                FeedbackRule::new(82, 2, Polarity::Inverted)
            ),
        }
    }
}

impl FeedbackConfig {
    /// Returns the channel listened on, given the base channel.
    pub fn channel_or(&self, base: Channel) -> Channel {
        self.channel.unwrap_or(base)
    }

    /// Returns the rule for a controller number, if any.
    pub fn rule(&self, control: U7) -> Option<&FeedbackRule> {
        self.rules.iter().find(|rule| rule.control == control)
    }
}
