use crate::sampler::ChannelKind;
use core::fmt;

/// Errors arising from a configuration that doesn't fit the controller's tables or the MIDI address space.
///
/// These are programmer errors rather than runtime conditions: [`ControllerConfig::validate`][crate::configuration::ControllerConfig::validate]
/// surfaces them once at startup so the firmware can fail fast instead of silently ignoring a bad mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// An input channel index beyond the number of configured channels of that kind.
    ChannelOutOfRange {
        /// The kind of channel addressed.
        kind: ChannelKind,
        /// The offending index.
        index: usize,
    },
    /// An LED index beyond the number of configured LEDs.
    LedOutOfRange {
        /// The offending index.
        index: usize,
    },
    /// More LEDs than the LED table can hold.
    TooManyLeds {
        /// How many were configured.
        count: usize,
        /// How many fit.
        capacity: usize,
    },
    /// A base MIDI channel whose category offsets would run past channel 16.
    MidiChannelOutOfRange {
        /// Zero-based channel index that could not be addressed.
        index: usize,
    },
    /// A controller or note number that would run past 127.
    MessageNumberOutOfRange {
        /// The number that could not be addressed.
        number: usize,
    },
    /// More channels of one kind than the fixed-capacity state tables can hold.
    TooManyChannels {
        /// The kind of channel.
        kind: ChannelKind,
        /// How many were configured.
        count: usize,
        /// How many fit.
        capacity: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelOutOfRange { kind, index } => {
                write!(f, "{kind:?} channel {index} is out of range")
            }
            Self::LedOutOfRange { index } => write!(f, "LED {index} is out of range"),
            Self::TooManyLeds { count, capacity } => {
                write!(f, "{count} LEDs configured but only {capacity} are supported")
            }
            Self::MidiChannelOutOfRange { index } => {
                write!(f, "MIDI channel index {index} is out of range (0-15)")
            }
            Self::MessageNumberOutOfRange { number } => {
                write!(f, "MIDI controller/note number {number} is out of range (0-127)")
            }
            Self::TooManyChannels {
                kind,
                count,
                capacity,
            } => write!(
                f,
                "{count} {kind:?} channels configured but only {capacity} are supported"
            ),
        }
    }
}

impl core::error::Error for Error {}
