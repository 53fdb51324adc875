use crate::Error;
use wmidi::{Channel, U7};

/// The family of controls an event came from. Each category is addressed on its own MIDI channel, which is why controller
/// numbers may overlap across categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Category {
    /// Rotary encoders; sent on the base channel.
    Encoder,
    /// Pushbuttons; sent one channel above the base.
    Button,
    /// Potentiometers, direct and multiplexed alike; sent two channels above the base.
    Potentiometer,
}

impl Category {
    /// Offset from the base MIDI channel on which this category is sent.
    pub const fn channel_offset(&self) -> u8 {
        match self {
            Self::Encoder => 0,
            Self::Button => 1,
            Self::Potentiometer => 2,
        }
    }
}

/// Where on the MIDI address space the controls land.
///
/// The host software is expected to learn these addresses; nothing here assigns meaning to a controller number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Addressing {
    /// Base channel; see [`Category`] for the per-category offsets.
    pub midi_channel: Channel,
    /// Controller number of the first control in each category. Control `i` uses `midi_cc + i`.
    pub midi_cc: u8,
    /// Note number of the first button when buttons are configured to send notes. Button `i` uses `note_base + i`.
    pub note_base: u8,
}

impl Default for Addressing {
    fn default() -> Self {
        Self {
            midi_channel: Channel::Ch1,
            midi_cc: 1,
            // C2
            note_base: 36,
        }
    }
}

impl Addressing {
    /// Returns the MIDI channel a category is sent on.
    pub fn channel(&self, category: Category) -> Result<Channel, Error> {
        let index = self.midi_channel.index() + category.channel_offset();
        Channel::from_index(index).map_err(|_| Error::MidiChannelOutOfRange {
            index: usize::from(index),
        })
    }

    /// Returns the controller number of the `index`th control of a category.
    pub fn controller(&self, index: usize) -> Result<U7, Error> {
        offset(self.midi_cc, index)
    }

    /// Returns the note number of the `index`th button.
    pub fn note(&self, index: usize) -> Result<U7, Error> {
        offset(self.note_base, index)
    }
}

fn offset(base: u8, index: usize) -> Result<U7, Error> {
    let number = usize::from(base) + index;
    match u8::try_from(number) {
        Ok(n) if n <= 127 => Ok(U7::from_u8_lossy(n)),
        _ => Err(Error::MessageNumberOutOfRange { number }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_separated_by_channel() {
        let addressing = Addressing {
            midi_channel: Channel::Ch3,
            ..Default::default()
        };
        assert_eq!(Ok(Channel::Ch3), addressing.channel(Category::Encoder));
        assert_eq!(Ok(Channel::Ch4), addressing.channel(Category::Button));
        assert_eq!(Ok(Channel::Ch5), addressing.channel(Category::Potentiometer));
    }

    #[test]
    fn channel_offset_past_sixteen() {
        let addressing = Addressing {
            midi_channel: Channel::Ch15,
            ..Default::default()
        };
        assert_eq!(Ok(Channel::Ch16), addressing.channel(Category::Button));
        assert_eq!(
            Err(Error::MidiChannelOutOfRange { index: 16 }),
            addressing.channel(Category::Potentiometer),
            "Expected left but got right"
        );
    }

    #[test]
    fn controller_numbers() {
        let addressing = Addressing {
            midi_cc: 120,
            ..Default::default()
        };
        assert_eq!(Ok(U7::from_u8_lossy(120)), addressing.controller(0));
        assert_eq!(Ok(U7::from_u8_lossy(127)), addressing.controller(7));
        assert_eq!(
            Err(Error::MessageNumberOutOfRange { number: 128 }),
            addressing.controller(8),
            "Expected left but got right"
        );
    }

    #[test]
    fn note_numbers() {
        let addressing = Addressing::default();
        assert_eq!(Ok(U7::from_u8_lossy(36)), addressing.note(0));
        assert_eq!(Ok(U7::from_u8_lossy(39)), addressing.note(3));
    }
}
