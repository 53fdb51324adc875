//! Provides [`EventPacket`], the 32-bit unit of USB-MIDI traffic.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use wmidi::MidiMessage;

/// Virtual cable all traffic is sent on. The device exposes a single jack pair.
pub const CABLE: u8 = 0;

/// USB-MIDI Code Index Numbers for channel voice messages, which happen to match the high nibble of the status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
enum CodeIndex {
    NoteOff = 0x8,
    NoteOn = 0x9,
    PolyKeyPressure = 0xA,
    ControlChange = 0xB,
    ProgramChange = 0xC,
    ChannelPressure = 0xD,
    PitchBend = 0xE,
}

/// A USB-MIDI Event Packet: a header byte (cable number and code index) followed by up to three bytes of MIDI.
///
/// A header of zero means "no message".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventPacket([u8; 4]);

impl EventPacket {
    /// Wraps four raw bytes.
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Frames a channel voice message. Returns `None` for system messages, which this device never sends.
    pub fn from_message(message: &MidiMessage) -> Option<Self> {
        let mut bytes = [0_u8; 4];
        message.copy_to_slice(&mut bytes[1..]).ok()?;
        let code = CodeIndex::from_u8(bytes[1] >> 4)?;
        bytes[0] = (CABLE << 4) | code as u8;
        Some(Self(bytes))
    }

    /// The raw bytes, ready to be written to the endpoint.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Whether this packet carries no message.
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    /// Parses the carried channel voice message, if any.
    pub fn message(&self) -> Option<MidiMessage<'_>> {
        if self.is_empty() {
            return None;
        }
        // only the code index is of interest in the header; the cable number is ignored
        CodeIndex::from_u8(self.0[0] & 0x0f)?;
        MidiMessage::from_bytes(&self.0[1..]).ok()
    }
}

/// Splits a buffer read from the endpoint into packets, skipping empty ones.
///
/// A trailing fragment shorter than four bytes is malformed and dropped.
pub fn packets(data: &[u8]) -> impl Iterator<Item = EventPacket> + '_ {
    data.chunks(4).filter_map(|potential_packet| match potential_packet {
        &[header, status, data1, data2] => {
            Some(EventPacket([header, status, data1, data2])).filter(|packet| !packet.is_empty())
        }
        _ => {
            error!("USB-MIDI Event Packets must always be 32 bits long");
            None
        }
    })
}
