//! Test doubles for the peripheral and transport traits.

use crate::{
    midi::{EventPacket, Transport, TransportError},
    sampler::{ChannelKind, InputChannel, Level, Sampler},
};
use tinyvec::ArrayVec;

/// A [`Transport`] that records what it was given.
#[derive(Default)]
pub struct RecordingTransport {
    sent: ArrayVec<[EventPacket; 64]>,
    unavailable: bool,
}

impl RecordingTransport {
    /// A transport whose host has gone away.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> &[EventPacket] {
        &self.sent
    }
}

impl Transport for RecordingTransport {
    async fn send(&mut self, packet: EventPacket) -> Result<(), TransportError> {
        if self.unavailable {
            return Err(TransportError::Unavailable);
        }
        self.sent.push(packet);
        Ok(())
    }
}

/// A [`Sampler`] whose readings are set by the test.
#[derive(Default)]
pub struct FakeSampler {
    pub potentiometers: [u16; 4],
    pub muxed: [u16; 4],
    pub buttons: [Level; 4],
    pub phases: [Level; 2],
}

impl Sampler for FakeSampler {
    fn read_analog(&mut self, channel: InputChannel) -> u16 {
        match channel.kind {
            ChannelKind::Potentiometer => self.potentiometers[channel.index],
            ChannelKind::MuxedPotentiometer => self.muxed[channel.index],
            _ => panic!("{:?} is not analog", channel),
        }
    }

    fn read_digital(&mut self, channel: InputChannel) -> Level {
        match channel.kind {
            ChannelKind::Button => self.buttons[channel.index],
            ChannelKind::EncoderPhase => self.phases[channel.index],
            _ => panic!("{:?} is not digital", channel),
        }
    }
}
