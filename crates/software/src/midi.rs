//! Addressing conditioned events and handing them to the transport.
//!
//! Conditioners report what happened to the `index`th control of a [`Category`]; the [`Emitter`] turns that into a
//! concrete [`MidiMessage`] on the right channel and controller/note number, frames it as an [`EventPacket`], and sends
//! it straight away. There is no queue: each event is flushed before the next control is read.

mod packet;
pub use packet::*;

use crate::{
    Error,
    configuration::{Addressing, Category},
};
use wmidi::{ControlFunction, MidiMessage, Note, U7};

/// What happened, in terms of MIDI but before addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    /// A Control Change carrying this value.
    ControlChange(u8),
    /// A NoteOn with this velocity.
    NoteOn(u8),
    /// A NoteOff with this velocity.
    NoteOff(u8),
}

/// A conditioned event from one control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Event {
    /// The family of control.
    pub category: Category,
    /// Index of the control within its category.
    pub index: usize,
    /// The message to send.
    pub kind: EventKind,
}

impl Event {
    /// A Control Change from the `index`th control of `category`.
    pub fn control_change(category: Category, index: usize, value: U7) -> Self {
        Self {
            category,
            index,
            kind: EventKind::ControlChange(u8::from(value)),
        }
    }
}

impl Addressing {
    /// Builds the concrete message for an event.
    pub fn message(&self, event: Event) -> Result<MidiMessage<'static>, Error> {
        let channel = self.channel(event.category)?;
        let message = match event.kind {
            EventKind::ControlChange(value) => MidiMessage::ControlChange(
                channel,
                ControlFunction(self.controller(event.index)?),
                U7::from_u8_lossy(value),
            ),
            EventKind::NoteOn(velocity) => MidiMessage::NoteOn(
                channel,
                Note::from(self.note(event.index)?),
                U7::from_u8_lossy(velocity),
            ),
            EventKind::NoteOff(velocity) => MidiMessage::NoteOff(
                channel,
                Note::from(self.note(event.index)?),
                U7::from_u8_lossy(velocity),
            ),
        };
        Ok(message)
    }
}

/// Reasons a packet could not be handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// No host is listening (cable unplugged, device not configured, endpoint disabled).
    Unavailable,
}

/// Outbound half of the MIDI link.
///
/// Sending is best effort: the controller never retries, so an implementation should return promptly rather than wait
/// for a host that isn't there.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Sends one packet.
    async fn send(&mut self, packet: EventPacket) -> Result<(), TransportError>;
}

/// Addresses events and sends them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emitter {
    addressing: Addressing,
}

impl Emitter {
    /// Constructs an [`Emitter`].
    pub fn new(addressing: Addressing) -> Self {
        Self { addressing }
    }

    /// Sends an event.
    ///
    /// An unavailable transport is not an error: the event is dropped and the controller carries on locally. Only an
    /// event that can't be addressed (a configuration mistake) is reported.
    pub async fn emit<T: Transport>(&self, transport: &mut T, event: Event) -> Result<(), Error> {
        let message = self.addressing.message(event)?;
        let Some(packet) = EventPacket::from_message(&message) else {
            return Ok(());
        };

        match transport.send(packet).await {
            Ok(()) => debug!("Sent {}", packet),
            Err(TransportError::Unavailable) => {
                trace!("Transport unavailable, dropped {}", packet)
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use embassy_futures::block_on;
    use wmidi::Channel;

    #[test]
    fn categories_use_their_own_channel() {
        let addressing = Addressing::default();
        let value = U7::from_u8_lossy(42);

        let encoder = addressing.message(Event::control_change(Category::Encoder, 0, value));
        let button = addressing.message(Event::control_change(Category::Button, 0, value));
        let pot = addressing.message(Event::control_change(Category::Potentiometer, 0, value));

        let cc = ControlFunction(U7::from_u8_lossy(1));
        assert_eq!(Ok(MidiMessage::ControlChange(Channel::Ch1, cc, value)), encoder);
        assert_eq!(Ok(MidiMessage::ControlChange(Channel::Ch2, cc, value)), button);
        assert_eq!(Ok(MidiMessage::ControlChange(Channel::Ch3, cc, value)), pot);
    }

    #[test]
    fn notes_use_note_base() {
        let addressing = Addressing::default();
        let event = Event {
            category: Category::Button,
            index: 2,
            kind: EventKind::NoteOn(127),
        };
        assert_eq!(
            Ok(MidiMessage::NoteOn(Channel::Ch2, Note::D2, U7::from_u8_lossy(127))),
            addressing.message(event),
            "Expected left but got right"
        );
    }

    #[test]
    fn emit_sends_one_packet() {
        let emitter = Emitter::new(Addressing::default());
        let mut transport = RecordingTransport::default();

        let event = Event::control_change(Category::Potentiometer, 3, U7::from_u8_lossy(99));
        assert_eq!(Ok(()), block_on(emitter.emit(&mut transport, event)));
        assert_eq!(&[EventPacket::from_bytes([0x0b, 0xb2, 4, 99])], transport.sent());
    }

    #[test]
    fn emit_without_host_is_a_no_op() {
        let emitter = Emitter::new(Addressing::default());
        let mut transport = RecordingTransport::unavailable();

        let event = Event::control_change(Category::Encoder, 0, U7::from_u8_lossy(127));
        assert_eq!(Ok(()), block_on(emitter.emit(&mut transport, event)));
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn emit_reports_unaddressable_event() {
        let emitter = Emitter::new(Addressing::default());
        let mut transport = RecordingTransport::default();

        let event = Event::control_change(Category::Button, 200, U7::from_u8_lossy(127));
        assert_eq!(
            Err(Error::MessageNumberOutOfRange { number: 201 }),
            block_on(emitter.emit(&mut transport, event))
        );
        assert!(transport.sent().is_empty());
    }
}
