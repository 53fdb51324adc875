//! This crate contains architecture-agnostic logic for knobkit, a USB MIDI controller which turns potentiometers, a rotary
//! encoder, and pushbuttons into [MIDI](https://midi.org/midi-1-0) Control Change and Note messages, and which reflects a
//! handful of Control Change messages received from the host onto indicator LEDs.
//!
//! The interesting part is the signal conditioning: raw potentiometer readings jitter, switches bounce, and encoders emit
//! two offset square waves. The [`conditioning`] module turns all of that into a clean, rate-limited stream of events, and
//! the [`midi`] module addresses those events and hands them to a [`Transport`][midi::Transport]. Peripheral access is
//! abstracted behind the [`Sampler`][sampler::Sampler] trait so everything here can be exercised on the host.

#![deny(missing_docs)]
#![no_std]

mod fmt;

pub mod configuration;
pub mod conditioning;
pub mod controller;
pub mod feedback;
pub mod midi;
pub mod sampler;

mod error;
pub use error::*;

#[cfg(test)]
mod testing;
