//! The contract between the controller and whatever reads the physical controls.
//!
//! A [`Sampler`] produces one raw reading per [`InputChannel`] on request. How a reading is obtained (addressing a
//! multiplexer, waiting for it to settle, scaling the ADC) is the implementor's business; the controller only ever sees
//! a 10-bit analog value or a digital [`Level`].

/// Largest raw analog reading; samplers scale their ADC to this range.
pub const ANALOG_MAX: u16 = 1023;

/// A digital logic level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic low. For an LED, this means dark.
    #[default]
    Low,
    /// Logic high. For an LED, this means lit.
    High,
}

impl Level {
    /// Returns the opposite level.
    pub fn toggled(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

/// The kind of physical control behind an [`InputChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelKind {
    /// A potentiometer wired straight to an analog pin.
    Potentiometer,
    /// A potentiometer sharing an analog line with others behind a multiplexer.
    MuxedPotentiometer,
    /// A pushbutton or switch on a digital pin.
    Button,
    /// One of the two phase lines of a rotary encoder.
    EncoderPhase,
}

/// Identifies one physical input.
///
/// The `index` is local to the `kind`: the third multiplexed potentiometer is `MuxedPotentiometer` index 2 no matter how
/// many direct potentiometers precede it. Encoder phases are numbered two per encoder, phase A first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputChannel {
    /// What is being read.
    pub kind: ChannelKind,
    /// Which one, among controls of the same kind.
    pub index: usize,
}

impl InputChannel {
    /// Constructs an [`InputChannel`].
    pub const fn new(kind: ChannelKind, index: usize) -> Self {
        Self { kind, index }
    }

    /// The leading phase line of the given encoder.
    pub const fn phase_a(encoder: usize) -> Self {
        Self::new(ChannelKind::EncoderPhase, encoder * 2)
    }

    /// The trailing phase line of the given encoder.
    pub const fn phase_b(encoder: usize) -> Self {
        Self::new(ChannelKind::EncoderPhase, encoder * 2 + 1)
    }
}

/// Reads raw values from physical controls.
///
/// Hardware read failures are not modeled; an implementation returns whatever the peripheral reports.
pub trait Sampler {
    /// Returns a reading in `0..=ANALOG_MAX` for a (direct or multiplexed) potentiometer.
    fn read_analog(&mut self, channel: InputChannel) -> u16;

    /// Returns the current level of a button or encoder phase line.
    fn read_digital(&mut self, channel: InputChannel) -> Level;
}
