use crate::sampler::Level;

/// How a button is wired, which determines the level read while it is held down.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WiringMode {
    /// The input is pulled up and the switch shorts it to ground: high while released, low while pressed.
    #[default]
    PullUp,
    /// The input is pulled down and the switch ties it to the supply: low while released, high while pressed. Latching
    /// switches are usually wired this way.
    PullDown,
}

impl WiringMode {
    /// Level read while the button is pressed.
    pub const fn pressed_level(&self) -> Level {
        match self {
            Self::PullUp => Level::Low,
            Self::PullDown => Level::High,
        }
    }

    /// Level read while the button is released.
    pub const fn released_level(&self) -> Level {
        match self {
            Self::PullUp => Level::High,
            Self::PullDown => Level::Low,
        }
    }
}

/// What a button sends when it changes state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonMessage {
    /// Control Change with value 127 on press and 0 on release.
    #[default]
    ControlChange,
    /// NoteOn with velocity 127 on press, NoteOff with velocity 0 on release.
    Note,
}

/// Per-button settings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    /// Electrical wiring of the switch.
    pub wiring: WiringMode,
    /// Message sent on each accepted transition.
    pub message: ButtonMessage,
    /// LED toggled each time the button is pressed, if any.
    pub led: Option<usize>,
}

impl ButtonConfig {
    /// A pulled-up button sending Control Change and driving no LED.
    pub const fn new() -> Self {
        Self {
            wiring: WiringMode::PullUp,
            message: ButtonMessage::ControlChange,
            led: None,
        }
    }

    /// Sets the wiring mode.
    pub const fn wiring(mut self, wiring: WiringMode) -> Self {
        self.wiring = wiring;
        self
    }

    /// Sets the message kind.
    pub const fn message(mut self, message: ButtonMessage) -> Self {
        self.message = message;
        self
    }

    /// Maps an LED to toggle on press.
    pub const fn led(mut self, led: usize) -> Self {
        self.led = Some(led);
        self
    }
}
