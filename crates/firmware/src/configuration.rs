//! Board-specific settings: how many of each control the panel has and how often they are polled.
//!
//! The pin assignments themselves live in `main`, where the peripherals are taken; the counts here must match them.

use embassy_time::Duration;
use knobkit_lib::configuration::{ButtonConfig, ControllerConfig, MAX_BUTTONS, WiringMode};
use tinyvec::array_vec;

/// Potentiometers wired straight to ADC pins.
pub const DIRECT_POTENTIOMETERS: usize = 2;
/// Potentiometers behind the 16-channel analog multiplexer.
pub const MUXED_POTENTIOMETERS: usize = 16;
/// Pushbuttons.
pub const BUTTONS: usize = 2;
/// Rotary encoders.
pub const ENCODERS: usize = 1;
/// Indicator LEDs.
pub const LEDS: usize = 3;

/// How often the potentiometers and buttons are read.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Builds the controller configuration for this board.
///
/// Button 0 is the Nucleo's blue user button, which has an external pull-down; it toggles the blue LED (LED 1). Button 1
/// is a panel switch to ground read through the internal pull-up.
pub fn controller_config() -> ControllerConfig {
    ControllerConfig {
        direct_potentiometers: DIRECT_POTENTIOMETERS,
        muxed_potentiometers: MUXED_POTENTIOMETERS,
        buttons: array_vec!([ButtonConfig; MAX_BUTTONS] =>
            ButtonConfig::new().wiring(WiringMode::PullDown).led(1),
            ButtonConfig::new()
        ),
        encoders: ENCODERS,
        leds: LEDS,
        ..Default::default()
    }
}
