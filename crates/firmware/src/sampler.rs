//! Peripheral access behind the [`Sampler`] trait.

use crate::configuration::{BUTTONS, DIRECT_POTENTIOMETERS};
use defmt::{panic, *};
use embassy_stm32::{
    adc::{Adc, AnyAdcChannel},
    exti::ExtiInput,
    gpio::{Input, Output},
    peripherals::ADC1,
};
use embassy_time::{Duration, block_for};
use knobkit_lib::sampler::{ChannelKind, InputChannel, Level, Sampler};

/// The F7's ADC converts to 12 bits; the controller works in 10.
const RESOLUTION_SHIFT: u16 = 2;

/// How long the multiplexer output takes to follow a change of its select lines.
const MUX_SETTLE: Duration = Duration::from_micros(5);

/// A 16-channel analog multiplexer (CD74HC4067 or similar) feeding one ADC pin.
pub struct Multiplexer {
    select: [Output<'static>; 4],
    common: AnyAdcChannel<ADC1>,
}

impl Multiplexer {
    /// Constructs a [`Multiplexer`]. `select` is ordered least significant bit first.
    pub fn new(select: [Output<'static>; 4], common: AnyAdcChannel<ADC1>) -> Self {
        Self { select, common }
    }

    /// Drives the select lines for `index` and waits for the output to settle.
    fn route(&mut self, index: usize) {
        for (bit, line) in self.select.iter_mut().enumerate() {
            if index & (1 << bit) == 0 {
                line.set_low();
            } else {
                line.set_high();
            }
        }
        block_for(MUX_SETTLE);
    }
}

/// Reads the polled controls: direct and multiplexed potentiometers and the pushbuttons.
pub struct HardwareSampler {
    adc: Adc<'static, ADC1>,
    direct: [AnyAdcChannel<ADC1>; DIRECT_POTENTIOMETERS],
    mux: Multiplexer,
    buttons: [Input<'static>; BUTTONS],
}

impl HardwareSampler {
    /// Constructs a [`HardwareSampler`].
    pub fn new(
        adc: Adc<'static, ADC1>,
        direct: [AnyAdcChannel<ADC1>; DIRECT_POTENTIOMETERS],
        mux: Multiplexer,
        buttons: [Input<'static>; BUTTONS],
    ) -> Self {
        Self {
            adc,
            direct,
            mux,
            buttons,
        }
    }
}

impl Sampler for HardwareSampler {
    fn read_analog(&mut self, channel: InputChannel) -> u16 {
        let reading = match channel.kind {
            ChannelKind::Potentiometer => self.adc.blocking_read(&mut self.direct[channel.index]),
            ChannelKind::MuxedPotentiometer => {
                self.mux.route(channel.index);
                self.adc.blocking_read(&mut self.mux.common)
            }
            kind => panic!("{} has no analog reading", kind),
        };
        reading >> RESOLUTION_SHIFT
    }

    fn read_digital(&mut self, channel: InputChannel) -> Level {
        match channel.kind {
            ChannelKind::Button => Level::from(self.buttons[channel.index].is_high()),
            kind => panic!("{} is not polled", kind),
        }
    }
}

/// The two phase lines of the panel's rotary encoder.
pub struct EncoderPins {
    a: ExtiInput<'static>,
    b: ExtiInput<'static>,
}

impl EncoderPins {
    /// Constructs an [`EncoderPins`].
    pub fn new(a: ExtiInput<'static>, b: ExtiInput<'static>) -> Self {
        Self { a, b }
    }

    /// Waits for either phase line to change.
    pub async fn wait_for_edge(&mut self) {
        embassy_futures::select::select(self.a.wait_for_any_edge(), self.b.wait_for_any_edge()).await;
    }
}

impl Sampler for EncoderPins {
    fn read_analog(&mut self, channel: InputChannel) -> u16 {
        panic!("Encoder pins have no analog reading for {}", channel)
    }

    fn read_digital(&mut self, channel: InputChannel) -> Level {
        if channel == InputChannel::phase_a(0) {
            Level::from(self.a.is_high())
        } else if channel == InputChannel::phase_b(0) {
            Level::from(self.b.is_high())
        } else {
            warn!("No encoder pin for {}", channel);
            Level::Low
        }
    }
}
