//! The poll cycle and the encoder edge handler.
//!
//! [`Controller`] owns the conditioning state of every potentiometer and button and runs them in a fixed order:
//! potentiometers first, then buttons. Encoders are decoded separately by an [`EncoderDecoder`] each, because their
//! edges arrive asynchronously and must not wait for a poll cycle.

use crate::{
    Error,
    conditioning::{ButtonEdge, ButtonState, Direction, EncoderState, PotentiometerState},
    configuration::{ButtonMessage, Category, ControllerConfig, MAX_BUTTONS, MAX_POTENTIOMETERS},
    feedback::LedBank,
    midi::{Emitter, Event, EventKind, Transport},
    sampler::{ChannelKind, InputChannel, Sampler},
};
use embassy_time::Instant;
use tinyvec::ArrayVec;

/// Velocity/value sent for a press.
const ACTIVE: u8 = 127;
/// Velocity/value sent for a release.
const INACTIVE: u8 = 0;

/// Conditioning state for every polled control, plus the configuration it was built from.
#[derive(Debug, Clone)]
pub struct Controller {
    config: ControllerConfig,
    emitter: Emitter,
    potentiometers: ArrayVec<[PotentiometerState; MAX_POTENTIOMETERS]>,
    buttons: ArrayVec<[ButtonState; MAX_BUTTONS]>,
}

impl Controller {
    /// Validates the configuration and builds fresh state for every control.
    pub fn new(config: ControllerConfig) -> Result<Self, Error> {
        config.validate()?;

        let mut potentiometers = ArrayVec::new();
        potentiometers.resize(config.potentiometers(), PotentiometerState::new());
        let buttons = config
            .buttons
            .iter()
            .map(|button| ButtonState::new(button.wiring))
            .collect();

        info!(
            "Controller ready: {} potentiometers, {} buttons, {} encoders, {} LEDs",
            config.potentiometers(),
            config.buttons.len(),
            config.encoders,
            config.leds
        );

        Ok(Self {
            emitter: Emitter::new(config.addressing),
            config,
            potentiometers,
            buttons,
        })
    }

    /// The configuration this controller was built from.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Runs one full poll cycle: potentiometers, then buttons. Returns the number of events emitted.
    pub async fn poll<S: Sampler, T: Transport>(
        &mut self,
        sampler: &mut S,
        transport: &mut T,
        leds: &mut LedBank,
        now: Instant,
    ) -> Result<usize, Error> {
        let sent = self.scan_potentiometers(sampler, transport, now).await?;
        Ok(sent + self.scan_buttons(sampler, transport, leds, now).await?)
    }

    /// Reads and conditions every potentiometer, sending a Control Change for each one that moved. Returns the number
    /// of events emitted.
    pub async fn scan_potentiometers<S: Sampler, T: Transport>(
        &mut self,
        sampler: &mut S,
        transport: &mut T,
        now: Instant,
    ) -> Result<usize, Error> {
        let mut sent = 0;
        for (index, state) in self.potentiometers.iter_mut().enumerate() {
            let channel = self.config.potentiometer_channel(index)?;
            let raw = sampler.read_analog(channel);

            if let Some(value) = state.update(raw, now, &self.config.timing) {
                debug!("Potentiometer {} moved to {}", index, u8::from(value));
                let event = Event::control_change(Category::Potentiometer, index, value);
                self.emitter.emit(transport, event).await?;
                sent += 1;
            }
        }
        Ok(sent)
    }

    /// Reads and debounces every button, sending one event per accepted transition and toggling the mapped LED on each
    /// press. Returns the number of events emitted.
    pub async fn scan_buttons<S: Sampler, T: Transport>(
        &mut self,
        sampler: &mut S,
        transport: &mut T,
        leds: &mut LedBank,
        now: Instant,
    ) -> Result<usize, Error> {
        let mut sent = 0;
        let debounce_delay = self.config.timing.debounce_delay;

        for (index, (state, button)) in self
            .buttons
            .iter_mut()
            .zip(self.config.buttons.iter())
            .enumerate()
        {
            let raw = sampler.read_digital(InputChannel::new(ChannelKind::Button, index));
            let Some(edge) = state.update(raw, now, debounce_delay) else {
                continue;
            };
            debug!("Button {} {}", index, edge);

            let kind = match (button.message, edge) {
                (ButtonMessage::ControlChange, ButtonEdge::Pressed) => EventKind::ControlChange(ACTIVE),
                (ButtonMessage::ControlChange, ButtonEdge::Released) => EventKind::ControlChange(INACTIVE),
                (ButtonMessage::Note, ButtonEdge::Pressed) => EventKind::NoteOn(ACTIVE),
                (ButtonMessage::Note, ButtonEdge::Released) => EventKind::NoteOff(INACTIVE),
            };
            let event = Event {
                category: Category::Button,
                index,
                kind,
            };
            self.emitter.emit(transport, event).await?;
            sent += 1;

            if let (ButtonEdge::Pressed, Some(led)) = (edge, button.led) {
                let level = leds.toggle(led)?;
                debug!("Button {} toggled LED {} to {}", index, led, level);
            }
        }
        Ok(sent)
    }
}

/// Decodes edge notifications for one encoder and sends a Control Change per step.
///
/// Each decoder must be driven from a single context: it holds the only copy of its encoder's state.
#[derive(Debug, Clone)]
pub struct EncoderDecoder {
    index: usize,
    state: EncoderState,
    emitter: Emitter,
}

impl EncoderDecoder {
    /// Constructs a decoder for the `index`th encoder, seeding its state from the current phase A level.
    pub fn new<S: Sampler>(config: &ControllerConfig, index: usize, sampler: &mut S) -> Result<Self, Error> {
        if index >= config.encoders {
            return Err(Error::ChannelOutOfRange {
                kind: ChannelKind::EncoderPhase,
                index,
            });
        }
        let phase_a = sampler.read_digital(InputChannel::phase_a(index));

        Ok(Self {
            index,
            state: EncoderState::new(phase_a),
            emitter: Emitter::new(config.addressing),
        })
    }

    /// Handles an edge on either phase line. Returns the direction of the step, if the edge was one.
    pub async fn on_edge<S: Sampler, T: Transport>(
        &mut self,
        sampler: &mut S,
        transport: &mut T,
    ) -> Result<Option<Direction>, Error> {
        let phase_a = sampler.read_digital(InputChannel::phase_a(self.index));
        let phase_b = sampler.read_digital(InputChannel::phase_b(self.index));

        let Some(direction) = self.state.decode(phase_a, phase_b) else {
            return Ok(None);
        };
        debug!("Encoder {} stepped {}", self.index, direction);

        let event = Event::control_change(Category::Encoder, self.index, direction.value());
        self.emitter.emit(transport, event).await?;
        Ok(Some(direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        configuration::{ButtonConfig, WiringMode},
        midi::EventPacket,
        sampler::Level,
        testing::{FakeSampler, RecordingTransport},
    };
    use embassy_futures::block_on;
    use tinyvec::array_vec;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn config() -> ControllerConfig {
        ControllerConfig {
            direct_potentiometers: 2,
            muxed_potentiometers: 2,
            buttons: array_vec!([ButtonConfig; MAX_BUTTONS] =>
                ButtonConfig::new().led(1),
                ButtonConfig::new().wiring(WiringMode::PullDown).message(ButtonMessage::Note)
            ),
            ..Default::default()
        }
    }

    /// A sampler with every control at rest: potentiometers at zero, buttons released.
    fn resting() -> FakeSampler {
        FakeSampler {
            buttons: [Level::High, Level::Low, Level::Low, Level::Low],
            ..Default::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ControllerConfig {
            leds: 1,
            ..config()
        };
        assert_eq!(
            Some(Error::LedOutOfRange { index: 1 }),
            Controller::new(config).err()
        );
    }

    #[test]
    fn resting_controls_are_silent() {
        let mut controller = Controller::new(config()).unwrap();
        let mut sampler = resting();
        let mut transport = RecordingTransport::default();
        let mut leds = LedBank::new(3);

        for ms in 0..1_000 {
            let sent = block_on(controller.poll(&mut sampler, &mut transport, &mut leds, at(ms)));
            assert_eq!(Ok(0), sent);
        }
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn potentiometers_on_base_plus_two() {
        let mut controller = Controller::new(config()).unwrap();
        let mut sampler = resting();
        let mut transport = RecordingTransport::default();
        let mut leds = LedBank::new(3);

        block_on(controller.poll(&mut sampler, &mut transport, &mut leds, at(1_000))).unwrap();
        sampler.potentiometers[1] = 1023;
        sampler.muxed[1] = 800;
        let sent = block_on(controller.poll(&mut sampler, &mut transport, &mut leds, at(1_001)));

        assert_eq!(Ok(2), sent);
        assert_eq!(
            &[
                // direct potentiometer 1 is CC 2
                EventPacket::from_bytes([0x0b, 0xb2, 2, 127]),
                // muxed potentiometer 1 is logical potentiometer 3, CC 4
                EventPacket::from_bytes([0x0b, 0xb2, 4, 99]),
            ],
            transport.sent(),
            "Expected left but got right"
        );
    }

    #[test]
    fn potentiometer_jump_then_rest_sends_once() {
        let mut controller = Controller::new(config()).unwrap();
        let mut sampler = resting();
        let mut transport = RecordingTransport::default();
        let mut leds = LedBank::new(3);

        block_on(controller.poll(&mut sampler, &mut transport, &mut leds, at(1_000))).unwrap();
        sampler.potentiometers[0] = 600;
        for ms in 1_001..2_000 {
            block_on(controller.poll(&mut sampler, &mut transport, &mut leds, at(ms))).unwrap();
        }

        assert_eq!(&[EventPacket::from_bytes([0x0b, 0xb2, 1, 74])], transport.sent());
    }

    #[test]
    fn button_press_and_release() {
        let mut controller = Controller::new(config()).unwrap();
        let mut sampler = resting();
        let mut transport = RecordingTransport::default();
        let mut leds = LedBank::new(3);

        sampler.buttons[0] = Level::Low;
        block_on(controller.scan_buttons(&mut sampler, &mut transport, &mut leds, at(100))).unwrap();
        sampler.buttons[0] = Level::High;
        block_on(controller.scan_buttons(&mut sampler, &mut transport, &mut leds, at(200))).unwrap();

        assert_eq!(
            &[
                EventPacket::from_bytes([0x0b, 0xb1, 1, 127]),
                EventPacket::from_bytes([0x0b, 0xb1, 1, 0]),
            ],
            transport.sent(),
            "Expected press then release on base channel + 1"
        );
    }

    #[test]
    fn button_bounce_sends_once() {
        let mut controller = Controller::new(config()).unwrap();
        let mut sampler = resting();
        let mut transport = RecordingTransport::default();
        let mut leds = LedBank::new(3);

        for (ms, level) in [(100, Level::Low), (101, Level::High), (102, Level::Low), (104, Level::High), (106, Level::Low)] {
            sampler.buttons[0] = level;
            block_on(controller.scan_buttons(&mut sampler, &mut transport, &mut leds, at(ms))).unwrap();
        }

        assert_eq!(&[EventPacket::from_bytes([0x0b, 0xb1, 1, 127])], transport.sent());
    }

    #[test]
    fn button_press_toggles_mapped_led() {
        let mut controller = Controller::new(config()).unwrap();
        let mut sampler = resting();
        let mut transport = RecordingTransport::default();
        let mut leds = LedBank::new(3);

        let mut press = |ms: u64, level: Level, leds: &mut LedBank| {
            sampler.buttons[0] = level;
            block_on(controller.scan_buttons(&mut sampler, &mut transport, leds, at(ms))).unwrap();
        };

        press(100, Level::Low, &mut leds);
        assert_eq!(Ok(Level::High), leds.level(1));
        press(200, Level::High, &mut leds);
        assert_eq!(Ok(Level::High), leds.level(1), "Release should not toggle");
        press(300, Level::Low, &mut leds);
        assert_eq!(Ok(Level::Low), leds.level(1));
    }

    #[test]
    fn note_button_sends_note_on_and_off() {
        let mut controller = Controller::new(config()).unwrap();
        let mut sampler = resting();
        let mut transport = RecordingTransport::default();
        let mut leds = LedBank::new(3);

        // pulled down, so high is pressed
        sampler.buttons[1] = Level::High;
        block_on(controller.scan_buttons(&mut sampler, &mut transport, &mut leds, at(100))).unwrap();
        sampler.buttons[1] = Level::Low;
        block_on(controller.scan_buttons(&mut sampler, &mut transport, &mut leds, at(200))).unwrap();

        assert_eq!(
            &[
                EventPacket::from_bytes([0x09, 0x91, 37, 127]),
                EventPacket::from_bytes([0x08, 0x81, 37, 0]),
            ],
            transport.sent(),
            "Expected left but got right"
        );
        assert_eq!(LedBank::new(3), leds, "Unmapped button should leave LEDs alone");
    }

    #[test]
    fn without_host_controls_still_condition_locally() {
        let mut controller = Controller::new(config()).unwrap();
        let mut sampler = resting();
        let mut transport = RecordingTransport::unavailable();
        let mut leds = LedBank::new(3);

        sampler.buttons[0] = Level::Low;
        let sent = block_on(controller.poll(&mut sampler, &mut transport, &mut leds, at(100)));

        assert_eq!(Ok(1), sent);
        assert!(transport.sent().is_empty());
        assert_eq!(Ok(Level::High), leds.level(1));
    }

    #[test]
    fn encoder_steps() {
        let config = config();
        let mut sampler = resting();
        let mut transport = RecordingTransport::default();
        let mut decoder = EncoderDecoder::new(&config, 0, &mut sampler).unwrap();

        // A rises while B is still low
        sampler.phases = [Level::High, Level::Low];
        assert_eq!(
            Ok(Some(Direction::Clockwise)),
            block_on(decoder.on_edge(&mut sampler, &mut transport))
        );
        // B follows; A unchanged
        sampler.phases = [Level::High, Level::High];
        assert_eq!(Ok(None), block_on(decoder.on_edge(&mut sampler, &mut transport)));
        // A falls with B already low
        sampler.phases = [Level::Low, Level::Low];
        assert_eq!(
            Ok(Some(Direction::CounterClockwise)),
            block_on(decoder.on_edge(&mut sampler, &mut transport))
        );

        assert_eq!(
            &[
                EventPacket::from_bytes([0x0b, 0xb0, 1, 127]),
                EventPacket::from_bytes([0x0b, 0xb0, 1, 1]),
            ],
            transport.sent(),
            "Expected left but got right"
        );
    }

    #[test]
    fn encoder_index_out_of_range() {
        let config = config();
        let mut sampler = resting();
        assert_eq!(
            Some(Error::ChannelOutOfRange {
                kind: ChannelKind::EncoderPhase,
                index: 1
            }),
            EncoderDecoder::new(&config, 1, &mut sampler).err()
        );
    }
}
