//! Tasks that turn physical controls into MIDI.

use crate::{
    configuration::POLL_INTERVAL,
    leds::{LedBankMutex, LedSender},
    sampler::{EncoderPins, HardwareSampler},
    transport::SharedTransport,
};
use defmt::*;
use embassy_time::{Instant, Ticker};
use knobkit_lib::controller::{Controller, EncoderDecoder};

/// Polls the potentiometers and buttons once per [`POLL_INTERVAL`].
///
/// Buttons toggle LEDs on a snapshot of the bank; the shared bank is only locked afterward, to replay those toggles,
/// so a slow host never holds up the feedback task.
#[embassy_executor::task]
pub async fn poll_controls(
    mut controller: Controller,
    mut sampler: HardwareSampler,
    mut transport: SharedTransport,
    leds: &'static LedBankMutex,
    led_sync: LedSender<'static>,
) -> ! {
    let mut ticker = Ticker::every(POLL_INTERVAL);
    loop {
        ticker.next().await;

        let before = *leds.lock().await;
        let mut snapshot = before;
        if let Err(e) = controller
            .poll(&mut sampler, &mut transport, &mut snapshot, Instant::now())
            .await
        {
            error!("Poll cycle failed: {}", e);
        }
        if snapshot == before {
            continue;
        }

        let mut bank = leds.lock().await;
        match bank.replay_toggles(&before, &snapshot) {
            Ok(true) => led_sync.send(*bank),
            Ok(false) => {}
            Err(e) => error!("LED update failed: {}", e),
        }
    }
}

/// Decodes the rotary encoder as soon as either phase line moves.
#[embassy_executor::task]
pub async fn decode_encoder(
    mut pins: EncoderPins,
    mut decoder: EncoderDecoder,
    mut transport: SharedTransport,
) -> ! {
    loop {
        pins.wait_for_edge().await;
        if let Err(e) = decoder.on_edge(&mut pins, &mut transport).await {
            error!("Encoder step failed: {}", e);
        }
    }
}
