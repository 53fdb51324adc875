//! Receiving LED feedback from the host.

use crate::{
    leds::{LedBankMutex, LedSender},
    transport::{Disconnected, MidiReceiver},
};
use defmt::*;
use knobkit_lib::feedback::FeedbackSink;

#[embassy_executor::task]
pub async fn feedback_task(
    mut receiver: MidiReceiver,
    sink: FeedbackSink,
    leds: &'static LedBankMutex,
    led_sync: LedSender<'static>,
) -> ! {
    loop {
        receiver.wait_connection().await;
        info!("USB connected");
        let _ = process_feedback(&mut receiver, &sink, leds, &led_sync).await;
        info!("USB disconnected");
    }
}

/// Applies every packet read from the MIDI OUT endpoint to the LEDs, until the endpoint goes away.
async fn process_feedback(
    receiver: &mut MidiReceiver,
    sink: &FeedbackSink,
    leds: &'static LedBankMutex,
    led_sync: &LedSender<'static>,
) -> Result<(), Disconnected> {
    let mut buf = [0; 64];
    loop {
        let n = receiver.read_packet(&mut buf).await?;

        let mut bank = leds.lock().await;
        let before = *bank;
        // a bad rule stops the rest of this buffer, but what was already applied stays applied
        if let Err(e) = sink.receive(&buf[..n], &mut bank) {
            error!("Feedback failed: {}", e);
        }
        if *bank != before {
            led_sync.send(*bank);
        }
    }
}
