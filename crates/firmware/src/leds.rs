//! Shared LED state and the task that drives the LED pins from it.
//!
//! Buttons and host feedback both change LEDs, from different tasks. Each writer locks the [`LedBank`], changes it, and
//! publishes the result on [`LED_SYNC`] if anything moved; the [`display`] task is the only one that touches the pins.

use crate::configuration::LEDS;
use embassy_stm32::gpio::{self, Output};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    mutex::Mutex,
    watch::{Receiver, Sender, Watch},
};
use knobkit_lib::{feedback::LedBank, sampler::Level};

pub type LedBankMutex = Mutex<CriticalSectionRawMutex, LedBank>;

const LED_RECEIVER_CNT: usize = 1;
/// Publishes LED levels to the display task.
pub static LED_SYNC: Watch<CriticalSectionRawMutex, LedBank, LED_RECEIVER_CNT> = Watch::new();
pub type LedSender<'a> = Sender<'a, CriticalSectionRawMutex, LedBank, LED_RECEIVER_CNT>;
pub type LedReceiver<'a> = Receiver<'a, CriticalSectionRawMutex, LedBank, LED_RECEIVER_CNT>;

/// Mirrors published LED levels onto the pins.
#[embassy_executor::task]
pub async fn display(mut pins: [Output<'static>; LEDS], mut levels: LedReceiver<'static>) -> ! {
    loop {
        let bank = levels.changed().await;
        for (pin, level) in pins.iter_mut().zip(bank.iter()) {
            pin.set_level(match level {
                Level::Low => gpio::Level::Low,
                Level::High => gpio::Level::High,
            });
        }
    }
}
