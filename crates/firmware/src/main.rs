//! knobkit is [Embassy](https://embassy.dev)-based firmware for a class-compliant USB MIDI controller: a panel of
//! potentiometers, pushbuttons, and a rotary encoder whose movements are sent to the host as Control Change (and,
//! optionally, Note) messages. The host can light the panel's indicator LEDs by sending Control Change messages back.
//! The firmware runs on the [Nucleo-F767ZI development board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html),
//! which is powered by an F7-series STM32 microcontroller.
//!
//! All of the signal conditioning lives in `knobkit_lib`; this crate wires it to the board's peripherals and runs it in
//! a handful of tasks:
//!
//! - the poll task reads potentiometers (two direct, sixteen behind a multiplexer) and buttons once per millisecond,
//! - the encoder task wakes on every phase-line edge,
//! - the feedback task applies host messages to the LEDs,
//! - the display task mirrors LED state onto the pins.

#![no_std]
#![no_main]

mod configuration;
mod controls;
mod feedback;
mod leds;
mod sampler;
mod transport;

use crate::{
    configuration::controller_config,
    leds::{LED_SYNC, LedBankMutex},
    sampler::{EncoderPins, HardwareSampler, Multiplexer},
    transport::{ConfigurationHandler, SharedTransport, UsbTransport, UsbTransportMutex},
};
use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::{
    Config,
    adc::{Adc, AdcChannel},
    bind_interrupts,
    exti::ExtiInput,
    gpio::{Input, Level, Output, Pull, Speed},
    peripherals,
    time::Hertz,
    usb,
};
use embassy_sync::mutex::Mutex;
use embassy_usb::{Builder, class::midi::MidiClass};
use knobkit_lib::{
    controller::{Controller, EncoderDecoder},
    feedback::{FeedbackSink, LedBank},
};
use static_cell::StaticCell;

use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(
    #[doc(hidden)]
    struct Irqs {
        OTG_FS => usb::InterruptHandler<peripherals::USB_OTG_FS>;
    }
);

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Initializing knobkit");

    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        // hse: high-speed external clock
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Bypass,
        });

        // pll: phase-locked loop, crucial for dividing clock
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL216,
            divp: Some(PllPDiv::DIV2), // 8mhz / 4 * 216 / 2 = 216Mhz
            // per section 5.2 of RM0410: the 48MHz clock used for USB OTG FS is derived from the main PLL VCO (PLLQ clock)
            divq: Some(PllQDiv::DIV9), // 8mhz / 4 * 216 / 9 = 48Mhz
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.mux.clk48sel = mux::Clk48sel::PLL1_Q;
    }
    let p = embassy_stm32::init(config);

    let controller_config = controller_config();
    let controller = unwrap!(Controller::new(controller_config));

    // Create the driver, from the HAL.
    static ENDPOINT_OUT_BUFFER: StaticCell<[u8; 256]> = StaticCell::new();
    let mut config = embassy_stm32::usb::Config::default();

    // USB devices which are self-powered (i.e., that can stay powered on if unplugged from the host)
    // need to enable vbus_detection to comply with the USB spec. Per section 6.10 of the Nucleo board
    // manual (UM1974), CN13 (the USB port) cannot power the board; external power is necessary.
    config.vbus_detection = true;

    let driver = usb::Driver::new_fs(
        p.USB_OTG_FS,
        Irqs,
        p.PA12,
        p.PA11,
        ENDPOINT_OUT_BUFFER.init([0; 256]),
        config,
    );

    // per https://pid.codes, FOSS projects can apply to be listed under the vendor ID owned by InterBiometrics
    let vendor_id = 0x1209;
    let product_id = 0x4b4b;

    let mut config = embassy_usb::Config::new(vendor_id, product_id);
    config.manufacturer = Some("Pawpaw Works");
    config.product = Some("knobkit");
    config.self_powered = true;
    config.max_power = 0;

    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();
    static USB_HANDLER: StaticCell<ConfigurationHandler> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUFFER.init([0; 64]),
    );
    builder.handler(USB_HANDLER.init(ConfigurationHandler));

    // one jack each way: controls out to the host, LED feedback in from it
    let class = MidiClass::new(&mut builder, 1, 1, 64);
    let usb = builder.build();
    let (sender, receiver) = class.split();

    unwrap!(spawner.spawn(transport::usb_task(usb)));

    static TRANSPORT: StaticCell<UsbTransportMutex> = StaticCell::new();
    let transport = SharedTransport::new(TRANSPORT.init(Mutex::new(UsbTransport::new(sender))));

    static LEDS: StaticCell<LedBankMutex> = StaticCell::new();
    let led_bank = LedBank::new(controller_config.leds);
    let leds = LEDS.init(Mutex::new(led_bank));

    // green, blue, red: the Nucleo's user LEDs
    let led_pins = [
        Output::new(p.PB0, Level::Low, Speed::Low),
        Output::new(p.PB7, Level::Low, Speed::Low),
        Output::new(p.PB14, Level::Low, Speed::Low),
    ];
    let led_receiver = unwrap!(LED_SYNC.receiver());
    LED_SYNC.sender().send(led_bank);
    unwrap!(spawner.spawn(leds::display(led_pins, led_receiver)));

    let sink = FeedbackSink::from_config(&controller_config);
    unwrap!(spawner.spawn(feedback::feedback_task(
        receiver,
        sink,
        leds,
        LED_SYNC.sender()
    )));

    // per RM0410, PA3, PC0, and PC3 are ADC1 inputs 3, 10, and 13
    let adc = Adc::new(p.ADC1);
    let direct = [p.PA3.degrade_adc(), p.PC0.degrade_adc()];
    let mux = Multiplexer::new(
        [
            Output::new(p.PE9, Level::Low, Speed::Low),
            Output::new(p.PE11, Level::Low, Speed::Low),
            Output::new(p.PF14, Level::Low, Speed::Low),
            Output::new(p.PE13, Level::Low, Speed::Low),
        ],
        p.PC3.degrade_adc(),
    );
    let buttons = [
        // the user button has an external pull-down
        Input::new(p.PC13, Pull::None),
        Input::new(p.PD1, Pull::Up),
    ];
    let sampler = HardwareSampler::new(adc, direct, mux, buttons);
    unwrap!(spawner.spawn(controls::poll_controls(
        controller,
        sampler,
        transport,
        leds,
        LED_SYNC.sender()
    )));

    let mut encoder_pins = EncoderPins::new(
        ExtiInput::new(p.PG2, p.EXTI2, Pull::Up),
        ExtiInput::new(p.PG3, p.EXTI3, Pull::Up),
    );
    let decoder = unwrap!(EncoderDecoder::new(&controller_config, 0, &mut encoder_pins));
    unwrap!(spawner.spawn(controls::decode_encoder(encoder_pins, decoder, transport)));
}
