//! The USB-MIDI link to the host.

use core::sync::atomic::{AtomicBool, Ordering};
use defmt::{panic, *};
use embassy_stm32::{peripherals, usb};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use embassy_usb::{Handler, UsbDevice, class::midi, driver::EndpointError};
use knobkit_lib::midi::{EventPacket, Transport, TransportError};

pub type UsbDriver = usb::Driver<'static, peripherals::USB_OTG_FS>;
pub type MidiSender = midi::Sender<'static, UsbDriver>;
pub type MidiReceiver = midi::Receiver<'static, UsbDriver>;

/// Set while the host has the device configured.
static CONFIGURED: AtomicBool = AtomicBool::new(false);

/// Tracks whether a host has configured the device, so that sends can be dropped instead of waiting on a dead
/// endpoint.
pub struct ConfigurationHandler;

impl Handler for ConfigurationHandler {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            CONFIGURED.store(false, Ordering::Relaxed);
            info!("USB disabled");
        }
    }

    fn reset(&mut self) {
        CONFIGURED.store(false, Ordering::Relaxed);
    }

    fn configured(&mut self, configured: bool) {
        CONFIGURED.store(configured, Ordering::Relaxed);
        info!("USB configured: {}", configured);
    }
}

#[doc(hidden)]
pub struct Disconnected {}

impl From<EndpointError> for Disconnected {
    fn from(val: EndpointError) -> Self {
        match val {
            EndpointError::BufferOverflow => panic!("Buffer overflow"),
            EndpointError::Disabled => Disconnected {},
        }
    }
}

impl From<Disconnected> for TransportError {
    fn from(_: Disconnected) -> Self {
        TransportError::Unavailable
    }
}

/// Sends packets on the MIDI IN endpoint.
pub struct UsbTransport {
    sender: MidiSender,
}

impl UsbTransport {
    /// Constructs a [`UsbTransport`].
    pub fn new(sender: MidiSender) -> Self {
        Self { sender }
    }
}

impl Transport for UsbTransport {
    async fn send(&mut self, packet: EventPacket) -> Result<(), TransportError> {
        if !CONFIGURED.load(Ordering::Relaxed) {
            return Err(TransportError::Unavailable);
        }
        self.sender
            .write_packet(packet.as_bytes())
            .await
            .map_err(Disconnected::from)?;
        Ok(())
    }
}

pub type UsbTransportMutex = Mutex<CriticalSectionRawMutex, UsbTransport>;

/// A handle to the one [`UsbTransport`], shared by every task that emits events.
#[derive(Clone, Copy)]
pub struct SharedTransport(&'static UsbTransportMutex);

impl SharedTransport {
    /// Constructs a [`SharedTransport`].
    pub fn new(transport: &'static UsbTransportMutex) -> Self {
        Self(transport)
    }
}

impl Transport for SharedTransport {
    async fn send(&mut self, packet: EventPacket) -> Result<(), TransportError> {
        self.0.lock().await.send(packet).await
    }
}

#[embassy_executor::task]
pub async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}
