//! State machines that turn raw readings into events worth sending.
//!
//! Each physical control gets its own state struct, updated once per reading. Conditioners never talk to the transport;
//! they return `Some(event)` when something happened and `None` otherwise, leaving addressing and delivery to the caller.

mod button;
pub use button::*;

mod encoder;
pub use encoder::*;

mod potentiometer;
pub use potentiometer::*;
