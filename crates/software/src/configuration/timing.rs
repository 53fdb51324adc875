use embassy_time::Duration;

/// Timing and noise constants for the conditioners. Set once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Smallest change in a raw potentiometer reading (out of 0-1023) that counts as movement rather than jitter.
    /// A jump must strictly exceed this value.
    pub var_threshold: u16,
    /// How long a potentiometer is treated as still moving after its last significant jump.
    pub movement_timeout: Duration,
    /// Minimum time between two accepted button transitions.
    pub debounce_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            var_threshold: 6,
            movement_timeout: Duration::from_millis(300),
            debounce_delay: Duration::from_millis(5),
        }
    }
}
