//! Provides [`EncoderState`], a quadrature decoder for one detent per pulse.
//!
//! Each transition of phase A is one step. Comparing phase B against the new phase A tells which wave is leading, and
//! therefore the direction, without a full Gray-code table.

use crate::sampler::Level;
use wmidi::U7;

/// Which way an encoder was turned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Phase B differed from phase A after A's transition.
    Clockwise,
    /// Phase B matched phase A after A's transition.
    CounterClockwise,
}

impl Direction {
    /// The Control Change value sent for a step in this direction: 127 clockwise, 1 counter-clockwise.
    pub const fn value(&self) -> U7 {
        match self {
            Self::Clockwise => U7::from_u8_lossy(127),
            Self::CounterClockwise => U7::from_u8_lossy(1),
        }
    }
}

/// Decoder state for one encoder.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EncoderState {
    last_a: Level,
}

impl EncoderState {
    /// Constructs an [`EncoderState`] seeded with the current phase A level.
    pub const fn new(phase_a: Level) -> Self {
        Self { last_a: phase_a }
    }

    /// Decodes one edge notification given the current levels of both phases.
    ///
    /// Notifications where phase A hasn't changed (phase B edges, or spurious ones) are ignored.
    pub fn decode(&mut self, phase_a: Level, phase_b: Level) -> Option<Direction> {
        if phase_a == self.last_a {
            return None;
        }
        self.last_a = phase_a;

        Some(if phase_b != phase_a {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Level::{High, Low};

    #[test]
    fn rising_a_with_b_lagging_is_clockwise() {
        let mut encoder = EncoderState::new(Low);
        assert_eq!(Some(Direction::Clockwise), encoder.decode(High, Low));
        assert_eq!(U7::from_u8_lossy(127), Direction::Clockwise.value());
    }

    #[test]
    fn rising_a_with_b_matching_is_counter_clockwise() {
        let mut encoder = EncoderState::new(Low);
        assert_eq!(Some(Direction::CounterClockwise), encoder.decode(High, High));
        assert_eq!(U7::from_u8_lossy(1), Direction::CounterClockwise.value());
    }

    #[test]
    fn falling_a() {
        let mut encoder = EncoderState::new(High);
        assert_eq!(Some(Direction::Clockwise), encoder.decode(Low, High));

        let mut encoder = EncoderState::new(High);
        assert_eq!(Some(Direction::CounterClockwise), encoder.decode(Low, Low));
    }

    #[test]
    fn unchanged_a_is_ignored() {
        let mut encoder = EncoderState::new(Low);
        assert_eq!(None, encoder.decode(Low, High), "Phase B edge alone is not a step");
        assert_eq!(None, encoder.decode(Low, Low));
    }

    #[test]
    fn one_step_per_a_transition() {
        let mut encoder = EncoderState::new(Low);
        // a full clockwise cycle: A leads B by a quarter period
        let sequence = [(High, Low), (High, High), (Low, High), (Low, Low)];
        let steps: [Option<Direction>; 4] = sequence.map(|(a, b)| encoder.decode(a, b));

        assert_eq!(
            [Some(Direction::Clockwise), None, Some(Direction::Clockwise), None],
            steps,
            "Expected left but got right"
        );
    }
}
