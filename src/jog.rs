//! Jog wheel direction detection
//!
//! The jog dial does not report signed deltas. It reports an 8-bit
//! position counter (0-255) that wraps, so direction has to be inferred
//! from two consecutive samples.

/// Jog position before the first dial sample has been seen
pub const JOG_UNINITIALIZED: i32 = -1;

/// Half a revolution of the 8-bit counter
const HALF_TURN: i32 = 128;

/// Direction of a single jog step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    None,
    Right,
    Left,
}

impl Direction {
    /// Key used in the `jog` config map for this direction
    pub fn config_key(&self) -> Option<&'static str> {
        match self {
            Direction::None => None,
            Direction::Right => Some("1"),
            Direction::Left => Some("-1"),
        }
    }
}

/// Classify the step between two dial samples.
///
/// Assumes less than half a revolution between samples; faster spins are
/// read as the opposite direction. A delta of exactly ±128 is ambiguous
/// and yields [`Direction::None`].
pub fn classify(previous: i32, current: i32) -> Direction {
    if previous == JOG_UNINITIALIZED {
        return Direction::None;
    }

    // Wrapping like the device's i32 counter; never panics on extreme samples.
    let delta = current.wrapping_sub(previous);
    if (delta > 0 && delta < HALF_TURN) || delta < -HALF_TURN {
        Direction::Right
    } else if (delta < 0 && delta > -HALF_TURN) || delta > HALF_TURN {
        Direction::Left
    } else {
        Direction::None
    }
}
