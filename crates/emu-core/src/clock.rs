//! CPU clock configuration.

use crate::Ticks;

/// Clock driving the CPU.
///
/// On the Master System the Z80 runs directly from the divided master
/// crystal, so one tick of this clock is one T-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// CPU frequency in Hz (e.g., `3_579_545` for an NTSC Master System).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// T-states per frame at the given frame rate (integer division).
    ///
    /// Returns `None` for a zero frame rate.
    #[must_use]
    pub const fn ticks_per_frame(&self, frames_per_second: u64) -> Option<Ticks> {
        if frames_per_second == 0 {
            return None;
        }
        Some(Ticks::new(self.frequency_hz / frames_per_second))
    }
}
