//! Master System machine configuration.

use emu_core::{MasterClock, Ticks};
use thiserror::Error;

/// NTSC CPU clock: the 53.693175 MHz master crystal divided by 15.
pub const NTSC_CLOCK_HZ: u64 = 3_579_545;

/// PAL CPU clock: the 53.203424 MHz master crystal divided by 15.
pub const PAL_CLOCK_HZ: u64 = 3_546_893;

/// Rejected machine configurations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("frame rate must be non-zero")]
    ZeroFrameRate,
    #[error("CPU clock must be non-zero")]
    ZeroClock,
    #[error("{clock_hz} Hz at {frames_per_second} fps leaves less than one T-state per frame")]
    BudgetTooSmall { clock_hz: u64, frames_per_second: u64 },
}

/// Configuration for creating an `Sms` instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmsConfig {
    /// CPU frequency in Hz.
    pub clock_hz: u64,
    /// Frames per emulated second; one `update()` call is one frame.
    pub frames_per_second: u64,
    /// Zero system and cartridge RAM on every reset.
    pub clear_ram_on_reset: bool,
}

impl SmsConfig {
    /// 60 Hz machine.
    #[must_use]
    pub const fn ntsc() -> Self {
        Self {
            clock_hz: NTSC_CLOCK_HZ,
            frames_per_second: 60,
            clear_ram_on_reset: false,
        }
    }

    /// 50 Hz machine.
    #[must_use]
    pub const fn pal() -> Self {
        Self {
            clock_hz: PAL_CLOCK_HZ,
            frames_per_second: 50,
            clear_ram_on_reset: false,
        }
    }

    #[must_use]
    pub const fn clock(&self) -> MasterClock {
        MasterClock::new(self.clock_hz)
    }

    /// T-states to run per frame.
    pub fn frame_budget(&self) -> Result<Ticks, ConfigError> {
        if self.clock_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }
        let budget = self
            .clock()
            .ticks_per_frame(self.frames_per_second)
            .ok_or(ConfigError::ZeroFrameRate)?;
        if budget == Ticks::ZERO {
            return Err(ConfigError::BudgetTooSmall {
                clock_hz: self.clock_hz,
                frames_per_second: self.frames_per_second,
            });
        }
        Ok(budget)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.frame_budget().map(|_| ())
    }
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self::ntsc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ntsc_budget() {
        assert_eq!(SmsConfig::default().frame_budget(), Ok(Ticks::new(59_659)));
    }

    #[test]
    fn pal_budget() {
        assert_eq!(SmsConfig::pal().frame_budget(), Ok(Ticks::new(70_937)));
    }

    #[test]
    fn rejects_bad_rates() {
        let config = SmsConfig {
            frames_per_second: 0,
            ..SmsConfig::ntsc()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroFrameRate));

        let config = SmsConfig {
            clock_hz: 0,
            ..SmsConfig::ntsc()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroClock));

        let config = SmsConfig {
            clock_hz: 30,
            ..SmsConfig::ntsc()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::BudgetTooSmall {
                clock_hz: 30,
                frames_per_second: 60
            })
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ConfigError::ZeroFrameRate.to_string(),
            "frame rate must be non-zero"
        );
    }
}
