//! Sega Master System CPU and banked-memory core.
//!
//! A Z80 stepped one instruction at a time against the cartridge mapper and
//! 8K of system RAM. Video, sound, input and interrupts are outside this
//! crate; `Sms::update()` paces one frame of CPU time from the configured
//! clock and frame rate.

mod config;
mod memory;
mod sms;

pub use config::{ConfigError, NTSC_CLOCK_HZ, PAL_CLOCK_HZ, SmsConfig};
pub use memory::{CART_RAM_BANKS, Mapper, MemoryController, PAGE_SIZE, RAM_SIZE};
pub use sms::{FrameReport, Sms};
pub use zilog_z80::{Flag, Registers, StepOutcome};
