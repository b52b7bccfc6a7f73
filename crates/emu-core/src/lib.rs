//! Core traits and types shared by the CPU and machine crates.
//!
//! Time is counted in CPU T-states. A machine derives its per-frame budget
//! from the CPU clock and the target frame rate; the CPU reports how many
//! T-states each instruction consumed.

mod bits;
mod bus;
mod clock;
mod cpu;
mod observable;
mod ticks;

pub use bits::{assign_bit, clear_bit, is_bit_set, set_bit};
pub use bus::{Bus, SimpleBus};
pub use clock::MasterClock;
pub use cpu::Cpu;
pub use observable::{Observable, Value, parse_address};
pub use ticks::Ticks;
