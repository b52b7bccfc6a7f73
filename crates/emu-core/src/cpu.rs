//! CPU core trait.

use crate::{Bus, Ticks};

/// A CPU core.
///
/// CPUs execute whole instructions and access memory through a bus they do
/// not own. The bus is passed to every step so the machine keeps ownership
/// of memory and can inspect it between instructions.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Execute one instruction and return the T-states it consumed.
    fn step<B: Bus>(&mut self, bus: &mut B) -> Ticks;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers. The copy does not alias live state.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// Reset the CPU to its power-on state.
    fn reset(&mut self);
}
