//! Instruction-stepped Z80 CPU emulator.
//!
//! Each call to `execute()` fetches, decodes and runs one whole instruction
//! through the opcode tables in [`opcodes`] and reports the T-states it took.

mod alu;
mod cpu;
mod flags;
pub mod opcodes;
mod registers;

pub use alu::{AluOp, AluResult, RotOp};
pub use cpu::{StepOutcome, Z80};
pub use flags::{CF, Flag, HF, NF, PF, SF, XF, YF, ZF};
pub use opcodes::{Family, Op, Opcode};
pub use registers::{AlternateSet, RESET_SP, RegisterPair, Registers};
