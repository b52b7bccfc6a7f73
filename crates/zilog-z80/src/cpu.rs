//! Z80 CPU core with instruction-level stepping.

#![allow(clippy::cast_possible_truncation)] // Intentional truncation for low byte extraction.

mod execute;

use std::collections::BTreeSet;

use emu_core::{Bus, Cpu, Observable, Ticks, Value};

use crate::flags::Flag;
use crate::opcodes::{BASE, Family, Op, Opcode};
use crate::registers::Registers;

/// T-states burned by each step while halted.
const HALT_CYCLES: u32 = 4;

/// T-states charged per opcode byte of an instruction with no defined behaviour.
const UNIMPLEMENTED_CYCLES_PER_BYTE: u32 = 4;

/// What a single `step` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// An instruction ran to completion.
    Executed { cycles: u32 },
    /// The opcode has no defined behaviour. PC moved past it and the time
    /// of its opcode fetches was charged.
    Unimplemented {
        family: Family,
        opcode: u8,
        cycles: u32,
    },
}

impl StepOutcome {
    /// T-states consumed by the step.
    #[must_use]
    pub const fn cycles(&self) -> u32 {
        match self {
            Self::Executed { cycles } | Self::Unimplemented { cycles, .. } => *cycles,
        }
    }

    #[must_use]
    pub const fn is_unimplemented(&self) -> bool {
        matches!(self, Self::Unimplemented { .. })
    }
}

/// Z80 CPU.
///
/// The CPU does not own the bus. It is passed to every `step()`, so the
/// machine keeps ownership of memory and can inspect it between instructions.
pub struct Z80 {
    /// Architectural state.
    pub(crate) regs: Registers,

    /// T-states consumed by the most recent step.
    last_cycles: u32,
    /// T-states consumed since construction.
    total_ticks: Ticks,

    // === Current instruction ===
    /// Address of the first byte (first prefix included).
    start: u16,
    /// Length from the table entry.
    length: u8,
    /// Branch destination recorded by a control-transfer handler.
    jump: Option<u16>,

    // === Unimplemented opcode tracking ===
    unimplemented: u64,
    reported: BTreeSet<(Family, u8)>,
}

impl Z80 {
    /// Create a CPU in its reset state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::default(),
            last_cycles: 0,
            total_ticks: Ticks::ZERO,
            start: 0,
            length: 0,
            jump: None,
            unimplemented: 0,
            reported: BTreeSet::new(),
        }
    }

    /// Fetch, decode and execute one instruction.
    ///
    /// PC is not advanced during decoding. Operands are addressed relative
    /// to the instruction start, and PC becomes either the branch target
    /// recorded by the handler or `start + length`.
    pub fn execute<B: Bus>(&mut self, bus: &mut B) -> StepOutcome {
        if self.regs.halted {
            self.regs.increment_refresh();
            return self.finish(StepOutcome::Executed {
                cycles: HALT_CYCLES,
            });
        }

        let start = self.regs.pc;
        self.regs.increment_refresh();

        let (family, opcode, entry) = self.decode(bus, start);
        self.start = start;
        self.length = entry.length;
        self.jump = None;

        let outcome = match entry.op {
            Op::Unimplemented => {
                self.note_unimplemented(family, opcode, start);
                StepOutcome::Unimplemented {
                    family,
                    opcode,
                    cycles: UNIMPLEMENTED_CYCLES_PER_BYTE * u32::from(entry.length),
                }
            }
            op => StepOutcome::Executed {
                cycles: self.execute_op(op, entry.cycles, bus),
            },
        };

        self.regs.pc = self
            .jump
            .take()
            .unwrap_or_else(|| start.wrapping_add(u16::from(entry.length)));
        self.finish(outcome)
    }

    /// Walk the prefix chain to the final table entry.
    ///
    /// One refresh increment per opcode fetch: the unprefixed byte has
    /// already been counted, the second byte of a prefixed instruction is
    /// counted here. The last byte of `DD CB d op` is read as an operand.
    fn decode<B: Bus>(&mut self, bus: &mut B, start: u16) -> (Family, u8, Opcode) {
        let opcode = bus.read(start);
        let entry = BASE[usize::from(opcode)];
        let Op::Prefix(family) = entry.op else {
            return (Family::Base, opcode, entry);
        };

        let second = bus.read(start.wrapping_add(1));
        let entry = family.table()[usize::from(second)];
        if entry.length > 1 {
            self.regs.increment_refresh();
        }
        match entry.op {
            Op::Prefix(inner) => {
                let last = bus.read(start.wrapping_add(3));
                (inner, last, inner.table()[usize::from(last)])
            }
            // A chained prefix runs as a one-byte NOP. Report it as unprefixed.
            _ if entry.length == 1 => (Family::Base, opcode, entry),
            _ => (family, second, entry),
        }
    }

    fn note_unimplemented(&mut self, family: Family, opcode: u8, address: u16) {
        self.unimplemented += 1;
        if self.reported.insert((family, opcode)) {
            log::warn!(
                "unimplemented {family} opcode {opcode:#04X} at {address:#06X}, skipped"
            );
        }
    }

    fn finish(&mut self, outcome: StepOutcome) -> StepOutcome {
        let cycles = outcome.cycles();
        self.last_cycles = cycles;
        self.total_ticks += Ticks::from(cycles);
        outcome
    }

    /// Set the program counter. Clears the halted latch.
    pub fn set_pc(&mut self, value: u16) {
        self.regs.pc = value;
        self.regs.halted = false;
    }

    #[must_use]
    pub fn is_flag_set(&self, flag: Flag) -> bool {
        self.regs.flag(flag)
    }

    pub fn set_flag(&mut self, flag: Flag, on: bool) {
        self.regs.set_flag(flag, on);
    }

    /// T-states consumed by the most recent step.
    #[must_use]
    pub fn cycles(&self) -> u32 {
        self.last_cycles
    }

    /// T-states consumed since construction. Survives reset.
    #[must_use]
    pub fn total_ticks(&self) -> Ticks {
        self.total_ticks
    }

    /// Number of steps that hit an opcode with no defined behaviour.
    #[must_use]
    pub fn unimplemented_count(&self) -> u64 {
        self.unimplemented
    }

    /// Direct register access for tests that seed CPU state.
    ///
    /// Only available in test builds.
    #[cfg(feature = "test-utils")]
    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu for Z80 {
    type Registers = Registers;

    fn step<B: Bus>(&mut self, bus: &mut B) -> Ticks {
        Ticks::from(self.execute(bus).cycles())
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.regs.halted
    }

    /// Registers return to power-on values, including the shadow set.
    /// The tick counter and unimplemented-opcode tally are kept.
    fn reset(&mut self) {
        self.regs = Registers::default();
        self.last_cycles = 0;
        self.jump = None;
    }
}

/// All query paths supported by the Z80.
const Z80_QUERY_PATHS: &[&str] = &[
    "a", "f", "b", "c", "d", "e", "h", "l",
    "af", "bc", "de", "hl",
    "af'", "bc'", "de'", "hl'",
    "ix", "iy", "ixh", "ixl", "iyh", "iyl",
    "sp", "pc", "i", "r",
    "flags.s", "flags.z", "flags.y", "flags.h",
    "flags.x", "flags.p", "flags.n", "flags.c",
    "iff1", "iff2", "im",
    "halted", "ticks", "cycles", "unimplemented",
];

impl Observable for Z80 {
    fn query(&self, path: &str) -> Option<Value> {
        let regs = &self.regs;
        if let Some(name) = path.strip_prefix("flags.") {
            return Flag::ALL
                .iter()
                .find(|flag| flag.name() == name)
                .map(|&flag| regs.flag(flag).into());
        }

        match path {
            "a" => Some(regs.a().into()),
            "f" => Some(regs.f().into()),
            "b" => Some(regs.b().into()),
            "c" => Some(regs.c().into()),
            "d" => Some(regs.d().into()),
            "e" => Some(regs.e().into()),
            "h" => Some(regs.h().into()),
            "l" => Some(regs.l().into()),

            "af" => Some(regs.af.get().into()),
            "bc" => Some(regs.bc.get().into()),
            "de" => Some(regs.de.get().into()),
            "hl" => Some(regs.hl.get().into()),

            "af'" => Some(regs.alt.af.get().into()),
            "bc'" => Some(regs.alt.bc.get().into()),
            "de'" => Some(regs.alt.de.get().into()),
            "hl'" => Some(regs.alt.hl.get().into()),

            "ix" => Some(regs.ix.get().into()),
            "iy" => Some(regs.iy.get().into()),
            "ixh" => Some(regs.ix.high().into()),
            "ixl" => Some(regs.ix.low().into()),
            "iyh" => Some(regs.iy.high().into()),
            "iyl" => Some(regs.iy.low().into()),

            "sp" => Some(regs.sp.into()),
            "pc" => Some(regs.pc.into()),
            "i" => Some(regs.i.into()),
            "r" => Some(regs.r.into()),

            "iff1" => Some(regs.iff1.into()),
            "iff2" => Some(regs.iff2.into()),
            "im" => Some(regs.im.into()),

            "halted" => Some(regs.halted.into()),
            "ticks" => Some(self.total_ticks.get().into()),
            "cycles" => Some(u64::from(self.last_cycles).into()),
            "unimplemented" => Some(self.unimplemented.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        Z80_QUERY_PATHS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    fn cpu_with(program: &[u8]) -> (Z80, SimpleBus) {
        let mut bus = SimpleBus::new();
        bus.load(0x0000, program);
        (Z80::new(), bus)
    }

    #[test]
    fn nop_from_blank_memory() {
        let (mut cpu, mut bus) = cpu_with(&[]);
        let outcome = cpu.execute(&mut bus);
        assert_eq!(outcome, StepOutcome::Executed { cycles: 4 });
        assert_eq!(cpu.pc(), 1);
        assert_eq!(cpu.cycles(), 4);
        assert_eq!(cpu.regs.r, 1);
    }

    #[test]
    fn prefixed_instruction_counts_two_fetches() {
        // LD IX,0x1234
        let (mut cpu, mut bus) = cpu_with(&[0xDD, 0x21, 0x34, 0x12]);
        let outcome = cpu.execute(&mut bus);
        assert_eq!(outcome.cycles(), 14);
        assert_eq!(cpu.regs.ix.get(), 0x1234);
        assert_eq!(cpu.regs.r, 2);
        assert_eq!(cpu.pc(), 4);
    }

    #[test]
    fn chained_prefix_consumes_one_byte() {
        // DD FD 21 nn: the DD is dropped, FD 21 loads IY.
        let (mut cpu, mut bus) = cpu_with(&[0xDD, 0xFD, 0x21, 0x78, 0x56]);
        assert_eq!(cpu.execute(&mut bus).cycles(), 4);
        assert_eq!(cpu.pc(), 1);
        assert_eq!(cpu.regs.r, 1);
        cpu.execute(&mut bus);
        assert_eq!(cpu.regs.iy.get(), 0x5678);
        assert_eq!(cpu.pc(), 5);
    }

    #[test]
    fn undefined_ed_opcode_is_skipped_and_counted() {
        let (mut cpu, mut bus) = cpu_with(&[0xED, 0x00, 0xED, 0x00, 0x00]);
        let outcome = cpu.execute(&mut bus);
        assert_eq!(
            outcome,
            StepOutcome::Unimplemented {
                family: Family::Ed,
                opcode: 0x00,
                cycles: 8,
            }
        );
        assert_eq!(cpu.pc(), 2);
        cpu.execute(&mut bus);
        assert_eq!(cpu.unimplemented_count(), 2);
        assert_eq!(cpu.reported.len(), 1);
        assert_eq!(cpu.total_ticks(), Ticks::new(16));
    }

    #[test]
    fn halt_burns_time_and_refreshes() {
        let (mut cpu, mut bus) = cpu_with(&[0x76]);
        cpu.execute(&mut bus);
        assert!(cpu.is_halted());
        assert_eq!(cpu.pc(), 1);

        for _ in 0..3 {
            assert_eq!(cpu.execute(&mut bus).cycles(), 4);
        }
        assert_eq!(cpu.pc(), 1);
        assert_eq!(cpu.regs.r, 4);
    }

    #[test]
    fn reset_restores_power_on_registers() {
        let (mut cpu, mut bus) = cpu_with(&[0x3E, 0x55, 0x08]);
        cpu.execute(&mut bus);
        cpu.execute(&mut bus);
        Cpu::reset(&mut cpu);
        assert_eq!(cpu.registers(), Registers::default());
        assert_eq!(cpu.total_ticks(), Ticks::new(11));
    }

    #[test]
    fn observable_paths() {
        let (mut cpu, mut bus) = cpu_with(&[0x01, 0x02, 0x03, 0x37]);
        cpu.execute(&mut bus);
        cpu.execute(&mut bus);
        assert_eq!(cpu.query("bc"), Some(Value::U16(0x0302)));
        assert_eq!(cpu.query("b"), Some(Value::U8(0x03)));
        assert_eq!(cpu.query("flags.c"), Some(Value::Bool(true)));
        assert_eq!(cpu.query("flags.z"), Some(Value::Bool(false)));
        assert_eq!(cpu.query("sp"), Some(Value::U16(0xDFF0)));
        assert_eq!(cpu.query("ticks"), Some(Value::U64(14)));
        assert_eq!(cpu.query("flags.q"), None);
        assert_eq!(cpu.query("nonsense"), None);
        for path in cpu.query_paths() {
            assert!(cpu.query(path).is_some(), "{path}");
        }
    }
}
