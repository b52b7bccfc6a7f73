//! Top-level Master System core.
//!
//! The Z80 runs straight from the divided master crystal, so the frame
//! budget is the CPU clock divided by the frame rate.
//!
//! # Frame loop
//!
//! `update()` steps whole instructions until the frame budget is used up.
//! An instruction is never split, so a frame may overrun its budget by up
//! to one instruction. The overrun is not carried into the next frame.

use emu_core::{Cpu, Observable, Ticks, Value};
use zilog_z80::{Flag, Registers, StepOutcome, Z80};

use crate::config::{ConfigError, SmsConfig};
use crate::memory::MemoryController;

/// What one `update()` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// T-states executed, at least the frame budget.
    pub cycles: u64,
    /// Steps taken, halted steps included.
    pub instructions: u64,
    /// Steps that hit an opcode with no defined behaviour.
    pub unimplemented: u64,
}

/// Sega Master System: Z80 plus the banked memory map.
pub struct Sms {
    cpu: Z80,
    memory: MemoryController,
    config: SmsConfig,
    /// T-states per `update()` call.
    frame_budget: Ticks,
    cart_loaded: bool,
    /// Completed frame counter.
    frame_count: u64,
}

impl Sms {
    /// Create a machine with no cartridge inserted.
    pub fn new(config: SmsConfig) -> Result<Self, ConfigError> {
        let frame_budget = config.frame_budget()?;
        Ok(Self {
            cpu: Z80::new(),
            memory: MemoryController::new(),
            config,
            frame_budget,
            cart_loaded: false,
            frame_count: 0,
        })
    }

    /// Run one frame's worth of instructions.
    pub fn update(&mut self) -> FrameReport {
        let start_ticks = self.cpu.total_ticks();
        let mut report = FrameReport::default();

        while self.cpu.total_ticks() - start_ticks < self.frame_budget {
            let outcome = self.cpu.execute(&mut self.memory);
            report.instructions += 1;
            if outcome.is_unimplemented() {
                report.unimplemented += 1;
            }
        }

        report.cycles = (self.cpu.total_ticks() - start_ticks).get();
        self.frame_count += 1;
        report
    }

    /// Reset paging and the CPU. RAM survives unless the configuration
    /// asks for it to be cleared.
    pub fn reset(&mut self) {
        self.memory.reset();
        if self.config.clear_ram_on_reset {
            self.memory.clear_ram();
        }
        self.cpu.reset();
    }

    /// Insert a cartridge image and reset the machine.
    pub fn load_cartridge(&mut self, data: &[u8]) {
        self.memory.load_cartridge(data);
        // Paging is already reset by the load; this applies the RAM policy
        // and resets the CPU.
        self.reset();
        self.cart_loaded = true;
    }

    /// Execute a single instruction.
    pub fn step(&mut self) -> StepOutcome {
        self.cpu.execute(&mut self.memory)
    }

    /// Snapshot of the CPU registers.
    #[must_use]
    pub fn get_registers(&self) -> Registers {
        self.cpu.registers()
    }

    pub fn set_pc(&mut self, value: u16) {
        self.cpu.set_pc(value);
    }

    #[must_use]
    pub fn is_flag_set(&self, flag: Flag) -> bool {
        self.cpu.is_flag_set(flag)
    }

    /// T-states consumed by the most recent step.
    #[must_use]
    pub fn get_cycles(&self) -> u32 {
        self.cpu.cycles()
    }

    /// The loaded image, header already removed.
    #[must_use]
    pub fn dump_cartridge_data(&self) -> &[u8] {
        self.memory.dump_cartridge_data()
    }

    #[must_use]
    pub fn cart_loaded(&self) -> bool {
        self.cart_loaded
    }

    /// Completed frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// T-states per frame.
    #[must_use]
    pub fn frame_budget(&self) -> Ticks {
        self.frame_budget
    }

    #[must_use]
    pub fn config(&self) -> &SmsConfig {
        &self.config
    }

    /// Reference to the CPU.
    #[must_use]
    pub fn cpu(&self) -> &Z80 {
        &self.cpu
    }

    /// Mutable reference to the CPU.
    pub fn cpu_mut(&mut self) -> &mut Z80 {
        &mut self.cpu
    }

    /// Reference to the memory controller.
    #[must_use]
    pub fn memory(&self) -> &MemoryController {
        &self.memory
    }

    /// Mutable reference to the memory controller.
    pub fn memory_mut(&mut self) -> &mut MemoryController {
        &mut self.memory
    }
}

impl Observable for Sms {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            self.memory.query(rest)
        } else {
            match path {
                "frame_count" => Some(self.frame_count.into()),
                "cart_loaded" => Some(self.cart_loaded.into()),
                _ => self.cpu.query(path),
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<z80_paths>",
            "memory.<memory_paths>",
            "frame_count",
            "cart_loaded",
        ]
    }
}
