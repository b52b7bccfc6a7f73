//! Z80 register file.
//!
//! Register pairs are stored as a single `u16`; the 8-bit halves are
//! computed with shifts and masks rather than overlapping storage.

use crate::flags::Flag;

/// A 16-bit register pair addressable as two 8-bit halves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RegisterPair(u16);

impl RegisterPair {
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    pub fn set(&mut self, value: u16) {
        self.0 = value;
    }

    /// High byte (B of BC, A of AF).
    #[must_use]
    pub const fn high(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Low byte (C of BC, F of AF).
    #[must_use]
    pub const fn low(self) -> u8 {
        self.0 as u8
    }

    pub fn set_high(&mut self, value: u8) {
        self.0 = (self.0 & 0x00FF) | (u16::from(value) << 8);
    }

    pub fn set_low(&mut self, value: u8) {
        self.0 = (self.0 & 0xFF00) | u16::from(value);
    }
}

/// The alternate register set swapped in by `EX AF,AF'` and `EXX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlternateSet {
    pub af: RegisterPair,
    pub bc: RegisterPair,
    pub de: RegisterPair,
    pub hl: RegisterPair,
}

/// Architectural state of the Z80.
///
/// `Copy`, so snapshots handed to callers never alias the live CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub af: RegisterPair,
    pub bc: RegisterPair,
    pub de: RegisterPair,
    pub hl: RegisterPair,
    pub ix: RegisterPair,
    pub iy: RegisterPair,
    pub alt: AlternateSet,

    pub sp: u16,
    pub pc: u16,
    /// Interrupt vector base.
    pub i: u8,
    /// Memory refresh counter. Bit 7 is only changed by `LD R,A`.
    pub r: u8,

    pub iff1: bool,
    pub iff2: bool,
    /// Interrupt mode (0, 1 or 2).
    pub im: u8,
    pub halted: bool,
}

/// Stack pointer after reset. The Master System BIOS leaves SP here.
pub const RESET_SP: u16 = 0xDFF0;

impl Default for Registers {
    fn default() -> Self {
        Self {
            af: RegisterPair::default(),
            bc: RegisterPair::default(),
            de: RegisterPair::default(),
            hl: RegisterPair::default(),
            ix: RegisterPair::default(),
            iy: RegisterPair::default(),
            alt: AlternateSet::default(),
            sp: RESET_SP,
            pc: 0,
            i: 0,
            r: 0,
            iff1: false,
            iff2: false,
            im: 0,
            halted: false,
        }
    }
}

impl Registers {
    #[must_use]
    pub const fn a(&self) -> u8 {
        self.af.high()
    }

    #[must_use]
    pub const fn f(&self) -> u8 {
        self.af.low()
    }

    #[must_use]
    pub const fn b(&self) -> u8 {
        self.bc.high()
    }

    #[must_use]
    pub const fn c(&self) -> u8 {
        self.bc.low()
    }

    #[must_use]
    pub const fn d(&self) -> u8 {
        self.de.high()
    }

    #[must_use]
    pub const fn e(&self) -> u8 {
        self.de.low()
    }

    #[must_use]
    pub const fn h(&self) -> u8 {
        self.hl.high()
    }

    #[must_use]
    pub const fn l(&self) -> u8 {
        self.hl.low()
    }

    pub fn set_a(&mut self, value: u8) {
        self.af.set_high(value);
    }

    pub fn set_f(&mut self, value: u8) {
        self.af.set_low(value);
    }

    pub fn set_b(&mut self, value: u8) {
        self.bc.set_high(value);
    }

    pub fn set_c(&mut self, value: u8) {
        self.bc.set_low(value);
    }

    pub fn set_d(&mut self, value: u8) {
        self.de.set_high(value);
    }

    pub fn set_e(&mut self, value: u8) {
        self.de.set_low(value);
    }

    pub fn set_h(&mut self, value: u8) {
        self.hl.set_high(value);
    }

    pub fn set_l(&mut self, value: u8) {
        self.hl.set_low(value);
    }

    /// True if the given condition flag is set.
    #[must_use]
    pub const fn flag(&self, flag: Flag) -> bool {
        emu_core::is_bit_set(self.f(), flag.bit())
    }

    pub fn set_flag(&mut self, flag: Flag, on: bool) {
        let f = emu_core::assign_bit(self.f(), flag.bit(), on);
        self.set_f(f);
    }

    /// Advance the refresh counter: low 7 bits count and wrap, bit 7 stays.
    pub fn increment_refresh(&mut self) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_share_storage() {
        let mut bc = RegisterPair::new(0x1234);
        assert_eq!(bc.high(), 0x12);
        assert_eq!(bc.low(), 0x34);

        bc.set_high(0xAB);
        assert_eq!(bc.get(), 0xAB34);
        bc.set_low(0xCD);
        assert_eq!(bc.get(), 0xABCD);
    }

    #[test]
    fn reset_state() {
        let regs = Registers::default();
        assert_eq!(regs.sp, 0xDFF0);
        assert_eq!(regs.pc, 0);
        assert_eq!(regs.af.get(), 0);
        assert_eq!(regs.ix.get(), 0);
        assert_eq!(regs.alt, AlternateSet::default());
    }

    #[test]
    fn refresh_wraps_low_seven_bits() {
        let mut regs = Registers { r: 0x7F, ..Registers::default() };
        regs.increment_refresh();
        assert_eq!(regs.r, 0x00);

        regs.r = 0xFF;
        regs.increment_refresh();
        assert_eq!(regs.r, 0x80);

        regs.r = 0x85;
        regs.increment_refresh();
        assert_eq!(regs.r, 0x86);
    }

    #[test]
    fn flag_accessors_touch_only_f() {
        let mut regs = Registers::default();
        regs.set_a(0x42);
        regs.set_flag(Flag::Zero, true);
        regs.set_flag(Flag::Carry, true);
        assert_eq!(regs.f(), 0x41);
        assert_eq!(regs.a(), 0x42);
        regs.set_flag(Flag::Zero, false);
        assert!(!regs.flag(Flag::Zero));
        assert!(regs.flag(Flag::Carry));
    }
}
