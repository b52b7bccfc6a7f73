//! Instruction execution.
//!
//! `execute_op` performs the effect of one decoded table entry and returns
//! the T-states it took. Operands are read relative to the instruction
//! start; PC itself is only touched by the dispatcher.

#![allow(clippy::cast_possible_truncation)] // Low byte extraction.
#![allow(clippy::cast_possible_wrap)] // Displacements are signed bytes.

use emu_core::Bus;

use super::Z80;
use crate::alu::{self, AluOp, RotOp};
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, parity, sz53, sz53p};
use crate::opcodes::{BlockKind, BlockOp, Cond, Index, Loc8, Op, Pair, Reg8};

/// Extra T-states when a conditional branch or block repeat is taken.
const JR_TAKEN: u32 = 5;
const CALL_TAKEN: u32 = 7;
const RET_TAKEN: u32 = 6;
const REPEAT_TAKEN: u32 = 5;

/// A resolved 8-bit operand.
#[derive(Clone, Copy)]
enum Target {
    Reg(Reg8),
    Addr(u16),
}

impl Z80 {
    pub(super) fn execute_op<B: Bus>(&mut self, op: Op, cycles: u8, bus: &mut B) -> u32 {
        let mut cycles = u32::from(cycles);

        match op {
            Op::Nop | Op::Unimplemented | Op::Prefix(_) => {}
            Op::Halt => self.regs.halted = true,

            // === 8-bit loads ===
            Op::Ld8(dst, src) => {
                let value = self.read_loc(src, bus);
                self.write_loc(dst, value, bus);
            }
            Op::LdImm8(dst) => {
                let value = self.operand8(bus);
                self.write_loc(dst, value, bus);
            }
            Op::LdAPtr(pair) => {
                let value = bus.read(self.pair(pair));
                self.regs.set_a(value);
            }
            Op::LdPtrA(pair) => bus.write(self.pair(pair), self.regs.a()),
            Op::LoadA => {
                let address = self.operand16(bus);
                let value = bus.read(address);
                self.regs.set_a(value);
            }
            Op::StoreA => {
                let address = self.operand16(bus);
                bus.write(address, self.regs.a());
            }

            // === 16-bit loads ===
            Op::LdPairImm(pair) => {
                let value = self.operand16(bus);
                self.set_pair(pair, value);
            }
            Op::LoadPair(pair) => {
                let address = self.operand16(bus);
                let value = bus.read_word(address);
                self.set_pair(pair, value);
            }
            Op::StorePair(pair) => {
                let address = self.operand16(bus);
                bus.write_word(address, self.pair(pair));
            }
            Op::LdSp(pair) => self.regs.sp = self.pair(pair),
            Op::Push(pair) => self.push(bus, self.pair(pair)),
            Op::Pop(pair) => {
                let value = self.pop(bus);
                self.set_pair(pair, value);
            }

            // === Exchanges ===
            Op::ExAf => std::mem::swap(&mut self.regs.af, &mut self.regs.alt.af),
            Op::Exx => {
                std::mem::swap(&mut self.regs.bc, &mut self.regs.alt.bc);
                std::mem::swap(&mut self.regs.de, &mut self.regs.alt.de);
                std::mem::swap(&mut self.regs.hl, &mut self.regs.alt.hl);
            }
            Op::ExDeHl => std::mem::swap(&mut self.regs.de, &mut self.regs.hl),
            Op::ExSp(pair) => {
                let sp = self.regs.sp;
                let stacked = bus.read_word(sp);
                bus.write_word(sp, self.pair(pair));
                self.set_pair(pair, stacked);
            }

            // === 8-bit arithmetic ===
            Op::Inc8(loc) => {
                self.modify(loc, bus, |cpu, value| {
                    let result = alu::inc8(value);
                    cpu.set_f((cpu.regs.f() & CF) | result.flags);
                    result.value
                });
            }
            Op::Dec8(loc) => {
                self.modify(loc, bus, |cpu, value| {
                    let result = alu::dec8(value);
                    cpu.set_f((cpu.regs.f() & CF) | result.flags);
                    result.value
                });
            }
            Op::Alu(alu_op, loc) => {
                let operand = self.read_loc(loc, bus);
                self.accumulate(alu_op, operand);
            }
            Op::AluImm(alu_op) => {
                let operand = self.operand8(bus);
                self.accumulate(alu_op, operand);
            }
            Op::Daa => {
                let result = alu::daa(self.regs.a(), self.regs.f());
                self.regs.set_a(result.value);
                self.set_f(result.flags);
            }
            Op::Cpl => {
                let a = !self.regs.a();
                self.regs.set_a(a);
                self.set_f((self.regs.f() & (SF | ZF | PF | CF)) | HF | NF | (a & (YF | XF)));
            }
            Op::Neg => {
                let result = alu::sub8(0, self.regs.a(), false);
                self.regs.set_a(result.value);
                self.set_f(result.flags);
            }
            Op::Scf => {
                let a = self.regs.a();
                self.set_f((self.regs.f() & (SF | ZF | PF)) | CF | (a & (YF | XF)));
            }
            Op::Ccf => {
                let f = self.regs.f();
                let carry = if f & CF != 0 { HF } else { CF };
                self.set_f((f & (SF | ZF | PF)) | carry | (self.regs.a() & (YF | XF)));
            }

            // === 16-bit arithmetic ===
            Op::IncPair(pair) => self.set_pair(pair, self.pair(pair).wrapping_add(1)),
            Op::DecPair(pair) => self.set_pair(pair, self.pair(pair).wrapping_sub(1)),
            Op::AddPair(dst, src) => {
                let (result, flags) = alu::add16(self.pair(dst), self.pair(src), self.regs.f());
                self.set_pair(dst, result);
                self.set_f(flags);
            }
            Op::AdcHl(pair) => {
                let (result, flags) = alu::adc16(self.regs.hl.get(), self.pair(pair), self.carry());
                self.regs.hl.set(result);
                self.set_f(flags);
            }
            Op::SbcHl(pair) => {
                let (result, flags) = alu::sbc16(self.regs.hl.get(), self.pair(pair), self.carry());
                self.regs.hl.set(result);
                self.set_f(flags);
            }

            // === Rotates and bit operations ===
            Op::Rlca => self.rotate_a(RotOp::Rlc),
            Op::Rrca => self.rotate_a(RotOp::Rrc),
            Op::Rla => self.rotate_a(RotOp::Rl),
            Op::Rra => self.rotate_a(RotOp::Rr),
            Op::Rot(rot, loc) => {
                self.modify(loc, bus, |cpu, value| {
                    let result = rot.apply(value, cpu.carry());
                    cpu.set_f(result.flags);
                    result.value
                });
            }
            Op::Bit(bit, loc) => {
                let target = self.resolve(loc, bus);
                let value = self.load(target, bus);
                // X and Y leak from the operand register, or from the
                // high byte of the effective address for memory forms.
                let xy_source = match target {
                    Target::Reg(_) => value,
                    Target::Addr(address) => (address >> 8) as u8,
                };
                let set = value & (1 << bit) != 0;
                let mut f = (self.regs.f() & CF) | HF | (xy_source & (YF | XF));
                if !set {
                    f |= ZF | PF;
                }
                if set && bit == 7 {
                    f |= SF;
                }
                self.set_f(f);
            }
            Op::Res(bit, loc) => {
                self.modify(loc, bus, |_, value| value & !(1 << bit));
            }
            Op::Set(bit, loc) => {
                self.modify(loc, bus, |_, value| value | (1 << bit));
            }
            Op::RotCopy(rot, index, reg) => {
                let result = self.modify(Loc8::Mem(index), bus, |cpu, value| {
                    let result = rot.apply(value, cpu.carry());
                    cpu.set_f(result.flags);
                    result.value
                });
                self.set_reg8(reg, result);
            }
            Op::ResCopy(bit, index, reg) => {
                let result = self.modify(Loc8::Mem(index), bus, |_, value| value & !(1 << bit));
                self.set_reg8(reg, result);
            }
            Op::SetCopy(bit, index, reg) => {
                let result = self.modify(Loc8::Mem(index), bus, |_, value| value | (1 << bit));
                self.set_reg8(reg, result);
            }
            Op::Rrd => {
                let address = self.regs.hl.get();
                let memory = bus.read(address);
                let a = self.regs.a();
                bus.write(address, (a << 4) | (memory >> 4));
                self.digit_result((a & 0xF0) | (memory & 0x0F));
            }
            Op::Rld => {
                let address = self.regs.hl.get();
                let memory = bus.read(address);
                let a = self.regs.a();
                bus.write(address, (memory << 4) | (a & 0x0F));
                self.digit_result((a & 0xF0) | (memory >> 4));
            }

            // === Control transfer ===
            Op::Jp => self.jump = Some(self.operand16(bus)),
            Op::JpCc(cond) => {
                if self.condition(cond) {
                    self.jump = Some(self.operand16(bus));
                }
            }
            Op::JpPair(pair) => self.jump = Some(self.pair(pair)),
            Op::Jr => self.jump = Some(self.relative_target(bus)),
            Op::JrCc(cond) => {
                if self.condition(cond) {
                    self.jump = Some(self.relative_target(bus));
                    cycles += JR_TAKEN;
                }
            }
            Op::Djnz => {
                let b = self.regs.b().wrapping_sub(1);
                self.regs.set_b(b);
                if b != 0 {
                    self.jump = Some(self.relative_target(bus));
                    cycles += JR_TAKEN;
                }
            }
            Op::Call => self.call(bus),
            Op::CallCc(cond) => {
                if self.condition(cond) {
                    self.call(bus);
                    cycles += CALL_TAKEN;
                }
            }
            Op::Ret => self.jump = Some(self.pop(bus)),
            Op::RetCc(cond) => {
                if self.condition(cond) {
                    self.jump = Some(self.pop(bus));
                    cycles += RET_TAKEN;
                }
            }
            Op::Retn | Op::Reti => {
                self.regs.iff1 = self.regs.iff2;
                self.jump = Some(self.pop(bus));
            }
            Op::Rst(vector) => {
                self.push(bus, self.next_address());
                self.jump = Some(u16::from(vector));
            }

            // === CPU control ===
            Op::Di => {
                self.regs.iff1 = false;
                self.regs.iff2 = false;
            }
            Op::Ei => {
                self.regs.iff1 = true;
                self.regs.iff2 = true;
            }
            Op::Im(mode) => self.regs.im = mode,
            Op::LdIA => self.regs.i = self.regs.a(),
            Op::LdRA => self.regs.r = self.regs.a(),
            Op::LdAI => self.load_a_special(self.regs.i),
            Op::LdAR => self.load_a_special(self.regs.r),

            // === I/O ===
            Op::OutImmA => {
                let a = self.regs.a();
                let port = u16::from_be_bytes([a, self.operand8(bus)]);
                bus.io_write(port, a);
            }
            Op::InAImm => {
                let port = u16::from_be_bytes([self.regs.a(), self.operand8(bus)]);
                let value = bus.io_read(port);
                self.regs.set_a(value);
            }
            Op::InC(reg) => {
                let value = bus.io_read(self.regs.bc.get());
                self.set_f((self.regs.f() & CF) | sz53p(value));
                if let Some(reg) = reg {
                    self.set_reg8(reg, value);
                }
            }
            Op::OutC(reg) => {
                let value = reg.map_or(0, |reg| self.reg8(reg));
                bus.io_write(self.regs.bc.get(), value);
            }
            Op::Block(block) => {
                if self.block(block, bus) {
                    self.jump = Some(self.start);
                    cycles += REPEAT_TAKEN;
                }
            }
        }

        cycles
    }

    // === Operand access ===

    fn next_address(&self) -> u16 {
        self.start.wrapping_add(u16::from(self.length))
    }

    /// The last byte of the instruction.
    fn operand8<B: Bus>(&self, bus: &mut B) -> u8 {
        bus.read(self.next_address().wrapping_sub(1))
    }

    /// The last two bytes of the instruction, little-endian.
    fn operand16<B: Bus>(&self, bus: &mut B) -> u16 {
        bus.read_word(self.next_address().wrapping_sub(2))
    }

    /// `PC + e` as seen after the instruction: start + length + e.
    fn relative_target<B: Bus>(&self, bus: &mut B) -> u16 {
        let offset = self.operand8(bus) as i8;
        self.next_address().wrapping_add_signed(i16::from(offset))
    }

    fn resolve<B: Bus>(&self, loc: Loc8, bus: &mut B) -> Target {
        match loc {
            Loc8::Reg(reg) => Target::Reg(reg),
            Loc8::Mem(Index::Hl) => Target::Addr(self.regs.hl.get()),
            Loc8::Mem(index) => {
                let base = match index {
                    Index::Iy => self.regs.iy.get(),
                    _ => self.regs.ix.get(),
                };
                let offset = bus.read(self.start.wrapping_add(2)) as i8;
                Target::Addr(base.wrapping_add_signed(i16::from(offset)))
            }
        }
    }

    fn load<B: Bus>(&self, target: Target, bus: &mut B) -> u8 {
        match target {
            Target::Reg(reg) => self.reg8(reg),
            Target::Addr(address) => bus.read(address),
        }
    }

    fn store<B: Bus>(&mut self, target: Target, value: u8, bus: &mut B) {
        match target {
            Target::Reg(reg) => self.set_reg8(reg, value),
            Target::Addr(address) => bus.write(address, value),
        }
    }

    fn read_loc<B: Bus>(&self, loc: Loc8, bus: &mut B) -> u8 {
        let target = self.resolve(loc, bus);
        self.load(target, bus)
    }

    fn write_loc<B: Bus>(&mut self, loc: Loc8, value: u8, bus: &mut B) {
        let target = self.resolve(loc, bus);
        self.store(target, value, bus);
    }

    /// Read-modify-write through one resolved address. Returns the new value.
    fn modify<B: Bus>(&mut self, loc: Loc8, bus: &mut B, f: impl FnOnce(&mut Self, u8) -> u8) -> u8 {
        let target = self.resolve(loc, bus);
        let value = self.load(target, bus);
        let result = f(self, value);
        self.store(target, result, bus);
        result
    }

    // === Registers ===

    fn reg8(&self, reg: Reg8) -> u8 {
        let regs = &self.regs;
        match reg {
            Reg8::A => regs.a(),
            Reg8::B => regs.b(),
            Reg8::C => regs.c(),
            Reg8::D => regs.d(),
            Reg8::E => regs.e(),
            Reg8::H => regs.h(),
            Reg8::L => regs.l(),
            Reg8::Ixh => regs.ix.high(),
            Reg8::Ixl => regs.ix.low(),
            Reg8::Iyh => regs.iy.high(),
            Reg8::Iyl => regs.iy.low(),
        }
    }

    fn set_reg8(&mut self, reg: Reg8, value: u8) {
        let regs = &mut self.regs;
        match reg {
            Reg8::A => regs.set_a(value),
            Reg8::B => regs.set_b(value),
            Reg8::C => regs.set_c(value),
            Reg8::D => regs.set_d(value),
            Reg8::E => regs.set_e(value),
            Reg8::H => regs.set_h(value),
            Reg8::L => regs.set_l(value),
            Reg8::Ixh => regs.ix.set_high(value),
            Reg8::Ixl => regs.ix.set_low(value),
            Reg8::Iyh => regs.iy.set_high(value),
            Reg8::Iyl => regs.iy.set_low(value),
        }
    }

    fn pair(&self, pair: Pair) -> u16 {
        match pair {
            Pair::Bc => self.regs.bc.get(),
            Pair::De => self.regs.de.get(),
            Pair::Hl => self.regs.hl.get(),
            Pair::Sp => self.regs.sp,
            Pair::Af => self.regs.af.get(),
            Pair::Ix => self.regs.ix.get(),
            Pair::Iy => self.regs.iy.get(),
        }
    }

    fn set_pair(&mut self, pair: Pair, value: u16) {
        match pair {
            Pair::Bc => self.regs.bc.set(value),
            Pair::De => self.regs.de.set(value),
            Pair::Hl => self.regs.hl.set(value),
            Pair::Sp => self.regs.sp = value,
            Pair::Af => self.regs.af.set(value),
            Pair::Ix => self.regs.ix.set(value),
            Pair::Iy => self.regs.iy.set(value),
        }
    }

    fn set_f(&mut self, value: u8) {
        self.regs.set_f(value);
    }

    fn carry(&self) -> bool {
        self.regs.f() & CF != 0
    }

    fn condition(&self, cond: Cond) -> bool {
        let f = self.regs.f();
        match cond {
            Cond::Nz => f & ZF == 0,
            Cond::Z => f & ZF != 0,
            Cond::Nc => f & CF == 0,
            Cond::C => f & CF != 0,
            Cond::Po => f & PF == 0,
            Cond::Pe => f & PF != 0,
            Cond::P => f & SF == 0,
            Cond::M => f & SF != 0,
        }
    }

    // === Stack ===

    fn push<B: Bus>(&mut self, bus: &mut B, value: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(2);
        bus.write_word(self.regs.sp, value);
    }

    fn pop<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let value = bus.read_word(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }

    fn call<B: Bus>(&mut self, bus: &mut B) {
        let target = self.operand16(bus);
        self.push(bus, self.next_address());
        self.jump = Some(target);
    }

    // === Shared flag rules ===

    fn accumulate(&mut self, op: AluOp, operand: u8) {
        let result = op.apply(self.regs.a(), operand, self.carry());
        self.regs.set_a(result.value);
        self.set_f(result.flags);
    }

    /// RLCA, RRCA, RLA, RRA: S, Z and P/V survive, H and N clear.
    fn rotate_a(&mut self, rot: RotOp) {
        let (a, out) = rot.rotate(self.regs.a(), self.carry());
        self.regs.set_a(a);
        let carry = if out { CF } else { 0 };
        self.set_f((self.regs.f() & (SF | ZF | PF)) | (a & (YF | XF)) | carry);
    }

    fn digit_result(&mut self, a: u8) {
        self.regs.set_a(a);
        self.set_f((self.regs.f() & CF) | sz53p(a));
    }

    /// `LD A,I` and `LD A,R` copy IFF2 into P/V.
    fn load_a_special(&mut self, value: u8) {
        self.regs.set_a(value);
        let pv = if self.regs.iff2 { PF } else { 0 };
        self.set_f((self.regs.f() & CF) | sz53(value) | pv);
    }

    /// One iteration of a block instruction. Returns true if it repeats.
    fn block<B: Bus>(&mut self, block: BlockOp, bus: &mut B) -> bool {
        let step = |value: u16| {
            if block.decrement {
                value.wrapping_sub(1)
            } else {
                value.wrapping_add(1)
            }
        };
        let hl = self.regs.hl.get();

        match block.kind {
            BlockKind::Ld => {
                let value = bus.read(hl);
                bus.write(self.regs.de.get(), value);
                self.regs.hl.set(step(hl));
                self.regs.de.set(step(self.regs.de.get()));
                let bc = self.regs.bc.get().wrapping_sub(1);
                self.regs.bc.set(bc);

                let n = value.wrapping_add(self.regs.a());
                let mut f = (self.regs.f() & (SF | ZF | CF)) | (n & XF) | ((n & 0x02) << 4);
                if bc != 0 {
                    f |= PF;
                }
                self.set_f(f);
                block.repeat && bc != 0
            }
            BlockKind::Cp => {
                let value = bus.read(hl);
                let a = self.regs.a();
                let result = a.wrapping_sub(value);
                let half = (a & 0x0F) < (value & 0x0F);
                self.regs.hl.set(step(hl));
                let bc = self.regs.bc.get().wrapping_sub(1);
                self.regs.bc.set(bc);

                let n = result.wrapping_sub(u8::from(half));
                let mut f = (self.regs.f() & CF) | NF | (result & SF) | (n & XF) | ((n & 0x02) << 4);
                if result == 0 {
                    f |= ZF;
                }
                if half {
                    f |= HF;
                }
                if bc != 0 {
                    f |= PF;
                }
                self.set_f(f);
                block.repeat && bc != 0 && result != 0
            }
            BlockKind::In => {
                let value = bus.io_read(self.regs.bc.get());
                bus.write(hl, value);
                self.regs.hl.set(step(hl));
                let b = self.regs.b().wrapping_sub(1);
                self.regs.set_b(b);

                let c = if block.decrement {
                    self.regs.c().wrapping_sub(1)
                } else {
                    self.regs.c().wrapping_add(1)
                };
                self.io_block_flags(value, c, b);
                block.repeat && b != 0
            }
            BlockKind::Out => {
                let value = bus.read(hl);
                let b = self.regs.b().wrapping_sub(1);
                self.regs.set_b(b);
                bus.io_write(self.regs.bc.get(), value);
                self.regs.hl.set(step(hl));

                self.io_block_flags(value, self.regs.l(), b);
                block.repeat && b != 0
            }
        }
    }

    /// Flags shared by INI/IND/OUTI/OUTD: S, Z, X, Y from B; N from bit 7
    /// of the transferred byte; H and C from `value + addend` overflowing;
    /// P/V from the parity of `((value + addend) & 7) ^ B`.
    fn io_block_flags(&mut self, value: u8, addend: u8, b: u8) {
        let k = u16::from(value) + u16::from(addend);
        let mut f = sz53(b);
        if value & 0x80 != 0 {
            f |= NF;
        }
        if k > 0xFF {
            f |= HF | CF;
        }
        if parity((k as u8 & 7) ^ b) {
            f |= PF;
        }
        self.set_f(f);
    }
}
