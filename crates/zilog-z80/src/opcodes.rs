//! Opcode tables.
//!
//! Each instruction family has a 256-entry table built at compile time by a
//! `const fn` decoder. An entry records the full instruction length
//! (prefixes included), the base T-state cost and the operation to perform.
//! Conditional instructions list their not-taken cost; the executor adds the
//! extra time when the branch or repeat is taken.
//!
//! The `DD` and `FD` tables are derived from the unprefixed table: `HL`
//! becomes `IX`/`IY`, `(HL)` becomes `(IX+d)`/`(IY+d)`, and the 8-bit `H`
//! and `L` become the index halves unless the instruction also addresses
//! memory.

#![allow(clippy::cast_possible_truncation)] // Table indices are < 256.

use std::fmt;

use crate::alu::{AluOp, RotOp};

/// Which table an opcode was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    Base,
    Cb,
    Ed,
    Dd,
    Fd,
    DdCb,
    FdCb,
}

impl Family {
    /// Prefix bytes as written in a disassembly (`""`, `"CB"`, `"DD CB"`, ...).
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Base => "",
            Self::Cb => "CB",
            Self::Ed => "ED",
            Self::Dd => "DD",
            Self::Fd => "FD",
            Self::DdCb => "DD CB",
            Self::FdCb => "FD CB",
        }
    }

    /// The 256-entry table for this family.
    #[must_use]
    pub fn table(self) -> &'static [Opcode; 256] {
        match self {
            Self::Base => &BASE,
            Self::Cb => &CB,
            Self::Ed => &ED,
            Self::Dd => &DD,
            Self::Fd => &FD,
            Self::DdCb => &DDCB,
            Self::FdCb => &FDCB,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => f.write_str("unprefixed"),
            other => f.write_str(other.prefix()),
        }
    }
}

/// 8-bit registers, including the undocumented index halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg8 {
    B,
    C,
    D,
    E,
    H,
    L,
    A,
    Ixh,
    Ixl,
    Iyh,
    Iyl,
}

/// Register used as a memory pointer by `(HL)`, `(IX+d)` and `(IY+d)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Index {
    Hl,
    Ix,
    Iy,
}

/// An 8-bit operand location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Loc8 {
    Reg(Reg8),
    /// `(HL)`, or `(IX+d)`/`(IY+d)` with `d` at offset 2.
    Mem(Index),
}

/// 16-bit register operands. `Af` only appears in `PUSH`/`POP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pair {
    Bc,
    De,
    Hl,
    Sp,
    Af,
    Ix,
    Iy,
}

/// Branch conditions, in encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cond {
    Nz,
    Z,
    Nc,
    C,
    Po,
    Pe,
    P,
    M,
}

/// The ED-prefixed block transfer, search and I/O group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Ld,
    Cp,
    In,
    Out,
}

/// One block instruction: `LDI`, `CPDR`, `OTIR` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockOp {
    pub kind: BlockKind,
    pub decrement: bool,
    pub repeat: bool,
}

/// The execution effect of a table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Nop,
    Halt,
    /// No behaviour is defined for this opcode.
    Unimplemented,
    /// Continue decoding in another table.
    Prefix(Family),

    Ld8(Loc8, Loc8),
    LdImm8(Loc8),
    /// `LD A,(BC)` / `LD A,(DE)`.
    LdAPtr(Pair),
    /// `LD (BC),A` / `LD (DE),A`.
    LdPtrA(Pair),
    LoadA,
    StoreA,
    LdPairImm(Pair),
    LoadPair(Pair),
    StorePair(Pair),
    LdSp(Pair),
    Push(Pair),
    Pop(Pair),

    ExAf,
    Exx,
    ExDeHl,
    ExSp(Pair),

    Inc8(Loc8),
    Dec8(Loc8),
    Alu(AluOp, Loc8),
    AluImm(AluOp),
    Daa,
    Cpl,
    Neg,
    Scf,
    Ccf,

    IncPair(Pair),
    DecPair(Pair),
    AddPair(Pair, Pair),
    AdcHl(Pair),
    SbcHl(Pair),

    Rlca,
    Rrca,
    Rla,
    Rra,
    Rot(RotOp, Loc8),
    Bit(u8, Loc8),
    Res(u8, Loc8),
    Set(u8, Loc8),
    /// Undocumented `DDCB`/`FDCB` forms that also copy the result to a register.
    RotCopy(RotOp, Index, Reg8),
    ResCopy(u8, Index, Reg8),
    SetCopy(u8, Index, Reg8),
    Rrd,
    Rld,

    Jp,
    JpCc(Cond),
    JpPair(Pair),
    Jr,
    JrCc(Cond),
    Djnz,
    Call,
    CallCc(Cond),
    Ret,
    RetCc(Cond),
    Retn,
    Reti,
    Rst(u8),

    Di,
    Ei,
    Im(u8),
    LdIA,
    LdRA,
    LdAI,
    LdAR,

    OutImmA,
    InAImm,
    /// `IN r,(C)`. `None` is the flags-only `IN (C)`.
    InC(Option<Reg8>),
    /// `OUT (C),r`. `None` writes zero.
    OutC(Option<Reg8>),
    Block(BlockOp),
}

/// A table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode {
    /// Bytes consumed, prefixes and operands included.
    pub length: u8,
    /// T-states when no branch or repeat is taken.
    pub cycles: u8,
    pub op: Op,
}

impl Opcode {
    const fn new(length: u8, cycles: u8, op: Op) -> Self {
        Self { length, cycles, op }
    }
}

// ---------------------------------------------------------------------------
// Decoders
// ---------------------------------------------------------------------------

const REG8: [Reg8; 8] = [
    Reg8::B,
    Reg8::C,
    Reg8::D,
    Reg8::E,
    Reg8::H,
    Reg8::L,
    // Slot 6 is (HL); callers check for it before indexing.
    Reg8::A,
    Reg8::A,
];

const RP: [Pair; 4] = [Pair::Bc, Pair::De, Pair::Hl, Pair::Sp];
const RP2: [Pair; 4] = [Pair::Bc, Pair::De, Pair::Hl, Pair::Af];
const COND: [Cond; 8] = [
    Cond::Nz,
    Cond::Z,
    Cond::Nc,
    Cond::C,
    Cond::Po,
    Cond::Pe,
    Cond::P,
    Cond::M,
];

const fn loc(index: u8) -> Loc8 {
    if index == 6 {
        Loc8::Mem(Index::Hl)
    } else {
        Loc8::Reg(REG8[index as usize])
    }
}

const fn decode_base(code: u8) -> Opcode {
    let x = code >> 6;
    let y = (code >> 3) & 7;
    let z = code & 7;
    let p = y >> 1;
    let q = y & 1;

    match x {
        0 => match z {
            0 => match y {
                0 => Opcode::new(1, 4, Op::Nop),
                1 => Opcode::new(1, 4, Op::ExAf),
                2 => Opcode::new(2, 8, Op::Djnz),
                3 => Opcode::new(2, 12, Op::Jr),
                _ => Opcode::new(2, 7, Op::JrCc(COND[(y - 4) as usize])),
            },
            1 => {
                if q == 0 {
                    Opcode::new(3, 10, Op::LdPairImm(RP[p as usize]))
                } else {
                    Opcode::new(1, 11, Op::AddPair(Pair::Hl, RP[p as usize]))
                }
            }
            2 => match (q, p) {
                (0, 0 | 1) => Opcode::new(1, 7, Op::LdPtrA(RP[p as usize])),
                (0, 2) => Opcode::new(3, 16, Op::StorePair(Pair::Hl)),
                (0, _) => Opcode::new(3, 13, Op::StoreA),
                (_, 0 | 1) => Opcode::new(1, 7, Op::LdAPtr(RP[p as usize])),
                (_, 2) => Opcode::new(3, 16, Op::LoadPair(Pair::Hl)),
                _ => Opcode::new(3, 13, Op::LoadA),
            },
            3 => {
                if q == 0 {
                    Opcode::new(1, 6, Op::IncPair(RP[p as usize]))
                } else {
                    Opcode::new(1, 6, Op::DecPair(RP[p as usize]))
                }
            }
            4 => Opcode::new(1, if y == 6 { 11 } else { 4 }, Op::Inc8(loc(y))),
            5 => Opcode::new(1, if y == 6 { 11 } else { 4 }, Op::Dec8(loc(y))),
            6 => Opcode::new(2, if y == 6 { 10 } else { 7 }, Op::LdImm8(loc(y))),
            _ => Opcode::new(
                1,
                4,
                match y {
                    0 => Op::Rlca,
                    1 => Op::Rrca,
                    2 => Op::Rla,
                    3 => Op::Rra,
                    4 => Op::Daa,
                    5 => Op::Cpl,
                    6 => Op::Scf,
                    _ => Op::Ccf,
                },
            ),
        },
        1 => {
            if y == 6 && z == 6 {
                Opcode::new(1, 4, Op::Halt)
            } else {
                let cycles = if y == 6 || z == 6 { 7 } else { 4 };
                Opcode::new(1, cycles, Op::Ld8(loc(y), loc(z)))
            }
        }
        2 => Opcode::new(
            1,
            if z == 6 { 7 } else { 4 },
            Op::Alu(AluOp::from_index(y), loc(z)),
        ),
        _ => match z {
            0 => Opcode::new(1, 5, Op::RetCc(COND[y as usize])),
            1 => {
                if q == 0 {
                    Opcode::new(1, 10, Op::Pop(RP2[p as usize]))
                } else {
                    match p {
                        0 => Opcode::new(1, 10, Op::Ret),
                        1 => Opcode::new(1, 4, Op::Exx),
                        2 => Opcode::new(1, 4, Op::JpPair(Pair::Hl)),
                        _ => Opcode::new(1, 6, Op::LdSp(Pair::Hl)),
                    }
                }
            }
            2 => Opcode::new(3, 10, Op::JpCc(COND[y as usize])),
            3 => match y {
                0 => Opcode::new(3, 10, Op::Jp),
                1 => Opcode::new(1, 4, Op::Prefix(Family::Cb)),
                2 => Opcode::new(2, 11, Op::OutImmA),
                3 => Opcode::new(2, 11, Op::InAImm),
                4 => Opcode::new(1, 19, Op::ExSp(Pair::Hl)),
                5 => Opcode::new(1, 4, Op::ExDeHl),
                6 => Opcode::new(1, 4, Op::Di),
                _ => Opcode::new(1, 4, Op::Ei),
            },
            4 => Opcode::new(3, 10, Op::CallCc(COND[y as usize])),
            5 => {
                if q == 0 {
                    Opcode::new(1, 11, Op::Push(RP2[p as usize]))
                } else {
                    match p {
                        0 => Opcode::new(3, 17, Op::Call),
                        1 => Opcode::new(1, 4, Op::Prefix(Family::Dd)),
                        2 => Opcode::new(1, 4, Op::Prefix(Family::Ed)),
                        _ => Opcode::new(1, 4, Op::Prefix(Family::Fd)),
                    }
                }
            }
            6 => Opcode::new(2, 7, Op::AluImm(AluOp::from_index(y))),
            _ => Opcode::new(1, 11, Op::Rst(y * 8)),
        },
    }
}

const fn decode_cb(code: u8) -> Opcode {
    let x = code >> 6;
    let y = (code >> 3) & 7;
    let z = code & 7;
    let target = loc(z);
    let mem = z == 6;

    match x {
        0 => Opcode::new(2, if mem { 15 } else { 8 }, Op::Rot(RotOp::from_index(y), target)),
        1 => Opcode::new(2, if mem { 12 } else { 8 }, Op::Bit(y, target)),
        2 => Opcode::new(2, if mem { 15 } else { 8 }, Op::Res(y, target)),
        _ => Opcode::new(2, if mem { 15 } else { 8 }, Op::Set(y, target)),
    }
}

const UNDEFINED_ED: Opcode = Opcode::new(2, 8, Op::Unimplemented);

const fn decode_ed(code: u8) -> Opcode {
    let x = code >> 6;
    let y = (code >> 3) & 7;
    let z = code & 7;
    let p = y >> 1;
    let q = y & 1;

    match x {
        1 => match z {
            0 => Opcode::new(2, 12, Op::InC(if y == 6 { None } else { Some(REG8[y as usize]) })),
            1 => Opcode::new(2, 12, Op::OutC(if y == 6 { None } else { Some(REG8[y as usize]) })),
            2 => {
                if q == 0 {
                    Opcode::new(2, 15, Op::SbcHl(RP[p as usize]))
                } else {
                    Opcode::new(2, 15, Op::AdcHl(RP[p as usize]))
                }
            }
            3 => {
                if q == 0 {
                    Opcode::new(4, 20, Op::StorePair(RP[p as usize]))
                } else {
                    Opcode::new(4, 20, Op::LoadPair(RP[p as usize]))
                }
            }
            4 => Opcode::new(2, 8, Op::Neg),
            5 => Opcode::new(2, 14, if y == 1 { Op::Reti } else { Op::Retn }),
            6 => Opcode::new(
                2,
                8,
                Op::Im(match y & 3 {
                    0 | 1 => 0,
                    2 => 1,
                    _ => 2,
                }),
            ),
            _ => match y {
                0 => Opcode::new(2, 9, Op::LdIA),
                1 => Opcode::new(2, 9, Op::LdRA),
                2 => Opcode::new(2, 9, Op::LdAI),
                3 => Opcode::new(2, 9, Op::LdAR),
                4 => Opcode::new(2, 18, Op::Rrd),
                5 => Opcode::new(2, 18, Op::Rld),
                _ => UNDEFINED_ED,
            },
        },
        2 if z <= 3 && y >= 4 => {
            let kind = match z {
                0 => BlockKind::Ld,
                1 => BlockKind::Cp,
                2 => BlockKind::In,
                _ => BlockKind::Out,
            };
            Opcode::new(
                2,
                16,
                Op::Block(BlockOp {
                    kind,
                    decrement: y & 1 != 0,
                    repeat: y >= 6,
                }),
            )
        }
        _ => UNDEFINED_ED,
    }
}

const fn index_pair(pair: Pair, index: Index) -> Pair {
    match (pair, index) {
        (Pair::Hl, Index::Ix) => Pair::Ix,
        (Pair::Hl, Index::Iy) => Pair::Iy,
        _ => pair,
    }
}

const fn index_reg(reg: Reg8, index: Index) -> Reg8 {
    match (reg, index) {
        (Reg8::H, Index::Ix) => Reg8::Ixh,
        (Reg8::L, Index::Ix) => Reg8::Ixl,
        (Reg8::H, Index::Iy) => Reg8::Iyh,
        (Reg8::L, Index::Iy) => Reg8::Iyl,
        _ => reg,
    }
}

/// Rewrite a location. With `mem` set the instruction also touches
/// `(IX+d)`, so plain `H`/`L` keep their meaning.
const fn index_loc(target: Loc8, index: Index, mem: bool) -> Loc8 {
    match target {
        Loc8::Mem(_) => Loc8::Mem(index),
        Loc8::Reg(reg) if !mem => Loc8::Reg(index_reg(reg, index)),
        Loc8::Reg(_) => target,
    }
}

const fn is_mem(target: Loc8) -> bool {
    matches!(target, Loc8::Mem(_))
}

const fn decode_indexed(code: u8, index: Index) -> Opcode {
    // A further prefix cancels this one: it runs as a one-byte NOP.
    if code == 0xDD || code == 0xED || code == 0xFD {
        return Opcode::new(1, 4, Op::Nop);
    }
    if code == 0xCB {
        let family = match index {
            Index::Iy => Family::FdCb,
            _ => Family::DdCb,
        };
        return Opcode::new(4, 0, Op::Prefix(family));
    }

    let base = decode_base(code);
    let length = base.length + 1;
    let cycles = base.cycles + 4;

    // Instructions with (IX+d) carry a displacement byte and an address add.
    let op = match base.op {
        Op::Ld8(dst, src) => {
            let mem = is_mem(dst) || is_mem(src);
            Op::Ld8(index_loc(dst, index, mem), index_loc(src, index, mem))
        }
        Op::LdImm8(dst) => {
            if is_mem(dst) {
                return Opcode::new(length + 1, cycles + 5, Op::LdImm8(Loc8::Mem(index)));
            }
            Op::LdImm8(index_loc(dst, index, false))
        }
        Op::Inc8(t) => Op::Inc8(index_loc(t, index, false)),
        Op::Dec8(t) => Op::Dec8(index_loc(t, index, false)),
        Op::Alu(alu, t) => Op::Alu(alu, index_loc(t, index, false)),
        Op::LdPairImm(pair) => Op::LdPairImm(index_pair(pair, index)),
        Op::LoadPair(pair) => Op::LoadPair(index_pair(pair, index)),
        Op::StorePair(pair) => Op::StorePair(index_pair(pair, index)),
        Op::IncPair(pair) => Op::IncPair(index_pair(pair, index)),
        Op::DecPair(pair) => Op::DecPair(index_pair(pair, index)),
        Op::AddPair(dst, src) => Op::AddPair(index_pair(dst, index), index_pair(src, index)),
        Op::Push(pair) => Op::Push(index_pair(pair, index)),
        Op::Pop(pair) => Op::Pop(index_pair(pair, index)),
        Op::ExSp(pair) => Op::ExSp(index_pair(pair, index)),
        Op::JpPair(pair) => Op::JpPair(index_pair(pair, index)),
        Op::LdSp(pair) => Op::LdSp(index_pair(pair, index)),
        other => other,
    };

    let uses_mem = match op {
        Op::Ld8(dst, src) => is_mem(dst) || is_mem(src),
        Op::Inc8(t) | Op::Dec8(t) | Op::Alu(_, t) => is_mem(t),
        _ => false,
    };
    if uses_mem {
        Opcode::new(length + 1, cycles + 8, op)
    } else {
        Opcode::new(length, cycles, op)
    }
}

const fn decode_indexed_cb(code: u8, index: Index) -> Opcode {
    let x = code >> 6;
    let y = (code >> 3) & 7;
    let z = code & 7;
    let target = Loc8::Mem(index);
    // Register slot 6 is the plain memory form; the others also copy.
    let copy = if z == 6 { None } else { Some(REG8[z as usize]) };

    match (x, copy) {
        (1, _) => Opcode::new(4, 20, Op::Bit(y, target)),
        (0, None) => Opcode::new(4, 23, Op::Rot(RotOp::from_index(y), target)),
        (0, Some(reg)) => Opcode::new(4, 23, Op::RotCopy(RotOp::from_index(y), index, reg)),
        (2, None) => Opcode::new(4, 23, Op::Res(y, target)),
        (2, Some(reg)) => Opcode::new(4, 23, Op::ResCopy(y, index, reg)),
        (_, None) => Opcode::new(4, 23, Op::Set(y, target)),
        (_, Some(reg)) => Opcode::new(4, 23, Op::SetCopy(y, index, reg)),
    }
}

macro_rules! table {
    (|$code:ident| $decode:expr) => {{
        let mut table = [Opcode::new(1, 4, Op::Nop); 256];
        let mut slot = 0;
        while slot < 256 {
            let $code = slot as u8;
            table[slot] = $decode;
            slot += 1;
        }
        table
    }};
}

/// Unprefixed opcodes.
pub static BASE: [Opcode; 256] = table!(|code| decode_base(code));
/// `CB` bit operations.
pub static CB: [Opcode; 256] = table!(|code| decode_cb(code));
/// `ED` extended operations.
pub static ED: [Opcode; 256] = table!(|code| decode_ed(code));
/// `DD` (IX) operations.
pub static DD: [Opcode; 256] = table!(|code| decode_indexed(code, Index::Ix));
/// `FD` (IY) operations.
pub static FD: [Opcode; 256] = table!(|code| decode_indexed(code, Index::Iy));
/// `DD CB d op` operations on `(IX+d)`.
pub static DDCB: [Opcode; 256] = table!(|code| decode_indexed_cb(code, Index::Ix));
/// `FD CB d op` operations on `(IY+d)`.
pub static FDCB: [Opcode; 256] = table!(|code| decode_indexed_cb(code, Index::Iy));

// ---------------------------------------------------------------------------
// Disassembly
// ---------------------------------------------------------------------------

impl fmt::Display for Reg8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::H => "H",
            Self::L => "L",
            Self::A => "A",
            Self::Ixh => "IXH",
            Self::Ixl => "IXL",
            Self::Iyh => "IYH",
            Self::Iyl => "IYL",
        })
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hl => "(HL)",
            Self::Ix => "(IX+d)",
            Self::Iy => "(IY+d)",
        })
    }
}

impl fmt::Display for Loc8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reg(reg) => reg.fmt(f),
            Self::Mem(index) => index.fmt(f),
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bc => "BC",
            Self::De => "DE",
            Self::Hl => "HL",
            Self::Sp => "SP",
            Self::Af => "AF",
            Self::Ix => "IX",
            Self::Iy => "IY",
        })
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nz => "NZ",
            Self::Z => "Z",
            Self::Nc => "NC",
            Self::C => "C",
            Self::Po => "PO",
            Self::Pe => "PE",
            Self::P => "P",
            Self::M => "M",
        })
    }
}

impl fmt::Display for BlockOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stem = match (self.kind, self.repeat) {
            (BlockKind::Ld, _) => "LD",
            (BlockKind::Cp, _) => "CP",
            (BlockKind::In, _) => "IN",
            (BlockKind::Out, false) => "OUT",
            (BlockKind::Out, true) => "OT",
        };
        let dir = if self.decrement { 'D' } else { 'I' };
        if self.repeat {
            write!(f, "{stem}{dir}R")
        } else {
            write!(f, "{stem}{dir}")
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nop => f.write_str("NOP"),
            Self::Halt => f.write_str("HALT"),
            Self::Unimplemented => f.write_str("???"),
            Self::Prefix(family) => write!(f, "prefix {}", family.prefix()),
            Self::Ld8(dst, src) => write!(f, "LD {dst},{src}"),
            Self::LdImm8(dst) => write!(f, "LD {dst},n"),
            Self::LdAPtr(pair) => write!(f, "LD A,({pair})"),
            Self::LdPtrA(pair) => write!(f, "LD ({pair}),A"),
            Self::LoadA => f.write_str("LD A,(nn)"),
            Self::StoreA => f.write_str("LD (nn),A"),
            Self::LdPairImm(pair) => write!(f, "LD {pair},nn"),
            Self::LoadPair(pair) => write!(f, "LD {pair},(nn)"),
            Self::StorePair(pair) => write!(f, "LD (nn),{pair}"),
            Self::LdSp(pair) => write!(f, "LD SP,{pair}"),
            Self::Push(pair) => write!(f, "PUSH {pair}"),
            Self::Pop(pair) => write!(f, "POP {pair}"),
            Self::ExAf => f.write_str("EX AF,AF'"),
            Self::Exx => f.write_str("EXX"),
            Self::ExDeHl => f.write_str("EX DE,HL"),
            Self::ExSp(pair) => write!(f, "EX (SP),{pair}"),
            Self::Inc8(t) => write!(f, "INC {t}"),
            Self::Dec8(t) => write!(f, "DEC {t}"),
            Self::Alu(op, t) => write!(f, "{}{t}", op.mnemonic()),
            Self::AluImm(op) => write!(f, "{}n", op.mnemonic()),
            Self::Daa => f.write_str("DAA"),
            Self::Cpl => f.write_str("CPL"),
            Self::Neg => f.write_str("NEG"),
            Self::Scf => f.write_str("SCF"),
            Self::Ccf => f.write_str("CCF"),
            Self::IncPair(pair) => write!(f, "INC {pair}"),
            Self::DecPair(pair) => write!(f, "DEC {pair}"),
            Self::AddPair(dst, src) => write!(f, "ADD {dst},{src}"),
            Self::AdcHl(pair) => write!(f, "ADC HL,{pair}"),
            Self::SbcHl(pair) => write!(f, "SBC HL,{pair}"),
            Self::Rlca => f.write_str("RLCA"),
            Self::Rrca => f.write_str("RRCA"),
            Self::Rla => f.write_str("RLA"),
            Self::Rra => f.write_str("RRA"),
            Self::Rot(op, t) => write!(f, "{} {t}", op.mnemonic()),
            Self::Bit(bit, t) => write!(f, "BIT {bit},{t}"),
            Self::Res(bit, t) => write!(f, "RES {bit},{t}"),
            Self::Set(bit, t) => write!(f, "SET {bit},{t}"),
            Self::RotCopy(op, index, reg) => write!(f, "{} {index},{reg}", op.mnemonic()),
            Self::ResCopy(bit, index, reg) => write!(f, "RES {bit},{index},{reg}"),
            Self::SetCopy(bit, index, reg) => write!(f, "SET {bit},{index},{reg}"),
            Self::Rrd => f.write_str("RRD"),
            Self::Rld => f.write_str("RLD"),
            Self::Jp => f.write_str("JP nn"),
            Self::JpCc(cc) => write!(f, "JP {cc},nn"),
            Self::JpPair(pair) => write!(f, "JP ({pair})"),
            Self::Jr => f.write_str("JR e"),
            Self::JrCc(cc) => write!(f, "JR {cc},e"),
            Self::Djnz => f.write_str("DJNZ e"),
            Self::Call => f.write_str("CALL nn"),
            Self::CallCc(cc) => write!(f, "CALL {cc},nn"),
            Self::Ret => f.write_str("RET"),
            Self::RetCc(cc) => write!(f, "RET {cc}"),
            Self::Retn => f.write_str("RETN"),
            Self::Reti => f.write_str("RETI"),
            Self::Rst(vector) => write!(f, "RST {vector:02X}H"),
            Self::Di => f.write_str("DI"),
            Self::Ei => f.write_str("EI"),
            Self::Im(mode) => write!(f, "IM {mode}"),
            Self::LdIA => f.write_str("LD I,A"),
            Self::LdRA => f.write_str("LD R,A"),
            Self::LdAI => f.write_str("LD A,I"),
            Self::LdAR => f.write_str("LD A,R"),
            Self::OutImmA => f.write_str("OUT (n),A"),
            Self::InAImm => f.write_str("IN A,(n)"),
            Self::InC(Some(reg)) => write!(f, "IN {reg},(C)"),
            Self::InC(None) => f.write_str("IN (C)"),
            Self::OutC(Some(reg)) => write!(f, "OUT (C),{reg}"),
            Self::OutC(None) => f.write_str("OUT (C),0"),
            Self::Block(block) => block.fmt(f),
        }
    }
}
