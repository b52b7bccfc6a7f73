//! Flag-producing arithmetic and logic for the Z80.
//!
//! Every function is pure: it takes operand values and returns the result
//! together with a complete F byte. Callers that must preserve a flag
//! (INC/DEC keep C, ADD HL keeps S/Z/PV) merge it in themselves.

#![allow(clippy::cast_possible_truncation)] // Low byte extraction.

use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, sz53, sz53p};

/// Result of an 8-bit ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

/// The eight accumulator operations selected by bits 5-3 of `ALU A,r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    pub(crate) const fn from_index(index: u8) -> Self {
        match index & 7 {
            0 => Self::Add,
            1 => Self::Adc,
            2 => Self::Sub,
            3 => Self::Sbc,
            4 => Self::And,
            5 => Self::Xor,
            6 => Self::Or,
            _ => Self::Cp,
        }
    }

    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD A,",
            Self::Adc => "ADC A,",
            Self::Sub => "SUB ",
            Self::Sbc => "SBC A,",
            Self::And => "AND ",
            Self::Xor => "XOR ",
            Self::Or => "OR ",
            Self::Cp => "CP ",
        }
    }

    /// Apply to the accumulator. CP returns A unchanged as its value.
    #[must_use]
    pub fn apply(self, a: u8, operand: u8, carry: bool) -> AluResult {
        match self {
            Self::Add => add8(a, operand, false),
            Self::Adc => add8(a, operand, carry),
            Self::Sub => sub8(a, operand, false),
            Self::Sbc => sub8(a, operand, carry),
            Self::And => logic(a & operand, HF),
            Self::Xor => logic(a ^ operand, 0),
            Self::Or => logic(a | operand, 0),
            Self::Cp => cp8(a, operand),
        }
    }
}

/// The CB-prefixed rotate and shift group, bits 5-3 of the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    /// Undocumented: shift left, bit 0 set.
    Sll,
    Srl,
}

impl RotOp {
    pub(crate) const fn from_index(index: u8) -> Self {
        match index & 7 {
            0 => Self::Rlc,
            1 => Self::Rrc,
            2 => Self::Rl,
            3 => Self::Rr,
            4 => Self::Sla,
            5 => Self::Sra,
            6 => Self::Sll,
            _ => Self::Srl,
        }
    }

    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Rlc => "RLC",
            Self::Rrc => "RRC",
            Self::Rl => "RL",
            Self::Rr => "RR",
            Self::Sla => "SLA",
            Self::Sra => "SRA",
            Self::Sll => "SLL",
            Self::Srl => "SRL",
        }
    }

    /// Rotate/shift with full CB-group flags (S, Z, P, X/Y from result).
    #[must_use]
    pub fn apply(self, value: u8, carry: bool) -> AluResult {
        let (result, out) = self.rotate(value, carry);
        AluResult {
            value: result,
            flags: sz53p(result) | if out { CF } else { 0 },
        }
    }

    /// Raw rotation: new value and the bit shifted out.
    pub(crate) fn rotate(self, value: u8, carry: bool) -> (u8, bool) {
        let high = value & 0x80 != 0;
        let low = value & 1 != 0;
        match self {
            Self::Rlc => (value.rotate_left(1), high),
            Self::Rrc => (value.rotate_right(1), low),
            Self::Rl => ((value << 1) | u8::from(carry), high),
            Self::Rr => ((value >> 1) | (u8::from(carry) << 7), low),
            Self::Sla => (value << 1, high),
            Self::Sra => ((value >> 1) | (value & 0x80), low),
            Self::Sll => ((value << 1) | 1, high),
            Self::Srl => (value >> 1, low),
        }
    }
}

fn logic(result: u8, extra: u8) -> AluResult {
    AluResult {
        value: result,
        flags: sz53p(result) | extra,
    }
}

/// Add two bytes with optional carry in.
#[must_use]
pub fn add8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let wide = u16::from(a) + u16::from(b) + u16::from(c);
    let result = wide as u8;

    let mut flags = sz53(result);
    if (a & 0x0F) + (b & 0x0F) + c > 0x0F {
        flags |= HF;
    }
    // Same-sign operands producing an opposite-sign result.
    if (a ^ b) & 0x80 == 0 && (a ^ result) & 0x80 != 0 {
        flags |= PF;
    }
    if wide > 0xFF {
        flags |= CF;
    }
    AluResult { value: result, flags }
}

/// Subtract with optional borrow in.
#[must_use]
pub fn sub8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let result = a.wrapping_sub(b).wrapping_sub(c);

    let mut flags = sz53(result) | NF;
    if (a & 0x0F) < (b & 0x0F) + c {
        flags |= HF;
    }
    if (a ^ b) & 0x80 != 0 && (a ^ result) & 0x80 != 0 {
        flags |= PF;
    }
    if u16::from(a) < u16::from(b) + u16::from(c) {
        flags |= CF;
    }
    AluResult { value: result, flags }
}

/// Compare: flags of `a - b`, X/Y copied from the operand, A unchanged.
#[must_use]
pub fn cp8(a: u8, b: u8) -> AluResult {
    let diff = sub8(a, b, false);
    AluResult {
        value: a,
        flags: (diff.flags & !(YF | XF)) | (b & (YF | XF)),
    }
}

/// Increment. The returned flags have C clear; callers keep the old C.
#[must_use]
pub fn inc8(value: u8) -> AluResult {
    let result = value.wrapping_add(1);
    let mut flags = sz53(result);
    if value & 0x0F == 0x0F {
        flags |= HF;
    }
    if value == 0x7F {
        flags |= PF;
    }
    AluResult { value: result, flags }
}

/// Decrement. The returned flags have C clear; callers keep the old C.
#[must_use]
pub fn dec8(value: u8) -> AluResult {
    let result = value.wrapping_sub(1);
    let mut flags = sz53(result) | NF;
    if value & 0x0F == 0 {
        flags |= HF;
    }
    if value == 0x80 {
        flags |= PF;
    }
    AluResult { value: result, flags }
}

/// Decimal adjust after BCD add or subtract.
#[must_use]
pub fn daa(a: u8, flags: u8) -> AluResult {
    let carry = flags & CF != 0;
    let half = flags & HF != 0;
    let subtract = flags & NF != 0;

    let mut correction = 0u8;
    let mut carry_out = carry;
    if half || a & 0x0F > 9 {
        correction |= 0x06;
    }
    if carry || a > 0x99 {
        correction |= 0x60;
        carry_out = true;
    }

    let result = if subtract {
        a.wrapping_sub(correction)
    } else {
        a.wrapping_add(correction)
    };

    let half_out = if subtract {
        half && a & 0x0F < 6
    } else {
        a & 0x0F > 9
    };

    let mut f = sz53p(result) | (flags & NF);
    if half_out {
        f |= HF;
    }
    if carry_out {
        f |= CF;
    }
    AluResult { value: result, flags: f }
}

/// `ADD HL,rr`: H from bit 11, C from bit 15, X/Y from the high byte.
/// S, Z and P/V are taken from `flags` unchanged.
#[must_use]
pub fn add16(a: u16, b: u16, flags: u8) -> (u16, u8) {
    let wide = u32::from(a) + u32::from(b);
    let result = wide as u16;

    let mut f = (flags & (SF | ZF | PF)) | ((result >> 8) as u8 & (YF | XF));
    if (a & 0x0FFF) + (b & 0x0FFF) > 0x0FFF {
        f |= HF;
    }
    if wide > 0xFFFF {
        f |= CF;
    }
    (result, f)
}

/// `ADC HL,rr`.
#[must_use]
pub fn adc16(a: u16, b: u16, carry: bool) -> (u16, u8) {
    let c = u16::from(carry);
    let wide = u32::from(a) + u32::from(b) + u32::from(c);
    let result = wide as u16;

    let mut f = flags16(result);
    if (a & 0x0FFF) + (b & 0x0FFF) + c > 0x0FFF {
        f |= HF;
    }
    if (a ^ b) & 0x8000 == 0 && (a ^ result) & 0x8000 != 0 {
        f |= PF;
    }
    if wide > 0xFFFF {
        f |= CF;
    }
    (result, f)
}

/// `SBC HL,rr`.
#[must_use]
pub fn sbc16(a: u16, b: u16, carry: bool) -> (u16, u8) {
    let c = u16::from(carry);
    let result = a.wrapping_sub(b).wrapping_sub(c);

    let mut f = flags16(result) | NF;
    if (a & 0x0FFF) < (b & 0x0FFF) + c {
        f |= HF;
    }
    if (a ^ b) & 0x8000 != 0 && (a ^ result) & 0x8000 != 0 {
        f |= PF;
    }
    if u32::from(a) < u32::from(b) + u32::from(c) {
        f |= CF;
    }
    (result, f)
}

fn flags16(result: u16) -> u8 {
    let high = (result >> 8) as u8;
    let mut f = high & (SF | YF | XF);
    if result == 0 {
        f |= ZF;
    }
    f
}
