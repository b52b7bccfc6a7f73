//! Z80 flag register bits.

/// Sign flag (bit 7) - copy of bit 7 of the result.
pub const SF: u8 = 0b1000_0000;

/// Zero flag (bit 6).
pub const ZF: u8 = 0b0100_0000;

/// Undocumented flag (bit 5) - copy of bit 5 of the result.
pub const YF: u8 = 0b0010_0000;

/// Half-carry flag (bit 4) - carry or borrow between bits 3 and 4.
pub const HF: u8 = 0b0001_0000;

/// Undocumented flag (bit 3) - copy of bit 3 of the result.
pub const XF: u8 = 0b0000_1000;

/// Parity/Overflow flag (bit 2).
pub const PF: u8 = 0b0000_0100;

/// Add/Subtract flag (bit 1) - set after a subtraction.
pub const NF: u8 = 0b0000_0010;

/// Carry flag (bit 0).
pub const CF: u8 = 0b0000_0001;

/// A named bit of the F register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Carry,
    Subtract,
    ParityOverflow,
    X,
    HalfCarry,
    Y,
    Zero,
    Sign,
}

impl Flag {
    pub const ALL: [Self; 8] = [
        Self::Carry,
        Self::Subtract,
        Self::ParityOverflow,
        Self::X,
        Self::HalfCarry,
        Self::Y,
        Self::Zero,
        Self::Sign,
    ];

    /// Bit position within F.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::Carry => 0,
            Self::Subtract => 1,
            Self::ParityOverflow => 2,
            Self::X => 3,
            Self::HalfCarry => 4,
            Self::Y => 5,
            Self::Zero => 6,
            Self::Sign => 7,
        }
    }

    #[must_use]
    pub const fn mask(self) -> u8 {
        1 << self.bit()
    }

    /// Short name used by the observability paths (`flags.z`, `flags.c`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Carry => "c",
            Self::Subtract => "n",
            Self::ParityOverflow => "p",
            Self::X => "x",
            Self::HalfCarry => "h",
            Self::Y => "y",
            Self::Zero => "z",
            Self::Sign => "s",
        }
    }
}

/// True if the byte has an even number of set bits.
#[must_use]
pub const fn parity(value: u8) -> bool {
    value.count_ones().is_multiple_of(2)
}

/// S, Z and the two undocumented copy bits for a result byte.
#[must_use]
pub const fn sz53(value: u8) -> u8 {
    let zero = if value == 0 { ZF } else { 0 };
    (value & (SF | YF | XF)) | zero
}

/// `sz53` plus even parity in P/V.
#[must_use]
pub const fn sz53p(value: u8) -> u8 {
    let pv = if parity(value) { PF } else { 0 };
    sz53(value) | pv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_match_constants() {
        assert_eq!(Flag::Carry.mask(), CF);
        assert_eq!(Flag::Subtract.mask(), NF);
        assert_eq!(Flag::ParityOverflow.mask(), PF);
        assert_eq!(Flag::X.mask(), XF);
        assert_eq!(Flag::HalfCarry.mask(), HF);
        assert_eq!(Flag::Y.mask(), YF);
        assert_eq!(Flag::Zero.mask(), ZF);
        assert_eq!(Flag::Sign.mask(), SF);
    }

    #[test]
    fn sz53p_table() {
        assert_eq!(sz53p(0x00), ZF | PF);
        assert_eq!(sz53p(0x80), SF);
        assert_eq!(sz53p(0x28), YF | XF | PF);
        assert_eq!(sz53p(0x01), 0);
    }
}
