//! Single-bit helpers for register and flag manipulation.

/// True if bit `pos` of `value` is set.
#[must_use]
pub const fn is_bit_set(value: u8, pos: u8) -> bool {
    value & (1 << pos) != 0
}

/// `value` with bit `pos` set.
#[must_use]
pub const fn set_bit(value: u8, pos: u8) -> u8 {
    value | (1 << pos)
}

/// `value` with bit `pos` cleared.
#[must_use]
pub const fn clear_bit(value: u8, pos: u8) -> u8 {
    value & !(1 << pos)
}

/// `value` with bit `pos` set when `on`, cleared otherwise.
#[must_use]
pub const fn assign_bit(value: u8, pos: u8, on: bool) -> u8 {
    if on {
        set_bit(value, pos)
    } else {
        clear_bit(value, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_clear_round_trip() {
        assert_eq!(set_bit(0x00, 3), 0x08);
        assert_eq!(clear_bit(0xFF, 7), 0x7F);
        assert!(is_bit_set(0x80, 7));
        assert!(!is_bit_set(0x7F, 7));
    }

    #[test]
    fn assign_follows_flag() {
        assert_eq!(assign_bit(0x00, 0, true), 0x01);
        assert_eq!(assign_bit(0x01, 0, false), 0x00);
        assert_eq!(assign_bit(0x10, 4, true), 0x10);
    }
}
