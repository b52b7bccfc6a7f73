//! Memory and I/O bus interface.

/// Memory and I/O bus interface.
///
/// The CPU accesses memory and ports through this trait. The bus handles
/// address decoding and routing (paging, mirroring, mapper registers).
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);

    /// Read a little-endian word. The high byte address wraps at `0xFFFF`.
    fn read_word(&mut self, address: u16) -> u16 {
        let lo = self.read(address);
        let hi = self.read(address.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    /// Write a little-endian word. The high byte address wraps at `0xFFFF`.
    fn write_word(&mut self, address: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(address, lo);
        self.write(address.wrapping_add(1), hi);
    }

    /// Read from an I/O port. Nothing is attached by default: open bus.
    fn io_read(&mut self, _port: u16) -> u8 {
        0xFF
    }

    /// Write to an I/O port. Dropped by default.
    fn io_write(&mut self, _port: u16, _value: u8) {}
}

/// Flat 64KB RAM with no decoding. Used by CPU tests.
pub struct SimpleBus {
    ram: Box<[u8; 0x10000]>,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x10000]),
        }
    }

    /// Copy `data` into RAM starting at `address`, wrapping at the top.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.ram[usize::from(address.wrapping_add(i as u16))] = byte;
        }
    }

    /// Read without going through the trait.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address)] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_access_is_little_endian() {
        let mut bus = SimpleBus::new();
        bus.load(0x1000, &[0x34, 0x12]);
        assert_eq!(bus.read_word(0x1000), 0x1234);

        bus.write_word(0x2000, 0xBEEF);
        assert_eq!(bus.peek(0x2000), 0xEF);
        assert_eq!(bus.peek(0x2001), 0xBE);
    }

    #[test]
    fn word_access_wraps_at_top_of_memory() {
        let mut bus = SimpleBus::new();
        bus.load(0xFFFF, &[0xCD, 0xAB]);
        assert_eq!(bus.peek(0x0000), 0xAB);
        assert_eq!(bus.read_word(0xFFFF), 0xABCD);
    }

    #[test]
    fn ports_float_high() {
        let mut bus = SimpleBus::new();
        assert_eq!(bus.io_read(0x00BE), 0xFF);
        bus.io_write(0x00BE, 0x12);
        assert_eq!(bus.io_read(0x00BE), 0xFF);
    }
}
