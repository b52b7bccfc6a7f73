//! Master System memory controller.
//!
//! Layout:
//! - $0000-$3FFF: slot 0, cartridge ROM page (first 1K fixed for the Sega mapper)
//! - $4000-$7FFF: slot 1, cartridge ROM page
//! - $8000-$BFFF: slot 2, cartridge ROM page or cartridge RAM bank
//! - $C000-$DFFF: 8K system RAM
//! - $E000-$FFFF: RAM mirror; $FFFC-$FFFF also latch the Sega mapper registers
//!
//! Two mapper variants exist. The Sega mapper pages through registers at the
//! top of the mirror. The Codemasters mapper latches a page whenever a slot's
//! first byte is written, and never maps RAM into slot 2.

use std::fmt;

use emu_core::{Bus, Observable, Value, parse_address};

/// Size of a cartridge ROM page and of a slot window.
pub const PAGE_SIZE: usize = 0x4000;

/// System RAM size. The window at $C000 is mirrored at $E000.
pub const RAM_SIZE: usize = 0x2000;

/// Cartridge RAM banks that can be mapped into slot 2.
pub const CART_RAM_BANKS: usize = 2;

/// Length of the copier header some dumps carry in front of the image.
const HEADER_SIZE: usize = 512;

/// The two little-endian checksum words examined by mapper detection.
const CHECKSUM_OFFSET: usize = 0x7FE6;

const RAM_START: u16 = 0xC000;
const RAM_CONTROL: u16 = 0xFFFC;

/// $FFFC bit 3: slot 2 maps cartridge RAM instead of ROM.
const RAM_ENABLE: u8 = 0x08;
/// $FFFC bits 1-0: cartridge RAM bank.
const RAM_BANK_SELECT: u8 = 0x03;

/// Below this address the Sega mapper always reads the start of the image.
const FIXED_REGION_END: u16 = 0x0400;

/// Page selects after reset, for slots 0, 1 and 2.
const RESET_PAGES: [u8; 3] = [0, 1, 2];

/// Bank-switching scheme of the inserted cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mapper {
    /// Sega mapper: control registers at $FFFC-$FFFF.
    #[default]
    Standard,
    /// Codemasters mapper: page latches at $0000, $4000 and $8000.
    Codemasters,
}

impl Mapper {
    /// Detect the mapper from a header-stripped image.
    ///
    /// Codemasters cartridges store a checksum and its complement at $7FE6
    /// and $7FE8, so the two words sum to zero modulo $10000. Images too
    /// short to hold the field use the Sega mapper.
    #[must_use]
    pub fn detect(image: &[u8]) -> Self {
        let Some(field) = image.get(CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4) else {
            return Self::Standard;
        };
        let checksum = u16::from_le_bytes([field[0], field[1]]);
        let complement = u16::from_le_bytes([field[2], field[3]]);

        if checksum.wrapping_add(complement) == 0 {
            Self::Codemasters
        } else {
            Self::Standard
        }
    }
}

impl fmt::Display for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "sega",
            Self::Codemasters => "codemasters",
        })
    }
}

/// Cartridge ROM, cartridge RAM, system RAM and the paging state.
pub struct MemoryController {
    /// Header-stripped cartridge image.
    cartridge: Vec<u8>,
    ram: Box<[u8; RAM_SIZE]>,
    cart_ram: Box<[[u8; PAGE_SIZE]; CART_RAM_BANKS]>,
    mapper: Mapper,
    /// Page selected for each of the three slots, already masked.
    pages: [u8; 3],
    /// Last value written to $FFFC (Sega mapper only).
    ram_control: u8,
    /// Significant page-select bits for the current image.
    page_mask: u8,
}

impl MemoryController {
    /// An empty controller: no cartridge, zeroed RAM, Sega mapper.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cartridge: Vec::new(),
            ram: Box::new([0; RAM_SIZE]),
            cart_ram: Box::new([[0; PAGE_SIZE]; CART_RAM_BANKS]),
            mapper: Mapper::Standard,
            pages: RESET_PAGES,
            ram_control: 0,
            page_mask: page_mask_for(0),
        }
    }

    /// Replace the cartridge image.
    ///
    /// A 512-byte copier header is dropped when the length is 512 more than a
    /// whole number of pages. The mapper is detected from the stripped image
    /// and the paging registers are reset. RAM is left untouched.
    pub fn load_cartridge(&mut self, data: &[u8]) {
        let has_header = data.len() % PAGE_SIZE == HEADER_SIZE;
        let image = if has_header { &data[HEADER_SIZE..] } else { data };

        self.cartridge = image.to_vec();
        self.mapper = Mapper::detect(&self.cartridge);
        self.page_mask = page_mask_for(self.cartridge.len());
        self.reset();

        log::debug!(
            "cartridge loaded: {} bytes, header {}, {} mapper",
            self.cartridge.len(),
            if has_header { "stripped" } else { "absent" },
            self.mapper
        );
    }

    /// The stored image, header already removed.
    #[must_use]
    pub fn dump_cartridge_data(&self) -> &[u8] {
        &self.cartridge
    }

    /// Return the paging registers to their power-on values.
    /// RAM and cartridge RAM keep their contents.
    pub fn reset(&mut self) {
        self.pages = RESET_PAGES.map(|page| page & self.page_mask);
        self.ram_control = 0;
    }

    /// Zero system RAM and both cartridge RAM banks.
    pub fn clear_ram(&mut self) {
        self.ram.fill(0);
        for bank in self.cart_ram.iter_mut() {
            bank.fill(0);
        }
    }

    #[must_use]
    pub fn mapper(&self) -> Mapper {
        self.mapper
    }

    /// Page currently selected for slot 0, 1 or 2.
    #[must_use]
    pub fn slot_page(&self, slot: usize) -> Option<u8> {
        self.pages.get(slot).copied()
    }

    /// Last value written to the RAM control register at $FFFC.
    #[must_use]
    pub fn ram_control(&self) -> u8 {
        self.ram_control
    }

    /// True when slot 2 maps cartridge RAM.
    #[must_use]
    pub fn slot2_is_ram(&self) -> bool {
        match self.mapper {
            Mapper::Standard => self.ram_control & RAM_ENABLE != 0,
            Mapper::Codemasters => false,
        }
    }

    /// Read without side effects.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        let offset = usize::from(address) % PAGE_SIZE;
        match address {
            0x0000..FIXED_REGION_END if self.mapper == Mapper::Standard => self.rom_byte(offset),
            0x0000..=0x3FFF => self.paged_rom(0, offset),
            0x4000..=0x7FFF => self.paged_rom(1, offset),
            0x8000..=0xBFFF if self.slot2_is_ram() => self.cart_ram[self.ram_bank()][offset],
            0x8000..=0xBFFF => self.paged_rom(2, offset),
            // The mirror, mapper register addresses included, reads RAM.
            0xC000..=0xFFFF => self.ram[ram_index(address)],
        }
    }

    /// Write a byte. ROM writes are ignored apart from the mapper latches.
    pub fn write(&mut self, address: u16, value: u8) {
        match (self.mapper, address) {
            (Mapper::Codemasters, 0x0000 | 0x4000 | 0x8000) => {
                self.select_page(usize::from(address >> 14), value);
            }
            (Mapper::Standard, 0x8000..=0xBFFF) if self.slot2_is_ram() => {
                let bank = self.ram_bank();
                self.cart_ram[bank][usize::from(address) % PAGE_SIZE] = value;
            }
            (_, 0x0000..=0xBFFF) => {}
            (_, RAM_START..=0xFFFF) => {
                self.ram[ram_index(address)] = value;
                if self.mapper == Mapper::Standard && address >= RAM_CONTROL {
                    self.write_register(address, value);
                }
            }
        }
    }

    /// Read with a wide address; anything past $FFFF reads 0.
    #[must_use]
    pub fn peek_wide(&self, address: u32) -> u8 {
        u16::try_from(address).map_or(0, |address| self.peek(address))
    }

    /// Write with a wide address; anything past $FFFF is ignored.
    pub fn write_wide(&mut self, address: u32, value: u8) {
        if let Ok(address) = u16::try_from(address) {
            self.write(address, value);
        }
    }

    fn write_register(&mut self, address: u16, value: u8) {
        log::trace!("mapper register {address:#06X} <- {value:#04X}");
        match address {
            RAM_CONTROL => self.ram_control = value,
            _ => self.select_page(usize::from(address - 0xFFFD), value),
        }
    }

    fn select_page(&mut self, slot: usize, value: u8) {
        if let Some(page) = self.pages.get_mut(slot) {
            *page = value & self.page_mask;
        }
    }

    fn ram_bank(&self) -> usize {
        usize::from(self.ram_control & RAM_BANK_SELECT) % CART_RAM_BANKS
    }

    fn paged_rom(&self, slot: usize, offset: usize) -> u8 {
        let page = usize::from(self.pages[slot]);
        self.rom_byte(page * PAGE_SIZE + offset)
    }

    /// Image byte, wrapping past the end. An empty image reads 0.
    fn rom_byte(&self, index: usize) -> u8 {
        match self.cartridge.len() {
            0 => 0,
            len => self.cartridge[index % len],
        }
    }
}

/// 6 page-select bits for images over 32K, otherwise 5.
fn page_mask_for(len: usize) -> u8 {
    if len > 2 * PAGE_SIZE { 0x3F } else { 0x1F }
}

fn ram_index(address: u16) -> usize {
    usize::from(address) % RAM_SIZE
}

impl Default for MemoryController {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for MemoryController {
    fn read(&mut self, address: u16) -> u8 {
        self.peek(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        MemoryController::write(self, address, value);
    }
}

/// All query paths supported by the memory controller.
const MEMORY_QUERY_PATHS: &[&str] = &[
    "mapper",
    "ram_control",
    "slot0",
    "slot1",
    "slot2",
    "slot2_ram",
    "cart_len",
    "<address>",
];

impl Observable for MemoryController {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "mapper" => Some(Value::String(self.mapper.to_string())),
            "ram_control" => Some(self.ram_control.into()),
            "slot0" => self.slot_page(0).map(Value::from),
            "slot1" => self.slot_page(1).map(Value::from),
            "slot2" => self.slot_page(2).map(Value::from),
            "slot2_ram" => Some(self.slot2_is_ram().into()),
            "cart_len" => Some((self.cartridge.len() as u64).into()),
            _ => parse_address(path).map(|address| Value::U8(self.peek(address))),
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        MEMORY_QUERY_PATHS
    }
}
