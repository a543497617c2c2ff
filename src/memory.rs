use log::debug;
use std::io;

// NB. addresses are u16 as per the chip-8, but only the low 12 bits ever reach
//     the byte array; lengths are usize to stop endless casting

/// Represents memory map, ROM, RAM etc.
pub trait MemoryMap {
    /// write a chunk of bytes into "RAM", stopping at the top of memory
    fn write(&mut self, data: &[u8], addr: u16) -> usize;

    /// get a single byte; addr is masked to the 12-bit address space
    fn get_byte(&self, addr: u16) -> u8;

    /// set a single byte; addr is masked to the 12-bit address space
    fn set_byte(&mut self, addr: u16, value: u8);

    /// get a big-endian two-byte word (instructions). the second byte of a
    /// word at 0xfff comes from 0x000
    fn get_word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.get_byte(addr), self.get_byte(addr.wrapping_add(1))])
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

const CHIP8_ADDR_MASK: u16 = 0x0fff;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// biggest program that fits between CHIP8_PROGRAM_ADDR and the top of RAM
pub const CHIP8_MAX_PROGRAM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// where the hex digit glyphs live, and how tall each one is
pub const CHIP8_FONT_ADDR: u16 = 0x000;
pub const CHIP8_GLYPH_BYTES: u16 = 5;

/// Defines the CHIP-8 memory map as seen by programs:
///   0x0000-0x004f  hex digit font
///   0x0050-0x01ff  free (traditionally the interpreter)
///   0x0200-0x0fff  program, data, scratch
///
/// the stack, timers and display live outside of addressable memory
pub struct Chip8MemoryMap {
    bytes: Box<[u8; CHIP8_RAM_SIZE_BYTES]>,
    pub program_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn write(&mut self, data: &[u8], addr: u16) -> usize {
        let a = (addr & CHIP8_ADDR_MASK) as usize;
        let len = data.len().min(CHIP8_RAM_SIZE_BYTES - a);
        self.bytes[a..(a + len)].copy_from_slice(&data[..len]);
        len
    }

    fn get_byte(&self, addr: u16) -> u8 {
        self.bytes[(addr & CHIP8_ADDR_MASK) as usize]
    }

    fn set_byte(&mut self, addr: u16, value: u8) {
        self.bytes[(addr & CHIP8_ADDR_MASK) as usize] = value;
    }
}

impl Chip8MemoryMap {
    /// initialises CHIP-8 memory: zeroed, with the font baked in
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: Box::new([0u8; CHIP8_RAM_SIZE_BYTES]),
            program_addr: CHIP8_PROGRAM_ADDR,
        };
        mm.write(&CHIP8_FONT, CHIP8_FONT_ADDR);
        mm
    }

    /// load a CHIP-8 program at 0x200. anything past the top of RAM is
    /// silently dropped
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, io::Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        let len = self.write(buf.as_slice(), self.program_addr);
        if len < buf.len() {
            debug!(
                "program is {} bytes; truncated to {}",
                buf.len(),
                CHIP8_MAX_PROGRAM_BYTES
            );
        }
        debug!("loaded {} bytes at {:03X}", len, self.program_addr);
        Ok(len)
    }

    /// address of the glyph for the low nibble of digit
    pub fn glyph_addr(digit: u8) -> u16 {
        CHIP8_FONT_ADDR + (digit & 0x0f) as u16 * CHIP8_GLYPH_BYTES
    }

    /// read n bytes starting at addr, wrapping at the top of memory (sprites)
    pub fn read_wrapping(&self, addr: u16, n: usize) -> Vec<u8> {
        (0..n)
            .map(|i| self.get_byte(addr.wrapping_add(i as u16)))
            .collect()
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
