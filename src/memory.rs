use crate::error::{Chip8Error, Result};
use std::io::{self, Read};
use tracing::debug;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the byte-addressable memory the interpreter runs against
pub trait MemoryMap {
    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]>;

    fn read_byte(&self, addr: u16) -> Result<u8> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<()> {
        self.get_rw_slice(addr, 1)?[0] = value;
        Ok(())
    }

    /// write a chunk of bytes into memory
    fn write(&mut self, data: &[u8], addr: u16) -> Result<()> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// get a big-endian two-byte word (instruction fetch)
    fn get_word(&self, addr: u16) -> Result<u16> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }
}

/// Defines the CHIP-8 memory map:
///   0x0000-0x004f  font sprites
///   0x0050-0x01ff  reserved
///   0x0200-0x0fff  program
///
/// the call stack, timers and display live outside of addressable memory
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        let a = addr as usize;
        check_range(a, len)?;
        Ok(&mut self.bytes[a..(a + len)])
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]> {
        let a = addr as usize;
        check_range(a, len)?;
        Ok(&self.bytes[a..(a + len)])
    }
}

fn check_range(addr: usize, len: usize) -> Result<()> {
    if addr + len > CHIP8_RAM_SIZE_BYTES {
        // report the first byte that doesn't exist
        return Err(Chip8Error::OutOfRange {
            addr: addr.max(CHIP8_RAM_SIZE_BYTES),
        });
    }
    Ok(())
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// the largest program that fits between 0x200 and the top of RAM
pub const CHIP8_MAX_PROGRAM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// glyph N starts at `CHIP8_FONT_ADDR + N * CHIP8_FONT_GLYPH_BYTES`
pub const CHIP8_FONT_ADDR: u16 = 0x000;
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8MemoryMap {
    /// zeroed RAM with the font baked in
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
        };
        mm.write_font();
        mm
    }

    fn write_font(&mut self) {
        let a = CHIP8_FONT_ADDR as usize;
        self.bytes[a..a + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
    }

    /// write the font, then the program at 0x200; rejects oversized programs
    /// before anything is touched
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > CHIP8_MAX_PROGRAM_BYTES {
            return Err(Chip8Error::CapacityExceeded {
                size: program.len(),
                max: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        self.write_font();
        self.write(program, CHIP8_PROGRAM_ADDR)?;
        debug!(len = program.len(), "loaded program");
        Ok(())
    }

    /// load a CHIP-8 program of unknown length from a reader
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<()> {
        // read one byte past the limit so oversized programs are caught
        // without buffering an arbitrarily large file
        let mut buf = Vec::with_capacity(CHIP8_MAX_PROGRAM_BYTES + 1);
        reader
            .take(CHIP8_MAX_PROGRAM_BYTES as u64 + 1)
            .read_to_end(&mut buf)?;
        self.load(&buf)
    }

    /// a r/w slice for instruction stores; everything below the program
    /// (font included) is read-only to the running program
    pub fn get_program_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        if addr < CHIP8_PROGRAM_ADDR {
            return Err(Chip8Error::OutOfRange {
                addr: addr as usize,
            });
        }
        self.get_rw_slice(addr, len)
    }

    /// zero everything and rewrite the font
    pub fn clear(&mut self) {
        self.bytes.fill(0);
        self.write_font();
    }
}

pub const CHIP8_FONT: [u8; 80] = [
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
