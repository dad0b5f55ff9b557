use crate::error::Chip8Error;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the flat address space shared by font, program, stack and display
pub trait MemoryMap {
    /// write unknown len of data into memory at a particular address
    fn write_any(&mut self, reader: &mut dyn io::Read, addr: u16) -> Result<(), Chip8Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.write(buf.as_slice(), addr)
    }

    /// write a chunk of bytes into "RAM"; refuses anything that would run off the end
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), Chip8Error> {
        let max_size = self.size().saturating_sub(addr as usize);
        if data.len() > max_size {
            return Err(Chip8Error::ProgramTooLarge {
                size: data.len(),
                max_size,
                addr,
            });
        }
        self.get_rw_slice(addr, data.len()).copy_from_slice(data);
        Ok(())
    }

    /// get a two-byte big-endian word (opcodes, stack entries)
    fn get_word(&self, addr: u16) -> u16 {
        let lo = addr.checked_add(1).map_or(0, |a| self.read_byte(a));
        u16::from_be_bytes([self.read_byte(addr), lo])
    }

    /// single byte; anything past the end reads as zero
    fn read_byte(&self, addr: u16) -> u8 {
        if (addr as usize) < self.size() {
            self.get_ro_slice(addr, 1)[0]
        } else {
            0
        }
    }

    /// single byte; writes past the end are dropped. returns whether it landed
    fn write_byte(&mut self, addr: u16, value: u8) -> bool {
        if (addr as usize) < self.size() {
            self.get_rw_slice(addr, 1)[0] = value;
            true
        } else {
            false
        }
    }

    /// total addressable bytes
    fn size(&self) -> usize;

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8];

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8];
}

/// Defines the memory map this machine runs with (4K):
///   0x0000-0x004f  hex digit glyphs, 5 bytes each
///   0x0050-0x01ff  unused
///   0x0200-0x0e9f  program
///   0x0ea0-0x0eff  stack, grows upward two bytes per call
///   0x0f00-0x0fff  display, 32 rows of 8 bytes, msb is leftmost pixel
///
/// chip-8 programs *should* not touch the stack directly, but the display is
/// fair game: writing there is drawing
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
    pub stack_addr: u16,
    pub display_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn size(&self) -> usize {
        self.bytes.len()
    }
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8] {
        let a = addr as usize;
        &mut self.bytes[a..(a + len)]
    }
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8] {
        let a = addr as usize;
        &self.bytes[a..(a + len)]
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: u16 = 4096;

/// offsets from the top of RAM
const CHIP8_STACK_OFFSET: u16 = 0x0160;
const CHIP8_DISPLAY_OFFSET: u16 = 0x100;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// bottom of the stack; it grows upward toward the display
pub const CHIP8_STACK_ADDR: u16 = CHIP8_RAM_SIZE_BYTES - CHIP8_STACK_OFFSET;

/// each hex glyph is this many bytes (rows) tall
pub const CHIP8_GLYPH_BYTES: u16 = 5;

impl Chip8MemoryMap {
    /// initialises memory with the glyphs baked in and everything else zeroed
    pub fn new() -> Self {
        let mut bytes = vec![0u8; CHIP8_RAM_SIZE_BYTES as usize].into_boxed_slice();
        bytes[..CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        Chip8MemoryMap {
            bytes,
            program_addr: CHIP8_PROGRAM_ADDR,
            stack_addr: CHIP8_STACK_ADDR,
            display_addr: CHIP8_RAM_SIZE_BYTES - CHIP8_DISPLAY_OFFSET,
        }
    }

    /// load a CHIP-8 program at 0x200
    pub fn load_program(&mut self, reader: &mut dyn io::Read) -> Result<(), Chip8Error> {
        self.write_any(reader, self.program_addr)
    }

    /// dump the program region up to (not including) `end`, no header
    pub fn save_program(&self, writer: &mut dyn io::Write, end: u16) -> Result<usize, Chip8Error> {
        let end = (end as usize).min(self.size());
        let start = self.program_addr as usize;
        if end <= start {
            return Ok(0);
        }
        let len = end - start;
        writer.write_all(self.get_ro_slice(self.program_addr, len))?;
        Ok(len)
    }

    /// is `addr` inside the display region
    pub fn is_display(&self, addr: u16) -> bool {
        addr >= self.display_addr && (addr as usize) < self.size()
    }

    /// the framebuffer, 256 bytes
    pub fn display_slice(&self) -> &[u8] {
        self.get_ro_slice(self.display_addr, CHIP8_DISPLAY_OFFSET as usize)
    }

    /// zero every byte of the framebuffer
    pub fn clear_display(&mut self) {
        self.get_rw_slice(self.display_addr, CHIP8_DISPLAY_OFFSET as usize)
            .fill(0);
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
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
