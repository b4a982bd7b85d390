//! The addressable memory of the chip.
//!
//! - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
//! - `0x050-0x09F` - Used for the built in `4x5` pixel font set (`0-F`)
//! - `0x200-0xFFF` - Program ROM and work RAM
use crate::{
    definitions::{display::fontset, memory},
    opcode::{self, Opcode},
    MemoryError, OpcodeError,
};

/// Represents the full `4096` bytes of ram.
#[derive(Clone)]
pub struct Memory {
    cells: Box<[u8; memory::SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    /// Will create zeroed memory with the font already loaded.
    pub fn new() -> Self {
        let mut mem = Self {
            cells: Box::new([0; memory::SIZE]),
        };
        mem.load_font();
        mem
    }

    /// Will copy the font set into the interpreter area.
    pub fn load_font(&mut self) {
        self.cells[fontset::LOCATION..(fontset::LOCATION + fontset::FONTSET.len())]
            .copy_from_slice(&fontset::FONTSET);
    }

    /// Will zero the whole memory, the font set survives.
    pub fn reset(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = 0);
        self.load_font();
    }

    /// Will write the program into memory starting at `0x200`.
    ///
    /// Nothing is written if the program does not fit.
    ///
    /// # Example
    /// ```rust
    /// # use chip::memory::Memory;
    /// # use chip::MemoryError;
    /// let mut mem = Memory::new();
    /// assert!(mem.load_program(&[0x60, 0x05]).is_ok());
    /// assert_eq!(mem.read8(0x200), 0x60);
    /// assert_eq!(
    ///     mem.load_program(&[0; 0xE01]),
    ///     Err(MemoryError::ProgramTooLarge { len: 0xE01, max: 0xE00 })
    /// );
    /// ```
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        if program.len() > memory::PROGRAM_MAX_SIZE {
            return Err(MemoryError::ProgramTooLarge {
                len: program.len(),
                max: memory::PROGRAM_MAX_SIZE,
            });
        }

        let start = memory::PROGRAM_START;
        self.cells[start..]
            .iter_mut()
            .for_each(|cell| *cell = 0);
        self.cells[start..(start + program.len())].copy_from_slice(program);
        Ok(())
    }

    /// Reads a single byte.
    ///
    /// Panics if the address lies outside of the `4096` bytes.
    #[inline]
    pub fn read8(&self, address: u16) -> u8 {
        self.cells[address as usize]
    }

    /// Writes a single byte.
    ///
    /// Panics if the address lies outside of the `4096` bytes.
    #[inline]
    pub fn write8(&mut self, address: u16, value: u8) {
        self.cells[address as usize] = value;
    }

    /// Will fetch the big-endian opcode at the given address.
    pub fn fetch(&self, address: u16) -> Result<Opcode, OpcodeError> {
        opcode::build_opcode(&self.cells[..], address as usize)
    }

    /// Returns `len` bytes starting at `address`.
    pub fn slice(&self, address: u16, len: usize) -> Result<&[u8], MemoryError> {
        let range = Self::range(address, len)?;
        Ok(&self.cells[range])
    }

    /// Returns `len` writable bytes starting at `address`, the interpreter
    /// area can not be written by a program.
    pub fn slice_mut(&mut self, address: u16, len: usize) -> Result<&mut [u8], MemoryError> {
        let range = Self::range(address, len)?;
        if range.start < memory::PROGRAM_START {
            return Err(MemoryError::Reserved {
                address: range.start,
            });
        }
        Ok(&mut self.cells[range])
    }

    /// The complete raw memory.
    pub fn as_slice(&self) -> &[u8] {
        &self.cells[..]
    }

    fn range(address: u16, len: usize) -> Result<std::ops::Range<usize>, MemoryError> {
        let start = address as usize;
        let end = start + len;
        if end > memory::SIZE {
            Err(MemoryError::OutOfBounds { address: start, len })
        } else {
            Ok(start..end)
        }
    }
}
