use crate::{
    definitions::{cpu, display::fontset, memory},
    opcode::{self, Opcode},
    OpcodeError,
};

/// - `0x000-0x04F` - The built in `4x5` pixel font set (`0-F`)
/// - `0x050-0x0EF` - The built in `8x10` pixel font set (`0-F`)
/// - `0x200-0xFFF` - Program ROM and work RAM
#[derive(Clone)]
pub(super) struct Memory {
    ram: Box<[u8]>,
}

impl Memory {
    pub(super) fn new() -> Self {
        Self {
            ram: vec![0; memory::SIZE].into_boxed_slice(),
        }
    }

    /// Will zero the ram, write both fonts and place the rom at the program start.
    pub(super) fn reinitialize(&mut self, rom: &[u8]) {
        self.ram.iter_mut().for_each(|byte| *byte = 0);

        let small = fontset::LOCATION as usize;
        self.ram[small..(small + fontset::FONTSET.len())].copy_from_slice(&fontset::FONTSET);

        let big = fontset::BIG_LOCATION as usize;
        self.ram[big..(big + fontset::BIG_FONTSET.len())].copy_from_slice(&fontset::BIG_FONTSET);

        let start = cpu::PROGRAM_COUNTER as usize;
        self.ram[start..(start + rom.len())].copy_from_slice(rom);
    }

    /// Fetches the instruction word at `pointer`.
    pub(super) fn fetch(&self, pointer: u16) -> Result<Opcode, OpcodeError> {
        opcode::build_opcode(&self.ram, pointer as usize)
    }

    /// Checks whether the word at `pointer` is the first half of a `F000 NNNN`.
    pub(super) fn is_long_at(&self, pointer: u16) -> bool {
        matches!(self.fetch(pointer), Ok(memory::opcodes::LOAD_LONG))
    }

    pub(super) fn read(&self, address: u16) -> u8 {
        self.ram[wrap(address)]
    }

    pub(super) fn write(&mut self, address: u16, value: u8) {
        self.ram[wrap(address)] = value;
    }

    /// Copies `len` bytes starting at `address`, wrapping around the end of the ram.
    pub(super) fn read_range(&self, address: u16, len: usize) -> Vec<u8> {
        (0..len)
            .map(|offset| self.read(address.wrapping_add(offset as u16)))
            .collect()
    }

    pub(super) fn write_range(&mut self, address: u16, data: &[u8]) {
        for (offset, value) in data.iter().enumerate() {
            self.write(address.wrapping_add(offset as u16), *value);
        }
    }

    pub(super) fn as_slice(&self) -> &[u8] {
        &self.ram
    }
}

#[inline]
fn wrap(address: u16) -> usize {
    (address & memory::ADDRESS_MASK) as usize
}
