/// The definitions

pub mod memory {
    /// The size of the chipset ram
    pub const SIZE: usize = 0x1000; // 4096

    /// Used to wrap any address derived from the index register into the ram.
    pub const ADDRESS_MASK: u16 = (SIZE - 1) as u16;

    /// opcode information
    pub mod opcodes {
        /// The step used for calculating the program counter increments
        pub const SIZE: u16 = 2;
        /// The size of the only four byte instruction `F000 NNNN`
        pub const LONG_SIZE: u16 = 2 * SIZE;
        /// The first word of the four byte instruction `F000 NNNN`
        pub const LOAD_LONG: u16 = 0xF000;
    }
}

/// The definitions for the cpu
pub mod cpu {
    /// The starting point for the program
    pub const PROGRAM_COUNTER: u16 = 0x0200;
    /// The amount of instructions that are run per rendered frame, if nothing else is
    /// configured.
    pub const TICKS_PER_FRAME: usize = 8;

    /// The definitions needed for the register
    pub mod register {
        /// The size of the chip set registers
        pub const SIZE: usize = 16;
        /// The last entry of the registers
        pub const LAST: usize = SIZE - 1;
    }

    /// The stack definitions
    pub mod stack {
        /// The count of nesting entries
        pub const SIZE: usize = 16;
    }

    /// The persistent user flags (`FX75` / `FX85`)
    pub mod flags {
        /// The amount of flag bytes that survive a reset
        pub const SIZE: usize = 16;
    }
}

/// The rom definitions
pub mod rom {
    use super::{cpu, memory};

    /// The largest rom that fits behind the program start.
    pub const MAX_SIZE: usize = memory::SIZE - cpu::PROGRAM_COUNTER as usize;
}

/// The timer definitions
pub mod timer {
    /// The amount of hertz the clocks run at
    pub const HERTZ: u64 = 60;
    /// The amount of milliseconds between two timer ticks
    pub const INTERVAL: u64 = 1000 / HERTZ;
}

pub mod sound {
    /// The frequency used until the program or the host changes it
    pub const FREQUENCY: f32 = 440.0;
    /// The volume used until the host changes it
    pub const VOLUME: f32 = 0.5;
    /// The base frequency of the `FX3A` pitch register
    pub const PITCH_BASE: f32 = 4000.0;
    /// The pitch register value that plays exactly at the base frequency
    pub const PITCH_CENTER: f32 = 64.0;
    /// The amount of pitch steps per octave
    pub const PITCH_OCTAVE: f32 = 48.0;
}

/// The display definitions
pub mod display {
    /// The amount the `00FB` and `00FC` opcodes scroll by
    pub const SCROLL_SIDEWAYS: u8 = 4;
    /// The amount of bytes a wide (`16x16`) sprite takes up
    pub const WIDE_SPRITE: usize = 32;

    /// The fontset information
    pub mod fontset {
        /// Is the location of the beginning to the font in memory, starting at zero means
        /// `FX29` can simply multiply.
        pub const LOCATION: u16 = 0x000;
        /// The amount of bytes a single glyph needs
        pub const GLYPH_SIZE: u16 = 5;
        /// The font set character to be rendered on the screen
        pub const FONTSET: [u8; 80] = [
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

        /// Is the location of the high resolution font, directly behind the small one
        pub const BIG_LOCATION: u16 = LOCATION + FONTSET.len() as u16;
        /// The amount of bytes a single high resolution glyph needs
        pub const BIG_GLYPH_SIZE: u16 = 10;
        /// The `8x10` font used by `FX30`
        pub const BIG_FONTSET: [u8; 160] = [
            0xFF, 0xFF, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xFF, 0xFF, // 0
            0x18, 0x78, 0x78, 0x18, 0x18, 0x18, 0x18, 0x18, 0xFF, 0xFF, // 1
            0xFF, 0xFF, 0x03, 0x03, 0xFF, 0xFF, 0xC0, 0xC0, 0xFF, 0xFF, // 2
            0xFF, 0xFF, 0x03, 0x03, 0xFF, 0xFF, 0x03, 0x03, 0xFF, 0xFF, // 3
            0xC3, 0xC3, 0xC3, 0xC3, 0xFF, 0xFF, 0x03, 0x03, 0x03, 0x03, // 4
            0xFF, 0xFF, 0xC0, 0xC0, 0xFF, 0xFF, 0x03, 0x03, 0xFF, 0xFF, // 5
            0xFF, 0xFF, 0xC0, 0xC0, 0xFF, 0xFF, 0xC3, 0xC3, 0xFF, 0xFF, // 6
            0xFF, 0xFF, 0x03, 0x03, 0x06, 0x0C, 0x18, 0x18, 0x18, 0x18, // 7
            0xFF, 0xFF, 0xC3, 0xC3, 0xFF, 0xFF, 0xC3, 0xC3, 0xFF, 0xFF, // 8
            0xFF, 0xFF, 0xC3, 0xC3, 0xFF, 0xFF, 0x03, 0x03, 0xFF, 0xFF, // 9
            0x7E, 0xFF, 0xC3, 0xC3, 0xC3, 0xFF, 0xFF, 0xC3, 0xC3, 0xC3, // A
            0xFC, 0xFC, 0xC3, 0xC3, 0xFC, 0xFC, 0xC3, 0xC3, 0xFC, 0xFC, // B
            0x3C, 0xFF, 0xC3, 0xC0, 0xC0, 0xC0, 0xC0, 0xC3, 0xFF, 0x3C, // C
            0xFC, 0xFE, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xFE, 0xFC, // D
            0xFF, 0xFF, 0xC0, 0xC0, 0xFF, 0xFF, 0xC0, 0xC0, 0xFF, 0xFF, // E
            0xFF, 0xFF, 0xC0, 0xC0, 0xFF, 0xFF, 0xC0, 0xC0, 0xC0, 0xC0, // F
        ];
    }
}

/// The definitions needed for correct keyboard definitions.
pub mod keyboard {
    /// all the different keyboard entries
    pub const SIZE: usize = 16;
}
