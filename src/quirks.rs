//! The configurable compatibility switches.
//!
//! Over the years the different interpreters (COSMAC VIP, HP48 SUPER-CHIP, Octo / XO-CHIP)
//! disagreed about a couple of opcodes. Programs were written against one of them, so the
//! interpreter has to be told which behaviour a rom expects.

/// Selects between the historically divergent opcode behaviours.
///
/// The [`Default`] has every switch turned off.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    /// `8XY1`, `8XY2`, `8XY3`: if `false` `VF` is reset to `0`, if `true` `VF` is left alone.
    pub logic: bool,
    /// `8XY6`, `8XYE`: if `false` `VY` is shifted into `VX`, if `true` `VX` is shifted in place
    /// and `VY` is ignored.
    pub shift: bool,
    /// `8XY4` to `8XYE`: if `true` the flag is written into `VF` before the result is written
    /// into `VX`. Only observable if `X` is `F`.
    pub vf_order: bool,
    /// `BNNN`: if `false` the jump is offset by `V0`, if `true` by `VX` (`X` being the highest
    /// nibble of `NNN`).
    pub jump: bool,
    /// `FX55`, `FX65`: if `true` `I` is left pointing behind the last transferred byte.
    pub memory: bool,
    /// Forwarded to the display, if `true` sprites are clipped at the screen edges instead of
    /// wrapping around.
    pub clip: bool,
}

impl Quirks {
    /// The behaviour of the original COSMAC VIP interpreter.
    pub const CHIP8: Quirks = Quirks {
        logic: false,
        shift: false,
        vf_order: false,
        jump: false,
        memory: true,
        clip: true,
    };

    /// The behaviour of the HP48 SUPER-CHIP interpreter.
    pub const SUPER_CHIP: Quirks = Quirks {
        logic: true,
        shift: true,
        vf_order: false,
        jump: true,
        memory: false,
        clip: true,
    };

    /// The behaviour of Octo and the XO-CHIP extension.
    pub const XO_CHIP: Quirks = Quirks {
        logic: true,
        shift: false,
        vf_order: false,
        jump: false,
        memory: true,
        clip: false,
    };
}
