//! Opcode abstractions, functionality and constants.
use std::convert::{TryFrom, TryInto};

use crate::{OpcodeError, ProcessError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bytes
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bytes
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bytes
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bytes
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bytes
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last four bytes
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a single byte
const BYTE_SIZE: u16 = 0x8;

/// the size of a single nibble
const NIBBLE_SIZE: u16 = BYTE_SIZE / 2;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// # use chip::OpcodeError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # let err = OpcodeError::MemoryInvalid {pointer, len: SPLIT_OPCODE.len() };
/// # assert_eq!(
/// #    Err(err),
/// #    build_opcode(&SPLIT_OPCODE, pointer)
/// # );
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    // controlling that there is no illegal access here
    if pointer + 1 < data.len() {
        Ok(Opcode::from_be_bytes([data[pointer], data[pointer + 1]]))
    } else {
        Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        })
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// this is an opcode extractor that will return the
    /// family nibble form any opcode
    /// - `T` is the opcode type
    fn t(&self) -> u8;

    /// this is an opcode extractor for the opcode type `TNNN`
    /// - `T` is the opcode type
    /// - `NNN` is an address
    fn nnn(&self) -> u16;

    /// this is an opcode extractor for the opcode type `TXNN`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `NN` is a constant
    fn xnn(&self) -> (usize, u8);

    /// this is an opcode extractor for the opcode type `TXYN`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `Y` is a register index
    /// - `N` is a constant or opcode subtype
    fn xyn(&self) -> (usize, usize, u8);

    /// this is an opcode extractor for the opcode type `TXYT`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `Y` is a register index
    fn xy(&self) -> (usize, usize);

    /// this is an opcode extractor for the opcode type `TXTT`
    /// - `T` is the opcode type
    /// - `X` is a register index
    fn x(&self) -> usize;

    /// this is an opcode extractor for the lowest nibble `TTTN`
    fn n(&self) -> u8;
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> u8 {
        ((self & OPCODE_MASK_F000) >> (3 * NIBBLE_SIZE)) as u8
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> u16 {
        self & OPCODE_MASK_0FFF
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xnn(), (0xE, 0xDA));
    /// ```
    fn xnn(&self) -> (usize, u8) {
        let x = self.x();
        let nn = (self & OPCODE_MASK_00FF) as u8;
        (x, nn)
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, u8) {
        let (x, y) = self.xy();
        (x, y, self.n())
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xy(), (0xE, 0xD));
    /// ```
    fn xy(&self) -> (usize, usize) {
        let x = self.x();
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        let y = ((self & MASK) >> NIBBLE_SIZE) as usize;
        (x, y)
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> BYTE_SIZE) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.n(), 0xA);
    /// ```
    fn n(&self) -> u8 {
        (self & OPCODE_MASK_000F) as u8
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program steps that the chip
/// can take.
pub enum ProgramCounterStep {
    /// Will not change the program counter
    None,
    /// Will move the program counter to the next instruction
    Next,
    /// Will move the program counter over the next instruction, the distance depends on the
    /// width of the skipped instruction (`F000 NNNN` is four bytes long).
    Skip,
    /// Will move the program counter over the current four byte instruction.
    Long,
    /// Will simply move the program counter to the given location.
    Jump(u16),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }
}

/// Inner is an internally used wrapper used for the implTryInto
/// macro. It is primarly used for converting to the correct type, without
/// disturbing its namespace.
#[repr(transparent)]
struct TryIntoHandler<T>(T);

#[inline]
fn err<T>(value: Opcode) -> Result<T, OpcodeError> {
    Err(OpcodeError::InvalidOpcode(value))
}

#[inline]
fn try_into<To, From>(val: From, value: Opcode) -> Result<To, OpcodeError>
where
    From: TryInto<TryIntoHandler<To>>,
{
    let inner: TryIntoHandler<To> = val.try_into().or_else(|_| err(value))?;
    Ok(inner.0)
}

/// implTryInto is a macro responsible for creating the boilerplate code
/// needed for the opcode convertions.
macro_rules! implTryIntoInner {
    ( $type_name:ty : $type_from:ty : $inner:expr) => {
        impl TryFrom<$type_from> for TryIntoHandler<$type_name> {
            type Error = ();

            fn try_from(value: $type_from) -> Result<Self, Self::Error> {
                let inner = $inner(value)?;
                Ok(Self(inner))
            }
        }
    };
}

macro_rules! implTryIntoEnum {
    ($type_name:ty : $type_from:ty : $( $key:literal => $val:expr ),+ $(,)? ) => {
        implTryIntoInner!(
            $type_name : $type_from :
            |value: $type_from| {
                match value {
                    $(
                        $key => Ok($val),
                    )+
                    _ => Err(()),
                }
            }
        );
    };
}

macro_rules! implTryIntoXNN {
    ($type_name:ident) => {
        implTryIntoInner!(
            $type_name : Opcode :
            |value: Opcode| {
                let (x, nn) = value.xnn();
                Ok($type_name { x, nn })
            }
        );
    };
}

macro_rules! implTryIntoNNN {
    ($type_name:ident) => {
        implTryIntoInner! {
            $type_name: Opcode :
            |value: Opcode| {
                let nnn = value.nnn();
                Ok($type_name { nnn })
            }
        }
    };
}

macro_rules! implTryIntoXY0 {
    ($type_name:ident) => {
        implTryIntoInner! {
            $type_name: Opcode :
            |value: Opcode| {
                match value.xyn() {
                    (x, y, 0) => Ok($type_name { x, y }),
                    _ => Err(()),
                }
            }
        }
    };
}

macro_rules! implTryIntoXNNE {
    ($type_name:ident) => {
        implTryIntoInner! {
            $type_name: Opcode :
            |value: Opcode| {
                let (x, nn) = value.xnn();
                let ops = try_into(nn, value).map_err(|_| ())?;
                Ok($type_name { ops, x })
            }
        }
    };
}

macro_rules! implTryIntoXYN {
    ($type_name:ident) => {
        implTryIntoInner! {
            $type_name: Opcode :
            |value: Opcode| {
                let (x, y, n) = value.xyn();
                Ok($type_name { x, y, n })
            }
        }
    };
}

macro_rules! implTryIntoXYNE {
    ($type_name:ident) => {
        implTryIntoInner! {
            $type_name: Opcode :
            |value: Opcode| {
                let (x, y, n) = value.xyn();
                let ops = try_into(n, value).map_err(|_| ())?;
                Ok($type_name { ops, x, y })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zero {
    /// Halts the interpreter (an all zero word)
    Halt,
    /// Clears the display
    Clear,
    /// Returns from the subroutine
    Return,
    /// Scrolls the display down by `N` pixels
    ScrollDown(u8),
    /// Scrolls the display up by `N` pixels
    ScrollUp(u8),
    /// Scrolls the display right by four pixels
    ScrollRight,
    /// Scrolls the display left by four pixels
    ScrollLeft,
    /// Exits the interpreter
    Exit,
    /// Switches to the low resolution mode
    LowRes,
    /// Switches to the extended resolution mode
    HighRes,
}

implTryIntoInner!(Zero : Opcode :
    |value: Opcode| {
        match value {
            // 0000
            0x0000 => Ok(Zero::Halt),
            // 00CN
            0x00C0..=0x00CF => Ok(Zero::ScrollDown(value.n())),
            // 00DN
            0x00D0..=0x00DF => Ok(Zero::ScrollUp(value.n())),
            // 00E0
            0x00E0 => Ok(Zero::Clear),
            // 00EE
            0x00EE => Ok(Zero::Return),
            // 00FB
            0x00FB => Ok(Zero::ScrollRight),
            // 00FC
            0x00FC => Ok(Zero::ScrollLeft),
            // 00FD
            0x00FD => Ok(Zero::Exit),
            // 00FE
            0x00FE => Ok(Zero::LowRes),
            // 00FF
            0x00FF => Ok(Zero::HighRes),
            _ => Err(()),
        }
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct One {
    pub nnn: u16,
}

implTryIntoNNN!(One);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Two {
    pub nnn: u16,
}

implTryIntoNNN!(Two);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Three {
    pub x: usize,
    pub nn: u8,
}

implTryIntoXNN!(Three);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Four {
    pub x: usize,
    pub nn: u8,
}

implTryIntoXNN!(Four);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiveOpcode {
    Equal,
    SaveRange,
    LoadRange,
}

implTryIntoEnum!(FiveOpcode : u8 :
    // 5XY0
    // Skips the next instruction if VX equals VY.
    0x0 => FiveOpcode::Equal,
    // 5XY2
    // Stores VX to VY (in either direction) in memory starting at address I.
    0x2 => FiveOpcode::SaveRange,
    // 5XY3
    // Fills VX to VY (in either direction) from memory starting at address I.
    0x3 => FiveOpcode::LoadRange,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Five {
    pub ops: FiveOpcode,
    pub x: usize,
    pub y: usize,
}

implTryIntoXYNE!(Five);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Six {
    pub x: usize,
    pub nn: u8,
}

implTryIntoXNN!(Six);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seven {
    pub x: usize,
    pub nn: u8,
}

implTryIntoXNN!(Seven);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EightOpcode {
    Assign,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubReverse,
    ShiftLeft,
}

implTryIntoEnum!(EightOpcode : u8 :
    // 8XY0
    // Sets VX to the value of VY.
    0x0 => EightOpcode::Assign,
    // 8XY1
    // Sets VX to VX or VY. (Bitwise OR operation)
    0x1 => EightOpcode::Or,
    // 8XY2
    // Sets VX to VX and VY. (Bitwise AND operation)
    0x2 => EightOpcode::And,
    // 8XY3
    // Sets VX to VX xor VY.
    0x3 => EightOpcode::Xor,
    // 8XY4
    // Adds VY to VX. VF is set to 1 when there's a carry, and to 0 when there isn't.
    0x4 => EightOpcode::Add,
    // 8XY5
    // VY is subtracted from VX. VF is set to 0 when there's a borrow, and 1 when there
    // isn't.
    0x5 => EightOpcode::Sub,
    // 8XY6
    // Shifts VY (or VX) right by one into VX, the dropped bit lands in VF.
    0x6 => EightOpcode::ShiftRight,
    // 8XY7
    // Sets VX to VY minus VX. VF is set to 0 when there's a borrow, and 1 when there
    // isn't.
    0x7 => EightOpcode::SubReverse,
    // 8XYE
    // Shifts VY (or VX) left by one into VX, the dropped bit lands in VF.
    0xE => EightOpcode::ShiftLeft,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eight {
    pub ops: EightOpcode,
    pub x: usize,
    pub y: usize,
}

implTryIntoXYNE!(Eight);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nine {
    pub x: usize,
    pub y: usize,
}

implTryIntoXY0!(Nine);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ten {
    pub nnn: u16,
}

implTryIntoNNN!(Ten);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eleven {
    /// only used if the jump quirk is active
    pub x: usize,
    pub nnn: u16,
}

implTryIntoInner!(Eleven : Opcode :
    |value: Opcode| -> Result<Eleven, ()> {
        Ok(Eleven { x: value.x(), nnn: value.nnn() })
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Twelve {
    pub x: usize,
    pub nn: u8,
}

implTryIntoXNN!(Twelve);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thirteen {
    pub x: usize,
    pub y: usize,
    pub n: u8,
}

implTryIntoXYN!(Thirteen);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FourteenOpcode {
    Pressed,
    NotPressed,
}

implTryIntoEnum!(FourteenOpcode : u8 :
    // EX9E
    // Skips the next instruction if the key stored in VX is pressed. (Usually the next
    // instruction is a jump to skip a code block)
    0x9E => FourteenOpcode::Pressed,
    // EXA1
    // Skips the next instruction if the key stored in VX isn't pressed. (Usually the
    // next instruction is a jump to skip a code block)
    0xA1 => FourteenOpcode::NotPressed,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fourteen {
    pub ops: FourteenOpcode,
    pub x: usize,
}

implTryIntoXNNE!(Fourteen);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FifteenOpcode {
    LoadLong,
    SelectPlanes,
    GetDelayTimer,
    AwaitKeyPress,
    SetDelayTimer,
    SetSoundTimer,
    AddVxToI,
    SetIToSprite,
    SetIToBigSprite,
    StoreBCD,
    SetPitch,
    StoreV0ToVx,
    FillV0ToVx,
    SaveFlags,
    LoadFlags,
}

implTryIntoEnum!(FifteenOpcode : u8 :
    // F000 NNNN
    // Sets I to the sixteen bit address NNNN stored behind the opcode.
    0x00 => FifteenOpcode::LoadLong,
    // FN01
    // Selects the drawing planes by the bitmask N.
    0x01 => FifteenOpcode::SelectPlanes,
    // FX07
    // Sets VX to the value of the delay timer.
    0x07 => FifteenOpcode::GetDelayTimer,
    // FX0A
    // A key press is awaited, and then stored in VX. (Blocking Operation. All
    // instruction halted until next key event)
    0x0A => FifteenOpcode::AwaitKeyPress,
    // FX15
    // Sets the delay timer to VX.
    0x15 => FifteenOpcode::SetDelayTimer,
    // FX18
    // Sets the sound timer to VX.
    0x18 => FifteenOpcode::SetSoundTimer,
    // FX1E
    // Adds VX to I. VF is not affected.
    0x1E => FifteenOpcode::AddVxToI,
    // FX29
    // Sets I to the location of the sprite for the character in VX. Characters 0-F (in
    // hexadecimal) are represented by a 4x5 font.
    0x29 => FifteenOpcode::SetIToSprite,
    // FX30
    // Sets I to the location of the 8x10 sprite for the character in VX.
    0x30 => FifteenOpcode::SetIToBigSprite,
    // FX33
    // Stores the binary-coded decimal representation of VX at I, I+1 and I+2.
    0x33 => FifteenOpcode::StoreBCD,
    // FX3A
    // Sets the audio pitch register to VX.
    0x3A => FifteenOpcode::SetPitch,
    // FX55
    // Stores V0 to VX (including VX) in memory starting at address I.
    0x55 => FifteenOpcode::StoreV0ToVx,
    // FX65
    // Fills V0 to VX (including VX) with values from memory starting at address I.
    0x65 => FifteenOpcode::FillV0ToVx,
    // FX75
    // Stores V0 to VX (including VX) in the persistent user flags.
    0x75 => FifteenOpcode::SaveFlags,
    // FX85
    // Fills V0 to VX (including VX) from the persistent user flags.
    0x85 => FifteenOpcode::LoadFlags,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fifteen {
    pub ops: FifteenOpcode,
    pub x: usize,
}

implTryIntoInner!(Fifteen : Opcode :
    |value: Opcode| -> Result<Fifteen, ()> {
        let (x, nn) = value.xnn();
        let ops: FifteenOpcode = try_into(nn, value).map_err(|_| ())?;
        // the load long form only exists as F000
        if ops == FifteenOpcode::LoadLong && x != 0 {
            return Err(());
        }
        Ok(Fifteen { ops, x })
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcodes {
    Zero(Zero),
    One(One),
    Two(Two),
    Three(Three),
    Four(Four),
    Five(Five),
    Six(Six),
    Seven(Seven),
    Eight(Eight),
    Nine(Nine),
    A(Ten),
    B(Eleven),
    C(Twelve),
    D(Thirteen),
    E(Fourteen),
    F(Fifteen),
}

impl TryFrom<Opcode> for Opcodes {
    type Error = OpcodeError;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        let res = match value.t() {
            0x0 => Opcodes::Zero(try_into(value, value)?),
            0x1 => Opcodes::One(try_into(value, value)?),
            0x2 => Opcodes::Two(try_into(value, value)?),
            0x3 => Opcodes::Three(try_into(value, value)?),
            0x4 => Opcodes::Four(try_into(value, value)?),
            0x5 => Opcodes::Five(try_into(value, value)?),
            0x6 => Opcodes::Six(try_into(value, value)?),
            0x7 => Opcodes::Seven(try_into(value, value)?),
            0x8 => Opcodes::Eight(try_into(value, value)?),
            0x9 => Opcodes::Nine(try_into(value, value)?),
            0xA => Opcodes::A(try_into(value, value)?),
            0xB => Opcodes::B(try_into(value, value)?),
            0xC => Opcodes::C(try_into(value, value)?),
            0xD => Opcodes::D(try_into(value, value)?),
            0xE => Opcodes::E(try_into(value, value)?),
            0xF => Opcodes::F(try_into(value, value)?),
            _ => return err(value),
        };
        Ok(res)
    }
}

/// Represents a step of the program counter
/// this requires the enum ProgramCounterStep
/// to work.
pub trait ProgramCounter {
    /// will move the program counter forward by a step.
    fn step(&mut self, step: ProgramCounterStep);
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents a command from the interpreter up to the host.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// If the host shall, wait
    /// for the next key press
    Wait,
    /// The display was changed
    Draw,
    /// The interpreter stopped and will not run any further cycles
    Halt,
}

/// These are the traits that have to be full filled for a working opcode
/// table.
///
/// This trait requires the implementation of the [`ProgramCounter`](ProgramCounter) trait as the
/// step functionality is shared between all the opcodes.
pub trait ChipOpcodes: ProgramCounter {
    /// will calculate the programs step by a single step
    fn calc(&mut self, opcode: &Opcodes) -> Result<Operation, ProcessError> {
        let mut operation = Operation::None;
        let step_op = |(step, op): (ProgramCounterStep, Operation)| {
            operation = op;
            step
        };

        let step = match opcode {
            Opcodes::Zero(opcode) => self.zero(opcode).map(step_op),
            Opcodes::One(opcode) => self.one(opcode),
            Opcodes::Two(opcode) => self.two(opcode),
            Opcodes::Three(opcode) => self.three(opcode),
            Opcodes::Four(opcode) => self.four(opcode),
            Opcodes::Five(opcode) => self.five(opcode),
            Opcodes::Six(opcode) => self.six(opcode),
            Opcodes::Seven(opcode) => self.seven(opcode),
            Opcodes::Eight(opcode) => self.eight(opcode),
            Opcodes::Nine(opcode) => self.nine(opcode),
            Opcodes::A(opcode) => self.a(opcode),
            Opcodes::B(opcode) => self.b(opcode),
            Opcodes::C(opcode) => self.c(opcode),
            Opcodes::D(opcode) => self.d(opcode).map(step_op),
            Opcodes::E(opcode) => self.e(opcode),
            Opcodes::F(opcode) => self.f(opcode).map(step_op),
        }?;

        self.step(step);
        Ok(operation)
    }

    /// A multiuse opcode base for type `0NNN`
    ///
    /// - `0000` - Flow     - `halt`                - Halts the interpreter.
    /// - `00CN` - Display  - `scroll_down(N)`      - Scrolls the display down by `N` pixels.
    /// - `00DN` - Display  - `scroll_up(N)`        - Scrolls the display up by `N` pixels.
    /// - `00E0` - Display  - `disp_clear()`        - Clears the screen.
    /// - `00EE` - Flow     - `return;`             - Returns from a subroutine.
    /// - `00FB` - Display  - `scroll_right(4)`     - Scrolls the display right by `4` pixels.
    /// - `00FC` - Display  - `scroll_left(4)`      - Scrolls the display left by `4` pixels.
    /// - `00FD` - Flow     - `exit`                - Exits the interpreter.
    /// - `00FE` - Display  - `extended(false)`     - Switches to the low resolution mode.
    /// - `00FF` - Display  - `extended(true)`      - Switches to the extended resolution mode.
    ///
    /// Returns any possible error
    fn zero(&mut self, opcode: &Zero) -> Result<(ProgramCounterStep, Operation), ProcessError>;

    /// - `1NNN` - Flow     - `goto NNN;`           - Jumps to address `NNN`.
    ///
    /// Returns any possible error
    fn one(&self, opcode: &One) -> Result<ProgramCounterStep, ProcessError>;

    /// - `2NNN` - Flow     - `*(0xNNN)()`          - Calls subroutine at `NNN`.
    ///
    /// Returns any possible error
    fn two(&mut self, opcode: &Two) -> Result<ProgramCounterStep, ProcessError>;

    /// - `3XNN` - Cond    - `if(Vx==NN)`          - Skips the next instruction if `VX` equals `NN`.
    ///
    /// Returns any possible error
    fn three(&self, opcode: &Three) -> Result<ProgramCounterStep, ProcessError>;

    /// - `4XNN` - Cond     - `if(Vx!=NN)`          - Skips the next instruction if `VX` doesn't equal `NN`.
    ///
    /// Returns any possible error
    fn four(&self, opcode: &Four) -> Result<ProgramCounterStep, ProcessError>;

    /// A multiuse opcode base for type `5XYT` (T is a sub opcode)
    ///
    /// - `5XY0` - Cond     - `if(Vx==Vy)`          - Skips the next instruction if `VX` equals `VY`.
    /// - `5XY2` - MEM      - `save(Vx..Vy,&I)`     - Stores `VX` to `VY` in memory starting at `I`.
    /// - `5XY3` - MEM      - `load(Vx..Vy,&I)`     - Fills `VX` to `VY` from memory starting at `I`.
    ///
    /// Returns any possible error
    fn five(&mut self, opcode: &Five) -> Result<ProgramCounterStep, ProcessError>;

    /// - `6XNN` - Const    - `Vx = NN`             - Sets `VX` to `NN`.
    ///
    /// Returns any possible error
    fn six(&mut self, opcode: &Six) -> Result<ProgramCounterStep, ProcessError>;

    /// - `7XNN` - Const    - `Vx += NN`            - Adds `NN` to `VX`. (Carry flag is not changed)
    ///
    /// Returns any possible error
    fn seven(&mut self, opcode: &Seven) -> Result<ProgramCounterStep, ProcessError>;

    /// A mutiuse opcode base for type `8NNT` (T is a sub obcode)
    ///
    /// - `8XY0` - Assign   - `Vx=Vy`               - Sets `VX` to the value of `VY`.
    /// - `8XY1` - BitOp    - `Vx=Vx|Vy`            - Sets `VX` to `VX` or `VY`.
    /// - `8XY2` - BitOp    - `Vx=Vx&Vy`            - Sets `VX` to `VX` and `VY`.
    /// - `8XY3` - BitOp    - `Vx=Vx^Vy`            - Sets `VX` to `VX` xor `VY`.
    /// - `8XY4` - Math     - `Vx += Vy`            - Adds `VY` to `VX`. `VF` is set to `1` when there's a carry, and to `0` when there isn't.
    /// - `8XY5` - Math     - `Vx -= Vy`            - `VY` is subtracted from VX. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    /// - `8XY6` - BitOp    - `Vx=Vy>>1`            - Shifts `VY` right by `1` into `VX`, `VF` receives the dropped bit.
    /// - `8XY7` - Math     - `Vx=Vy-Vx`            - Sets `VX` to `VY` minus `VX`. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    /// - `8XYE` - BitOp    - `Vx=Vy<<1`            - Shifts `VY` left by `1` into `VX`, `VF` receives the dropped bit.
    ///
    /// Returns any possible error
    fn eight(&mut self, opcode: &Eight) -> Result<ProgramCounterStep, ProcessError>;

    /// - `9XY0` - Cond     - `if(Vx!=Vy)`          - Skips the next instruction if `VX` doesn't equal `VY`.
    ///
    /// Returns any possible error
    fn nine(&self, opcode: &Nine) -> Result<ProgramCounterStep, ProcessError>;

    /// - `ANNN` - MEM    - `I = NNN`             - Sets `I` to the address `NNN`.
    ///
    /// Returns any possible error
    fn a(&mut self, opcode: &Ten) -> Result<ProgramCounterStep, ProcessError>;

    /// - `BNNN` - Flow    - `PC=V0+NNN`           - Jumps to the address `NNN` plus `V0` (or `VX`).
    ///
    /// Returns any possible error
    fn b(&self, opcode: &Eleven) -> Result<ProgramCounterStep, ProcessError>;

    /// - `CXNN` - Rand     - `Vx=rand()&NN`        - Sets `VX` to the result of a bitwise and operation on a random number (Typically: `0 to 255`) and `NN`.
    ///
    /// Returns any possible error
    fn c(&mut self, opcode: &Twelve) -> Result<ProgramCounterStep, ProcessError>;

    /// - `DXYN` - Disp     - `draw(Vx,Vy,N)`       - Draws the `N` bytes (`32` if `N` is `0`) starting at `I` at coordinate `(VX, VY)`. `VF` is set to `1` if any screen pixels are flipped from set to unset when the sprite is drawn, and to `0` if that doesn’t happen
    ///
    /// Returns any possible error
    fn d(&mut self, opcode: &Thirteen) -> Result<(ProgramCounterStep, Operation), ProcessError>;

    /// A multiuse opcode base for type `EXTT` (T is a sub opcode)
    ///
    /// - `EX9E` - KeyOp    - `if(key()==Vx)`       - Skips the next instruction if the key stored in `VX` is pressed.
    /// - `EXA1` - KeyOp    - `if(key()!=Vx)`       - Skips the next instruction if the key stored in `VX` isn't pressed.
    ///
    /// Returns any possible error
    fn e(&self, opcode: &Fourteen) -> Result<ProgramCounterStep, ProcessError>;

    /// A multiuse opcode base for type `FXTT` (T is a sub opcode)
    ///
    /// - `F000` - MEM      - `I = NNNN`            - Sets `I` to the `16` bit address stored behind the opcode.
    /// - `FN01` - Display  - `planes(N)`           - Selects the drawing planes.
    /// - `FX07` - Timer    - `Vx = get_delay()`    - Sets `VX` to the value of the delay timer.
    /// - `FX0A` - KeyOp    - `Vx = get_key()`      - A key press is awaited, and then stored in `VX`. (All instruction halted until next key event)
    /// - `FX15` - Timer    - `delay_timer(Vx)`     - Sets the delay timer to `VX`.
    /// - `FX18` - Sound    - `sound_timer(Vx)`     - Sets the sound timer to `VX`.
    /// - `FX1E` - MEM      - `I +=Vx`              - Adds `VX` to `I`. `VF` is not affected.
    /// - `FX29` - MEM      - `I=sprite_addr[Vx]`   - Sets `I` to the location of the sprite for the character in `VX`.
    /// - `FX30` - MEM      - `I=big_addr[Vx]`      - Sets `I` to the location of the `8x10` sprite for the character in `VX`.
    /// - `FX33` - BCD      - `246 / 100 => 2` `246 / 10 => 24 % 10 => 4` `246 % 10 => 6` - Stores the [binary-coded decimal](https://en.wikipedia.org/wiki/Binary-coded_decimal) representation of `VX` at `I`, `I+1` and `I+2`.
    /// - `FX3A` - Sound    - `pitch(Vx)`           - Sets the playback pitch.
    /// - `FX55` - MEM      - `reg_dump(Vx,&I)`     - Stores `V0` to `VX`  (including `VX`) in memory starting at address `I`.
    /// - `FX65` - MEM      - `reg_load(Vx,&I)`     - Fills `V0` to `VX` (including `VX`) with values from memory starting at address `I`.
    /// - `FX75` - MEM      - `flags_dump(Vx)`      - Stores `V0` to `VX` in the persistent user flags.
    /// - `FX85` - MEM      - `flags_load(Vx)`      - Fills `V0` to `VX` from the persistent user flags.
    ///
    /// Returns any possible error
    fn f(&mut self, opcode: &Fifteen) -> Result<(ProgramCounterStep, Operation), ProcessError>;
}
