//! An interpreter core for the chip8 instruction set, including the SUPER-CHIP and XO-CHIP
//! extensions. Display, keyboard, sound and the clock are supplied by the host through the traits
//! in [`devices`](devices).
pub mod chip8;
pub mod definitions;
pub mod devices;
pub mod opcode;
pub mod quirks;
pub mod timer;
mod error;

// reexporting for convinience
mod runner;
pub use chip8::Interpreter;
pub use error::*;
pub use quirks::Quirks;
pub use runner::*;
