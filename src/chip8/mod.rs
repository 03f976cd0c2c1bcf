//! The full implementation of the chip8 interpreter, from the opcodes to an option to pretty
//! print its state.
mod interpreter;
mod memory;
mod opcodes;
mod print;
mod stack;

/// reexport the interpreter for simpler usage
pub use interpreter::Interpreter;
use interpreter::WaitState;

/// split up tests into an other file for simpler implementation
#[cfg(test)]
mod tests;
