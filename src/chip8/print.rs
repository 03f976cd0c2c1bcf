//! The pretty print implementation written for the [`Interpreter`](super::Interpreter).
//! This implementation was split up into this file for smaller file sizes and higher
//! cohesion.

use std::fmt;

use once_cell::sync::Lazy;

use super::Interpreter;
use crate::{
    definitions::cpu,
    devices::{DisplayCommands, KeyboardCommands, SoundCommands, TimerCommands},
};

/// The amount of values printed per line, has to be bigger then 0
const HEX_PRINT_STEP: usize = 8;

const END_OF_LINE: char = '\n';
const INDENT_FILLAMENT: char = '\t';
const INDENT_SIZE: usize = 2;

/// Will add an indent post processing
fn indent_helper(text: &mut String, indent: usize) {
    for _ in 0..indent {
        text.push(INDENT_FILLAMENT);
    }
}

macro_rules! intformat {
    () => {
        // The formatted string will be 2 sysbols for the prefix (0x)
        // and 4 for the rest long.
        "{:#06X}"
    };
}

static POINTER_LEN: Lazy<usize> = Lazy::new(|| {
    let mut line = String::new();
    match pointer_print::formatter(&mut line, 0, 0) {
        Ok(()) => line.len(),
        Err(_) => 0,
    }
});

static INTEGER_LEN: Lazy<usize> = Lazy::new(|| {
    let mut line = String::new();
    match integer_print::formatter(&mut line, 0u8) {
        Ok(()) => line.len(),
        Err(_) => 0,
    }
});

/// a line length (This is a bit bigger then the actual line will be)
static LENLINE: Lazy<usize> =
    Lazy::new(|| INDENT_SIZE + HEX_PRINT_STEP * (*INTEGER_LEN + 1) + 1 + *POINTER_LEN);

/// Handles all the printing of the pointer values.
mod pointer_print {
    use std::fmt::{self, Write};

    /// will format the pointers according to definition
    pub(super) fn formatter(line: &mut String, from: usize, to: usize) -> fmt::Result {
        write!(line, concat!(intformat!(), " - ", intformat!(), " :"), from, to)
    }
}

/// handles printing of any and all of intergers.
mod integer_print {
    use super::{pointer_print, END_OF_LINE, HEX_PRINT_STEP};
    use std::fmt::{self, Write};

    pub(super) fn formatter<T>(line: &mut String, data: T) -> fmt::Result
    where
        T: fmt::UpperHex,
    {
        write!(line, intformat!(), data)
    }

    /// will pretty print all the integer data given, the offset is counted from the start of
    /// `data`
    pub(super) fn printer<T>(data: &[T], indent: usize) -> Result<String, fmt::Error>
    where
        T: fmt::UpperHex + Copy,
    {
        let mut res = String::with_capacity(*super::LENLINE * (data.len() / HEX_PRINT_STEP + 1));
        for (row, chunk) in data.chunks(HEX_PRINT_STEP).enumerate() {
            let from = row * HEX_PRINT_STEP;
            if from > 0 {
                res.push(END_OF_LINE);
            }

            super::indent_helper(&mut res, indent);
            pointer_print::formatter(&mut res, from, from + chunk.len() - 1)?;

            for entry in chunk {
                res.push(' ');
                formatter(&mut res, *entry)?;
            }
        }
        Ok(res)
    }
}

/// Handles the memory dump
mod memory_print {
    use super::{integer_print, pointer_print, END_OF_LINE, HEX_PRINT_STEP};
    use crate::definitions::memory;
    use once_cell::sync::Lazy;
    use std::fmt::{self, Write};

    /// The amount of bytes per row, as an opcode is made up of two bytes.
    const POINTER_INCREMENT: usize = HEX_PRINT_STEP * memory::opcodes::SIZE as usize;
    /// The values that are used when there are at lease two rows of zeros.
    const FILLER_BASE: &str = "...";

    /// The line that replaces rows of only zeros
    static ZERO_FILLER: Lazy<String> = Lazy::new(|| {
        let mut formatted = String::new();
        if integer_print::formatter(&mut formatted, 0u16).is_err() {
            return FILLER_BASE.to_string();
        }
        let length =
            formatted.len() * (HEX_PRINT_STEP - 2) + (HEX_PRINT_STEP - 1) - FILLER_BASE.len();
        let filler = " ".repeat(length / 2);
        format!(
            "{}{}{}{}{}",
            formatted, filler, FILLER_BASE, filler, formatted
        )
    });

    /// a single row of opcodes (only in this context)
    struct Row {
        from: usize,
        to: usize,
        data: [u16; HEX_PRINT_STEP],
        only_null: bool,
    }

    impl fmt::Display for Row {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut res = String::with_capacity(*super::LENLINE);
            pointer_print::formatter(&mut res, self.from, self.to)?;
            res.push(' ');

            if self.only_null {
                res.push_str(&ZERO_FILLER);
            } else {
                let words: Vec<String> = self
                    .data
                    .iter()
                    .map(|word| format!(intformat!(), word))
                    .collect();
                res.push_str(&words.join(" "));
            }
            write!(f, "{}", res)
        }
    }

    /// will pretty print the content of the raw memory, the offsets are counted from the start
    /// of `ram`. Consecutive rows of zeros are merged.
    pub(super) fn printer(ram: &[u8], indent: usize) -> Result<String, fmt::Error> {
        let mut rows: Vec<Row> = Vec::with_capacity(ram.len() / POINTER_INCREMENT + 1);

        for (index, chunk) in ram.chunks(POINTER_INCREMENT).enumerate() {
            let from = index * POINTER_INCREMENT;
            let mut data = [0; HEX_PRINT_STEP];
            for (word, pair) in data.iter_mut().zip(chunk.chunks(2)) {
                let low = pair.get(1).copied().unwrap_or_default();
                *word = u16::from_be_bytes([pair[0], low]);
            }

            let mut row = Row {
                from,
                to: from + chunk.len() - 1,
                only_null: data.iter().all(|word| *word == 0),
                data,
            };

            if row.only_null {
                if let Some(last) = rows.last() {
                    if last.only_null {
                        row.from = last.from;
                        rows.pop();
                    }
                }
            }
            rows.push(row);
        }

        let mut string = String::with_capacity(*super::LENLINE * rows.len());
        for (index, row) in rows.iter().enumerate() {
            if index > 0 {
                string.push(END_OF_LINE);
            }
            super::indent_helper(&mut string, indent);
            write!(string, "{}", row)?;
        }
        Ok(string)
    }
}

impl<D, T, K, S> fmt::Display for Interpreter<D, T, K, S>
where
    D: DisplayCommands,
    T: TimerCommands,
    K: KeyboardCommands,
    S: SoundCommands,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scalars = String::new();
        for (name, value) in [
            ("Program Counter", self.program_counter),
            ("Index Register", self.index_register),
            ("Stack Pointer", self.stack.pointer() as u16),
            ("Delay Timer", self.delay_timer as u16),
            ("Sound Timer", self.sound_timer as u16),
        ] {
            indent_helper(&mut scalars, INDENT_SIZE - 1);
            scalars.push_str(name);
            scalars.push_str(" : ");
            integer_print::formatter(&mut scalars, value)?;
            scalars.push(END_OF_LINE);
        }

        let mem = memory_print::printer(self.memory.as_slice(), INDENT_SIZE)?;

        // the stack is filled up to its full size
        let mut stack = [0u16; cpu::stack::SIZE];
        stack[..self.stack.pointer()].copy_from_slice(self.stack.as_slice());
        let sta = integer_print::printer(&stack, INDENT_SIZE)?;

        let reg = integer_print::printer(&self.registers, INDENT_SIZE)?;
        let flg = integer_print::printer(&self.user_flags, INDENT_SIZE)?;

        write!(
            f,
            "Interpreter {{\n\
                {}\
                \tHalted : {}\n\
                \tWaiting : {}\n\
                \tMemory :\n{}\n\
                \tStack :\n{}\n\
                \tRegister :\n{}\n\
                \tUser Flags :\n{}\n\
            }}",
            scalars,
            self.halted,
            self.is_waiting(),
            mem,
            sta,
            reg,
            flg
        )
    }
}
