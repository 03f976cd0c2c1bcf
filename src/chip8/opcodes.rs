use crate::{
    definitions::{cpu, display, memory::opcodes, sound},
    devices::{DisplayCommands, KeyboardCommands, SoundCommands, TimerCommands},
    opcode::{
        ChipOpcodes, Eight, EightOpcode, Eleven, Fifteen, FifteenOpcode, Five, FiveOpcode, Four,
        Fourteen, FourteenOpcode, Nine, One, Operation, ProgramCounterStep, Seven, Six, Ten,
        Thirteen, Three, Twelve, Two, Zero,
    },
    ProcessError,
};

use super::{Interpreter, WaitState};

impl<D, T, K, S> Interpreter<D, T, K, S>
where
    D: DisplayCommands,
    T: TimerCommands,
    K: KeyboardCommands,
    S: SoundCommands,
{
    /// Writes an ALU result and its flag, the order is selected by the `vf_order` quirk.
    fn write_with_flag(&mut self, x: usize, value: u8, flag: u8) {
        if self.quirks.vf_order {
            self.registers[cpu::register::LAST] = flag;
            self.registers[x] = value;
        } else {
            self.registers[x] = value;
            self.registers[cpu::register::LAST] = flag;
        }
    }

    /// The registers `VX` to `VY`, walking downwards if `X` is bigger.
    fn register_range(x: usize, y: usize) -> Vec<usize> {
        if x <= y {
            (x..=y).collect()
        } else {
            (y..=x).rev().collect()
        }
    }
}

impl<D, T, K, S> ChipOpcodes for Interpreter<D, T, K, S>
where
    D: DisplayCommands,
    T: TimerCommands,
    K: KeyboardCommands,
    S: SoundCommands,
{
    fn zero(&mut self, opcode: &Zero) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        let op = match *opcode {
            Zero::Halt | Zero::Exit => {
                // 0000 / 00FD
                log::debug!("Program requested {:?}.", opcode);
                self.halt();
                Operation::Halt
            }
            Zero::Clear => {
                // 00E0
                self.display.clear();
                Operation::Draw
            }
            Zero::Return => {
                // 00EE
                // Return from sub routine => pop from stack
                let pc = self.stack.pop()?;
                return Ok((ProgramCounterStep::Jump(pc), Operation::None));
            }
            Zero::ScrollDown(n) => {
                // 00CN
                self.display.scroll_down(n);
                Operation::Draw
            }
            Zero::ScrollUp(n) => {
                // 00DN
                self.display.scroll_up(n);
                Operation::Draw
            }
            Zero::ScrollRight => {
                // 00FB
                self.display.scroll_right(display::SCROLL_SIDEWAYS);
                Operation::Draw
            }
            Zero::ScrollLeft => {
                // 00FC
                self.display.scroll_left(display::SCROLL_SIDEWAYS);
                Operation::Draw
            }
            Zero::LowRes | Zero::HighRes => {
                // 00FE / 00FF
                self.display.set_extended(*opcode == Zero::HighRes);
                Operation::Draw
            }
        };
        Ok((ProgramCounterStep::Next, op))
    }

    fn one(&self, opcode: &One) -> Result<ProgramCounterStep, ProcessError> {
        // 1NNN
        Ok(ProgramCounterStep::Jump(opcode.nnn))
    }

    fn two(&mut self, opcode: &Two) -> Result<ProgramCounterStep, ProcessError> {
        // 2NNN
        // Calls subroutine at NNN, the return address is the opcode after the call
        self.stack
            .push(self.program_counter.wrapping_add(opcodes::SIZE))?;
        Ok(ProgramCounterStep::Jump(opcode.nnn))
    }

    fn three(&self, opcode: &Three) -> Result<ProgramCounterStep, ProcessError> {
        // 3XNN
        Ok(ProgramCounterStep::cond(self.registers[opcode.x] == opcode.nn))
    }

    fn four(&self, opcode: &Four) -> Result<ProgramCounterStep, ProcessError> {
        // 4XNN
        Ok(ProgramCounterStep::cond(self.registers[opcode.x] != opcode.nn))
    }

    fn five(&mut self, opcode: &Five) -> Result<ProgramCounterStep, ProcessError> {
        let Five { ops, x, y } = *opcode;
        match ops {
            FiveOpcode::Equal => {
                // 5XY0
                return Ok(ProgramCounterStep::cond(
                    self.registers[x] == self.registers[y],
                ));
            }
            FiveOpcode::SaveRange => {
                // 5XY2
                for (offset, register) in Self::register_range(x, y).into_iter().enumerate() {
                    let address = self.index_register.wrapping_add(offset as u16);
                    self.memory.write(address, self.registers[register]);
                }
            }
            FiveOpcode::LoadRange => {
                // 5XY3
                for (offset, register) in Self::register_range(x, y).into_iter().enumerate() {
                    let address = self.index_register.wrapping_add(offset as u16);
                    self.registers[register] = self.memory.read(address);
                }
            }
        }
        Ok(ProgramCounterStep::Next)
    }

    fn six(&mut self, opcode: &Six) -> Result<ProgramCounterStep, ProcessError> {
        // 6XNN
        self.registers[opcode.x] = opcode.nn;
        Ok(ProgramCounterStep::Next)
    }

    fn seven(&mut self, opcode: &Seven) -> Result<ProgramCounterStep, ProcessError> {
        // 7XNN
        // let VX overflow, but ignore carry
        self.registers[opcode.x] = self.registers[opcode.x].wrapping_add(opcode.nn);
        Ok(ProgramCounterStep::Next)
    }

    fn eight(&mut self, opcode: &Eight) -> Result<ProgramCounterStep, ProcessError> {
        let Eight { ops, x, y } = *opcode;
        let vx = self.registers[x];
        let vy = self.registers[y];
        // the shift source
        let vs = if self.quirks.shift { vx } else { vy };

        match ops {
            EightOpcode::Assign => self.registers[x] = vy,
            EightOpcode::Or | EightOpcode::And | EightOpcode::Xor => {
                self.registers[x] = match ops {
                    EightOpcode::Or => vx | vy,
                    EightOpcode::And => vx & vy,
                    _ => vx ^ vy,
                };
                if !self.quirks.logic {
                    self.registers[cpu::register::LAST] = 0;
                }
            }
            EightOpcode::Add => {
                let (res, carry) = vx.overflowing_add(vy);
                self.write_with_flag(x, res, carry as u8);
            }
            EightOpcode::Sub => {
                let (res, borrow) = vx.overflowing_sub(vy);
                self.write_with_flag(x, res, !borrow as u8);
            }
            EightOpcode::SubReverse => {
                let (res, borrow) = vy.overflowing_sub(vx);
                self.write_with_flag(x, res, !borrow as u8);
            }
            EightOpcode::ShiftRight => self.write_with_flag(x, vs >> 1, vs & 0x01),
            EightOpcode::ShiftLeft => self.write_with_flag(x, vs << 1, vs >> 7),
        }
        Ok(ProgramCounterStep::Next)
    }

    fn nine(&self, opcode: &Nine) -> Result<ProgramCounterStep, ProcessError> {
        // 9XY0
        Ok(ProgramCounterStep::cond(
            self.registers[opcode.x] != self.registers[opcode.y],
        ))
    }

    fn a(&mut self, opcode: &Ten) -> Result<ProgramCounterStep, ProcessError> {
        // ANNN
        self.index_register = opcode.nnn;
        Ok(ProgramCounterStep::Next)
    }

    fn b(&self, opcode: &Eleven) -> Result<ProgramCounterStep, ProcessError> {
        // BNNN
        let offset = if self.quirks.jump {
            self.registers[opcode.x]
        } else {
            self.registers[0]
        };
        Ok(ProgramCounterStep::Jump(
            opcode.nnn.wrapping_add(offset as u16),
        ))
    }

    fn c(&mut self, opcode: &Twelve) -> Result<ProgramCounterStep, ProcessError> {
        // CXNN
        // using a fill bytes call here, as the trait RngCore does not
        // support random u8.
        let mut rand = [0u8; 1];
        self.rng.fill_bytes(&mut rand);
        self.registers[opcode.x] = opcode.nn & rand[0];
        Ok(ProgramCounterStep::Next)
    }

    fn d(&mut self, opcode: &Thirteen) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        // DXYN
        // The sprite is read from I onwards, I is left unchanged. DXY0 draws a 16x16 sprite.
        let wide = opcode.n == 0;
        let len = if wide {
            display::WIDE_SPRITE
        } else {
            opcode.n as usize
        };

        let sprite = self.memory.read_range(self.index_register, len);
        let collided = self.display.draw_sprite(
            &sprite,
            self.registers[opcode.x],
            self.registers[opcode.y],
            wide,
        );
        self.registers[cpu::register::LAST] = collided as u8;

        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    fn e(&self, opcode: &Fourteen) -> Result<ProgramCounterStep, ProcessError> {
        let pressed = self.keyboard.is_pressed(self.registers[opcode.x] & 0xF);
        let step = match opcode.ops {
            // EX9E
            FourteenOpcode::Pressed => ProgramCounterStep::cond(pressed),
            // EXA1
            FourteenOpcode::NotPressed => ProgramCounterStep::cond(!pressed),
        };
        Ok(step)
    }

    fn f(&mut self, opcode: &Fifteen) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        let x = opcode.x;
        let mut op = Operation::None;
        let mut pcs = ProgramCounterStep::Next;
        match opcode.ops {
            FifteenOpcode::LoadLong => {
                // F000 NNNN
                self.index_register = self
                    .memory
                    .fetch(self.program_counter.wrapping_add(opcodes::SIZE))?;
                pcs = ProgramCounterStep::Long;
            }
            FifteenOpcode::SelectPlanes => {
                // FN01
                self.display.set_plane_bitmask(x as u8);
            }
            FifteenOpcode::GetDelayTimer => {
                // FX07
                self.registers[x] = self.delay_timer;
            }
            FifteenOpcode::AwaitKeyPress => {
                // FX0A
                // don't change the counter until the key arrived.
                let pending = self.keyboard.wait_key();
                self.wait = WaitState::Waiting {
                    register: x,
                    pending,
                };
                log::debug!("Waiting for a key for V{:X}.", x);
                op = Operation::Wait;
                pcs = ProgramCounterStep::None;
            }
            FifteenOpcode::SetDelayTimer => {
                // FX15
                self.delay_timer = self.registers[x];
            }
            FifteenOpcode::SetSoundTimer => {
                // FX18
                self.sound_timer = self.registers[x];
            }
            FifteenOpcode::AddVxToI => {
                // FX1E
                // VF is not affected.
                self.index_register = self
                    .index_register
                    .wrapping_add(self.registers[x] as u16);
            }
            FifteenOpcode::SetIToSprite => {
                // FX29
                self.index_register = display::fontset::LOCATION
                    + display::fontset::GLYPH_SIZE * self.registers[x] as u16;
            }
            FifteenOpcode::SetIToBigSprite => {
                // FX30
                self.index_register = display::fontset::BIG_LOCATION
                    + display::fontset::BIG_GLYPH_SIZE * (self.registers[x] & 0xF) as u16;
            }
            FifteenOpcode::StoreBCD => {
                // FX33
                let i = self.index_register;
                let r = self.registers[x];

                self.memory.write(i, r / 100); // 246u8 / 100 => 2
                self.memory.write(i.wrapping_add(1), r / 10 % 10); // 246u8 / 10 => 24 % 10 => 4
                self.memory.write(i.wrapping_add(2), r % 10); // 246u8 % 10 => 6
            }
            FifteenOpcode::SetPitch => {
                // FX3A
                let steps = (self.registers[x] as f32 - sound::PITCH_CENTER) / sound::PITCH_OCTAVE;
                self.sound
                    .set_frequency(sound::PITCH_BASE * 2f32.powf(steps));
            }
            FifteenOpcode::StoreV0ToVx => {
                // FX55
                self.memory
                    .write_range(self.index_register, &self.registers[..=x]);
                if self.quirks.memory {
                    self.index_register = self.index_register.wrapping_add(x as u16 + 1);
                }
            }
            FifteenOpcode::FillV0ToVx => {
                // FX65
                let data = self.memory.read_range(self.index_register, x + 1);
                self.registers[..=x].copy_from_slice(&data);
                if self.quirks.memory {
                    self.index_register = self.index_register.wrapping_add(x as u16 + 1);
                }
            }
            FifteenOpcode::SaveFlags => {
                // FX75
                self.user_flags[..=x].copy_from_slice(&self.registers[..=x]);
            }
            FifteenOpcode::LoadFlags => {
                // FX85
                self.registers[..=x].copy_from_slice(&self.user_flags[..=x]);
            }
        }
        Ok((pcs, op))
    }
}
