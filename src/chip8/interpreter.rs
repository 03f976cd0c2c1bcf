use std::{convert::TryFrom, mem};

use rand::RngCore;

use super::{memory::Memory, stack::Stack};
use crate::{
    definitions::{cpu, memory::opcodes, rom},
    devices::{DisplayCommands, KeyWait, KeyboardCommands, SoundCommands, TimerCommands},
    opcode::{ChipOpcodes, Opcodes, Operation, ProgramCounter, ProgramCounterStep},
    ProcessError, Quirks, RomError,
};

/// Tracks whether the program is blocked on a `FX0A`.
pub(super) enum WaitState {
    Idle,
    Waiting {
        /// the register receiving the key
        register: usize,
        pending: KeyWait,
    },
}

/// The Interpreter struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instance of the
/// Chip8 CPU, and the devices it talks to.
pub struct Interpreter<D, T, K, S>
where
    D: DisplayCommands,
    T: TimerCommands,
    K: KeyboardCommands,
    S: SoundCommands,
{
    pub(super) memory: Memory,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: u16,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: u16,
    pub(super) stack: Stack,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    pub(super) delay_timer: u8,
    /// Sound timer: This timer is used for sound effects. When its value is nonzero, a beeping
    /// sound is made.
    pub(super) sound_timer: u8,
    pub(super) halted: bool,
    pub(super) wait: WaitState,
    /// The quirks of the currently running program
    pub(super) quirks: Quirks,
    /// The quirks that will be used by the next reset
    configured: Quirks,
    rom: Option<Box<[u8]>>,
    /// Survives resets (`FX75` / `FX85`)
    pub(super) user_flags: [u8; cpu::flags::SIZE],
    ticks_per_frame: usize,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
    pub(super) display: D,
    pub(super) timer: T,
    pub(super) keyboard: K,
    pub(super) sound: S,
}

impl<D, T, K, S> Interpreter<D, T, K, S>
where
    D: DisplayCommands,
    T: TimerCommands,
    K: KeyboardCommands,
    S: SoundCommands,
{
    /// will create a new interpreter bound to the given devices
    pub fn new(display: D, timer: T, keyboard: K, sound: S) -> Self {
        Self::with_quirks(display, timer, keyboard, sound, Quirks::default())
    }

    pub fn with_quirks(display: D, timer: T, keyboard: K, sound: S, quirks: Quirks) -> Self {
        let mut memory = Memory::new();
        memory.reinitialize(&[]);

        Self {
            memory,
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: Stack::default(),
            delay_timer: 0,
            sound_timer: 0,
            halted: false,
            wait: WaitState::Idle,
            quirks,
            configured: quirks,
            rom: None,
            user_flags: [0; cpu::flags::SIZE],
            ticks_per_frame: cpu::TICKS_PER_FRAME,
            rng: Box::new(rand::rngs::OsRng),
            display,
            timer,
            keyboard,
            sound,
        }
    }

    /// Stores the quirks used from the next [`reset`](Self::reset) onwards.
    pub fn set_quirks(&mut self, quirks: Quirks) {
        self.configured = quirks;
    }

    /// Replaces the random source used by `CXNN`.
    pub fn set_rng(&mut self, rng: Box<dyn RngCore + Send>) {
        self.rng = rng;
    }

    /// Stores the rom, it is written into memory by the next [`reset`](Self::reset).
    pub fn load(&mut self, rom: &[u8]) -> Result<(), RomError> {
        if rom.len() > rom::MAX_SIZE {
            log::warn!(
                "Refusing rom of {} bytes, at most {} bytes fit.",
                rom.len(),
                rom::MAX_SIZE
            );
            return Err(RomError::TooLarge {
                len: rom.len(),
                max: rom::MAX_SIZE,
            });
        }

        log::debug!("Loaded rom of {} bytes.", rom.len());
        self.rom = Some(rom.into());
        Ok(())
    }

    /// Will bring the interpreter back into its starting state, with the loaded rom in memory.
    pub fn reset(&mut self) {
        if let WaitState::Waiting { mut pending, .. } =
            mem::replace(&mut self.wait, WaitState::Idle)
        {
            log::warn!("Cancelled the pending key wait.");
            pending.cancel();
        }
        self.keyboard.clear_wait();

        self.quirks = self.configured;

        let rom = self.rom.as_deref().unwrap_or_default();
        self.memory.reinitialize(rom);
        self.registers = [0; cpu::register::SIZE];
        self.index_register = 0;
        self.program_counter = cpu::PROGRAM_COUNTER;
        self.stack.clear();
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.halted = false;

        self.display.clear();
        self.display.set_clipping(self.quirks.clip);
        if self.sound.is_playing() {
            self.sound.stop();
        }

        log::debug!("Reset the interpreter with {:?}.", self.quirks);
    }

    /// Resets the interpreter and starts the timer.
    ///
    /// Without a loaded rom nothing happens and [`ProcessError::NoRom`] is reported.
    pub fn start(&mut self) -> Result<(), ProcessError> {
        if self.rom.is_none() {
            log::warn!("Can not start without a rom.");
            return Err(ProcessError::NoRom);
        }

        self.reset();
        self.timer.set_ticks_per_frame(self.ticks_per_frame);
        self.timer.start();
        log::debug!("Started the interpreter.");
        Ok(())
    }

    pub fn pause(&mut self) {
        self.timer.stop();
        log::debug!("Paused the interpreter.");
    }

    /// Restarts the timer after a [`pause`](Self::pause), a halted interpreter stays halted.
    #[doc(alias = "continue")]
    pub fn resume(&mut self) {
        if self.halted {
            log::warn!("Can not continue a halted interpreter.");
            return;
        }
        self.timer.start();
        log::debug!("Continued the interpreter.");
    }

    /// Sets the amount of cycles run per frame.
    pub fn set_emulation_speed(&mut self, ticks_per_frame: usize) {
        self.ticks_per_frame = ticks_per_frame;
        self.timer.set_ticks_per_frame(ticks_per_frame);
        log::debug!("Running {} cycles per frame.", ticks_per_frame);
    }

    pub fn set_sound_frequency(&mut self, frequency: f32) {
        self.sound.set_frequency(frequency);
    }

    /// The volume is clamped to `0.0..=1.0`.
    pub fn set_sound_volume(&mut self, volume: f32) {
        let clamped = volume.max(0.0).min(1.0);
        if (clamped - volume).abs() > f32::EPSILON {
            log::warn!("Clamped the volume {} to {}.", volume, clamped);
        }
        self.sound.set_volume(clamped);
    }

    /// will advance the program by a single step
    pub fn execute_cycle(&mut self) -> Result<Operation, ProcessError> {
        if self.halted {
            return Ok(Operation::Halt);
        }

        if self.is_waiting() && !self.poll_key_wait() {
            self.update_timers();
            return Ok(Operation::Wait);
        }

        let opcode = match self.memory.fetch(self.program_counter) {
            Ok(opcode) => opcode,
            Err(err) => return Err(self.fail(err.into())),
        };
        log::trace!("{:#06X} at {:#05X}", opcode, self.program_counter);

        let result = Opcodes::try_from(opcode)
            .map_err(ProcessError::from)
            .and_then(|opcode| self.calc(&opcode));

        result.map_err(|err| self.fail(err))
    }

    /// Will finish a pending `FX0A` if the keyboard delivered a key. Returns `true` if that was
    /// the case.
    pub fn poll_key_wait(&mut self) -> bool {
        let key = match &mut self.wait {
            WaitState::Waiting { pending, .. } => pending.try_take(),
            WaitState::Idle => None,
        };

        match (key, mem::replace(&mut self.wait, WaitState::Idle)) {
            (Some(key), WaitState::Waiting { register, .. }) => {
                log::debug!("Received key {:#X} for V{:X}.", key, register);
                self.registers[register] = key;
                self.step(ProgramCounterStep::Next);
                true
            }
            (_, state) => {
                self.wait = state;
                false
            }
        }
    }

    /// Counts both timers down, meant to be called at `60Hz`. The beeper plays while the sound
    /// timer is above zero.
    pub fn update_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }

        if self.sound_timer > 0 {
            if !self.sound.is_playing() {
                self.sound.start();
            }
            self.sound_timer -= 1;
        }

        if self.sound_timer == 0 && self.sound.is_playing() {
            self.sound.stop();
        }
    }

    /// Asks the display to present itself.
    pub fn draw(&mut self) {
        self.display.draw_screen();
    }

    /// Runs a single frame, the configured amount of cycles, a timer update and a draw.
    ///
    /// Does nothing while the timer is not running. While a `FX0A` is pending every waiting cycle
    /// updates the timers as well, so the timers count down once per cycle plus once per frame
    /// until the key arrives.
    pub fn run_frame(&mut self) -> Result<(), ProcessError> {
        if !self.timer.is_running() {
            return Ok(());
        }

        for _ in 0..self.ticks_per_frame {
            if self.execute_cycle()? == Operation::Halt {
                break;
            }
        }

        self.update_timers();
        self.draw();
        Ok(())
    }

    /// Marks the interpreter as halted and stops the clock.
    pub(super) fn halt(&mut self) {
        self.halted = true;
        self.timer.stop();
    }

    fn fail(&mut self, err: ProcessError) -> ProcessError {
        log::error!(
            "Halting at {:#05X} after a fatal error: {}",
            self.program_counter,
            err
        );
        self.halt();
        err
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn index_register(&self) -> u16 {
        self.index_register
    }

    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn stack(&self) -> &[u16] {
        self.stack.as_slice()
    }

    pub fn stack_pointer(&self) -> usize {
        self.stack.pointer()
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.as_slice()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self.wait, WaitState::Waiting { .. })
    }

    /// The quirks of the running program.
    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn user_flags(&self) -> &[u8] {
        &self.user_flags
    }

    pub fn ticks_per_frame(&self) -> usize {
        self.ticks_per_frame
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn keyboard(&self) -> &K {
        &self.keyboard
    }

    /// Used by hosts to feed key events into their keyboard.
    pub fn keyboard_mut(&mut self) -> &mut K {
        &mut self.keyboard
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }
}

impl<D, T, K, S> ProgramCounter for Interpreter<D, T, K, S>
where
    D: DisplayCommands,
    T: TimerCommands,
    K: KeyboardCommands,
    S: SoundCommands,
{
    fn step(&mut self, step: ProgramCounterStep) {
        let pc = self.program_counter;
        self.program_counter = match step {
            ProgramCounterStep::None => pc,
            ProgramCounterStep::Next => pc.wrapping_add(opcodes::SIZE),
            ProgramCounterStep::Long => pc.wrapping_add(opcodes::LONG_SIZE),
            ProgramCounterStep::Skip => {
                let next = pc.wrapping_add(opcodes::SIZE);
                if self.memory.is_long_at(next) {
                    next.wrapping_add(opcodes::LONG_SIZE)
                } else {
                    next.wrapping_add(opcodes::SIZE)
                }
            }
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}
