use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::mock::StepRng;

use super::Interpreter;
use crate::{
    definitions::{cpu, display, keyboard, rom},
    devices::{
        key_wait, KeyNotifier, MockDisplayCommands, MockKeyboardCommands, MockSoundCommands,
        MockTimerCommands,
    },
    opcode::Operation,
    OpcodeError, ProcessError, Quirks, RomError, StackError,
};

pub(super) type Chip =
    Interpreter<MockDisplayCommands, MockTimerCommands, MockKeyboardCommands, MockSoundCommands>;

/// Every call the interpreter made into one of its devices.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Call {
    Clear,
    DrawSprite {
        sprite: Vec<u8>,
        x: u8,
        y: u8,
        wide: bool,
    },
    SetExtended(bool),
    ScrollUp(u8),
    ScrollDown(u8),
    ScrollLeft(u8),
    ScrollRight(u8),
    PlaneBitmask(u8),
    Clipping(bool),
    DrawScreen,
    TimerStart,
    TimerStop,
    TicksPerFrame(usize),
    SoundStart,
    SoundStop,
    Frequency(f32),
    Volume(f32),
    ClearWait,
}

type Log = Arc<Mutex<Vec<Call>>>;

fn recorder(log: &Log, call: Call) -> impl FnMut() + Send + 'static {
    let log = log.clone();
    move || log.lock().push(call.clone())
}

/// Wires an interpreter to recording mocks.
pub(super) struct Harness {
    chip: Chip,
    calls: Log,
    keys: Arc<Mutex<[bool; keyboard::SIZE]>>,
    notifier: Arc<Mutex<Option<KeyNotifier>>>,
    collision: Arc<Mutex<bool>>,
}

impl Harness {
    pub(super) fn new() -> Self {
        Self::with_quirks(Quirks::default())
    }

    pub(super) fn with_quirks(quirks: Quirks) -> Self {
        let calls: Log = Arc::new(Mutex::new(Vec::new()));
        let keys = Arc::new(Mutex::new([false; keyboard::SIZE]));
        let notifier: Arc<Mutex<Option<KeyNotifier>>> = Arc::new(Mutex::new(None));
        let collision = Arc::new(Mutex::new(false));
        let running = Arc::new(Mutex::new(false));
        let playing = Arc::new(Mutex::new(false));

        let mut display = MockDisplayCommands::new();
        display.expect_clear().returning(recorder(&calls, Call::Clear));
        display.expect_draw_screen().returning(recorder(&calls, Call::DrawScreen));
        {
            let log = calls.clone();
            let collision = collision.clone();
            display
                .expect_draw_sprite()
                .returning(move |sprite, x, y, wide| {
                    log.lock().push(Call::DrawSprite {
                        sprite: sprite.to_vec(),
                        x,
                        y,
                        wide,
                    });
                    *collision.lock()
                });
        }
        {
            let log = calls.clone();
            display
                .expect_set_extended()
                .returning(move |value| log.lock().push(Call::SetExtended(value)));
        }
        {
            let log = calls.clone();
            display
                .expect_scroll_up()
                .returning(move |n| log.lock().push(Call::ScrollUp(n)));
        }
        {
            let log = calls.clone();
            display
                .expect_scroll_down()
                .returning(move |n| log.lock().push(Call::ScrollDown(n)));
        }
        {
            let log = calls.clone();
            display
                .expect_scroll_left()
                .returning(move |n| log.lock().push(Call::ScrollLeft(n)));
        }
        {
            let log = calls.clone();
            display
                .expect_scroll_right()
                .returning(move |n| log.lock().push(Call::ScrollRight(n)));
        }
        {
            let log = calls.clone();
            display
                .expect_set_plane_bitmask()
                .returning(move |mask| log.lock().push(Call::PlaneBitmask(mask)));
        }
        {
            let log = calls.clone();
            display
                .expect_set_clipping()
                .returning(move |clip| log.lock().push(Call::Clipping(clip)));
        }

        let mut timer = MockTimerCommands::new();
        {
            let log = calls.clone();
            let running = running.clone();
            timer.expect_start().returning(move || {
                *running.lock() = true;
                log.lock().push(Call::TimerStart);
            });
        }
        {
            let log = calls.clone();
            let running = running.clone();
            timer.expect_stop().returning(move || {
                *running.lock() = false;
                log.lock().push(Call::TimerStop);
            });
        }
        {
            let running = running.clone();
            timer.expect_is_running().returning(move || *running.lock());
        }
        {
            let log = calls.clone();
            timer
                .expect_set_ticks_per_frame()
                .returning(move |ticks| log.lock().push(Call::TicksPerFrame(ticks)));
        }

        let mut keyboard = MockKeyboardCommands::new();
        {
            let keys = keys.clone();
            keyboard
                .expect_is_pressed()
                .returning(move |key| keys.lock()[key as usize]);
        }
        {
            let notifier = notifier.clone();
            keyboard.expect_wait_key().returning(move || {
                let (sender, wait) = key_wait();
                *notifier.lock() = Some(sender);
                wait
            });
        }
        // the notifier is kept on purpose, so a stale resolution can be attempted
        keyboard
            .expect_clear_wait()
            .returning(recorder(&calls, Call::ClearWait));

        let mut sound = MockSoundCommands::new();
        {
            let log = calls.clone();
            let playing = playing.clone();
            sound.expect_start().returning(move || {
                *playing.lock() = true;
                log.lock().push(Call::SoundStart);
            });
        }
        {
            let log = calls.clone();
            let playing = playing.clone();
            sound.expect_stop().returning(move || {
                *playing.lock() = false;
                log.lock().push(Call::SoundStop);
            });
        }
        sound
            .expect_is_playing()
            .returning(move || *playing.lock());
        {
            let log = calls.clone();
            sound
                .expect_set_frequency()
                .returning(move |hz| log.lock().push(Call::Frequency(hz)));
        }
        {
            let log = calls.clone();
            sound
                .expect_set_volume()
                .returning(move |volume| log.lock().push(Call::Volume(volume)));
        }

        let mut chip = Interpreter::with_quirks(display, timer, keyboard, sound, quirks);
        chip.set_rng(Box::new(StepRng::new(0x42, 0)));

        Self {
            chip,
            calls,
            keys,
            notifier,
            collision,
        }
    }

    pub(super) fn chip(&mut self) -> &mut Chip {
        &mut self.chip
    }

    /// Loads and starts the rom, the calls made while starting are dropped.
    pub(super) fn start(&mut self, rom: &[u8]) -> &mut Chip {
        self.chip.load(rom).expect("the rom fits into memory");
        self.chip.start().expect("a rom is loaded");
        self.clear_calls();
        &mut self.chip
    }

    /// Runs `count` cycles which all have to succeed, returns the last operation.
    pub(super) fn cycles(&mut self, count: usize) -> Operation {
        let mut last = Operation::None;
        for _ in 0..count {
            last = self
                .chip
                .execute_cycle()
                .expect("the cycle should not fail");
        }
        last
    }

    pub(super) fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub(super) fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Presses the key, returns whether a pending wait accepted it.
    pub(super) fn press(&self, key: u8) -> Option<bool> {
        self.keys.lock()[key as usize] = true;
        self.notifier
            .lock()
            .take()
            .map(|notifier| notifier.resolve(key))
    }

    pub(super) fn set_collision(&self, collision: bool) {
        *self.collision.lock() = collision;
    }
}

/// Runs the rom for `count` cycles with the given quirks.
fn run(rom: &[u8], count: usize, quirks: Quirks) -> Harness {
    let mut harness = Harness::with_quirks(quirks);
    harness.start(rom);
    harness.cycles(count);
    harness
}

fn run_default(rom: &[u8], count: usize) -> Harness {
    run(rom, count, Quirks::default())
}

const LAST: usize = cpu::register::LAST;

mod lifecycle {
    use super::*;

    #[test]
    fn test_new_state() {
        let mut harness = Harness::new();
        let chip = harness.chip();
        assert_eq!(chip.program_counter(), cpu::PROGRAM_COUNTER);
        assert_eq!(chip.index_register(), 0);
        assert_eq!(chip.stack_pointer(), 0);
        assert!(!chip.is_halted());
        assert!(!chip.is_waiting());
        assert_eq!(chip.ticks_per_frame(), cpu::TICKS_PER_FRAME);
        assert_eq!(
            &chip.memory()[..display::fontset::FONTSET.len()],
            &display::fontset::FONTSET[..]
        );
        assert!(harness.calls().is_empty());
    }

    #[test]
    fn test_start_without_rom() {
        let mut harness = Harness::new();
        assert_eq!(harness.chip().start(), Err(ProcessError::NoRom));
        assert!(harness.calls().is_empty());
    }

    #[test]
    fn test_start() {
        let mut harness = Harness::new();
        harness.chip().load(&[0x60, 0x0A]).expect("fits");
        // load alone does not touch the memory
        assert_eq!(harness.chip().memory()[0x200], 0);

        harness.chip().start().expect("a rom is loaded");
        assert_eq!(
            harness.calls(),
            vec![
                Call::ClearWait,
                Call::Clear,
                Call::Clipping(false),
                Call::TicksPerFrame(cpu::TICKS_PER_FRAME),
                Call::TimerStart,
            ]
        );
        assert_eq!(&harness.chip().memory()[0x200..0x202], &[0x60, 0x0A]);
        let big = display::fontset::BIG_LOCATION as usize;
        assert_eq!(
            &harness.chip().memory()[big..(big + display::fontset::BIG_FONTSET.len())],
            &display::fontset::BIG_FONTSET[..]
        );
    }

    #[test]
    fn test_load_too_large_keeps_previous() {
        let mut harness = Harness::new();
        harness.chip().load(&[0x12, 0x34]).expect("fits");

        let big = vec![0xAA; rom::MAX_SIZE + 1];
        assert_eq!(
            harness.chip().load(&big),
            Err(RomError::TooLarge {
                len: rom::MAX_SIZE + 1,
                max: rom::MAX_SIZE
            })
        );

        harness.chip().start().expect("a rom is loaded");
        assert_eq!(&harness.chip().memory()[0x200..0x203], &[0x12, 0x34, 0x00]);
    }

    #[test]
    fn test_load_maximum_size() {
        let mut harness = Harness::new();
        let full = vec![0xAA; rom::MAX_SIZE];
        harness.chip().load(&full).expect("fits exactly");
        harness.chip().start().expect("a rom is loaded");
        assert_eq!(harness.chip().memory()[0xFFF], 0xAA);
    }

    #[test]
    fn test_reset_reinitializes() {
        let mut harness = run_default(&[0x60, 0x0A, 0xA3, 0x00, 0x22, 0x08], 3);
        harness.chip().delay_timer = 4;
        harness.chip().reset();

        let chip = harness.chip();
        assert_eq!(chip.registers()[0], 0);
        assert_eq!(chip.index_register(), 0);
        assert_eq!(chip.stack_pointer(), 0);
        assert_eq!(chip.delay_timer(), 0);
        assert_eq!(chip.program_counter(), 0x200);
    }

    #[test]
    fn test_quirks_applied_at_reset() {
        let mut harness = Harness::new();
        harness.start(&[0x00, 0xE0]);
        harness.chip().set_quirks(Quirks::SUPER_CHIP);
        assert_eq!(harness.chip().quirks(), Quirks::default());

        harness.chip().reset();
        assert_eq!(harness.chip().quirks(), Quirks::SUPER_CHIP);
        assert!(harness.calls().contains(&Call::Clipping(true)));
    }

    #[test]
    fn test_reset_stops_sound() {
        let mut harness = Harness::new();
        harness.start(&[0x00, 0xE0]);
        harness.chip().sound_timer = 5;
        harness.chip().update_timers();
        harness.chip().reset();
        assert_eq!(
            harness.calls(),
            vec![
                Call::SoundStart,
                Call::ClearWait,
                Call::Clear,
                Call::Clipping(false),
                Call::SoundStop,
            ]
        );
        assert_eq!(harness.chip().sound_timer(), 0);
    }

    #[test]
    fn test_pause_resume() {
        let mut harness = Harness::new();
        harness.start(&[0x12, 0x00]);
        harness.chip().pause();
        harness.chip().resume();
        assert_eq!(harness.calls(), vec![Call::TimerStop, Call::TimerStart]);
    }

    #[test]
    fn test_resume_halted() {
        let mut harness = run_default(&[0x00, 0x00], 1);
        harness.clear_calls();
        harness.chip().resume();
        assert!(harness.calls().is_empty());
    }

    #[test]
    fn test_settings() {
        let mut harness = Harness::new();
        harness.chip().set_emulation_speed(20);
        harness.chip().set_sound_frequency(880.0);
        harness.chip().set_sound_volume(1.5);
        harness.chip().set_sound_volume(-1.0);
        harness.chip().set_sound_volume(0.3);
        assert_eq!(harness.chip().ticks_per_frame(), 20);
        assert_eq!(
            harness.calls(),
            vec![
                Call::TicksPerFrame(20),
                Call::Frequency(880.0),
                Call::Volume(1.0),
                Call::Volume(0.0),
                Call::Volume(0.3),
            ]
        );
    }
}

mod zero {
    use super::*;

    #[test]
    fn test_halt() {
        let mut harness = Harness::new();
        harness.start(&[0x00, 0x00]);
        assert_eq!(harness.chip().execute_cycle(), Ok(Operation::Halt));
        assert!(harness.chip().is_halted());
        assert_eq!(harness.calls(), vec![Call::TimerStop]);
        assert_eq!(harness.chip().program_counter(), 0x202);

        // nothing happens any more
        harness.clear_calls();
        assert_eq!(harness.chip().execute_cycle(), Ok(Operation::Halt));
        assert_eq!(harness.chip().program_counter(), 0x202);
        assert!(harness.calls().is_empty());
    }

    #[test]
    fn test_exit() {
        let mut harness = Harness::new();
        harness.start(&[0x60, 0x01, 0x00, 0xFD, 0x60, 0x02]);
        harness.cycles(2);
        assert!(harness.chip().is_halted());
        assert_eq!(harness.calls(), vec![Call::TimerStop]);
        harness.cycles(1);
        assert_eq!(harness.chip().registers()[0], 0x01);
    }

    #[test]
    fn test_clear() {
        let mut harness = Harness::new();
        harness.start(&[0x00, 0xE0]);
        assert_eq!(harness.cycles(1), Operation::Draw);
        assert_eq!(harness.calls(), vec![Call::Clear]);
        assert_eq!(harness.chip().program_counter(), 0x202);
    }

    #[test]
    fn test_call_return() {
        let mut harness = Harness::new();
        // the subroutine at 0x206 only returns
        harness.start(&[0x22, 0x06, 0, 0, 0, 0, 0x00, 0xEE]);

        harness.cycles(1);
        assert_eq!(harness.chip().program_counter(), 0x206);
        assert_eq!(harness.chip().stack_pointer(), 1);
        assert_eq!(harness.chip().stack(), &[0x202]);

        harness.cycles(1);
        assert_eq!(harness.chip().program_counter(), 0x202);
        assert_eq!(harness.chip().stack_pointer(), 0);
    }

    #[test]
    fn test_return_empty_stack() {
        let mut harness = Harness::new();
        harness.start(&[0x00, 0xEE]);
        assert_eq!(
            harness.chip().execute_cycle(),
            Err(ProcessError::Stack(StackError::Empty))
        );
        assert!(harness.chip().is_halted());
        assert_eq!(harness.chip().program_counter(), 0x200);
        assert_eq!(harness.calls(), vec![Call::TimerStop]);
    }

    #[test]
    fn test_display_commands() {
        let harness = run_default(
            &[
                0x00, 0xC3, 0x00, 0xD2, 0x00, 0xFB, 0x00, 0xFC, 0x00, 0xFF, 0x00, 0xFE,
            ],
            6,
        );
        assert_eq!(
            harness.calls(),
            vec![
                Call::ScrollDown(3),
                Call::ScrollUp(2),
                Call::ScrollRight(4),
                Call::ScrollLeft(4),
                Call::SetExtended(true),
                Call::SetExtended(false),
            ]
        );
    }

    #[test]
    fn test_invalid() {
        let mut harness = Harness::new();
        harness.start(&[0x01, 0x23]);
        assert_eq!(
            harness.chip().execute_cycle(),
            Err(ProcessError::Opcode(OpcodeError::InvalidOpcode(0x0123)))
        );
        assert!(harness.chip().is_halted());
        assert_eq!(harness.chip().program_counter(), 0x200);
    }
}

mod one {
    use super::*;

    #[test]
    fn test_jump() {
        let mut harness = run_default(&[0x12, 0x34], 1);
        assert_eq!(harness.chip().program_counter(), 0x234);
    }
}

mod two {
    use super::*;

    #[test]
    fn test_stack_overflow() {
        let mut harness = Harness::new();
        // calls itself forever
        harness.start(&[0x22, 0x00]);
        harness.cycles(cpu::stack::SIZE);
        assert_eq!(harness.chip().stack_pointer(), cpu::stack::SIZE);
        assert_eq!(
            harness.chip().execute_cycle(),
            Err(ProcessError::Stack(StackError::Full))
        );
        assert!(harness.chip().is_halted());
    }
}

mod three {
    use super::*;

    #[test]
    fn test_skip() {
        let mut harness = run_default(&[0x60, 0x0A, 0x30, 0x0A], 2);
        assert_eq!(harness.chip().program_counter(), 0x206);

        let mut harness = run_default(&[0x60, 0x0A, 0x30, 0x0B], 2);
        assert_eq!(harness.chip().program_counter(), 0x204);
    }

    #[test]
    fn test_skip_load_long() {
        let mut harness = run_default(
            &[0x60, 0x00, 0x30, 0x00, 0xF0, 0x00, 0x12, 0x34, 0x61, 0x01],
            2,
        );
        assert_eq!(harness.chip().program_counter(), 0x208);

        harness.cycles(1);
        assert_eq!(harness.chip().registers()[1], 0x01);
        assert_eq!(harness.chip().index_register(), 0);
    }
}

mod four {
    use super::*;

    #[test]
    fn test_skip() {
        let mut harness = run_default(&[0x40, 0x01], 1);
        assert_eq!(harness.chip().program_counter(), 0x204);

        let mut harness = run_default(&[0x40, 0x00], 1);
        assert_eq!(harness.chip().program_counter(), 0x202);

        // F000 NNNN is skipped as a whole
        let mut harness = run_default(&[0x40, 0x01, 0xF0, 0x00, 0x12, 0x34], 1);
        assert_eq!(harness.chip().program_counter(), 0x206);
    }
}

mod five {
    use super::*;

    #[test]
    fn test_skip() {
        let mut harness = run_default(&[0x60, 0x03, 0x61, 0x03, 0x50, 0x10], 3);
        assert_eq!(harness.chip().program_counter(), 0x208);

        let mut harness = run_default(&[0x60, 0x03, 0x50, 0x00, 0xF0, 0x00, 0x03, 0x00], 2);
        assert_eq!(harness.chip().program_counter(), 0x208);
    }

    #[test]
    fn test_save_range() {
        let rom = [0x60, 0x11, 0x61, 0x22, 0x62, 0x33, 0xA3, 0x00, 0x50, 0x22];
        let mut harness = run_default(&rom, 5);
        assert_eq!(&harness.chip().memory()[0x300..0x303], &[0x11, 0x22, 0x33]);
        assert_eq!(harness.chip().index_register(), 0x300);
    }

    #[test]
    fn test_save_range_reversed() {
        let rom = [0x60, 0x11, 0x61, 0x22, 0x62, 0x33, 0xA3, 0x00, 0x52, 0x02];
        let mut harness = run_default(&rom, 5);
        assert_eq!(&harness.chip().memory()[0x300..0x303], &[0x33, 0x22, 0x11]);
    }

    #[test]
    fn test_load_range() {
        let rom = [0xA2, 0x06, 0x51, 0x33, 0x00, 0x00, 0xAA, 0xBB, 0xCC];
        let mut harness = run_default(&rom, 2);
        assert_eq!(&harness.chip().registers()[..5], &[0x00, 0xAA, 0xBB, 0xCC, 0x00]);

        let rom = [0xA2, 0x06, 0x53, 0x13, 0x00, 0x00, 0xAA, 0xBB, 0xCC];
        let mut harness = run_default(&rom, 2);
        assert_eq!(&harness.chip().registers()[..5], &[0x00, 0xCC, 0xBB, 0xAA, 0x00]);
    }

    #[test]
    fn test_invalid() {
        let mut harness = Harness::new();
        harness.start(&[0x51, 0x21]);
        assert_eq!(
            harness.chip().execute_cycle(),
            Err(ProcessError::Opcode(OpcodeError::InvalidOpcode(0x5121)))
        );
    }
}

mod six {
    use super::*;

    #[test]
    fn test_load() {
        let mut harness = run_default(&[0x60, 0x0A], 1);
        assert_eq!(harness.chip().registers()[0], 0x0A);
        assert_eq!(harness.chip().program_counter(), 0x202);
    }
}

mod seven {
    use super::*;

    #[test]
    fn test_add_wraps_without_flag() {
        let mut harness = run_default(&[0x60, 0xFF, 0x6F, 0x05, 0x70, 0x02], 3);
        assert_eq!(harness.chip().registers()[0], 0x01);
        assert_eq!(harness.chip().registers()[LAST], 0x05);
    }
}

mod eight {
    use super::*;

    /// sets `V0`, `V1` and `VF` and runs the alu opcode `80 1N`
    fn alu(v0: u8, v1: u8, vf: u8, n: u8, quirks: Quirks) -> Harness {
        run(
            &[0x60, v0, 0x61, v1, 0x6F, vf, 0x80, 0x10 | n],
            4,
            quirks,
        )
    }

    #[test]
    fn test_assign() {
        let mut harness = alu(0x01, 0x02, 0x00, 0x0, Quirks::default());
        assert_eq!(harness.chip().registers()[0], 0x02);
    }

    #[test]
    fn test_logic() {
        let tests = [(0x1, 0xFF), (0x2, 0x00), (0x3, 0xFF)];
        for (n, res) in tests {
            let mut harness = alu(0x0F, 0xF0, 0x05, n, Quirks::default());
            assert_eq!(harness.chip().registers()[0], res);
            assert_eq!(harness.chip().registers()[LAST], 0x00);

            let quirks = Quirks {
                logic: true,
                ..Quirks::default()
            };
            let mut harness = alu(0x0F, 0xF0, 0x05, n, quirks);
            assert_eq!(harness.chip().registers()[0], res);
            assert_eq!(harness.chip().registers()[LAST], 0x05);
        }
    }

    #[test]
    fn test_add() {
        let mut harness = run_default(&[0x6F, 0x02, 0x60, 0xFF, 0x61, 0x01, 0x80, 0x14], 4);
        assert_eq!(harness.chip().registers()[0], 0x00);
        assert_eq!(harness.chip().registers()[LAST], 0x01);

        let mut harness = alu(0x02, 0x01, 0x07, 0x4, Quirks::default());
        assert_eq!(harness.chip().registers()[0], 0x03);
        assert_eq!(harness.chip().registers()[LAST], 0x00);
    }

    #[test]
    fn test_sub() {
        let mut harness = alu(0x03, 0x01, 0x00, 0x5, Quirks::default());
        assert_eq!(harness.chip().registers()[0], 0x02);
        assert_eq!(harness.chip().registers()[LAST], 0x01);

        let mut harness = alu(0x01, 0x03, 0x00, 0x5, Quirks::default());
        assert_eq!(harness.chip().registers()[0], 0xFE);
        assert_eq!(harness.chip().registers()[LAST], 0x00);
    }

    #[test]
    fn test_sub_reverse() {
        let mut harness = alu(0x01, 0x03, 0x00, 0x7, Quirks::default());
        assert_eq!(harness.chip().registers()[0], 0x02);
        assert_eq!(harness.chip().registers()[LAST], 0x01);

        let mut harness = alu(0x03, 0x01, 0x00, 0x7, Quirks::default());
        assert_eq!(harness.chip().registers()[0], 0xFE);
        assert_eq!(harness.chip().registers()[LAST], 0x00);
    }

    #[test]
    fn test_shift_right() {
        let mut harness = alu(0x00, 0x03, 0x00, 0x6, Quirks::default());
        assert_eq!(harness.chip().registers()[0], 0x01);
        assert_eq!(harness.chip().registers()[LAST], 0x01);

        let quirks = Quirks {
            shift: true,
            ..Quirks::default()
        };
        let mut harness = alu(0x08, 0x03, 0x00, 0x6, quirks);
        assert_eq!(harness.chip().registers()[0], 0x04);
        assert_eq!(harness.chip().registers()[LAST], 0x00);
        assert_eq!(harness.chip().registers()[1], 0x03);
    }

    #[test]
    fn test_shift_left() {
        let mut harness = alu(0x00, 0x81, 0x00, 0xE, Quirks::default());
        assert_eq!(harness.chip().registers()[0], 0x02);
        assert_eq!(harness.chip().registers()[LAST], 0x01);

        let quirks = Quirks {
            shift: true,
            ..Quirks::default()
        };
        let mut harness = alu(0x40, 0x81, 0x00, 0xE, quirks);
        assert_eq!(harness.chip().registers()[0], 0x80);
        assert_eq!(harness.chip().registers()[LAST], 0x00);
    }

    #[test]
    fn test_vf_order() {
        let vf_order = Quirks {
            vf_order: true,
            ..Quirks::default()
        };
        // (rom, vf without the quirk, vf with the quirk)
        let tests: [([u8; 6], u8, u8); 4] = [
            ([0x6F, 0x02, 0x60, 0x04, 0x8F, 0x06], 0x00, 0x02),
            ([0x6F, 0x80, 0x60, 0x40, 0x8F, 0x0E], 0x00, 0x80),
            ([0x60, 0xFF, 0x6F, 0x03, 0x8F, 0x04], 0x01, 0x02),
            ([0x6F, 0x04, 0x60, 0x02, 0x8F, 0x05], 0x01, 0x02),
        ];
        for (rom, flag, ordered) in tests {
            let mut harness = run_default(&rom, 3);
            assert_eq!(harness.chip().registers()[LAST], flag, "rom {:X?}", rom);

            let mut harness = run(&rom, 3, vf_order);
            assert_eq!(harness.chip().registers()[LAST], ordered, "rom {:X?}", rom);
        }
    }

    #[test]
    fn test_invalid() {
        let mut harness = Harness::new();
        harness.start(&[0x80, 0x18]);
        assert_eq!(
            harness.chip().execute_cycle(),
            Err(ProcessError::Opcode(OpcodeError::InvalidOpcode(0x8018)))
        );
    }
}

mod nine {
    use super::*;

    #[test]
    fn test_skip() {
        let mut harness = run_default(&[0x60, 0x03, 0x90, 0x10], 2);
        assert_eq!(harness.chip().program_counter(), 0x206);

        let mut harness = run_default(&[0x90, 0x10], 1);
        assert_eq!(harness.chip().program_counter(), 0x202);

        let mut harness = run_default(&[0x60, 0x01, 0x90, 0x10, 0xF0, 0x00, 0x12, 0x34], 2);
        assert_eq!(harness.chip().program_counter(), 0x208);
        assert_eq!(harness.chip().index_register(), 0);
    }
}

mod a {
    use super::*;

    #[test]
    fn test_set_index() {
        let mut harness = run_default(&[0xAE, 0xDA], 1);
        assert_eq!(harness.chip().index_register(), 0xEDA);
    }
}

mod b {
    use super::*;

    const ROM: [u8; 6] = [0x60, 0x04, 0x61, 0x10, 0xB1, 0x00];

    #[test]
    fn test_jump_v0() {
        let mut harness = run_default(&ROM, 3);
        assert_eq!(harness.chip().program_counter(), 0x104);
    }

    #[test]
    fn test_jump_vx() {
        let quirks = Quirks {
            jump: true,
            ..Quirks::default()
        };
        let mut harness = run(&ROM, 3, quirks);
        assert_eq!(harness.chip().program_counter(), 0x110);
    }
}

mod c {
    use super::*;

    #[test]
    fn test_random() {
        let mut harness = run_default(&[0xC0, 0x0F, 0xC1, 0xFF], 2);
        assert_eq!(harness.chip().registers()[0], 0x02);
        assert_eq!(harness.chip().registers()[1], 0x42);
    }
}

mod d {
    use super::*;

    const ROM: [u8; 12] = [
        0x60, 0x05, 0x61, 0x07, 0xA2, 0x0A, 0xD0, 0x12, 0x00, 0x00, 0xFF, 0x81,
    ];

    #[test]
    fn test_draw() {
        let mut harness = Harness::new();
        harness.start(&ROM);
        harness.chip().registers[LAST] = 0x03;
        assert_eq!(harness.cycles(4), Operation::Draw);
        assert_eq!(
            harness.calls(),
            vec![Call::DrawSprite {
                sprite: vec![0xFF, 0x81],
                x: 0x05,
                y: 0x07,
                wide: false,
            }]
        );
        assert_eq!(harness.chip().registers()[LAST], 0x00);
        assert_eq!(harness.chip().index_register(), 0x20A);
    }

    #[test]
    fn test_draw_collision() {
        let mut harness = Harness::new();
        harness.start(&ROM);
        harness.set_collision(true);
        harness.cycles(4);
        assert_eq!(harness.chip().registers()[LAST], 0x01);
    }

    #[test]
    fn test_draw_wide() {
        let harness = run_default(&[0xA3, 0x00, 0xD0, 0x10], 2);
        match harness.calls().as_slice() {
            [Call::DrawSprite { sprite, wide, .. }] => {
                assert!(*wide);
                assert_eq!(sprite.len(), display::WIDE_SPRITE);
            }
            calls => panic!("unexpected calls {:?}", calls),
        }
    }
}

mod e {
    use super::*;

    #[test]
    fn test_pressed() {
        let mut harness = Harness::new();
        harness.start(&[0x60, 0x05, 0xE0, 0x9E]);
        harness.press(0x5);
        harness.cycles(2);
        assert_eq!(harness.chip().program_counter(), 0x206);

        let mut harness = run_default(&[0x60, 0x05, 0xE0, 0x9E], 2);
        assert_eq!(harness.chip().program_counter(), 0x204);

        let mut harness = Harness::new();
        harness.start(&[0x60, 0x05, 0xE0, 0x9E, 0xF0, 0x00, 0x12, 0x34]);
        harness.press(0x5);
        harness.cycles(2);
        assert_eq!(harness.chip().program_counter(), 0x208);
    }

    #[test]
    fn test_not_pressed() {
        let mut harness = run_default(&[0x60, 0x05, 0xE0, 0xA1, 0xF0, 0x00, 0x12, 0x34], 2);
        assert_eq!(harness.chip().program_counter(), 0x208);

        let mut harness = Harness::new();
        harness.start(&[0x60, 0x05, 0xE0, 0xA1]);
        harness.press(0x5);
        harness.cycles(2);
        assert_eq!(harness.chip().program_counter(), 0x204);
    }

    #[test]
    fn test_invalid() {
        let mut harness = Harness::new();
        harness.start(&[0xE0, 0x9F]);
        assert_eq!(
            harness.chip().execute_cycle(),
            Err(ProcessError::Opcode(OpcodeError::InvalidOpcode(0xE09F)))
        );
    }
}

mod f {
    use super::*;

    #[test]
    fn test_load_long() {
        let mut harness = run_default(&[0xF0, 0x00, 0x12, 0x34], 1);
        assert_eq!(harness.chip().index_register(), 0x1234);
        assert_eq!(harness.chip().program_counter(), 0x204);
    }

    #[test]
    fn test_load_long_needs_zero() {
        let mut harness = Harness::new();
        harness.start(&[0xF1, 0x00, 0x12, 0x34]);
        assert_eq!(
            harness.chip().execute_cycle(),
            Err(ProcessError::Opcode(OpcodeError::InvalidOpcode(0xF100)))
        );
    }

    #[test]
    fn test_plane_bitmask() {
        let harness = run_default(&[0xF3, 0x01], 1);
        assert_eq!(harness.calls(), vec![Call::PlaneBitmask(3)]);
    }

    #[test]
    fn test_timers() {
        let mut harness = run_default(&[0x60, 0x20, 0xF0, 0x15, 0xF0, 0x18, 0xF1, 0x07], 4);
        let chip = harness.chip();
        assert_eq!(chip.delay_timer(), 0x20);
        assert_eq!(chip.sound_timer(), 0x20);
        assert_eq!(chip.registers()[1], 0x20);
    }

    #[test]
    fn test_add_index_wraps() {
        let mut harness = run_default(&[0xF0, 0x00, 0xFF, 0xFF, 0x60, 0x02, 0xF0, 0x1E], 3);
        assert_eq!(harness.chip().index_register(), 0x0001);
        assert_eq!(harness.chip().registers()[LAST], 0x00);
    }

    #[test]
    fn test_sprites() {
        let mut harness = run_default(&[0x60, 0x0A, 0xF0, 0x29], 2);
        assert_eq!(harness.chip().index_register(), 50);

        let mut harness = run_default(&[0x60, 0x02, 0xF0, 0x30], 2);
        assert_eq!(
            harness.chip().index_register(),
            display::fontset::BIG_LOCATION + 20
        );
    }

    #[test]
    fn test_bcd() {
        let mut harness = run_default(&[0x60, 0xF6, 0xA3, 0x00, 0xF0, 0x33], 3);
        assert_eq!(&harness.chip().memory()[0x300..0x303], &[2, 4, 6]);
        assert_eq!(harness.chip().index_register(), 0x300);
    }

    #[test]
    fn test_pitch() {
        let harness = run_default(&[0x60, 0x40, 0xF0, 0x3A, 0x60, 0x70, 0xF0, 0x3A], 4);
        assert_eq!(
            harness.calls(),
            vec![Call::Frequency(4000.0), Call::Frequency(8000.0)]
        );
    }

    #[test]
    fn test_store_fill() {
        let rom = [
            0x60, 0x01, 0x61, 0x02, 0x62, 0x03, 0xA3, 0x00, 0xF1, 0x55, 0xA3, 0x01, 0xF1, 0x65,
        ];
        let mut harness = run_default(&rom, 7);
        let chip = harness.chip();
        assert_eq!(&chip.memory()[0x300..0x303], &[0x01, 0x02, 0x00]);
        assert_eq!(&chip.registers()[..3], &[0x02, 0x00, 0x03]);
        assert_eq!(chip.index_register(), 0x301);

        let quirks = Quirks {
            memory: true,
            ..Quirks::default()
        };
        let mut harness = run(&rom[..10], 5, quirks);
        assert_eq!(harness.chip().index_register(), 0x302);
    }

    #[test]
    fn test_user_flags_survive_reset() {
        let mut harness = run_default(&[0x60, 0x11, 0x61, 0x22, 0xF1, 0x75], 3);
        harness.chip().reset();
        assert_eq!(&harness.chip().user_flags()[..3], &[0x11, 0x22, 0x00]);
        assert_eq!(harness.chip().registers()[0], 0x00);
    }

    #[test]
    fn test_user_flags_load() {
        let mut harness = Harness::new();
        harness.start(&[0xF1, 0x85]);
        harness.chip().user_flags[..3].copy_from_slice(&[0x33, 0x44, 0x55]);
        harness.cycles(1);
        assert_eq!(&harness.chip().registers()[..3], &[0x33, 0x44, 0x00]);
    }

    #[test]
    fn test_invalid() {
        let mut harness = Harness::new();
        harness.start(&[0xF0, 0x02]);
        assert_eq!(
            harness.chip().execute_cycle(),
            Err(ProcessError::Opcode(OpcodeError::InvalidOpcode(0xF002)))
        );
        assert!(harness.chip().is_halted());
        assert_eq!(harness.calls(), vec![Call::TimerStop]);
    }
}

mod wait {
    use super::*;

    const ROM: [u8; 4] = [0xF3, 0x0A, 0x64, 0x01];

    #[test]
    fn test_wait_for_key() {
        let mut harness = Harness::new();
        harness.start(&ROM);
        assert_eq!(harness.cycles(1), Operation::Wait);
        assert!(harness.chip().is_waiting());
        assert_eq!(harness.chip().program_counter(), 0x200);

        // no key, no progress
        assert_eq!(harness.cycles(3), Operation::Wait);
        assert_eq!(harness.chip().program_counter(), 0x200);

        assert_eq!(harness.press(0xB), Some(true));
        harness.cycles(1);
        let chip = harness.chip();
        assert!(!chip.is_waiting());
        assert_eq!(chip.registers()[3], 0xB);
        assert_eq!(chip.registers()[4], 0x01);
        assert_eq!(chip.program_counter(), 0x204);
    }

    #[test]
    fn test_poll_key_wait() {
        let mut harness = Harness::new();
        harness.start(&ROM);
        harness.cycles(1);
        assert!(!harness.chip().poll_key_wait());

        harness.press(0x2);
        assert!(harness.chip().poll_key_wait());
        assert_eq!(harness.chip().registers()[3], 0x2);
        assert_eq!(harness.chip().program_counter(), 0x202);
        assert!(!harness.chip().poll_key_wait());
    }

    #[test]
    fn test_timers_run_while_waiting() {
        let mut harness = Harness::new();
        harness.start(&[0x60, 0x05, 0xF0, 0x15, 0xF1, 0x0A]);
        harness.cycles(3);
        assert_eq!(harness.chip().delay_timer(), 0x05);
        harness.cycles(2);
        assert_eq!(harness.chip().delay_timer(), 0x03);
    }

    #[test]
    fn test_reset_cancels_wait() {
        let mut harness = Harness::new();
        harness.start(&ROM);
        harness.cycles(1);
        harness.chip().reset();

        assert!(!harness.chip().is_waiting());
        assert!(harness.calls().contains(&Call::ClearWait));
        // the stale key is refused
        assert_eq!(harness.press(0x7), Some(false));
        assert_eq!(harness.chip().registers()[3], 0x00);
    }
}

mod timers {
    use super::*;

    #[test]
    fn test_update_timers() {
        let mut harness = Harness::new();
        harness.start(&[0x12, 0x00]);
        harness.chip().delay_timer = 2;
        harness.chip().sound_timer = 2;

        harness.chip().update_timers();
        assert_eq!(harness.chip().delay_timer(), 1);
        assert_eq!(harness.chip().sound_timer(), 1);
        assert_eq!(harness.calls(), vec![Call::SoundStart]);

        harness.chip().update_timers();
        harness.chip().update_timers();
        assert_eq!(harness.chip().delay_timer(), 0);
        assert_eq!(harness.chip().sound_timer(), 0);
        assert_eq!(harness.calls(), vec![Call::SoundStart, Call::SoundStop]);
    }

    #[test]
    fn test_short_beep() {
        let mut harness = Harness::new();
        harness.start(&[0x12, 0x00]);
        harness.chip().sound_timer = 1;
        harness.chip().update_timers();
        assert_eq!(harness.calls(), vec![Call::SoundStart, Call::SoundStop]);
    }
}

mod frame {
    use super::*;

    #[test]
    fn test_not_running() {
        let mut harness = Harness::new();
        harness.chip().load(&[0x70, 0x01]).expect("fits");
        assert_eq!(harness.chip().run_frame(), Ok(()));
        assert!(harness.calls().is_empty());
        assert_eq!(harness.chip().program_counter(), 0x200);
    }

    #[test]
    fn test_run_frame() {
        let mut harness = Harness::new();
        let rom: Vec<u8> = [0x70, 0x01].repeat(10);
        harness.start(&rom);
        harness.chip().delay_timer = 3;
        assert_eq!(harness.chip().run_frame(), Ok(()));

        let chip = harness.chip();
        assert_eq!(chip.registers()[0], cpu::TICKS_PER_FRAME as u8);
        assert_eq!(chip.delay_timer(), 2);
        assert_eq!(harness.calls(), vec![Call::DrawScreen]);
    }

    #[test]
    fn test_run_frame_while_waiting() {
        let mut harness = Harness::new();
        harness.start(&[0xF0, 0x0A]);
        harness.chip().delay_timer = 48;
        assert_eq!(harness.chip().run_frame(), Ok(()));

        // the first cycle enters the wait, every following one and the frame tick the timers
        let chip = harness.chip();
        assert!(chip.is_waiting());
        assert_eq!(chip.delay_timer(), 48 - cpu::TICKS_PER_FRAME as u8);
        assert_eq!(chip.program_counter(), 0x200);
    }

    #[test]
    fn test_run_frame_halts() {
        let mut harness = Harness::new();
        harness.start(&[0x70, 0x01, 0x00, 0x00, 0x70, 0x01]);
        assert_eq!(harness.chip().run_frame(), Ok(()));
        assert_eq!(harness.chip().registers()[0], 0x01);
        assert_eq!(harness.calls(), vec![Call::TimerStop, Call::DrawScreen]);

        // the timer is stopped now
        harness.clear_calls();
        assert_eq!(harness.chip().run_frame(), Ok(()));
        assert!(harness.calls().is_empty());
    }

    #[test]
    fn test_run_frame_error() {
        let mut harness = Harness::new();
        harness.start(&[0xFF, 0xFF]);
        assert_eq!(
            harness.chip().run_frame(),
            Err(ProcessError::Opcode(OpcodeError::InvalidOpcode(0xFFFF)))
        );
        assert!(harness.chip().is_halted());
    }
}
