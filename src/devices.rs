//! The collaborators the interpreter talks to, plus the reference implementations shipped with
//! the crate.
use std::sync::Arc;

use parking_lot::Mutex;

use crate::definitions::keyboard;

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will clear the display
    fn clear(&mut self);
    /// Will xor the sprite onto the display at `(x, y)`, `wide` marks a `16x16` sprite made up of
    /// `32` bytes. Returns `true` if a set pixel was erased.
    fn draw_sprite(&mut self, sprite: &[u8], x: u8, y: u8, wide: bool) -> bool;
    /// Switches between the low and the extended resolution
    fn set_extended(&mut self, extended: bool);
    fn scroll_up(&mut self, amount: u8);
    fn scroll_down(&mut self, amount: u8);
    fn scroll_left(&mut self, amount: u8);
    fn scroll_right(&mut self, amount: u8);
    /// Selects the bitplanes the following draw opcodes operate on
    fn set_plane_bitmask(&mut self, mask: u8);
    /// Sprites are clipped at the edges if `true`, else they wrap around
    fn set_clipping(&mut self, clip: bool);
    /// Will present the current pixels
    fn draw_screen(&mut self);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for the keyboard input
pub trait KeyboardCommands {
    /// Checks whether the key `0x0..=0xF` is currently held down.
    fn is_pressed(&self, key: u8) -> bool;
    /// Subscribes to the next key press.
    fn wait_key(&mut self) -> KeyWait;
    /// Cancels the pending subscription (if any).
    fn clear_wait(&mut self);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for the beeper
pub trait SoundCommands {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    fn set_frequency(&mut self, frequency: f32);
    fn set_volume(&mut self, volume: f32);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for the external clock driving the interpreter
pub trait TimerCommands {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    /// The amount of instructions run per frame.
    fn set_ticks_per_frame(&mut self, ticks: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Pending,
    Resolved(u8),
    Cancelled,
}

/// Creates a connected single slot channel for a single key press.
///
/// The [`KeyNotifier`](KeyNotifier) is kept by the keyboard, the [`KeyWait`](KeyWait) by the
/// interpreter.
///
/// # Example
/// ```rust
/// # use chip::devices::key_wait;
/// let (notifier, mut wait) = key_wait();
/// assert_eq!(wait.try_take(), None);
/// assert!(notifier.resolve(0xA));
/// assert_eq!(wait.try_take(), Some(0xA));
/// ```
pub fn key_wait() -> (KeyNotifier, KeyWait) {
    let slot = Arc::new(Mutex::new(Slot::Pending));
    (KeyNotifier { slot: slot.clone() }, KeyWait { slot })
}

/// The sending half of a key wait.
#[derive(Debug)]
pub struct KeyNotifier {
    slot: Arc<Mutex<Slot>>,
}

impl KeyNotifier {
    /// Will deliver the key, returns `false` if the wait was already resolved or cancelled.
    pub fn resolve(&self, key: u8) -> bool {
        let mut slot = self.slot.lock();
        if *slot == Slot::Pending {
            *slot = Slot::Resolved(key);
            true
        } else {
            false
        }
    }

    /// Checks if the interpreter still waits on this notifier.
    pub fn is_pending(&self) -> bool {
        *self.slot.lock() == Slot::Pending
    }
}

/// The receiving half of a key wait.
#[derive(Debug)]
pub struct KeyWait {
    slot: Arc<Mutex<Slot>>,
}

impl KeyWait {
    /// Will take the delivered key out of the slot, a cancelled wait never yields a key.
    pub fn try_take(&mut self) -> Option<u8> {
        let mut slot = self.slot.lock();
        match *slot {
            Slot::Resolved(key) => {
                *slot = Slot::Cancelled;
                Some(key)
            }
            _ => None,
        }
    }

    /// Will close the slot, any later resolution is refused.
    pub fn cancel(&mut self) {
        *self.slot.lock() = Slot::Cancelled;
    }

    pub fn is_pending(&self) -> bool {
        *self.slot.lock() == Slot::Pending
    }
}

/// Will represent the last set key with the previous
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    index: u8,
    last: bool,
    current: bool,
}

impl Key {
    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn last(&self) -> bool {
        self.last
    }

    pub fn current(&self) -> bool {
        self.current
    }
}

/// A hex keypad with `16` keys ranging `0-F`.
///
/// Stores the last change to the keys and answers a pending key wait with the next key that goes
/// down.
#[derive(Debug, Default)]
pub struct Keypad {
    keys: [bool; keyboard::SIZE],
    last: Option<Key>,
    pending: Option<KeyNotifier>,
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Will set the state of the given key, keys outside of `0x0..=0xF` are ignored.
    pub fn set_key(&mut self, key: u8, to: bool) {
        let index = key as usize;
        if index >= keyboard::SIZE {
            log::warn!("Ignoring key {:#X} outside of the keypad.", key);
            return;
        }

        self.last = Some(Key {
            index: key,
            last: self.keys[index],
            current: to,
        });
        self.keys[index] = to;

        if to {
            if let Some(notifier) = self.pending.take() {
                notifier.resolve(key);
            }
        }
    }

    pub fn toggle_key(&mut self, key: u8) {
        let current = self.keys.get(key as usize).copied().unwrap_or_default();
        self.set_key(key, !current)
    }

    pub fn keys(&self) -> &[bool] {
        &self.keys
    }

    pub fn last(&self) -> Option<Key> {
        self.last
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.as_ref().map_or(false, KeyNotifier::is_pending)
    }
}

impl KeyboardCommands for Keypad {
    fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or_default()
    }

    fn wait_key(&mut self) -> KeyWait {
        let (notifier, wait) = key_wait();
        self.pending = Some(notifier);
        wait
    }

    fn clear_wait(&mut self) {
        self.pending = None;
    }
}

/// A beeper that keeps track of its settings without making any noise.
#[derive(Debug, Clone, PartialEq)]
pub struct Silence {
    playing: bool,
    frequency: f32,
    volume: f32,
}

impl Default for Silence {
    fn default() -> Self {
        use crate::definitions::sound;
        Self {
            playing: false,
            frequency: sound::FREQUENCY,
            volume: sound::VOLUME,
        }
    }
}

impl Silence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

impl SoundCommands for Silence {
    fn start(&mut self) {
        self.playing = true;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }
}
