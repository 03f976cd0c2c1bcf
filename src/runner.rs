use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::{
    chip8::Interpreter,
    definitions::timer,
    devices::{DisplayCommands, KeyboardCommands, SoundCommands, TimerCommands},
    timer::{Worker, Working},
};

/// Drives the shared interpreter one frame per timer tick (`60Hz`). A fatal error halts the
/// interpreter, the following frames are no-ops.
///
/// The interpreter has to be [started](Interpreter::start) for anything to happen, the returned
/// worker stops when dropped.
pub fn run<D, T, K, S>(chip: Arc<Mutex<Interpreter<D, T, K, S>>>) -> Worker
where
    D: DisplayCommands + Send + 'static,
    T: TimerCommands + Send + 'static,
    K: KeyboardCommands + Send + 'static,
    S: SoundCommands + Send + 'static,
{
    let inner_run = move || {
        let mut chip = chip.lock();
        if let Err(err) = chip.run_frame() {
            log::error!("Stopped running the program: {}", err);
        }
    };

    let mut worker = Worker::new();
    worker.start(inner_run, Duration::from_millis(timer::INTERVAL));
    worker
}
