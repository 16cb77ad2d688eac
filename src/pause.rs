use std::thread;
use std::time::Duration;

/// Blocking wait between units of work.
///
/// The emitter pauses between sends and the worker pauses to simulate work; both go through
/// this trait so tests can record the requested durations instead of sleeping.
pub trait Pause {
    fn pause(&mut self, duration: Duration);
}

/// Puts the current thread to sleep.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPause;

impl Pause for ThreadPause {
    fn pause(&mut self, duration: Duration) {
        if duration > Duration::from_secs(0) {
            thread::sleep(duration);
        }
    }
}

impl<P: Pause + ?Sized> Pause for &mut P {
    fn pause(&mut self, duration: Duration) {
        (**self).pause(duration)
    }
}
