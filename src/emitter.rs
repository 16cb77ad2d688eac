use crate::errors::*;
use crate::Pause;
use log::{debug, trace};
use std::time::Duration;

/// Something that can hand a single task message to the broker.
pub trait TaskPublisher {
    fn publish(&mut self, message: &str) -> Result<()>;
}

impl<T: TaskPublisher + ?Sized> TaskPublisher for &mut T {
    fn publish(&mut self, message: &str) -> Result<()> {
        (**self).publish(message)
    }
}

/// Sends task messages one at a time, pausing between sends.
pub struct Emitter<T, P> {
    publisher: T,
    pause: P,
    interval: Duration,
}

impl<T: TaskPublisher, P: Pause> Emitter<T, P> {
    pub fn new(publisher: T, pause: P, interval: Duration) -> Emitter<T, P> {
        Emitter {
            publisher,
            pause,
            interval,
        }
    }

    /// Publishes every message produced by `messages`, in order, and returns how many were
    /// sent. The first read or publish error stops the run.
    pub fn emit_all<I>(&mut self, messages: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<String>>,
    {
        let mut sent = 0;
        for message in messages {
            let message = message?;
            if sent > 0 {
                trace!("pausing {:?} before next send", self.interval);
                self.pause.pause(self.interval);
            }
            self.publisher.publish(&message)?;
            println!("[x] Sent {}", message);
            sent += 1;
        }
        debug!("sent {} task(s)", sent);
        Ok(sent)
    }
}
