use crate::errors::*;
use crossbeam_channel::{bounded, never, select, Receiver};
use log::debug;
use snafu::ResultExt;

/// Delivers Ctrl-C (SIGINT) presses as channel messages instead of killing the process, so a
/// blocked worker can stop consuming and close its connection cleanly.
#[derive(Clone, Debug)]
pub struct Interrupt {
    rx: Receiver<()>,
}

impl Interrupt {
    /// Installs the process-wide Ctrl-C handler. Fails if a handler is already installed.
    pub fn install() -> Result<Interrupt> {
        let (tx, rx) = bounded(1);
        ctrlc::set_handler(move || {
            // a press that arrives while one is still pending is the same request
            let _ = tx.try_send(());
        })
        .context(InstallInterruptSnafu)?;
        debug!("installed Ctrl-C handler");
        Ok(Interrupt { rx })
    }

    /// An interrupt that never fires.
    pub fn never() -> Interrupt {
        Interrupt { rx: never() }
    }

    pub(crate) fn from_receiver(rx: Receiver<()>) -> Interrupt {
        Interrupt { rx }
    }

    /// Blocks until `messages` yields something or the interrupt fires, whichever comes
    /// first. A pending interrupt takes priority over queued messages.
    pub(crate) fn wait<T>(&self, messages: &Receiver<T>) -> Wake<T> {
        if self.rx.try_recv().is_ok() {
            return Wake::Interrupted;
        }
        select! {
            recv(messages) -> message => match message {
                Ok(message) => Wake::Message(message),
                Err(_) => Wake::Disconnected,
            },
            recv(self.rx) -> _ => Wake::Interrupted,
        }
    }
}

#[derive(Debug, PartialEq)]
pub(crate) enum Wake<T> {
    Message(T),
    Interrupted,
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn message_wins_without_interrupt() {
        let (tx, rx) = unbounded();
        tx.send(7).unwrap();
        assert_eq!(Interrupt::never().wait(&rx), Wake::Message(7));
    }

    #[test]
    fn interrupt_wakes_a_blocked_wait() {
        let (_tx, rx) = unbounded::<u32>();
        let (int_tx, int_rx) = bounded(1);
        let interrupt = Interrupt::from_receiver(int_rx);

        let handle = thread::spawn(move || interrupt.wait(&rx));
        thread::sleep(Duration::from_millis(20));
        int_tx.send(()).unwrap();
        assert_eq!(handle.join().unwrap(), Wake::Interrupted);
    }

    #[test]
    fn pending_interrupt_beats_queued_message() {
        let (tx, rx) = unbounded();
        tx.send(1).unwrap();
        let (int_tx, int_rx) = bounded(1);
        int_tx.send(()).unwrap();
        let interrupt = Interrupt::from_receiver(int_rx);
        assert_eq!(interrupt.wait(&rx), Wake::Interrupted);
        assert_eq!(interrupt.wait(&rx), Wake::Message(1));
    }

    #[test]
    fn dropped_sender_is_disconnect() {
        let (tx, rx) = unbounded::<u32>();
        drop(tx);
        assert_eq!(Interrupt::never().wait(&rx), Wake::Disconnected);
    }
}
