use crate::errors::*;
use crate::Pause;
use log::{debug, trace, warn};
use std::convert::TryFrom;
use std::time::Duration;

/// A message handed to a worker.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    body: String,
    redelivered: bool,
}

impl Task {
    pub fn new<S: Into<String>>(body: S, redelivered: bool) -> Task {
        Task {
            body: body.into(),
            redelivered,
        }
    }

    /// Builds a task from raw message content. Invalid UTF-8 is replaced rather than rejected.
    pub fn from_content(content: &[u8], redelivered: bool) -> Task {
        Task::new(String::from_utf8_lossy(content), redelivered)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// True if the broker has delivered this message before (e.g. a previous worker died
    /// before acknowledging it).
    pub fn redelivered(&self) -> bool {
        self.redelivered
    }
}

/// Where a worker gets tasks from and reports them finished to.
///
/// `Receipt` is whatever the source needs back to acknowledge the task it handed out.
pub trait TaskSource {
    type Receipt;

    /// Blocks until the next task is available. `Ok(None)` means the source is exhausted.
    fn next_task(&mut self) -> Result<Option<(Task, Self::Receipt)>>;

    /// Tells the source the task is done and may be forgotten.
    fn ack(&mut self, receipt: Self::Receipt) -> Result<()>;
}

/// Number of `.` characters at the very end of `body`.
pub fn trailing_dots(body: &str) -> usize {
    body.bytes().rev().take_while(|&b| b == b'.').count()
}

/// How long a worker pretends to work on `body`: one `per_dot` for each trailing dot.
pub fn work_duration(body: &str, per_dot: Duration) -> Duration {
    u32::try_from(trailing_dots(body))
        .ok()
        .and_then(|dots| per_dot.checked_mul(dots))
        .unwrap_or(Duration::MAX)
}

/// Processes tasks one at a time: simulate the work, then acknowledge.
pub struct Worker<P> {
    pause: P,
    per_dot: Duration,
}

impl<P: Pause> Worker<P> {
    pub fn new(pause: P, per_dot: Duration) -> Worker<P> {
        Worker { pause, per_dot }
    }

    /// Handles every task `source` produces and returns how many were acknowledged. Returns
    /// `Ok` once the source stops handing out tasks (it ran dry, or was interrupted); the
    /// first error ends the loop.
    pub fn run<S: TaskSource>(&mut self, source: &mut S) -> Result<usize> {
        println!("[*] Ready for work. To exit press CTRL+C");

        let mut handled = 0;
        while let Some((task, receipt)) = source.next_task()? {
            self.handle(&task);
            source.ack(receipt)?;
            trace!("acknowledged task {}", handled);
            handled += 1;
        }
        debug!("task source exhausted after {} task(s)", handled);
        Ok(handled)
    }

    fn handle(&mut self, task: &Task) {
        if task.redelivered() {
            warn!("task was delivered before: {}", task.body());
        }
        println!("[x] Received {}", task.body());
        self.pause.pause(work_duration(task.body(), self.per_dot));
        println!("[x] Done.");
    }
}
