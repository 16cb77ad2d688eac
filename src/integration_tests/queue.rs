use super::{unique_queue, with_chan};
use crate::{declare_task_queue, AmqpPublisher, AmqpTaskSource, Emitter, TaskSource, Worker};
use crate::{Pause, TaskReader};
use amiquip::QueueDeleteOptions;
use std::time::Duration;

struct NoPause;

impl Pause for NoPause {
    fn pause(&mut self, _: Duration) {}
}

// Collects up to `n` tasks, acking each one.
struct Limited<'a> {
    inner: AmqpTaskSource<'a>,
    remaining: usize,
}

impl TaskSource for Limited<'_> {
    type Receipt = amiquip::Delivery;

    fn next_task(&mut self) -> crate::Result<Option<(crate::Task, Self::Receipt)>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        self.inner.next_task()
    }

    fn ack(&mut self, receipt: Self::Receipt) -> crate::Result<()> {
        self.inner.ack(receipt)
    }
}

#[test]
fn test_redeclare_durable_queue() {
    let name = unique_queue("redeclare");

    with_chan(|chan, _| {
        let q1 = declare_task_queue(chan, &name).unwrap();
        let q2 = declare_task_queue(chan, &name).unwrap();
        assert_eq!(q1.name(), q2.name());
        q2.delete(QueueDeleteOptions::default()).unwrap();
    })
}

#[test]
fn test_emit_then_work() {
    let name = unique_queue("roundtrip");

    with_chan(|chan, _| {
        let queue = declare_task_queue(chan, &name).unwrap();

        let rows = TaskReader::from_reader("inline.csv", &b"first,.\nsecond,..\n"[..]);
        let mut emitter = Emitter::new(AmqpPublisher::new(chan, name.as_str()), NoPause, Duration::from_secs(0));
        assert_eq!(emitter.emit_all(rows).unwrap(), 2);

        let mut source = Limited {
            inner: AmqpTaskSource::start(chan, &queue, 1).unwrap(),
            remaining: 2,
        };
        let mut worker = Worker::new(NoPause, Duration::from_secs(1));
        assert_eq!(worker.run(&mut source).unwrap(), 2);
    });

    // Everything was acknowledged, so a fresh connection sees an empty queue.
    with_chan(|chan, _| {
        let queue = declare_task_queue(chan, &name).unwrap();
        assert_eq!(queue.declared_message_count(), Some(0));
        queue.delete(QueueDeleteOptions::default()).unwrap();
    })
}

#[test]
fn test_tasks_arrive_in_order() {
    let name = unique_queue("order");

    with_chan(|chan, _| {
        let queue = declare_task_queue(chan, &name).unwrap();
        let mut publisher = AmqpPublisher::new(chan, name.as_str());
        for body in &["a", "b.", "c.."] {
            crate::TaskPublisher::publish(&mut publisher, body).unwrap();
        }

        let mut source = AmqpTaskSource::start(chan, &queue, 1).unwrap();
        for expected in &["a", "b.", "c.."] {
            let (task, delivery) = source.next_task().unwrap().unwrap();
            assert_eq!(task.body(), *expected);
            source.ack(delivery).unwrap();
        }
        drop(source);
        queue.delete(QueueDeleteOptions::default()).unwrap();
    })
}
