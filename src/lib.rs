//! A CSV-driven work queue on top of RabbitMQ.
//!
//! The `emit_tasks` binary reads rows from a CSV file and publishes each one, comma-joined,
//! to a durable queue. Any number of `task_worker` processes consume that queue with a
//! prefetch of one, pretend to work for one second per trailing `.` in the message, and then
//! acknowledge it. The broker does everything else: persistence, redelivery of
//! unacknowledged messages, and round-robin dispatch across workers.
//!
//! The pieces are usable on their own. [`Emitter`] and [`Worker`] only see the
//! [`TaskPublisher`] and [`TaskSource`] traits; [`AmqpPublisher`] and [`AmqpTaskSource`]
//! implement those over an [amiquip](https://docs.rs/amiquip) channel.

mod broker;
mod emitter;
mod errors;
mod interrupt;
mod monitor;
mod options;
mod pause;
mod tasks;
mod worker;

pub mod cli;

pub use broker::{declare_task_queue, AmqpPublisher, AmqpTaskSource, Broker};
pub use emitter::{Emitter, TaskPublisher};
pub use errors::{Error, Result};
pub use interrupt::Interrupt;
pub use monitor::{offer_admin_console, should_open};
pub use options::{BrokerOptions, MonitorMode, DEFAULT_ADMIN_URL, DEFAULT_QUEUE};
pub use pause::{Pause, ThreadPause};
pub use tasks::{row_to_message, TaskReader};
pub use worker::{trailing_dots, work_duration, Task, TaskSource, Worker};

#[cfg(test)]
mod integration_tests;
