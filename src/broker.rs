use crate::errors::*;
use crate::interrupt::Wake;
use crate::{BrokerOptions, Interrupt, Task, TaskPublisher, TaskSource};
use amiquip::{
    AmqpProperties, Channel, Connection, Consumer, ConsumerMessage, ConsumerOptions, Delivery,
    Exchange, Publish, Queue, QueueDeclareOptions,
};
use log::{debug, trace};
use snafu::ResultExt;

/// AMQP delivery mode that asks the broker to write the message to disk.
const PERSISTENT: u8 = 2;

/// An open connection to the broker.
pub struct Broker {
    connection: Connection,
    host: String,
}

impl Broker {
    /// Connects using `options`. Any failure (DNS, refused TCP connection, rejected
    /// credentials, missing vhost) is reported as [`Error::Connect`].
    pub fn open(options: &BrokerOptions) -> Result<Broker> {
        let host = options.display_host();
        let url = options.amqp_url()?;
        debug!("connecting to {}", host);

        let connection = if options.uses_tls() {
            open_tls(url.as_str(), &host)?
        } else {
            Connection::insecure_open(url.as_str()).context(ConnectSnafu { host: &host })?
        };

        debug!("connected to {}", host);
        Ok(Broker { connection, host })
    }

    /// Opens a channel; the library picks the channel id.
    pub fn open_channel(&mut self) -> Result<Channel> {
        self.connection.open_channel(None).context(OpenChannelSnafu)
    }

    /// Closes the connection, waiting for the broker to confirm.
    pub fn close(self) -> Result<()> {
        debug!("closing connection to {}", self.host);
        self.connection.close().context(CloseSnafu)
    }
}

#[cfg(feature = "native-tls")]
fn open_tls(url: &str, host: &str) -> Result<Connection> {
    Connection::open(url).context(ConnectSnafu { host })
}

#[cfg(not(feature = "native-tls"))]
fn open_tls(_url: &str, _host: &str) -> Result<Connection> {
    TlsUnavailableSnafu.fail()
}

/// Declares the shared task queue as durable so it (and its persistent messages) survive a
/// broker restart. Emitters and workers declare with the same options, so redeclaring an
/// existing queue is a no-op.
pub fn declare_task_queue<'a>(channel: &'a Channel, queue: &str) -> Result<Queue<'a>> {
    let declared = channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
        )
        .context(DeclareQueueSnafu { queue })?;
    debug!("declared durable queue {}", queue);
    Ok(declared)
}

/// Publishes task messages to a queue via the default exchange.
pub struct AmqpPublisher<'a> {
    exchange: Exchange<'a>,
    queue: String,
    persistent: bool,
}

impl<'a> AmqpPublisher<'a> {
    pub fn new<S: Into<String>>(channel: &'a Channel, queue: S) -> AmqpPublisher<'a> {
        AmqpPublisher {
            exchange: Exchange::direct(channel),
            queue: queue.into(),
            persistent: true,
        }
    }

    /// Sets whether messages are published with the persistent delivery mode (the default).
    pub fn persistent(self, persistent: bool) -> Self {
        AmqpPublisher { persistent, ..self }
    }
}

impl TaskPublisher for AmqpPublisher<'_> {
    fn publish(&mut self, message: &str) -> Result<()> {
        let properties = if self.persistent {
            AmqpProperties::default().with_delivery_mode(PERSISTENT)
        } else {
            AmqpProperties::default()
        };
        trace!("publishing {} bytes to {}", message.len(), self.queue);
        self.exchange
            .publish(Publish::with_properties(
                message.as_bytes(),
                self.queue.as_str(),
                properties,
            ))
            .context(PublishSnafu { queue: &self.queue })
    }
}

/// Pulls tasks from a queue through a manually-acknowledged consumer.
pub struct AmqpTaskSource<'a> {
    consumer: Consumer<'a>,
    queue: String,
    interrupt: Interrupt,
    interrupted: bool,
}

impl<'a> AmqpTaskSource<'a> {
    /// Limits the channel to `prefetch_count` unacknowledged messages, then starts consuming
    /// `queue`.
    pub fn start(
        channel: &'a Channel,
        queue: &'a Queue<'a>,
        prefetch_count: u16,
    ) -> Result<AmqpTaskSource<'a>> {
        channel
            .qos(0, prefetch_count, false)
            .context(SetQosSnafu { prefetch_count })?;

        let consumer = queue
            .consume(ConsumerOptions {
                no_ack: false,
                ..ConsumerOptions::default()
            })
            .context(StartConsumerSnafu {
                queue: queue.name(),
            })?;
        debug!(
            "consuming {} as {} (prefetch {})",
            queue.name(),
            consumer.consumer_tag(),
            prefetch_count
        );

        Ok(AmqpTaskSource {
            consumer,
            queue: queue.name().to_string(),
            interrupt: Interrupt::never(),
            interrupted: false,
        })
    }

    /// Stop handing out tasks (report the source exhausted) once `interrupt` fires. A task
    /// already handed out is still finished and acknowledged by the worker.
    pub fn interrupt_on(self, interrupt: Interrupt) -> Self {
        AmqpTaskSource { interrupt, ..self }
    }

    /// True once the source stopped because of the interrupt.
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }
}

impl TaskSource for AmqpTaskSource<'_> {
    type Receipt = Delivery;

    fn next_task(&mut self) -> Result<Option<(Task, Delivery)>> {
        if self.interrupted {
            return Ok(None);
        }
        let message = match self.interrupt.wait(self.consumer.receiver()) {
            Wake::Message(message) => message,
            Wake::Interrupted => {
                debug!("interrupted; no longer consuming {}", self.queue);
                self.interrupted = true;
                return Ok(None);
            }
            Wake::Disconnected => {
                return ConsumerEndedSnafu {
                    queue: &self.queue,
                    reason: "connection dropped",
                }
                .fail()
            }
        };
        match message {
            ConsumerMessage::Delivery(delivery) => {
                trace!("received delivery {}", delivery.delivery_tag());
                let task = Task::from_content(&delivery.body, delivery.redelivered);
                Ok(Some((task, delivery)))
            }
            other => ConsumerEndedSnafu {
                queue: &self.queue,
                reason: format!("{:?}", other),
            }
            .fail(),
        }
    }

    fn ack(&mut self, delivery: Delivery) -> Result<()> {
        self.consumer.ack(delivery).context(AckSnafu)
    }
}
