use snafu::Snafu;
use std::io;
use std::path::PathBuf;

/// A type alias for handling errors throughout taskqueue.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Specific error cases returned by taskqueue.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    /// The configured host/port do not form a valid AMQP URL.
    #[snafu(display("invalid broker address {}: {}", host, message))]
    InvalidUrl { host: String, message: String },

    /// Could not open a connection to the broker.
    #[snafu(display(
        "Connection to RabbitMQ server failed. Verify the server is running on host={}: {}",
        host,
        source
    ))]
    Connect { host: String, source: amiquip::Error },

    /// Could not open a channel on an established connection.
    #[snafu(display("could not open channel: {}", source))]
    OpenChannel { source: amiquip::Error },

    /// The broker rejected the queue declaration.
    #[snafu(display("could not declare queue {}: {}", queue, source))]
    DeclareQueue {
        queue: String,
        source: amiquip::Error,
    },

    /// The broker rejected the prefetch (QoS) setting.
    #[snafu(display("could not set prefetch count to {}: {}", prefetch_count, source))]
    SetQos {
        prefetch_count: u16,
        source: amiquip::Error,
    },

    /// Could not start consuming from the queue.
    #[snafu(display("could not start consumer on queue {}: {}", queue, source))]
    StartConsumer {
        queue: String,
        source: amiquip::Error,
    },

    /// Publishing a message failed.
    #[snafu(display("could not publish to queue {}: {}", queue, source))]
    Publish {
        queue: String,
        source: amiquip::Error,
    },

    /// Acknowledging a delivery failed.
    #[snafu(display("could not acknowledge message: {}", source))]
    Ack { source: amiquip::Error },

    /// Closing the connection failed.
    #[snafu(display("could not close connection cleanly: {}", source))]
    Close { source: amiquip::Error },

    /// The consumer stopped delivering messages (cancelled, or the channel or connection
    /// closed underneath it).
    #[snafu(display("consumer on queue {} ended: {}", queue, reason))]
    ConsumerEnded { queue: String, reason: String },

    /// The CSV input could not be opened.
    #[snafu(display("could not open {}: {}", path.display(), source))]
    OpenCsv { path: PathBuf, source: csv::Error },

    /// A CSV row could not be read.
    #[snafu(display("could not read row {} of {}: {}", row, path.display(), source))]
    ReadCsvRow {
        path: PathBuf,
        row: usize,
        source: csv::Error,
    },

    /// Reading the answer to a console prompt failed.
    #[snafu(display("could not read from console: {}", source))]
    Prompt { source: io::Error },

    /// The Ctrl-C handler could not be installed.
    #[snafu(display("could not install Ctrl-C handler: {}", source))]
    InstallInterrupt { source: ctrlc::Error },

    /// An `amqps` URL was requested but TLS support was not compiled in.
    #[snafu(display("TLS requested but taskqueue was built without the native-tls feature"))]
    TlsUnavailable,
}
