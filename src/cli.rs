//! Command-line arguments shared by the `emit_tasks` and `task_worker` binaries.

use crate::{BrokerOptions, MonitorMode, DEFAULT_ADMIN_URL, DEFAULT_QUEUE};
use clap::{Args, Parser};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

/// Where the broker lives and which queue to use.
#[derive(Args, Clone, Debug)]
pub struct BrokerArgs {
    /// Broker host name or IP address.
    #[arg(long, env = "TASKQUEUE_HOST", default_value = "localhost")]
    pub host: String,

    /// Broker AMQP port.
    #[arg(long, env = "TASKQUEUE_PORT", default_value_t = 5672)]
    pub port: u16,

    #[arg(long, env = "TASKQUEUE_USER", default_value = "guest")]
    pub user: String,

    #[arg(long, env = "TASKQUEUE_PASSWORD", default_value = "guest", hide_env_values = true)]
    pub password: String,

    /// AMQP virtual host.
    #[arg(long, env = "TASKQUEUE_VHOST", default_value = "/")]
    pub vhost: String,

    /// Name of the durable task queue.
    #[arg(long, env = "TASKQUEUE_QUEUE", default_value = DEFAULT_QUEUE)]
    pub queue: String,

    /// Heartbeat interval in seconds (0 disables heartbeats).
    #[arg(long, env = "TASKQUEUE_HEARTBEAT", default_value_t = 60)]
    pub heartbeat: u16,

    /// TCP connect timeout in milliseconds. Unset means wait indefinitely.
    #[arg(long, env = "TASKQUEUE_CONNECT_TIMEOUT_MS")]
    pub connect_timeout_ms: Option<u64>,

    /// Connect with amqps.
    #[arg(long, env = "TASKQUEUE_TLS")]
    pub tls: bool,
}

impl BrokerArgs {
    pub fn to_options(&self) -> BrokerOptions {
        BrokerOptions::default()
            .host(self.host.as_str())
            .port(self.port)
            .credentials(self.user.as_str(), self.password.as_str())
            .virtual_host(self.vhost.as_str())
            .queue(self.queue.as_str())
            .heartbeat(self.heartbeat)
            .connection_timeout(self.connect_timeout_ms.map(Duration::from_millis))
            .tls(self.tls)
    }
}

/// Reads a CSV file and publishes every row to the task queue.
#[derive(Parser, Debug)]
#[command(name = "emit_tasks", version)]
pub struct EmitArgs {
    #[command(flatten)]
    pub broker: BrokerArgs,

    /// CSV file to read; every row becomes one task.
    #[arg(long, env = "TASKQUEUE_INPUT", default_value = "tasks.csv")]
    pub input: PathBuf,

    /// Milliseconds to wait between sends.
    #[arg(long, env = "TASKQUEUE_INTERVAL_MS", default_value_t = 1000)]
    pub interval_ms: u64,

    /// Publish without the persistent delivery mode.
    #[arg(long, env = "TASKQUEUE_TRANSIENT")]
    pub transient: bool,

    /// Whether to open the RabbitMQ management console first.
    #[arg(long, value_enum, env = "TASKQUEUE_MONITOR", default_value_t = MonitorMode::Never)]
    pub monitor: MonitorMode,

    /// Management console address opened by --monitor.
    #[arg(long, env = "TASKQUEUE_ADMIN_URL", default_value = DEFAULT_ADMIN_URL)]
    pub admin_url: String,
}

impl EmitArgs {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Consumes tasks from the queue, simulating one unit of work per trailing '.'.
#[derive(Parser, Debug)]
#[command(name = "task_worker", version)]
pub struct WorkerArgs {
    #[command(flatten)]
    pub broker: BrokerArgs,

    /// Maximum number of unacknowledged tasks held at once.
    #[arg(long, env = "TASKQUEUE_PREFETCH", default_value_t = 1)]
    pub prefetch: u16,

    /// Milliseconds of simulated work per trailing '.' in a task.
    #[arg(long, env = "TASKQUEUE_MS_PER_DOT", default_value_t = 1000)]
    pub ms_per_dot: u64,
}

impl WorkerArgs {
    pub fn per_dot(&self) -> Duration {
        Duration::from_millis(self.ms_per_dot)
    }
}

/// Prints `err` the way both binaries report fatal errors and exits with status 1.
pub fn exit_with_error(err: &crate::Error) -> ! {
    eprintln!();
    eprintln!("ERROR: {}", err);
    eprintln!();
    process::exit(1)
}
