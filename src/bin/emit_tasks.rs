// Reads a CSV file and publishes each row to the durable task queue. Start one or more
// task_worker processes in other shells to share the work.
use clap::Parser;
use taskqueue::cli::{self, EmitArgs};
use taskqueue::{
    declare_task_queue, offer_admin_console, AmqpPublisher, Broker, Emitter, Result, TaskReader,
    ThreadPause,
};

fn run(args: EmitArgs) -> Result<()> {
    offer_admin_console(args.monitor, &args.admin_url)?;

    // Open the input before connecting so a typo in the path doesn't touch the broker.
    let tasks = TaskReader::open(&args.input)?;

    let options = args.broker.to_options();
    let mut broker = Broker::open(&options)?;
    let channel = broker.open_channel()?;
    let _ = declare_task_queue(&channel, options.queue_name())?;

    let publisher =
        AmqpPublisher::new(&channel, options.queue_name()).persistent(!args.transient);
    let mut emitter = Emitter::new(publisher, ThreadPause, args.interval());
    emitter.emit_all(tasks)?;

    broker.close()
}

fn main() {
    env_logger::init();

    if let Err(err) = run(EmitArgs::parse()) {
        cli::exit_with_error(&err);
    }
}
