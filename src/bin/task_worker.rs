// Listens for tasks on the durable task queue until interrupted. Start several of these to
// add workers; the broker hands each one a single unacknowledged task at a time.
use clap::Parser;
use taskqueue::cli::{self, WorkerArgs};
use taskqueue::{
    declare_task_queue, AmqpTaskSource, Broker, Interrupt, Result, ThreadPause, Worker,
};

fn run(args: WorkerArgs) -> Result<()> {
    let interrupt = Interrupt::install()?;
    let options = args.broker.to_options();
    let mut broker = Broker::open(&options)?;

    let outcome = work(&mut broker, &args, options.queue_name(), interrupt);

    // Once connected, always say goodbye and close, whether we were interrupted or failed.
    println!("\nClosing connection. Goodbye.\n");
    let closed = broker.close();
    outcome.and(closed)
}

fn work(broker: &mut Broker, args: &WorkerArgs, queue: &str, interrupt: Interrupt) -> Result<()> {
    let channel = broker.open_channel()?;
    let queue = declare_task_queue(&channel, queue)?;

    let mut source =
        AmqpTaskSource::start(&channel, &queue, args.prefetch)?.interrupt_on(interrupt);
    let mut worker = Worker::new(ThreadPause, args.per_dot());
    worker.run(&mut source)?;

    if source.interrupted() {
        println!();
        println!("User interrupted continuous listening process.");
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run(WorkerArgs::parse()) {
        cli::exit_with_error(&err);
    }
}
