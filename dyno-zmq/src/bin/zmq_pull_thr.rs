//! ZeroMQ PULL consumer.
//!
//! Binds the pull side, counts every fully dequeued message, and prints a
//! throughput record once per second for intervals that saw traffic.

use clap::Parser;
use dyno_core::prelude::*;
use std::process;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "zmq_pull_thr", about = "ZeroMQ PULL throughput consumer")]
struct Args {
    /// Bind address for the pull side
    #[arg(short = 'l')]
    listen: String,

    /// Payload size in bytes (label only, the socket accepts any size)
    #[arg(short = 'p')]
    payload: usize,

    /// Run name
    #[arg(short = 'n')]
    name: String,

    /// Scenario label
    #[arg(short = 's')]
    scenario: String,
}

fn main() {
    dyno_core::logging::init_tracing();
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("zmq_pull_thr: {e}");
        process::exit(1);
    }
}

fn run(args: Args) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let ctx = zmq::Context::new();
    let socket = dyno_zmq::pull_socket(&ctx, &args.listen)?;

    let counter = Arc::new(ThroughputCounter::new());
    let shutdown = ShutdownToken::new();

    let payload_size = args.payload;
    let reporter = Reporter::spawn(
        Arc::clone(&counter),
        Duration::from_secs(1),
        ReportMode::NonZero,
        shutdown.clone(),
        move |n| {
            emit(&Record {
                backend: Backend::Zeromq,
                scenario: &args.scenario,
                kind: Kind::Throughput,
                name: &args.name,
                payload_size,
                seq: None,
                value: n as i64,
            });
        },
    );

    while !shutdown.is_triggered() {
        socket.recv_multipart(0)?;
        counter.record();
    }
    reporter.join().ok();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Args::command().debug_assert();
    }
}
