//! ZeroMQ PUSH producer.
//!
//! Connects to the pull side and sends two-frame messages as fast as the
//! socket accepts them. Prints nothing; the pull side reports the rate.

use clap::Parser;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "zmq_push_thr", about = "ZeroMQ PUSH throughput producer")]
struct Args {
    /// Endpoint to connect the push side to
    #[arg(short = 'e')]
    endpoint: String,

    /// Payload size in bytes
    #[arg(short = 'p')]
    payload: usize,
}

fn main() {
    dyno_core::logging::init_tracing();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("zmq_push_thr: {e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = zmq::Context::new();
    let socket = dyno_zmq::push_socket(&ctx, &args.endpoint)?;
    let payload = vec![0u8; args.payload];

    // A dead pipeline has no rate worth measuring; any socket error is
    // fatal.
    loop {
        dyno_zmq::send_frames(&socket, &payload)?;
    }
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
