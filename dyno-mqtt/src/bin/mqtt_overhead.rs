//! Bounded MQTT publisher (overhead mode).
//!
//! Publishes on `/test/overhead` until exactly `volume / payload` sends
//! were accepted, then exits 0. A rejected send is retried with the same
//! message so the accepted total always matches the target.

use clap::Parser;
use dyno_core::prelude::*;
use paho_mqtt as mqtt;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

const BYTES_PER_MB: u64 = 1_048_576;

#[derive(Parser, Debug)]
#[command(name = "mqtt_overhead", about = "Bounded MQTT publisher, exits after a fixed volume")]
struct Args {
    /// Broker address
    #[arg(short = 'b', default_value = dyno_mqtt::DEFAULT_BROKER)]
    broker: String,

    /// Payload size in bytes
    #[arg(short = 'p', default_value_t = 8)]
    payload: usize,

    /// Total volume to send, in megabytes
    #[arg(short = 'v', default_value_t = 1)]
    volume: u64,

    /// Spawn the reporter thread and print a throughput record every second
    #[arg(short = 't')]
    print: bool,

    /// Run name
    #[arg(short = 'n', required_if_eq("print", "true"))]
    name: Option<String>,

    /// Scenario label
    #[arg(short = 's', required_if_eq("print", "true"))]
    scenario: Option<String>,
}

fn main() {
    dyno_core::logging::init_tracing();
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("mqtt_overhead: {e}");
        process::exit(1);
    }
}

fn run(args: Args) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let client = dyno_mqtt::create_client(&args.broker, "mqtt_overhead")?;
    let gate = Arc::new(ConnectionGate::new());
    dyno_mqtt::connect(&client, &gate)?;

    if args.payload == 0 {
        return Err("payload size must be positive".into());
    }
    let payload_size = args.payload;
    let total_bytes = args.volume * BYTES_PER_MB;
    let counter = Arc::new(ThroughputCounter::new());
    let shutdown = ShutdownToken::new();

    let reporter = if args.print {
        let name = args.name.unwrap_or_default();
        let scenario = args.scenario.unwrap_or_default();
        Some(Reporter::spawn(
            Arc::clone(&counter),
            Duration::from_secs(1),
            ReportMode::Always,
            shutdown.clone(),
            move |n| {
                emit(&Record {
                    backend: Backend::Mqtt,
                    scenario: &scenario,
                    kind: Kind::Throughput,
                    name: &name,
                    payload_size,
                    seq: None,
                    value: n as i64,
                });
            },
        ))
    } else {
        None
    };

    let sender = {
        let client = client.clone();
        let counter = Arc::clone(&counter);
        let shutdown = shutdown.clone();
        let data = vec![0u8; payload_size];
        thread::spawn(move || {
            run_bounded(total_bytes, payload_size, &counter, &shutdown, || {
                client
                    .try_publish(mqtt::Message::new(
                        dyno_mqtt::OVERHEAD_TOPIC,
                        data.as_slice(),
                        dyno_mqtt::QOS,
                    ))
                    .map(|_| ())
            })
        })
    };

    let accepted = sender.join().map_err(|_| "sender thread panicked")?;
    shutdown.trigger();
    if let Some(handle) = reporter {
        handle.join().map_err(|_| "reporter thread panicked")?;
    }
    debug!(accepted, total_bytes, "volume sent");
    Ok(())
}
