//! MQTT streaming publisher.
//!
//! Publishes fixed-size messages on `/test/thr` as fast as the client
//! accepts them. With `-t`, a reporter thread drains the shared counter
//! once per second and prints a throughput record every interval, zero
//! included.

use clap::Parser;
use dyno_core::prelude::*;
use paho_mqtt as mqtt;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "mqtt_pub_thr", about = "MQTT streaming throughput publisher")]
struct Args {
    /// Broker address
    #[arg(short = 'b', default_value = dyno_mqtt::DEFAULT_BROKER)]
    broker: String,

    /// Payload size in bytes
    #[arg(short = 'p', default_value_t = 8)]
    payload: usize,

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
        eprintln!("mqtt_pub_thr: {e}");
        process::exit(1);
    }
}

fn run(args: Args) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let client = dyno_mqtt::create_client(&args.broker, "mqtt_pub_thr")?;
    let gate = Arc::new(ConnectionGate::new());
    dyno_mqtt::connect(&client, &gate)?;

    let data = vec![0u8; args.payload];

    if args.print {
        let counter = Arc::new(ThroughputCounter::new());
        let shutdown = ShutdownToken::new();

        let name = args.name.unwrap_or_default();
        let scenario = args.scenario.unwrap_or_default();
        let payload_size = args.payload;
        let reporter = Reporter::spawn(
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
        );

        while !shutdown.is_triggered() {
            match client.try_publish(mqtt::Message::new(
                dyno_mqtt::THR_TOPIC,
                data.as_slice(),
                dyno_mqtt::QOS,
            )) {
                Ok(_) => counter.record(),
                Err(e) => warn!(error = %e, "publish rejected"),
            }
        }
        reporter.join().ok();
    } else {
        loop {
            if let Err(e) = client.try_publish(mqtt::Message::new(
                dyno_mqtt::THR_TOPIC,
                data.as_slice(),
                dyno_mqtt::QOS,
            )) {
                warn!(error = %e, "publish rejected");
            }
        }
    }
    Ok(())
}
