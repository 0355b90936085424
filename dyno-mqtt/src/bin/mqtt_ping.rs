//! MQTT round-trip latency probe.
//!
//! Publishes correlated probes on `/test/ping` at a fixed interval and
//! times the responder's echo on `/test/pong`. One CSV latency record per
//! round trip on stdout.

use clap::Parser;
use dyno_core::prelude::*;
use paho_mqtt as mqtt;
use std::process;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "mqtt_ping", about = "MQTT round-trip latency probe")]
struct Args {
    /// Broker address
    #[arg(short = 'b', default_value = dyno_mqtt::DEFAULT_BROKER)]
    broker: String,

    /// Payload size in bytes
    #[arg(short = 'p', default_value_t = 8)]
    payload: usize,

    /// Run name
    #[arg(short = 'n')]
    name: String,

    /// Scenario label
    #[arg(short = 's')]
    scenario: String,

    /// Inter-probe interval in seconds
    #[arg(short = 'i', default_value_t = 1.0)]
    interval: f64,

    /// Give up on an unanswered probe after this many seconds and emit a
    /// sentinel record (-1) instead of blocking forever
    #[arg(long)]
    timeout: Option<f64>,
}

fn main() {
    dyno_core::logging::init_tracing();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("mqtt_ping: {e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let client = dyno_mqtt::create_client(&args.broker, "mqtt_ping")?;
    let gate = Arc::new(ConnectionGate::new());
    let rendezvous = Arc::new(RendezvousChannel::new());

    // Reply callback: filter by topic, deposit the echoed sequence,
    // return. Traffic on other topics is normal multiplexing and is
    // dropped without a log.
    let reply = Arc::clone(&rendezvous);
    client.set_message_callback(move |_client, message| {
        if let Some(message) = message {
            if message.topic() == dyno_mqtt::PONG_TOPIC {
                if let Some(seq) = read_seq(message.payload()) {
                    reply.deposit(seq);
                }
            }
        }
    });

    dyno_mqtt::connect(&client, &gate)?;
    dyno_mqtt::subscribe(&client, dyno_mqtt::PONG_TOPIC, &gate)?;

    let payload_size = args.payload.max(SEQ_BYTES);
    let config = ProbeConfig {
        interval: Duration::from_secs_f64(args.interval),
        payload_size,
        timeout: args.timeout.map(Duration::from_secs_f64),
    };
    let shutdown = ShutdownToken::new();

    run_probe_loop(
        &config,
        &rendezvous,
        &shutdown,
        |data| {
            client
                .try_publish(mqtt::Message::new(dyno_mqtt::PING_TOPIC, data, dyno_mqtt::QOS))
                .map(|_| ())
        },
        |seq, elapsed| {
            emit(&Record {
                backend: Backend::Mqtt,
                scenario: &args.scenario,
                kind: Kind::Latency,
                name: &args.name,
                payload_size,
                seq: Some(seq),
                value: elapsed,
            });
        },
    );
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
