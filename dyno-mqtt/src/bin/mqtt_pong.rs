//! MQTT echo responder.
//!
//! Subscribes to `/test/ping` and republishes every arriving payload on
//! `/test/pong`, untouched, so the probe side can correlate sequence
//! numbers. Runs until killed.

use clap::Parser;
use dyno_core::prelude::*;
use paho_mqtt as mqtt;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "mqtt_pong", about = "MQTT echo responder for latency probes")]
struct Args {
    /// Broker address
    #[arg(short = 'b', default_value = dyno_mqtt::DEFAULT_BROKER)]
    broker: String,
}

fn main() {
    dyno_core::logging::init_tracing();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("mqtt_pong: {e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let client = dyno_mqtt::create_client(&args.broker, "mqtt_pong")?;
    let gate = Arc::new(ConnectionGate::new());

    // Ping arrived: send it straight back, retrying until the client
    // accepts the submission. Other topics are dropped silently.
    client.set_message_callback(|client, message| {
        if let Some(message) = message {
            if message.topic() == dyno_mqtt::PING_TOPIC {
                let echo =
                    mqtt::Message::new(dyno_mqtt::PONG_TOPIC, message.payload(), dyno_mqtt::QOS);
                while let Err(e) = client.try_publish(echo.clone()) {
                    warn!(error = %e, "echo rejected, retrying");
                }
            }
        }
    });

    dyno_mqtt::connect(&client, &gate)?;
    dyno_mqtt::subscribe(&client, dyno_mqtt::PING_TOPIC, &gate)?;

    // All the work happens on the callback thread.
    loop {
        thread::sleep(Duration::from_secs(1));
    }
}
