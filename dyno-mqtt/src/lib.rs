//! Shared Paho MQTT glue for the driver binaries.
//!
//! The Paho async client reports connect and subscribe outcomes via
//! callbacks on its own thread; the helpers here wire those callbacks into
//! a [`ConnectionGate`] so each binary can block until the handshake
//! completed (or die with the backend's reason code).

use dyno_core::gate::ConnectionGate;
use paho_mqtt as mqtt;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

pub const DEFAULT_BROKER: &str = "tcp://127.0.0.1:1883";
pub const PING_TOPIC: &str = "/test/ping";
pub const PONG_TOPIC: &str = "/test/pong";
pub const THR_TOPIC: &str = "/test/thr";
pub const OVERHEAD_TOPIC: &str = "/test/overhead";
pub const QOS: i32 = 1;

const KEEP_ALIVE: Duration = Duration::from_secs(3);

/// Build an MQTT v5 client with no persistence.
pub fn create_client(broker: &str, client_id: &str) -> Result<mqtt::AsyncClient, mqtt::Error> {
    let create_opts = mqtt::CreateOptionsBuilder::new()
        .server_uri(broker)
        .client_id(client_id)
        .persistence(mqtt::PersistenceType::None)
        .mqtt_version(mqtt::MQTT_VERSION_5)
        .finalize();
    mqtt::AsyncClient::new(create_opts)
}

/// Start the connect handshake and block until the broker confirmed it.
///
/// The success/failure callbacks run on the client's own thread and do
/// nothing but flip the gate; the calling thread parks on
/// `await_connected`.
pub fn connect(client: &mqtt::AsyncClient, gate: &Arc<ConnectionGate>) -> dyno_core::error::Result<()> {
    let conn_opts = mqtt::ConnectOptionsBuilder::new_v5()
        .keep_alive_interval(KEEP_ALIVE)
        .clean_start(true)
        .finalize();

    gate.connecting();
    let on_success = {
        let gate = Arc::clone(gate);
        move |_client: &mqtt::AsyncClient, _msgid: u16| gate.connect_succeeded()
    };
    let on_failure = {
        let gate = Arc::clone(gate);
        move |_client: &mqtt::AsyncClient, _msgid: u16, code: i32| gate.connect_failed(code)
    };
    let _ = client.connect_with_callbacks(conn_opts, on_success, on_failure);

    gate.await_connected()
}

/// Subscribe to `topic` and block until the broker acknowledged it.
pub fn subscribe(
    client: &mqtt::AsyncClient,
    topic: &str,
    gate: &ConnectionGate,
) -> dyno_core::error::Result<()> {
    gate.subscribing();
    match client.subscribe(topic, QOS).wait() {
        Ok(_) => gate.subscribe_succeeded(),
        Err(e) => {
            error!(topic, error = %e, "subscribe failed");
            gate.subscribe_failed(-1);
        }
    }
    gate.await_subscribed()
}
