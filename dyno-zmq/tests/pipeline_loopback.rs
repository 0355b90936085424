//! Loopback pipeline test against real ZeroMQ sockets.

use dyno_core::prelude::*;
use std::thread;

const MESSAGES: u64 = 200;
const PAYLOAD: usize = 32;

#[test]
fn pull_counts_every_pushed_message() {
    let port = portpicker::pick_unused_port().expect("no free port");
    let endpoint = format!("tcp://127.0.0.1:{port}");

    let ctx = zmq::Context::new();
    let pull = dyno_zmq::pull_socket(&ctx, &endpoint).unwrap();

    let push_ctx = ctx.clone();
    let pusher = thread::spawn(move || {
        let push = dyno_zmq::push_socket(&push_ctx, &endpoint).unwrap();
        let payload = vec![0u8; PAYLOAD];
        for _ in 0..MESSAGES {
            dyno_zmq::send_frames(&push, &payload).unwrap();
        }
    });

    let counter = ThroughputCounter::new();
    for _ in 0..MESSAGES {
        let frames = pull.recv_multipart(0).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], dyno_zmq::THR_TOPIC.as_bytes());
        assert_eq!(frames[1].len(), PAYLOAD);
        counter.record();
    }
    pusher.join().unwrap();

    // Every fully dequeued message was counted exactly once.
    assert_eq!(counter.drain(), MESSAGES);
}
