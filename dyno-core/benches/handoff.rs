//! Quick handoff measurement
//!
//! Measures the rendezvous round trip and the counter record/drain cost
//! without benchmark-harness overhead.

use dyno_core::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

const WARMUP: usize = 1_000;
const ITERATIONS: usize = 100_000;

const STOP: u64 = u64::MAX;

fn rendezvous_round_trip() {
    let request = Arc::new(RendezvousChannel::new());
    let reply = Arc::new(RendezvousChannel::new());

    let responder_request = Arc::clone(&request);
    let responder_reply = Arc::clone(&reply);
    let responder = thread::spawn(move || loop {
        let seq = responder_request.wait();
        if seq == STOP {
            break;
        }
        responder_reply.deposit(seq);
    });

    for seq in 0..WARMUP as u64 {
        request.deposit(seq);
        reply.wait();
    }

    let start = Instant::now();
    for seq in 0..ITERATIONS as u64 {
        request.deposit(seq);
        reply.wait();
    }
    let elapsed = start.elapsed();

    request.deposit(STOP);
    responder.join().unwrap();

    println!(
        "rendezvous round trip: {:.2} us/op over {ITERATIONS} iterations",
        elapsed.as_micros() as f64 / ITERATIONS as f64
    );
}

fn counter_record_drain() {
    let counter = ThroughputCounter::new();

    let start = Instant::now();
    for _ in 0..ITERATIONS {
        counter.record();
    }
    let recorded = counter.drain();
    let elapsed = start.elapsed();

    println!(
        "counter record+drain: {:.1} ns/op ({recorded} recorded)",
        elapsed.as_nanos() as f64 / ITERATIONS as f64
    );
}

fn main() {
    println!("Measuring core handoff primitives...\n");
    rendezvous_round_trip();
    counter_record_drain();
}
