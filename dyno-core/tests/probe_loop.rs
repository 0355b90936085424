//! End-to-end probe loop tests with an in-process echo responder.

use dyno_core::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn echo_responder_round_trip() {
    let rendezvous = Arc::new(RendezvousChannel::new());
    let shutdown = ShutdownToken::new();

    // Echo responder: receives the probe payload, deposits its sequence
    // back, exactly like a pong process on the reply topic.
    let (to_responder, requests) = flume::unbounded::<Vec<u8>>();
    let responder_rendezvous = Arc::clone(&rendezvous);
    let responder = thread::spawn(move || {
        for payload in requests.iter() {
            if let Some(seq) = read_seq(&payload) {
                responder_rendezvous.deposit(seq);
            }
        }
    });

    let config = ProbeConfig {
        interval: Duration::ZERO,
        payload_size: 64,
        timeout: None,
    };
    let (records_tx, records_rx) = flume::unbounded();
    let loop_rendezvous = Arc::clone(&rendezvous);
    let loop_shutdown = shutdown.clone();
    let probe = thread::spawn(move || {
        let stop = loop_shutdown.clone();
        let mut emitted = 0usize;
        run_probe_loop(
            &config,
            &loop_rendezvous,
            &loop_shutdown,
            move |payload| {
                to_responder
                    .send(payload.to_vec())
                    .map_err(|_| "responder gone")
            },
            move |seq, elapsed| {
                records_tx.send((seq, elapsed)).ok();
                emitted += 1;
                if emitted == 43 {
                    stop.trigger();
                }
            },
        );
    });

    probe.join().unwrap();
    responder.join().unwrap();

    let records: Vec<(u64, i64)> = records_rx.iter().collect();
    assert_eq!(records.len(), 43);
    for (i, &(seq, elapsed)) in records.iter().enumerate() {
        assert_eq!(seq, i as u64);
        assert!(elapsed >= 0);
    }
    // The 43rd probe carries sequence 42; an echo answered within
    // milliseconds must measure in [0, 5000] microseconds.
    let (seq, elapsed) = records[42];
    assert_eq!(seq, 42);
    assert!((0..=5000).contains(&elapsed), "elapsed {elapsed} us");
}

#[test]
fn cadence_tracks_interval() {
    let rendezvous = Arc::new(RendezvousChannel::new());
    let shutdown = ShutdownToken::new();
    let config = ProbeConfig {
        interval: Duration::from_millis(20),
        payload_size: 8,
        timeout: None,
    };

    let (records_tx, records_rx) = flume::unbounded();
    let loop_rendezvous = Arc::clone(&rendezvous);
    let loop_shutdown = shutdown.clone();
    let probe = thread::spawn(move || {
        let echo = Arc::clone(&loop_rendezvous);
        run_probe_loop(
            &config,
            &loop_rendezvous,
            &loop_shutdown,
            move |payload| read_seq(payload).map(|seq| echo.deposit(seq)).ok_or("short"),
            move |seq, elapsed| {
                records_tx.send((seq, elapsed)).ok();
            },
        );
    });

    thread::sleep(Duration::from_millis(200));
    shutdown.trigger();
    probe.join().unwrap();

    // floor(200ms / 20ms) = 10 records, within scheduling jitter.
    let records: Vec<(u64, i64)> = records_rx.iter().collect();
    assert!(
        (5..=15).contains(&records.len()),
        "expected ~10 records, got {}",
        records.len()
    );
    assert!(records.iter().all(|&(_, elapsed)| elapsed >= 0));
}
