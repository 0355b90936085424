//! Measurement records: one CSV line per event on stdout.
//!
//! Format: `<backend>,<scenario>,<kind>,<name>,<payload_size>,[<sequence>,]<value>`
//! where the sequence field is present for latency records only and the
//! value is elapsed microseconds (latency) or messages/second
//! (throughput). Consumers tail the stream in real time, so every line is
//! flushed immediately.

use std::fmt;
use std::io::Write;

/// Messaging backend under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Mqtt,
    Zeromq,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mqtt => f.write_str("mqtt"),
            Self::Zeromq => f.write_str("zeromq"),
        }
    }
}

/// Measurement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Latency,
    Throughput,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latency => f.write_str("latency"),
            Self::Throughput => f.write_str("throughput"),
        }
    }
}

/// One measurement event.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub backend: Backend,
    pub scenario: &'a str,
    pub kind: Kind,
    pub name: &'a str,
    pub payload_size: usize,
    /// Sequence number observed in the reply (latency records only).
    pub seq: Option<u64>,
    /// Elapsed microseconds or messages/second; negative values are
    /// sentinels (timed-out probe).
    pub value: i64,
}

impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{}",
            self.backend, self.scenario, self.kind, self.name, self.payload_size
        )?;
        if let Some(seq) = self.seq {
            write!(f, ",{seq}")?;
        }
        write!(f, ",{}", self.value)
    }
}

/// Print one record to stdout and flush so tailing consumers see it
/// without buffering delay. Write errors are ignored; a closed pipe
/// just means nobody is reading anymore.
pub fn emit(record: &Record<'_>) {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{record}").ok();
    out.flush().ok();
}
