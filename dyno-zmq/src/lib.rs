//! Shared ZeroMQ glue for the pipeline drivers.
//!
//! The pipeline mirrors the pub/sub shape of the other backends: each
//! message is two frames, a topic frame followed by the payload frame.

pub const THR_TOPIC: &str = "/test/thr";

/// PUSH socket connected to the pull side of the pipeline.
pub fn push_socket(ctx: &zmq::Context, endpoint: &str) -> zmq::Result<zmq::Socket> {
    let socket = ctx.socket(zmq::PUSH)?;
    socket.connect(endpoint)?;
    Ok(socket)
}

/// PULL socket bound on the consuming side of the pipeline.
pub fn pull_socket(ctx: &zmq::Context, endpoint: &str) -> zmq::Result<zmq::Socket> {
    let socket = ctx.socket(zmq::PULL)?;
    socket.bind(endpoint)?;
    Ok(socket)
}

/// Send one two-frame message: topic frame, then payload frame.
pub fn send_frames(socket: &zmq::Socket, payload: &[u8]) -> zmq::Result<()> {
    socket.send(THR_TOPIC.as_bytes(), zmq::SNDMORE)?;
    socket.send(payload, 0)
}
