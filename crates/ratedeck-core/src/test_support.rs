//! In-memory transports and timers shared by the unit tests

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{ErrorKind, ErrorType, Read, Write};

/// Read half that replays scripted bytes, then reports end of stream
pub struct ScriptedRx(VecDeque<u8>);

impl ScriptedRx {
    pub fn new(chunks: &[&[u8]]) -> Self {
        Self(chunks.iter().flat_map(|c| c.iter().copied()).collect())
    }
}

impl ErrorType for ScriptedRx {
    type Error = ErrorKind;
}

impl Read for ScriptedRx {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.0.len());
        for (slot, byte) in buf.iter_mut().zip(self.0.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

/// Write half that records everything, optionally failing after a number
/// of writes
#[derive(Default)]
pub struct RecordingTx {
    pub sent: Vec<u8>,
    writes_left: Option<usize>,
}

impl RecordingTx {
    pub fn failing_after(writes: usize) -> Self {
        Self {
            sent: Vec::new(),
            writes_left: Some(writes),
        }
    }
}

impl ErrorType for RecordingTx {
    type Error = ErrorKind;
}

impl Write for RecordingTx {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if let Some(left) = self.writes_left.as_mut() {
            if *left == 0 {
                return Err(ErrorKind::BrokenPipe);
            }
            *left -= 1;
        }
        self.sent.extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// Split a byte stream into (header byte, body) frames
pub fn frames(mut bytes: &[u8]) -> Vec<(u8, Vec<u8>)> {
    let mut out = Vec::new();
    while let Some((&header, rest)) = bytes.split_first() {
        let (len, used) = crate::mqtt::read_variable_length(rest)
            .expect("valid length")
            .expect("complete length");
        out.push((header, rest[used..used + len].to_vec()));
        bytes = &rest[used + len..];
    }
    out
}

/// Records every requested delay in milliseconds instead of sleeping
#[derive(Default)]
pub struct RecordingDelay(pub Vec<u32>);

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.0.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.0.push(ms);
    }
}
