//! Mock reader and notifier for integration tests.
//!
//! Records every call so tests can assert on the full command history without a reader
//! attached.

use std::collections::VecDeque;
use veering_core::{
    Action, ActionNotifier, ByteStream, HardwareError, NotifyError, StopHandle, FRAME_LEN,
};

#[derive(Debug, Clone, PartialEq)]
pub enum StreamCall {
    Flush,
    Write(Vec<u8>),
    ReadExact(usize),
    ReadAvailable(usize),
}

/// Reader double: the handshake is answered with `ack`, then every inventory command
/// queues the next scripted response
pub struct MockReader {
    pub calls: Vec<StreamCall>,
    ack: Option<Vec<u8>>,
    responses: VecDeque<Result<Vec<u8>, HardwareError>>,
    pending: Vec<u8>,
    stop_on_write: Option<(usize, StopHandle)>,
}

#[allow(dead_code)]
impl MockReader {
    pub fn new(responses: Vec<Result<Vec<u8>, HardwareError>>) -> Self {
        Self {
            calls: Vec::new(),
            ack: Some(vec![0x43, 0x03, 0x00]),
            responses: responses.into(),
            pending: Vec::new(),
            stop_on_write: None,
        }
    }

    /// Raise `stop` when the `nth` command (1-based, handshake included) is written
    pub fn stop_on_write(mut self, nth: usize, stop: StopHandle) -> Self {
        self.stop_on_write = Some((nth, stop));
        self
    }

    pub fn writes(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, StreamCall::Write(_)))
            .count()
    }
}

impl ByteStream for MockReader {
    fn flush(&mut self) -> Result<(), HardwareError> {
        self.calls.push(StreamCall::Flush);
        Ok(())
    }

    fn write_command(&mut self, command: &[u8]) -> Result<(), HardwareError> {
        self.calls.push(StreamCall::Write(command.to_vec()));
        if let Some((nth, stop)) = &self.stop_on_write {
            if *nth == self.writes() {
                stop.request_stop();
            }
        }
        if let Some(ack) = self.ack.take() {
            self.pending = ack;
            return Ok(());
        }
        match self.responses.pop_front() {
            Some(Ok(bytes)) => {
                self.pending = bytes;
                Ok(())
            }
            Some(Err(e)) => Err(e),
            None => {
                self.pending.clear();
                Ok(())
            }
        }
    }

    fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, HardwareError> {
        self.calls.push(StreamCall::ReadExact(n));
        if n > self.pending.len() {
            return Err(HardwareError::Timeout);
        }
        Ok(self.pending.drain(..n).collect())
    }

    fn available(&self) -> Result<usize, HardwareError> {
        Ok(self.pending.len())
    }

    fn read_available(&mut self) -> Result<Vec<u8>, HardwareError> {
        self.calls.push(StreamCall::ReadAvailable(self.pending.len()));
        Ok(std::mem::take(&mut self.pending))
    }
}

#[derive(Default)]
pub struct MockPhone {
    pub actions: Vec<Action>,
}

impl ActionNotifier for MockPhone {
    fn notify(&mut self, action: Action) -> Result<(), NotifyError> {
        self.actions.push(action);
        Ok(())
    }
}

/// Build one reader frame with the given identifier bytes
pub fn tag_frame(quality: u8, id: [u8; 12]) -> Vec<u8> {
    let mut frame = vec![0u8; FRAME_LEN];
    frame[0] = 0x43;
    frame[3] = quality;
    frame[10..].copy_from_slice(&id);
    frame
}
