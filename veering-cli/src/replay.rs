//! Replay of captured reader output
//!
//! A capture holds one line per sampling iteration: whitespace separated hex bytes, with an
//! optional `0x` prefix. A blank line is an iteration in which no tag answered. Text after
//! `#` is a comment, and comment-only lines are skipped.
//!
//! ```text
//! # one frame, then an empty iteration
//! 43 00 00 34 00 00 00 00 00 00 52 67 68 74 2d 74 61 67 2d 30 30 31
//!
//! ```

use anyhow::{bail, Context, Result};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use veering_core::{ByteStream, HardwareError};

/// Bytes handed back during the reader handshake (2 ack + 1 trailer)
const HANDSHAKE_REPLY: [u8; 3] = [0x43, 0x03, 0x00];

/// [`ByteStream`] that plays back a capture, one line per inventory command
///
/// Reports [`HardwareError::Disconnected`] once the capture is exhausted.
#[derive(Debug)]
pub struct ReplayStream {
    responses: VecDeque<Vec<u8>>,
    pending: Vec<u8>,
    handshake_done: bool,
}

impl ReplayStream {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay capture: {:?}", path))?;
        let stream = Self::parse(&content)
            .with_context(|| format!("Failed to parse replay capture: {:?}", path))?;
        log::info!(
            "Loaded replay capture {:?} ({} iterations)",
            path,
            stream.remaining()
        );
        Ok(stream)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut responses = VecDeque::new();

        for (line_no, line) in content.lines().enumerate() {
            let (data, had_comment) = match line.split_once('#') {
                Some((data, _)) => (data, true),
                None => (line, false),
            };
            if data.trim().is_empty() && had_comment {
                continue;
            }

            let bytes = data
                .split_whitespace()
                .map(|token| {
                    let digits = token
                        .strip_prefix("0x")
                        .or_else(|| token.strip_prefix("0X"))
                        .unwrap_or(token);
                    u8::from_str_radix(digits, 16)
                        .with_context(|| format!("line {}: invalid byte '{}'", line_no + 1, token))
                })
                .collect::<Result<Vec<u8>>>()?;
            responses.push_back(bytes);
        }

        if responses.is_empty() {
            bail!("capture contains no iterations");
        }

        Ok(Self {
            responses,
            pending: Vec::new(),
            handshake_done: false,
        })
    }

    /// Iterations not yet played back
    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

impl ByteStream for ReplayStream {
    fn flush(&mut self) -> Result<(), HardwareError> {
        Ok(())
    }

    fn write_command(&mut self, _command: &[u8]) -> Result<(), HardwareError> {
        if !self.handshake_done {
            self.handshake_done = true;
            self.pending = HANDSHAKE_REPLY.to_vec();
            return Ok(());
        }

        match self.responses.pop_front() {
            Some(bytes) => {
                self.pending = bytes;
                Ok(())
            }
            None => Err(HardwareError::Disconnected("replay capture exhausted".to_string())),
        }
    }

    fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, HardwareError> {
        if n > self.pending.len() {
            return Err(HardwareError::Timeout);
        }
        Ok(self.pending.drain(..n).collect())
    }

    fn available(&self) -> Result<usize, HardwareError> {
        Ok(self.pending.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_capture() {
        let capture = "# header\n0x43 03 ff\n\n0a 0B # trailing comment\n";
        let mut stream = ReplayStream::parse(capture).unwrap();
        assert_eq!(stream.remaining(), 3);

        // Handshake consumes no capture lines
        stream.write_command(&[0x43, 0x03, 0x01]).unwrap();
        assert_eq!(stream.read_exact(2).unwrap(), vec![0x43, 0x03]);
        assert_eq!(stream.read_exact(1).unwrap(), vec![0x00]);
        assert_eq!(stream.remaining(), 3);

        stream.write_command(&[0x43, 0x03, 0x01]).unwrap();
        assert_eq!(stream.read_available().unwrap(), vec![0x43, 0x03, 0xff]);
        stream.write_command(&[0x43, 0x03, 0x01]).unwrap();
        assert_eq!(stream.read_available().unwrap(), Vec::<u8>::new());
        stream.write_command(&[0x43, 0x03, 0x01]).unwrap();
        assert_eq!(stream.read_available().unwrap(), vec![0x0a, 0x0b]);

        let err = stream.write_command(&[0x43, 0x03, 0x01]).unwrap_err();
        assert!(err.is_disconnect());
    }

    #[test]
    fn test_parse_rejects_bad_bytes() {
        assert!(ReplayStream::parse("43 zz\n").is_err());
        assert!(ReplayStream::parse("100\n").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_capture() {
        assert!(ReplayStream::parse("# nothing here\n").is_err());
    }
}
