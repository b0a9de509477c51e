//! Boundaries between the decision core and the outside world
//!
//! ```text
//!   reader ──▶ ByteStream ──▶ CycleOrchestrator ──▶ ActionNotifier ──▶ phone
//!                                   │
//!                                 Settle
//! ```
//!
//! The core never talks to hardware directly. Serial drivers, BLE stacks and test doubles all
//! implement these traits.

use crate::types::{Action, HardwareError, NotifyError};
use std::time::Duration;

/// Byte transport to the RFID reader
///
/// Implementations should bound their reads; a read that never returns blocks the loop.
pub trait ByteStream {
    /// Flush any pending output to the reader
    fn flush(&mut self) -> Result<(), HardwareError>;

    /// Send a command to the reader
    fn write_command(&mut self, command: &[u8]) -> Result<(), HardwareError>;

    /// Read exactly `n` bytes
    fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, HardwareError>;

    /// Number of bytes that can be read without blocking
    fn available(&self) -> Result<usize, HardwareError>;

    /// Read every byte currently available
    fn read_available(&mut self) -> Result<Vec<u8>, HardwareError> {
        let n = self.available()?;
        self.read_exact(n)
    }
}

/// Receiver of one action per decision cycle
pub trait ActionNotifier {
    fn notify(&mut self, action: Action) -> Result<(), NotifyError>;
}

/// Wait for the reader hardware to settle
pub trait Settle {
    fn settle(&mut self, delay: Duration);
}

/// [`Settle`] that sleeps the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSettle;

impl Settle for ThreadSettle {
    fn settle(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// [`Settle`] that returns immediately and records what was asked of it
#[derive(Debug, Clone, Default)]
pub struct NoSettle {
    pub requested: Vec<Duration>,
}

impl Settle for NoSettle {
    fn settle(&mut self, delay: Duration) {
        self.requested.push(delay);
    }
}
