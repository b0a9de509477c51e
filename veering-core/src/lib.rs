//! Veering Guidance Core Library
//!
//! Turns RFID reader output into walking guidance for a blind pedestrian crossing a street.
//! Tags installed along the crossing are assigned to a left, center or right zone; the zones
//! in range over a short polling window decide whether the walker should veer left, veer
//! right or keep going.
//!
//! # Architecture
//!
//! ```text
//! bytes ─▶ FrameDecoder ─▶ TagWindow (ZoneClassifier) ─▶ DecisionEngine ─▶ ActionNotifier
//!                    └────────── CycleOrchestrator drives every cycle ──────────┘
//! ```
//!
//! The library does NOT:
//! - Talk to serial ports or BLE stacks (see [`ports`])
//! - Keep any state across cycles or process restarts
//!
//! # Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use veering_core::{CycleConfig, CycleOrchestrator, ThreadSettle, ZoneClassifier};
//! # use veering_core::{Action, ActionNotifier, ByteStream, HardwareError, NotifyError};
//! # struct Serial;
//! # impl ByteStream for Serial {
//! #     fn flush(&mut self) -> Result<(), HardwareError> { Ok(()) }
//! #     fn write_command(&mut self, _: &[u8]) -> Result<(), HardwareError> { Ok(()) }
//! #     fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, HardwareError> { Ok(vec![0; n]) }
//! #     fn available(&self) -> Result<usize, HardwareError> { Ok(0) }
//! # }
//! # struct Phone;
//! # impl ActionNotifier for Phone {
//! #     fn notify(&mut self, _: Action) -> Result<(), NotifyError> { Ok(()) }
//! # }
//!
//! let classifier = Arc::new(ZoneClassifier::from_file(Path::new("tags.json")).unwrap());
//! let mut orchestrator = CycleOrchestrator::new(
//!     Serial,
//!     Phone,
//!     ThreadSettle,
//!     classifier,
//!     CycleConfig::new().with_samples_per_cycle(10),
//! )
//! .unwrap();
//!
//! orchestrator.initialize().unwrap();
//! let summary = orchestrator.run().unwrap();
//! println!("Ran {} cycles", summary.cycles);
//! ```

// Public modules
pub mod classifier;
pub mod config;
pub mod decision;
pub mod decoder;
pub mod orchestrator;
pub mod ports;
pub mod types;
pub mod window;

// Re-export main types for convenience
pub use classifier::ZoneClassifier;
pub use config::{CountThresholds, CycleConfig, ZoneMap};
pub use decision::{DecisionEngine, DecisionRow, DECISION_TABLE};
pub use decoder::{format_tag_id, signal_score, FrameDecoder, FRAME_LEN};
pub use orchestrator::{
    CycleOrchestrator, CycleReport, CycleState, RunSummary, StopHandle, INVENTORY_COMMAND,
};
pub use ports::{ActionNotifier, ByteStream, NoSettle, Settle, ThreadSettle};
pub use types::{
    Action, ConfigError, HardwareError, NotifyError, OrchestratorError, Result, TagReading,
    Timestamp, Zone, ZonePresenceSummary,
};
pub use window::{TagRecord, TagWindow, ZoneCounts};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an empty configuration classifies everything as unknown
        let classifier = ZoneClassifier::new(ZoneMap::default());
        assert_eq!(classifier.classify("-00"), Zone::Unknown);
        assert_eq!(
            DecisionEngine::new().decide(&ZonePresenceSummary::default()),
            Action::Unknown
        );
    }
}
