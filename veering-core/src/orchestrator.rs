//! Sampling/deciding loop
//!
//! The [`CycleOrchestrator`] owns the only mutable state in the pipeline: the [`TagWindow`],
//! the cycle counter and the stop flag. One cycle is:
//!
//! 1. **Sampling** - `samples_per_cycle` times: send the inventory command, let the reader
//!    settle, read everything it returned, decode it and record each reading
//! 2. **Deciding** - summarise zone presence, look up the action, hand it to the notifier,
//!    reset the window
//!
//! The move from Sampling to Deciding depends only on the iteration count. A stop request is
//! honoured between cycles, never in the middle of one.

use crate::classifier::ZoneClassifier;
use crate::config::CycleConfig;
use crate::decision::DecisionEngine;
use crate::decoder::FrameDecoder;
use crate::ports::{ActionNotifier, ByteStream, Settle};
use crate::types::{
    Action, ConfigError, HardwareError, OrchestratorError, Timestamp, ZonePresenceSummary,
};
use crate::window::{TagWindow, ZoneCounts};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Inventory-read command understood by the reader
pub const INVENTORY_COMMAND: [u8; 3] = [0x43, 0x03, 0x01];

/// Acknowledgement bytes the reader sends after the first inventory command
const HANDSHAKE_ACK_LEN: usize = 2;

/// Byte still pending once the handshake settle delay has elapsed
const HANDSHAKE_TRAILER_LEN: usize = 1;

/// Current phase of a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Sampling,
    Deciding,
}

/// Cloneable handle used to ask a running loop to stop after its current cycle
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Outcome of one completed cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: u64,
    pub action: Action,
    pub summary: ZonePresenceSummary,
    pub zone_counts: ZoneCounts,
    /// Zones whose distinct-tag count reached the configured threshold
    pub thresholds_met: ZonePresenceSummary,
    /// Decoded readings across all sample iterations
    pub readings: usize,
    /// Sample iterations whose read failed and contributed nothing
    pub failed_reads: usize,
    pub completed_at: Timestamp,
}

/// Result of [`CycleOrchestrator::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub last_action: Option<Action>,
}

/// Drives sample → decide → notify → reset cycles against injected ports
pub struct CycleOrchestrator<S, N, D> {
    stream: S,
    notifier: N,
    settle: D,
    window: TagWindow,
    engine: DecisionEngine,
    config: CycleConfig,
    state: CycleState,
    cycles_completed: u64,
    stop: StopHandle,
}

impl<S, N, D> CycleOrchestrator<S, N, D>
where
    S: ByteStream,
    N: ActionNotifier,
    D: Settle,
{
    /// Create an orchestrator; fails if `config` is unusable
    pub fn new(
        stream: S,
        notifier: N,
        settle: D,
        classifier: Arc<ZoneClassifier>,
        config: CycleConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            stream,
            notifier,
            settle,
            window: TagWindow::new(classifier),
            engine: DecisionEngine::new(),
            config,
            state: CycleState::Sampling,
            cycles_completed: 0,
            stop: StopHandle::new(),
        })
    }

    /// Put the reader into inventory mode
    ///
    /// Call once before the first cycle.
    pub fn initialize(&mut self) -> Result<(), OrchestratorError> {
        log::info!("Initializing reader");

        self.handshake().map_err(OrchestratorError::Handshake)?;

        log::info!("Reader initialized");
        Ok(())
    }

    fn handshake(&mut self) -> Result<(), HardwareError> {
        self.stream.flush()?;
        self.stream.write_command(&INVENTORY_COMMAND)?;
        self.stream.read_exact(HANDSHAKE_ACK_LEN)?;
        self.settle.settle(self.config.init_settle_delay());
        self.stream.read_exact(HANDSHAKE_TRAILER_LEN)?;
        self.stream.flush()
    }

    /// Run cycles until a stop is requested, the cycle limit is reached or the reader
    /// disconnects
    pub fn run(&mut self) -> Result<RunSummary, OrchestratorError> {
        let mut last_action = None;
        let mut cycles = 0;

        loop {
            if self.stop.is_stop_requested() {
                log::info!("Stop requested, leaving decision loop");
                break;
            }
            if let Some(max) = self.config.max_cycles {
                if self.cycles_completed >= max {
                    log::info!("Reached cycle limit ({})", max);
                    break;
                }
            }

            let report = self.run_cycle()?;
            last_action = Some(report.action);
            cycles += 1;
        }

        Ok(RunSummary {
            cycles,
            last_action,
        })
    }

    /// Run exactly one Sampling + Deciding cycle
    pub fn run_cycle(&mut self) -> Result<CycleReport, OrchestratorError> {
        self.state = CycleState::Sampling;
        log::debug!(
            "Cycle {}: sampling {} times",
            self.cycles_completed + 1,
            self.config.samples_per_cycle
        );

        let (readings, failed_reads) = match self.sample() {
            Ok(counts) => counts,
            Err(e) => {
                // Partial readings must not leak into whatever runs next
                self.window.reset();
                return Err(e.into());
            }
        };

        self.state = CycleState::Deciding;
        Ok(self.decide(readings, failed_reads))
    }

    fn sample(&mut self) -> Result<(usize, usize), HardwareError> {
        let mut readings = 0;
        let mut failed_reads = 0;

        for iteration in 0..self.config.samples_per_cycle {
            match self.sample_once() {
                Ok(n) => {
                    log::trace!("Iteration {}: {} tag frame(s)", iteration, n);
                    readings += n;
                }
                Err(e) if e.is_disconnect() => {
                    log::error!("Reader disconnected during sampling: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    log::warn!("Iteration {}: read failed, no readings: {}", iteration, e);
                    failed_reads += 1;
                }
            }
        }

        Ok((readings, failed_reads))
    }

    fn sample_once(&mut self) -> Result<usize, HardwareError> {
        self.stream.flush()?;
        self.stream.write_command(&INVENTORY_COMMAND)?;
        self.stream.flush()?;
        self.settle.settle(self.config.settle_delay());

        let buffer = self.stream.read_available()?;
        let mut count = 0;
        for reading in FrameDecoder::decode(&buffer) {
            self.window.record(reading);
            count += 1;
        }
        Ok(count)
    }

    fn decide(&mut self, readings: usize, failed_reads: usize) -> CycleReport {
        for record in self.window.records() {
            log::debug!("{}", record);
        }

        let summary = self.window.summary();
        let zone_counts = self.window.zone_counts();
        let thresholds = &self.config.thresholds;
        let thresholds_met = ZonePresenceSummary::new(
            zone_counts.left >= thresholds.left,
            zone_counts.center >= thresholds.center,
            zone_counts.right >= thresholds.right,
        );
        let action = self.engine.decide(&summary);

        self.cycles_completed += 1;
        log::info!(
            "Cycle {}: {} ({} reading(s), {} tag(s)) -> {}",
            self.cycles_completed,
            summary,
            readings,
            self.window.len(),
            action
        );
        if failed_reads > 0 {
            log::warn!(
                "Cycle {}: {} of {} reads failed",
                self.cycles_completed,
                failed_reads,
                self.config.samples_per_cycle
            );
        }

        if let Err(e) = self.notifier.notify(action) {
            log::error!("Failed to deliver {}: {}", action, e);
        }

        self.window.reset();
        self.state = CycleState::Sampling;

        CycleReport {
            cycle: self.cycles_completed,
            action,
            summary,
            zone_counts,
            thresholds_met,
            readings,
            failed_reads,
            completed_at: Utc::now(),
        }
    }

    /// Builder method: share an existing stop handle, e.g. one wired to a signal handler
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Handle for requesting a stop from elsewhere (e.g. another thread)
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    pub fn window(&self) -> &TagWindow {
        &self.window
    }

    pub fn stream(&self) -> &S {
        &self.stream
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn settle(&self) -> &D {
        &self.settle
    }

    /// Take back the ports
    pub fn into_parts(self) -> (S, N, D) {
        (self.stream, self.notifier, self.settle)
    }
}
