//! Drives one shutdown-while-reconnecting race.
//!
//! ## Sequence
//! 1. start one member per topology address
//! 2. start the client against the whole topology, then clear the capture
//! 3. shut down every member
//! 4. shut down the client, immediately or after a pause
//! 5. wait for late log records, then read the capture
//!
//! Member shutdown always completes before the client shutdown is issued.
//! Whatever is still running when an attempt ends, by error or by timeout,
//! is shut down before `run` returns.

use std::sync::Arc;

use tokio::time::sleep;
use tokio::time::timeout;
use tokio::time::Instant;
use tracing::error;
use tracing::info;

use super::RaceOutcome;
use super::RacePhase;
use super::RaceReport;
use super::ShutdownTiming;
use crate::CaptureSnapshot;
use crate::CapturingLoggerFactory;
use crate::Error;
use crate::HarnessConfig;
use crate::NodeController;
use crate::NodeHandle;
use crate::RaceConfig;
use crate::Result;

pub struct RaceDriver {
    controller: NodeController,
    capture: Arc<CapturingLoggerFactory>,
    config: RaceConfig,
    phase: RacePhase,
}

/// Nodes started by the current attempt and not yet shut down.
#[derive(Default)]
struct RunningNodes {
    members: Vec<NodeHandle>,
    client: Option<NodeHandle>,
}

impl RunningNodes {
    fn drain(&mut self) -> Vec<NodeHandle> {
        let mut nodes: Vec<NodeHandle> = self.client.take().into_iter().collect();
        nodes.append(&mut self.members);
        nodes
    }
}

impl RaceDriver {
    pub fn new(
        config: &HarnessConfig,
        capture: Arc<CapturingLoggerFactory>,
    ) -> Self {
        Self::with_controller(
            NodeController::new(config, capture.clone()),
            capture,
            config.race.clone(),
        )
    }

    /// `capture` must be the factory `controller` hands to the client.
    pub fn with_controller(
        controller: NodeController,
        capture: Arc<CapturingLoggerFactory>,
        config: RaceConfig,
    ) -> Self {
        Self {
            controller,
            capture,
            config,
            phase: RacePhase::Setup,
        }
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn capture(&self) -> &Arc<CapturingLoggerFactory> {
        &self.capture
    }

    /// The two variants: immediate and after `shutdown_delay_ms`.
    pub fn variants(&self) -> [ShutdownTiming; 2] {
        [
            ShutdownTiming::Immediate,
            ShutdownTiming::Delayed(self.config.shutdown_delay()),
        ]
    }

    /// Runs one attempt and reports what the capture saw.
    ///
    /// A severe record is reported through the outcome, not as an error;
    /// use [`RaceOutcome::into_result`] to turn it into one.
    ///
    /// # Errors
    /// - [`Error::AttemptTimeout`] when the whole sequence exceeds `attempt_timeout_ms`
    /// - any node start or shutdown failure, e.g. [`Error::Bind`]
    pub async fn run(
        &mut self,
        timing: ShutdownTiming,
    ) -> Result<RaceOutcome> {
        let started = Instant::now();
        let attempt_timeout = self.config.attempt_timeout();
        let mut nodes = RunningNodes::default();
        self.phase = RacePhase::Setup;
        info!(%timing, "race attempt starting");

        let result = timeout(attempt_timeout, self.drive(timing, &mut nodes)).await;

        let leftovers = nodes.drain();
        if !leftovers.is_empty() {
            info!(count = leftovers.len(), "tearing down nodes left by the attempt");
            self.controller.shutdown_all(leftovers).await;
        }

        let snapshot = match result {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(e)) => {
                error!(%timing, phase = ?self.phase, error = %e, "race attempt failed");
                return Err(e);
            }
            Err(_) => {
                error!(%timing, phase = ?self.phase, "race attempt timed out");
                return Err(Error::AttemptTimeout(attempt_timeout));
            }
        };

        let outcome = RaceOutcome {
            timing,
            snapshot,
            elapsed: started.elapsed(),
        };
        if outcome.is_clean() {
            info!(%timing, elapsed = ?outcome.elapsed, "race attempt settled clean");
        } else {
            error!(
                %timing,
                severe_count = outcome.snapshot.severe_count,
                cause = ?outcome.snapshot.cause,
                "severe failure captured during race"
            );
        }
        Ok(outcome)
    }

    /// Runs `timing` `attempts` times. Stops at the first error; severe
    /// captures do not stop the loop.
    pub async fn run_repeated(
        &mut self,
        timing: ShutdownTiming,
        attempts: u32,
    ) -> Result<RaceReport> {
        let mut report = RaceReport::default();
        for attempt in 1..=attempts {
            info!(%timing, attempt, attempts, "running race");
            report.push(self.run(timing).await?);
        }
        Ok(report)
    }

    /// Both variants, `attempts_per_variant` times each.
    pub async fn run_all(&mut self) -> Result<RaceReport> {
        let mut report = RaceReport::default();
        for timing in self.variants() {
            let attempts = self.config.attempts_per_variant;
            report.extend(self.run_repeated(timing, attempts).await?);
        }
        Ok(report)
    }

    async fn drive(
        &mut self,
        timing: ShutdownTiming,
        nodes: &mut RunningNodes,
    ) -> Result<CaptureSnapshot> {
        for port in self.controller.topology().ports() {
            nodes.members.push(self.controller.start_member(port).await?);
        }
        self.advance(RacePhase::MembersUp);

        let addresses = self.controller.topology().addresses.clone();
        nodes.client = Some(self.controller.start_client(&addresses).await?);
        // Only what happens from here on counts
        self.capture.reset();
        self.advance(RacePhase::ClientUp);

        while !nodes.members.is_empty() {
            let member = nodes.members.remove(0);
            self.controller.shutdown(member).await?;
        }
        self.advance(RacePhase::MembersDown);

        if let ShutdownTiming::Delayed(delay) = timing {
            sleep(delay).await;
        }
        self.advance(RacePhase::ClientShutdownRequested);
        if let Some(client) = nodes.client.take() {
            self.controller.shutdown(client).await?;
        }

        sleep(self.config.settle_delay()).await;
        self.advance(RacePhase::Settled);
        Ok(self.capture.snapshot())
    }

    fn advance(
        &mut self,
        to: RacePhase,
    ) {
        debug_assert_eq!(self.phase.next(), Some(to));
        info!(from = ?self.phase, ?to, "race phase");
        self.phase = to;
    }
}
