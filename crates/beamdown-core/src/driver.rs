//! Tokio host for the simulator.
//!
//! The driver plays the scheduler role: it owns the [`TransferSimulator`],
//! keeps a tick interval alive only while the job is running, waits out the
//! post-completion delay before resetting, and applies control commands as
//! they arrive. It is the only mutator, so no locking is involved.

use std::future::pending;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep};

use crate::catalog::PlatformEntry;
use crate::errors::SimulatorResult;
use crate::events::ProgressUpdate;
use crate::job::TransferState;
use crate::simulator::{CancelOutcome, Confirmation, TickOutcome, TransferSimulator};

/// Control input from the UI side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCommand {
    /// Try to start another job for the given platform.
    Start(PlatformEntry),
    Pause,
    Resume,
    Cancel(Confirmation),
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Cancelled,
    Dismissed,
}

/// Summary of one `run_job` call.
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub outcome: JobOutcome,
    /// Platform of the job this report describes. A start accepted during the
    /// reset window replaces the original platform.
    pub platform: PlatformEntry,
    pub total_mb: f64,
    /// Progress at the last tick before the job ended.
    pub transferred_mb: f64,
    pub ticks: u64,
    pub elapsed: Duration,
    pub rejected_starts: usize,
}

pub struct SimulatorDriver {
    simulator: TransferSimulator,
}

impl SimulatorDriver {
    pub fn new(simulator: TransferSimulator) -> Self {
        Self { simulator }
    }

    pub fn simulator(&self) -> &TransferSimulator {
        &self.simulator
    }

    pub fn into_inner(self) -> TransferSimulator {
        self.simulator
    }

    /// Start a job for `platform`, sized by its label, and drive it until the
    /// simulator is idle again.
    ///
    /// A closed command channel only stops command processing; a running job
    /// still completes. A job left paused with no way to resume is dismissed.
    pub async fn run_job(
        &mut self,
        platform: &PlatformEntry,
        commands: &mut UnboundedReceiver<DriverCommand>,
    ) -> SimulatorResult<JobReport> {
        self.simulator.start_label(&platform.size)?;

        let period = self.simulator.config().tick_interval;
        let mut run = JobRun {
            platform: platform.clone(),
            started: Instant::now(),
            total_mb: self.simulator.total_bytes().unwrap_or(0.0),
            ticker: Some(new_ticker(period)),
            reset: None,
            outcome: None,
            last_update: None,
            ticks: 0,
            rejected_starts: 0,
        };
        let mut commands_open = true;

        while run.outcome.is_none() {
            tokio::select! {
                _ = next_tick(&mut run.ticker) => self.on_tick(&mut run),
                _ = reset_elapsed(&mut run.reset) => {
                    run.reset = None;
                    if self.simulator.reset() {
                        run.outcome = Some(JobOutcome::Completed);
                    }
                }
                command = commands.recv(), if commands_open => match command {
                    Some(command) => self.apply(command, period, &mut run),
                    None => {
                        log::debug!("command channel closed");
                        commands_open = false;
                    }
                },
            }

            if !commands_open && self.simulator.state() == TransferState::Paused {
                log::warn!("paused job can no longer be resumed; dismissing it");
                self.simulator.dismiss();
                run.ticker = None;
                run.outcome = Some(JobOutcome::Dismissed);
            }
        }

        let outcome = run.outcome.unwrap_or(JobOutcome::Dismissed);
        Ok(JobReport {
            outcome,
            platform: run.platform,
            total_mb: run.total_mb,
            transferred_mb: run.last_update.map_or(0.0, |u| u.transferred),
            ticks: run.ticks,
            elapsed: run.started.elapsed(),
            rejected_starts: run.rejected_starts,
        })
    }

    fn on_tick(&mut self, run: &mut JobRun) {
        match self.simulator.tick() {
            TickOutcome::Progressed(update) => {
                run.ticks += 1;
                run.last_update = Some(update);
            }
            TickOutcome::Completed {
                update,
                reset_after,
            } => {
                run.ticks += 1;
                run.last_update = Some(update);
                run.ticker = None;
                run.reset = Some(Box::pin(sleep(reset_after)));
            }
            TickOutcome::Inactive => run.ticker = None,
        }
    }

    fn apply(&mut self, command: DriverCommand, period: Duration, run: &mut JobRun) {
        log::debug!("command {command:?} while {}", self.simulator.state());
        match command {
            DriverCommand::Pause => {
                if self.simulator.pause() {
                    run.ticker = None;
                }
            }
            DriverCommand::Resume => {
                if self.simulator.resume() {
                    run.ticker = Some(new_ticker(period));
                }
            }
            DriverCommand::Cancel(confirmation) => {
                if self.simulator.cancel(confirmation) == CancelOutcome::Cancelled {
                    run.ticker = None;
                    run.outcome = Some(JobOutcome::Cancelled);
                }
            }
            DriverCommand::Dismiss => {
                self.simulator.dismiss();
                run.ticker = None;
                run.reset = None;
                run.outcome = Some(JobOutcome::Dismissed);
            }
            DriverCommand::Start(platform) => match self.simulator.start_label(&platform.size) {
                Ok(()) => {
                    // Only reachable while the previous job waits for its reset.
                    log::debug!("{} replaces the finished {}", platform.name, run.platform.name);
                    run.platform = platform;
                    run.reset = None;
                    run.ticker = Some(new_ticker(period));
                    run.total_mb = self.simulator.total_bytes().unwrap_or(0.0);
                    run.last_update = None;
                    run.ticks = 0;
                    run.started = Instant::now();
                }
                Err(_) => run.rejected_starts += 1,
            },
        }
    }
}

struct JobRun {
    platform: PlatformEntry,
    started: Instant,
    total_mb: f64,
    ticker: Option<Interval>,
    reset: Option<Pin<Box<Sleep>>>,
    outcome: Option<JobOutcome>,
    last_update: Option<ProgressUpdate>,
    ticks: u64,
    rejected_starts: usize,
}

/// First tick fires one full period after start, like a browser interval.
fn new_ticker(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending().await,
    }
}

async fn reset_elapsed(reset: &mut Option<Pin<Box<Sleep>>>) {
    match reset {
        Some(delay) => delay.as_mut().await,
        None => pending().await,
    }
}
