//! The transfer simulator state machine.
//!
//! `TransferSimulator` owns at most one [`TransferJob`]. It holds no timers and
//! never blocks: a host scheduler calls [`TransferSimulator::tick`] on a fixed
//! cadence while the job is running and [`TransferSimulator::reset`] once the
//! post-completion delay has elapsed. Every transition is pushed synchronously
//! to the registered observers.
//!
//! ```text
//! Idle --start--> Running --pause--> Paused --resume--> Running
//! Running/Paused --cancel--> Cancelled --> Idle
//! Running --tick reaches total--> Completed --reset--> Idle
//! ```

use std::time::Duration;

use crate::errors::{SimulatorError, SimulatorResult};
use crate::events::{Notice, ProgressUpdate, TransferObserver};
use crate::job::{estimate_remaining_secs, TransferJob, TransferState};
use crate::rate::RateSampler;
use crate::size::{self, DEFAULT_TOTAL_MB};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_millis(1500);

const STARTED_MESSAGE: &str = "Download started!";
const BUSY_MESSAGE: &str = "A download is already in progress!";
const CANCELLED_MESSAGE: &str = "Download cancelled";
const COMPLETED_MESSAGE: &str = "Download complete! Check your downloads folder.";

/// Timing knobs for the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Cadence the host ticks at; also the time step used for each increment.
    pub tick_interval: Duration,
    /// How long a completed job lingers before the host resets it.
    pub reset_delay: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            reset_delay: DEFAULT_RESET_DELAY,
        }
    }
}

/// Whether the caller confirmed a cancel request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    Declined,
    NotActive,
}

/// Result of one tick, telling the scheduler what to do next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Not running; nothing changed.
    Inactive,
    Progressed(ProgressUpdate),
    /// The job just completed; call `reset` after `reset_after`.
    Completed {
        update: ProgressUpdate,
        reset_after: Duration,
    },
}

pub struct TransferSimulator {
    config: SimulatorConfig,
    sampler: Box<dyn RateSampler>,
    observers: Vec<Box<dyn TransferObserver>>,
    job: Option<TransferJob>,
}

impl TransferSimulator {
    pub fn new(config: SimulatorConfig, sampler: impl RateSampler + 'static) -> Self {
        Self {
            config,
            sampler: Box::new(sampler),
            observers: Vec::new(),
            job: None,
        }
    }

    pub fn with_observer(mut self, observer: impl TransferObserver + 'static) -> Self {
        self.add_observer(observer);
        self
    }

    pub fn add_observer(&mut self, observer: impl TransferObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn job(&self) -> Option<&TransferJob> {
        self.job.as_ref()
    }

    pub fn state(&self) -> TransferState {
        self.job
            .as_ref()
            .map(TransferJob::state)
            .unwrap_or(TransferState::Idle)
    }

    pub fn transferred_bytes(&self) -> f64 {
        self.job
            .as_ref()
            .map(TransferJob::transferred_bytes)
            .unwrap_or(0.0)
    }

    pub fn total_bytes(&self) -> Option<f64> {
        self.job.as_ref().map(TransferJob::total_bytes)
    }

    /// Begin a new job of `total_bytes` MB.
    ///
    /// Rejected while a job is running or paused; the rejection is also pushed
    /// to observers as a warning. A finished job awaiting its reset is replaced.
    pub fn start(&mut self, total_bytes: f64) -> SimulatorResult<()> {
        self.ensure_idle()?;

        let total_bytes = if total_bytes.is_finite() && total_bytes > 0.0 {
            total_bytes
        } else {
            log::warn!("invalid total {total_bytes}; using default size of {DEFAULT_TOTAL_MB} MB");
            DEFAULT_TOTAL_MB
        };

        log::debug!("starting job of {total_bytes} MB");
        self.job = Some(TransferJob::new(total_bytes));
        self.emit_state(TransferState::Running);
        self.notify(Notice::success(STARTED_MESSAGE));
        Ok(())
    }

    /// Begin a new job sized by a display label such as `"420 MB"`.
    pub fn start_label(&mut self, label: &str) -> SimulatorResult<()> {
        self.ensure_idle()?;
        self.start(size::resolve_total(label))
    }

    /// Advance the running job by one interval.
    pub fn tick(&mut self) -> TickOutcome {
        let interval_secs = self.config.tick_interval.as_secs_f64();
        let Some(job) = self.job.as_mut() else {
            return TickOutcome::Inactive;
        };
        if job.state != TransferState::Running {
            return TickOutcome::Inactive;
        }

        let sampled = self.sampler.sample();
        let rate = if sampled.is_finite() {
            sampled.max(0.0)
        } else {
            0.0
        };
        let finished = job.advance(rate * interval_secs);
        job.last_rate = rate;
        job.eta_secs = estimate_remaining_secs(job.remaining_bytes(), rate);

        let update = ProgressUpdate {
            transferred: job.transferred_bytes,
            total: job.total_bytes,
            rate,
            eta_secs: job.eta_secs,
        };
        log::trace!(
            "tick {}: {:.3}/{} MB at {:.2} MB/s",
            job.ticks,
            update.transferred,
            update.total,
            rate
        );

        let ticks = job.ticks;
        if finished {
            job.state = TransferState::Completed;
        }
        for observer in &mut self.observers {
            observer.on_progress(&update);
        }
        if !finished {
            return TickOutcome::Progressed(update);
        }

        log::debug!("job completed after {ticks} ticks");
        self.emit_state(TransferState::Completed);
        for observer in &mut self.observers {
            observer.on_completed(update.total);
        }
        self.notify(Notice::success(COMPLETED_MESSAGE));
        TickOutcome::Completed {
            update,
            reset_after: self.config.reset_delay,
        }
    }

    /// Suspend ticking. Returns false unless the job was running.
    pub fn pause(&mut self) -> bool {
        self.transition(TransferState::Running, TransferState::Paused)
    }

    /// Continue from the retained progress. Returns false unless paused.
    pub fn resume(&mut self) -> bool {
        self.transition(TransferState::Paused, TransferState::Running)
    }

    /// Abandon the active job once the caller has confirmed.
    pub fn cancel(&mut self, confirmation: Confirmation) -> CancelOutcome {
        if !self.state().is_active() {
            return CancelOutcome::NotActive;
        }
        if confirmation == Confirmation::Declined {
            log::debug!("cancel declined; job continues");
            return CancelOutcome::Declined;
        }

        if let Some(job) = self.job.as_mut() {
            job.state = TransferState::Cancelled;
            job.transferred_bytes = 0.0;
        }
        self.emit_state(TransferState::Cancelled);
        self.job = None;
        log::debug!("job cancelled");
        self.emit_state(TransferState::Idle);
        for observer in &mut self.observers {
            observer.on_cancelled();
        }
        self.notify(Notice::warning(CANCELLED_MESSAGE));
        CancelOutcome::Cancelled
    }

    /// Return a completed job to idle so a new one can start.
    pub fn reset(&mut self) -> bool {
        if self.state() != TransferState::Completed {
            return false;
        }
        self.job = None;
        log::debug!("completed job reset");
        self.emit_state(TransferState::Idle);
        true
    }

    /// Drop whatever job exists without confirmation or notices, as when the
    /// download panel is closed. Returns false if already idle.
    pub fn dismiss(&mut self) -> bool {
        if self.job.take().is_none() {
            return false;
        }
        log::debug!("job dismissed");
        self.emit_state(TransferState::Idle);
        true
    }

    fn ensure_idle(&mut self) -> SimulatorResult<()> {
        let state = self.state();
        if state.is_active() {
            log::warn!("rejecting start while {state}");
            self.notify(Notice::warning(BUSY_MESSAGE));
            return Err(SimulatorError::Busy { state });
        }
        Ok(())
    }

    fn transition(&mut self, from: TransferState, to: TransferState) -> bool {
        match self.job.as_mut() {
            Some(job) if job.state == from => {
                job.state = to;
                log::debug!("{from} -> {to}");
                self.emit_state(to);
                true
            }
            _ => false,
        }
    }

    fn emit_state(&mut self, state: TransferState) {
        for observer in &mut self.observers {
            observer.on_state_change(state);
        }
    }

    fn notify(&mut self, notice: Notice) {
        for observer in &mut self.observers {
            observer.on_notice(&notice);
        }
    }
}
