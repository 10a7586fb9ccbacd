use std::fmt;

/// Lifecycle state of the simulated transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransferState {
    #[default]
    Idle,
    Running,
    Paused,
    Cancelled,
    Completed,
}

impl TransferState {
    /// A job in this state blocks a new `start`.
    pub fn is_active(self) -> bool {
        matches!(self, TransferState::Running | TransferState::Paused)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransferState::Idle => "idle",
            TransferState::Running => "running",
            TransferState::Paused => "paused",
            TransferState::Cancelled => "cancelled",
            TransferState::Completed => "completed",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One run of the simulated transfer.
///
/// Sizes are in megabytes and rates in MB/s. `transferred_bytes` never leaves
/// `[0, total_bytes]`, and the job is `Completed` exactly when the two are equal.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferJob {
    pub(crate) total_bytes: f64,
    pub(crate) transferred_bytes: f64,
    pub(crate) state: TransferState,
    pub(crate) last_rate: f64,
    pub(crate) eta_secs: Option<u64>,
    pub(crate) ticks: u64,
}

impl TransferJob {
    pub(crate) fn new(total_bytes: f64) -> Self {
        Self {
            total_bytes,
            transferred_bytes: 0.0,
            state: TransferState::Running,
            last_rate: 0.0,
            eta_secs: None,
            ticks: 0,
        }
    }

    pub fn total_bytes(&self) -> f64 {
        self.total_bytes
    }

    pub fn transferred_bytes(&self) -> f64 {
        self.transferred_bytes
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn last_rate(&self) -> f64 {
        self.last_rate
    }

    pub fn eta_secs(&self) -> Option<u64> {
        self.eta_secs
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Completed share in `[0.0, 1.0]`.
    pub fn fraction(&self) -> f64 {
        (self.transferred_bytes / self.total_bytes).clamp(0.0, 1.0)
    }

    pub fn remaining_bytes(&self) -> f64 {
        (self.total_bytes - self.transferred_bytes).max(0.0)
    }

    /// Advance by `increment`, clamping at the total. Returns true once the
    /// total has been reached.
    pub(crate) fn advance(&mut self, increment: f64) -> bool {
        let next = self.transferred_bytes + increment.max(0.0);
        self.transferred_bytes = next.min(self.total_bytes);
        self.ticks = self.ticks.saturating_add(1);
        self.transferred_bytes >= self.total_bytes
    }
}

/// Seconds left at `rate`, rounded to the nearest second. `None` when the rate
/// cannot produce an estimate.
pub fn estimate_remaining_secs(remaining: f64, rate: f64) -> Option<u64> {
    if !(rate.is_finite() && rate > 0.0) {
        return None;
    }
    let secs = (remaining.max(0.0) / rate).round();
    if secs.is_finite() {
        Some(secs as u64)
    } else {
        None
    }
}
