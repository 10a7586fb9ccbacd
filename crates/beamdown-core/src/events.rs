//! Signals pushed from the simulator to its observers.

use tokio::sync::mpsc::UnboundedSender;

use crate::job::TransferState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
}

impl NoticeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
        }
    }
}

/// Transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Values recomputed on every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub transferred: f64,
    pub total: f64,
    pub rate: f64,
    pub eta_secs: Option<u64>,
}

impl ProgressUpdate {
    pub fn fraction(&self) -> f64 {
        (self.transferred / self.total).clamp(0.0, 1.0)
    }

    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }

    /// Whole-number percentage, or `Complete!` once the total is reached.
    pub fn percent_label(&self) -> String {
        if self.transferred >= self.total {
            "Complete!".to_string()
        } else {
            format!("{}%", self.percent().round() as u64)
        }
    }

    pub fn rate_label(&self) -> String {
        format_rate(self.rate)
    }

    pub fn eta_label(&self) -> String {
        format_eta(self.eta_secs)
    }
}

pub fn format_rate(rate: f64) -> String {
    format!("{rate:.1} MB/s")
}

pub fn format_eta(eta_secs: Option<u64>) -> String {
    match eta_secs {
        Some(secs) => format!("{secs}s"),
        None => "--".to_string(),
    }
}

/// Receives simulator signals synchronously, in emission order.
pub trait TransferObserver: Send {
    fn on_progress(&mut self, _update: &ProgressUpdate) {}
    fn on_state_change(&mut self, _state: TransferState) {}
    fn on_completed(&mut self, _total: f64) {}
    fn on_cancelled(&mut self) {}
    fn on_notice(&mut self, _notice: &Notice) {}
}

/// Owned form of every observer callback.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    Progress(ProgressUpdate),
    StateChanged(TransferState),
    Completed { total: f64 },
    Cancelled,
    Notice(Notice),
}

/// Forwards signals over an unbounded channel so a rendering task can consume
/// them without sharing the simulator.
#[derive(Clone)]
pub struct ChannelObserver {
    sender: UnboundedSender<TransferEvent>,
}

impl ChannelObserver {
    pub fn new(sender: UnboundedSender<TransferEvent>) -> Self {
        Self { sender }
    }

    fn send(&self, event: TransferEvent) {
        // The renderer may already be gone during shutdown.
        let _ = self.sender.send(event);
    }
}

impl TransferObserver for ChannelObserver {
    fn on_progress(&mut self, update: &ProgressUpdate) {
        self.send(TransferEvent::Progress(*update));
    }

    fn on_state_change(&mut self, state: TransferState) {
        self.send(TransferEvent::StateChanged(state));
    }

    fn on_completed(&mut self, total: f64) {
        self.send(TransferEvent::Completed { total });
    }

    fn on_cancelled(&mut self) {
        self.send(TransferEvent::Cancelled);
    }

    fn on_notice(&mut self, notice: &Notice) {
        self.send(TransferEvent::Notice(notice.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    fn update(transferred: f64, total: f64, rate: f64, eta_secs: Option<u64>) -> ProgressUpdate {
        ProgressUpdate {
            transferred,
            total,
            rate,
            eta_secs,
        }
    }

    #[test]
    fn labels_round_for_display() {
        let u = update(57.4, 100.0, 7.26, Some(8));
        assert_eq!(u.percent_label(), "57%");
        assert_eq!(u.rate_label(), "7.3 MB/s");
        assert_eq!(u.eta_label(), "8s");
    }

    #[test]
    fn finished_update_reads_complete() {
        let u = update(420.0, 420.0, 3.0, Some(0));
        assert_eq!(u.percent_label(), "Complete!");
        assert_eq!(u.fraction(), 1.0);
    }

    #[test]
    fn missing_eta_renders_placeholder() {
        assert_eq!(format_eta(None), "--");
    }

    #[test]
    fn channel_observer_forwards_in_order() {
        let (tx, mut rx) = unbounded_channel();
        let mut observer = ChannelObserver::new(tx);
        observer.on_state_change(TransferState::Running);
        observer.on_notice(&Notice::warning("careful"));
        observer.on_cancelled();

        assert_eq!(
            rx.try_recv().unwrap(),
            TransferEvent::StateChanged(TransferState::Running)
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            TransferEvent::Notice(Notice::warning("careful"))
        );
        assert_eq!(rx.try_recv().unwrap(), TransferEvent::Cancelled);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_observer_ignores_closed_receiver() {
        let (tx, rx) = unbounded_channel();
        drop(rx);
        let mut observer = ChannelObserver::new(tx);
        observer.on_completed(1.0);
    }
}
