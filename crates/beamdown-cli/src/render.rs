use beamdown_core::{Notice, NoticeLevel, ProgressUpdate, TransferEvent, TransferState};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Stream};
use tokio::sync::mpsc::UnboundedReceiver;

pub fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb
}

/// Render simulator events until the simulator (and its observer) is dropped.
pub async fn render_events(mut events: UnboundedReceiver<TransferEvent>, bar: ProgressBar) {
    let mut last: Option<ProgressUpdate> = None;
    while let Some(event) = events.recv().await {
        match event {
            TransferEvent::Progress(update) => {
                bar.set_position(update.percent().round() as u64);
                bar.set_message(progress_message(&update));
                last = Some(update);
            }
            TransferEvent::StateChanged(TransferState::Paused) => {
                let percent = last.map(|u| u.percent_label()).unwrap_or_else(|| "0%".into());
                bar.set_message(format!("{percent} • paused"));
            }
            TransferEvent::StateChanged(TransferState::Idle) => {
                bar.set_position(0);
                bar.set_message("");
                last = None;
            }
            TransferEvent::Completed { .. } => bar.set_position(100),
            TransferEvent::Notice(notice) => bar.suspend(|| println!("{}", notice_line(&notice))),
            TransferEvent::StateChanged(_) | TransferEvent::Cancelled => {}
        }
    }
    bar.finish_and_clear();
}

pub fn progress_message(update: &ProgressUpdate) -> String {
    format!(
        "{} • {} • {} left",
        update.percent_label(),
        update.rate_label(),
        update.eta_label()
    )
}

/// Notice with its level tag, coloured only when stdout supports it.
pub fn notice_line(notice: &Notice) -> String {
    let tag = format!("[{}]", notice.level.as_str());
    let tag = match notice.level {
        NoticeLevel::Success => tag
            .if_supports_color(Stream::Stdout, |t| t.green())
            .to_string(),
        NoticeLevel::Warning => tag
            .if_supports_color(Stream::Stdout, |t| t.yellow())
            .to_string(),
        NoticeLevel::Info => tag
            .if_supports_color(Stream::Stdout, |t| t.blue())
            .to_string(),
    };
    format!("{tag} {}", notice.message)
}
