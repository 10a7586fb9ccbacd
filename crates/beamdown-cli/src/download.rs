use crate::cli::DownloadArgs;
use crate::context::AppContext;
use crate::render;
use beamdown_core::{
    size, ChannelObserver, Confirmation, DriverCommand, JobOutcome, JobReport, Notice,
    PlatformCatalog, SimulatorDriver, TransferSimulator,
};
use eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressDrawTarget};
use std::io::{self, BufRead, Write};
use std::thread;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

const CANCEL_PROMPT: &str = "Are you sure you want to cancel the download?";

pub async fn run_download(ctx: &AppContext, args: &DownloadArgs) -> Result<()> {
    let requested = args
        .platform
        .as_deref()
        .unwrap_or_else(|| ctx.catalog.default_id());
    let (platform_id, entry) = ctx.catalog.lookup(requested);
    if !platform_id.eq_ignore_ascii_case(requested.trim()) {
        let notice = Notice::info(format!(
            "Unknown platform '{requested}'; downloading {} instead.",
            entry.name
        ));
        println!("{}", render::notice_line(&notice));
    }

    let mut settings = ctx.settings.clone();
    if let Some(seed) = args.seed {
        settings.seed = Some(seed);
    }
    if let Some(interval_ms) = args.interval_ms {
        settings.tick_interval_ms = interval_ms;
    }
    settings.validate().wrap_err("invalid download options")?;

    let (event_tx, event_rx) = unbounded_channel();
    let simulator = TransferSimulator::new(settings.simulator_config(), settings.rate_sampler())
        .with_observer(ChannelObserver::new(event_tx));
    let mut driver = SimulatorDriver::new(simulator);

    println!(
        "beamdown v{}: downloading {} ({})",
        env!("CARGO_PKG_VERSION"),
        entry.name,
        entry.size
    );
    if !args.quiet {
        println!("Controls: [p] pause  [r] resume  [c] cancel  [s <platform>] start another  [q] close");
    }

    let bar = render::progress_bar(args.quiet);
    let renderer = tokio::spawn(render::render_events(event_rx, bar.clone()));

    let (command_tx, mut command_rx) = unbounded_channel();
    spawn_control_reader(command_tx, ctx.catalog.clone(), args.yes, bar);

    let report = driver
        .run_job(entry, &mut command_rx)
        .await
        .wrap_err_with(|| format!("failed to start download of {}", entry.name))?;

    // Dropping the simulator closes the event stream so the renderer can finish.
    drop(driver);
    renderer.await.wrap_err("progress renderer panicked")?;

    print_summary(&report);
    Ok(())
}

/// Read control keys from stdin on a plain thread.
///
/// Tokio's stdin cannot be cancelled once a read is pending, which would keep
/// the runtime alive after the job ends; a detached thread does not.
fn spawn_control_reader(
    commands: UnboundedSender<DriverCommand>,
    catalog: PlatformCatalog,
    skip_prompt: bool,
    bar: ProgressBar,
) {
    thread::spawn(move || {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        while let Some(Ok(line)) = lines.next() {
            let command = match parse_control(&line, &catalog) {
                Some(Control::Cancel) => {
                    let confirmed = skip_prompt
                        || with_bar_hidden(&bar, || {
                            confirm(CANCEL_PROMPT, &mut lines).unwrap_or(false)
                        });
                    DriverCommand::Cancel(Confirmation::from(confirmed))
                }
                Some(Control::Command(command)) => command,
                None => {
                    if !line.trim().is_empty() {
                        bar.suspend(|| println!("Unrecognized control '{}'", line.trim()));
                    }
                    continue;
                }
            };
            if commands.send(command).is_err() {
                break;
            }
        }
    });
}

#[derive(Debug, PartialEq)]
enum Control {
    Command(DriverCommand),
    Cancel,
}

fn parse_control(line: &str, catalog: &PlatformCatalog) -> Option<Control> {
    let mut parts = line.split_whitespace();
    let key = parts.next()?.to_ascii_lowercase();
    let control = match key.as_str() {
        "p" | "pause" => Control::Command(DriverCommand::Pause),
        "r" | "resume" => Control::Command(DriverCommand::Resume),
        "c" | "cancel" => Control::Cancel,
        "q" | "close" => Control::Command(DriverCommand::Dismiss),
        "s" | "start" => {
            let platform = parts.next().unwrap_or_else(|| catalog.default_id());
            let (_, entry) = catalog.lookup(platform);
            Control::Command(DriverCommand::Start(entry.clone()))
        }
        _ => return None,
    };
    Some(control)
}

/// Run `f` with the bar detached from the terminal, then draw it again.
///
/// Unlike `ProgressBar::suspend`, no bar lock is held while `f` blocks on
/// stdin, so the renderer keeps updating the (hidden) bar meanwhile.
fn with_bar_hidden<R>(bar: &ProgressBar, f: impl FnOnce() -> R) -> R {
    if bar.is_hidden() {
        return f();
    }
    bar.set_draw_target(ProgressDrawTarget::hidden());
    let result = f();
    bar.set_draw_target(ProgressDrawTarget::stderr());
    result
}

/// Prompt for confirmation, reading the answer from the same line source.
fn confirm<I>(message: &str, lines: &mut I) -> Result<bool>
where
    I: Iterator<Item = io::Result<String>>,
{
    print!("{} [y/N]: ", message);
    io::stdout().flush()?;
    let answer = match lines.next() {
        Some(line) => line?,
        None => return Ok(false),
    };
    let decision = answer.trim().to_ascii_lowercase();
    Ok(decision == "y" || decision == "yes")
}

fn print_summary(report: &JobReport) {
    for line in summary_lines(report) {
        println!("{line}");
    }
}

fn summary_lines(report: &JobReport) -> Vec<String> {
    let entry = &report.platform;
    let elapsed = report.elapsed.as_secs_f64();
    let mut lines = Vec::new();
    match report.outcome {
        JobOutcome::Completed => {
            let throughput = if elapsed > 0.0 {
                report.total_mb / elapsed
            } else {
                0.0
            };
            lines.push(format!(
                "Download complete: {} ({}) in {:.2?}",
                entry.name,
                size::format_size(report.total_mb),
                report.elapsed
            ));
            lines.push(format!(
                "• Throughput: {:.1} MB/s | Ticks: {}",
                throughput, report.ticks
            ));
        }
        JobOutcome::Cancelled => lines.push(format!(
            "Download cancelled: {} after {:.1} of {}",
            entry.name,
            report.transferred_mb,
            size::format_size(report.total_mb)
        )),
        JobOutcome::Dismissed => lines.push(format!(
            "Download closed: {} at {:.1} of {}",
            entry.name,
            report.transferred_mb,
            size::format_size(report.total_mb)
        )),
    }
    if report.rejected_starts > 0 {
        lines.push(format!(
            "• Ignored {} start request(s) while busy",
            report.rejected_starts
        ));
    }
    lines
}
