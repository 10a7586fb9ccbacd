use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

use wait_timeout::ChildExt;

pub struct TestContext {
    pub _work: tempfile::TempDir,
    pub config_dir: PathBuf,
    pub cli_bin: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let work = tempdir().expect("tempdir");
        let config_dir = work.path().join("cli-config");
        fs::create_dir_all(&config_dir).expect("cli config");

        Self {
            _work: work,
            config_dir,
            cli_bin: PathBuf::from(env!("CARGO_BIN_EXE_beamdown")),
        }
    }

    /// A config dir whose settings make downloads finish in well under a second.
    pub fn fast() -> Self {
        let ctx = Self::new();
        ctx.write_settings(
            r#"
tick_interval_ms = 10
reset_delay_ms = 10
min_rate = 5.0
max_rate = 10.0
seed = 7
default_platform = "tiny"

[platforms.tiny]
name = "Tiny"
size = "1 MB"

[platforms.huge]
name = "Huge"
size = "10 GB"
"#,
        );
        ctx
    }

    pub fn write_settings(&self, contents: &str) {
        fs::write(self.config_dir.join("settings.toml"), contents).expect("write settings");
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.cli_bin);
        cmd.arg("--config-dir").arg(&self.config_dir);
        // Piped stdout should stay uncoloured unless a caller forces colour.
        cmd.env_remove("FORCE_COLOR").env_remove("CLICOLOR_FORCE");
        cmd
    }
}

pub fn run_with_timeout(cmd: Command, timeout: Duration) -> Output {
    run_with_input(cmd, "", timeout)
}

/// Run `cmd` feeding `input` on stdin, then closing it.
pub fn run_with_input(cmd: Command, input: &str, timeout: Duration) -> Output {
    run_with_input_after(cmd, input, Duration::ZERO, timeout)
}

/// Like [`run_with_input`], but waits `delay` after spawning before writing.
pub fn run_with_input_after(
    mut cmd: Command,
    input: &str,
    delay: Duration,
    timeout: Duration,
) -> Output {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().expect("spawn command");

    if !delay.is_zero() {
        thread::sleep(delay);
    }
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes()).expect("write stdin");
    }

    match child.wait_timeout(timeout).expect("wait for process") {
        Some(_status) => child
            .wait_with_output()
            .expect("collect command output after completion"),
        None => {
            let _ = child.kill();
            let output = child
                .wait_with_output()
                .expect("collect output after killing command");
            panic!(
                "command timed out after {:?}\nstdout:\n{}\nstderr:\n{}",
                timeout,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }
}
