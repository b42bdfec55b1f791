mod chart;
mod csvio;
mod error;
mod ipc;
mod roster;
mod session;

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Attendance sidecar: one JSON request per stdin line, one JSON response per stdout line.
#[derive(Debug, Parser)]
#[command(name = "attendanced", version)]
struct Cli {
    /// Directory that receives `<class>/attendance_<date>.csv` logs.
    #[arg(long, env = "ATTENDANCED_RECORDS_DIR", default_value = session::DEFAULT_RECORDS_DIR)]
    records_dir: PathBuf,

    /// Debug logging on stderr (RUST_LOG takes precedence).
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // stdout carries the protocol; logs go to stderr.
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let mut state = ipc::AppState::new(cli.records_dir);
    tracing::debug!(records_dir = %state.records_dir.display(), "attendanced ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
