use crate::gate::GateMode;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_PASSCODE: &str = "admin";

/// Attendance tracker sidecar. Speaks newline-delimited JSON on stdin/stdout.
#[derive(Debug, Clone, Parser)]
#[command(name = "attendd", version, about)]
pub struct Config {
    /// Open this workspace directory on startup instead of waiting for `workspace.select`.
    #[arg(long, env = "ATTENDD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// `inline` shows content to students; `portal` hides everything behind the login form.
    #[arg(long, value_enum, env = "ATTENDD_GATE_MODE", default_value = "inline")]
    pub gate_mode: GateMode,

    /// Admin passcode for the mode toggle. A UI convenience, not a credential.
    #[arg(long, env = "ATTENDD_PASSCODE", default_value = DEFAULT_PASSCODE)]
    pub passcode: String,

    /// Log filter directive (e.g. `info`, `attendd=debug`). Logs go to stderr.
    #[arg(long, env = "ATTENDD_LOG", default_value = "info")]
    pub log_level: String,
}

pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the protocol.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .try_init();
}
