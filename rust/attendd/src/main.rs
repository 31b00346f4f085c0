mod config;
mod gate;
mod ipc;
mod model;
mod stats;
mod store;
mod tracker;

use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

fn main() {
    let cfg = config::Config::parse();
    config::init_logging(&cfg.log_level);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        gate_mode = ?cfg.gate_mode,
        "attendd starting"
    );

    let mut state = ipc::Session::new(cfg.gate_mode, cfg.passcode.clone());
    if let Some(path) = cfg.workspace.clone() {
        if let Err(e) = state.open_workspace(path.clone()) {
            // Still serve requests; the host can retry with workspace.select.
            warn!(path = %path.display(), error = %e, "failed to open workspace");
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No id to reply to.
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
    info!("stdin closed; exiting");
}
