use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::helpers::{get_required_str, stats_json, subject_json, with_tracker, WorkspaceTracker};
use crate::ipc::types::{Request, Session};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

fn handle_health(state: &mut Session, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "gateMode": state.gate_mode,
        }),
    )
}

fn handle_workspace_select(state: &mut Session, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match state.open_workspace(path.clone()) {
        Ok(()) => {
            info!(path = %path.display(), "workspace opened");
            ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "workspace open failed");
            err(&req.id, "workspace_open_failed", format!("{e:#}"), None)
        }
    }
}

fn state_get(tracker: &mut WorkspaceTracker) -> serde_json::Value {
    let tracker: &WorkspaceTracker = tracker;
    let subjects: Vec<serde_json::Value> = tracker
        .state()
        .subjects
        .iter()
        .map(|s| subject_json(tracker, s))
        .collect();
    json!({
        "state": tracker.state(),
        "subjects": subjects,
        "selectedSubjectId": tracker.selected_subject_id(),
        "gate": {
            "unlocked": tracker.gate().is_unlocked(),
            "mode": tracker.gate().mode(),
        },
    })
}

/// Stats for `subjectId`, or for the selected subject when omitted.
fn stats_get(
    tracker: &mut WorkspaceTracker,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = match params.get("subjectId") {
        Some(v) if !v.is_null() => Some(get_required_str(params, "subjectId")?),
        _ => tracker.selected_subject_id().map(|s| s.to_string()),
    };
    let stats = match subject_id.as_deref() {
        Some(id) => tracker.subject_stats(id)?,
        None => tracker.stats(None),
    };
    Ok(json!({
        "subjectId": subject_id,
        "stats": stats_json(&stats),
    }))
}

pub fn try_handle(state: &mut Session, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "state.get" => Some(with_tracker(state, req, |t, _| Ok(state_get(t)))),
        "stats.get" => Some(with_tracker(state, req, stats_get)),
        _ => None,
    }
}
