use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{get_optional_str, with_tracker, WorkspaceTracker};
use crate::ipc::types::{Request, Session};
use serde_json::json;

fn gate_status(tracker: &WorkspaceTracker) -> serde_json::Value {
    let gate = tracker.gate();
    json!({
        "unlocked": gate.is_unlocked(),
        "mode": gate.mode(),
        "surfaceVisible": gate.surface_visible(),
    })
}

fn gate_unlock(
    tracker: &mut WorkspaceTracker,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    // A missing passcode is the same as an empty form submission.
    let passcode = get_optional_str(params, "passcode");
    let follow_up = tracker.unlock(&passcode)?;
    let mut out = gate_status(tracker);
    out["followUp"] = json!(follow_up);
    Ok(out)
}

pub fn try_handle(state: &mut Session, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "gate.status" => Some(with_tracker(state, req, |t, _| Ok(gate_status(t)))),
        "gate.unlock" => Some(with_tracker(state, req, gate_unlock)),
        "gate.lock" => Some(with_tracker(state, req, |t, _| {
            t.lock();
            Ok(gate_status(t))
        })),
        _ => None,
    }
}
