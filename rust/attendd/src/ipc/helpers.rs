use serde_json::json;

use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::types::{Request, Session};
use crate::model::Subject;
use crate::stats::DerivedStats;
use crate::store::FileStore;
use crate::tracker::{Saved, Tracker};

pub type WorkspaceTracker = Tracker<FileStore>;

/// Runs `f` against the open workspace, or answers `no_workspace`.
pub fn with_tracker<F>(state: &mut Session, req: &Request, f: F) -> serde_json::Value
where
    F: FnOnce(&mut WorkspaceTracker, &serde_json::Value) -> Result<serde_json::Value, HandlerErr>,
{
    let Some(tracker) = state.tracker.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match f(tracker, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_str(params: &serde_json::Value, key: &str) -> String {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Destructive methods default to unconfirmed.
pub fn get_confirmed(params: &serde_json::Value) -> bool {
    params
        .get("confirmed")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

/// Adds `persisted` (and `persistError`) to a mutation result object.
pub fn saved_json<T>(saved: &Saved<T>, mut result: serde_json::Value) -> serde_json::Value {
    result["persisted"] = json!(saved.persisted());
    if let Some(e) = &saved.persist_error {
        result["persistError"] = json!(e);
    }
    result
}

pub fn stats_json(stats: &DerivedStats) -> serde_json::Value {
    serde_json::to_value(stats).unwrap_or_else(|_| json!({}))
}

pub fn subject_json(tracker: &WorkspaceTracker, subject: &Subject) -> serde_json::Value {
    json!({
        "id": subject.id,
        "name": subject.name,
        "code": subject.code,
        "maxAbsences": subject.effective_cap(tracker.state().default_max_absences),
        "lectureCount": subject.lectures.len(),
        "stats": stats_json(&tracker.stats(Some(subject))),
    })
}
