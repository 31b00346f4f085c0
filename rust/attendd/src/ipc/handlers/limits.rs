use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{get_required_str, saved_json, stats_json, with_tracker, WorkspaceTracker};
use crate::ipc::types::{Request, Session};
use crate::tracker::{parse_limit, TrackerError};
use serde_json::json;

/// The limit editor may submit a JSON number or the raw text of its input.
fn get_limit_value(params: &serde_json::Value) -> Result<i64, HandlerErr> {
    let Some(v) = params.get("value") else {
        return Err(HandlerErr::bad_params("missing value"));
    };
    if let Some(n) = v.as_i64() {
        return Ok(n);
    }
    if let Some(s) = v.as_str() {
        return Ok(i64::from(parse_limit(s)?));
    }
    Err(HandlerErr::from(TrackerError::Validation(
        "limit must be a whole number greater than or equal to 0".to_string(),
    )))
}

fn limits_set(
    tracker: &mut WorkspaceTracker,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    tracker.require_admin("change absence limits")?;
    let subject_id = get_required_str(params, "subjectId")?;
    let value = get_limit_value(params)?;
    let saved = tracker.set_absence_limit(&subject_id, value)?;
    Ok(saved_json(
        &saved,
        json!({
            "subjectId": subject_id,
            "defaultMaxAbsences": tracker.state().default_max_absences,
            "stats": stats_json(&saved.value),
        }),
    ))
}

fn limits_set_default(
    tracker: &mut WorkspaceTracker,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    tracker.require_admin("change absence limits")?;
    let value = get_limit_value(params)?;
    let saved = tracker.set_default_absence_limit(value)?;
    Ok(saved_json(&saved, json!({ "defaultMaxAbsences": saved.value })))
}

pub fn try_handle(state: &mut Session, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "limits.set" => Some(with_tracker(state, req, limits_set)),
        "limits.setDefault" => Some(with_tracker(state, req, limits_set_default)),
        _ => None,
    }
}
