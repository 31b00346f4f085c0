use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{
    get_confirmed, get_optional_str, get_required_str, saved_json, subject_json, with_tracker,
    WorkspaceTracker,
};
use crate::ipc::types::{Request, Session};
use serde_json::json;

fn subjects_list(tracker: &mut WorkspaceTracker) -> serde_json::Value {
    let tracker: &WorkspaceTracker = tracker;
    let subjects: Vec<serde_json::Value> = tracker
        .state()
        .subjects
        .iter()
        .map(|s| subject_json(tracker, s))
        .collect();
    json!({
        "subjects": subjects,
        "selectedSubjectId": tracker.selected_subject_id(),
        "defaultMaxAbsences": tracker.state().default_max_absences,
    })
}

fn subjects_create(
    tracker: &mut WorkspaceTracker,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    tracker.require_admin("add subjects")?;
    let name = get_required_str(params, "name")?;
    let code = get_optional_str(params, "code");
    let saved = tracker.add_subject(&name, &code)?;
    Ok(saved_json(
        &saved,
        json!({
            "subjectId": saved.value,
            "selectedSubjectId": tracker.selected_subject_id(),
        }),
    ))
}

fn subjects_delete(
    tracker: &mut WorkspaceTracker,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    tracker.require_admin("delete subjects")?;
    let subject_id = get_required_str(params, "subjectId")?;
    let saved = tracker.delete_subject(&subject_id, get_confirmed(params))?;
    Ok(saved_json(
        &saved,
        json!({
            "deleted": saved.value,
            "selectedSubjectId": tracker.selected_subject_id(),
        }),
    ))
}

fn subjects_select(
    tracker: &mut WorkspaceTracker,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = get_required_str(params, "subjectId")?;
    tracker.select_subject(&subject_id)?;
    Ok(json!({ "selectedSubjectId": subject_id }))
}

pub fn try_handle(state: &mut Session, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.list" => Some(with_tracker(state, req, |t, _| Ok(subjects_list(t)))),
        "subjects.create" => Some(with_tracker(state, req, subjects_create)),
        "subjects.delete" => Some(with_tracker(state, req, subjects_delete)),
        "subjects.select" => Some(with_tracker(state, req, subjects_select)),
        _ => None,
    }
}
