use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{
    get_confirmed, get_optional_str, get_required_str, saved_json, stats_json, with_tracker,
    WorkspaceTracker,
};
use crate::ipc::types::{Request, Session};
use crate::model::LectureStatus;
use crate::stats::sorted_lectures;
use serde_json::json;

fn lectures_list(
    tracker: &mut WorkspaceTracker,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = get_required_str(params, "subjectId")?;
    let stats = tracker.subject_stats(&subject_id)?;
    let lectures: Vec<serde_json::Value> = tracker
        .state()
        .subject(&subject_id)
        .map(|s| {
            sorted_lectures(s)
                .into_iter()
                .map(|l| {
                    json!({
                        "id": l.id,
                        "date": l.date,
                        "topic": l.topic,
                        "status": l.status,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(json!({
        "subjectId": subject_id,
        "lectures": lectures,
        "stats": stats_json(&stats),
    }))
}

fn lectures_create(
    tracker: &mut WorkspaceTracker,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    tracker.require_admin("add lectures")?;
    let subject_id = get_required_str(params, "subjectId")?;
    let date = get_required_str(params, "date")?;
    let topic = get_optional_str(params, "topic");
    let saved = tracker.add_lecture(&subject_id, &date, &topic)?;
    Ok(saved_json(&saved, json!({ "lectureId": saved.value })))
}

fn lectures_delete(
    tracker: &mut WorkspaceTracker,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    tracker.require_admin("delete lectures")?;
    let subject_id = get_required_str(params, "subjectId")?;
    let lecture_id = get_required_str(params, "lectureId")?;
    let saved = tracker.delete_lecture(&subject_id, &lecture_id, get_confirmed(params))?;
    Ok(saved_json(&saved, json!({ "deleted": saved.value })))
}

fn lectures_set_status(
    tracker: &mut WorkspaceTracker,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = get_required_str(params, "subjectId")?;
    let lecture_id = get_required_str(params, "lectureId")?;
    let raw = get_required_str(params, "status")?;
    let status = LectureStatus::parse(&raw)
        .ok_or_else(|| HandlerErr::bad_params("status must be pending, present or absent"))?;
    let saved = tracker.set_lecture_status(&subject_id, &lecture_id, status)?;
    let stats = tracker.subject_stats(&subject_id)?;
    Ok(saved_json(
        &saved,
        json!({
            "changed": saved.value,
            "status": status,
            "stats": stats_json(&stats),
        }),
    ))
}

pub fn try_handle(state: &mut Session, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "lectures.list" => Some(with_tracker(state, req, lectures_list)),
        "lectures.create" => Some(with_tracker(state, req, lectures_create)),
        "lectures.delete" => Some(with_tracker(state, req, lectures_delete)),
        "lectures.setStatus" => Some(with_tracker(state, req, lectures_set_status)),
        _ => None,
    }
}
