use super::handlers;
use super::types::{Request, Session};
use crate::ipc::error::err;
use tracing::debug;

/// Methods that stay reachable while the portal gate hides everything else.
/// `workspace.select` is only reachable before a workspace is open, since the
/// guard below does not apply until then.
fn bypasses_portal(method: &str) -> bool {
    method == "health" || method.starts_with("gate.")
}

pub fn handle_request(state: &mut Session, req: Request) -> serde_json::Value {
    debug!(id = %req.id, method = %req.method, "request");

    if !bypasses_portal(&req.method) {
        if let Some(tracker) = state.tracker.as_ref() {
            if !tracker.gate().surface_visible() {
                return err(&req.id, "portal_locked", "log in to continue", None);
            }
        }
    }

    if let Some(resp) = handlers::core::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::gate::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::subjects::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::lectures::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::limits::try_handle(state, &req) {
        return resp;
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
