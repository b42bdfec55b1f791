use crate::ipc::error::{err, ok, roster_err};
use crate::ipc::types::{AppState, Request};
use crate::roster;
use crate::session::AttendanceSession;
use serde_json::json;
use std::path::PathBuf;

fn handle_roster_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match req.params.get("path").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => return err(&req.id, "bad_params", "missing path", None),
    };

    let (class_name, roster) = match roster::load_roster(&path) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "roster load failed");
            return roster_err(&req.id, &e);
        }
    };

    let duplicates = roster.duplicate_roll_numbers();
    let students = roster.students().to_vec();
    let session = AttendanceSession::new(class_name.clone(), roster);
    let session_id = session.id().to_string();
    if let Some(prev) = state.session.replace(session) {
        tracing::debug!(previous = %prev.class_name(), "replacing attendance session");
    }

    ok(
        &req.id,
        json!({
            "sessionId": session_id,
            "className": class_name,
            "studentCount": students.len(),
            "students": students,
            "duplicateRollNos": duplicates,
            "message": format!("Loaded student data from {}.csv", class_name),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.load" => Some(handle_roster_load(state, req)),
        _ => None,
    }
}
