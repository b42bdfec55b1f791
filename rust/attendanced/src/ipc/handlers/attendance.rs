use crate::error::SessionError;
use crate::ipc::error::{err, ok, session_err};
use crate::ipc::types::{AppState, Request};
use crate::session::{AttendanceSession, AttendanceState};
use chrono::NaiveDateTime;
use serde_json::json;

fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

fn check_session_id(session: &AttendanceSession, req: &Request) -> Result<(), serde_json::Value> {
    let Some(wanted) = req.params.get("sessionId").and_then(|v| v.as_str()) else {
        return Ok(());
    };
    if wanted == session.id().to_string() {
        return Ok(());
    }
    Err(err(
        &req.id,
        "stale_session",
        "the roster was reloaded; refresh and try again",
        Some(json!({ "sessionId": wanted, "activeSessionId": session.id().to_string() })),
    ))
}

pub(super) fn session_ref<'a>(
    state: &'a AppState,
    req: &Request,
) -> Result<&'a AttendanceSession, serde_json::Value> {
    let session = state
        .session
        .as_ref()
        .ok_or_else(|| session_err(&req.id, &SessionError::NoActiveSession))?;
    check_session_id(session, req)?;
    Ok(session)
}

fn session_mut<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut AttendanceSession, serde_json::Value> {
    let session = state
        .session
        .as_mut()
        .ok_or_else(|| session_err(&req.id, &SessionError::NoActiveSession))?;
    check_session_id(session, req)?;
    Ok(session)
}

fn parse_now(req: &Request) -> Result<NaiveDateTime, serde_json::Value> {
    let Some(raw) = req.params.get("now") else {
        return Ok(chrono::Local::now().naive_local());
    };
    let Some(s) = raw.as_str() else {
        return Err(err(&req.id, "bad_params", "now must be a string", None));
    };
    let t = s.trim();
    NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| {
            err(
                &req.id,
                "bad_params",
                "now must be YYYY-MM-DDTHH:MM:SS",
                Some(json!({ "now": s })),
            )
        })
}

fn rows_json(session: &AttendanceSession, roll_no: Option<&str>) -> Vec<serde_json::Value> {
    session
        .rows()
        .enumerate()
        .filter(|(_, (s, _))| roll_no.map(|r| s.roll_no == r).unwrap_or(true))
        .map(|(row, (s, state))| {
            json!({
                "row": row,
                "rollNo": s.roll_no,
                "name": s.name,
                "state": state,
                "present": state == AttendanceState::Present,
                "absent": state == AttendanceState::Absent,
            })
        })
        .collect()
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match session_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    ok(
        &req.id,
        json!({
            "sessionId": session.id().to_string(),
            "className": session.class_name(),
            "rows": rows_json(session, None),
        }),
    )
}

fn handle_mark(state: &mut AppState, req: &Request, present: bool) -> serde_json::Value {
    let roll_no = match required_str(req, "rollNo") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match session_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let marked = if present {
        session.mark_present(&roll_no)
    } else {
        session.mark_absent(&roll_no)
    };
    if let Err(e) = marked {
        return session_err(&req.id, &e);
    }
    ok(
        &req.id,
        json!({
            "rollNo": roll_no,
            "state": session.state_of(&roll_no).ok(),
            "rows": rows_json(session, Some(&roll_no)),
        }),
    )
}

fn handle_clear_all(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match session_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    session.clear_all();
    tracing::debug!(class = %session.class_name(), "attendance cleared");
    ok(
        &req.id,
        json!({
            "cleared": session.roster().len(),
            "message": "All attendance cleared.",
        }),
    )
}

fn handle_snapshot(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match session_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    ok(
        &req.id,
        json!({
            "className": session.class_name(),
            "rows": session.snapshot(),
        }),
    )
}

fn handle_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let now = match parse_now(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let records_dir = state.records_dir.clone();
    let session = match session_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let file_name = AttendanceSession::log_file_name(&now);
    let folder = session.log_dir(&records_dir);
    let header_written = !folder.join(&file_name).exists();
    let path = match session.persist(&records_dir, now) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(class = %session.class_name(), error = %e, "attendance save failed");
            return session_err(&req.id, &e);
        }
    };
    ok(
        &req.id,
        json!({
            "path": path.to_string_lossy(),
            "fileName": file_name,
            "folder": folder.to_string_lossy(),
            "rowsWritten": session.roster().len(),
            "headerWritten": header_written,
            "message": format!(
                "Attendance saved for {}!\nFile: {}\nLocation: {}",
                session.class_name(),
                file_name,
                folder.to_string_lossy()
            ),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.open" => Some(handle_open(state, req)),
        "attendance.markPresent" => Some(handle_mark(state, req, true)),
        "attendance.markAbsent" => Some(handle_mark(state, req, false)),
        "attendance.clearAll" => Some(handle_clear_all(state, req)),
        "attendance.snapshot" => Some(handle_snapshot(state, req)),
        "attendance.save" => Some(handle_save(state, req)),
        _ => None,
    }
}
