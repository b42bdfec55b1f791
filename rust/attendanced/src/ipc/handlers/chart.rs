use crate::chart;
use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

use super::attendance;

fn handle_attendance_chart(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match attendance::session_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    ok(&req.id, json!(chart::attendance_chart(session)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.chart" => Some(handle_attendance_chart(state, req)),
        _ => None,
    }
}
