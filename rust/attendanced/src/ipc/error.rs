use crate::error::{RosterError, SessionError, Severity};
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

fn severity_details(severity: Severity, mut extra: serde_json::Value) -> serde_json::Value {
    extra["severity"] = json!(severity.as_str());
    extra
}

pub fn roster_err(id: &str, e: &RosterError) -> serde_json::Value {
    let extra = match e {
        RosterError::NotFound { path, .. } | RosterError::EmptyRoster { path } => {
            json!({ "path": path.to_string_lossy() })
        }
        RosterError::MalformedSchema { path, missing } => {
            json!({ "path": path.to_string_lossy(), "missingColumns": missing })
        }
    };
    err(id, e.code(), e.to_string(), Some(severity_details(e.severity(), extra)))
}

pub fn session_err(id: &str, e: &SessionError) -> serde_json::Value {
    let extra = match e {
        SessionError::UnknownStudent { roll_no } => json!({ "rollNo": roll_no }),
        SessionError::NoActiveSession => json!({}),
        SessionError::PersistenceUnavailable { path, .. } => {
            json!({ "path": path.to_string_lossy() })
        }
    };
    err(id, e.code(), e.to_string(), Some(severity_details(e.severity(), extra)))
}
