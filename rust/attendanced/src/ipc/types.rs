use std::path::PathBuf;

use serde::Deserialize;

use crate::session::AttendanceSession;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub records_dir: PathBuf,
    pub session: Option<AttendanceSession>,
}

impl AppState {
    pub fn new(records_dir: PathBuf) -> Self {
        Self {
            records_dir,
            session: None,
        }
    }
}
