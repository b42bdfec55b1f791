use crate::csvio;
use crate::error::SessionError;
use crate::roster::{Roster, StudentRecord};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const LOG_HEADER: [&str; 4] = ["Date", "Roll No", "Name", "Status"];
pub const DEFAULT_RECORDS_DIR: &str = "AttendanceRecords";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceState {
    #[default]
    Unset,
    Present,
    Absent,
}

impl AttendanceState {
    /// Unset counts as not present.
    pub fn is_present(self) -> bool {
        self == AttendanceState::Present
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRow {
    pub roll_no: String,
    pub name: String,
    pub is_present: bool,
}

/// Attendance for one loaded roster.
///
/// State is kept per roster row, so duplicate roll numbers still get a row
/// each. Roll-number mutators update every row sharing that roll number.
#[derive(Debug, Clone)]
pub struct AttendanceSession {
    id: Uuid,
    class_name: String,
    roster: Roster,
    states: Vec<AttendanceState>,
}

impl AttendanceSession {
    pub fn new(class_name: impl Into<String>, roster: Roster) -> Self {
        let states = vec![AttendanceState::Unset; roster.len()];
        Self {
            id: Uuid::new_v4(),
            class_name: class_name.into(),
            roster,
            states,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn rows(&self) -> impl Iterator<Item = (&StudentRecord, AttendanceState)> + '_ {
        self.roster.students().iter().zip(self.states.iter().copied())
    }

    pub fn state_of(&self, roll_no: &str) -> Result<AttendanceState, SessionError> {
        let idx = self.require_positions(roll_no)?[0];
        Ok(self.states[idx])
    }

    pub fn mark_present(&mut self, roll_no: &str) -> Result<(), SessionError> {
        self.set_state(roll_no, AttendanceState::Present)
    }

    pub fn mark_absent(&mut self, roll_no: &str) -> Result<(), SessionError> {
        self.set_state(roll_no, AttendanceState::Absent)
    }

    pub fn clear_all(&mut self) {
        self.states.fill(AttendanceState::Unset);
    }

    pub fn snapshot(&self) -> Vec<SnapshotRow> {
        self.rows()
            .map(|(s, state)| SnapshotRow {
                roll_no: s.roll_no.clone(),
                name: s.name.clone(),
                is_present: state.is_present(),
            })
            .collect()
    }

    pub fn present_count(&self) -> usize {
        self.states.iter().filter(|s| s.is_present()).count()
    }

    pub fn log_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.class_name)
    }

    pub fn log_file_name(now: &NaiveDateTime) -> String {
        format!("attendance_{}.csv", now.format("%Y-%m-%d"))
    }

    /// Appends the current snapshot to `base_dir/<class>/attendance_<date>.csv`.
    pub fn persist(&self, base_dir: &Path, now: NaiveDateTime) -> Result<PathBuf, SessionError> {
        let dir = self.log_dir(base_dir);
        std::fs::create_dir_all(&dir).map_err(|source| SessionError::PersistenceUnavailable {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(Self::log_file_name(&now));
        let unavailable = |source: std::io::Error| SessionError::PersistenceUnavailable {
            path: path.clone(),
            source,
        };

        let stamp = now.format("%Y-%m-%d %H:%M:%S").to_string();
        let mut out = String::new();
        if !path.exists() {
            out.push_str(&csvio::format_record(&LOG_HEADER));
        }
        let snapshot = self.snapshot();
        for row in &snapshot {
            let status = if row.is_present { "Present" } else { "Absent" };
            out.push_str(&csvio::format_record(&[
                stamp.as_str(),
                row.roll_no.as_str(),
                row.name.as_str(),
                status,
            ]));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(unavailable)?;
        file.write_all(out.as_bytes()).map_err(unavailable)?;
        file.flush().map_err(unavailable)?;

        tracing::info!(
            class = %self.class_name,
            path = %path.display(),
            rows = snapshot.len(),
            present = self.present_count(),
            "attendance saved"
        );
        Ok(path)
    }

    fn set_state(&mut self, roll_no: &str, state: AttendanceState) -> Result<(), SessionError> {
        for idx in self.require_positions(roll_no)? {
            self.states[idx] = state;
        }
        tracing::debug!(class = %self.class_name, roll_no, ?state, "attendance marked");
        Ok(())
    }

    fn require_positions(&self, roll_no: &str) -> Result<Vec<usize>, SessionError> {
        let positions = self.roster.positions_of(roll_no);
        if positions.is_empty() {
            return Err(SessionError::UnknownStudent {
                roll_no: roll_no.to_string(),
            });
        }
        Ok(positions)
    }
}
