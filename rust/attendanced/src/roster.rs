use crate::csvio;
use crate::error::RosterError;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

pub const ROLL_NO_COLUMN: &str = "Roll No";
pub const NAME_COLUMN: &str = "Name";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub roll_no: String,
    pub name: String,
}

/// Students in file order. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    students: Vec<StudentRecord>,
}

impl Roster {
    pub fn new(students: Vec<StudentRecord>) -> Self {
        Self { students }
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Row positions holding `roll_no`, in roster order.
    pub fn positions_of(&self, roll_no: &str) -> Vec<usize> {
        self.students
            .iter()
            .enumerate()
            .filter(|(_, s)| s.roll_no == roll_no)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn duplicate_roll_numbers(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut dups: Vec<String> = Vec::new();
        for s in &self.students {
            if !seen.insert(s.roll_no.as_str()) && !dups.contains(&s.roll_no) {
                dups.push(s.roll_no.clone());
            }
        }
        dups
    }
}

/// `classA.csv` -> `classA`. Everything from the first `.` is dropped.
pub fn class_name_from_path(path: &Path) -> String {
    let base = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    match base.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => base,
    }
}

pub fn load_roster(path: &Path) -> Result<(String, Roster), RosterError> {
    let bytes = std::fs::read(path).map_err(|source| RosterError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    let class_name = class_name_from_path(path);

    let mut records = csvio::parse_records(&text).into_iter();
    let Some(header) = records.next() else {
        return Err(RosterError::EmptyRoster {
            path: path.to_path_buf(),
        });
    };

    let roll_idx = header.iter().position(|h| h == ROLL_NO_COLUMN);
    let name_idx = header.iter().position(|h| h == NAME_COLUMN);
    let (Some(roll_idx), Some(name_idx)) = (roll_idx, name_idx) else {
        let mut missing = Vec::new();
        if roll_idx.is_none() {
            missing.push(ROLL_NO_COLUMN.to_string());
        }
        if name_idx.is_none() {
            missing.push(NAME_COLUMN.to_string());
        }
        return Err(RosterError::MalformedSchema {
            path: path.to_path_buf(),
            missing,
        });
    };

    let students: Vec<StudentRecord> = records
        .map(|fields| StudentRecord {
            roll_no: fields.get(roll_idx).cloned().unwrap_or_default(),
            name: fields.get(name_idx).cloned().unwrap_or_default(),
        })
        .collect();

    let roster = Roster::new(students);
    if roster.is_empty() {
        return Err(RosterError::EmptyRoster {
            path: path.to_path_buf(),
        });
    }

    let dups = roster.duplicate_roll_numbers();
    if !dups.is_empty() {
        tracing::warn!(class = %class_name, duplicates = ?dups, "roster has duplicate roll numbers");
    }
    tracing::debug!(class = %class_name, students = roster.len(), "roster loaded");
    Ok((class_name, roster))
}
