use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// Failures while reading a roster file.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to open roster {path}: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but holds no student rows.
    #[error("The selected CSV file is empty: {path}")]
    EmptyRoster { path: PathBuf },

    #[error("roster {path} is missing required columns: {}", missing.join(", "))]
    MalformedSchema { path: PathBuf, missing: Vec<String> },
}

impl RosterError {
    pub fn code(&self) -> &'static str {
        match self {
            RosterError::NotFound { .. } => "not_found",
            RosterError::EmptyRoster { .. } => "empty_roster",
            RosterError::MalformedSchema { .. } => "malformed_schema",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            RosterError::EmptyRoster { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Failures of session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown student: {roll_no}")]
    UnknownStudent { roll_no: String },

    #[error("Please load a class file first.")]
    NoActiveSession,

    #[error("failed to write attendance to {path}: {source}")]
    PersistenceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::UnknownStudent { .. } => "unknown_student",
            SessionError::NoActiveSession => "no_active_session",
            SessionError::PersistenceUnavailable { .. } => "persistence_unavailable",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SessionError::NoActiveSession => Severity::Warning,
            _ => Severity::Error,
        }
    }
}
