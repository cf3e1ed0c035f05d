use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

/// A single user-facing outcome message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub kind: StatusKind,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Single-slot status reporter: a new report always supersedes the previous
/// one, so rapid sequential operations show only the last outcome.
#[derive(Debug, Clone, Default)]
pub struct StatusSlot {
    current: Option<StatusReport>,
}

impl StatusSlot {
    pub fn report(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.current = Some(StatusReport {
            kind,
            text: text.into(),
            at: Utc::now(),
        });
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.report(StatusKind::Success, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.report(StatusKind::Error, text);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.report(StatusKind::Info, text);
    }

    pub fn current(&self) -> Option<&StatusReport> {
        self.current.as_ref()
    }
}
