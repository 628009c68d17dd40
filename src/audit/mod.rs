//! Append-only audit trail of mutating actions.
//!
//! One line per action: `timestamp<TAB>user<TAB>action<TAB>details`.

use chrono::{DateTime, Local};

pub mod logger;
pub use logger::AuditLog;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub timestamp: DateTime<Local>,
    pub user: String,
    pub action: String,
    pub details: String,
}

impl AuditEntry {
    pub fn new(user: &str, action: &str, details: &str) -> Self {
        Self {
            timestamp: Local::now(),
            user: user.to_string(),
            action: action.to_string(),
            details: details.to_string(),
        }
    }

    /// Render as a single log line. Tabs and line breaks inside fields are
    /// flattened to spaces so every entry stays on one line.
    pub fn to_line(&self) -> String {
        let user = if self.user.is_empty() { "-" } else { &self.user };
        format!(
            "{}\t{}\t{}\t{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            flatten(user),
            flatten(&self.action),
            flatten(&self.details)
        )
    }
}

fn flatten(field: &str) -> String {
    field.replace(['\t', '\r', '\n'], " ")
}
