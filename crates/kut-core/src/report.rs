//! Transfer outcome reporting.
//!
//! Tracks per-record outcomes over a run: how many users were added,
//! updated, or skipped, and which records failed and why.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate result of a transfer run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReport {
    /// Number of users created.
    pub added: usize,

    /// Number of existing users updated.
    pub updated: usize,

    /// Number of existing users left untouched.
    pub skipped: usize,

    /// Number of records that failed to transfer.
    pub failed: usize,

    /// Whether this was a dry run.
    pub dry_run: bool,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run completed.
    pub completed_at: DateTime<Utc>,

    /// Status message.
    pub status: String,

    /// Errors for individual records.
    pub errors: Vec<RecordError>,
}

impl TransferReport {
    /// Creates a new report for a run starting now.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        let now = Utc::now();
        Self {
            added: 0,
            updated: 0,
            skipped: 0,
            failed: 0,
            dry_run,
            started_at: now,
            completed_at: now,
            status: String::new(),
            errors: Vec::new(),
        }
    }

    /// Marks the run as complete and renders the status line.
    #[must_use]
    pub fn complete(mut self) -> Self {
        self.completed_at = Utc::now();
        let prefix = if self.dry_run { "Dry run" } else { "Transfer" };
        self.status = format!(
            "{} completed: {} added, {} updated, {} skipped, {} failed",
            prefix, self.added, self.updated, self.skipped, self.failed
        );
        self
    }

    /// Records a created user.
    pub fn record_added(&mut self) {
        self.added += 1;
    }

    /// Records an updated user.
    pub fn record_updated(&mut self) {
        self.updated += 1;
    }

    /// Records a skipped user.
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Records a failed record.
    pub fn record_failure(&mut self, error: RecordError) {
        self.failed += 1;
        self.errors.push(error);
    }

    /// Returns the total number of records processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.added + self.updated + self.skipped + self.failed
    }

    /// Returns true if any record failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Error for a single source record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordError {
    /// Value of the ordering column for the record.
    pub source_key: String,

    /// Username, when the record got far enough to have one.
    pub username: Option<String>,

    /// Error message.
    pub message: String,
}

impl RecordError {
    /// Creates a new record error.
    #[must_use]
    pub fn new(source_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            username: None,
            message: message.into(),
        }
    }

    /// Sets the username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_tracks_outcomes() {
        let mut report = TransferReport::new(false);

        report.record_added();
        report.record_added();
        report.record_updated();
        report.record_skipped();
        report.record_failure(RecordError::new("42", "missing username").with_username("jdoe"));

        assert_eq!(report.added, 2);
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.total(), 5);
        assert!(report.has_failures());
        assert_eq!(report.errors[0].username.as_deref(), Some("jdoe"));
    }

    #[test]
    fn complete_renders_status() {
        let mut report = TransferReport::new(true);
        report.record_added();
        let report = report.complete();
        assert!(report.status.starts_with("Dry run completed: 1 added"));
    }
}
