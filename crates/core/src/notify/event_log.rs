//! JSONL event log notifier.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use super::types::{EventEntry, EventOp, FieldValueEvent};
use super::{Notifier, NotifyError};
use crate::config::types::ResolvedConfig;
use crate::fields::types::{FieldDefinition, RealmId, UserProfile};

/// Appends every accepted change to a JSON-lines file for other processes
/// to pick up.
pub struct EventLogNotifier {
    path: PathBuf,
}

impl EventLogNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create from ResolvedConfig.
    /// Returns None if no events file is configured.
    pub fn try_from_config(config: &ResolvedConfig) -> Option<Self> {
        config.events_file.as_ref().map(|path| Self::new(path.clone()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry.
    pub fn append(&self, entry: &EventEntry) -> Result<(), NotifyError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(entry)?;

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }

    /// Read every entry back. Malformed lines are skipped.
    pub fn read_all(&self) -> Result<Vec<EventEntry>, NotifyError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!("skipping malformed event log line: {}", e),
            }
        }
        Ok(entries)
    }
}

impl Notifier for EventLogNotifier {
    fn notify_user_data(
        &self,
        user: &UserProfile,
        events: &[FieldValueEvent],
    ) -> Result<(), NotifyError> {
        let entry =
            EventEntry::new(EventOp::UserDataUpdate, user.realm_id, serde_json::to_value(events)?)
                .with_user(user.id);
        self.append(&entry)
    }

    fn notify_schema(&self, realm_id: RealmId, fields: &[FieldDefinition]) -> Result<(), NotifyError> {
        let entry = EventEntry::new(EventOp::SchemaUpdate, realm_id, serde_json::to_value(fields)?);
        self.append(&entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::types::ProfileValue;
    use tempfile::tempdir;

    fn user() -> UserProfile {
        UserProfile { id: 5, realm_id: 2, full_name: "Hamlet".into(), is_active: true }
    }

    #[test]
    fn test_append_and_read_back() {
        let dir = tempdir().unwrap();
        let log = EventLogNotifier::new(dir.path().join("nested/events.jsonl"));

        log.notify_user_data(&user(), &[FieldValueEvent::updated(1, ProfileValue::from("x"))])
            .unwrap();
        log.notify_user_data(&user(), &[FieldValueEvent::removed(1)]).unwrap();
        log.notify_schema(2, &[]).unwrap();

        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].op, EventOp::UserDataUpdate);
        assert_eq!(entries[0].user_id, Some(5));
        assert_eq!(entries[0].data[0]["value"], "x");
        assert!(entries[1].data[0]["value"].is_null());
        assert_eq!(entries[2].op, EventOp::SchemaUpdate);
        assert_eq!(entries[2].realm_id, 2);
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let log = EventLogNotifier::new(dir.path().join("none.jsonl"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let log = EventLogNotifier::new(&path);
        log.notify_schema(1, &[]).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json").unwrap();

        assert_eq!(log.read_all().unwrap().len(), 1);
    }
}
