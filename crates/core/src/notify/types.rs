//! Event payloads emitted after accepted changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::types::{FieldId, ProfileValue, RealmId, UserId};

/// A change to one of a user's field values. `value: None` means removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValueEvent {
    pub id: FieldId,
    pub value: Option<ProfileValue>,
}

impl FieldValueEvent {
    pub fn updated(id: FieldId, value: ProfileValue) -> Self {
        Self { id, value: Some(value) }
    }

    pub fn removed(id: FieldId) -> Self {
        Self { id, value: None }
    }
}

/// Kinds of events written to the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOp {
    UserDataUpdate,
    SchemaUpdate,
}

impl std::fmt::Display for EventOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventOp::UserDataUpdate => write!(f, "user_data_update"),
            EventOp::SchemaUpdate => write!(f, "schema_update"),
        }
    }
}

/// A single event log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntry {
    /// ISO8601 timestamp
    pub ts: DateTime<Utc>,

    pub op: EventOp,

    pub realm_id: RealmId,

    /// Set for user data events only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,

    /// Field value changes or the realm's full field list
    pub data: serde_json::Value,
}

impl EventEntry {
    /// Create a new entry with the current timestamp.
    pub fn new(op: EventOp, realm_id: RealmId, data: serde_json::Value) -> Self {
        Self { ts: Utc::now(), op, realm_id, user_id: None, data }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_removed_event_serializes_null_value() {
        let json = serde_json::to_value(FieldValueEvent::removed(4)).unwrap();
        assert_eq!(json, json!({"id": 4, "value": null}));
    }

    #[test]
    fn test_entry_serialization() {
        let entry = EventEntry::new(EventOp::UserDataUpdate, 1, json!([])).with_user(9);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""op":"user_data_update""#));
        assert!(json.contains(r#""user_id":9"#));

        let schema = EventEntry::new(EventOp::SchemaUpdate, 1, json!([]));
        let json = serde_json::to_string(&schema).unwrap();
        assert!(!json.contains("user_id"));
    }

    #[test]
    fn test_op_display() {
        assert_eq!(EventOp::SchemaUpdate.to_string(), "schema_update");
    }
}
