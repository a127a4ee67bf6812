//! Notification of accepted changes to the rest of the system.
//!
//! The managers call a [`Notifier`] after a change has been committed.
//! Delivery is fire-and-forget: a failing notifier is logged and never
//! undoes or fails the operation that triggered it.

pub mod event_log;
pub mod types;

use thiserror::Error;

use crate::fields::types::{FieldDefinition, RealmId, UserProfile};

pub use event_log::EventLogNotifier;
pub use types::{EventEntry, EventOp, FieldValueEvent};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to write event: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Receiver of accepted schema and user data changes.
pub trait Notifier {
    /// A user's values changed; `events` covers every item of the request.
    fn notify_user_data(
        &self,
        user: &UserProfile,
        events: &[FieldValueEvent],
    ) -> Result<(), NotifyError>;

    /// A realm's field list changed; `fields` is the full list in order.
    fn notify_schema(&self, realm_id: RealmId, fields: &[FieldDefinition]) -> Result<(), NotifyError>;
}

/// Notifier that only records events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_user_data(
        &self,
        user: &UserProfile,
        events: &[FieldValueEvent],
    ) -> Result<(), NotifyError> {
        for event in events {
            tracing::info!(
                user_id = user.id,
                field_id = event.id,
                removed = event.value.is_none(),
                "custom profile data changed"
            );
        }
        Ok(())
    }

    fn notify_schema(&self, realm_id: RealmId, fields: &[FieldDefinition]) -> Result<(), NotifyError> {
        tracing::info!(realm_id, fields = fields.len(), "custom profile fields changed");
        Ok(())
    }
}
