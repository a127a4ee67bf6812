//! Per-user field values: validation dispatch and persistence.

use tracing::{debug, info, warn};

use super::errors::{ProfileFieldError, Result};
use super::kind::Validator;
use super::types::{FieldDefinition, FieldId, FieldValue, ProfileValue, UserDataItem, UserProfile};
use super::validators::{validate_choice, validate_user_ids};
use crate::notify::{FieldValueEvent, Notifier};
use crate::store::{ProfileStore, Tx};

/// Read, write and remove a user's own custom profile data.
///
/// Field lookups are scoped to the user's realm; ids of fields in other
/// realms are reported as not found.
pub struct ValueManager<'a> {
    store: &'a mut ProfileStore,
    notifier: &'a dyn Notifier,
}

impl<'a> ValueManager<'a> {
    pub fn new(store: &'a mut ProfileStore, notifier: &'a dyn Notifier) -> Self {
        Self { store, notifier }
    }

    /// The user's stored values, in field display order.
    pub fn user_data(&self, user: &UserProfile) -> Result<Vec<FieldValue>> {
        Ok(self.store.snapshot()?.list_user_values(user.id)?)
    }

    /// Remove the user's values for `field_ids`.
    ///
    /// Items are processed in order and each removal commits on its own: an
    /// unknown field id stops the batch, but removals before it stand.
    /// Fields without a stored value are skipped.
    pub fn remove_user_data(&mut self, user: &UserProfile, field_ids: &[FieldId]) -> Result<()> {
        for &field_id in field_ids {
            let tx = self.store.transaction()?;
            if tx.get_field(user.realm_id, field_id)?.is_none() {
                return Err(ProfileFieldError::NotFound(field_id));
            }
            if !tx.delete_value(field_id, user.id)? {
                continue;
            }
            tx.commit()?;

            info!(user_id = user.id, field_id, "removed custom profile value");
            self.notify(user, &[FieldValueEvent::removed(field_id)]);
        }
        Ok(())
    }

    /// Validate every item against its field's current definition, then
    /// store them all.
    ///
    /// Nothing is written unless every item validates. An empty request
    /// is a no-op and sends no notification.
    pub fn update_user_data(&mut self, user: &UserProfile, items: &[UserDataItem]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let tx = self.store.transaction()?;
        for item in items {
            let field =
                tx.get_field(user.realm_id, item.id)?.ok_or(ProfileFieldError::NotFound(item.id))?;
            check_value(&tx, user, &field, &item.value)?;
        }

        for item in items {
            tx.upsert_value(item.id, user.id, &item.value)?;
        }
        tx.commit()?;

        info!(user_id = user.id, items = items.len(), "updated custom profile data");
        let events: Vec<FieldValueEvent> = items
            .iter()
            .map(|item| FieldValueEvent::updated(item.id, item.value.clone()))
            .collect();
        self.notify(user, &events);
        Ok(())
    }

    fn notify(&self, user: &UserProfile, events: &[FieldValueEvent]) {
        if let Err(e) = self.notifier.notify_user_data(user, events) {
            warn!(user_id = user.id, "failed to notify custom profile data change: {}", e);
        }
    }
}

/// Run the validator selected by the field's kind.
fn check_value(
    tx: &Tx<'_>,
    user: &UserProfile,
    field: &FieldDefinition,
    value: &ProfileValue,
) -> Result<()> {
    let name = field.name.as_str();
    debug!(field_id = field.id, kind = %field.field_type, "validating custom profile value");

    let outcome = match field.field_type.validator() {
        Validator::Simple(check) => match value.as_text() {
            Some(text) => check(name, text),
            None => Err(format!("'{}' is not a string", name)),
        },
        Validator::Choice => match value.as_text() {
            Some(key) => validate_choice(name, &field.field_data, key),
            None => Err(format!("'{}' is not a string", name)),
        },
        Validator::Reference => match value.as_user_ids() {
            Some(ids) => {
                let users = tx.get_users(ids)?;
                validate_user_ids(&users, user.realm_id, ids, false)
            }
            None => Err(format!("'{}' is not a list", name)),
        },
    };

    outcome.map_err(ProfileFieldError::validation)
}
