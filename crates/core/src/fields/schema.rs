//! Realm administrator operations over field definitions.

use std::collections::HashSet;

use tracing::{info, warn};

use super::errors::{ProfileFieldError, Result};
use super::kind::FieldKind;
use super::types::{FieldData, FieldDefinition, FieldId, RealmId};
use super::validators::{check_field_name, check_hint, validate_field_data};
use crate::notify::Notifier;
use crate::store::{ProfileStore, StoreError};

/// Create, edit, delete and reorder a realm's custom profile fields.
///
/// Callers are expected to have checked that the acting user administers
/// the realm.
pub struct SchemaManager<'a> {
    store: &'a mut ProfileStore,
    notifier: &'a dyn Notifier,
}

impl<'a> SchemaManager<'a> {
    pub fn new(store: &'a mut ProfileStore, notifier: &'a dyn Notifier) -> Self {
        Self { store, notifier }
    }

    /// All fields of the realm, in display order.
    pub fn list_fields(&self, realm_id: RealmId) -> Result<Vec<FieldDefinition>> {
        Ok(self.store.snapshot()?.list_fields(realm_id)?)
    }

    pub fn get_field(&self, realm_id: RealmId, field_id: FieldId) -> Result<FieldDefinition> {
        self.store
            .snapshot()?
            .get_field(realm_id, field_id)?
            .ok_or(ProfileFieldError::NotFound(field_id))
    }

    /// Create a field at the end of the realm's ordering.
    ///
    /// `field_type` is the raw kind code from the request.
    pub fn create_field(
        &mut self,
        realm_id: RealmId,
        name: &str,
        hint: &str,
        field_type: i64,
        field_data: FieldData,
    ) -> Result<FieldDefinition> {
        check_field_name(name).map_err(ProfileFieldError::validation)?;
        check_hint(hint).map_err(|e| ProfileFieldError::validation_of("hint", e))?;
        let kind = FieldKind::from_code(field_type)
            .ok_or_else(|| ProfileFieldError::validation("Invalid field type."))?;
        validate_field_data(kind, &field_data).map_err(ProfileFieldError::validation)?;

        let tx = self.store.transaction()?;
        let order = tx.max_field_order(realm_id)?.map_or(1, |max| max + 1);
        let id = tx
            .insert_field(realm_id, name, hint, kind, &field_data, order)
            .map_err(name_conflict)?;
        let fields = tx.list_fields(realm_id)?;
        tx.commit()?;

        info!(realm_id, field_id = id, kind = %kind, "created custom profile field '{}'", name);
        self.notify_schema(realm_id, &fields);

        Ok(FieldDefinition {
            id,
            realm_id,
            name: name.to_string(),
            hint: hint.to_string(),
            field_type: kind,
            field_data,
            order,
        })
    }

    /// Rename a field and replace its hint and configuration. The kind of a
    /// field cannot change.
    pub fn update_field(
        &mut self,
        realm_id: RealmId,
        field_id: FieldId,
        name: &str,
        hint: &str,
        field_data: FieldData,
    ) -> Result<()> {
        check_field_name(name).map_err(ProfileFieldError::validation)?;
        check_hint(hint).map_err(|e| ProfileFieldError::validation_of("hint", e))?;

        let tx = self.store.transaction()?;
        let field =
            tx.get_field(realm_id, field_id)?.ok_or(ProfileFieldError::NotFound(field_id))?;
        validate_field_data(field.field_type, &field_data).map_err(ProfileFieldError::validation)?;

        tx.update_field(field_id, name, hint, &field_data).map_err(name_conflict)?;
        let fields = tx.list_fields(realm_id)?;
        tx.commit()?;

        info!(realm_id, field_id, "updated custom profile field '{}'", name);
        self.notify_schema(realm_id, &fields);
        Ok(())
    }

    /// Delete a field together with every value stored against it.
    pub fn delete_field(&mut self, realm_id: RealmId, field_id: FieldId) -> Result<()> {
        let tx = self.store.transaction()?;
        if tx.get_field(realm_id, field_id)?.is_none() {
            return Err(ProfileFieldError::NotFound(field_id));
        }
        let removed = tx.delete_values_for_field(field_id)?;
        tx.delete_field(field_id)?;
        let fields = tx.list_fields(realm_id)?;
        tx.commit()?;

        info!(realm_id, field_id, removed_values = removed, "deleted custom profile field");
        self.notify_schema(realm_id, &fields);
        Ok(())
    }

    /// Reassign display order from the position of each id in `order`.
    ///
    /// `order` must name every field of the realm exactly once.
    pub fn reorder_fields(&mut self, realm_id: RealmId, order: &[FieldId]) -> Result<()> {
        let tx = self.store.transaction()?;
        let current: HashSet<FieldId> =
            tx.list_fields(realm_id)?.into_iter().map(|f| f.id).collect();
        let requested: HashSet<FieldId> = order.iter().copied().collect();

        if requested.len() != order.len() || requested != current {
            warn!(realm_id, ?order, "rejected custom profile field order");
            return Err(ProfileFieldError::validation("Invalid order mapping."));
        }

        for (position, id) in order.iter().enumerate() {
            tx.set_field_order(*id, position as i64 + 1)?;
        }
        let fields = tx.list_fields(realm_id)?;
        tx.commit()?;

        info!(realm_id, "reordered custom profile fields");
        self.notify_schema(realm_id, &fields);
        Ok(())
    }

    fn notify_schema(&self, realm_id: RealmId, fields: &[FieldDefinition]) {
        if let Err(e) = self.notifier.notify_schema(realm_id, fields) {
            warn!(realm_id, "failed to notify custom profile field change: {}", e);
        }
    }
}

fn name_conflict(err: StoreError) -> ProfileFieldError {
    match err {
        StoreError::UniqueViolation => ProfileFieldError::Conflict,
        other => other.into(),
    }
}
