//! Database connection and row operations.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use thiserror::Error;

use super::schema::{SchemaError, init_schema};
use crate::fields::kind::FieldKind;
use crate::fields::types::{
    FieldData, FieldDefinition, FieldId, FieldValue, ProfileValue, Realm, RealmId, UserId,
    UserProfile,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("unique constraint violated")]
    UniqueViolation,

    #[error("field {field_id} has unknown field type {code}")]
    UnknownFieldKind { field_id: FieldId, code: i64 },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Profile field store handle.
pub struct ProfileStore {
    conn: Connection,
}

impl ProfileStore {
    /// Open or create a store at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Create an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a write unit of work.
    ///
    /// The write lock is taken immediately, so every read made through the
    /// returned transaction stays consistent with the writes it commits.
    pub fn transaction(&mut self) -> Result<Tx<'_>, StoreError> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(Tx { tx })
    }

    /// Begin a read-only snapshot. Dropping it rolls back.
    pub fn snapshot(&self) -> Result<Tx<'_>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        Ok(Tx { tx })
    }
}

/// A unit of work against the store. Uncommitted work is rolled back on drop.
pub struct Tx<'a> {
    tx: Transaction<'a>,
}

impl Tx<'_> {
    pub fn commit(self) -> Result<(), StoreError> {
        self.tx.commit()?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Realms and users
    // ─────────────────────────────────────────────────────────────────────────

    pub fn insert_realm(&self, name: &str) -> Result<RealmId, StoreError> {
        self.tx
            .execute("INSERT INTO realms (name) VALUES (?1)", [name])
            .map_err(map_unique)?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn list_realms(&self) -> Result<Vec<Realm>, StoreError> {
        let mut stmt = self.tx.prepare("SELECT id, name FROM realms ORDER BY id")?;
        let realms = stmt
            .query_map([], |row| Ok(Realm { id: row.get(0)?, name: row.get(1)? }))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(realms)
    }

    pub fn insert_user(
        &self,
        realm_id: RealmId,
        full_name: &str,
        is_active: bool,
    ) -> Result<UserProfile, StoreError> {
        self.tx.execute(
            "INSERT INTO users (realm_id, full_name, is_active) VALUES (?1, ?2, ?3)",
            params![realm_id, full_name, is_active],
        )?;
        Ok(UserProfile {
            id: self.tx.last_insert_rowid(),
            realm_id,
            full_name: full_name.to_string(),
            is_active,
        })
    }

    pub fn get_user(&self, id: UserId) -> Result<Option<UserProfile>, StoreError> {
        self.tx
            .query_row(
                "SELECT id, realm_id, full_name, is_active FROM users WHERE id = ?1",
                [id],
                row_to_user,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Fetch every user in `ids` that exists, keyed by id.
    pub fn get_users(&self, ids: &[UserId]) -> Result<HashMap<UserId, UserProfile>, StoreError> {
        let mut users = HashMap::new();
        for &id in ids {
            if users.contains_key(&id) {
                continue;
            }
            if let Some(user) = self.get_user(id)? {
                users.insert(id, user);
            }
        }
        Ok(users)
    }

    pub fn list_users(&self, realm_id: RealmId) -> Result<Vec<UserProfile>, StoreError> {
        let mut stmt = self.tx.prepare(
            "SELECT id, realm_id, full_name, is_active FROM users WHERE realm_id = ?1 ORDER BY id",
        )?;
        let users = stmt.query_map([realm_id], row_to_user)?.collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    pub fn set_user_active(&self, id: UserId, is_active: bool) -> Result<bool, StoreError> {
        let rows = self
            .tx
            .execute("UPDATE users SET is_active = ?1 WHERE id = ?2", params![is_active, id])?;
        Ok(rows > 0)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Field definitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a field by id, scoped to its realm.
    pub fn get_field(
        &self,
        realm_id: RealmId,
        id: FieldId,
    ) -> Result<Option<FieldDefinition>, StoreError> {
        let raw = self
            .tx
            .query_row(
                "SELECT id, realm_id, name, hint, field_type, field_data, field_order
                 FROM custom_profile_fields WHERE realm_id = ?1 AND id = ?2",
                [realm_id, id],
                RawField::from_row,
            )
            .optional()?;
        raw.map(RawField::into_definition).transpose()
    }

    /// All fields of a realm in display order.
    pub fn list_fields(&self, realm_id: RealmId) -> Result<Vec<FieldDefinition>, StoreError> {
        let mut stmt = self.tx.prepare(
            "SELECT id, realm_id, name, hint, field_type, field_data, field_order
             FROM custom_profile_fields WHERE realm_id = ?1
             ORDER BY field_order, id",
        )?;
        let raws = stmt.query_map([realm_id], RawField::from_row)?.collect::<Result<Vec<_>, _>>()?;
        raws.into_iter().map(RawField::into_definition).collect()
    }

    pub fn max_field_order(&self, realm_id: RealmId) -> Result<Option<i64>, StoreError> {
        let max: Option<i64> = self.tx.query_row(
            "SELECT MAX(field_order) FROM custom_profile_fields WHERE realm_id = ?1",
            [realm_id],
            |row| row.get(0),
        )?;
        Ok(max)
    }

    /// Insert a field. A duplicate name within the realm yields
    /// [`StoreError::UniqueViolation`].
    pub fn insert_field(
        &self,
        realm_id: RealmId,
        name: &str,
        hint: &str,
        field_type: FieldKind,
        field_data: &FieldData,
        order: i64,
    ) -> Result<FieldId, StoreError> {
        self.tx
            .execute(
                "INSERT INTO custom_profile_fields (realm_id, name, hint, field_type, field_data, field_order)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![realm_id, name, hint, field_type.code(), encode_json(field_data)?, order],
            )
            .map_err(map_unique)?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn update_field(
        &self,
        id: FieldId,
        name: &str,
        hint: &str,
        field_data: &FieldData,
    ) -> Result<bool, StoreError> {
        let rows = self
            .tx
            .execute(
                "UPDATE custom_profile_fields SET name = ?1, hint = ?2, field_data = ?3 WHERE id = ?4",
                params![name, hint, encode_json(field_data)?, id],
            )
            .map_err(map_unique)?;
        Ok(rows > 0)
    }

    pub fn set_field_order(&self, id: FieldId, order: i64) -> Result<(), StoreError> {
        self.tx.execute(
            "UPDATE custom_profile_fields SET field_order = ?1 WHERE id = ?2",
            params![order, id],
        )?;
        Ok(())
    }

    pub fn delete_field(&self, id: FieldId) -> Result<bool, StoreError> {
        let rows = self.tx.execute("DELETE FROM custom_profile_fields WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Field values
    // ─────────────────────────────────────────────────────────────────────────

    pub fn get_value(
        &self,
        field_id: FieldId,
        user_id: UserId,
    ) -> Result<Option<FieldValue>, StoreError> {
        let raw: Option<String> = self
            .tx
            .query_row(
                "SELECT value FROM custom_profile_field_values WHERE field_id = ?1 AND user_id = ?2",
                [field_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(s) => Ok(Some(FieldValue { field_id, user_id, value: decode_value(&s)? })),
            None => Ok(None),
        }
    }

    /// Insert or overwrite the value of `(field_id, user_id)`.
    pub fn upsert_value(
        &self,
        field_id: FieldId,
        user_id: UserId,
        value: &ProfileValue,
    ) -> Result<(), StoreError> {
        self.tx.execute(
            "INSERT INTO custom_profile_field_values (field_id, user_id, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(field_id, user_id) DO UPDATE SET value = excluded.value",
            params![field_id, user_id, encode_json(value)?],
        )?;
        Ok(())
    }

    pub fn delete_value(&self, field_id: FieldId, user_id: UserId) -> Result<bool, StoreError> {
        let rows = self.tx.execute(
            "DELETE FROM custom_profile_field_values WHERE field_id = ?1 AND user_id = ?2",
            [field_id, user_id],
        )?;
        Ok(rows > 0)
    }

    /// Delete every value stored against a field.
    pub fn delete_values_for_field(&self, field_id: FieldId) -> Result<usize, StoreError> {
        let rows = self
            .tx
            .execute("DELETE FROM custom_profile_field_values WHERE field_id = ?1", [field_id])?;
        Ok(rows)
    }

    pub fn count_values(&self, field_id: FieldId) -> Result<i64, StoreError> {
        let count: i64 = self.tx.query_row(
            "SELECT COUNT(*) FROM custom_profile_field_values WHERE field_id = ?1",
            [field_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// A user's values, in the display order of their fields.
    pub fn list_user_values(&self, user_id: UserId) -> Result<Vec<FieldValue>, StoreError> {
        let mut stmt = self.tx.prepare(
            "SELECT v.field_id, v.value
             FROM custom_profile_field_values v
             JOIN custom_profile_fields f ON f.id = v.field_id
             WHERE v.user_id = ?1
             ORDER BY f.field_order, f.id",
        )?;
        let rows = stmt
            .query_map([user_id], |row| Ok((row.get::<_, FieldId>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        let mut values = Vec::with_capacity(rows.len());
        for (field_id, raw) in rows {
            values.push(FieldValue { field_id, user_id, value: decode_value(&raw)? });
        }
        Ok(values)
    }
}

/// Field row as stored, before its kind code is checked.
struct RawField {
    id: FieldId,
    realm_id: RealmId,
    name: String,
    hint: String,
    field_type: i64,
    field_data: String,
    order: i64,
}

impl RawField {
    fn from_row(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            realm_id: row.get(1)?,
            name: row.get(2)?,
            hint: row.get(3)?,
            field_type: row.get(4)?,
            field_data: row.get(5)?,
            order: row.get(6)?,
        })
    }

    fn into_definition(self) -> Result<FieldDefinition, StoreError> {
        let field_type = FieldKind::from_code(self.field_type)
            .ok_or(StoreError::UnknownFieldKind { field_id: self.id, code: self.field_type })?;
        let field_data: FieldData = serde_json::from_str(&self.field_data).map_err(|e| {
            StoreError::InvalidData(format!("field {} has malformed field_data: {}", self.id, e))
        })?;
        Ok(FieldDefinition {
            id: self.id,
            realm_id: self.realm_id,
            name: self.name,
            hint: self.hint,
            field_type,
            field_data,
            order: self.order,
        })
    }
}

fn row_to_user(row: &rusqlite::Row) -> Result<UserProfile, rusqlite::Error> {
    Ok(UserProfile {
        id: row.get(0)?,
        realm_id: row.get(1)?,
        full_name: row.get(2)?,
        is_active: row.get(3)?,
    })
}

fn map_unique(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::UniqueViolation
        }
        _ => StoreError::Database(err),
    }
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::InvalidData(e.to_string()))
}

fn decode_value(raw: &str) -> Result<ProfileValue, StoreError> {
    serde_json::from_str(raw)
        .map_err(|e| StoreError::InvalidData(format!("malformed stored value: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (ProfileStore, RealmId, UserId) {
        let mut store = ProfileStore::open_in_memory().unwrap();
        let tx = store.transaction().unwrap();
        let realm = tx.insert_realm("zulip").unwrap();
        let user = tx.insert_user(realm, "Iago", true).unwrap();
        tx.commit().unwrap();
        (store, realm, user.id)
    }

    #[test]
    fn test_insert_and_get_field() {
        let (mut store, realm, _) = seeded();
        let tx = store.transaction().unwrap();
        let id = tx
            .insert_field(realm, "Phone", "Work phone", FieldKind::ShortText, &FieldData::new(), 1)
            .unwrap();
        tx.commit().unwrap();

        let snap = store.snapshot().unwrap();
        let field = snap.get_field(realm, id).unwrap().unwrap();
        assert_eq!(field.name, "Phone");
        assert_eq!(field.field_type, FieldKind::ShortText);
        assert!(snap.get_field(realm + 1, id).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_name_is_unique_violation() {
        let (mut store, realm, _) = seeded();
        let tx = store.transaction().unwrap();
        tx.insert_field(realm, "Phone", "", FieldKind::ShortText, &FieldData::new(), 1).unwrap();
        let err = tx
            .insert_field(realm, "Phone", "", FieldKind::LongText, &FieldData::new(), 2)
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation));

        let other = tx.insert_realm("other").unwrap();
        tx.insert_field(other, "Phone", "", FieldKind::ShortText, &FieldData::new(), 1).unwrap();
    }

    #[test]
    fn test_upsert_value_keeps_one_row() {
        let (mut store, realm, user) = seeded();
        let tx = store.transaction().unwrap();
        let field =
            tx.insert_field(realm, "Phone", "", FieldKind::ShortText, &FieldData::new(), 1).unwrap();
        tx.upsert_value(field, user, &ProfileValue::from("1")).unwrap();
        tx.upsert_value(field, user, &ProfileValue::from("2")).unwrap();

        assert_eq!(tx.count_values(field).unwrap(), 1);
        let value = tx.get_value(field, user).unwrap().unwrap();
        assert_eq!(value.value, ProfileValue::from("2"));
    }

    #[test]
    fn test_user_values_round_trip_through_json() {
        let (mut store, realm, user) = seeded();
        let tx = store.transaction().unwrap();
        let field =
            tx.insert_field(realm, "Mentor", "", FieldKind::User, &FieldData::new(), 1).unwrap();
        tx.upsert_value(field, user, &ProfileValue::UserIds(vec![user])).unwrap();

        let values = tx.list_user_values(user).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, ProfileValue::UserIds(vec![user]));
    }

    #[test]
    fn test_unknown_kind_code_surfaces() {
        let (mut store, realm, _) = seeded();
        let tx = store.transaction().unwrap();
        let id =
            tx.insert_field(realm, "Phone", "", FieldKind::ShortText, &FieldData::new(), 1).unwrap();
        tx.tx
            .execute("UPDATE custom_profile_fields SET field_type = 99 WHERE id = ?1", [id])
            .unwrap();

        let err = tx.get_field(realm, id).unwrap_err();
        assert!(matches!(err, StoreError::UnknownFieldKind { code: 99, .. }));
    }

    #[test]
    fn test_drop_rolls_back() {
        let (mut store, realm, _) = seeded();
        {
            let tx = store.transaction().unwrap();
            tx.insert_field(realm, "Phone", "", FieldKind::ShortText, &FieldData::new(), 1)
                .unwrap();
        }
        assert!(store.snapshot().unwrap().list_fields(realm).unwrap().is_empty());
    }

    #[test]
    fn test_value_requires_existing_user() {
        let (mut store, realm, _) = seeded();
        let tx = store.transaction().unwrap();
        let field =
            tx.insert_field(realm, "Phone", "", FieldKind::ShortText, &FieldData::new(), 1).unwrap();
        let err = tx.upsert_value(field, 9999, &ProfileValue::from("x")).unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
