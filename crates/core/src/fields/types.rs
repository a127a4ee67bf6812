//! Field definitions, per-user values and the shapes they travel in.

use serde::{Deserialize, Serialize};

use super::kind::FieldKind;

pub type RealmId = i64;
pub type UserId = i64;
pub type FieldId = i64;

/// Kind-specific configuration attached to a field (e.g. the choices of a
/// choice field). Always a JSON object; empty for kinds that take none.
pub type FieldData = serde_json::Map<String, serde_json::Value>;

/// An isolated organization; fields and values never cross realms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Realm {
    pub id: RealmId,
    pub name: String,
}

/// One custom attribute available to every user of a realm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinition {
    pub id: FieldId,
    pub realm_id: RealmId,
    pub name: String,
    pub hint: String,
    #[serde(rename = "type")]
    pub field_type: FieldKind,
    pub field_data: FieldData,
    pub order: i64,
}

/// A value stored against a field.
///
/// Every kind except user references carries a string (text, date, URL,
/// choice key, account name, pronouns); user references carry a list of
/// user ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileValue {
    Text(String),
    UserIds(Vec<UserId>),
}

impl ProfileValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::UserIds(_) => None,
        }
    }

    pub fn as_user_ids(&self) -> Option<&[UserId]> {
        match self {
            Self::UserIds(ids) => Some(ids),
            Self::Text(_) => None,
        }
    }
}

impl From<&str> for ProfileValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<UserId>> for ProfileValue {
    fn from(ids: Vec<UserId>) -> Self {
        Self::UserIds(ids)
    }
}

/// One user's value for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValue {
    pub field_id: FieldId,
    pub user_id: UserId,
    pub value: ProfileValue,
}

/// A single `{id, value}` entry of a user data update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDataItem {
    pub id: FieldId,
    pub value: ProfileValue,
}

impl UserDataItem {
    pub fn new(id: FieldId, value: impl Into<ProfileValue>) -> Self {
        Self { id, value: value.into() }
    }
}

/// An authenticated user as handed over by the authorization layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub realm_id: RealmId,
    pub full_name: String,
    pub is_active: bool,
}

/// One entry of a choice field's `field_data`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChoiceOption {
    pub text: String,
    pub order: String,
}

/// `field_data` of an external account field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalAccountData {
    pub subtype: String,
    #[serde(default)]
    pub url_pattern: Option<String>,
}
