//! Realm-scoped custom profile fields.
//!
//! A realm administrator defines fields through [`SchemaManager`]; every
//! user of the realm then stores values for them through [`ValueManager`].
//! Each field has a [`FieldKind`] from a closed set, and the kind decides
//! which validator a value must pass before it is stored:
//!
//! | Kind | Value | Validator |
//! |---|---|---|
//! | short text, external account, pronouns | string | at most 50 characters |
//! | long text | string | at most 500 characters |
//! | date | string | `YYYY-MM-DD` |
//! | link | string | absolute http(s) URL |
//! | choice | string | a key of the field's `field_data` |
//! | user | list of user ids | active users of the same realm |

pub mod errors;
pub mod kind;
pub mod schema;
pub mod types;
pub mod validators;
pub mod values;

pub use errors::{ErrorPayload, ProfileFieldError, Result};
pub use kind::{FieldKind, Validator};
pub use schema::SchemaManager;
pub use types::{
    FieldData, FieldDefinition, FieldId, FieldValue, ProfileValue, Realm, RealmId, UserDataItem,
    UserId, UserProfile,
};
pub use values::ValueManager;
