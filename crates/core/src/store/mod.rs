//! SQLite storage for realms, users, field definitions and field values.
//!
//! # Example
//!
//! ```no_run
//! use profilefields_core::store::ProfileStore;
//! use std::path::Path;
//!
//! let mut store = ProfileStore::open(Path::new("profilefields.db")).unwrap();
//! let tx = store.transaction().unwrap();
//! let realm = tx.insert_realm("zulip").unwrap();
//! tx.commit().unwrap();
//!
//! let fields = store.snapshot().unwrap().list_fields(realm).unwrap();
//! assert!(fields.is_empty());
//! ```

pub mod db;
pub mod schema;

pub use db::{ProfileStore, StoreError, Tx};
pub use schema::{SCHEMA_VERSION, SchemaError};
