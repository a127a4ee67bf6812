pub mod data;
pub mod doctor;
pub mod field;
pub mod output;
pub mod realm;
pub mod user;

use std::path::Path;

use profilefields_core::config::{ConfigLoader, ResolvedConfig};
use profilefields_core::fields::{ProfileFieldError, UserId, UserProfile};
use profilefields_core::notify::{EventLogNotifier, LogNotifier, Notifier};
use profilefields_core::store::ProfileStore;

use output::fail;

/// Load the configuration, start logging and open the profile store.
///
/// Exits the process when any step fails.
pub fn open_store(config: Option<&Path>, profile: Option<&str>) -> (ResolvedConfig, ProfileStore) {
    let rc = match ConfigLoader::load(config, profile) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };
    crate::logging::init(&rc);

    if let Some(parent) = rc.database.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create {}: {e}", parent.display());
            std::process::exit(1);
        }
    }

    match ProfileStore::open(&rc.database) {
        Ok(store) => (rc, store),
        Err(e) => {
            eprintln!("Failed to open database {}: {e}", rc.database.display());
            std::process::exit(1);
        }
    }
}

/// The event log when one is configured, otherwise log-only delivery.
pub fn notifier(rc: &ResolvedConfig) -> Box<dyn Notifier> {
    match EventLogNotifier::try_from_config(rc) {
        Some(log) => Box::new(log),
        None => Box::new(LogNotifier),
    }
}

/// Look up the acting user, failing with an error payload if unknown.
pub fn load_user(store: &ProfileStore, id: UserId) -> UserProfile {
    let found = store.snapshot().and_then(|tx| tx.get_user(id));
    match found {
        Ok(Some(user)) => user,
        Ok(None) => fail(&ProfileFieldError::validation_of("user", format!("Invalid user ID: {}", id))),
        Err(e) => fail(&e.into()),
    }
}
