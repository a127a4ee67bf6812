use profilefields_core::fields::{ProfileFieldError, Result};
use profilefields_core::store::ProfileStore;
use std::path::Path;
use tabled::{Table, Tabled, settings::Style};

use super::open_store;
use super::output::{fail, print_created, print_ok};
use crate::UserCommands;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    full_name: String,
    #[tabled(rename = "Active")]
    is_active: bool,
}

pub fn run(config: Option<&Path>, profile: Option<&str>, command: UserCommands) {
    let (_, mut store) = open_store(config, profile);

    let result = match command {
        UserCommands::Add { realm, full_name, inactive } => {
            add(&mut store, realm, &full_name, !inactive).map(print_created)
        }
        UserCommands::Deactivate { id } => deactivate(&mut store, id).map(|()| print_ok()),
        UserCommands::List { realm } => list(&store, realm),
    };
    if let Err(e) = result {
        fail(&e);
    }
}

fn add(store: &mut ProfileStore, realm_id: i64, full_name: &str, is_active: bool) -> Result<i64> {
    let tx = store.transaction()?;
    if !tx.list_realms()?.iter().any(|r| r.id == realm_id) {
        return Err(ProfileFieldError::validation_of("realm", format!("Invalid realm ID: {}", realm_id)));
    }
    let user = tx.insert_user(realm_id, full_name, is_active)?;
    tx.commit()?;
    tracing::info!(realm_id, user_id = user.id, "added user '{}'", full_name);
    Ok(user.id)
}

fn deactivate(store: &mut ProfileStore, id: i64) -> Result<()> {
    let tx = store.transaction()?;
    if !tx.set_user_active(id, false)? {
        return Err(ProfileFieldError::validation_of("user", format!("Invalid user ID: {}", id)));
    }
    tx.commit()?;
    tracing::info!(user_id = id, "deactivated user");
    Ok(())
}

fn list(store: &ProfileStore, realm_id: i64) -> Result<()> {
    let users = store.snapshot()?.list_users(realm_id)?;
    if users.is_empty() {
        println!("(no users)");
        return Ok(());
    }
    let rows: Vec<UserRow> = users
        .into_iter()
        .map(|u| UserRow { id: u.id, full_name: u.full_name, is_active: u.is_active })
        .collect();
    println!("{}", Table::new(&rows).with(Style::rounded()));
    Ok(())
}
