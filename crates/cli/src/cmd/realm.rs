//! Realm and seed commands.

use profilefields_core::fields::ProfileFieldError;
use profilefields_core::store::StoreError;
use std::path::Path;
use tabled::{Table, Tabled, settings::Style};

use super::open_store;
use super::output::{fail, print_created};
use crate::RealmCommands;

#[derive(Tabled)]
struct RealmRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
}

pub fn run(config: Option<&Path>, profile: Option<&str>, command: RealmCommands) {
    let (_, mut store) = open_store(config, profile);

    match command {
        RealmCommands::Create { name } => {
            let created = store.transaction().and_then(|tx| {
                let id = tx.insert_realm(&name)?;
                tx.commit()?;
                Ok(id)
            });
            match created {
                Ok(id) => {
                    tracing::info!(realm_id = id, "created realm '{}'", name);
                    print_created(id);
                }
                Err(StoreError::UniqueViolation) => fail(&ProfileFieldError::validation_of(
                    "name",
                    "A realm with that name already exists.",
                )),
                Err(e) => fail(&e.into()),
            }
        }
        RealmCommands::List => {
            let realms = match store.snapshot().and_then(|tx| tx.list_realms()) {
                Ok(realms) => realms,
                Err(e) => fail(&e.into()),
            };
            if realms.is_empty() {
                println!("(no realms)");
                return;
            }
            let rows: Vec<RealmRow> =
                realms.into_iter().map(|r| RealmRow { id: r.id, name: r.name }).collect();
            println!("{}", Table::new(&rows).with(Style::rounded()));
        }
    }
}
