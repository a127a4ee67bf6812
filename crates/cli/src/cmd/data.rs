//! Per-user profile data commands.

use std::path::Path;

use profilefields_core::fields::{
    FieldId, ProfileFieldError, ProfileValue, Result, SchemaManager, UserDataItem, UserId,
    ValueManager,
};

use super::output::{fail, print_json, print_ok, print_values_table};
use super::{load_user, notifier, open_store};
use crate::DataCommands;

pub fn run(config: Option<&Path>, profile: Option<&str>, command: DataCommands) {
    let (rc, mut store) = open_store(config, profile);
    let notifier = notifier(&rc);

    let result = match command {
        DataCommands::Set { user, items } => {
            let user = load_user(&store, user);
            parse_items(&items)
                .and_then(|items| {
                    ValueManager::new(&mut store, notifier.as_ref()).update_user_data(&user, &items)
                })
                .map(|()| print_ok())
        }
        DataCommands::Remove { user, ids } => {
            let user = load_user(&store, user);
            ValueManager::new(&mut store, notifier.as_ref())
                .remove_user_data(&user, &ids)
                .map(|()| print_ok())
        }
        DataCommands::Show { user, json } => {
            let user = load_user(&store, user);
            let values = ValueManager::new(&mut store, notifier.as_ref()).user_data(&user);
            values.and_then(|values| {
                if json {
                    print_json(&values);
                } else {
                    let fields = SchemaManager::new(&mut store, notifier.as_ref())
                        .list_fields(user.realm_id)?;
                    print_values_table(&values, &fields);
                }
                Ok(())
            })
        }
    };
    if let Err(e) = result {
        fail(&e);
    }
}

fn parse_items(args: &[String]) -> Result<Vec<UserDataItem>> {
    args.iter().map(|arg| parse_item(arg)).collect()
}

/// Parse `FIELD_ID=VALUE`. A value holding a JSON array of integers is a
/// user id list; anything else is text.
fn parse_item(arg: &str) -> Result<UserDataItem> {
    let invalid = || {
        ProfileFieldError::validation_of("data", format!("Invalid item '{}': expected FIELD_ID=VALUE", arg))
    };
    let (id, value) = arg.split_once('=').ok_or_else(invalid)?;
    let id: FieldId = id.trim().parse().map_err(|_| invalid())?;

    let value = match serde_json::from_str::<Vec<UserId>>(value) {
        Ok(ids) => ProfileValue::UserIds(ids),
        Err(_) => ProfileValue::Text(value.to_string()),
    };
    Ok(UserDataItem { id, value })
}
