//! Field definition commands.

use std::path::Path;
use std::str::FromStr;

use profilefields_core::fields::{FieldData, FieldKind, ProfileFieldError, Result, SchemaManager};

use super::output::{fail, print_created, print_fields_table, print_json, print_ok};
use super::{notifier, open_store};
use crate::{FieldCommands, FieldCreateArgs, FieldUpdateArgs};

pub fn run(config: Option<&Path>, profile: Option<&str>, command: FieldCommands) {
    let (rc, mut store) = open_store(config, profile);
    let notifier = notifier(&rc);
    let mut schema = SchemaManager::new(&mut store, notifier.as_ref());

    let result = match command {
        FieldCommands::List { realm, json } => schema.list_fields(realm).map(|fields| {
            if json {
                print_json(&fields);
            } else {
                print_fields_table(&fields);
            }
        }),
        FieldCommands::Create(args) => create(&mut schema, args).map(print_created),
        FieldCommands::Update(args) => update(&mut schema, args).map(|()| print_ok()),
        FieldCommands::Delete { realm, id } => schema.delete_field(realm, id).map(|()| print_ok()),
        FieldCommands::Reorder { realm, ids } => {
            schema.reorder_fields(realm, &ids).map(|()| print_ok())
        }
    };
    if let Err(e) = result {
        fail(&e);
    }
}

fn create(schema: &mut SchemaManager<'_>, args: FieldCreateArgs) -> Result<i64> {
    let code = parse_kind(&args.field_type)?;
    let data = parse_field_data(args.data.as_deref())?;
    let field = schema.create_field(args.realm, &args.name, &args.hint, code, data)?;
    Ok(field.id)
}

fn update(schema: &mut SchemaManager<'_>, args: FieldUpdateArgs) -> Result<()> {
    let data = parse_field_data(args.data.as_deref())?;
    schema.update_field(args.realm, args.id, &args.name, &args.hint, data)
}

/// Numeric codes pass through unchecked so the schema manager reports them.
fn parse_kind(input: &str) -> Result<i64> {
    if let Ok(code) = input.parse::<i64>() {
        return Ok(code);
    }
    FieldKind::from_str(input)
        .map(|kind| kind.code())
        .map_err(|_| ProfileFieldError::validation("Invalid field type."))
}

fn parse_field_data(input: Option<&str>) -> Result<FieldData> {
    let Some(raw) = input else {
        return Ok(FieldData::new());
    };
    serde_json::from_str::<FieldData>(raw).map_err(|_| {
        ProfileFieldError::validation_of("field_data", "field_data is not a JSON object")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("choice").unwrap(), 3);
        assert_eq!(parse_kind("external-account").unwrap(), 7);
        assert_eq!(parse_kind("99").unwrap(), 99);
        assert_eq!(parse_kind("colour").unwrap_err().to_string(), "Invalid field type.");
    }

    #[test]
    fn test_parse_field_data() {
        assert!(parse_field_data(None).unwrap().is_empty());
        let data = parse_field_data(Some(r#"{"subtype": "github"}"#)).unwrap();
        assert_eq!(data["subtype"], "github");
        assert!(parse_field_data(Some("[1, 2]")).is_err());
        assert!(parse_field_data(Some("{")).is_err());
    }
}
