//! Shared output formatting for field and data commands.

use profilefields_core::fields::validators::external_account_url;
use profilefields_core::fields::{
    FieldDefinition, FieldKind, FieldValue, ProfileFieldError, ProfileValue,
};
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

/// Row for the field list table.
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Order")]
    order: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Hint")]
    hint: String,
}

/// Row for a user's data table.
#[derive(Tabled)]
struct ValueRow {
    #[tabled(rename = "Field")]
    field_id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn print_fields_table(fields: &[FieldDefinition]) {
    if fields.is_empty() {
        println!("(no fields defined)");
        return;
    }

    let rows: Vec<FieldRow> = fields
        .iter()
        .map(|f| FieldRow {
            id: f.id,
            order: f.order,
            name: f.name.clone(),
            kind: f.field_type.to_string(),
            hint: f.hint.clone(),
        })
        .collect();
    println!("{}", Table::new(&rows).with(Style::rounded()));
}

/// Print values with the names of their fields. External account values
/// also show the profile URL.
pub fn print_values_table(values: &[FieldValue], fields: &[FieldDefinition]) {
    if values.is_empty() {
        println!("(no profile data)");
        return;
    }

    let rows: Vec<ValueRow> = values
        .iter()
        .map(|v| {
            let field = fields.iter().find(|f| f.id == v.field_id);
            ValueRow {
                field_id: v.field_id,
                name: field.map(|f| f.name.clone()).unwrap_or_default(),
                value: display_value(&v.value, field),
            }
        })
        .collect();
    println!("{}", Table::new(&rows).with(Style::rounded()));
}

fn display_value(value: &ProfileValue, field: Option<&FieldDefinition>) -> String {
    match value {
        ProfileValue::Text(text) => {
            let url = field
                .filter(|f| f.field_type == FieldKind::ExternalAccount)
                .and_then(|f| external_account_url(&f.field_data, text));
            match url {
                Some(url) => format!("{} ({})", text, url),
                None => text.clone(),
            }
        }
        ProfileValue::UserIds(ids) => {
            ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize output: {e}");
            std::process::exit(1);
        }
    }
}

/// Print `{"id": n}` for a created object.
pub fn print_created(id: i64) {
    println!("{}", serde_json::json!({ "id": id }));
}

pub fn print_ok() {
    println!("{{}}");
}

/// Print the error payload and exit with status 1.
pub fn fail(err: &ProfileFieldError) -> ! {
    if err.is_recoverable() {
        tracing::debug!("request rejected: {}", err);
    } else {
        tracing::error!("request failed: {}", err);
    }
    match serde_json::to_string(&err.to_payload()) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize error: {e}"),
    }
    crate::logging::flush();
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&ProfileValue::from("Red"), None), "Red");
        assert_eq!(display_value(&ProfileValue::from(vec![3_i64, 5]), None), "3, 5");
        assert_eq!(display_value(&ProfileValue::UserIds(Vec::new()), None), "");
    }

    #[test]
    fn test_display_external_account() {
        let field = FieldDefinition {
            id: 1,
            realm_id: 1,
            name: "GitHub".into(),
            hint: String::new(),
            field_type: FieldKind::ExternalAccount,
            field_data: json!({"subtype": "github"}).as_object().cloned().unwrap(),
            order: 1,
        };
        assert_eq!(
            display_value(&ProfileValue::from("octocat"), Some(&field)),
            "octocat (https://github.com/octocat)"
        );
    }
}
