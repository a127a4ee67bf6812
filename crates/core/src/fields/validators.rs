//! Pure validators for field configuration and field values.
//!
//! Every validator returns `Ok(())` or a human-readable message that is
//! surfaced verbatim to the caller.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use super::kind::FieldKind;
use super::types::{ChoiceOption, ExternalAccountData, FieldData, RealmId, UserId, UserProfile};

/// Maximum length of a field name.
pub const NAME_MAX_LENGTH: usize = 40;
/// Maximum length of a field hint.
pub const HINT_MAX_LENGTH: usize = 80;
/// Maximum length of short text values.
pub const SHORT_STRING_MAX_LENGTH: usize = 50;
/// Maximum length of long text values.
pub const LONG_STRING_MAX_LENGTH: usize = 500;

/// Placeholder a custom external account URL pattern must contain.
pub const USERNAME_PLACEHOLDER: &str = "%(username)s";

/// Built-in external account subtypes and their profile URL patterns.
pub const DEFAULT_EXTERNAL_ACCOUNTS: &[(&str, &str)] = &[
    ("github", "https://github.com/%(username)s"),
    ("twitter", "https://twitter.com/%(username)s"),
];

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://[a-z0-9](?:[a-z0-9.-]*[a-z0-9])?(?::\d{1,5})?(?:[/?#]\S*)?$")
        .expect("valid URL regex")
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"));

pub fn check_capped_string(var_name: &str, value: &str, max_length: usize) -> Result<(), String> {
    if value.chars().count() > max_length {
        return Err(format!("{} is too long (limit: {} characters)", var_name, max_length));
    }
    Ok(())
}

pub fn check_short_string(var_name: &str, value: &str) -> Result<(), String> {
    check_capped_string(var_name, value, SHORT_STRING_MAX_LENGTH)
}

pub fn check_long_string(var_name: &str, value: &str) -> Result<(), String> {
    check_capped_string(var_name, value, LONG_STRING_MAX_LENGTH)
}

/// Accepts calendar dates in YYYY-MM-DD format only.
pub fn check_date(var_name: &str, value: &str) -> Result<(), String> {
    let ok = DATE_RE.is_match(value)
        && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok_and(|d| d.year() > 0);
    if !ok {
        return Err(format!("{} is not a date", var_name));
    }
    Ok(())
}

pub fn check_url(var_name: &str, value: &str) -> Result<(), String> {
    if !URL_RE.is_match(value) {
        return Err(format!("{} is not a URL", var_name));
    }
    Ok(())
}

pub fn check_hint(hint: &str) -> Result<(), String> {
    check_capped_string("hint", hint, HINT_MAX_LENGTH)
}

pub fn check_field_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name cannot be blank.".to_string());
    }
    check_capped_string("name", name, NAME_MAX_LENGTH)
}

/// Structural validation of a field's configuration for its kind.
pub fn validate_field_data(kind: FieldKind, field_data: &FieldData) -> Result<(), String> {
    match kind {
        FieldKind::Choice => validate_choice_data(field_data),
        FieldKind::ExternalAccount => validate_external_account_data(field_data),
        _ if field_data.is_empty() => Ok(()),
        _ => Err("Field data is not supported for this field type.".to_string()),
    }
}

fn validate_choice_data(field_data: &FieldData) -> Result<(), String> {
    if field_data.is_empty() {
        return Err("Field must have at least one choice.".to_string());
    }

    let mut seen = HashSet::new();
    for (key, entry) in field_data {
        let option: ChoiceOption = serde_json::from_value(entry.clone()).map_err(|_| {
            format!("field_data[\"{}\"] must have exactly \"text\" and \"order\" strings", key)
        })?;
        if option.text.trim().is_empty() {
            return Err(format!("field_data[\"{}\"][\"text\"] cannot be blank.", key));
        }
        if !seen.insert(option.text) {
            return Err("Field must not have duplicate choices.".to_string());
        }
    }
    Ok(())
}

fn validate_external_account_data(field_data: &FieldData) -> Result<(), String> {
    if !field_data.contains_key("subtype") {
        return Err("subtype key is missing from field_data".to_string());
    }
    let data: ExternalAccountData = serde_json::from_value(serde_json::Value::Object(
        field_data.clone(),
    ))
    .map_err(|_| "Invalid external account field data.".to_string())?;

    if data.subtype == "custom" {
        let pattern = data
            .url_pattern
            .ok_or_else(|| "Custom external account must define URL pattern".to_string())?;
        if pattern.matches(USERNAME_PLACEHOLDER).count() != 1 {
            return Err("Malformed URL pattern.".to_string());
        }
        check_url("url_pattern", &pattern.replace(USERNAME_PLACEHOLDER, "username"))
            .map_err(|_| "Malformed URL pattern.".to_string())?;
        return Ok(());
    }

    if !DEFAULT_EXTERNAL_ACCOUNTS.iter().any(|(name, _)| *name == data.subtype) {
        return Err("Invalid external account type".to_string());
    }
    Ok(())
}

/// A choice value must be one of the keys of the field's configuration.
pub fn validate_choice(var_name: &str, field_data: &FieldData, value: &str) -> Result<(), String> {
    if !field_data.contains_key(value) {
        return Err(format!("'{}' is not a valid choice for '{}'.", value, var_name));
    }
    Ok(())
}

/// Every referenced user must exist in `realm_id` and, unless
/// `allow_deactivated`, be active.
///
/// `users` holds whatever the store returned for `ids`; missing entries are
/// unknown users.
pub fn validate_user_ids(
    users: &HashMap<UserId, UserProfile>,
    realm_id: RealmId,
    ids: &[UserId],
    allow_deactivated: bool,
) -> Result<(), String> {
    for id in ids {
        match users.get(id) {
            Some(user) if user.realm_id == realm_id && (allow_deactivated || user.is_active) => {}
            _ => return Err(format!("Invalid user ID: {}", id)),
        }
    }
    Ok(())
}

/// Profile URL for an external account value, if the field's subtype has one.
pub fn external_account_url(field_data: &FieldData, account: &str) -> Option<String> {
    let data: ExternalAccountData =
        serde_json::from_value(serde_json::Value::Object(field_data.clone())).ok()?;
    let pattern = match data.url_pattern {
        Some(pattern) if data.subtype == "custom" => pattern,
        _ => DEFAULT_EXTERNAL_ACCOUNTS
            .iter()
            .find(|(name, _)| *name == data.subtype)
            .map(|(_, pattern)| pattern.to_string())?,
    };
    Some(pattern.replace(USERNAME_PLACEHOLDER, account))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn data(value: serde_json::Value) -> FieldData {
        value.as_object().cloned().unwrap()
    }

    fn user(id: UserId, realm_id: RealmId, is_active: bool) -> UserProfile {
        UserProfile { id, realm_id, full_name: format!("User {}", id), is_active }
    }

    #[rstest]
    #[case("1990-04-01", true)]
    #[case("2024-02-29", true)]
    #[case("2023-02-29", false)] // Not a leap year
    #[case("1990-4-01", false)] // Month not zero-padded
    #[case("01/04/1990", false)]
    #[case("+990-04-01", false)]
    #[case("-001-04-01", false)]
    #[case("0000-01-01", false)]
    #[case("1990-04-1 ", false)]
    #[case("", false)]
    fn test_check_date(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(check_date("Birthday", value).is_ok(), valid);
    }

    #[rstest]
    #[case("https://example.com", true)]
    #[case("http://example.com:8080/path?q=1#frag", true)]
    #[case("HTTPS://EXAMPLE.COM/x", true)]
    #[case("ftp://example.com", false)]
    #[case("example.com", false)]
    #[case("https://", false)]
    #[case("https://exa mple.com", false)]
    fn test_check_url(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(check_url("Website", value).is_ok(), valid);
    }

    #[test]
    fn test_capped_string_counts_characters() {
        let fifty = "é".repeat(50);
        assert!(check_short_string("Title", &fifty).is_ok());
        let err = check_short_string("Title", &format!("{}x", fifty)).unwrap_err();
        assert_eq!(err, "Title is too long (limit: 50 characters)");
        assert!(check_long_string("Bio", &"a".repeat(500)).is_ok());
        assert!(check_long_string("Bio", &"a".repeat(501)).is_err());
    }

    #[test]
    fn test_check_field_name() {
        assert_eq!(check_field_name("  ").unwrap_err(), "Name cannot be blank.");
        assert!(check_field_name("Phone number").is_ok());
        assert_eq!(
            check_field_name(&"n".repeat(41)).unwrap_err(),
            "name is too long (limit: 40 characters)"
        );
    }

    #[test]
    fn test_check_hint() {
        assert!(check_hint("").is_ok());
        assert_eq!(
            check_hint(&"h".repeat(81)).unwrap_err(),
            "hint is too long (limit: 80 characters)"
        );
    }

    #[test]
    fn test_choice_data_requires_one_entry() {
        let err = validate_field_data(FieldKind::Choice, &FieldData::new()).unwrap_err();
        assert_eq!(err, "Field must have at least one choice.");
    }

    #[test]
    fn test_choice_data_structure() {
        let ok = data(json!({"1": {"text": "Red", "order": "1"}, "2": {"text": "Blue", "order": "2"}}));
        assert!(validate_field_data(FieldKind::Choice, &ok).is_ok());

        let missing_order = data(json!({"1": {"text": "Red"}}));
        assert!(validate_field_data(FieldKind::Choice, &missing_order).is_err());

        let blank = data(json!({"1": {"text": " ", "order": "1"}}));
        assert_eq!(
            validate_field_data(FieldKind::Choice, &blank).unwrap_err(),
            "field_data[\"1\"][\"text\"] cannot be blank."
        );

        let dup = data(json!({"1": {"text": "Red", "order": "1"}, "2": {"text": "Red", "order": "2"}}));
        assert_eq!(
            validate_field_data(FieldKind::Choice, &dup).unwrap_err(),
            "Field must not have duplicate choices."
        );
    }

    #[test]
    fn test_external_account_data() {
        let github = data(json!({"subtype": "github"}));
        assert!(validate_field_data(FieldKind::ExternalAccount, &github).is_ok());

        let missing = FieldData::new();
        assert_eq!(
            validate_field_data(FieldKind::ExternalAccount, &missing).unwrap_err(),
            "subtype key is missing from field_data"
        );

        let unknown = data(json!({"subtype": "myspace"}));
        assert_eq!(
            validate_field_data(FieldKind::ExternalAccount, &unknown).unwrap_err(),
            "Invalid external account type"
        );

        let custom = data(json!({"subtype": "custom", "url_pattern": "https://git.example.com/%(username)s"}));
        assert!(validate_field_data(FieldKind::ExternalAccount, &custom).is_ok());

        let no_pattern = data(json!({"subtype": "custom"}));
        assert!(validate_field_data(FieldKind::ExternalAccount, &no_pattern).is_err());

        let twice = data(json!({"subtype": "custom", "url_pattern": "https://x.com/%(username)s/%(username)s"}));
        assert_eq!(
            validate_field_data(FieldKind::ExternalAccount, &twice).unwrap_err(),
            "Malformed URL pattern."
        );
    }

    #[test]
    fn test_simple_kinds_reject_field_data() {
        assert!(validate_field_data(FieldKind::ShortText, &FieldData::new()).is_ok());
        let extra = data(json!({"1": {"text": "Red", "order": "1"}}));
        assert!(validate_field_data(FieldKind::Date, &extra).is_err());
    }

    #[test]
    fn test_validate_choice() {
        let choices = data(json!({"1": {"text": "Red", "order": "1"}, "2": {"text": "Blue", "order": "2"}}));
        assert!(validate_choice("Colour", &choices, "1").is_ok());
        assert_eq!(
            validate_choice("Colour", &choices, "3").unwrap_err(),
            "'3' is not a valid choice for 'Colour'."
        );
        // Choice values are keys, not texts
        assert!(validate_choice("Colour", &choices, "Red").is_err());
    }

    #[test]
    fn test_validate_user_ids() {
        let users: HashMap<UserId, UserProfile> =
            [user(1, 10, true), user(2, 10, false), user(3, 20, true)]
                .into_iter()
                .map(|u| (u.id, u))
                .collect();

        assert!(validate_user_ids(&users, 10, &[1], false).is_ok());
        assert!(validate_user_ids(&users, 10, &[], false).is_ok());
        assert_eq!(validate_user_ids(&users, 10, &[1, 2], false).unwrap_err(), "Invalid user ID: 2");
        assert!(validate_user_ids(&users, 10, &[1, 2], true).is_ok());
        assert_eq!(validate_user_ids(&users, 10, &[3], true).unwrap_err(), "Invalid user ID: 3");
        assert_eq!(validate_user_ids(&users, 10, &[99], true).unwrap_err(), "Invalid user ID: 99");
    }

    #[test]
    fn test_external_account_url() {
        let github = data(json!({"subtype": "github"}));
        assert_eq!(
            external_account_url(&github, "octocat").as_deref(),
            Some("https://github.com/octocat")
        );
        let custom = data(json!({"subtype": "custom", "url_pattern": "https://git.example.com/~%(username)s"}));
        assert_eq!(
            external_account_url(&custom, "ada").as_deref(),
            Some("https://git.example.com/~ada")
        );
        assert_eq!(external_account_url(&FieldData::new(), "ada"), None);
    }
}
