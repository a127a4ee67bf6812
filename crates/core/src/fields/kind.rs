//! The closed set of field kinds and the validator each one dispatches to.

use serde::{Serialize, Serializer};

use super::validators;

/// Kind of a custom profile field.
///
/// Integer codes are the stable representation used in storage and on the
/// wire; they never change once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Single line of text.
    ShortText,
    /// Paragraph of text.
    LongText,
    /// One key out of the field's configured choices.
    Choice,
    /// Date in YYYY-MM-DD format.
    Date,
    /// Absolute http(s) URL.
    Link,
    /// List of users of the same realm.
    User,
    /// Account name on an external service (GitHub, Twitter, custom).
    ExternalAccount,
    /// Preferred pronouns.
    Pronouns,
}

/// A simple validator: `(field_name, value) -> error message`.
pub type SimpleValidator = fn(&str, &str) -> Result<(), String>;

/// Validator strategy selected for a field kind.
///
/// Choice and reference validation need context beyond the raw value
/// (the field's choices, the acting user's realm), so they are resolved by
/// the caller rather than carried as plain function pointers.
#[derive(Debug, Clone, Copy)]
pub enum Validator {
    Simple(SimpleValidator),
    Choice,
    Reference,
}

impl FieldKind {
    /// Every registered kind, in code order.
    pub const ALL: [FieldKind; 8] = [
        Self::ShortText,
        Self::LongText,
        Self::Choice,
        Self::Date,
        Self::Link,
        Self::User,
        Self::ExternalAccount,
        Self::Pronouns,
    ];

    pub fn code(self) -> i64 {
        match self {
            Self::ShortText => 1,
            Self::LongText => 2,
            Self::Choice => 3,
            Self::Date => 4,
            Self::Link => 5,
            Self::User => 6,
            Self::ExternalAccount => 7,
            Self::Pronouns => 8,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Get the display name for this field kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShortText => "short_text",
            Self::LongText => "long_text",
            Self::Choice => "choice",
            Self::Date => "date",
            Self::Link => "link",
            Self::User => "user",
            Self::ExternalAccount => "external_account",
            Self::Pronouns => "pronouns",
        }
    }

    pub fn validator(self) -> Validator {
        match self {
            Self::ShortText | Self::ExternalAccount | Self::Pronouns => {
                Validator::Simple(validators::check_short_string)
            }
            Self::LongText => Validator::Simple(validators::check_long_string),
            Self::Date => Validator::Simple(validators::check_date),
            Self::Link => Validator::Simple(validators::check_url),
            Self::Choice => Validator::Choice,
            Self::User => Validator::Reference,
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<i64>() {
            return Self::from_code(code).ok_or_else(|| format!("unknown field type: {}", s));
        }
        match s.to_lowercase().replace('-', "_").as_str() {
            "short_text" | "short" | "text" => Ok(Self::ShortText),
            "long_text" | "long" | "paragraph" => Ok(Self::LongText),
            "choice" | "select" => Ok(Self::Choice),
            "date" => Ok(Self::Date),
            "link" | "url" => Ok(Self::Link),
            "user" | "users" => Ok(Self::User),
            "external_account" | "external" => Ok(Self::ExternalAccount),
            "pronouns" => Ok(Self::Pronouns),
            _ => Err(format!("unknown field type: {}", s)),
        }
    }
}

impl Serialize for FieldKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}
