//! Writable record fields.
//!
//! `NewDomain` and `DomainUpdate` are the only ways callers describe
//! changes; unknown JSON fields are rejected at deserialization, and
//! single-property writes go through the `DomainField` whitelist.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::record::Scheme;
use crate::error::DomainError;

/// Fields for a new record. Unset options receive registry defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewDomain {
    pub id: String,
    pub hostname: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scheme: Option<Scheme>,
    #[serde(default)]
    pub weight: Option<i32>,
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    pub redirect: Option<u16>,
    /// Canonical hostname used for redirects and links.
    #[serde(default)]
    pub canonical: Option<String>,
}

impl NewDomain {
    pub fn new(id: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            hostname: hostname.into(),
            ..Default::default()
        }
    }
}

/// Partial update of an existing record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<Scheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    /// `Some(None)` clears the redirect.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub redirect: Option<Option<u16>>,
    /// `Some(None)` drops the canonical override.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub canonical: Option<Option<String>>,
}

/// Distinguishes an explicit `null` from a missing field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Property names accepted by single-field writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainField {
    Hostname,
    Name,
    Scheme,
    Weight,
    Status,
    IsDefault,
    Redirect,
    Canonical,
}

impl FromStr for DomainField {
    type Err = DomainError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "hostname" => Ok(Self::Hostname),
            "name" => Ok(Self::Name),
            "scheme" => Ok(Self::Scheme),
            "weight" => Ok(Self::Weight),
            "status" => Ok(Self::Status),
            "is_default" => Ok(Self::IsDefault),
            "redirect" => Ok(Self::Redirect),
            "canonical" => Ok(Self::Canonical),
            other => Err(DomainError::UnknownField(other.to_string())),
        }
    }
}

impl DomainField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hostname => "hostname",
            Self::Name => "name",
            Self::Scheme => "scheme",
            Self::Weight => "weight",
            Self::Status => "status",
            Self::IsDefault => "is_default",
            Self::Redirect => "redirect",
            Self::Canonical => "canonical",
        }
    }

    /// Parse a raw value into an update touching only this field.
    pub fn parse_update(&self, value: &str) -> Result<DomainUpdate, DomainError> {
        let invalid = || DomainError::InvalidValue {
            field: self.as_str().to_string(),
            value: value.to_string(),
        };
        let value = value.trim();

        let mut update = DomainUpdate::default();
        match self {
            Self::Hostname => update.hostname = Some(value.to_string()),
            Self::Name => update.name = Some(value.to_string()),
            Self::Scheme => update.scheme = Some(Scheme::coerce(value)),
            Self::Weight => update.weight = Some(value.parse().map_err(|_| invalid())?),
            Self::Status => update.status = Some(parse_flag(value).ok_or_else(invalid)?),
            Self::IsDefault => update.is_default = Some(parse_flag(value).ok_or_else(invalid)?),
            Self::Redirect => {
                update.redirect = match value {
                    "" | "none" | "null" => Some(None),
                    code => Some(Some(code.parse().map_err(|_| invalid())?)),
                }
            }
            Self::Canonical => {
                update.canonical = match value {
                    "" | "none" | "null" => Some(None),
                    host => Some(Some(host.to_string())),
                }
            }
        }
        Ok(update)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
