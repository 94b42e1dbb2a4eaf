//! Calendar sources and the accounts that own them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::remote::protocol::RawSource;
use crate::remote::provider::Provider;

/// Google's alias for an account's main calendar, used when the source
/// listing of an account fails.
pub const PRIMARY_SOURCE_ID: &str = "primary";

/// An authenticated account at a calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub provider: Provider,
    /// Account identifier (e.g. an email address)
    pub identifier: String,
}

impl Account {
    pub fn new(provider: Provider, identifier: impl Into<String>) -> Self {
        Account {
            provider,
            identifier: identifier.into(),
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.provider.name(), self.identifier)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessRole {
    Owner,
    Writer,
    #[default]
    Reader,
}

impl AccessRole {
    /// Parse a provider access role. Anything without write access
    /// (including free/busy-only roles) is a reader.
    pub fn from_provider(role: &str) -> Self {
        match role {
            "owner" => AccessRole::Owner,
            "writer" => AccessRole::Writer,
            _ => AccessRole::Reader,
        }
    }
}

/// One calendar belonging to an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSource {
    pub id: String,
    /// Identifier of the owning account
    pub account: String,
    pub name: Option<String>,
    pub color: Option<String>,
    pub access_role: AccessRole,
    pub selected: bool,
}

impl CalendarSource {
    /// Stand-in for an account whose source listing could not be fetched.
    pub fn primary(account: &Account) -> Self {
        CalendarSource {
            id: PRIMARY_SOURCE_ID.to_string(),
            account: account.identifier.clone(),
            name: None,
            color: None,
            access_role: AccessRole::Owner,
            selected: true,
        }
    }

    pub fn from_raw(raw: RawSource, account: &Account) -> Self {
        CalendarSource {
            id: raw.id,
            account: account.identifier.clone(),
            name: raw.summary,
            color: raw.background_color,
            access_role: raw
                .access_role
                .as_deref()
                .map(AccessRole::from_provider)
                .unwrap_or_default(),
            selected: raw.selected.unwrap_or(raw.primary),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
