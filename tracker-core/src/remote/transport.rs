//! The boundary to whatever actually talks to calendar providers.

use std::future::Future;

use thiserror::Error;

use crate::remote::protocol::{RawEvent, RawSource};
use crate::source::Account;
use crate::time_window::TimeWindow;

/// A rejected transport call, scoped to the account it was made for.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{account}{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
pub struct TransportError {
    /// Identifier of the account the call was made for
    pub account: String,
    /// HTTP-like status, when the upstream reported one
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn new(account: impl Into<String>, message: impl Into<String>) -> Self {
        TransportError {
            account: account.into(),
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Expired or revoked credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self.status, Some(401 | 403))
    }
}

/// Fetches raw calendar data for an account.
///
/// Implementations own timeouts and credential handling. Calls may be issued
/// concurrently from spawned tasks.
pub trait CalendarTransport: Send + Sync + 'static {
    fn list_sources(
        &self,
        account: &Account,
    ) -> impl Future<Output = Result<Vec<RawSource>, TransportError>> + Send;

    fn list_events(
        &self,
        account: &Account,
        source_id: &str,
        window: &TimeWindow,
    ) -> impl Future<Output = Result<Vec<RawEvent>, TransportError>> + Send;

    fn get_event(
        &self,
        account: &Account,
        source_id: &str,
        event_id: &str,
    ) -> impl Future<Output = Result<RawEvent, TransportError>> + Send;
}
