//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `tracker-provider-google`) using JSON over stdin/stdout.
//!
//! The protocol is language-agnostic: any executable that speaks the JSON
//! protocol can be a provider. Providers manage their own credentials and
//! tokens; the core only passes account and calendar identifiers.

use crate::error::{TrackerError, TrackerResult};
use crate::remote::protocol::{
    Command, GetEvent, ListEvents, ListSources, ProviderCommand, RawEvent, RawSource, Request,
    Response,
};
use crate::remote::transport::{CalendarTransport, TransportError};
use crate::source::Account;
use crate::time_window::TimeWindow;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    fn binary_path(&self) -> TrackerResult<std::path::PathBuf> {
        let binary_name = format!("tracker-provider-{}", self.0);
        which::which(&binary_name).map_err(|_| TrackerError::ProviderNotInstalled(binary_name))
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> TrackerResult<C::Response> {
        timeout(PROVIDER_TIMEOUT, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| TrackerError::ProviderTimeout(PROVIDER_TIMEOUT.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> TrackerResult<R> {
        let params = serde_json::to_value(params)
            .map_err(|e| TrackerError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| TrackerError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        tracing::debug!(provider = %self.0, ?command, "calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                TrackerError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TrackerError::Provider("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(TrackerError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.trim().is_empty() {
            return Err(TrackerError::Provider(
                "Provider returned no response".into(),
            ));
        }

        let response: Response<R> = serde_json::from_str(&response_str)
            .map_err(|e| TrackerError::Provider(format!("Failed to parse response: {}", e)))?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error, code } => Err(TrackerError::ProviderRejected {
                message: error,
                status: code,
            }),
        }
    }
}

/// Scope a core error to the account the call was made for.
fn scoped(account: &Account, err: TrackerError) -> TransportError {
    let status = match &err {
        TrackerError::ProviderRejected { status, .. } => *status,
        TrackerError::ProviderTimeout(_) => Some(504),
        _ => None,
    };
    let error = TransportError::new(&account.identifier, err.to_string());
    match status {
        Some(status) => error.with_status(status),
        None => error,
    }
}

/// Transport that dispatches each call to the account's provider binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderTransport;

impl CalendarTransport for ProviderTransport {
    async fn list_sources(&self, account: &Account) -> Result<Vec<RawSource>, TransportError> {
        account
            .provider
            .call(ListSources {
                account_identifier: account.identifier.clone(),
            })
            .await
            .map_err(|e| scoped(account, e))
    }

    async fn list_events(
        &self,
        account: &Account,
        source_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<RawEvent>, TransportError> {
        account
            .provider
            .call(ListEvents {
                account_identifier: account.identifier.clone(),
                source_id: source_id.to_string(),
                from: window.from_rfc3339(),
                to: window.to_rfc3339(),
            })
            .await
            .map_err(|e| scoped(account, e))
    }

    async fn get_event(
        &self,
        account: &Account,
        source_id: &str,
        event_id: &str,
    ) -> Result<RawEvent, TransportError> {
        account
            .provider
            .call(GetEvent {
                account_identifier: account.identifier.clone(),
                source_id: source_id.to_string(),
                event_id: event_id.to_string(),
            })
            .await
            .map_err(|e| scoped(account, e))
    }
}
