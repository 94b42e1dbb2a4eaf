//! Multi-source aggregation.
//!
//! One aggregation cycle lists the sources of every account, fetches events
//! from every enabled source, normalizes and merges them, repairs recurrence
//! metadata across the merged set and derives task markers. Every fetch is
//! awaited before merging; a failing account or source is reported in the
//! result and never aborts the cycle.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono_tz::Tz;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::TrackerConfig;
use crate::error::{TrackerError, TrackerResult};
use crate::event::Event;
use crate::normalize::{NormalizeError, normalize_event};
use crate::recurrence::{ResolutionReport, resolve_recurrences};
use crate::remote::protocol::{RawEvent, RawSource};
use crate::remote::transport::{CalendarTransport, TransportError};
use crate::source::{Account, CalendarSource};
use crate::tasks::{Task, task_markers};
use crate::time_window::TimeWindow;

/// Token identifying one aggregation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Generation(u64);

/// A source whose events could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub account: String,
    pub source_id: String,
    pub error: TransportError,
}

/// A provider record rejected by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedEvent {
    pub event_id: String,
    pub source_id: String,
    pub reason: NormalizeError,
}

/// Output of one aggregation cycle.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub generation: Generation,
    pub window: TimeWindow,
    /// Every listed source, enabled or not, in account order
    pub sources: Vec<CalendarSource>,
    /// Provider events sorted by start, then title, then id
    pub events: Vec<Event>,
    /// Task-derived markers, kept apart from provider events
    pub task_markers: Vec<Event>,
    pub failures: Vec<SyncFailure>,
    pub dropped: Vec<DroppedEvent>,
    pub recurrence: ResolutionReport,
}

impl Aggregation {
    /// Identifiers of accounts with at least one failed fetch, in the order
    /// they first failed.
    pub fn failed_accounts(&self) -> Vec<&str> {
        let mut accounts: Vec<&str> = Vec::new();
        for failure in &self.failures {
            if !accounts.contains(&failure.account.as_str()) {
                accounts.push(&failure.account);
            }
        }
        accounts
    }

    /// User-facing sync warning, if anything failed.
    pub fn failure_message(&self) -> Option<String> {
        let accounts = self.failed_accounts();
        if accounts.is_empty() {
            None
        } else {
            Some(format!("failed to sync: {}", accounts.join(", ")))
        }
    }

    /// Provider events followed by task markers, ready for layout.
    pub fn display_events(&self) -> Vec<Event> {
        self.events
            .iter()
            .chain(self.task_markers.iter())
            .cloned()
            .collect()
    }
}

/// Runs aggregation cycles against a transport.
pub struct Aggregator<T: CalendarTransport> {
    transport: Arc<T>,
    config: TrackerConfig,
    latest: AtomicU64,
}

impl<T: CalendarTransport> Aggregator<T> {
    pub fn new(transport: Arc<T>, config: TrackerConfig) -> Self {
        Aggregator {
            transport,
            config,
            latest: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Issue a fresh generation, superseding every earlier one.
    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }

    /// Pass `aggregation` through unless a newer request has been issued
    /// since it started.
    pub fn accept(&self, aggregation: Aggregation) -> Option<Aggregation> {
        if self.is_current(aggregation.generation) {
            Some(aggregation)
        } else {
            warn!(
                generation = aggregation.generation.0,
                latest = self.latest.load(Ordering::SeqCst),
                "discarding stale aggregation"
            );
            None
        }
    }

    /// Run one aggregation cycle for `accounts` over `window`.
    ///
    /// Fails only when there is nothing to fetch: no accounts, or no enabled
    /// source on any of them.
    pub async fn aggregate(
        &self,
        accounts: &[Account],
        window: &TimeWindow,
        tasks: &[Task],
    ) -> TrackerResult<Aggregation> {
        let generation = self.begin();

        if accounts.is_empty() {
            return Err(TrackerError::NoSourcesConfigured);
        }

        let sources = self.list_sources(accounts).await;

        let enabled: Vec<(Account, CalendarSource)> = accounts
            .iter()
            .flat_map(|account| {
                sources
                    .iter()
                    .filter(|s| s.account == account.identifier && self.config.is_enabled(s))
                    .map(|s| (account.clone(), s.clone()))
            })
            .collect();

        if enabled.is_empty() {
            return Err(TrackerError::NoSourcesConfigured);
        }

        debug!(
            generation = generation.0,
            accounts = accounts.len(),
            sources = enabled.len(),
            "fetching events"
        );

        let (mut events, failures, dropped) = self.fetch_events(&enabled, window).await;

        let recurrence = resolve_recurrences(&self.transport, accounts, &mut events).await;

        let tz = self.config.timezone;
        sort_events(&mut events, &tz);

        let mut markers = task_markers(tasks, &self.config.marker_colors());
        sort_events(&mut markers, &tz);

        debug!(
            generation = generation.0,
            events = events.len(),
            task_markers = markers.len(),
            failures = failures.len(),
            dropped = dropped.len(),
            "aggregation finished"
        );

        Ok(Aggregation {
            generation,
            window: *window,
            sources,
            events,
            task_markers: markers,
            failures,
            dropped,
            recurrence,
        })
    }

    /// List sources of every account, falling back to the primary calendar
    /// for accounts whose listing fails.
    async fn list_sources(&self, accounts: &[Account]) -> Vec<CalendarSource> {
        let mut listings: JoinSet<(usize, Result<Vec<RawSource>, TransportError>)> =
            JoinSet::new();
        for (idx, account) in accounts.iter().enumerate() {
            let transport = Arc::clone(&self.transport);
            let account = account.clone();
            listings.spawn(async move { (idx, transport.list_sources(&account).await) });
        }

        let mut listed: HashMap<usize, Vec<RawSource>> = HashMap::new();
        while let Some(joined) = listings.join_next().await {
            match joined {
                Ok((idx, Ok(raw))) => {
                    listed.insert(idx, raw);
                }
                Ok((idx, Err(err))) => warn!(
                    account = %accounts[idx].identifier,
                    error = %err,
                    "source listing failed, using primary calendar"
                ),
                Err(err) => warn!(error = %err, "source listing task failed"),
            }
        }

        accounts
            .iter()
            .enumerate()
            .flat_map(|(idx, account)| match listed.remove(&idx) {
                Some(raw) => raw
                    .into_iter()
                    .map(|r| CalendarSource::from_raw(r, account))
                    .collect::<Vec<_>>(),
                None => vec![CalendarSource::primary(account)],
            })
            .collect()
    }

    async fn fetch_events(
        &self,
        enabled: &[(Account, CalendarSource)],
        window: &TimeWindow,
    ) -> (Vec<Event>, Vec<SyncFailure>, Vec<DroppedEvent>) {
        let mut fetches: JoinSet<(usize, Result<Vec<RawEvent>, TransportError>)> = JoinSet::new();
        for (idx, (account, source)) in enabled.iter().enumerate() {
            let transport = Arc::clone(&self.transport);
            let account = account.clone();
            let source_id = source.id.clone();
            let window = *window;
            fetches.spawn(async move {
                (
                    idx,
                    transport.list_events(&account, &source_id, &window).await,
                )
            });
        }

        let mut results: Vec<Option<Result<Vec<RawEvent>, TransportError>>> =
            (0..enabled.len()).map(|_| None).collect();
        while let Some(joined) = fetches.join_next().await {
            match joined {
                Ok((idx, result)) => results[idx] = Some(result),
                Err(err) => warn!(error = %err, "event fetch task failed"),
            }
        }

        let mut events = Vec::new();
        let mut failures = Vec::new();
        let mut dropped = Vec::new();

        // Merge in source order so the result does not depend on completion order.
        for ((account, source), result) in enabled.iter().zip(results) {
            let result = result.unwrap_or_else(|| {
                Err(TransportError::new(
                    &account.identifier,
                    "fetch task did not complete",
                ))
            });

            match result {
                Ok(raw_events) => {
                    for raw in raw_events {
                        let event_id = raw.id.clone();
                        match normalize_event(raw, source) {
                            Ok(event) => events.push(event),
                            Err(reason) => {
                                warn!(
                                    event_id = %event_id,
                                    source_id = %source.id,
                                    reason = %reason,
                                    "dropping malformed event"
                                );
                                dropped.push(DroppedEvent {
                                    event_id,
                                    source_id: source.id.clone(),
                                    reason,
                                });
                            }
                        }
                    }
                }
                Err(error) => {
                    warn!(
                        account = %account.identifier,
                        source_id = %source.id,
                        error = %error,
                        "source fetch failed"
                    );
                    failures.push(SyncFailure {
                        account: account.identifier.clone(),
                        source_id: source.id.clone(),
                        error,
                    });
                }
            }
        }

        (events, failures, dropped)
    }
}

/// Order by effective start in `tz`, then title, then id.
pub fn sort_events(events: &mut [Event], tz: &Tz) {
    events.sort_by(|a, b| {
        a.start_in(tz)
            .cmp(&b.start_in(tz))
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.id.cmp(&b.id))
    });
}
