//! Recurrence repair for expanded event instances.
//!
//! Providers that expand recurring series into single instances usually
//! return each instance with only a `recurringEventId`. The resolver looks
//! up every referenced master once and copies its recurrence rules onto the
//! instances.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::event::Event;
use crate::remote::transport::{CalendarTransport, TransportError};
use crate::source::Account;

/// Identifies a master event: masters are only unique within a source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MasterKey {
    pub source_id: String,
    pub master_id: String,
}

impl MasterKey {
    /// The master an instance still needs rules from, if any.
    fn unresolved(event: &Event) -> Option<Self> {
        if !event.recurrence.is_empty() {
            return None;
        }
        event.recurring_event_id.as_ref().map(|master_id| MasterKey {
            source_id: event.source_id().to_string(),
            master_id: master_id.clone(),
        })
    }
}

/// What one resolution pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Number of master lookups issued
    pub lookups: usize,
    /// Number of instances that received rules
    pub patched: usize,
    /// Masters whose lookup failed; their instances keep an empty rule list
    pub failed: Vec<MasterKey>,
}

/// Backfill `recurrence` on instances that only reference their master.
///
/// Each unique `(source, master)` pair is fetched at most once, concurrently,
/// and every lookup settles before instances are patched. Instances that
/// already carry rules are never touched, so a second pass is a no-op.
pub async fn resolve_recurrences<T: CalendarTransport>(
    transport: &Arc<T>,
    accounts: &[Account],
    events: &mut [Event],
) -> ResolutionReport {
    let mut pending: BTreeMap<MasterKey, Account> = BTreeMap::new();

    for event in events.iter() {
        let Some(key) = MasterKey::unresolved(event) else {
            continue;
        };
        if pending.contains_key(&key) {
            continue;
        }
        match accounts
            .iter()
            .find(|a| a.identifier == event.provenance.account)
        {
            Some(account) => {
                pending.insert(key, account.clone());
            }
            None => warn!(
                event_id = %event.id,
                account = %event.provenance.account,
                "no account for recurring instance, skipping master lookup"
            ),
        }
    }

    let mut report = ResolutionReport {
        lookups: pending.len(),
        ..Default::default()
    };
    if pending.is_empty() {
        return report;
    }

    debug!(masters = pending.len(), "resolving recurring masters");

    let mut lookups: JoinSet<(MasterKey, Result<Vec<String>, TransportError>)> = JoinSet::new();
    for (key, account) in pending {
        let transport = Arc::clone(transport);
        lookups.spawn(async move {
            let result = transport
                .get_event(&account, &key.source_id, &key.master_id)
                .await
                .map(|master| master.recurrence.unwrap_or_default());
            (key, result)
        });
    }

    let mut rules: HashMap<MasterKey, Vec<String>> = HashMap::new();
    while let Some(joined) = lookups.join_next().await {
        match joined {
            Ok((key, Ok(recurrence))) => {
                rules.insert(key, recurrence);
            }
            Ok((key, Err(err))) => {
                warn!(
                    source_id = %key.source_id,
                    master_id = %key.master_id,
                    error = %err,
                    "recurring master lookup failed"
                );
                report.failed.push(key);
            }
            Err(err) => warn!(error = %err, "recurring master lookup task failed"),
        }
    }
    report.failed.sort();

    for event in events.iter_mut() {
        let Some(key) = MasterKey::unresolved(event) else {
            continue;
        };
        if let Some(recurrence) = rules.get(&key).filter(|r| !r.is_empty()) {
            event.recurrence = recurrence.clone();
            report.patched += 1;
        }
    }

    report
}
