//! Latest-result bookkeeping for interleaved queries.
//!
//! Several queries for the same session may be in flight at once (the user
//! keeps typing in the search box). Each one takes a [`Ticket`] before it
//! starts; when it finishes it publishes with that ticket, and a result whose
//! ticket is older than the one already stored is dropped. The chart therefore
//! never goes back to a stale selection.

use crate::query::AggregateTable;
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Proof of when a query started. Sequence numbers only ever grow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub session: String,
    pub seq: u64,
}

struct Slot {
    seq: u64,
    result: Arc<AggregateTable>,
}

#[derive(Default)]
pub struct SessionResults {
    counter: AtomicU64,
    slots: RwLock<HashMap<String, Slot>>,
}

impl SessionResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a sequence number for a query about to run.
    pub fn begin(&self, session: &str) -> Ticket {
        let seq = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            session: session.to_string(),
            seq,
        }
    }

    /// Store `result` unless a newer one is already there. Returns whether it
    /// was stored.
    pub fn publish(&self, ticket: &Ticket, result: AggregateTable) -> bool {
        let mut slots = match self.slots.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(current) = slots.get(&ticket.session) {
            if current.seq >= ticket.seq {
                debug!(
                    "dropping stale result #{} for session {} (have #{})",
                    ticket.seq, ticket.session, current.seq
                );
                return false;
            }
        }
        slots.insert(
            ticket.session.clone(),
            Slot {
                seq: ticket.seq,
                result: Arc::new(result),
            },
        );
        true
    }

    pub fn latest(&self, session: &str) -> Option<Arc<AggregateTable>> {
        let slots = match self.slots.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slots.get(session).map(|slot| Arc::clone(&slot.result))
    }

    pub fn forget(&self, session: &str) {
        let mut slots = match self.slots.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slots.remove(session);
    }
}
