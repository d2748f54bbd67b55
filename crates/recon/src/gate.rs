//! Latest-request-wins handoff between reconciliation runs and whatever
//! displays their result.
//!
//! Each run takes a [`Ticket`] before fetching. When several runs overlap
//! (a filter changed mid-flight), only the most recently issued ticket may
//! publish; results from superseded tickets are dropped.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

pub struct ReportGate<T> {
    issued: AtomicU64,
    published: Mutex<Option<(Ticket, T)>>,
}

impl<T: Clone> ReportGate<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            published: Mutex::new(None),
        }
    }

    /// Start a new request. Supersedes every ticket issued before it.
    pub fn begin(&self) -> Ticket {
        let _slot = self.published.lock();
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Publish a result. Returns `false` (and drops `value`) when a newer
    /// request has started since `ticket` was issued.
    pub fn publish(&self, ticket: Ticket, value: T) -> bool {
        let mut slot = self.published.lock();
        if !self.is_current(ticket) {
            log::debug!("dropping stale report for request #{}", ticket.0);
            return false;
        }
        *slot = Some((ticket, value));
        true
    }

    pub fn current(&self) -> Option<T> {
        self.published.lock().as_ref().map(|(_, v)| v.clone())
    }

    /// Ticket of the currently published value.
    pub fn current_ticket(&self) -> Option<Ticket> {
        self.published.lock().as_ref().map(|(t, _)| *t)
    }
}

impl<T: Clone> Default for ReportGate<T> {
    fn default() -> Self {
        Self::new()
    }
}
