use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stale-response guard for one trigger (base URL, subject kind, ...).
///
/// Every fetch starts with [`Generation::begin`]; any later `begin` or
/// [`Generation::invalidate`] makes the earlier ticket stale, and its
/// result must be dropped instead of committed.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    counter: Arc<AtomicU64>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        let epoch = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            counter: self.counter.clone(),
            epoch,
        }
    }

    /// Mark every outstanding ticket stale without starting a new fetch.
    pub fn invalidate(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct Ticket {
    counter: Arc<AtomicU64>,
    epoch: u64,
}

impl Ticket {
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.epoch
    }

    /// Wrap a finished result according to whether this ticket still holds.
    pub fn settle<T>(&self, value: T) -> Fetched<T> {
        if self.is_current() {
            Fetched::Current(value)
        } else {
            Fetched::Stale
        }
    }
}

/// Result of a guarded fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    Current(T),
    /// A newer fetch for the same trigger started while this one was in flight.
    Stale,
}

impl<T> Fetched<T> {
    pub fn into_current(self) -> Option<T> {
        match self {
            Fetched::Current(v) => Some(v),
            Fetched::Stale => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Fetched::Stale)
    }
}
