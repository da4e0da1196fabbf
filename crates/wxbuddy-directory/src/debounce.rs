//! Time-based debouncing of a rapidly changing value.

use chrono::{DateTime, Duration, Utc};

/// Holds a committed value and a pending replacement.
///
/// Every `set` restarts the delay; `poll` commits the pending value once the
/// delay has passed since the last `set`.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    delay: Duration,
    committed: T,
    pending: Option<(T, DateTime<Utc>)>,
}

impl<T: Clone + PartialEq> Debounced<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            committed: initial,
            pending: None,
        }
    }

    pub fn set(&mut self, value: T, now: DateTime<Utc>) {
        self.pending = Some((value, now));
    }

    /// Commit the pending value if its delay has elapsed.
    ///
    /// Returns the new value only when the committed value changed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<T> {
        let ready = matches!(&self.pending, Some((_, set_at)) if now - *set_at >= self.delay);
        if !ready {
            return None;
        }
        self.pending.take().and_then(|(value, _)| self.commit(value))
    }

    /// Commit the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().and_then(|(value, _)| self.commit(value))
    }

    pub fn committed(&self) -> &T {
        &self.committed
    }

    /// When the pending value becomes committable.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.as_ref().map(|(_, set_at)| *set_at + self.delay)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn commit(&mut self, value: T) -> Option<T> {
        if value == self.committed {
            return None;
        }
        self.committed = value.clone();
        Some(value)
    }
}
