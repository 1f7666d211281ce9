//! Bounded FIFO of finished sessions.

use std::collections::VecDeque;
use std::num::NonZero;
use std::sync::atomic::{self, AtomicUsize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{DEFAULT_HISTORY_CAPACITY, Session};

/// The most recently finished sessions, oldest first.
///
/// Appending beyond the capacity evicts the oldest entries. Sessions are closed far less often
/// than allocation events occur, so a single mutex around the queue is sufficient here.
#[derive(Debug)]
pub(crate) struct HistoryBuffer {
    capacity: AtomicUsize,
    entries: Mutex<VecDeque<Arc<Session>>>,
}

impl HistoryBuffer {
    pub(crate) fn new(capacity: NonZero<usize>) -> Self {
        Self {
            capacity: AtomicUsize::new(capacity.get()),
            entries: Mutex::new(VecDeque::with_capacity(capacity.get())),
        }
    }

    pub(crate) fn capacity(&self) -> NonZero<usize> {
        NonZero::new(self.capacity.load(atomic::Ordering::Relaxed))
            .unwrap_or(DEFAULT_HISTORY_CAPACITY)
    }

    /// Changes the capacity, immediately evicting the oldest entries if the buffer is now
    /// over capacity.
    pub(crate) fn set_capacity(&self, capacity: NonZero<usize>) {
        let mut entries = self.lock();
        self.capacity.store(capacity.get(), atomic::Ordering::Relaxed);
        evict_to(&mut entries, capacity.get());
    }

    pub(crate) fn append(&self, session: Arc<Session>) {
        let mut entries = self.lock();
        let capacity = self.capacity().get();

        // Make room for the new entry.
        evict_to(&mut entries, capacity.saturating_sub(1));
        entries.push_back(session);
    }

    /// Returns the current contents, oldest first.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Session>> {
        self.lock().iter().cloned().collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave the queue half-modified in a way that matters
    // to us, so we keep going with whatever it holds rather than spreading the panic.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Arc<Session>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn evict_to(entries: &mut VecDeque<Arc<Session>>, max_len: usize) {
    while entries.len() > max_len {
        entries.pop_front();
    }
}
