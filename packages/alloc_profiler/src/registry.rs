//! The set of sessions that are currently open on any thread.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{self, AtomicUsize};

use foldhash::fast::RandomState;

use crate::{Session, SessionId};

/// All open sessions across all threads, keyed by session identifier.
///
/// Registration and removal only lock the affected bucket of the underlying concurrent map,
/// so they scale with the number of threads. Visitors observe a weakly consistent view: a
/// session registered or removed during a visit may or may not be seen, but no session is
/// ever visited twice by the same visit.
pub(crate) struct ActiveRegistry {
    sessions: scc::HashMap<SessionId, Arc<Session>, RandomState>,

    // Counting entries in the map means visiting all of them, which is far too slow for the
    // allocation hot path, so we keep our own count.
    open_count: AtomicUsize,
}

impl ActiveRegistry {
    pub(crate) fn new() -> Self {
        Self {
            sessions: scc::HashMap::with_hasher(RandomState::default()),
            open_count: AtomicUsize::new(0),
        }
    }

    pub(crate) fn register(&self, session: Arc<Session>) {
        if self.sessions.insert(session.id(), session).is_ok() {
            self.open_count.fetch_add(1, atomic::Ordering::Release);
        }
    }

    /// Returns whether the session was registered.
    pub(crate) fn unregister(&self, id: SessionId) -> bool {
        if self.sessions.remove(&id).is_some() {
            self.open_count.fetch_sub(1, atomic::Ordering::Release);
            true
        } else {
            false
        }
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.open_count.load(atomic::Ordering::Acquire) == 0
    }

    pub(crate) fn len(&self) -> usize {
        self.open_count.load(atomic::Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn for_each_open(&self, mut visitor: impl FnMut(&Session)) {
        self.sessions.scan(|_, session| visitor(session));
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains(&id)
    }

    /// Forgets every open session. Only meaningful while no thread is opening or closing.
    pub(crate) fn clear(&self) {
        self.sessions.retain(|_, _| {
            self.open_count.fetch_sub(1, atomic::Ordering::Release);
            false
        });
    }
}

impl fmt::Debug for ActiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveRegistry")
            .field("open_count", &self.len())
            .finish_non_exhaustive()
    }
}
