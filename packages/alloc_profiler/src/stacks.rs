//! Per-thread stacks of nested open sessions.

use std::fmt;
use std::sync::Arc;

use foldhash::fast::RandomState;
use scc::hash_map::Entry;

use crate::{Session, ThreadKey};

/// One LIFO stack of open sessions per thread.
///
/// A stack is only ever touched on behalf of the thread it belongs to, so the per-entry lock
/// taken here is uncontended in practice. Stacks are created on the first open for a thread
/// and removed as soon as they become empty, so memory use is bounded by the number of threads
/// that currently have an open session.
pub(crate) struct ThreadStacks {
    stacks: scc::HashMap<ThreadKey, Vec<Arc<Session>>, RandomState>,
}

impl ThreadStacks {
    pub(crate) fn new() -> Self {
        Self {
            stacks: scc::HashMap::with_hasher(RandomState::default()),
        }
    }

    pub(crate) fn push(&self, thread: ThreadKey, session: Arc<Session>) {
        match self.stacks.entry(thread) {
            Entry::Occupied(mut occupied) => occupied.get_mut().push(session),
            Entry::Vacant(vacant) => {
                vacant.insert_entry(vec![session]);
            }
        }
    }

    /// Removes the innermost open session of the thread.
    ///
    /// Returns `None` if the thread has no open session.
    pub(crate) fn pop(&self, thread: ThreadKey) -> Option<Arc<Session>> {
        match self.stacks.entry(thread) {
            Entry::Occupied(mut occupied) => {
                let session = occupied.get_mut().pop();

                if occupied.get().is_empty() {
                    drop(occupied.remove());
                }

                session
            }
            Entry::Vacant(_) => None,
        }
    }

    /// How many sessions the thread has open.
    pub(crate) fn depth(&self, thread: ThreadKey) -> usize {
        self.stacks.read(&thread, |_, stack| stack.len()).unwrap_or(0)
    }

    /// How many threads have at least one open session.
    pub(crate) fn thread_count(&self) -> usize {
        self.stacks.len()
    }

    pub(crate) fn clear(&self) {
        self.stacks.clear();
    }
}

impl fmt::Debug for ThreadStacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadStacks")
            .field("thread_count", &self.thread_count())
            .finish_non_exhaustive()
    }
}
