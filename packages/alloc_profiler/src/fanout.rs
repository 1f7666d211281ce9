//! Routes allocation events into the counters of every open session.
//!
//! These functions sit on the allocation hot path. When no session is open they return after a
//! single atomic load; otherwise they visit the open sessions and perform independent atomic adds
//! on each, without any lock that spans more than one bucket of the registry.

use crate::{ActiveRegistry, ThreadKey};

/// Counts `count` created objects raised on `thread` towards every open session.
#[inline]
pub(crate) fn objects_created(registry: &ActiveRegistry, thread: ThreadKey, count: u64) {
    if registry.is_empty() {
        return;
    }

    registry.for_each_open(|session| {
        session
            .counters()
            .record_objects(count, session.owner() == thread);
    });
}

/// Counts `bytes` allocated on `thread` towards every open session.
#[inline]
pub(crate) fn memory_allocated(registry: &ActiveRegistry, thread: ThreadKey, bytes: u64) {
    if registry.is_empty() {
        return;
    }

    registry.for_each_open(|session| {
        session
            .counters()
            .record_bytes(bytes, session.owner() == thread);
    });
}
