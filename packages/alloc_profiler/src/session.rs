//! Profiling sessions and the allocation counters they accumulate.

use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{self, AtomicU64};
use std::time::{Duration, Instant};

use crate::ThreadKey;

/// Identifies one session within the engine that created it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value of the identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The live counters of a session, updated concurrently by the event fanout.
///
/// Every update is an independent atomic add. The owner counters are published after the
/// global ones with release ordering and read first with acquire ordering, so a snapshot
/// never observes more owner activity than global activity.
#[derive(Debug)]
pub(crate) struct SessionCounters {
    owner_objects: AtomicU64,
    owner_bytes: AtomicU64,
    global_objects: AtomicU64,
    global_bytes: AtomicU64,
}

impl SessionCounters {
    const fn new() -> Self {
        Self {
            owner_objects: AtomicU64::new(0),
            owner_bytes: AtomicU64::new(0),
            global_objects: AtomicU64::new(0),
            global_bytes: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn record_objects(&self, count: u64, on_owner_thread: bool) {
        self.global_objects.fetch_add(count, atomic::Ordering::Relaxed);

        if on_owner_thread {
            self.owner_objects.fetch_add(count, atomic::Ordering::Release);
        }
    }

    #[inline]
    pub(crate) fn record_bytes(&self, bytes: u64, on_owner_thread: bool) {
        self.global_bytes.fetch_add(bytes, atomic::Ordering::Relaxed);

        if on_owner_thread {
            self.owner_bytes.fetch_add(bytes, atomic::Ordering::Release);
        }
    }

    fn snapshot(&self) -> SessionCounts {
        let owner_objects = self.owner_objects.load(atomic::Ordering::Acquire);
        let owner_bytes = self.owner_bytes.load(atomic::Ordering::Acquire);

        SessionCounts {
            owner_objects,
            owner_bytes,
            global_objects: self.global_objects.load(atomic::Ordering::Relaxed),
            global_bytes: self.global_bytes.load(atomic::Ordering::Relaxed),
        }
    }
}

/// Point-in-time values of the counters of a [`Session`].
///
/// "Owner" values only include events raised on the thread that opened the session,
/// "global" values include events raised on any thread while the session was open.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SessionCounts {
    owner_objects: u64,
    owner_bytes: u64,
    global_objects: u64,
    global_bytes: u64,
}

impl SessionCounts {
    /// Objects created on the owner thread.
    #[must_use]
    pub fn owner_objects(&self) -> u64 {
        self.owner_objects
    }

    /// Bytes allocated on the owner thread.
    #[must_use]
    pub fn owner_bytes(&self) -> u64 {
        self.owner_bytes
    }

    /// Objects created on any thread.
    #[must_use]
    pub fn global_objects(&self) -> u64 {
        self.global_objects
    }

    /// Bytes allocated on any thread.
    #[must_use]
    pub fn global_bytes(&self) -> u64 {
        self.global_bytes
    }
}

#[derive(Debug)]
struct Finish {
    at: Instant,
    counts: SessionCounts,
}

/// One profiling instance, spanning a matched open/close pair on one thread.
///
/// The identity of a session (name, owner thread, start time) never changes after creation.
/// While open, the session is visible to the event fanout and its counters only move forward.
/// Once closed, the counters are frozen and every later read returns the values captured at
/// the moment of closing.
///
/// # Examples
///
/// ```
/// use alloc_profiler::{Config, Engine, ReportFormat, ThreadKey};
///
/// let engine = Engine::new(Config::builder().format(ReportFormat::Short).build());
///
/// let session = engine.open("my.app.work", None);
/// engine.on_object_created(ThreadKey::current());
/// engine.close();
///
/// assert!(session.is_finished());
/// assert_eq!(session.counts().owner_objects(), 1);
/// ```
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    name: String,
    owner: ThreadKey,
    started_at: Instant,
    finish: OnceLock<Finish>,
    counters: SessionCounters,
}

impl Session {
    pub(crate) fn new(id: SessionId, name: String, owner: ThreadKey) -> Self {
        Self {
            id,
            name,
            owner,
            started_at: Instant::now(),
            finish: OnceLock::new(),
            counters: SessionCounters::new(),
        }
    }

    /// The engine-unique identifier of the session.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The display name, resolved once when the session was opened.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The thread that opened the session.
    #[must_use]
    pub fn owner(&self) -> ThreadKey {
        self.owner
    }

    /// When the session was opened.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// When the session was closed, if it has been closed.
    #[must_use]
    pub fn finished_at(&self) -> Option<Instant> {
        self.finish.get().map(|finish| finish.at)
    }

    /// Whether the session has been closed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finish.get().is_some()
    }

    /// Time between open and close. Zero while the session is still open.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.finished_at().map_or(Duration::ZERO, |finished_at| {
            finished_at.saturating_duration_since(self.started_at)
        })
    }

    /// The counter values of the session.
    ///
    /// For an open session this is a live snapshot; for a closed one it is the frozen result.
    #[must_use]
    pub fn counts(&self) -> SessionCounts {
        self.finish
            .get()
            .map_or_else(|| self.counters.snapshot(), |finish| finish.counts)
    }

    #[inline]
    pub(crate) fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    /// Stamps the finish time and freezes the counters.
    ///
    /// Returns `false` if the session had already been finished, in which case nothing changes.
    pub(crate) fn finish(&self) -> bool {
        self.finish
            .set(Finish {
                at: Instant::now(),
                counts: self.counters.snapshot(),
            })
            .is_ok()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::thread;

    use super::*;

    fn session() -> Session {
        Session::new(SessionId::new(1), "test".to_string(), ThreadKey::from_raw(1))
    }

    static_assertions::assert_impl_all!(Session: Send, Sync);
    static_assertions::assert_impl_all!(SessionCounts: Send, Sync, Copy);

    #[test]
    fn new_session_is_open_and_empty() {
        let session = session();

        assert!(!session.is_finished());
        assert_eq!(session.elapsed(), Duration::ZERO);
        assert_eq!(session.finished_at(), None);
        assert_eq!(session.counts(), SessionCounts::default());
    }

    #[test]
    fn owner_events_count_towards_both_scopes() {
        let session = session();

        session.counters().record_objects(1, true);
        session.counters().record_bytes(64, true);

        let counts = session.counts();
        assert_eq!(counts.owner_objects(), 1);
        assert_eq!(counts.owner_bytes(), 64);
        assert_eq!(counts.global_objects(), 1);
        assert_eq!(counts.global_bytes(), 64);
    }

    #[test]
    fn foreign_events_count_towards_global_only() {
        let session = session();

        session.counters().record_objects(3, false);
        session.counters().record_bytes(100, false);

        let counts = session.counts();
        assert_eq!(counts.owner_objects(), 0);
        assert_eq!(counts.owner_bytes(), 0);
        assert_eq!(counts.global_objects(), 3);
        assert_eq!(counts.global_bytes(), 100);
    }

    #[test]
    fn live_snapshot_never_shows_more_owner_than_global_activity() {
        const WRITERS: usize = 4;
        const EVENTS_PER_WRITER: u64 = 50_000;

        let session = session();
        let writers_done = AtomicBool::new(false);

        thread::scope(|s| {
            let reader = s.spawn(|| {
                let mut snapshots = 0_u64;

                loop {
                    let done = writers_done.load(atomic::Ordering::Acquire);

                    let counts = session.counts();
                    assert!(counts.owner_objects() <= counts.global_objects());
                    assert!(counts.owner_bytes() <= counts.global_bytes());
                    snapshots = snapshots.wrapping_add(1);

                    if done {
                        break;
                    }
                }

                snapshots
            });

            let writers: Vec<_> = (0..WRITERS)
                .map(|index| {
                    let session = &session;
                    s.spawn(move || {
                        let on_owner_thread = index % 2 == 0;

                        for _ in 0..EVENTS_PER_WRITER {
                            session.counters().record_objects(1, on_owner_thread);
                            session.counters().record_bytes(16, on_owner_thread);
                        }
                    })
                })
                .collect();

            for writer in writers {
                writer.join().unwrap();
            }

            writers_done.store(true, atomic::Ordering::Release);
            assert!(reader.join().unwrap() > 0);
        });

        let counts = session.counts();
        assert_eq!(counts.owner_objects(), EVENTS_PER_WRITER * 2);
        assert_eq!(counts.global_objects(), EVENTS_PER_WRITER * 4);
    }

    #[test]
    fn finish_freezes_counts() {
        let session = session();
        session.counters().record_objects(2, true);

        assert!(session.finish());

        // Late fanout visits may still reach the live counters after closing.
        session.counters().record_objects(5, true);

        assert_eq!(session.counts().owner_objects(), 2);
        assert_eq!(session.counts().global_objects(), 2);
    }

    #[test]
    fn finish_only_takes_effect_once() {
        let session = session();

        assert!(session.finish());
        let first = session.finished_at();

        assert!(!session.finish());
        assert_eq!(session.finished_at(), first);
    }

    #[test]
    fn finished_session_reports_non_negative_elapsed() {
        let session = session();
        session.finish();

        assert!(session.is_finished());
        assert!(session.finished_at().unwrap() >= session.started_at());
    }

    #[test]
    fn session_id_display() {
        assert_eq!(SessionId::new(12).to_string(), "#12");
        assert_eq!(SessionId::new(12).as_u64(), 12);
    }
}
