//! Identity of the threads that open sessions and raise allocation events.

use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{self, AtomicU64};

// Zero is reserved to mean "not yet assigned" in the thread-local cache below.
static NEXT_THREAD_KEY: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_THREAD_KEY: Cell<u64> = const { Cell::new(0) };
}

/// Identifies the thread that opened a session or raised an allocation event.
///
/// There are two disjoint kinds of keys, which never compare equal to each other even when
/// their numeric values match:
///
/// * Keys obtained via [`ThreadKey::current()`] are assigned by the profiler and are unique for
///   the lifetime of the process.
/// * Keys supplied by the caller via [`ThreadKey::from_raw()`] come from an external runtime.
///   They must be unique among concurrently live threads of that runtime but may be reused
///   after a thread terminates.
///
/// # Examples
///
/// ```
/// use alloc_profiler::ThreadKey;
///
/// let here = ThreadKey::current();
/// assert_eq!(here, ThreadKey::current());
///
/// let elsewhere = std::thread::spawn(ThreadKey::current).join().unwrap();
/// assert_ne!(here, elsewhere);
///
/// // Caller-supplied identifiers never alias profiler-assigned ones.
/// assert_ne!(ThreadKey::from_raw(here.raw()), here);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ThreadKey(Source);

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
enum Source {
    Runtime(u64),
    External(u64),
}

impl ThreadKey {
    /// Returns the key of the calling thread, assigning one on first use.
    #[must_use]
    #[inline]
    pub fn current() -> Self {
        CURRENT_THREAD_KEY.with(|cached| {
            let key = cached.get();

            if key != 0 {
                return Self(Source::Runtime(key));
            }

            let key = NEXT_THREAD_KEY.fetch_add(1, atomic::Ordering::Relaxed);
            cached.set(key);
            Self(Source::Runtime(key))
        })
    }

    /// Wraps an identifier supplied by the caller, such as one issued by an external runtime.
    #[must_use]
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(Source::External(raw))
    }

    /// Returns the numeric value of the key within its own kind.
    #[must_use]
    #[inline]
    pub const fn raw(self) -> u64 {
        match self.0 {
            Source::Runtime(raw) | Source::External(raw) => raw,
        }
    }

    /// Whether the key was supplied by the caller via [`ThreadKey::from_raw()`].
    #[must_use]
    #[inline]
    pub const fn is_external(self) -> bool {
        matches!(self.0, Source::External(_))
    }
}

impl fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Source::Runtime(raw) => write!(f, "{raw}"),
            Source::External(raw) => write!(f, "ext:{raw}"),
        }
    }
}
