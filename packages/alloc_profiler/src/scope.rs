//! Scoped sessions that close themselves on every exit path.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::{Engine, Session, ThreadKey};

/// An open session that is closed when the scope is dropped.
///
/// This is what instrumentation wraps around an observed call: the session closes on normal
/// return, early return and unwinding alike. Scopes on one thread must be dropped in the
/// reverse order of their creation, which Rust guarantees for scopes held in local variables.
///
/// # Examples
///
/// ```
/// use alloc_profiler::{Config, Engine, ThreadKey};
///
/// let engine = Engine::new(Config::default());
///
/// fn handle_order(engine: &Engine) {
///     let _scope = engine.scope("shop.orders.handle", None);
///     engine.on_object_created(ThreadKey::current());
/// } // Session is closed here.
///
/// handle_order(&engine);
/// assert_eq!(engine.history().len(), 1);
/// ```
#[derive(Debug)]
#[must_use = "The session is closed when the scope is dropped"]
pub struct SessionScope<'e> {
    engine: &'e Engine,
    thread: ThreadKey,
    session: Arc<Session>,

    _single_threaded: PhantomData<*const ()>,
}

impl<'e> SessionScope<'e> {
    pub(crate) fn new(engine: &'e Engine, thread: ThreadKey, session: Arc<Session>) -> Self {
        Self {
            engine,
            thread,
            session,
            _single_threaded: PhantomData,
        }
    }

    /// The session this scope keeps open.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }
}

impl Drop for SessionScope<'_> {
    fn drop(&mut self) {
        self.engine.close_on(self.thread);
    }
}
