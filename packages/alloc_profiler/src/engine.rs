//! The profiling engine that ties sessions, events, history and reporting together.

use std::num::NonZero;
use std::sync::Arc;
use std::sync::atomic::{self, AtomicU64};

#[cfg(test)]
use crate::pal::OutputFacade;
use crate::{
    ActiveRegistry, Config, Error, HistoryBuffer, Report, ReportFormat, ReportResponse,
    RequestUrl, ResultSink, ResultWriter, Session, SessionId, SessionScope, ThreadKey,
    ThreadStacks, dispatch, fanout, naming,
};

/// Tracks allocation activity for any number of overlapping profiling sessions on any number
/// of threads.
///
/// Instrumentation opens a session when an observed operation starts and closes it when the
/// operation ends. Sessions nest on a thread in LIFO order. An allocation feed reports every
/// observed object creation and memory allocation, from whichever thread it happens on, and
/// the engine adds it to every session that is open at that moment. Closed sessions go into a
/// bounded history from which reports are rendered.
///
/// None of the session or event operations ever fail or panic because of profiler misuse or
/// output problems: such problems are logged via `tracing` and the operation degrades to a
/// no-op for the affected part.
///
/// # Examples
///
/// ```
/// use std::thread;
///
/// use alloc_profiler::{Config, Engine, ReportFormat, ThreadKey};
///
/// let engine = Engine::new(Config::builder().format(ReportFormat::Short).build());
///
/// engine.open("f1", None);
/// engine.on_object_created(ThreadKey::current());
/// thread::scope(|s| {
///     s.spawn(|| engine.on_object_created(ThreadKey::current()));
/// });
/// engine.close();
///
/// assert_eq!(engine.results(), vec!["f1;1;0;2;0".to_string()]);
/// ```
#[derive(Debug)]
pub struct Engine {
    format: ReportFormat,
    next_session_id: AtomicU64,

    stacks: ThreadStacks,
    registry: ActiveRegistry,
    history: HistoryBuffer,
    writer: ResultWriter,
}

impl Engine {
    /// Creates an engine with the given configuration and no open sessions.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_writer(&config, ResultWriter::new(config.result_sink().clone()))
    }

    #[cfg(test)]
    pub(crate) fn with_output(config: &Config, output: OutputFacade) -> Self {
        Self::with_writer(
            config,
            ResultWriter::with_output(config.result_sink().clone(), output),
        )
    }

    fn with_writer(config: &Config, writer: ResultWriter) -> Self {
        Self {
            format: config.format(),
            next_session_id: AtomicU64::new(0),
            stacks: ThreadStacks::new(),
            registry: ActiveRegistry::new(),
            history: HistoryBuffer::new(config.history_capacity()),
            writer,
        }
    }

    /// Opens a session on the calling thread.
    ///
    /// `name` identifies the observed operation. If `hint` is provided and exposes a request
    /// URL, the URL is used as the session name instead.
    ///
    /// The returned handle can be used to inspect the session; the session stays open until
    /// [`close()`](Self::close) is called on the same thread, regardless of what happens to
    /// the handle.
    pub fn open(&self, name: &str, hint: Option<&dyn RequestUrl>) -> Arc<Session> {
        self.open_on(ThreadKey::current(), name, hint)
    }

    /// Opens a session on behalf of the thread identified by `thread`.
    pub fn open_on(
        &self,
        thread: ThreadKey,
        name: &str,
        hint: Option<&dyn RequestUrl>,
    ) -> Arc<Session> {
        let id = SessionId::new(self.next_session_id.fetch_add(1, atomic::Ordering::Relaxed));
        let name = naming::session_name(name, hint, self.format);
        let session = Arc::new(Session::new(id, name, thread));

        self.stacks.push(thread, Arc::clone(&session));
        self.registry.register(Arc::clone(&session));

        tracing::info!(
            session = %session.id(),
            name = session.name(),
            %thread,
            "profiling session opened"
        );

        session
    }

    /// Opens a session on the calling thread that is closed when the returned scope is dropped.
    pub fn scope(&self, name: &str, hint: Option<&dyn RequestUrl>) -> SessionScope<'_> {
        let thread = ThreadKey::current();
        let session = self.open_on(thread, name, hint);
        SessionScope::new(self, thread, session)
    }

    /// Closes the innermost open session of the calling thread.
    ///
    /// The session stops receiving events, its counters are frozen, it is added to the history
    /// and its result is written to the configured sink.
    ///
    /// Returns the closed session, or `None` if the thread has no open session. The latter is
    /// logged as an error and otherwise has no effect.
    pub fn close(&self) -> Option<Arc<Session>> {
        self.close_on(ThreadKey::current())
    }

    /// Closes the innermost open session of the thread identified by `thread`.
    pub fn close_on(&self, thread: ThreadKey) -> Option<Arc<Session>> {
        let Some(session) = self.stacks.pop(thread) else {
            let error = Error::UnbalancedClose { thread };
            tracing::error!(%error, "ignoring close request");
            return None;
        };

        self.registry.unregister(session.id());
        session.finish();
        self.history.append(Arc::clone(&session));

        let line = session.render(self.format);
        self.writer.write_line(&line);

        if matches!(self.writer.sink(), ResultSink::File(_)) {
            self.writer.write_report(|| self.report().to_string());
        }

        tracing::info!(session = %session.id(), result = %line, "profiling session closed");

        Some(session)
    }

    /// Records the creation of one object on the thread identified by `thread`.
    ///
    /// Every open session counts the object globally; sessions opened by `thread` also count
    /// it as their own.
    #[inline]
    pub fn on_object_created(&self, thread: ThreadKey) {
        fanout::objects_created(&self.registry, thread, 1);
    }

    /// Records the allocation of `bytes` bytes of memory on the thread identified by `thread`.
    ///
    /// Every open session counts the bytes globally; sessions opened by `thread` also count
    /// them as their own.
    #[inline]
    pub fn on_memory_allocated(&self, thread: ThreadKey, bytes: u64) {
        fanout::memory_allocated(&self.registry, thread, bytes);
    }

    /// How many sessions are currently open across all threads.
    #[must_use]
    pub fn open_session_count(&self) -> usize {
        self.registry.len()
    }

    /// How many sessions the thread identified by `thread` currently has open.
    #[must_use]
    pub fn open_depth(&self, thread: ThreadKey) -> usize {
        self.stacks.depth(thread)
    }

    /// The finished sessions kept for reporting, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Arc<Session>> {
        self.history.snapshot()
    }

    /// Renders the finished sessions kept for reporting.
    #[must_use]
    pub fn report(&self) -> Report {
        Report::from_sessions(&self.history.snapshot(), self.format)
    }

    /// Renders the finished sessions kept for reporting, one string per session, oldest first,
    /// without writing them anywhere.
    #[must_use]
    pub fn results(&self) -> Vec<String> {
        self.report().into_lines()
    }

    /// Writes the bulk report to the configured sink.
    pub fn print_results(&self) {
        self.writer.write_report(|| self.report().to_string());
    }

    /// Answers a request for the profiling report.
    ///
    /// If the URL of `request` ends with `profiler`, writes the bulk report to the body of
    /// `response`, sets a success status and returns `true`; the caller must then skip its own
    /// handling of the request. Otherwise returns `false` and leaves the status of `response`
    /// untouched. If writing the body fails, the response may hold part of the report.
    ///
    /// # Examples
    ///
    /// ```
    /// use alloc_profiler::{Config, Engine};
    /// use http::{Request, Response, StatusCode};
    ///
    /// let engine = Engine::new(Config::default());
    ///
    /// let request = Request::get("http://localhost:8080/app/profiler").body(()).unwrap();
    /// let mut response = Response::new(Vec::new());
    ///
    /// assert!(engine.try_serve(&request, &mut response));
    /// assert_eq!(response.status(), StatusCode::OK);
    /// ```
    pub fn try_serve(&self, request: &dyn RequestUrl, response: &mut dyn ReportResponse) -> bool {
        dispatch::try_serve(request, response, || self.report())
    }

    /// Changes how many finished sessions are kept, evicting the oldest ones immediately if
    /// more than the new capacity are currently kept.
    pub fn set_history_capacity(&self, capacity: NonZero<usize>) {
        self.history.set_capacity(capacity);
    }

    /// How many finished sessions are kept for reporting.
    #[must_use]
    pub fn history_capacity(&self) -> NonZero<usize> {
        self.history.capacity()
    }

    /// Forgets all open and finished sessions, returning the engine to its initial state.
    ///
    /// Intended for test harnesses that reuse one engine across tests. Must not be called while
    /// other threads are opening or closing sessions on this engine.
    pub fn reset(&self) {
        self.registry.clear();
        self.stacks.clear();
        self.history.clear();

        tracing::debug!("profiling engine reset");
    }
}
