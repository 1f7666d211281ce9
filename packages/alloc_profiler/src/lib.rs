#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Allocation profiling for overlapping sessions on many threads.
//!
//! This package attributes object creations and memory allocations to profiling sessions. A
//! session covers one execution of an observed operation (a method call, a request handler)
//! from the moment it is opened until it is closed on the same thread. While it is open, the
//! session counts every reported event twice:
//!
//! * **Owner counters** count events that happened on the thread that opened the session.
//! * **Global counters** count events that happened on any thread.
//!
//! Any number of sessions may be open at once, nested on one thread or spread across many.
//! Every event is added to every session that is open at the moment it is reported.
//!
//! The core types are:
//! - [`Engine`] - opens and closes sessions, receives events and renders reports
//! - [`Session`] - one profiled execution, with its name, timing and counters
//! - [`SessionScope`] - closes a session when dropped, on every exit path
//! - [`Config`] - history size, output format, result sink and diagnostic logging
//! - [`Report`] - the rendered results of the most recently finished sessions
//!
//! The package does not intercept allocations by itself. An instrumentation layer (a custom
//! global allocator, a tracing hook, manual calls) reports events via
//! [`Engine::on_object_created()`] and [`Engine::on_memory_allocated()`].
//!
//! # Example
//!
//! ```
//! use alloc_profiler::{Config, Engine, ThreadKey};
//!
//! let config: Config = "hist:10,short:true".parse().unwrap();
//! let engine = Engine::new(config);
//!
//! {
//!     let _scope = engine.scope("orders.handle", None);
//!
//!     engine.on_object_created(ThreadKey::current());
//!     engine.on_memory_allocated(ThreadKey::current(), 64);
//! }
//!
//! assert_eq!(engine.results(), vec!["orders.handle;1;64;1;64".to_string()]);
//! ```
//!
//! # Serving reports
//!
//! Applications that handle HTTP requests can expose the report by asking the engine to handle
//! every incoming request first. Requests whose URL ends with `profiler` are answered with the
//! bulk report; see [`Engine::try_serve()`].
//!
//! # Diagnostics
//!
//! Profiler misuse, such as closing a session that was never opened, and output failures never
//! surface as errors or panics. They are reported via `tracing`; [`init_logging()`] installs a
//! subscriber for them if the application does not have its own.

mod config;
mod constants;
mod dispatch;
mod engine;
mod error;
mod fanout;
mod history;
mod logging;
mod naming;
mod pal;
mod registry;
mod report;
mod scope;
mod session;
mod sink;
mod stacks;
mod thread_key;

pub use config::*;
pub use constants::*;
pub use dispatch::ReportResponse;
pub use engine::Engine;
pub use error::Error;
pub use logging::init_logging;
pub use naming::RequestUrl;
pub use report::*;
pub use scope::SessionScope;
pub use session::{Session, SessionCounts, SessionId};
pub use sink::ResultSink;
pub use thread_key::ThreadKey;

pub(crate) use error::Result;
pub(crate) use history::HistoryBuffer;
pub(crate) use registry::ActiveRegistry;
pub(crate) use sink::ResultWriter;
pub(crate) use stacks::ThreadStacks;
