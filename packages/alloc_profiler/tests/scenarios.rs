//! End-to-end scenarios for session accounting across threads.

use std::sync::Barrier;
use std::thread;

use alloc_profiler::{Config, Engine, ReportFormat, ThreadKey};
use new_zealand::nz;

fn short_engine() -> Engine {
    Engine::new(Config::builder().format(ReportFormat::Short).build())
}

#[test]
fn owner_and_foreign_events_are_told_apart() {
    let engine = short_engine();

    engine.open("f1", None);
    engine.on_object_created(ThreadKey::current());
    thread::scope(|s| {
        s.spawn(|| engine.on_object_created(ThreadKey::current()));
    });
    engine.close();

    assert_eq!(engine.results(), vec!["f1;1;0;2;0"]);
}

#[test]
fn many_threads_with_overlapping_sessions() {
    const THREADS: usize = 20;
    const EVENTS_PER_THREAD: u64 = 100_000;

    let engine = short_engine();
    let all_open = Barrier::new(THREADS);
    let all_reported = Barrier::new(THREADS);

    thread::scope(|s| {
        for index in 0..THREADS {
            let engine = &engine;
            let all_open = &all_open;
            let all_reported = &all_reported;

            s.spawn(move || {
                let thread = ThreadKey::current();
                engine.open(&format!("worker{index}"), None);
                all_open.wait();

                for _ in 0..EVENTS_PER_THREAD {
                    engine.on_object_created(thread);
                }

                all_reported.wait();
                engine.close().unwrap();
            });
        }
    });

    let history = engine.history();
    assert_eq!(history.len(), THREADS);

    for session in history {
        let counts = session.counts();
        assert_eq!(counts.owner_objects(), EVENTS_PER_THREAD);
        assert_eq!(counts.global_objects(), EVENTS_PER_THREAD * THREADS as u64);
        assert_eq!(counts.owner_bytes(), 0);
        assert_eq!(counts.global_bytes(), 0);
    }
}

#[test]
fn close_without_open_leaves_other_threads_alone() {
    let engine = short_engine();
    let opened = Barrier::new(2);
    let stray_close_done = Barrier::new(2);

    thread::scope(|s| {
        s.spawn(|| {
            let session = engine.open("pending", None);
            opened.wait();
            stray_close_done.wait();

            assert!(!session.is_finished());
            engine.on_object_created(ThreadKey::current());
            engine.close().unwrap();

            assert_eq!(session.counts().owner_objects(), 1);
        });

        s.spawn(|| {
            opened.wait();
            assert!(engine.close().is_none());
            assert_eq!(engine.open_session_count(), 1);
            stray_close_done.wait();
        });
    });

    assert_eq!(engine.results(), vec!["pending;1;0;1;0"]);
}

#[test]
fn history_keeps_most_recent_sessions() {
    let engine = Engine::new(
        Config::builder()
            .format(ReportFormat::Short)
            .history_capacity(nz!(2))
            .build(),
    );

    for name in ["first", "second", "third"] {
        engine.open(name, None);
        engine.close();
    }

    assert_eq!(engine.results(), vec!["second;0;0;0;0", "third;0;0;0;0"]);
}

#[test]
fn history_keeps_at_most_capacity_sessions() {
    let engine = Engine::new(
        Config::builder()
            .format(ReportFormat::Short)
            .history_capacity(nz!(5))
            .build(),
    );

    for count in 1..=8 {
        engine.open(&format!("s{count}"), None);
        engine.close();

        assert_eq!(engine.history().len(), count.min(5));
    }

    let names: Vec<_> = engine
        .history()
        .iter()
        .map(|session| session.name().to_string())
        .collect();
    assert_eq!(names, vec!["s4", "s5", "s6", "s7", "s8"]);
}

#[test]
fn nested_sessions_on_one_thread() {
    let engine = short_engine();
    let here = ThreadKey::current();

    {
        let _outer = engine.scope("outer", None);
        engine.on_memory_allocated(here, 100);

        {
            let _inner = engine.scope("inner", None);
            engine.on_memory_allocated(here, 10);
        }

        engine.on_object_created(here);
    }

    // Inner closes first, so it is the older history entry.
    assert_eq!(engine.results(), vec!["inner;0;10;0;10", "outer;1;110;1;110"]);
}

#[test]
fn every_open_session_sees_every_event() {
    const SESSIONS: usize = 4;
    const EVENTS: u64 = 1_000;

    let engine = short_engine();
    let all_open = Barrier::new(SESSIONS + 1);
    let all_reported = Barrier::new(SESSIONS + 1);

    thread::scope(|s| {
        for index in 0..SESSIONS {
            let engine = &engine;
            let all_open = &all_open;
            let all_reported = &all_reported;

            s.spawn(move || {
                engine.open(&format!("s{index}"), None);
                all_open.wait();
                all_reported.wait();
                engine.close().unwrap();
            });
        }

        all_open.wait();
        let feeder = ThreadKey::current();
        for _ in 0..EVENTS {
            engine.on_memory_allocated(feeder, 3);
        }
        all_reported.wait();
    });

    for session in engine.history() {
        let counts = session.counts();
        assert_eq!(counts.owner_bytes(), 0);
        assert_eq!(counts.global_bytes(), EVENTS * 3);
    }
}

#[test]
fn events_after_close_are_not_counted() {
    let engine = short_engine();
    let here = ThreadKey::current();

    let session = engine.open("short_lived", None);
    engine.on_object_created(here);
    engine.close();

    engine.on_object_created(here);
    engine.on_memory_allocated(here, 512);

    assert_eq!(session.counts().owner_objects(), 1);
    assert_eq!(session.counts().global_bytes(), 0);
}

#[test]
fn reset_returns_engine_to_initial_state() {
    let engine = short_engine();
    engine.open("a", None);
    engine.close();
    engine.open("b", None);

    engine.reset();

    assert_eq!(engine.open_session_count(), 0);
    assert!(engine.results().is_empty());

    engine.open("c", None);
    engine.close();
    assert_eq!(engine.results(), vec!["c;0;0;0;0"]);
}

#[test]
fn external_thread_keys_do_not_alias_runtime_threads() {
    let engine = short_engine();

    // The value the next runtime-assigned key is most likely to carry.
    let external = ThreadKey::from_raw(ThreadKey::current().raw().wrapping_add(1));
    let session = engine.open_on(external, "external_job", None);

    let foreign = thread::scope(|s| {
        s.spawn(|| {
            let key = ThreadKey::current();
            engine.on_object_created(key);
            key
        })
        .join()
        .unwrap()
    });

    engine.close_on(external).unwrap();

    assert_ne!(foreign, external);
    assert_eq!(session.counts().owner_objects(), 0);
    assert_eq!(session.counts().global_objects(), 1);
}
