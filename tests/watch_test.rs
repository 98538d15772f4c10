//! Observer Integration Tests
//!
//! Tests for watch/dispose behavior:
//! - Exactly-once notification per distinct value
//! - Ancestor and descendant changes
//! - Bulk operations and reload
//! - Disposal, including from inside a handler
//! - Handler isolation

mod common;

use common::{TestFixture, recorder};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn test_equal_value_fires_once() {
    let fixture = TestFixture::new();
    let (seen, handler) = recorder();
    let _observer = fixture.store.watch("x", handler).unwrap();

    fixture.store.set("x", 1).unwrap();
    fixture.store.set("x", 1).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![(Some(json!(1)), None)]);
}

#[test]
fn test_old_and_new_values_track_history() {
    let fixture = TestFixture::new();
    let (seen, handler) = recorder();
    fixture.store.watch("level", handler).unwrap();

    fixture.store.set("level", 1).unwrap();
    fixture.store.set("level", 2).unwrap();
    fixture.store.delete("level").unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (Some(json!(1)), None),
            (Some(json!(2)), Some(json!(1))),
            (None, Some(json!(2))),
        ]
    );
}

#[test]
fn test_descendant_change_notifies_ancestor_watcher() {
    let fixture = TestFixture::new();
    fixture.store.set("ui.theme", "light").unwrap();

    let (seen, handler) = recorder();
    fixture.store.watch("ui", handler).unwrap();

    fixture.store.set("ui.font_size", 12).unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![(
            Some(json!({"theme": "light", "font_size": 12})),
            Some(json!({"theme": "light"}))
        )]
    );
}

#[test]
fn test_ancestor_change_notifies_descendant_watcher() {
    let fixture = TestFixture::new();
    fixture.store.set("ui.theme", "light").unwrap();

    let (seen, handler) = recorder();
    fixture.store.watch("ui.theme", handler).unwrap();

    fixture.store.set("ui", json!({"theme": "dark"})).unwrap();
    fixture.store.delete("ui").unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (Some(json!("dark")), Some(json!("light"))),
            (None, Some(json!("dark"))),
        ]
    );
}

#[test]
fn test_sibling_change_is_silent() {
    let fixture = TestFixture::new();
    let (seen, handler) = recorder();
    fixture.store.watch("a.b", handler).unwrap();

    fixture.store.set("a.c", 1).unwrap();
    fixture.store.set("z", 1).unwrap();

    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_default_from_get_notifies() {
    let fixture = TestFixture::new();
    let (seen, handler) = recorder();
    fixture.store.watch("zoom", handler).unwrap();

    fixture.store.get("zoom", Some(json!(1.5))).unwrap();
    fixture.store.get("zoom", Some(json!(3.0))).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![(Some(json!(1.5)), None)]);
}

#[test]
fn test_set_all_notifies_only_changed_paths() {
    let fixture = TestFixture::new();
    fixture
        .store
        .set_all(json!({"same": 1, "changed": 1, "removed": 1}))
        .unwrap();

    let (same, same_handler) = recorder();
    let (changed, changed_handler) = recorder();
    let (removed, removed_handler) = recorder();
    fixture.store.watch("same", same_handler).unwrap();
    fixture.store.watch("changed", changed_handler).unwrap();
    fixture.store.watch("removed", removed_handler).unwrap();

    fixture
        .store
        .set_all(json!({"same": 1, "changed": 2}))
        .unwrap();

    assert!(same.lock().unwrap().is_empty());
    assert_eq!(*changed.lock().unwrap(), vec![(Some(json!(2)), Some(json!(1)))]);
    assert_eq!(*removed.lock().unwrap(), vec![(None, Some(json!(1)))]);
}

#[test]
fn test_delete_all_notifies_every_present_path() {
    let fixture = TestFixture::new();
    fixture.store.set("a", 1).unwrap().set("b", 2).unwrap();

    let (a, a_handler) = recorder();
    let (missing, missing_handler) = recorder();
    fixture.store.watch("a", a_handler).unwrap();
    fixture.store.watch("never.set", missing_handler).unwrap();

    fixture.store.delete_all().unwrap();

    assert_eq!(*a.lock().unwrap(), vec![(None, Some(json!(1)))]);
    // Absent before and after: nothing changed
    assert!(missing.lock().unwrap().is_empty());
}

#[test]
fn test_reload_notifies_external_changes() {
    let fixture = TestFixture::new();
    fixture.store.set("remote", "old").unwrap();

    let (seen, handler) = recorder();
    fixture.store.watch("remote", handler).unwrap();

    fixture.write_raw(r#"{"remote": "new"}"#);
    // Memory stays authoritative until an explicit reload
    assert_eq!(fixture.store.get("remote", None).unwrap(), Some(json!("old")));
    assert!(seen.lock().unwrap().is_empty());

    fixture.store.reload().unwrap();

    assert_eq!(fixture.store.get("remote", None).unwrap(), Some(json!("new")));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(Some(json!("new")), Some(json!("old")))]
    );
}

#[test]
fn test_dispose_stops_notifications() {
    let fixture = TestFixture::new();
    let (seen, handler) = recorder();
    let observer = fixture.store.watch("x", handler).unwrap();

    fixture.store.set("x", 1).unwrap();
    observer.dispose();
    observer.dispose();
    fixture.store.set("x", 2).unwrap();

    assert_eq!(seen.lock().unwrap().len(), 1);
    assert!(!observer.is_active());
    assert_eq!(fixture.store.observer_count(), 0);
}

#[test]
fn test_dispose_one_leaves_others() {
    let fixture = TestFixture::new();
    let (first, first_handler) = recorder();
    let (second, second_handler) = recorder();
    let first_observer = fixture.store.watch("x", first_handler).unwrap();
    let _second_observer = fixture.store.watch("x", second_handler).unwrap();

    first_observer.dispose();
    fixture.store.set("x", true).unwrap();

    assert!(first.lock().unwrap().is_empty());
    assert_eq!(second.lock().unwrap().len(), 1);
}

#[test]
fn test_dispose_inside_handler() {
    let fixture = TestFixture::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let observer = fixture
        .store
        .watch("x", move |event| {
            counter.fetch_add(1, Ordering::SeqCst);
            event.observer().dispose();
        })
        .unwrap();

    fixture.store.set("x", 1).unwrap();
    fixture.store.set("x", 2).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!observer.is_active());
}

#[test]
fn test_panicking_handler_is_isolated() {
    let fixture = TestFixture::new();
    fixture
        .store
        .watch("x", |_| panic!("handler exploded"))
        .unwrap();
    let (seen, handler) = recorder();
    fixture.store.watch("x", handler).unwrap();

    fixture.store.set("x", 1).unwrap();
    fixture.store.set("x", 2).unwrap();

    assert_eq!(seen.lock().unwrap().len(), 2);
    // Store still usable
    assert_eq!(fixture.store.get("x", None).unwrap(), Some(json!(2)));
}

#[test]
fn test_handlers_run_in_registration_order() {
    let fixture = TestFixture::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    for name in ["first", "second", "third"] {
        let order = Arc::clone(&order);
        fixture
            .store
            .watch("k", move |_| order.lock().unwrap().push(name))
            .unwrap();
    }

    fixture.store.set("k", 1).unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
}

#[test]
fn test_event_exposes_key_path() {
    let fixture = TestFixture::new();
    let seen = Arc::new(Mutex::new(String::new()));
    let sink = Arc::clone(&seen);

    fixture
        .store
        .watch(r"hosts.a\.b", move |event| {
            *sink.lock().unwrap() = event.key_path().to_string();
        })
        .unwrap();
    fixture.store.set(r"hosts.a\.b", 1).unwrap();

    assert_eq!(*seen.lock().unwrap(), r"hosts.a\.b");
}

#[test]
fn test_reentrant_write_reaches_later_observers_in_order() {
    let fixture = TestFixture::new();
    let store = Arc::new(fixture.reopen());
    let inner = Arc::clone(&store);

    // First observer bumps 1 to 2 from inside its handler
    let (first, first_handler) = recorder();
    store
        .watch("a", move |event| {
            first_handler(event);
            if event.new_value() == Some(&json!(1)) {
                inner.set("a", 2).unwrap();
            }
        })
        .unwrap();
    let (second, second_handler) = recorder();
    store.watch("a", second_handler).unwrap();

    store.set("a", 1).unwrap();

    assert_eq!(store.get("a", None).unwrap(), Some(json!(2)));
    let expected = vec![(Some(json!(1)), None), (Some(json!(2)), Some(json!(1)))];
    assert_eq!(*first.lock().unwrap(), expected);
    assert_eq!(*second.lock().unwrap(), expected);

    // Last-seen values match the document, so an equal write stays silent
    store.set("a", 2).unwrap();
    assert_eq!(second.lock().unwrap().len(), 2);

    store.unwatch_all();
}
