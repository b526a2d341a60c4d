//! Mutating the manager from inside callbacks

use super::{entries, keyboard, new_log, recorder, running_scene};
use crate::events::{Event, EventKey, EventListener, ListenerId};
use std::cell::Cell;
use std::rc::Rc;

type Slot = Rc<Cell<Option<ListenerId>>>;

fn slot() -> Slot {
    Rc::new(Cell::new(None))
}

#[test]
fn test_self_removal_keeps_walk_stable() {
    let (mut events, _) = running_scene();
    let log = new_log();
    let own_id = slot();

    events.register(EventListener::keyboard(recorder(&log, "one")), 1).unwrap();
    let callback_log = Rc::clone(&log);
    let callback_id = Rc::clone(&own_id);
    let two = events
        .register(
            EventListener::keyboard(move |events, _| {
                callback_log.borrow_mut().push("two");
                if let Some(id) = callback_id.get() {
                    events.remove(id);
                }
            }),
            2,
        )
        .unwrap();
    own_id.set(Some(two));
    events.register(EventListener::keyboard(recorder(&log, "three")), 3).unwrap();

    events.dispatch(&mut keyboard()).unwrap();
    assert_eq!(entries(&log), vec!["one", "two", "three"]);
    assert!(!events.is_registered(two));
    assert_eq!(events.bucket(&EventKey::Keyboard).unwrap().len(), 2);

    log.borrow_mut().clear();
    events.dispatch(&mut keyboard()).unwrap();
    assert_eq!(entries(&log), vec!["one", "three"]);
}

#[test]
fn test_removing_later_listener_skips_it() {
    let (mut events, _) = running_scene();
    let log = new_log();
    let target = slot();

    let callback_log = Rc::clone(&log);
    let callback_target = Rc::clone(&target);
    events
        .register(
            EventListener::keyboard(move |events, _| {
                callback_log.borrow_mut().push("a");
                if let Some(id) = callback_target.get() {
                    events.remove(id);
                }
            }),
            1,
        )
        .unwrap();
    let b = events.register(EventListener::keyboard(recorder(&log, "b")), 2).unwrap();
    target.set(Some(b));

    events.dispatch(&mut keyboard()).unwrap();
    assert_eq!(entries(&log), vec!["a"]);
    assert!(!events.is_registered(b));
}

#[test]
fn test_double_remove_is_a_no_op() {
    let (mut events, _) = running_scene();
    let log = new_log();
    let a = events.register(EventListener::keyboard(recorder(&log, "a")), 1).unwrap();
    events.register(EventListener::keyboard(recorder(&log, "b")), 2).unwrap();

    events.remove(a);
    events.remove(a);

    assert_eq!(events.listener_count(&EventKey::Keyboard), 1);
    events.dispatch(&mut keyboard()).unwrap();
    assert_eq!(entries(&log), vec!["b"]);
}

#[test]
fn test_registration_during_dispatch_waits_for_next_dispatch() {
    let (mut events, _) = running_scene();
    let log = new_log();
    let added = Rc::new(Cell::new(false));

    let callback_log = Rc::clone(&log);
    let late_log = Rc::clone(&log);
    let callback_added = Rc::clone(&added);
    events
        .register(
            EventListener::keyboard(move |events, _| {
                callback_log.borrow_mut().push("a");
                if !callback_added.replace(true) {
                    let late_log = Rc::clone(&late_log);
                    events
                        .register(EventListener::keyboard(move |_, _| late_log.borrow_mut().push("late")), 5)
                        .unwrap();
                    assert_eq!(events.listener_count(&EventKey::Keyboard), 3);
                }
            }),
            1,
        )
        .unwrap();
    events.register(EventListener::keyboard(recorder(&log, "b")), 2).unwrap();

    events.dispatch(&mut keyboard()).unwrap();
    assert_eq!(entries(&log), vec!["a", "b"]);

    log.borrow_mut().clear();
    events.dispatch(&mut keyboard()).unwrap();
    assert_eq!(entries(&log), vec!["a", "b", "late"]);
}

#[test]
fn test_removing_queued_listener_drops_it() {
    let (mut events, _) = running_scene();
    let log = new_log();

    let callback_log = Rc::clone(&log);
    events
        .register(
            EventListener::keyboard(move |events, _| {
                let queued = events
                    .register(EventListener::keyboard(recorder(&callback_log, "never")), 2)
                    .unwrap();
                events.remove(queued);
                assert!(!events.is_registered(queued));
            }),
            1,
        )
        .unwrap();

    events.dispatch(&mut keyboard()).unwrap();
    assert_eq!(events.listener_count(&EventKey::Keyboard), 1);
    events.dispatch(&mut keyboard()).unwrap();
    assert!(entries(&log).is_empty());
}

#[test]
fn test_nested_dispatch_reenters_running_listener() {
    let (mut events, _) = running_scene();
    let log = new_log();
    let pinged = Rc::new(Cell::new(false));

    let callback_log = Rc::clone(&log);
    let callback_pinged = Rc::clone(&pinged);
    events
        .add_custom_listener("ping", move |events, _| {
            callback_log.borrow_mut().push("a");
            assert!(events.is_dispatching());
            if !callback_pinged.replace(true) {
                events.dispatch_custom("ping", None).unwrap();
            }
        })
        .unwrap();
    events.register(EventListener::custom("ping", recorder(&log, "b")), 2).unwrap();

    events.dispatch_custom("ping", None).unwrap();

    // The inner dispatch reaches both listeners before the outer walk resumes.
    assert_eq!(entries(&log), vec!["a", "a", "b", "b"]);
    assert!(!events.is_dispatching());
    assert_eq!(events.listener_count(&EventKey::Custom("ping".to_string())), 2);
}

#[test]
fn test_nested_keyboard_dispatch_reaches_outer_listener() {
    let (mut events, _) = running_scene();
    let log = new_log();
    let depth = Rc::new(Cell::new(0));

    let callback_log = Rc::clone(&log);
    let callback_depth = Rc::clone(&depth);
    events
        .register(
            EventListener::keyboard(move |events, _| {
                callback_log.borrow_mut().push("a");
                if callback_depth.get() < 2 {
                    callback_depth.set(callback_depth.get() + 1);
                    events.dispatch(&mut Event::keyboard(13, false)).unwrap();
                }
            }),
            1,
        )
        .unwrap();

    events.dispatch(&mut keyboard()).unwrap();
    assert_eq!(entries(&log), vec!["a", "a", "a"]);
}

#[test]
fn test_nested_removal_compacts_after_outermost_dispatch() {
    let (mut events, _) = running_scene();
    let log = new_log();
    let target = slot();

    let inner_target = Rc::clone(&target);
    events
        .register(
            EventListener::custom("inner", move |events, _| {
                if let Some(id) = inner_target.get() {
                    events.remove(id);
                }
            }),
            1,
        )
        .unwrap();

    let callback_log = Rc::clone(&log);
    events
        .register(
            EventListener::keyboard(move |events, _| {
                callback_log.borrow_mut().push("a");
                events.dispatch_custom("inner", None).unwrap();
                // Still tombstoned: the outer keyboard walk is in flight.
                assert!(events.bucket(&EventKey::Keyboard).is_some_and(|bucket| bucket.len() == 2));
            }),
            1,
        )
        .unwrap();
    let b = events.register(EventListener::keyboard(recorder(&log, "b")), 2).unwrap();
    target.set(Some(b));

    events.dispatch(&mut keyboard()).unwrap();

    assert_eq!(entries(&log), vec!["a"]);
    assert_eq!(events.bucket(&EventKey::Keyboard).unwrap().len(), 1);
}

#[test]
fn test_priority_change_applies_to_next_dispatch() {
    let (mut events, _) = running_scene();
    let log = new_log();
    let target = slot();

    let callback_log = Rc::clone(&log);
    let callback_target = Rc::clone(&target);
    events
        .register(
            EventListener::keyboard(move |events, _| {
                callback_log.borrow_mut().push("a");
                if let Some(id) = callback_target.get() {
                    events.set_priority(id, -2).unwrap();
                }
            }),
            1,
        )
        .unwrap();
    let b = events.register(EventListener::keyboard(recorder(&log, "b")), 2).unwrap();
    target.set(Some(b));

    events.dispatch(&mut keyboard()).unwrap();
    assert_eq!(entries(&log), vec!["a", "b"]);

    log.borrow_mut().clear();
    events.dispatch(&mut keyboard()).unwrap();
    assert_eq!(entries(&log), vec!["b", "a"]);
    assert_eq!(events.fixed_priority(b), Some(-2));
}

#[test]
fn test_remove_type_during_dispatch() {
    let (mut events, _) = running_scene();
    let log = new_log();

    let callback_log = Rc::clone(&log);
    events
        .register(
            EventListener::keyboard(move |events, _| {
                callback_log.borrow_mut().push("a");
                events.remove_listeners_for_type(&EventKey::Keyboard);
            }),
            1,
        )
        .unwrap();
    events.register(EventListener::keyboard(recorder(&log, "b")), 2).unwrap();

    events.dispatch(&mut keyboard()).unwrap();

    assert_eq!(entries(&log), vec!["a"]);
    assert!(events.bucket(&EventKey::Keyboard).is_none());
    assert!(!events.has_listeners(&EventKey::Keyboard));
}
