//! Touch claiming, swallowing and all-at-once delivery

use super::{entries, new_log, running_scene, touch_event, Log};
use crate::events::{EventKey, EventListener, EventManager, Touch, TouchAllAtOnce, TouchOneByOne, TouchPhase};
use crate::scene::{NodeId, NodeTree, SceneTree};
use std::cell::RefCell;
use std::rc::Rc;

/// One-by-one listener logging every phase under `name`; claims touches
/// for which `claims` holds
fn one_by_one(log: &Log, name: &'static str, claims: fn(&Touch) -> bool) -> EventListener<SceneTree> {
    let began_log = Rc::clone(log);
    let moved_log = Rc::clone(log);
    let ended_log = Rc::clone(log);
    let cancelled_log = Rc::clone(log);
    EventListener::touch_one_by_one(
        TouchOneByOne::new()
            .on_began(move |_, touch, _| {
                began_log.borrow_mut().push(name);
                claims(touch)
            })
            .on_moved(move |_, _, _| moved_log.borrow_mut().push(name))
            .on_ended(move |_, _, _| ended_log.borrow_mut().push(name))
            .on_cancelled(move |_, _, _| cancelled_log.borrow_mut().push(name)),
    )
}

fn two_layers(events: &mut EventManager, root: NodeId) -> (NodeId, NodeId) {
    let bottom = events.tree_mut().spawn_child(root, "bottom", 0);
    let top = events.tree_mut().spawn_child(root, "top", 1);
    (bottom, top)
}

#[test]
fn test_swallowing_claim_hides_touch_from_lower_listeners() {
    let (mut events, root) = running_scene();
    let (bottom, top) = two_layers(&mut events, root);
    let log = new_log();

    let top_id = events
        .register(one_by_one(&log, "top", |_| true).with_swallow_touches(true), top)
        .unwrap();
    let bottom_id = events.register(one_by_one(&log, "bottom", |_| true), bottom).unwrap();

    events.dispatch(&mut touch_event(TouchPhase::Began, &[1])).unwrap();
    assert_eq!(entries(&log), vec!["top"]);
    assert_eq!(events.claimed_touches(top_id), &[1]);
    assert!(events.claimed_touches(bottom_id).is_empty());

    events.dispatch(&mut touch_event(TouchPhase::Moved, &[1])).unwrap();
    assert_eq!(entries(&log), vec!["top", "top"]);

    events.dispatch(&mut touch_event(TouchPhase::Ended, &[1])).unwrap();
    assert_eq!(entries(&log), vec!["top", "top", "top"]);
    assert!(events.claimed_touches(top_id).is_empty());
}

#[test]
fn test_claim_without_swallow_lets_touch_through() {
    let (mut events, root) = running_scene();
    let (bottom, top) = two_layers(&mut events, root);
    let log = new_log();

    events.register(one_by_one(&log, "top", |_| true), top).unwrap();
    events.register(one_by_one(&log, "bottom", |_| true), bottom).unwrap();

    events.dispatch(&mut touch_event(TouchPhase::Began, &[7])).unwrap();
    events.dispatch(&mut touch_event(TouchPhase::Moved, &[7])).unwrap();
    assert_eq!(entries(&log), vec!["top", "bottom", "top", "bottom"]);
}

#[test]
fn test_unclaimed_touch_skips_later_phases() {
    let (mut events, root) = running_scene();
    let (bottom, top) = two_layers(&mut events, root);
    let log = new_log();

    let top_id = events.register(one_by_one(&log, "top", |_| false), top).unwrap();
    events.register(one_by_one(&log, "bottom", |_| true), bottom).unwrap();

    events.dispatch(&mut touch_event(TouchPhase::Began, &[3])).unwrap();
    events.dispatch(&mut touch_event(TouchPhase::Cancelled, &[3])).unwrap();

    assert_eq!(entries(&log), vec!["top", "bottom", "bottom"]);
    assert!(events.claimed_touches(top_id).is_empty());
}

#[test]
fn test_all_at_once_receives_unswallowed_touches() {
    let (mut events, root) = running_scene();
    let (_, top) = two_layers(&mut events, root);
    let log = new_log();
    let received: Rc<RefCell<Vec<Vec<u32>>>> = Rc::new(RefCell::new(Vec::new()));

    events
        .register(one_by_one(&log, "top", |touch| touch.id == 1).with_swallow_touches(true), top)
        .unwrap();
    let sink = Rc::clone(&received);
    events
        .register(
            EventListener::touch_all_at_once(
                TouchAllAtOnce::new()
                    .on_began(move |_, touches, _| sink.borrow_mut().push(touches.iter().map(|t| t.id).collect())),
            ),
            1,
        )
        .unwrap();

    let mut event = touch_event(TouchPhase::Began, &[1, 2]);
    events.dispatch(&mut event).unwrap();

    assert_eq!(entries(&log), vec!["top", "top"]);
    assert_eq!(*received.borrow(), vec![vec![2]]);
    let touch = event.as_touch().unwrap();
    assert_eq!(touch.touches().len(), 2);
    assert_eq!(touch.remaining().len(), 1);
}

#[test]
fn test_all_at_once_skipped_when_everything_swallowed() {
    let (mut events, root) = running_scene();
    let (_, top) = two_layers(&mut events, root);
    let log = new_log();

    events
        .register(one_by_one(&log, "top", |_| true).with_swallow_touches(true), top)
        .unwrap();
    let all_log = Rc::clone(&log);
    events
        .register(
            EventListener::touch_all_at_once(
                TouchAllAtOnce::new().on_began(move |_, _, _| all_log.borrow_mut().push("all")),
            ),
            1,
        )
        .unwrap();

    events.dispatch(&mut touch_event(TouchPhase::Began, &[1])).unwrap();
    assert_eq!(entries(&log), vec!["top"]);
}

#[test]
fn test_stopped_touch_event_ends_dispatch() {
    let (mut events, root) = running_scene();
    let (bottom, top) = two_layers(&mut events, root);
    let log = new_log();

    let top_log = Rc::clone(&log);
    events
        .register(
            EventListener::touch_one_by_one(TouchOneByOne::new().on_began(move |_, _, event| {
                top_log.borrow_mut().push("top");
                event.stop_propagation();
                false
            })),
            top,
        )
        .unwrap();
    events.register(one_by_one(&log, "bottom", |_| true), bottom).unwrap();
    let all_log = Rc::clone(&log);
    events
        .register(
            EventListener::touch_all_at_once(
                TouchAllAtOnce::new().on_began(move |_, _, _| all_log.borrow_mut().push("all")),
            ),
            1,
        )
        .unwrap();

    events.dispatch(&mut touch_event(TouchPhase::Began, &[1, 2])).unwrap();
    assert_eq!(entries(&log), vec!["top"]);
}

#[test]
fn test_destroyed_node_abandons_claims() {
    let (mut events, root) = running_scene();
    let (bottom, top) = two_layers(&mut events, root);
    let log = new_log();

    let top_id = events.register(one_by_one(&log, "top", |_| true), top).unwrap();
    events.register(one_by_one(&log, "bottom", |_| false), bottom).unwrap();

    events.dispatch(&mut touch_event(TouchPhase::Began, &[4])).unwrap();
    assert_eq!(events.claimed_touches(top_id), &[4]);

    events.destroy_node(top);
    assert!(!events.is_registered(top_id));
    assert!(events.claimed_touches(top_id).is_empty());

    events.dispatch(&mut touch_event(TouchPhase::Ended, &[4])).unwrap();
    assert_eq!(entries(&log), vec!["top", "bottom"]);
}

#[test]
fn test_listener_destroyed_in_began_does_not_claim() {
    let (mut events, root) = running_scene();
    let node = events.tree_mut().spawn_child(root, "doomed", 0);

    let listener = EventListener::touch_one_by_one(TouchOneByOne::<SceneTree>::new().on_began(|events, _, event| {
        if let Some(target) = event.current_target() {
            events.destroy_node(target);
        }
        true
    }));
    let id = events.register(listener, node).unwrap();

    events.dispatch(&mut touch_event(TouchPhase::Began, &[9])).unwrap();

    assert!(!events.is_registered(id));
    assert!(!events.tree().contains(node));
    assert!(events.bucket(&EventKey::TouchOneByOne).is_none());
}

#[test]
fn test_touch_swallow_toggle() {
    let (mut events, root) = running_scene();
    let (bottom, top) = two_layers(&mut events, root);
    let log = new_log();

    let top_id = events.register(one_by_one(&log, "top", |_| true), top).unwrap();
    events.register(one_by_one(&log, "bottom", |_| true), bottom).unwrap();
    events.set_swallow_touches(top_id, true);

    events.dispatch(&mut touch_event(TouchPhase::Began, &[1])).unwrap();
    assert_eq!(entries(&log), vec!["top"]);
}
