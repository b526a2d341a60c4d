//! Dispatch scenario tests
//!
//! Listeners record their names into a shared log so each test can assert
//! the exact invocation order.

mod reentrancy;
mod touch_routing;

use crate::events::{Event, EventManager, Touch, TouchPhase};
use crate::scene::{NodeId, SceneTree};
use std::cell::RefCell;
use std::rc::Rc;

pub(super) type Log = Rc<RefCell<Vec<&'static str>>>;

pub(super) fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub(super) fn entries(log: &Log) -> Vec<&'static str> {
    log.borrow().clone()
}

/// Listener callback that appends `name` to `log`
pub(super) fn recorder(log: &Log, name: &'static str) -> impl Fn(&mut EventManager, &mut Event) + 'static {
    let log = Rc::clone(log);
    move |_, _| log.borrow_mut().push(name)
}

/// Manager over a tree whose root scene is already running
pub(super) fn running_scene() -> (EventManager, NodeId) {
    let mut tree = SceneTree::new();
    let root = tree.create_node("root");
    let mut events = EventManager::new(tree);
    events.run_scene(root);
    (events, root)
}

pub(super) fn touch_event(phase: TouchPhase, ids: &[u32]) -> Event {
    Event::touch(
        phase,
        ids.iter().map(|&id| Touch::new(id, id as f32 * 10.0, 0.0)).collect(),
    )
}

pub(super) fn keyboard() -> Event {
    Event::keyboard(32, true)
}
