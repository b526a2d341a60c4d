//! Event system for scene-graph driven input
//!
//! Key principles:
//! - Listeners are ordered per event key: negative fixed priorities, then
//!   scene-graph listeners topmost node first, then positive fixed priorities
//! - Any listener may stop propagation for the rest of the walk
//! - Listeners can be added, removed and re-prioritised while events are
//!   being dispatched, including from nested dispatches
//! - One-by-one touch listeners claim touches on BEGAN and may swallow them

pub mod bucket;
pub mod error;
pub mod event;
pub mod listener;
pub mod manager;
pub mod priority;
mod touch;

#[cfg(test)]
mod tests;

pub use bucket::{DirtyFlags, ListenerBucket};
pub use error::DispatchError;
pub use event::{
    Acceleration, CustomEvent, Event, EventPayload, EventType, FocusEvent, KeyboardEvent, MouseButton, MouseEvent,
    MouseEventKind, Touch, TouchEvent, TouchPhase,
};
pub use listener::{
    EventCallback, EventKey, EventListener, ListenerId, TouchAllAtOnce, TouchBeganCallback, TouchCallback,
    TouchOneByOne, TouchesCallback,
};
pub use manager::{EventManager, Priority};
pub use priority::PriorityResolver;
