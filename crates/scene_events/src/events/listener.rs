//! Listener descriptors and the records the manager keeps for them
//!
//! A listener is built from one capability: a plain event callback, a set of
//! one-by-one touch callbacks, or a set of all-at-once touch callbacks. The
//! capability is checked once, at registration.
//!
//! Callbacks are shared (`Rc`) and only borrowed immutably while they run, so
//! a nested dispatch can invoke a listener that is already running further up
//! the stack. Callbacks keep their own state in `Cell`/`RefCell`.

use super::error::DispatchError;
use super::event::{Event, Touch};
use super::manager::EventManager;
use crate::scene::NodeId;
use std::fmt;
use std::rc::Rc;

slotmap::new_key_type! {
    /// Handle to a registered listener. Handles of removed listeners go stale
    /// and every operation on them is a no-op.
    pub struct ListenerId;
}

/// Key of a listener bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    /// Per-touch listeners that claim touches
    TouchOneByOne,
    /// Listeners that receive the whole touch set
    TouchAllAtOnce,
    /// Mouse listeners
    Mouse,
    /// Keyboard listeners
    Keyboard,
    /// Accelerometer listeners
    Acceleration,
    /// Focus listeners
    Focus,
    /// Listeners of a named custom event
    Custom(String),
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TouchOneByOne => f.write_str("touch_one_by_one"),
            Self::TouchAllAtOnce => f.write_str("touch_all_at_once"),
            Self::Mouse => f.write_str("mouse"),
            Self::Keyboard => f.write_str("keyboard"),
            Self::Acceleration => f.write_str("acceleration"),
            Self::Focus => f.write_str("focus"),
            Self::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

/// Callback for every non-touch event kind
pub type EventCallback<T> = Rc<dyn Fn(&mut EventManager<T>, &mut Event)>;

/// Began callback of a one-by-one touch listener; returning true claims the touch
pub type TouchBeganCallback<T> = Box<dyn Fn(&mut EventManager<T>, &Touch, &mut Event) -> bool>;

/// Moved/ended/cancelled callback of a one-by-one touch listener
pub type TouchCallback<T> = Box<dyn Fn(&mut EventManager<T>, &Touch, &mut Event)>;

/// Callback of an all-at-once touch listener
pub type TouchesCallback<T> = Box<dyn Fn(&mut EventManager<T>, &[Touch], &mut Event)>;

/// Callbacks of a one-by-one touch listener
pub struct TouchOneByOne<T> {
    pub(crate) began: Option<TouchBeganCallback<T>>,
    pub(crate) moved: Option<TouchCallback<T>>,
    pub(crate) ended: Option<TouchCallback<T>>,
    pub(crate) cancelled: Option<TouchCallback<T>>,
}

impl<T> TouchOneByOne<T> {
    /// No callbacks yet; a began callback is required before registration
    pub fn new() -> Self {
        Self {
            began: None,
            moved: None,
            ended: None,
            cancelled: None,
        }
    }

    /// Set the began callback
    pub fn on_began<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut EventManager<T>, &Touch, &mut Event) -> bool + 'static,
    {
        self.began = Some(Box::new(callback));
        self
    }

    /// Set the moved callback
    pub fn on_moved<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut EventManager<T>, &Touch, &mut Event) + 'static,
    {
        self.moved = Some(Box::new(callback));
        self
    }

    /// Set the ended callback
    pub fn on_ended<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut EventManager<T>, &Touch, &mut Event) + 'static,
    {
        self.ended = Some(Box::new(callback));
        self
    }

    /// Set the cancelled callback
    pub fn on_cancelled<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut EventManager<T>, &Touch, &mut Event) + 'static,
    {
        self.cancelled = Some(Box::new(callback));
        self
    }
}

impl<T> Default for TouchOneByOne<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Callbacks of an all-at-once touch listener
pub struct TouchAllAtOnce<T> {
    pub(crate) began: Option<TouchesCallback<T>>,
    pub(crate) moved: Option<TouchesCallback<T>>,
    pub(crate) ended: Option<TouchesCallback<T>>,
    pub(crate) cancelled: Option<TouchesCallback<T>>,
}

impl<T> TouchAllAtOnce<T> {
    /// No callbacks yet; at least one is required before registration
    pub fn new() -> Self {
        Self {
            began: None,
            moved: None,
            ended: None,
            cancelled: None,
        }
    }

    /// Set the began callback
    pub fn on_began<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut EventManager<T>, &[Touch], &mut Event) + 'static,
    {
        self.began = Some(Box::new(callback));
        self
    }

    /// Set the moved callback
    pub fn on_moved<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut EventManager<T>, &[Touch], &mut Event) + 'static,
    {
        self.moved = Some(Box::new(callback));
        self
    }

    /// Set the ended callback
    pub fn on_ended<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut EventManager<T>, &[Touch], &mut Event) + 'static,
    {
        self.ended = Some(Box::new(callback));
        self
    }

    /// Set the cancelled callback
    pub fn on_cancelled<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut EventManager<T>, &[Touch], &mut Event) + 'static,
    {
        self.cancelled = Some(Box::new(callback));
        self
    }

    fn is_empty(&self) -> bool {
        self.began.is_none()
            && self.moved.is_none()
            && self.ended.is_none()
            && self.cancelled.is_none()
    }
}

impl<T> Default for TouchAllAtOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener capability
pub(crate) enum Handler<T> {
    Event(EventCallback<T>),
    OneByOne(Rc<TouchOneByOne<T>>),
    AllAtOnce(Rc<TouchAllAtOnce<T>>),
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Event(callback) => Self::Event(Rc::clone(callback)),
            Self::OneByOne(callbacks) => Self::OneByOne(Rc::clone(callbacks)),
            Self::AllAtOnce(callbacks) => Self::AllAtOnce(Rc::clone(callbacks)),
        }
    }
}

/// Listener descriptor handed to [`EventManager::register`]
pub struct EventListener<T> {
    key: EventKey,
    handler: Handler<T>,
    swallow_touches: bool,
    enabled: bool,
}

impl<T> EventListener<T> {
    fn with_handler(key: EventKey, handler: Handler<T>) -> Self {
        Self {
            key,
            handler,
            swallow_touches: false,
            enabled: true,
        }
    }

    fn event<F>(key: EventKey, callback: F) -> Self
    where
        F: Fn(&mut EventManager<T>, &mut Event) + 'static,
    {
        Self::with_handler(key, Handler::Event(Rc::new(callback)))
    }

    /// Listener for a named custom event
    pub fn custom<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut EventManager<T>, &mut Event) + 'static,
    {
        Self::event(EventKey::Custom(name.into()), callback)
    }

    /// Keyboard listener
    pub fn keyboard<F>(callback: F) -> Self
    where
        F: Fn(&mut EventManager<T>, &mut Event) + 'static,
    {
        Self::event(EventKey::Keyboard, callback)
    }

    /// Mouse listener
    pub fn mouse<F>(callback: F) -> Self
    where
        F: Fn(&mut EventManager<T>, &mut Event) + 'static,
    {
        Self::event(EventKey::Mouse, callback)
    }

    /// Accelerometer listener
    pub fn acceleration<F>(callback: F) -> Self
    where
        F: Fn(&mut EventManager<T>, &mut Event) + 'static,
    {
        Self::event(EventKey::Acceleration, callback)
    }

    /// Focus listener
    pub fn focus<F>(callback: F) -> Self
    where
        F: Fn(&mut EventManager<T>, &mut Event) + 'static,
    {
        Self::event(EventKey::Focus, callback)
    }

    /// One-by-one touch listener
    pub fn touch_one_by_one(callbacks: TouchOneByOne<T>) -> Self {
        Self::with_handler(EventKey::TouchOneByOne, Handler::OneByOne(Rc::new(callbacks)))
    }

    /// All-at-once touch listener
    pub fn touch_all_at_once(callbacks: TouchAllAtOnce<T>) -> Self {
        Self::with_handler(EventKey::TouchAllAtOnce, Handler::AllAtOnce(Rc::new(callbacks)))
    }

    /// Stop lower-priority one-by-one listeners from seeing touches this
    /// listener claims
    pub fn with_swallow_touches(mut self, swallow: bool) -> Self {
        self.swallow_touches = swallow;
        self
    }

    /// Initial enabled state
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Bucket this listener belongs to
    pub fn key(&self) -> &EventKey {
        &self.key
    }

    pub(crate) fn check_available(&self) -> Result<(), DispatchError> {
        let available = match &self.handler {
            Handler::Event(_) => true,
            Handler::OneByOne(callbacks) => callbacks.began.is_some(),
            Handler::AllAtOnce(callbacks) => !callbacks.is_empty(),
        };
        if available {
            Ok(())
        } else {
            Err(DispatchError::UnavailableListener(self.key.to_string()))
        }
    }
}

impl<T> fmt::Debug for EventListener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("key", &self.key)
            .field("swallow_touches", &self.swallow_touches)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Manager-side state of a listener
pub(crate) struct ListenerRecord<T> {
    pub(crate) key: EventKey,
    /// Cloned out for each invocation
    pub(crate) handler: Handler<T>,
    pub(crate) registered: bool,
    pub(crate) paused: bool,
    pub(crate) enabled: bool,
    /// 0 means scene-graph priority
    pub(crate) fixed_priority: i32,
    pub(crate) node: Option<NodeId>,
    pub(crate) swallow_touches: bool,
    pub(crate) claimed_touches: Vec<u32>,
}

impl<T> ListenerRecord<T> {
    pub(crate) fn new(listener: EventListener<T>, fixed_priority: i32, node: Option<NodeId>) -> Self {
        Self {
            key: listener.key,
            handler: listener.handler,
            registered: true,
            // Scene-graph listeners wait for their node to be running.
            paused: node.is_some(),
            enabled: listener.enabled,
            fixed_priority,
            node,
            swallow_touches: listener.swallow_touches,
            claimed_touches: Vec::new(),
        }
    }

    pub(crate) fn is_scene_graph(&self) -> bool {
        self.fixed_priority == 0
    }

    pub(crate) fn is_dispatchable(&self) -> bool {
        self.registered && self.enabled && !self.paused
    }
}
