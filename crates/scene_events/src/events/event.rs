//! Event values raised into the event manager
//!
//! An [`Event`] carries a typed payload, a `stopped` flag any listener may
//! set, and the `current_target` the manager fills in before each callback.

use super::error::DispatchError;
use super::listener::EventKey;
use crate::scene::NodeId;
use std::any::Any;
use std::fmt;

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Touch began/moved/ended/cancelled
    Touch,
    /// Mouse button, motion or scroll
    Mouse,
    /// Key press or release
    Keyboard,
    /// Accelerometer sample
    Acceleration,
    /// Focus moved between nodes
    Focus,
    /// Named user event
    Custom,
}

/// Touch phase code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    /// Finger down
    Began,
    /// Finger moved
    Moved,
    /// Finger up
    Ended,
    /// Touch cancelled by the system
    Cancelled,
}

/// A single touch point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    /// Touch identifier, stable from began to ended/cancelled
    pub id: u32,
    /// Horizontal position
    pub x: f32,
    /// Vertical position
    pub y: f32,
}

impl Touch {
    /// Create a touch point
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

/// Touch payload
#[derive(Debug, Clone)]
pub struct TouchEvent {
    phase: TouchPhase,
    touches: Vec<Touch>,
    remaining: Vec<Touch>,
    current: Option<Touch>,
}

impl TouchEvent {
    /// Phase shared by every touch in the event
    pub fn phase(&self) -> TouchPhase {
        self.phase
    }

    /// Every touch the event was raised with
    pub fn touches(&self) -> &[Touch] {
        &self.touches
    }

    /// Touches not yet swallowed by a one-by-one listener during the
    /// current dispatch. All-at-once listeners receive this set.
    pub fn remaining(&self) -> &[Touch] {
        &self.remaining
    }

    /// Touch being routed to one-by-one listeners
    pub fn current_touch(&self) -> Option<Touch> {
        self.current
    }

    pub(crate) fn reset_remaining(&mut self) {
        self.remaining.clone_from(&self.touches);
        self.current = None;
    }

    pub(crate) fn set_current(&mut self, touch: Touch) {
        self.current = Some(touch);
    }

    pub(crate) fn swallow(&mut self, id: u32) {
        self.remaining.retain(|t| t.id != id);
    }
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

/// Kind of mouse event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    /// Button pressed
    Down,
    /// Button released
    Up,
    /// Cursor moved
    Move,
    /// Wheel scrolled
    Scroll,
}

/// Mouse payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// What happened
    pub kind: MouseEventKind,
    /// Button involved, if any
    pub button: Option<MouseButton>,
    /// Cursor position
    pub location: (f32, f32),
    /// Scroll delta
    pub scroll: (f32, f32),
}

/// Keyboard payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// Platform key code
    pub key_code: u32,
    /// True on press, false on release
    pub pressed: bool,
}

/// Accelerometer payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Acceleration {
    /// X axis
    pub x: f32,
    /// Y axis
    pub y: f32,
    /// Z axis
    pub z: f32,
    /// Sample time in seconds
    pub timestamp: f64,
}

/// Focus payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusEvent {
    /// Node losing focus
    pub lost: Option<NodeId>,
    /// Node gaining focus
    pub gained: Option<NodeId>,
}

/// Named user event with optional data
pub struct CustomEvent {
    name: String,
    user_data: Option<Box<dyn Any>>,
}

impl CustomEvent {
    /// Event name, also its listener key
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attached data, if it has type `U`
    pub fn user_data<U: Any>(&self) -> Option<&U> {
        self.user_data.as_deref().and_then(|data| data.downcast_ref())
    }

    /// Mutable attached data, if it has type `U`
    pub fn user_data_mut<U: Any>(&mut self) -> Option<&mut U> {
        self.user_data.as_deref_mut().and_then(|data| data.downcast_mut())
    }
}

impl fmt::Debug for CustomEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomEvent")
            .field("name", &self.name)
            .field("has_user_data", &self.user_data.is_some())
            .finish()
    }
}

/// Event payload variants
#[derive(Debug)]
pub enum EventPayload {
    /// Touch event
    Touch(TouchEvent),
    /// Mouse event
    Mouse(MouseEvent),
    /// Keyboard event
    Keyboard(KeyboardEvent),
    /// Accelerometer event
    Acceleration(Acceleration),
    /// Focus change
    Focus(FocusEvent),
    /// Named user event
    Custom(CustomEvent),
}

/// An event travelling through the manager
#[derive(Debug)]
pub struct Event {
    payload: EventPayload,
    stopped: bool,
    current_target: Option<NodeId>,
}

impl Event {
    fn from_payload(payload: EventPayload) -> Self {
        Self {
            payload,
            stopped: false,
            current_target: None,
        }
    }

    /// Touch event for every touch changing phase this frame
    pub fn touch(phase: TouchPhase, touches: Vec<Touch>) -> Self {
        Self::from_payload(EventPayload::Touch(TouchEvent {
            phase,
            remaining: touches.clone(),
            touches,
            current: None,
        }))
    }

    /// Mouse event
    pub fn mouse(mouse: MouseEvent) -> Self {
        Self::from_payload(EventPayload::Mouse(mouse))
    }

    /// Keyboard event
    pub fn keyboard(key_code: u32, pressed: bool) -> Self {
        Self::from_payload(EventPayload::Keyboard(KeyboardEvent { key_code, pressed }))
    }

    /// Accelerometer event
    pub fn acceleration(acceleration: Acceleration) -> Self {
        Self::from_payload(EventPayload::Acceleration(acceleration))
    }

    /// Focus change event
    pub fn focus(lost: Option<NodeId>, gained: Option<NodeId>) -> Self {
        Self::from_payload(EventPayload::Focus(FocusEvent { lost, gained }))
    }

    /// Custom event without data
    pub fn custom(name: impl Into<String>) -> Self {
        Self::from_payload(EventPayload::Custom(CustomEvent {
            name: name.into(),
            user_data: None,
        }))
    }

    /// Custom event carrying data
    pub fn custom_with_data(name: impl Into<String>, user_data: Box<dyn Any>) -> Self {
        Self::from_payload(EventPayload::Custom(CustomEvent {
            name: name.into(),
            user_data: Some(user_data),
        }))
    }

    /// Type of this event
    pub fn event_type(&self) -> EventType {
        match self.payload {
            EventPayload::Touch(_) => EventType::Touch,
            EventPayload::Mouse(_) => EventType::Mouse,
            EventPayload::Keyboard(_) => EventType::Keyboard,
            EventPayload::Acceleration(_) => EventType::Acceleration,
            EventPayload::Focus(_) => EventType::Focus,
            EventPayload::Custom(_) => EventType::Custom,
        }
    }

    /// Payload
    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// Mutable payload
    pub fn payload_mut(&mut self) -> &mut EventPayload {
        &mut self.payload
    }

    /// Touch payload, if this is a touch event
    pub fn as_touch(&self) -> Option<&TouchEvent> {
        match &self.payload {
            EventPayload::Touch(touch) => Some(touch),
            _ => None,
        }
    }

    pub(crate) fn as_touch_mut(&mut self) -> Option<&mut TouchEvent> {
        match &mut self.payload {
            EventPayload::Touch(touch) => Some(touch),
            _ => None,
        }
    }

    /// Custom payload, if this is a custom event
    pub fn as_custom(&self) -> Option<&CustomEvent> {
        match &self.payload {
            EventPayload::Custom(custom) => Some(custom),
            _ => None,
        }
    }

    /// Custom user data of type `U`
    pub fn user_data<U: Any>(&self) -> Option<&U> {
        self.as_custom().and_then(|custom| custom.user_data())
    }

    /// Stop delivering this event to the remaining listeners
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    /// Whether propagation was stopped
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Node of the listener currently being invoked; `None` for
    /// fixed-priority listeners
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    pub(crate) fn set_current_target(&mut self, target: Option<NodeId>) {
        self.current_target = target;
    }

    /// Listener bucket this event routes to. Touch events route to two
    /// buckets and return `None`.
    pub fn listener_key(&self) -> Option<EventKey> {
        match &self.payload {
            EventPayload::Touch(_) => None,
            EventPayload::Mouse(_) => Some(EventKey::Mouse),
            EventPayload::Keyboard(_) => Some(EventKey::Keyboard),
            EventPayload::Acceleration(_) => Some(EventKey::Acceleration),
            EventPayload::Focus(_) => Some(EventKey::Focus),
            EventPayload::Custom(custom) => Some(EventKey::Custom(custom.name.clone())),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), DispatchError> {
        match &self.payload {
            EventPayload::Custom(custom) if custom.name.is_empty() => Err(
                DispatchError::MalformedEvent("custom event has no name".to_string()),
            ),
            EventPayload::Touch(touch) if touch.touches.is_empty() => Err(
                DispatchError::MalformedEvent("touch event carries no touches".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_keys() {
        assert_eq!(Event::keyboard(13, true).listener_key(), Some(EventKey::Keyboard));
        assert_eq!(
            Event::custom("score").listener_key(),
            Some(EventKey::Custom("score".to_string()))
        );
        assert_eq!(
            Event::touch(TouchPhase::Began, vec![Touch::new(0, 1.0, 1.0)]).listener_key(),
            None
        );
    }

    #[test]
    fn test_custom_user_data_downcast() {
        let event = Event::custom_with_data("score", Box::new(42_u32));
        assert_eq!(event.user_data::<u32>(), Some(&42));
        assert_eq!(event.user_data::<i64>(), None);
        assert_eq!(event.event_type(), EventType::Custom);
    }

    #[test]
    fn test_validate_rejects_malformed() {
        assert!(matches!(
            Event::custom("").validate(),
            Err(DispatchError::MalformedEvent(_))
        ));
        assert!(matches!(
            Event::touch(TouchPhase::Moved, Vec::new()).validate(),
            Err(DispatchError::MalformedEvent(_))
        ));
        assert!(Event::keyboard(1, false).validate().is_ok());
    }

    #[test]
    fn test_swallow_only_touches_remaining() {
        let mut event = Event::touch(
            TouchPhase::Began,
            vec![Touch::new(1, 0.0, 0.0), Touch::new(2, 5.0, 5.0)],
        );
        let touch = event.as_touch_mut().unwrap();
        touch.swallow(1);
        assert_eq!(touch.touches().len(), 2);
        assert_eq!(touch.remaining(), &[Touch::new(2, 5.0, 5.0)]);

        touch.reset_remaining();
        assert_eq!(touch.remaining().len(), 2);
    }
}
