//! Touch routing
//!
//! One-by-one listeners see each touch separately. A BEGAN touch is offered
//! to them in priority order and the listeners whose began callback returns
//! true claim it; later phases of that touch only reach claiming listeners,
//! and ENDED/CANCELLED release the claim. A claiming listener that swallows
//! touches ends the walk for that touch and removes it from the event's
//! remaining set. All-at-once listeners then receive whatever remains.

use super::event::{Event, TouchPhase};
use super::listener::{EventKey, Handler, ListenerId};
use super::manager::EventManager;
use crate::scene::NodeTree;

impl<T: NodeTree> EventManager<T> {
    pub(super) fn dispatch_touch_event(&mut self, event: &mut Event) {
        self.sort_listeners(&EventKey::TouchOneByOne);
        self.sort_listeners(&EventKey::TouchAllAtOnce);

        let has_one_by_one = self.buckets.contains_key(&EventKey::TouchOneByOne);
        let has_all_at_once = self.buckets.contains_key(&EventKey::TouchAllAtOnce);
        if !has_one_by_one && !has_all_at_once {
            return;
        }

        let Some(touch_event) = event.as_touch_mut() else {
            return;
        };
        touch_event.reset_remaining();
        let touches = touch_event.touches().to_vec();

        if has_one_by_one {
            for touch in touches {
                if let Some(touch_event) = event.as_touch_mut() {
                    touch_event.set_current(touch);
                }
                self.dispatch_to_listeners(&EventKey::TouchOneByOne, event, Self::invoke_one_by_one);
                if event.is_stopped() {
                    self.update_touch_listeners();
                    return;
                }
            }
        }

        let remaining = event.as_touch().is_some_and(|touch_event| !touch_event.remaining().is_empty());
        if has_all_at_once && remaining {
            self.dispatch_to_listeners(&EventKey::TouchAllAtOnce, event, Self::invoke_all_at_once);
            if event.is_stopped() {
                self.update_touch_listeners();
                return;
            }
        }

        self.update_touch_listeners();
    }

    fn update_touch_listeners(&mut self) {
        self.update_listeners(&[EventKey::TouchOneByOne, EventKey::TouchAllAtOnce]);
    }

    /// Offer the current touch to one listener. Returns true when the walk
    /// for this touch must end: the event was stopped or the touch was
    /// swallowed.
    fn invoke_one_by_one(&mut self, id: ListenerId, event: &mut Event) -> bool {
        let Some((phase, touch)) = event
            .as_touch()
            .and_then(|touch_event| Some((touch_event.phase(), touch_event.current_touch()?)))
        else {
            return false;
        };
        let Some((handler, node)) = self.handler_of(id) else {
            return false;
        };
        event.set_current_target(node);
        let mut claimed = false;

        if let Handler::OneByOne(callbacks) = handler {
            if phase == TouchPhase::Began {
                if let Some(began) = callbacks.began.as_ref() {
                    log::trace!("Offering touch {} to listener {:?}", touch.id, id);
                    claimed = began(self, &touch, event);
                    if claimed {
                        if let Some(record) = self.listeners.get_mut(id).filter(|record| record.registered) {
                            if !record.claimed_touches.contains(&touch.id) {
                                record.claimed_touches.push(touch.id);
                            }
                        }
                    }
                }
            } else if self.claimed_touches(id).contains(&touch.id) {
                claimed = true;
                let callback = match phase {
                    TouchPhase::Moved => callbacks.moved.as_ref(),
                    TouchPhase::Ended => callbacks.ended.as_ref(),
                    TouchPhase::Cancelled => callbacks.cancelled.as_ref(),
                    TouchPhase::Began => None,
                };
                if let Some(callback) = callback {
                    callback(self, &touch, event);
                }
                if matches!(phase, TouchPhase::Ended | TouchPhase::Cancelled) {
                    if let Some(record) = self.listeners.get_mut(id).filter(|record| record.registered) {
                        record.claimed_touches.retain(|&claimed_id| claimed_id != touch.id);
                    }
                }
            }
        }

        if event.is_stopped() {
            return true;
        }

        let swallows = self
            .listeners
            .get(id)
            .is_some_and(|record| record.registered && record.swallow_touches);
        if claimed && swallows {
            log::trace!("Listener {:?} swallowed touch {}", id, touch.id);
            if let Some(touch_event) = event.as_touch_mut() {
                touch_event.swallow(touch.id);
            }
            return true;
        }
        false
    }

    /// Hand the remaining touch set to one all-at-once listener; returns
    /// whether the event was stopped
    fn invoke_all_at_once(&mut self, id: ListenerId, event: &mut Event) -> bool {
        let Some((phase, touches)) = event
            .as_touch()
            .map(|touch_event| (touch_event.phase(), touch_event.remaining().to_vec()))
        else {
            return false;
        };
        let Some((handler, node)) = self.handler_of(id) else {
            return false;
        };

        event.set_current_target(node);
        if let Handler::AllAtOnce(callbacks) = handler {
            let callback = match phase {
                TouchPhase::Began => callbacks.began.as_ref(),
                TouchPhase::Moved => callbacks.moved.as_ref(),
                TouchPhase::Ended => callbacks.ended.as_ref(),
                TouchPhase::Cancelled => callbacks.cancelled.as_ref(),
            };
            if let Some(callback) = callback {
                log::trace!("Delivering {} touches to listener {:?}", touches.len(), id);
                callback(self, &touches, event);
            }
        }

        event.is_stopped()
    }
}
