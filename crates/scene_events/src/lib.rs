//! # Scene Events
//!
//! Event manager for a 2D scene graph: priority-ordered listeners,
//! dispatch that tolerates mutation from inside callbacks, and touch
//! claiming.
//!
//! ## Features
//!
//! - **Scene-graph priority**: listeners attached to nodes fire in reverse
//!   draw order, so the topmost node sees input first
//! - **Fixed priority**: numeric priorities around the scene-graph block
//! - **Reentrant dispatch**: callbacks get `&mut EventManager` and may
//!   register, remove and dispatch
//! - **Touch claiming**: one-by-one touch listeners claim and swallow touches
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_events::prelude::*;
//!
//! let mut tree = SceneTree::new();
//! let root = tree.create_node("root");
//! let button = tree.spawn_child(root, "button", 1);
//!
//! let mut events = EventManager::new(tree);
//! events.run_scene(root);
//!
//! let listener = EventListener::touch_one_by_one(
//!     TouchOneByOne::new().on_began(|_events, touch, _event| touch.x < 100.0),
//! )
//! .with_swallow_touches(true);
//! events.register(listener, button).unwrap();
//!
//! let mut event = Event::touch(TouchPhase::Began, vec![Touch::new(0, 10.0, 10.0)]);
//! events.dispatch(&mut event).unwrap();
//! assert!(event.as_touch().unwrap().remaining().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod events;
pub mod foundation;
pub mod scene;

/// Common imports for event manager users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, EventManagerConfig},
        events::{
            DispatchError, Event, EventKey, EventListener, EventManager, EventType, ListenerId, Priority,
            TouchAllAtOnce, TouchOneByOne, Touch, TouchPhase,
        },
        scene::{NodeId, NodeTree, SceneTree},
    };
}
