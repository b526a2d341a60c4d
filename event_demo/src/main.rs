//! Scripted event demo
//!
//! Builds a small scene (background, panel and button), registers touch,
//! keyboard and custom listeners, then replays a fixed list of input frames
//! through the event manager. Pass a `.toml` or `.ron` config path as the
//! first argument to override the defaults.

use scene_events::config::{Config, ConfigError, EventManagerConfig, EVENT_HIDE};
use scene_events::events::{
    DispatchError, Event, EventKey, EventListener, EventManager, EventPayload, Touch, TouchAllAtOnce, TouchOneByOne,
    TouchPhase,
};
use scene_events::foundation::logging;
use scene_events::scene::{NodeId, SceneTree};
use std::cell::Cell;
use std::rc::Rc;

const KEY_ESCAPE: u32 = 27;
const BUTTON_WIDTH: f32 = 100.0;
const CLICK_EVENT: &str = "button_clicked";

/// Demo errors
#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

struct Layers {
    root: NodeId,
    background: NodeId,
    panel: NodeId,
    button: NodeId,
}

fn load_config() -> Result<EventManagerConfig, DemoError> {
    let config = match std::env::args().nth(1) {
        Some(path) => EventManagerConfig::load_from_file(&path)?,
        None => EventManagerConfig::default(),
    };
    config.validate().map_err(DemoError::InvalidConfig)?;
    Ok(config)
}

fn build_scene() -> (SceneTree, Layers) {
    let mut tree = SceneTree::new();
    let root = tree.create_node("root");
    let background = tree.spawn_child(root, "background", -1);
    let panel = tree.spawn_child(root, "panel", 0);
    let button = tree.spawn_child(panel, "button", 1);
    (
        tree,
        Layers {
            root,
            background,
            panel,
            button,
        },
    )
}

fn register_listeners(events: &mut EventManager, layers: &Layers, clicks: &Rc<Cell<u32>>) -> Result<(), DemoError> {
    let button = EventListener::touch_one_by_one(
        TouchOneByOne::<SceneTree>::new()
            .on_began(|_, touch, _| {
                let hit = touch.x < BUTTON_WIDTH;
                log::info!("Button {} touch {}", if hit { "claims" } else { "ignores" }, touch.id);
                hit
            })
            .on_ended(|events, touch, _| {
                log::info!("Button released by touch {}", touch.id);
                if let Err(err) = events.dispatch_custom(CLICK_EVENT, Some(Box::new(touch.id))) {
                    log::warn!("Click event failed: {}", err);
                }
            }),
    )
    .with_swallow_touches(true);
    events.register(button, layers.button)?;

    let panel = EventListener::touch_one_by_one(
        TouchOneByOne::new()
            .on_began(|_, touch, _| {
                log::info!("Panel claims touch {}", touch.id);
                true
            })
            .on_moved(|_, touch, _| log::info!("Panel drag to ({}, {})", touch.x, touch.y))
            .on_cancelled(|_, touch, _| log::info!("Panel drag {} cancelled", touch.id)),
    );
    events.register(panel, layers.panel)?;

    let background = EventListener::touch_all_at_once(TouchAllAtOnce::new().on_began(|_, touches, event| {
        log::info!(
            "Background sees {} touches (current target {:?})",
            touches.len(),
            event.current_target()
        );
    }));
    events.register(background, layers.background)?;

    let panel_node = layers.panel;
    events.register(
        EventListener::keyboard(move |events, event| {
            let escape = matches!(
                event.payload(),
                EventPayload::Keyboard(key) if key.key_code == KEY_ESCAPE && key.pressed
            );
            if escape {
                log::info!("Escape pressed; pausing the panel");
                events.pause_target(panel_node, true);
                event.stop_propagation();
            }
        }),
        -1,
    )?;

    let counter = Rc::clone(clicks);
    events.add_custom_listener(CLICK_EVENT, move |_, event| {
        counter.set(counter.get() + 1);
        log::info!("Click #{} from touch {:?}", counter.get(), event.user_data::<u32>());
    })?;

    events.add_custom_listener(EVENT_HIDE, |events, _| {
        log::info!("Game hidden; disabling input");
        events.set_enabled(false);
    })?;

    Ok(())
}

fn frames() -> Vec<Event> {
    vec![
        Event::touch(
            TouchPhase::Began,
            vec![Touch::new(0, 40.0, 20.0), Touch::new(1, 300.0, 200.0)],
        ),
        Event::touch(
            TouchPhase::Moved,
            vec![Touch::new(0, 45.0, 22.0), Touch::new(1, 310.0, 205.0)],
        ),
        Event::touch(TouchPhase::Ended, vec![Touch::new(0, 45.0, 22.0)]),
        Event::keyboard(KEY_ESCAPE, true),
        Event::touch(TouchPhase::Cancelled, vec![Touch::new(1, 310.0, 205.0)]),
        Event::custom(EVENT_HIDE),
        Event::touch(TouchPhase::Began, vec![Touch::new(2, 10.0, 10.0)]),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init_with_filter(&config.log_filter);

    log::info!("Starting scene event demo");

    let (tree, layers) = build_scene();
    let mut events = EventManager::with_config(tree, &config);
    events.run_scene(layers.root);

    let clicks = Rc::new(Cell::new(0));
    register_listeners(&mut events, &layers, &clicks)?;

    for (frame, mut event) in frames().into_iter().enumerate() {
        log::info!("Frame {}: {:?}", frame, event.event_type());
        events.dispatch(&mut event).map_err(DemoError::from)?;
    }

    events.remove_all_listeners();
    log::info!(
        "Finished with {} clicks; {} hide listeners kept",
        clicks.get(),
        events.listener_count(&EventKey::Custom(EVENT_HIDE.to_string()))
    );
    Ok(())
}
