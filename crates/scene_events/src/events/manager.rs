//! Event manager
//!
//! Owns every listener bucket, the node/listener association maps and the
//! scene tree. Listener callbacks receive `&mut EventManager` and may
//! register, remove, pause or re-prioritise listeners and dispatch nested
//! events while a dispatch is in flight. A nested dispatch reaches every
//! registered, enabled and unpaused listener, including the ones still
//! running in an outer frame:
//!
//! - registrations made during a dispatch are queued and become visible to
//!   the next dispatch
//! - removals during a dispatch only clear the `registered` flag; buckets are
//!   compacted once the outermost dispatch finishes
//! - a bucket is never re-sorted while a dispatch frame iterates it

use super::bucket::{DirtyFlags, ListenerBucket};
use super::error::DispatchError;
use super::event::Event;
use super::listener::{EventKey, EventListener, Handler, ListenerId, ListenerRecord};
use super::priority::PriorityResolver;
use crate::config::EventManagerConfig;
use crate::scene::{NodeId, NodeTree, SceneTree};
use slotmap::SlotMap;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// How a listener is ordered within its bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Ordered by the node's draw order; topmost node first
    SceneGraph(NodeId),
    /// Fixed number; lower runs first, negatives before scene-graph
    /// listeners, positives after. Zero is reserved.
    Fixed(i32),
}

impl From<NodeId> for Priority {
    fn from(node: NodeId) -> Self {
        Self::SceneGraph(node)
    }
}

impl From<i32> for Priority {
    fn from(priority: i32) -> Self {
        Self::Fixed(priority)
    }
}

/// Per-listener callback used by the bucket walk; returns true to stop it
pub(super) type WalkCallback<T> = fn(&mut EventManager<T>, ListenerId, &mut Event) -> bool;

/// Central registry and dispatcher of scene events
pub struct EventManager<T = SceneTree> {
    pub(super) tree: T,
    pub(super) listeners: SlotMap<ListenerId, ListenerRecord<T>>,
    pub(super) buckets: HashMap<EventKey, ListenerBucket>,
    pub(super) dirty: HashMap<EventKey, DirtyFlags>,
    pub(super) node_listeners: HashMap<NodeId, Vec<ListenerId>>,
    pub(super) node_priority: HashMap<NodeId, u32>,
    pub(super) dirty_nodes: Vec<NodeId>,
    pub(super) to_add: Vec<ListenerId>,
    /// Keys that saw a removal during the current dispatch
    pub(super) purge_keys: HashSet<EventKey>,
    pub(super) in_dispatch: u32,
    pub(super) enabled: bool,
    internal_custom_events: Vec<String>,
    resolver: PriorityResolver,
}

impl<T: NodeTree> EventManager<T> {
    /// Manager over `tree` with the default configuration
    pub fn new(tree: T) -> Self {
        Self::with_config(tree, &EventManagerConfig::default())
    }

    /// Manager over `tree` configured from `config`
    pub fn with_config(tree: T, config: &EventManagerConfig) -> Self {
        log::debug!(
            "Creating event manager (enabled: {}, internal events: {:?})",
            config.enabled,
            config.internal_custom_events
        );
        Self {
            tree,
            listeners: SlotMap::with_key(),
            buckets: HashMap::new(),
            dirty: HashMap::new(),
            node_listeners: HashMap::new(),
            node_priority: HashMap::new(),
            dirty_nodes: Vec::new(),
            to_add: Vec::new(),
            purge_keys: HashSet::new(),
            in_dispatch: 0,
            enabled: config.enabled,
            internal_custom_events: config.internal_custom_events.clone(),
            resolver: PriorityResolver::new(),
        }
    }

    /// Scene tree
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Mutable scene tree. Structural changes made here do not pause or
    /// resume listeners; call [`node_entered`](Self::node_entered) and
    /// [`node_exited`](Self::node_exited) for that.
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    /// Enable or disable dispatching. A disabled manager drops every event.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether dispatching is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a dispatch is in flight
    pub fn is_dispatching(&self) -> bool {
        self.in_dispatch > 0
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a listener.
    ///
    /// Scene-graph listeners start paused and are resumed right away if
    /// their node is running. During a dispatch the listener is queued and
    /// first sees the next dispatch.
    pub fn register(
        &mut self,
        listener: EventListener<T>,
        priority: impl Into<Priority>,
    ) -> Result<ListenerId, DispatchError> {
        if let Err(err) = listener.check_available() {
            log::warn!("Rejecting listener: {}", err);
            return Err(err);
        }

        let (fixed_priority, node) = match priority.into() {
            Priority::Fixed(0) => {
                log::warn!("Rejecting {} listener: fixed priority 0 is reserved", listener.key());
                return Err(DispatchError::InvalidFixedPriority);
            }
            Priority::Fixed(priority) => (priority, None),
            Priority::SceneGraph(node) => {
                if !self.tree.contains(node) {
                    log::warn!("Rejecting {} listener: node {:?} is not in the tree", listener.key(), node);
                    return Err(DispatchError::UnknownNode(node));
                }
                (0, Some(node))
            }
        };

        let id = self.listeners.insert(ListenerRecord::new(listener, fixed_priority, node));
        if self.in_dispatch == 0 {
            self.force_add(id);
        } else {
            log::debug!("Queueing listener {:?} until the current dispatch finishes", id);
            self.to_add.push(id);
        }
        Ok(id)
    }

    /// Register a custom-event listener at fixed priority 1
    pub fn add_custom_listener<F>(
        &mut self,
        name: impl Into<String>,
        callback: F,
    ) -> Result<ListenerId, DispatchError>
    where
        F: Fn(&mut Self, &mut Event) + 'static,
    {
        self.register(EventListener::custom(name, callback), 1)
    }

    /// Insert a registered record into its bucket
    pub(super) fn force_add(&mut self, id: ListenerId) {
        let Some(record) = self.listeners.get(id) else {
            return;
        };
        let key = record.key.clone();
        let node = record.node;
        let fixed = !record.is_scene_graph();

        if let Some(node) = node.filter(|_| !fixed) {
            if !self.tree.contains(node) {
                log::warn!("Dropping queued listener {:?}: node {:?} no longer exists", id, node);
                self.listeners.remove(id);
                return;
            }
        }

        self.buckets.entry(key.clone()).or_default().push(id, fixed);

        match node {
            Some(node) if !fixed => {
                self.set_dirty(key, DirtyFlags::SCENE_GRAPH_PRIORITY);
                self.associate(node, id);
                if self.tree.is_running(node) {
                    self.resume_target(node, false);
                }
            }
            _ => self.set_dirty(key, DirtyFlags::FIXED_PRIORITY),
        }
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Unregister a listener. Removing a listener twice, or through a
    /// stale id, does nothing.
    pub fn remove(&mut self, id: ListenerId) {
        let Some(record) = self.listeners.get(id) else {
            log::debug!("Ignoring removal of unknown listener {:?}", id);
            return;
        };
        if !record.registered {
            log::debug!("Listener {:?} is already unregistered", id);
            return;
        }
        let key = record.key.clone();
        let fixed = !record.is_scene_graph();

        if let Some(pos) = self.to_add.iter().position(|&queued| queued == id) {
            self.to_add.remove(pos);
            self.listeners.remove(id);
            log::debug!("Dropped queued listener {:?}", id);
            return;
        }

        self.unregister(id);
        self.set_dirty(
            key.clone(),
            if fixed {
                DirtyFlags::FIXED_PRIORITY
            } else {
                DirtyFlags::SCENE_GRAPH_PRIORITY
            },
        );

        if self.in_dispatch > 0 {
            log::debug!("Deferring removal of listener {:?} from {}", id, key);
            self.purge_keys.insert(key);
            return;
        }

        self.listeners.remove(id);
        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.remove(id, fixed);
            if bucket.is_empty() {
                self.buckets.remove(&key);
                self.dirty.remove(&key);
                log::debug!("Deleted empty bucket {}", key);
            }
        }
    }

    /// Unregister every listener of one kind
    pub fn remove_listeners_for_type(&mut self, key: &EventKey) {
        if let Some(bucket) = self.buckets.get(key) {
            let ids: Vec<ListenerId> = bucket.iter().collect();
            for &id in &ids {
                self.unregister(id);
            }
            self.dirty.remove(key);

            if self.in_dispatch == 0 {
                for &id in &ids {
                    self.listeners.remove(id);
                }
                self.buckets.remove(key);
                log::debug!("Removed {} listeners of {}", ids.len(), key);
            } else {
                log::debug!("Deferring removal of {} listeners of {}", ids.len(), key);
                self.purge_keys.insert(key.clone());
            }
        }

        let listeners = &mut self.listeners;
        self.to_add.retain(|&id| {
            if listeners.get(id).is_some_and(|record| &record.key == key) {
                listeners.remove(id);
                false
            } else {
                true
            }
        });
    }

    /// Unregister every listener of a named custom event
    pub fn remove_custom_listeners(&mut self, name: &str) {
        self.remove_listeners_for_type(&EventKey::Custom(name.to_string()));
    }

    /// Unregister every listener except those of the internal custom events
    pub fn remove_all_listeners(&mut self) {
        let mut keys: Vec<EventKey> = self.buckets.keys().cloned().collect();
        for &id in &self.to_add {
            if let Some(record) = self.listeners.get(id) {
                if !keys.contains(&record.key) {
                    keys.push(record.key.clone());
                }
            }
        }

        for key in keys {
            let internal = matches!(&key, EventKey::Custom(name) if self.internal_custom_events.contains(name));
            if !internal {
                self.remove_listeners_for_type(&key);
            }
        }
    }

    /// Unregister every listener attached to `node`, and to its
    /// descendants when `recursive`. The node is also dropped from the
    /// priority cache and the queues.
    pub fn remove_listeners_for_node(&mut self, node: NodeId, recursive: bool) {
        self.node_priority.remove(&node);
        self.dirty_nodes.retain(|&dirty| dirty != node);

        if let Some(ids) = self.node_listeners.get(&node).cloned() {
            for id in ids {
                self.remove(id);
            }
            self.node_listeners.remove(&node);
        }

        let listeners = &mut self.listeners;
        self.to_add.retain(|&id| {
            if listeners.get(id).is_some_and(|record| record.node == Some(node)) {
                listeners.remove(id);
                false
            } else {
                true
            }
        });

        if recursive {
            let children = self.tree.children(node).to_vec();
            for child in children {
                self.remove_listeners_for_node(child, true);
            }
        }
    }

    /// Flag a record as unregistered and detach it from its node
    fn unregister(&mut self, id: ListenerId) {
        let Some(record) = self.listeners.get_mut(id) else {
            return;
        };
        record.registered = false;
        record.claimed_touches.clear();
        if let Some(node) = record.node.take() {
            self.dissociate(node, id);
        }
    }

    fn associate(&mut self, node: NodeId, id: ListenerId) {
        self.node_listeners.entry(node).or_default().push(id);
    }

    fn dissociate(&mut self, node: NodeId, id: ListenerId) {
        if let Some(ids) = self.node_listeners.get_mut(&node) {
            ids.retain(|&other| other != id);
            if ids.is_empty() {
                self.node_listeners.remove(&node);
            }
        }
    }

    // ------------------------------------------------------------------
    // Priority and pause state
    // ------------------------------------------------------------------

    /// Change the fixed priority of a fixed-priority listener. Scene-graph
    /// listeners and unknown ids are left alone.
    pub fn set_priority(&mut self, id: ListenerId, priority: i32) -> Result<(), DispatchError> {
        if priority == 0 {
            log::warn!("Refusing to set fixed priority 0 on listener {:?}", id);
            return Err(DispatchError::InvalidFixedPriority);
        }
        let Some(record) = self.listeners.get_mut(id) else {
            return Ok(());
        };
        if record.is_scene_graph() {
            log::warn!("Listener {:?} uses scene-graph priority; fixed priority unchanged", id);
            return Ok(());
        }
        if record.fixed_priority != priority {
            record.fixed_priority = priority;
            let key = record.key.clone();
            self.set_dirty(key, DirtyFlags::FIXED_PRIORITY);
        }
        Ok(())
    }

    /// Pause every listener attached to `node` (and its descendants when
    /// `recursive`)
    pub fn pause_target(&mut self, node: NodeId, recursive: bool) {
        for target in self.targets(node, recursive) {
            self.set_paused(target, true);
        }
    }

    /// Resume every listener attached to `node` (and its descendants when
    /// `recursive`). The node and every descendant owning listeners is
    /// queued for scene-graph re-sort.
    pub fn resume_target(&mut self, node: NodeId, recursive: bool) {
        for target in self.targets(node, recursive) {
            self.set_paused(target, false);
        }
        self.set_dirty_for_node(node);
    }

    /// Mark `node` running and resume its listeners, recursively. Call when
    /// a subtree becomes part of the running scene.
    pub fn node_entered(&mut self, node: NodeId) {
        for target in self.targets(node, true) {
            self.tree.set_running(target, true);
        }
        self.resume_target(node, true);
    }

    /// Mark `node` stopped and pause its listeners, recursively. Call when
    /// a subtree leaves the running scene.
    pub fn node_exited(&mut self, node: NodeId) {
        for target in self.targets(node, true) {
            self.tree.set_running(target, false);
        }
        self.pause_target(node, true);
    }

    /// Queue `node` and every descendant that owns listeners for
    /// scene-graph re-sort. Nodes already queued are not queued twice.
    pub fn set_dirty_for_node(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if self.node_listeners.contains_key(&current) && !self.dirty_nodes.contains(&current) {
                self.dirty_nodes.push(current);
            }
            stack.extend(self.tree.children(current).iter().rev().copied());
        }
    }

    fn targets(&self, node: NodeId, recursive: bool) -> Vec<NodeId> {
        if !recursive {
            return vec![node];
        }
        let mut targets = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            targets.push(current);
            stack.extend(self.tree.children(current).iter().rev().copied());
        }
        targets
    }

    fn set_paused(&mut self, node: NodeId, paused: bool) {
        let Some(ids) = self.node_listeners.get(&node) else {
            return;
        };
        for &id in ids {
            if let Some(record) = self.listeners.get_mut(id) {
                record.paused = paused;
            }
        }
    }

    fn set_dirty(&mut self, key: EventKey, flags: DirtyFlags) {
        *self.dirty.entry(key).or_insert(DirtyFlags::empty()) |= flags;
    }

    /// Turn queued dirty nodes into scene-graph dirty flags on their keys
    pub(super) fn update_dirty_flags_for_scene_graph(&mut self) {
        if self.dirty_nodes.is_empty() {
            return;
        }
        let nodes = std::mem::take(&mut self.dirty_nodes);
        for node in nodes {
            let Some(ids) = self.node_listeners.get(&node) else {
                continue;
            };
            let keys: Vec<EventKey> = ids
                .iter()
                .filter_map(|&id| self.listeners.get(id).map(|record| record.key.clone()))
                .collect();
            for key in keys {
                self.set_dirty(key, DirtyFlags::SCENE_GRAPH_PRIORITY);
            }
        }
    }

    /// Re-sort a bucket according to its dirty flags. A bucket an outer
    /// frame is walking keeps its flags for a later pass, and so does the
    /// scene-graph half while no scene is running.
    pub(super) fn sort_listeners(&mut self, key: &EventKey) {
        let Some(flags) = self.dirty.get(key).copied() else {
            return;
        };
        if flags.is_empty() {
            return;
        }
        let Some(bucket) = self.buckets.get(key) else {
            self.dirty.remove(key);
            return;
        };
        if bucket.is_walking() {
            log::debug!("Bucket {} is being dispatched; postponing re-sort", key);
            return;
        }

        let mut remaining = DirtyFlags::empty();

        if flags.contains(DirtyFlags::FIXED_PRIORITY) {
            let listeners = &self.listeners;
            if let Some(bucket) = self.buckets.get_mut(key) {
                bucket.sort_fixed(|id| listeners.get(id).map_or(0, |record| record.fixed_priority));
            }
        }

        if flags.contains(DirtyFlags::SCENE_GRAPH_PRIORITY) {
            match self.tree.running_scene() {
                Some(root) => self.sort_scene_graph(key, root),
                None => remaining |= DirtyFlags::SCENE_GRAPH_PRIORITY,
            }
        }

        if remaining.is_empty() {
            self.dirty.remove(key);
        } else {
            self.dirty.insert(key.clone(), remaining);
        }
    }

    fn sort_scene_graph(&mut self, key: &EventKey, root: NodeId) {
        if self.buckets.get(key).map_or(true, |bucket| bucket.scene_graph().is_empty()) {
            return;
        }

        let node_listeners = &self.node_listeners;
        self.node_priority = self
            .resolver
            .resolve(&self.tree, root, |node| node_listeners.contains_key(&node));

        let listeners = &self.listeners;
        let node_priority = &self.node_priority;
        if let Some(bucket) = self.buckets.get_mut(key) {
            bucket.sort_scene_graph(|id| {
                listeners
                    .get(id)
                    .and_then(|record| record.node)
                    .and_then(|node| node_priority.get(&node).copied())
            });
        }
        log::trace!("Sorted scene-graph listeners of {}", key);
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Deliver `event` to its listeners in priority order.
    ///
    /// Returns `Err(MalformedEvent)` without invoking anything for a custom
    /// event with an empty name or a touch event without touches. A
    /// disabled manager drops the event and returns `Ok`.
    pub fn dispatch(&mut self, event: &mut Event) -> Result<(), DispatchError> {
        if !self.enabled {
            log::trace!("Event manager disabled; dropping {:?} event", event.event_type());
            return Ok(());
        }
        event.validate()?;

        self.update_dirty_flags_for_scene_graph();
        self.in_dispatch += 1;

        match event.listener_key() {
            None => self.dispatch_touch_event(event),
            Some(key) => {
                self.sort_listeners(&key);
                self.dispatch_to_listeners(&key, event, Self::invoke_event_listener);
                self.update_listeners(&[key]);
            }
        }

        self.in_dispatch -= 1;
        Ok(())
    }

    /// Dispatch a custom event named `name`, optionally carrying data
    pub fn dispatch_custom(
        &mut self,
        name: &str,
        user_data: Option<Box<dyn Any>>,
    ) -> Result<(), DispatchError> {
        let mut event = match user_data {
            Some(data) => Event::custom_with_data(name, data),
            None => Event::custom(name),
        };
        self.dispatch(&mut event)
    }

    /// Walk a bucket: negative fixed priorities, then scene-graph, then the
    /// rest. Skips listeners that are unregistered, disabled or paused.
    /// Returns true when `on_event` stopped the walk.
    pub(super) fn dispatch_to_listeners(
        &mut self,
        key: &EventKey,
        event: &mut Event,
        on_event: WalkCallback<T>,
    ) -> bool {
        let Some(bucket) = self.buckets.get_mut(key) else {
            return false;
        };
        bucket.begin_walk();
        let gt0 = bucket.gt0_index();
        let fixed_len = bucket.fixed().len();
        let scene_graph_len = bucket.scene_graph().len();

        let segments = [(false, 0..gt0), (true, 0..scene_graph_len), (false, gt0..fixed_len)];
        let mut stopped = false;
        'walk: for (scene_graph, range) in segments {
            for index in range {
                let Some(id) = self.entry_at(key, scene_graph, index) else {
                    break;
                };
                if !self.listeners.get(id).is_some_and(ListenerRecord::is_dispatchable) {
                    continue;
                }
                if on_event(self, id, event) {
                    stopped = true;
                    break 'walk;
                }
            }
        }

        if let Some(bucket) = self.buckets.get_mut(key) {
            bucket.end_walk();
        }
        stopped
    }

    fn entry_at(&self, key: &EventKey, scene_graph: bool, index: usize) -> Option<ListenerId> {
        let bucket = self.buckets.get(key)?;
        let entries = if scene_graph { bucket.scene_graph() } else { bucket.fixed() };
        entries.get(index).copied()
    }

    /// Run a plain event callback; returns whether the event was stopped
    fn invoke_event_listener(&mut self, id: ListenerId, event: &mut Event) -> bool {
        let Some((handler, node)) = self.handler_of(id) else {
            return false;
        };
        event.set_current_target(node);
        if let Handler::Event(callback) = handler {
            log::trace!("Invoking listener {:?}", id);
            callback(self, event);
        }
        event.is_stopped()
    }

    /// Shared handle to a listener's callbacks and its node. The record may
    /// be tombstoned or re-entered while the handle is in use.
    pub(super) fn handler_of(&self, id: ListenerId) -> Option<(Handler<T>, Option<NodeId>)> {
        let record = self.listeners.get(id)?;
        Some((record.handler.clone(), record.node))
    }

    /// Compact after a dispatch: drop unregistered entries from `keys` and
    /// from every key that saw a removal, delete empty buckets, then promote
    /// queued registrations. Only the outermost frame does this.
    pub(super) fn update_listeners(&mut self, keys: &[EventKey]) {
        debug_assert!(self.in_dispatch > 0, "compaction outside of a dispatch");
        if self.in_dispatch > 1 {
            return;
        }

        let mut purge: Vec<EventKey> = keys.to_vec();
        for key in self.purge_keys.drain() {
            if !purge.contains(&key) {
                purge.push(key);
            }
        }

        for key in &purge {
            let listeners = &self.listeners;
            let dropped = match self.buckets.get_mut(key) {
                Some(bucket) => bucket.retain(|id| listeners.get(id).is_some_and(|record| record.registered)),
                None => continue,
            };
            for id in dropped {
                self.listeners.remove(id);
            }
        }

        let empty: Vec<EventKey> = self
            .buckets
            .iter()
            .filter(|(_, bucket)| bucket.is_empty())
            .map(|(key, _)| key.clone())
            .collect();
        for key in empty {
            self.buckets.remove(&key);
            self.dirty.remove(&key);
            log::debug!("Deleted empty bucket {}", key);
        }

        if !self.to_add.is_empty() {
            let queued = std::mem::take(&mut self.to_add);
            log::debug!("Promoting {} queued listeners", queued.len());
            for id in queued {
                self.force_add(id);
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether `id` refers to a registered listener
    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.listeners.get(id).is_some_and(|record| record.registered)
    }

    /// Whether the listener is paused
    pub fn is_paused(&self, id: ListenerId) -> bool {
        self.listeners.get(id).is_some_and(|record| record.paused)
    }

    /// Whether the listener is enabled
    pub fn is_listener_enabled(&self, id: ListenerId) -> bool {
        self.listeners.get(id).is_some_and(|record| record.enabled)
    }

    /// Enable or disable a single listener
    pub fn set_listener_enabled(&mut self, id: ListenerId, enabled: bool) {
        if let Some(record) = self.listeners.get_mut(id) {
            record.enabled = enabled;
        }
    }

    /// Fixed priority of the listener; `Some(0)` for scene-graph listeners
    pub fn fixed_priority(&self, id: ListenerId) -> Option<i32> {
        self.listeners.get(id).map(|record| record.fixed_priority)
    }

    /// Node a scene-graph listener is attached to
    pub fn target_node(&self, id: ListenerId) -> Option<NodeId> {
        self.listeners.get(id).and_then(|record| record.node)
    }

    /// Touch ids the listener currently claims
    pub fn claimed_touches(&self, id: ListenerId) -> &[u32] {
        self.listeners
            .get(id)
            .map_or(&[][..], |record| record.claimed_touches.as_slice())
    }

    /// Change whether a one-by-one touch listener swallows claimed touches
    pub fn set_swallow_touches(&mut self, id: ListenerId, swallow: bool) {
        if let Some(record) = self.listeners.get_mut(id) {
            record.swallow_touches = swallow;
        }
    }

    /// Number of registered listeners for `key`, queued ones included
    pub fn listener_count(&self, key: &EventKey) -> usize {
        let in_bucket = self.buckets.get(key).map_or(0, |bucket| {
            bucket.iter().filter(|&id| self.is_registered(id)).count()
        });
        let queued = self
            .to_add
            .iter()
            .filter(|&&id| self.listeners.get(id).is_some_and(|record| &record.key == key))
            .count();
        in_bucket + queued
    }

    /// Whether any registered listener exists for `key`
    pub fn has_listeners(&self, key: &EventKey) -> bool {
        self.listener_count(key) > 0
    }

    /// Bucket for `key`, if one exists
    pub fn bucket(&self, key: &EventKey) -> Option<&ListenerBucket> {
        self.buckets.get(key)
    }

    /// Dirty flags pending for `key`
    pub fn dirty_flags(&self, key: &EventKey) -> DirtyFlags {
        self.dirty.get(key).copied().unwrap_or(DirtyFlags::empty())
    }

    /// Scene-graph priority computed for `node` by the last re-sort
    pub fn node_priority(&self, node: NodeId) -> Option<u32> {
        self.node_priority.get(&node).copied()
    }
}

impl EventManager<SceneTree> {
    /// Run `scene`, pausing the listeners of the previous scene and
    /// resuming those of the new one
    pub fn run_scene(&mut self, scene: NodeId) {
        if let Some(previous) = self.tree.running_scene() {
            self.pause_target(previous, true);
        }
        self.tree.run_scene(scene);
        if self.tree.running_scene() == Some(scene) {
            self.resume_target(scene, true);
        }
    }

    /// Attach `child` under `parent`; a subtree joining a running scene has
    /// its listeners resumed
    pub fn add_child(&mut self, parent: NodeId, child: NodeId, local_z: i32) -> bool {
        if !self.tree.add_child(parent, child, local_z) {
            return false;
        }
        if self.tree.is_running(child) {
            self.resume_target(child, true);
        }
        true
    }

    /// Detach `node` from its parent and pause its listeners
    pub fn remove_from_parent(&mut self, node: NodeId) {
        self.tree.remove_from_parent(node);
        self.pause_target(node, true);
    }

    /// Change a node's local z-order and queue it for re-sort
    pub fn set_local_z_order(&mut self, node: NodeId, local_z: i32) {
        self.tree.set_local_z_order(node, local_z);
        self.set_dirty_for_node(node);
    }

    /// Change a node's global z-order and queue it for re-sort
    pub fn set_global_z_order(&mut self, node: NodeId, global_z: f32) {
        self.tree.set_global_z_order(node, global_z);
        self.set_dirty_for_node(node);
    }

    /// Destroy `node` and its subtree, force-removing every listener
    /// attached to them. Claimed touches of those listeners are abandoned.
    pub fn destroy_node(&mut self, node: NodeId) {
        for destroyed in self.tree.destroy(node) {
            self.remove_listeners_for_node(destroyed, false);
        }
    }
}

impl<T> fmt::Debug for EventManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("listeners", &self.listeners.len())
            .field("buckets", &self.buckets.keys().collect::<Vec<_>>())
            .field("queued", &self.to_add.len())
            .field("in_dispatch", &self.in_dispatch)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
