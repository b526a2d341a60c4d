//! Arena-backed scene tree
//!
//! Nodes live in a slot map; parent/child links are ids. Children are kept
//! sorted by local z-order so traversals can split them at zero.

use super::{NodeId, NodeTree};
use slotmap::SlotMap;

#[derive(Debug)]
struct NodeData {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local_z: i32,
    global_z: f32,
    running: bool,
    /// Order in which the node was attached to its current parent
    arrival: u64,
}

/// Simple scene tree with generational node handles
#[derive(Debug, Default)]
pub struct SceneTree {
    nodes: SlotMap<NodeId, NodeData>,
    scene: Option<NodeId>,
    next_arrival: u64,
}

impl SceneTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.nodes.insert(NodeData {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            local_z: 0,
            global_z: 0.0,
            running: false,
            arrival: 0,
        })
    }

    /// Create a node and attach it under `parent` with the given local z-order
    pub fn spawn_child(&mut self, parent: NodeId, name: impl Into<String>, local_z: i32) -> NodeId {
        let node = self.create_node(name);
        self.add_child(parent, node, local_z);
        node
    }

    /// Attach `child` under `parent`. A child that already has a parent is
    /// moved. Returns false if either node is unknown or the link would
    /// create a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId, local_z: i32) -> bool {
        if parent == child || !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return false;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("Refusing to attach {:?} under its own descendant {:?}", child, parent);
            return false;
        }

        self.detach(child);
        let arrival = self.next_arrival;
        self.next_arrival += 1;

        let running = self.nodes[parent].running;
        if let Some(data) = self.nodes.get_mut(child) {
            data.parent = Some(parent);
            data.local_z = local_z;
            data.arrival = arrival;
        }
        self.nodes[parent].children.push(child);
        self.sort_children(parent);

        if running {
            self.set_running_recursive(child, true);
        }
        true
    }

    /// Detach `node` from its parent without destroying it
    pub fn remove_from_parent(&mut self, node: NodeId) {
        self.detach(node);
        self.set_running_recursive(node, false);
    }

    /// Destroy `node` and its whole subtree. Returns every destroyed id,
    /// parents before children.
    pub fn destroy(&mut self, node: NodeId) -> Vec<NodeId> {
        if !self.nodes.contains_key(node) {
            return Vec::new();
        }
        self.detach(node);

        let mut destroyed = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(data) = self.nodes.remove(id) {
                destroyed.push(id);
                stack.extend(data.children.into_iter().rev());
            }
        }

        if self.scene.is_some_and(|scene| !self.nodes.contains_key(scene)) {
            self.scene = None;
        }
        destroyed
    }

    /// Make `scene` the running scene. The previous scene stops running.
    pub fn run_scene(&mut self, scene: NodeId) {
        if let Some(previous) = self.scene.take() {
            self.set_running_recursive(previous, false);
        }
        if self.nodes.contains_key(scene) {
            self.scene = Some(scene);
            self.set_running_recursive(scene, true);
        }
    }

    /// Change a node's local z-order, re-sorting its siblings
    pub fn set_local_z_order(&mut self, node: NodeId, local_z: i32) {
        let Some(data) = self.nodes.get_mut(node) else {
            return;
        };
        data.local_z = local_z;
        if let Some(parent) = data.parent {
            self.sort_children(parent);
        }
    }

    /// Change a node's global z-order
    pub fn set_global_z_order(&mut self, node: NodeId, global_z: f32) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.global_z = global_z;
        }
    }

    /// Node name, for logging
    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|data| data.name.as_str())
    }

    /// Parent of `node`
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|data| data.parent)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(node).and_then(|data| data.parent.take()) else {
            return;
        };
        if let Some(parent_data) = self.nodes.get_mut(parent) {
            parent_data.children.retain(|&c| c != node);
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        while let Some(parent) = self.parent(node) {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }

    fn sort_children(&mut self, parent: NodeId) {
        let Some(mut children) = self.nodes.get_mut(parent).map(|data| std::mem::take(&mut data.children))
        else {
            return;
        };
        children.sort_by_key(|&c| self.nodes.get(c).map_or((0, 0), |d| (d.local_z, d.arrival)));
        self.nodes[parent].children = children;
    }

    fn set_running_recursive(&mut self, node: NodeId, running: bool) {
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(data) = self.nodes.get_mut(id) {
                data.running = running;
                stack.extend(data.children.iter().copied());
            }
        }
    }
}

impl NodeTree for SceneTree {
    fn running_scene(&self) -> Option<NodeId> {
        self.scene
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node).map_or(&[][..], |data| data.children.as_slice())
    }

    fn is_running(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|data| data.running)
    }

    fn set_running(&mut self, node: NodeId, running: bool) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.running = running;
        }
    }

    fn local_z_order(&self, node: NodeId) -> i32 {
        self.nodes.get(node).map_or(0, |data| data.local_z)
    }

    fn global_z_order(&self, node: NodeId) -> f32 {
        self.nodes.get(node).map_or(0.0, |data| data.global_z)
    }
}
