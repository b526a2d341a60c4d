//! Scene node adapter
//!
//! The event manager never owns scene nodes. It reads the tree through
//! [`NodeTree`] to derive scene-graph priority, and refers to nodes by
//! generational [`NodeId`] keys so a destroyed node is never dereferenced.
//! [`SceneTree`] is an arena-backed implementation used by the demo and tests.

pub mod scene_graph;

pub use scene_graph::SceneTree;

slotmap::new_key_type! {
    /// Stable identity of a scene node. Keys of destroyed nodes are never reused
    /// for live nodes, so a stale id simply stops resolving.
    pub struct NodeId;
}

/// Read access to the scene tree, plus the running toggle driven by node
/// enter/exit.
pub trait NodeTree {
    /// Root of the currently running scene, if any
    fn running_scene(&self) -> Option<NodeId>;

    /// Whether the node is still alive in the tree
    fn contains(&self, node: NodeId) -> bool;

    /// Children of `node` in ascending local z-order (ties in arrival order).
    /// Unknown nodes have no children.
    fn children(&self, node: NodeId) -> &[NodeId];

    /// Whether the node is currently part of a running scene
    fn is_running(&self, node: NodeId) -> bool;

    /// Mark the node as running or stopped
    fn set_running(&mut self, node: NodeId, running: bool);

    /// Z-order relative to siblings
    fn local_z_order(&self, node: NodeId) -> i32;

    /// Z-order used to group nodes across the whole scene
    fn global_z_order(&self, node: NodeId) -> f32;
}
