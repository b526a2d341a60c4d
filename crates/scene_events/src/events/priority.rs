//! Scene-graph priority resolution
//!
//! Walks the running scene in draw order: children with negative local
//! z-order first, then the node itself, then the remaining children. Nodes
//! that own listeners are grouped by global z-order (stable, so ties keep
//! traversal order) and numbered from 1. A higher number is drawn later and
//! therefore sees events first.

use crate::scene::{NodeId, NodeTree};
use std::collections::HashMap;

/// Computes per-node dispatch priority from the scene tree
#[derive(Debug, Default)]
pub struct PriorityResolver {
    visited: Vec<(f32, NodeId)>,
}

impl PriorityResolver {
    /// Create a resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Priorities for every node under `root` for which `owns_listeners`
    /// holds. Nodes outside the subtree get no entry.
    pub fn resolve<T, F>(&mut self, tree: &T, root: NodeId, owns_listeners: F) -> HashMap<NodeId, u32>
    where
        T: NodeTree + ?Sized,
        F: Fn(NodeId) -> bool,
    {
        self.visited.clear();
        self.visit(tree, root, &owns_listeners);

        self.visited.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut priorities = HashMap::with_capacity(self.visited.len());
        let mut next = 0_u32;
        for &(_, node) in &self.visited {
            next += 1;
            priorities.insert(node, next);
        }

        log::trace!("Resolved scene-graph priority for {} nodes", priorities.len());
        priorities
    }

    fn visit<T, F>(&mut self, tree: &T, node: NodeId, owns_listeners: &F)
    where
        T: NodeTree + ?Sized,
        F: Fn(NodeId) -> bool,
    {
        let children = tree.children(node);
        let split = children.partition_point(|&child| tree.local_z_order(child) < 0);

        for &child in &children[..split] {
            self.visit(tree, child, owns_listeners);
        }

        if owns_listeners(node) {
            self.visited.push((tree.global_z_order(node), node));
        }

        for &child in &children[split..] {
            self.visit(tree, child, owns_listeners);
        }
    }
}
