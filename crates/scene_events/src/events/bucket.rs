//! Per-key listener storage
//!
//! A bucket keeps fixed-priority listeners (sorted ascending, split at
//! `gt0_index` into negative and non-negative priorities) apart from
//! scene-graph listeners (sorted by node draw order). Dispatch walks
//! negative fixed, then scene-graph, then non-negative fixed.

use super::listener::ListenerId;
use bitflags::bitflags;

bitflags! {
    /// Which half of a bucket needs re-sorting before its next dispatch
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u8 {
        /// Fixed-priority order is stale
        const FIXED_PRIORITY = 1 << 0;
        /// Scene-graph order is stale
        const SCENE_GRAPH_PRIORITY = 1 << 1;
    }
}

/// Listeners registered for one [`EventKey`](super::EventKey)
#[derive(Debug, Default)]
pub struct ListenerBucket {
    fixed: Vec<ListenerId>,
    scene_graph: Vec<ListenerId>,
    gt0_index: usize,
    /// Dispatch frames currently iterating this bucket
    walkers: u32,
}

impl ListenerBucket {
    /// Create an empty bucket
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed-priority listeners, ascending after the last sort
    pub fn fixed(&self) -> &[ListenerId] {
        &self.fixed
    }

    /// Scene-graph listeners, topmost node first after the last sort
    pub fn scene_graph(&self) -> &[ListenerId] {
        &self.scene_graph
    }

    /// First fixed index whose priority is non-negative
    pub fn gt0_index(&self) -> usize {
        self.gt0_index.min(self.fixed.len())
    }

    /// Total number of entries, unregistered ones included
    pub fn len(&self) -> usize {
        self.fixed.len() + self.scene_graph.len()
    }

    /// Whether both sequences are empty
    pub fn is_empty(&self) -> bool {
        self.fixed.is_empty() && self.scene_graph.is_empty()
    }

    /// Whether a dispatch frame is iterating this bucket
    pub fn is_walking(&self) -> bool {
        self.walkers > 0
    }

    /// Every entry, fixed first
    pub fn iter(&self) -> impl Iterator<Item = ListenerId> + '_ {
        self.fixed.iter().chain(self.scene_graph.iter()).copied()
    }

    pub(crate) fn push(&mut self, id: ListenerId, fixed: bool) {
        if fixed {
            self.fixed.push(id);
        } else {
            self.scene_graph.push(id);
        }
    }

    /// Splice `id` out. Only valid when no frame is walking the bucket.
    pub(crate) fn remove(&mut self, id: ListenerId, fixed: bool) -> bool {
        debug_assert!(!self.is_walking(), "splicing a bucket during its own walk");
        if fixed {
            let Some(pos) = self.fixed.iter().position(|&x| x == id) else {
                return false;
            };
            self.fixed.remove(pos);
            if pos < self.gt0_index {
                self.gt0_index -= 1;
            }
        } else {
            let Some(pos) = self.scene_graph.iter().position(|&x| x == id) else {
                return false;
            };
            self.scene_graph.remove(pos);
        }
        true
    }

    /// Keep entries matching `keep`; returns the dropped ids. `gt0_index`
    /// keeps pointing at the same split.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(ListenerId) -> bool) -> Vec<ListenerId> {
        debug_assert!(!self.is_walking(), "compacting a bucket during its own walk");
        let mut dropped = Vec::new();

        let old_gt0 = self.gt0_index();
        let mut kept_negative = 0;
        let mut index = 0;
        self.fixed.retain(|&id| {
            let kept = keep(id);
            if kept && index < old_gt0 {
                kept_negative += 1;
            }
            if !kept {
                dropped.push(id);
            }
            index += 1;
            kept
        });
        self.gt0_index = kept_negative;

        self.scene_graph.retain(|&id| {
            let kept = keep(id);
            if !kept {
                dropped.push(id);
            }
            kept
        });
        dropped
    }

    /// Stable ascending sort by fixed priority; recomputes `gt0_index`
    pub(crate) fn sort_fixed(&mut self, priority_of: impl Fn(ListenerId) -> i32) {
        self.fixed.sort_by_key(|&id| priority_of(id));
        self.gt0_index = self.fixed.partition_point(|&id| priority_of(id) < 0);
    }

    /// Stable descending sort by node priority; listeners without a known
    /// node priority go last
    pub(crate) fn sort_scene_graph(&mut self, node_priority_of: impl Fn(ListenerId) -> Option<u32>) {
        self.scene_graph
            .sort_by(|&a, &b| node_priority_of(b).cmp(&node_priority_of(a)));
    }

    pub(crate) fn begin_walk(&mut self) {
        self.walkers += 1;
    }

    pub(crate) fn end_walk(&mut self) {
        self.walkers = self.walkers.saturating_sub(1);
    }
}
