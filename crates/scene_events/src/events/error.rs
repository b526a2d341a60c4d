//! Dispatch errors

use crate::scene::NodeId;
use thiserror::Error;

/// Errors returned by [`EventManager`](super::EventManager) operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Fixed priority 0 is reserved for scene-graph listeners
    #[error("Fixed priority 0 is reserved for scene-graph priority")]
    InvalidFixedPriority,

    /// Listener lacks a callback its kind requires
    #[error("Listener for {0} is missing a required callback")]
    UnavailableListener(String),

    /// Scene-graph registration against a node the tree does not know
    #[error("Scene node {0:?} does not exist")]
    UnknownNode(NodeId),

    /// Event cannot be routed; a programming error at the call site
    #[error("Malformed event: {0}")]
    MalformedEvent(String),
}
