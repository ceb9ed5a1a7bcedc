//! Changes the engine applies to its raw node and edge lists.
//!
//! Tools emit these; hosts may also build them directly. A batch is applied
//! as a whole: either every change lands and the table is rebuilt, or the
//! engine keeps its previous state.

use dg_core::geometry::{Dimensions, Point};
use dg_core::id::NodeId;
use dg_core::model::Edge;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    /// Move a node to a new parent-relative position.
    Position {
        id: NodeId,
        position: Point,
        dragging: bool,
    },
    Select {
        id: NodeId,
        selected: bool,
    },
    Dimensions {
        id: NodeId,
        dimensions: Dimensions,
    },
    /// Remove a node, its descendants and their edges.
    Remove {
        id: NodeId,
    },
    /// Move a node under another parent (or to the root) without moving it
    /// on screen.
    Reparent {
        id: NodeId,
        parent_id: Option<NodeId>,
    },
}

impl NodeChange {
    pub fn id(&self) -> NodeId {
        match self {
            NodeChange::Position { id, .. }
            | NodeChange::Select { id, .. }
            | NodeChange::Dimensions { id, .. }
            | NodeChange::Remove { id }
            | NodeChange::Reparent { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EdgeChange {
    Add(Edge),
    Remove { id: NodeId },
}

/// Anything a tool can ask the engine to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Node(NodeChange),
    Edge(EdgeChange),
}

impl From<NodeChange> for Change {
    fn from(change: NodeChange) -> Self {
        Change::Node(change)
    }
}

impl From<EdgeChange> for Change {
    fn from(change: EdgeChange) -> Self {
        Change::Edge(change)
    }
}
