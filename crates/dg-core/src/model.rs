//! Core data model for diagrams.
//!
//! The host supplies flat lists of [`Node`] and [`Edge`] values. Nesting is
//! expressed by `parent_id` references only, never by ownership: the node
//! list is an arena keyed by [`NodeId`]. Derived state (absolute position,
//! stacking order, parent flag, measured ports) lives on [`ResolvedNode`],
//! which the resolver builds; caller-supplied nodes are never mutated.

use crate::geometry::{Dimensions, Point, Rect};
use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

// ─── Sides & ports ───────────────────────────────────────────────────────

/// Compass side of a node that a port sits on and an edge leaves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Outward unit vector: left=(-1,0), right=(1,0), top=(0,-1), bottom=(0,1).
    pub fn direction(self) -> Point {
        match self {
            Side::Left => Point::new(-1.0, 0.0),
            Side::Right => Point::new(1.0, 0.0),
            Side::Top => Point::new(0.0, -1.0),
            Side::Bottom => Point::new(0.0, 1.0),
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }

    /// True for left/right.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

/// Direction of use of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    /// Outgoing: edges start here.
    Source,
    /// Incoming: edges end here.
    Target,
}

/// A connection point on a node, in node-relative diagram units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: Option<NodeId>,
    pub side: Side,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Port {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Ports of one node grouped by direction of use.
///
/// `None` in a group means the renderer has not reported any port of that
/// type (yet); callers treat that as "not routable", not as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortBounds {
    pub source: Option<SmallVec<[Port; 4]>>,
    pub target: Option<SmallVec<[Port; 4]>>,
}

impl PortBounds {
    pub fn get(&self, port_type: PortType) -> Option<&[Port]> {
        match port_type {
            PortType::Source => self.source.as_deref(),
            PortType::Target => self.target.as_deref(),
        }
    }
}

// ─── Viewport & configuration values ─────────────────────────────────────

/// Pan/zoom affine mapping between screen and diagram space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Horizontal translation in screen pixels.
    pub x: f64,
    /// Vertical translation in screen pixels.
    pub y: f64,
    /// Scale factor, always > 0.
    pub zoom: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Transform {
    pub const fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self { x, y, zoom }
    }
}

/// Fractional anchor `(ox, oy) ∈ [0,1]²` applied to every node.
///
/// `(0, 0)` anchors a node's position at its top-left corner,
/// `(0.5, 0.5)` at its center.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeOrigin(pub f64, pub f64);

impl NodeOrigin {
    pub const TOP_LEFT: NodeOrigin = NodeOrigin(0.0, 0.0);
    pub const CENTER: NodeOrigin = NodeOrigin(0.5, 0.5);

    /// Offset from anchor to top-left corner for a box of `size`.
    pub fn offset(&self, size: Option<Dimensions>) -> Point {
        match size {
            Some(d) => Point::new(d.width * self.0, d.height * self.1),
            None => Point::ZERO,
        }
    }
}

/// Grid step used for snapping; a zero component disables snapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStep(pub f64, pub f64);

impl GridStep {
    pub fn is_enabled(&self) -> bool {
        self.0 > 0.0 && self.1 > 0.0
    }
}

/// Rectangular region a point (or a node box) is clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateExtent {
    pub min: Point,
    pub max: Point,
}

impl CoordinateExtent {
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A node as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,

    /// Relative to the parent's top-left corner, or absolute for roots.
    pub position: Point,

    /// Unknown until the renderer first measures the node.
    #[serde(default)]
    pub dimensions: Option<Dimensions>,

    #[serde(default)]
    pub parent_id: Option<NodeId>,

    /// Explicit stacking hint.
    #[serde(default)]
    pub z_index: Option<i32>,

    #[serde(default)]
    pub selected: bool,

    #[serde(default)]
    pub hidden: bool,

    /// `None` defers to the diagram-wide default.
    #[serde(default)]
    pub selectable: Option<bool>,

    /// `None` defers to the diagram-wide default.
    #[serde(default)]
    pub draggable: Option<bool>,

    /// Set while the node is being dragged.
    #[serde(default)]
    pub dragging: bool,

    /// Renderer tag, opaque to the engine.
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, position: Point) -> Self {
        Self {
            id: id.into(),
            position,
            dimensions: None,
            parent_id: None,
            z_index: None,
            selected: false,
            hidden: false,
            selectable: None,
            draggable: None,
            dragging: false,
            node_type: None,
        }
    }

    pub fn with_dimensions(mut self, width: f64, height: f64) -> Self {
        self.dimensions = Some(Dimensions::new(width, height));
        self
    }

    pub fn with_parent(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn with_z_index(mut self, z: i32) -> Self {
        self.z_index = Some(z);
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

/// A node plus everything the resolver derives for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNode {
    /// Copy of the input node. `dimensions` holds the effective size:
    /// the node's own, or the size carried forward from the previous table.
    pub node: Node,
    /// Absolute anchor position (sum of the ancestor chain).
    pub position_absolute: Point,
    /// Resolved stacking order.
    pub z: i32,
    /// True iff another node references this one as its parent.
    pub is_parent: bool,
    /// Measured ports, carried across rebuilds.
    pub port_bounds: Option<PortBounds>,
}

impl ResolvedNode {
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.node.dimensions
    }

    /// Known and non-zero in both axes.
    pub fn has_area(&self) -> bool {
        self.node.dimensions.is_some_and(|d| d.is_non_empty())
    }

    /// Absolute top-left corner after applying the node origin.
    pub fn corner(&self, origin: NodeOrigin) -> Point {
        self.position_absolute - origin.offset(self.node.dimensions)
    }

    /// Absolute box after applying the node origin; unmeasured nodes get a
    /// zero-size rect at their corner.
    pub fn rect(&self, origin: NodeOrigin) -> Rect {
        Rect::from_origin_size(
            self.corner(origin),
            self.node.dimensions.unwrap_or_default(),
        )
    }
}

// ─── Node table ──────────────────────────────────────────────────────────

/// The resolved node table: nodes in input order plus an id index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeTable {
    pub(crate) nodes: Vec<ResolvedNode>,
    pub(crate) index: HashMap<NodeId, usize>,
}

impl NodeTable {
    /// Build a table, keeping the last entry for a repeated id.
    pub(crate) fn from_nodes(nodes: Vec<ResolvedNode>) -> Self {
        let mut table = NodeTable {
            nodes: Vec::with_capacity(nodes.len()),
            index: HashMap::with_capacity(nodes.len()),
        };
        for node in nodes {
            match table.index.get(&node.id()) {
                Some(&slot) => table.nodes[slot] = node,
                None => {
                    table.index.insert(node.id(), table.nodes.len());
                    table.nodes.push(node);
                }
            }
        }
        table
    }

    pub fn get(&self, id: NodeId) -> Option<&ResolvedNode> {
        self.index.get(&id).map(|&slot| &self.nodes[slot])
    }

    /// Mutable access for patching cached measurements before a rebuild.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ResolvedNode> {
        let slot = *self.index.get(&id)?;
        self.nodes.get_mut(slot)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of `id`'s ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.get(id).and_then(|n| n.node.parent_id);
        while let Some(parent) = current {
            // The resolver rejects cycles, but stay finite on hand-built tables.
            if out.contains(&parent) || parent == id {
                break;
            }
            out.push(parent);
            current = self.get(parent).and_then(|n| n.node.parent_id);
        }
        out
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        ancestor != descendant && self.ancestors(descendant).contains(&ancestor)
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// How an edge path is drawn between two ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    Straight,
    Bezier,
    /// Orthogonal segments with rounded bends.
    #[default]
    Step,
}

/// A connection between two nodes as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: NodeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub source_handle: Option<NodeId>,
    #[serde(default)]
    pub target_handle: Option<NodeId>,
    /// Routing style tag, looked up in the edge-type registry.
    #[serde(default, rename = "type")]
    pub edge_type: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    /// Style and label metadata, opaque to the engine.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl Edge {
    pub fn new(id: impl Into<NodeId>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
            edge_type: None,
            label: None,
            data: None,
        }
    }

    pub fn with_type(mut self, edge_type: &str) -> Self {
        self.edge_type = Some(edge_type.to_string());
        self
    }

    pub fn with_handles(mut self, source: Option<&str>, target: Option<&str>) -> Self {
        self.source_handle = source.map(NodeId::intern);
        self.target_handle = target.map(NodeId::intern);
        self
    }
}

// ─── Path data ───────────────────────────────────────────────────────────

/// A single path command (SVG-like but simplified).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCmd {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    QuadTo(f64, f64, f64, f64),            // control, end
    CubicTo(f64, f64, f64, f64, f64, f64), // c1, c2, end
}

impl PathCmd {
    pub fn is_curve(&self) -> bool {
        matches!(self, PathCmd::QuadTo(..) | PathCmd::CubicTo(..))
    }
}

/// Serialize commands as SVG path data (`M0 0L0 20Q0 70 5 70`).
pub fn svg_path_data(commands: &[PathCmd]) -> String {
    use std::fmt::Write;
    let mut out = String::new();
    for cmd in commands {
        match *cmd {
            PathCmd::MoveTo(x, y) => write!(out, "M{x} {y}").ok(),
            PathCmd::LineTo(x, y) => write!(out, "L{x} {y}").ok(),
            PathCmd::QuadTo(cx, cy, x, y) => write!(out, "Q{cx} {cy} {x} {y}").ok(),
            PathCmd::CubicTo(c1x, c1y, c2x, c2y, x, y) => {
                write!(out, "C{c1x} {c1y} {c2x} {c2y} {x} {y}").ok()
            }
        };
    }
    out
}
