//! Tool system for canvas interactions.
//!
//! Each tool translates input events into [`Change`]s that the
//! [`DiagramEngine`] applies. Tools read the engine but never write it.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Select Tool | Connect Tool |
//! |----------|-------------|--------------|
//! | **Shift** | Toggle node in/out of selection; keep selection when starting a marquee | - |

use crate::changes::{Change, EdgeChange, NodeChange};
use crate::engine::DiagramEngine;
use crate::input::InputEvent;
use dg_core::geometry::{Dimensions, Point, Rect};
use dg_core::id::NodeId;
use dg_core::model::{Edge, EdgeStyle, Port, PortType, ResolvedNode, Side};
use dg_core::ports::port_anchor;
use dg_core::query::VisibilityFilter;
use dg_core::route::{EdgePath, route_connection_line};
use dg_core::transform::clamp_position;
use smallvec::SmallVec;

/// The active tool determines how input events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Select,
    Connect,
}

/// Trait for tools that handle input and produce changes.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Handle an input event. `hit` is the topmost node under the pointer.
    fn handle(&mut self, event: &InputEvent, hit: Option<NodeId>, engine: &DiagramEngine) -> Vec<Change>;
}

// ─── Select Tool ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct DraggedNode {
    id: NodeId,
    /// Absolute anchor when the drag started.
    start: Point,
    /// Absolute corner of the parent, for converting back to relative.
    parent_corner: Option<Point>,
    size: Option<Dimensions>,
}

#[derive(Debug, Clone, PartialEq)]
struct Drag {
    /// Pointer in diagram space when the drag started.
    pointer_start: Point,
    nodes: SmallVec<[DraggedNode; 4]>,
    moved: bool,
}

#[derive(Debug, Default)]
pub struct SelectTool {
    drag: Option<Drag>,
    /// Screen point where the marquee started.
    pub marquee_start: Option<Point>,
    /// Current marquee rect in screen space. Updated during drag.
    pub marquee_rect: Option<Rect>,
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn pointer_down(
        &mut self,
        screen: Point,
        shift: bool,
        hit: Option<NodeId>,
        engine: &DiagramEngine,
    ) -> Vec<Change> {
        self.drag = None;
        self.marquee_start = None;
        self.marquee_rect = None;

        let Some(node) = hit.and_then(|id| engine.get(id)) else {
            // Empty space: start a marquee.
            self.marquee_start = Some(screen);
            self.marquee_rect = Some(Rect::from_origin_size(screen, Dimensions::default()));
            if shift {
                return Vec::new();
            }
            return engine
                .selected_ids()
                .into_iter()
                .map(|id| NodeChange::Select { id, selected: false }.into())
                .collect();
        };

        let hit_id = node.id();
        let mut changes: Vec<Change> = Vec::new();
        let mut selection = engine.selected_ids();
        if engine.is_selectable(node) {
            if shift {
                let selected = !node.node.selected;
                changes.push(NodeChange::Select { id: hit_id, selected }.into());
                if selected {
                    selection.push(hit_id);
                } else {
                    // Toggled off: nothing to drag.
                    return changes;
                }
            } else if !node.node.selected {
                changes.extend(
                    selection
                        .iter()
                        .map(|&id| Change::from(NodeChange::Select { id, selected: false })),
                );
                changes.push(NodeChange::Select { id: hit_id, selected: true }.into());
                selection = vec![hit_id];
            }
        }

        let drag_ids = if selection.contains(&hit_id) {
            selection
        } else {
            vec![hit_id]
        };
        let nodes = dragged_nodes(&drag_ids, engine);
        if !nodes.is_empty() {
            self.drag = Some(Drag {
                pointer_start: engine.pointer_position(screen).point(),
                nodes,
                moved: false,
            });
        }
        changes
    }

    fn pointer_move(&mut self, screen: Point, engine: &DiagramEngine) -> Vec<Change> {
        if let Some(start) = self.marquee_start {
            self.marquee_rect = Some(Rect::from_points(start, screen));
            return Vec::new();
        }

        let Some(drag) = self.drag.as_mut() else {
            return Vec::new();
        };
        drag.moved = true;
        let delta = engine.pointer_position(screen).point() - drag.pointer_start;
        drag.nodes
            .iter()
            .map(|d| {
                NodeChange::Position {
                    id: d.id,
                    position: next_position(d, delta, engine),
                    dragging: true,
                }
                .into()
            })
            .collect()
    }

    fn pointer_up(&mut self, engine: &DiagramEngine) -> Vec<Change> {
        self.marquee_start = None;
        if let Some(rect) = self.marquee_rect.take() {
            return marquee_selection(rect, engine);
        }

        let Some(drag) = self.drag.take() else {
            return Vec::new();
        };
        if !drag.moved {
            return Vec::new();
        }
        drag.nodes
            .iter()
            .filter_map(|d| engine.get(d.id))
            .map(|n| {
                NodeChange::Position {
                    id: n.id(),
                    position: n.node.position,
                    dragging: false,
                }
                .into()
            })
            .collect()
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn handle(&mut self, event: &InputEvent, hit: Option<NodeId>, engine: &DiagramEngine) -> Vec<Change> {
        match *event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.pointer_down(Point::new(x, y), modifiers.shift, hit, engine)
            }
            InputEvent::PointerMove { x, y, .. } => self.pointer_move(Point::new(x, y), engine),
            InputEvent::PointerUp { .. } => self.pointer_up(engine),
            InputEvent::Scroll { .. } => Vec::new(),
        }
    }
}

/// Draggable nodes among `ids`, minus those whose ancestor is also dragged
/// (they follow their parent).
fn dragged_nodes(ids: &[NodeId], engine: &DiagramEngine) -> SmallVec<[DraggedNode; 4]> {
    let origin = engine.config().node_origin;
    let table = engine.table();
    ids.iter()
        .filter_map(|&id| engine.get(id))
        .filter(|n| engine.is_draggable(n))
        .filter(|n| !ids.iter().any(|&other| table.is_ancestor_of(other, n.id())))
        .map(|n| DraggedNode {
            id: n.id(),
            start: n.position_absolute,
            parent_corner: n
                .node
                .parent_id
                .and_then(|p| engine.get(p))
                .map(|p| p.corner(origin)),
            size: n.dimensions(),
        })
        .collect()
}

/// Parent-relative position for a dragged node: moved by `delta`, snapped
/// to the grid and kept inside the node extent.
fn next_position(node: &DraggedNode, delta: Point, engine: &DiagramEngine) -> Point {
    let config = engine.config();
    let mut abs = engine.step_position(node.start + delta, node.size);
    if let Some(extent) = config.node_extent {
        let offset = config.node_origin.offset(node.size);
        abs = clamp_position(abs - offset, extent, node.size) + offset;
    }
    match node.parent_corner {
        Some(corner) => abs - corner,
        None => abs,
    }
}

/// Select every selectable node fully inside the marquee.
fn marquee_selection(rect: Rect, engine: &DiagramEngine) -> Vec<Change> {
    if rect.area() <= 0.0 {
        return Vec::new();
    }
    let filter = VisibilityFilter {
        partial: false,
        exclude_unselectable: true,
    };
    engine
        .visible_nodes(rect, &filter)
        .into_iter()
        .filter(|n| n.has_area() && engine.is_selectable(n) && !n.node.selected)
        .map(|n| {
            NodeChange::Select {
                id: n.id(),
                selected: true,
            }
            .into()
        })
        .collect()
}

// ─── Connect Tool ────────────────────────────────────────────────────────

/// A connection being dragged out of a source port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingConnection {
    pub source: NodeId,
    pub source_handle: Option<NodeId>,
    pub side: Side,
    /// Port anchor in diagram space.
    pub from: Point,
    /// Pointer in diagram space.
    pub pointer: Point,
}

#[derive(Debug)]
pub struct ConnectTool {
    /// Style of the in-progress line.
    pub line_style: EdgeStyle,
    pending: Option<PendingConnection>,
}

impl Default for ConnectTool {
    fn default() -> Self {
        Self::new(EdgeStyle::Straight)
    }
}

impl ConnectTool {
    pub fn new(line_style: EdgeStyle) -> Self {
        Self {
            line_style,
            pending: None,
        }
    }

    pub fn pending(&self) -> Option<&PendingConnection> {
        self.pending.as_ref()
    }

    /// The line from the source port to the pointer, while connecting.
    pub fn connection_line(&self, engine: &DiagramEngine) -> Option<EdgePath> {
        self.pending.map(|c| {
            route_connection_line(c.from, c.side, c.pointer, self.line_style, engine.route_options())
        })
    }
}

impl Tool for ConnectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Connect
    }

    fn handle(&mut self, event: &InputEvent, hit: Option<NodeId>, engine: &DiagramEngine) -> Vec<Change> {
        let Some(screen) = event.position() else {
            return Vec::new();
        };
        let pointer = engine.pointer_position(screen).point();

        match event {
            InputEvent::PointerDown { .. } => {
                self.pending = hit.and_then(|id| engine.get(id)).and_then(|node| {
                    let port = port_under(node, PortType::Source, pointer)?;
                    Some(PendingConnection {
                        source: node.id(),
                        source_handle: port.id,
                        side: port.side,
                        from: port_anchor(node.position_absolute, port, port.side),
                        pointer,
                    })
                });
                Vec::new()
            }
            InputEvent::PointerMove { .. } => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.pointer = pointer;
                }
                Vec::new()
            }
            InputEvent::PointerUp { .. } => {
                let Some(pending) = self.pending.take() else {
                    return Vec::new();
                };
                let Some(target) = hit.and_then(|id| engine.get(id)) else {
                    return Vec::new();
                };
                if target.id() == pending.source {
                    return Vec::new();
                }
                let target_handle =
                    port_under(target, PortType::Target, pointer).and_then(|p| p.id);

                let exists = engine.edges().iter().any(|e| {
                    e.source == pending.source
                        && e.target == target.id()
                        && e.source_handle == pending.source_handle
                        && e.target_handle == target_handle
                });
                if exists {
                    log::debug!("{} -> {} already connected", pending.source, target.id());
                    return Vec::new();
                }

                let mut edge = Edge::new(NodeId::with_prefix("edge"), pending.source, target.id());
                edge.source_handle = pending.source_handle;
                edge.target_handle = target_handle;
                vec![EdgeChange::Add(edge).into()]
            }
            InputEvent::Scroll { .. } => Vec::new(),
        }
    }
}

/// The port of `port_type` on `node` whose box contains `point`. Port
/// offsets are relative to the node's anchor.
fn port_under(node: &ResolvedNode, port_type: PortType, point: Point) -> Option<&Port> {
    node.port_bounds
        .as_ref()?
        .get(port_type)?
        .iter()
        .find(|p| p.rect().translate(node.position_absolute).contains(point))
}
