//! The diagram engine: the single writer of diagram state.
//!
//! The engine owns the raw node and edge lists, the viewport transform and
//! the resolved [`NodeTable`]. Every structural change and every measurement
//! ends in one full rebuild of the table. The new table is built off to the
//! side and swapped in only when resolution succeeds, so queries (which take
//! `&self`) always see a complete, consistent table.
//!
//! In a multi-threaded host, wrap the engine in an `RwLock`: rebuilds need
//! the write guard, queries the read guard.

use crate::changes::{Change, EdgeChange, NodeChange};
use crate::input::InputEvent;
use crate::tools::Tool;
use dg_core::config::DiagramConfig;
use dg_core::error::Result;
use dg_core::geometry::{Dimensions, Point, Rect};
use dg_core::id::NodeId;
use dg_core::model::{Edge, Node, NodeTable, PortBounds, ResolvedNode, Transform};
use dg_core::ports::MeasuredPort;
use dg_core::query::{self, VisibilityFilter};
use dg_core::resolve::resolve_nodes;
use dg_core::route::{EdgeTypeRegistry, RouteOptions};
use dg_core::transform::{screen_to_diagram, snap_position};
use dg_render::{NodePlacement, RoutedEdge, Viewport, hit_test_screen, plan_nodes, route_edges};
use std::collections::HashSet;

/// Pointer position in diagram space, raw and snapped to the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
    pub x_snapped: f64,
    pub y_snapped: f64,
}

impl PointerPosition {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn snapped(&self) -> Point {
        Point::new(self.x_snapped, self.y_snapped)
    }
}

/// What the renderer reports after laying out one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMeasurement {
    pub id: NodeId,
    /// Unscaled size in diagram units.
    pub dimensions: Dimensions,
    /// The node's bounding rect on screen.
    pub node_rect: Rect,
    /// The node's port rects on screen.
    pub ports: Vec<MeasuredPort>,
}

pub struct DiagramEngine {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    config: DiagramConfig,
    registry: EdgeTypeRegistry,
    route_options: RouteOptions,
    transform: Transform,
    table: NodeTable,
}

impl DiagramEngine {
    /// Create an empty engine. Fails if `config` does not validate.
    pub fn new(config: DiagramConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            registry: config.edge_registry(),
            route_options: config.route_options(),
            transform: Transform::default(),
            table: NodeTable::default(),
            config,
        })
    }

    // ─── State access ────────────────────────────────────────────────────

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn table(&self) -> &NodeTable {
        &self.table
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn route_options(&self) -> &RouteOptions {
        &self.route_options
    }

    pub fn get(&self, id: NodeId) -> Option<&ResolvedNode> {
        self.table.get(id)
    }

    pub fn selected_ids(&self) -> Vec<NodeId> {
        self.table
            .iter()
            .filter(|n| n.node.selected)
            .map(|n| n.id())
            .collect()
    }

    pub fn is_selectable(&self, node: &ResolvedNode) -> bool {
        node.node.selectable.unwrap_or(self.config.elements_selectable)
    }

    pub fn is_draggable(&self, node: &ResolvedNode) -> bool {
        node.node.draggable.unwrap_or(self.config.nodes_draggable)
    }

    // ─── Writes ──────────────────────────────────────────────────────────

    /// Replace the node list. Cached measurements carry over by id.
    pub fn set_nodes(&mut self, nodes: Vec<Node>) -> Result<()> {
        self.commit(nodes, None)
    }

    pub fn set_edges(&mut self, edges: Vec<Edge>) {
        self.edges = edges;
    }

    /// Apply a batch of node changes, then rebuild.
    ///
    /// Changes naming unknown nodes are skipped. If the rebuild fails (for
    /// example a reparent that would close a cycle) nothing changes.
    pub fn apply_changes(&mut self, changes: &[NodeChange]) -> Result<()> {
        let origin = self.config.node_origin;
        let mut nodes = self.nodes.clone();
        let mut removed: HashSet<NodeId> = HashSet::new();

        for change in changes {
            if let NodeChange::Remove { id } = change {
                let doomed = subtree(&nodes, *id);
                nodes.retain(|n| !doomed.contains(&n.id));
                removed.extend(doomed);
                continue;
            }
            if let NodeChange::Reparent { id, parent_id } = *change {
                // Measure against the batch so far, not the committed table.
                let working = resolve_nodes(&nodes, Some(&self.table), &self.config.resolve_options())
                    .inspect_err(|err| log::warn!("rebuild rejected: {err}"))?;
                let Some(current) = working.get(id) else {
                    log::warn!("ignoring change for unknown node {id}");
                    continue;
                };
                let position = match parent_id.and_then(|p| working.get(p)) {
                    Some(parent) => current.position_absolute - parent.corner(origin),
                    None => current.position_absolute,
                };
                if let Some(node) = node_mut(&mut nodes, id) {
                    node.position = position;
                    node.parent_id = parent_id;
                }
                continue;
            }

            let Some(node) = node_mut(&mut nodes, change.id()) else {
                log::warn!("ignoring change for unknown node {}", change.id());
                continue;
            };
            match *change {
                NodeChange::Position {
                    position, dragging, ..
                } => {
                    node.position = position;
                    node.dragging = dragging;
                }
                NodeChange::Select { selected, .. } => node.selected = selected,
                NodeChange::Dimensions { dimensions, .. } => node.dimensions = Some(dimensions),
                NodeChange::Remove { .. } | NodeChange::Reparent { .. } => {}
            }
        }

        self.commit(nodes, None)?;
        if !removed.is_empty() {
            self.edges
                .retain(|e| !removed.contains(&e.source) && !removed.contains(&e.target));
        }
        Ok(())
    }

    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
        for change in changes {
            match change {
                EdgeChange::Add(edge) => {
                    self.edges.retain(|e| e.id != edge.id);
                    self.edges.push(edge.clone());
                }
                EdgeChange::Remove { id } => self.edges.retain(|e| e.id != *id),
            }
        }
    }

    /// Apply a tool's output: node changes as one batch, then edge changes.
    pub fn apply(&mut self, changes: Vec<Change>) -> Result<()> {
        let mut node_changes = Vec::new();
        let mut edge_changes = Vec::new();
        for change in changes {
            match change {
                Change::Node(c) => node_changes.push(c),
                Change::Edge(c) => edge_changes.push(c),
            }
        }
        if !node_changes.is_empty() {
            self.apply_changes(&node_changes)?;
        }
        self.apply_edge_changes(&edge_changes);
        Ok(())
    }

    /// Record a renderer measurement and rebuild.
    ///
    /// Port rects are normalized against the current zoom. Measurements for
    /// nodes that are gone by now are dropped.
    pub fn measure_node(&mut self, measurement: NodeMeasurement) -> Result<()> {
        let NodeMeasurement {
            id,
            dimensions,
            node_rect,
            ports,
        } = measurement;

        let mut cache = self.table.clone();
        let Some(entry) = cache.get_mut(id) else {
            log::debug!("dropping measurement for unknown node {id}");
            return Ok(());
        };
        entry.node.dimensions = Some(dimensions);
        let bounds = PortBounds::from_measured(
            &ports,
            node_rect,
            self.transform.zoom,
            self.config.node_origin,
        );
        entry.port_bounds = (bounds.source.is_some() || bounds.target.is_some()).then_some(bounds);

        // A node's own dimensions win over the cache, so update those too.
        let mut nodes = self.nodes.clone();
        if let Some(node) = node_mut(&mut nodes, id)
            && node.dimensions.is_some()
        {
            node.dimensions = Some(dimensions);
        }
        self.commit(nodes, Some(cache))
    }

    /// Rebuild the table for `nodes` and swap it in on success.
    fn commit(&mut self, nodes: Vec<Node>, cache: Option<NodeTable>) -> Result<()> {
        let previous = cache.as_ref().unwrap_or(&self.table);
        let table = resolve_nodes(&nodes, Some(previous), &self.config.resolve_options())
            .inspect_err(|err| log::warn!("rebuild rejected: {err}"))?;
        self.nodes = nodes;
        self.table = table;
        Ok(())
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn set_transform(&mut self, transform: Transform) {
        let zoom = dg_core::transform::clamp_zoom(
            transform.zoom,
            self.config.min_zoom,
            self.config.max_zoom,
        );
        self.transform = Transform::new(transform.x, transform.y, zoom);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.transform = self.transform.pan_by(dx, dy);
    }

    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        self.transform =
            self.transform
                .zoom_at(anchor, factor, self.config.min_zoom, self.config.max_zoom);
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Convert a screen point into diagram space, with its grid-snapped
    /// counterpart.
    pub fn pointer_position(&self, screen: Point) -> PointerPosition {
        let p = screen_to_diagram(screen, self.transform);
        let snapped = snap_position(p, self.config.grid_step, false, None);
        PointerPosition {
            x: p.x,
            y: p.y,
            x_snapped: snapped.x,
            y_snapped: snapped.y,
        }
    }

    /// Snap a dragged node's position with the configured grid.
    pub fn step_position(&self, position: Point, size: Option<Dimensions>) -> Point {
        snap_position(position, self.config.grid_step, self.config.center_step, size)
    }

    pub fn visible_nodes(&self, screen_rect: Rect, filter: &VisibilityFilter) -> Vec<&ResolvedNode> {
        query::visible_nodes(
            &self.table,
            screen_rect,
            self.transform,
            filter,
            self.config.node_origin,
        )
    }

    /// True iff node `id` touches or overlaps any other node.
    pub fn intersects(&self, id: NodeId) -> bool {
        self.table
            .get(id)
            .is_some_and(|node| query::intersects(node, &self.table, self.config.node_origin))
    }

    pub fn hit_test(&self, screen: Point) -> Option<NodeId> {
        hit_test_screen(&self.table, screen, self.transform, self.config.node_origin)
    }

    pub fn node_placements(&self, width: f64, height: f64) -> Vec<NodePlacement> {
        let viewport = Viewport {
            width,
            height,
            transform: self.transform,
        };
        plan_nodes(&self.table, &viewport, &self.config)
    }

    pub fn routed_edges(&self) -> Vec<RoutedEdge> {
        route_edges(
            &self.table,
            &self.edges,
            &self.registry,
            &self.route_options,
        )
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed one input event through `tool` and apply what it produces.
    /// Scroll events drive the viewport directly.
    pub fn dispatch(&mut self, tool: &mut dyn Tool, event: &InputEvent) -> Result<()> {
        if let InputEvent::Scroll {
            x,
            y,
            dx,
            dy,
            zoom,
        } = *event
        {
            self.pan_by(dx, dy);
            if zoom != 1.0 {
                self.zoom_at(Point::new(x, y), zoom);
            }
            return Ok(());
        }

        let hit = event.position().and_then(|p| self.hit_test(p));
        let changes = tool.handle(event, hit, self);
        self.apply(changes)
    }
}

/// Last node with `id`, matching the table's "last duplicate wins".
fn node_mut(nodes: &mut [Node], id: NodeId) -> Option<&mut Node> {
    nodes.iter_mut().rev().find(|n| n.id == id)
}

/// `root` plus every node below it.
fn subtree(nodes: &[Node], root: NodeId) -> HashSet<NodeId> {
    let mut ids = HashSet::from([root]);
    loop {
        let before = ids.len();
        for node in nodes {
            if node.parent_id.is_some_and(|p| ids.contains(&p)) {
                ids.insert(node.id);
            }
        }
        if ids.len() == before {
            return ids;
        }
    }
}
