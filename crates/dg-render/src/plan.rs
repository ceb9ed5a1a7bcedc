//! Node placement: which nodes to draw, where, and in what order.

use dg_core::config::DiagramConfig;
use dg_core::geometry::Rect;
use dg_core::id::NodeId;
use dg_core::model::{NodeTable, ResolvedNode, Transform};
use dg_core::query::{VisibilityFilter, visible_nodes};

/// Screen-space viewport size plus its pan/zoom transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub transform: Transform,
}

impl Viewport {
    pub fn screen_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// One node as the renderer should draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePlacement {
    pub id: NodeId,
    /// Absolute top-left box in diagram space; zero-size while unmeasured.
    pub rect: Rect,
    pub z: i32,
    pub selected: bool,
    pub is_parent: bool,
    pub selectable: bool,
    pub draggable: bool,
    pub node_type: Option<String>,
}

impl NodePlacement {
    fn new(node: &ResolvedNode, config: &DiagramConfig) -> Self {
        Self {
            id: node.id(),
            rect: node.rect(config.node_origin),
            z: node.z,
            selected: node.node.selected,
            is_parent: node.is_parent,
            selectable: node.node.selectable.unwrap_or(config.elements_selectable),
            draggable: node.node.draggable.unwrap_or(config.nodes_draggable),
            node_type: node.node.node_type.clone(),
        }
    }
}

/// Nodes to draw, back to front.
///
/// Hidden nodes are dropped. With `only_render_visible_elements` the rest is
/// culled against the viewport, keeping anything that overlaps it. Equal `z`
/// keeps table order.
pub fn plan_nodes(table: &NodeTable, viewport: &Viewport, config: &DiagramConfig) -> Vec<NodePlacement> {
    let nodes: Vec<&ResolvedNode> = if config.only_render_visible_elements {
        let filter = VisibilityFilter {
            partial: true,
            exclude_unselectable: false,
        };
        visible_nodes(
            table,
            viewport.screen_rect(),
            viewport.transform,
            &filter,
            config.node_origin,
        )
    } else {
        table.iter().filter(|n| !n.node.hidden).collect()
    };

    let mut placements: Vec<NodePlacement> = nodes
        .into_iter()
        .map(|n| NodePlacement::new(n, config))
        .collect();
    placements.sort_by_key(|p| p.z);
    placements
}
