//! Hierarchical position resolver.
//!
//! Turns the host's flat node list (with optional `parent_id` references)
//! into a [`NodeTable`] of absolute positions and stacking orders. The whole
//! table is rebuilt on every call; measured dimensions and port bounds from
//! the previous table are carried forward by id because measurement is
//! asynchronous and must survive rebuilds.
//!
//! Nesting rules:
//! - a root's absolute position is its declared position;
//! - a child's absolute position is its declared position plus the parent's
//!   absolute top-left corner (parent anchor minus the origin offset);
//! - a child's `z` is the maximum of its own and its parent's resolved `z`.

use crate::error::{Error, Result};
use crate::model::{Node, NodeOrigin, NodeTable, ResolvedNode};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

/// Default z bonus applied to selected nodes.
pub const DEFAULT_ELEVATION: i32 = 1000;

/// Inputs of a rebuild besides the node list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveOptions {
    pub origin: NodeOrigin,
    /// Raise selected nodes above unselected ones.
    pub elevate_selected: bool,
    pub elevation: i32,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            origin: NodeOrigin::TOP_LEFT,
            elevate_selected: true,
            elevation: DEFAULT_ELEVATION,
        }
    }
}

/// Resolve all node positions and stacking orders.
///
/// # Errors
/// - a node references a parent id that is not in `nodes`
/// - the parent references form a cycle
pub fn resolve_nodes(
    nodes: &[Node],
    previous: Option<&NodeTable>,
    options: &ResolveOptions,
) -> Result<NodeTable> {
    let entries = nodes
        .iter()
        .map(|node| initial_entry(node, previous, options))
        .collect();
    let mut table = NodeTable::from_nodes(entries);
    if table.len() < nodes.len() {
        log::warn!(
            "{} duplicate node id(s) in input; later entries replace earlier ones",
            nodes.len() - table.len()
        );
    }

    let forest = parent_forest(&table)?;

    // Parents before children, so each parent is final when its children read it.
    let order = toposort(&forest, None).map_err(|cycle| Error::ParentCycle {
        node: table.nodes[cycle.node_id().index()].id(),
    })?;

    let mut parents = 0usize;
    for idx in order {
        let slot = idx.index();
        let Some(parent_id) = table.nodes[slot].node.parent_id else {
            continue;
        };
        let parent_slot = table.index[&parent_id];
        let parent = &mut table.nodes[parent_slot];
        if !parent.is_parent {
            parent.is_parent = true;
            parents += 1;
        }
        let parent_corner = parent.corner(options.origin);
        let parent_z = parent.z;

        let entry = &mut table.nodes[slot];
        entry.position_absolute = parent_corner + entry.node.position;
        entry.z = entry.z.max(parent_z);
    }

    log::debug!("resolved {} nodes ({parents} parents)", table.len());
    Ok(table)
}

/// Fresh entry for `node`, inheriting cached measurements from `previous`.
fn initial_entry(node: &Node, previous: Option<&NodeTable>, options: &ResolveOptions) -> ResolvedNode {
    let cached = previous.and_then(|table| table.get(node.id));

    let mut node = node.clone();
    if node.dimensions.is_none() {
        node.dimensions = cached.and_then(|c| c.node.dimensions);
    }

    let elevation = if options.elevate_selected && node.selected {
        options.elevation
    } else {
        0
    };

    ResolvedNode {
        position_absolute: node.position,
        z: node.z_index.unwrap_or(0).max(elevation),
        is_parent: false,
        port_bounds: cached.and_then(|c| c.port_bounds.clone()),
        node,
    }
}

/// Parent → child graph over table slots. Graph node `i` is table slot `i`.
fn parent_forest(table: &NodeTable) -> Result<DiGraph<(), ()>> {
    let mut forest = DiGraph::with_capacity(table.len(), table.len());
    for _ in 0..table.len() {
        forest.add_node(());
    }

    for (slot, entry) in table.nodes.iter().enumerate() {
        let Some(parent) = entry.node.parent_id else {
            continue;
        };
        let Some(&parent_slot) = table.index.get(&parent) else {
            return Err(Error::MissingParent {
                node: entry.id(),
                parent,
            });
        };
        if parent_slot == slot {
            return Err(Error::ParentCycle { node: entry.id() });
        }
        forest.add_edge(NodeIndex::new(parent_slot), NodeIndex::new(slot), ());
    }
    Ok(forest)
}
