//! Port (handle) bounds.
//!
//! The renderer measures port elements in screen space after layout; this
//! module normalizes those rects into node-relative diagram units so they
//! survive panning and zooming, and turns them back into absolute anchor
//! points when an edge is routed.

use crate::geometry::{Point, Rect};
use crate::id::NodeId;
use crate::model::{NodeOrigin, Port, PortBounds, PortType, ResolvedNode, Side};
use smallvec::SmallVec;

/// A port rect as reported by the renderer, in absolute screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasuredPort {
    pub id: Option<NodeId>,
    pub side: Side,
    pub port_type: PortType,
    pub rect: Rect,
}

/// Normalize measured port rects against the node's measured screen rect.
///
/// `x = (port.left − node.left − node.width · ox) / zoom`, likewise for `y`;
/// sizes are divided by `zoom`. Returns `None` when nothing was measured,
/// which callers treat as "not routable yet".
pub fn extract_port_bounds(
    node_id: NodeId,
    measured: &[MeasuredPort],
    node_rect: Rect,
    zoom: f64,
    origin: NodeOrigin,
) -> Option<SmallVec<[Port; 4]>> {
    normalize(measured.iter(), node_rect, zoom, origin).or_else(|| {
        log::trace!("node {node_id}: no measured ports");
        None
    })
}

fn normalize<'a>(
    measured: impl Iterator<Item = &'a MeasuredPort>,
    node_rect: Rect,
    zoom: f64,
    origin: NodeOrigin,
) -> Option<SmallVec<[Port; 4]>> {
    let NodeOrigin(ox, oy) = origin;
    let ports: SmallVec<[Port; 4]> = measured
        .map(|m| Port {
            id: m.id,
            side: m.side,
            x: (m.rect.x - node_rect.x - node_rect.width * ox) / zoom,
            y: (m.rect.y - node_rect.y - node_rect.height * oy) / zoom,
            width: m.rect.width / zoom,
            height: m.rect.height / zoom,
        })
        .collect();
    (!ports.is_empty()).then_some(ports)
}

impl PortBounds {
    /// Group measured ports by direction of use and normalize each group.
    pub fn from_measured(
        measured: &[MeasuredPort],
        node_rect: Rect,
        zoom: f64,
        origin: NodeOrigin,
    ) -> PortBounds {
        let group = |port_type: PortType| {
            normalize(
                measured.iter().filter(|m| m.port_type == port_type),
                node_rect,
                zoom,
                origin,
            )
        };
        PortBounds {
            source: group(PortType::Source),
            target: group(PortType::Target),
        }
    }
}

/// The port an edge attaches to: the one whose id matches `handle`, or the
/// first port when the edge names no handle.
pub fn find_port(ports: &[Port], handle: Option<NodeId>) -> Option<&Port> {
    match handle {
        Some(handle) => ports.iter().find(|p| p.id == Some(handle)),
        None => ports.first(),
    }
}

/// Connection point on `port` for a node anchored at `node_anchor` (its
/// `position_absolute`): the middle of the port edge facing `side`.
///
/// Port offsets are stored relative to the origin-adjusted anchor, so no
/// origin correction happens here.
pub fn port_anchor(node_anchor: Point, port: &Port, side: Side) -> Point {
    let r = port.rect().translate(node_anchor);
    match side {
        Side::Left => Point::new(r.x, r.y + r.height / 2.0),
        Side::Right => Point::new(r.right(), r.y + r.height / 2.0),
        Side::Top => Point::new(r.x + r.width / 2.0, r.y),
        Side::Bottom => Point::new(r.x + r.width / 2.0, r.bottom()),
    }
}

/// Absolute anchor and side of `node`'s port of `port_type` named `handle`.
///
/// `None` while the node's ports are unmeasured or no port matches.
pub fn node_port_anchor(
    node: &ResolvedNode,
    port_type: PortType,
    handle: Option<NodeId>,
) -> Option<(Point, Side)> {
    let ports = node.port_bounds.as_ref()?.get(port_type)?;
    let port = find_port(ports, handle)?;
    Some((port_anchor(node.position_absolute, port, port.side), port.side))
}
