//! Edge routing over a resolved table.
//!
//! An edge is drawn from the source node's outgoing port to the target
//! node's incoming port. Edges whose nodes are missing or hidden, or whose
//! ports have not been measured yet, are skipped for this frame.

use dg_core::id::NodeId;
use dg_core::model::{Edge, EdgeStyle, NodeTable, PortType};
use dg_core::ports::node_port_anchor;
use dg_core::route::{EdgePath, EdgeTypeRegistry, RouteOptions, RouteRequest, route};

#[derive(Debug, Clone, PartialEq)]
pub struct RoutedEdge {
    pub id: NodeId,
    pub source: NodeId,
    pub target: NodeId,
    pub style: EdgeStyle,
    pub path: EdgePath,
    /// Drawn at the higher of its endpoints' stacking orders.
    pub z: i32,
    pub label: Option<String>,
}

/// Route a single edge, or `None` if it is not routable yet.
pub fn route_edge(
    table: &NodeTable,
    edge: &Edge,
    registry: &EdgeTypeRegistry,
    options: &RouteOptions,
) -> Option<RoutedEdge> {
    let source = table.get(edge.source)?;
    let target = table.get(edge.target)?;
    if source.node.hidden || target.node.hidden {
        return None;
    }

    let (source_point, source_side) =
        node_port_anchor(source, PortType::Source, edge.source_handle)?;
    let (target_point, target_side) =
        node_port_anchor(target, PortType::Target, edge.target_handle)?;

    let style = registry.resolve(edge.edge_type.as_deref());
    let request = RouteRequest {
        source: source_point,
        source_side,
        target: target_point,
        target_side,
        style,
    };

    Some(RoutedEdge {
        id: edge.id,
        source: edge.source,
        target: edge.target,
        style,
        path: route(&request, options),
        z: source.z.max(target.z),
        label: edge.label.clone(),
    })
}

/// Route every routable edge, in input order.
pub fn route_edges(
    table: &NodeTable,
    edges: &[Edge],
    registry: &EdgeTypeRegistry,
    options: &RouteOptions,
) -> Vec<RoutedEdge> {
    edges
        .iter()
        .filter_map(|edge| {
            let routed = route_edge(table, edge, registry, options);
            if routed.is_none() {
                log::trace!("edge {} ({} -> {}) not routable", edge.id, edge.source, edge.target);
            }
            routed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_core::geometry::{Point, Rect};
    use dg_core::model::{Node, NodeOrigin, Port, PortBounds, Side};
    use dg_core::ports::MeasuredPort;
    use dg_core::resolve::{ResolveOptions, resolve_nodes};
    use smallvec::smallvec;

    fn port(id: Option<&str>, side: Side, x: f64, y: f64) -> Port {
        Port {
            id: id.map(NodeId::intern),
            side,
            x,
            y,
            width: 10.0,
            height: 10.0,
        }
    }

    fn table() -> NodeTable {
        let nodes = vec![
            Node::new("src", Point::new(0.0, 0.0)).with_dimensions(100.0, 50.0),
            Node::new("dst", Point::new(0.0, 200.0))
                .with_dimensions(100.0, 50.0)
                .with_z_index(2),
            Node::new("bare", Point::new(300.0, 0.0)).with_dimensions(100.0, 50.0),
        ];
        let mut table = resolve_nodes(&nodes, None, &ResolveOptions::default()).unwrap();
        table.get_mut(NodeId::intern("src")).unwrap().port_bounds = Some(PortBounds {
            source: Some(smallvec![
                port(Some("down"), Side::Bottom, 45.0, 40.0),
                port(Some("side"), Side::Right, 90.0, 20.0),
            ]),
            target: None,
        });
        table.get_mut(NodeId::intern("dst")).unwrap().port_bounds = Some(PortBounds {
            source: None,
            target: Some(smallvec![port(None, Side::Top, 45.0, 0.0)]),
        });
        table
    }

    #[test]
    fn routes_between_default_ports() {
        let edges = [Edge::new("e", "src", "dst")];
        let routed = route_edges(
            &table(),
            &edges,
            &EdgeTypeRegistry::default(),
            &RouteOptions::default(),
        );
        assert_eq!(routed.len(), 1);
        let e = &routed[0];
        assert_eq!(e.style, EdgeStyle::Step);
        assert_eq!(e.z, 2);
        // Bottom-center of src's first port to top-center of dst's port.
        assert!(e.path.path.starts_with("M50 50"));
        assert!(e.path.path.ends_with("L50 200"));
        assert!(e.path.commands.iter().all(|c| !c.is_curve()));
    }

    #[test]
    fn handle_selects_port() {
        let edge = Edge::new("e", "src", "dst")
            .with_handles(Some("side"), None)
            .with_type("straight");
        let routed = route_edge(
            &table(),
            &edge,
            &EdgeTypeRegistry::default(),
            &RouteOptions::default(),
        )
        .unwrap();
        assert_eq!(routed.path.path, "M100 25L50 200");
    }

    #[test]
    fn unroutable_edges_are_skipped() {
        let edges = [
            Edge::new("missing_node", "src", "ghost"),
            Edge::new("no_target_ports", "src", "bare"),
            Edge::new("unknown_handle", "src", "dst").with_handles(Some("nope"), None),
            Edge::new("ok", "src", "dst"),
        ];
        let routed = route_edges(
            &table(),
            &edges,
            &EdgeTypeRegistry::default(),
            &RouteOptions::default(),
        );
        let ids: Vec<String> = routed.iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["ok"]);
    }

    #[test]
    fn hidden_endpoints_hide_the_edge() {
        let mut t = table();
        t.get_mut(NodeId::intern("dst")).unwrap().node.hidden = true;
        let edge = Edge::new("e", "src", "dst");
        assert!(
            route_edge(&t, &edge, &EdgeTypeRegistry::default(), &RouteOptions::default())
                .is_none()
        );
    }

    #[test]
    fn centered_origin_routes_between_drawn_edges() {
        let origin = NodeOrigin::CENTER;
        let nodes = vec![
            Node::new("left", Point::new(100.0, 100.0)).with_dimensions(100.0, 40.0),
            Node::new("right", Point::new(400.0, 100.0)).with_dimensions(100.0, 40.0),
        ];
        let options = ResolveOptions {
            origin,
            ..Default::default()
        };
        let mut t = resolve_nodes(&nodes, None, &options).unwrap();
        // Screen rects at zoom 1: left spans x 50..150, right spans 350..450.
        for (id, port_type, side, rect, node_rect) in [
            ("left", PortType::Source, Side::Right, Rect::new(146.0, 96.0, 4.0, 8.0), Rect::new(50.0, 80.0, 100.0, 40.0)),
            ("right", PortType::Target, Side::Left, Rect::new(350.0, 96.0, 4.0, 8.0), Rect::new(350.0, 80.0, 100.0, 40.0)),
        ] {
            let measured = [MeasuredPort {
                id: None,
                side,
                port_type,
                rect,
            }];
            t.get_mut(NodeId::intern(id)).unwrap().port_bounds =
                Some(PortBounds::from_measured(&measured, node_rect, 1.0, origin));
        }

        let edge = Edge::new("e", "left", "right").with_type("straight");
        let routed =
            route_edge(&t, &edge, &EdgeTypeRegistry::default(), &RouteOptions::default()).unwrap();
        assert_eq!(routed.path.path, "M150 100L350 100");
    }
}
