//! Integration tests: one full frame from host JSON to draw lists.

use dg_core::config::DiagramConfig;
use dg_core::geometry::{Point, Rect};
use dg_core::id::NodeId;
use dg_core::model::{Edge, Node, PortBounds, PortType, Side, Transform};
use dg_core::ports::MeasuredPort;
use dg_core::resolve::resolve_nodes;
use dg_render::{Viewport, hit_test, plan_nodes, route_edges, to_bez_path};
use kurbo::Shape;

const CONFIG: &str = r#"{
    "nodeOrigin": [0, 0],
    "onlyRenderVisibleElements": true,
    "edgeTypes": { "flow": "bezier" }
}"#;

const NODES: &str = r#"[
    { "id": "start", "position": { "x": 0, "y": 0 }, "dimensions": { "width": 100, "height": 40 } },
    { "id": "end", "position": { "x": 300, "y": 200 }, "dimensions": { "width": 100, "height": 40 }, "selected": true },
    { "id": "far", "position": { "x": 5000, "y": 5000 }, "dimensions": { "width": 10, "height": 10 } }
]"#;

fn port(side: Side, port_type: PortType, rect: Rect) -> MeasuredPort {
    MeasuredPort {
        id: None,
        side,
        port_type,
        rect,
    }
}

#[test]
fn frame_places_nodes_and_routes_edges() {
    let config = DiagramConfig::from_json(CONFIG).unwrap();
    let nodes: Vec<Node> = serde_json::from_str(NODES).unwrap();
    let mut table = resolve_nodes(&nodes, None, &config.resolve_options()).unwrap();

    table.get_mut(NodeId::intern("start")).unwrap().port_bounds = Some(PortBounds::from_measured(
        &[port(Side::Right, PortType::Source, Rect::new(96.0, 16.0, 4.0, 8.0))],
        Rect::new(0.0, 0.0, 100.0, 40.0),
        1.0,
        config.node_origin,
    ));
    table.get_mut(NodeId::intern("end")).unwrap().port_bounds = Some(PortBounds::from_measured(
        &[port(Side::Left, PortType::Target, Rect::new(300.0, 216.0, 4.0, 8.0))],
        Rect::new(300.0, 200.0, 100.0, 40.0),
        1.0,
        config.node_origin,
    ));
    let table = resolve_nodes(&nodes, Some(&table), &config.resolve_options()).unwrap();

    let viewport = Viewport {
        width: 800.0,
        height: 600.0,
        transform: Transform::default(),
    };
    let plan = plan_nodes(&table, &viewport, &config);
    let ids: Vec<String> = plan.iter().map(|p| p.id.to_string()).collect();
    // `far` is culled; the selected node is elevated and drawn last.
    assert_eq!(ids, vec!["start", "end"]);
    assert_eq!(plan[1].z, 1000);

    let edges = vec![Edge::new("e1", "start", "end").with_type("flow")];
    let routed = route_edges(
        &table,
        &edges,
        &config.edge_registry(),
        &config.route_options(),
    );
    assert_eq!(routed.len(), 1);
    let path = &routed[0].path;
    assert_eq!(path.path, "M100 20C200 20 200 220 300 220");
    assert_eq!(path.label(), Point::new(200.0, 120.0));

    let bbox = to_bez_path(&path.commands).bounding_box();
    assert_eq!((bbox.x0, bbox.x1), (100.0, 300.0));

    assert_eq!(hit_test(&table, Point::new(350.0, 220.0), config.node_origin), Some(NodeId::intern("end")));
}
