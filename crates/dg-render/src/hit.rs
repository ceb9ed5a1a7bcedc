//! Hit testing: point → node lookup.

use dg_core::geometry::Point;
use dg_core::id::NodeId;
use dg_core::model::{NodeOrigin, NodeTable, Transform};
use dg_core::query::node_at_point;
use dg_core::transform::screen_to_diagram;

/// Find the topmost node at a diagram-space point.
/// Returns `None` if no node is hit (background).
pub fn hit_test(table: &NodeTable, point: Point, origin: NodeOrigin) -> Option<NodeId> {
    node_at_point(table, point, origin).map(|n| n.id())
}

/// [`hit_test`] for a pointer position in screen space.
pub fn hit_test_screen(
    table: &NodeTable,
    screen: Point,
    transform: Transform,
    origin: NodeOrigin,
) -> Option<NodeId> {
    hit_test(table, screen_to_diagram(screen, transform), origin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_core::model::Node;
    use dg_core::resolve::{ResolveOptions, resolve_nodes};

    #[test]
    fn hit_test_basic() {
        let nodes = vec![
            Node::new("group", Point::new(0.0, 0.0)).with_dimensions(300.0, 300.0),
            Node::new("child", Point::new(100.0, 100.0))
                .with_parent("group")
                .with_dimensions(50.0, 50.0),
        ];
        let table = resolve_nodes(&nodes, None, &ResolveOptions::default()).unwrap();
        let origin = NodeOrigin::TOP_LEFT;

        // Children inherit their parent's z, so the later entry wins.
        assert_eq!(hit_test(&table, Point::new(120.0, 120.0), origin), Some(NodeId::intern("child")));
        assert_eq!(hit_test(&table, Point::new(10.0, 10.0), origin), Some(NodeId::intern("group")));
        assert_eq!(hit_test(&table, Point::new(400.0, 10.0), origin), None);
    }

    #[test]
    fn screen_points_are_unprojected() {
        let nodes = vec![Node::new("n", Point::new(100.0, 100.0)).with_dimensions(10.0, 10.0)];
        let table = resolve_nodes(&nodes, None, &ResolveOptions::default()).unwrap();
        let transform = Transform::new(-100.0, -100.0, 2.0);
        // (110, 110) on screen is (105, 105) in the diagram.
        assert_eq!(
            hit_test_screen(&table, Point::new(110.0, 110.0), transform, NodeOrigin::TOP_LEFT),
            Some(NodeId::intern("n"))
        );
    }
}
