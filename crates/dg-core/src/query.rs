//! Spatial queries over a resolved [`NodeTable`].
//!
//! All functions here are pure: the table and transform are borrowed
//! inputs, nothing is cached between calls.

use crate::geometry::{Point, Rect, bounding_rect};
use crate::model::{NodeOrigin, NodeTable, ResolvedNode, Transform};
use crate::transform::screen_rect_to_diagram;

pub use crate::geometry::overlap_area;

/// True iff `node`'s absolute box touches or overlaps the box of any other
/// node in `table`. Nodes without a measured, non-empty size never
/// intersect.
pub fn intersects(node: &ResolvedNode, table: &NodeTable, origin: NodeOrigin) -> bool {
    if !node.has_area() {
        return false;
    }
    let rect = node.rect(origin);
    table
        .iter()
        .filter(|other| other.id() != node.id() && other.has_area())
        .any(|other| rect.touches(&other.rect(origin)))
}

/// Options for [`visible_nodes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityFilter {
    /// Accept any overlap instead of full containment.
    pub partial: bool,
    /// Skip nodes with `selectable: false` (marquee selection).
    pub exclude_unselectable: bool,
}

/// Nodes inside a screen-space rect.
///
/// A node is returned when it is not hidden and one of these holds:
/// - it has not been measured yet;
/// - `partial` is set and it overlaps the rect at all;
/// - it lies fully inside the rect;
/// - it is being dragged.
pub fn visible_nodes<'a>(
    table: &'a NodeTable,
    screen_rect: Rect,
    transform: Transform,
    filter: &VisibilityFilter,
    origin: NodeOrigin,
) -> Vec<&'a ResolvedNode> {
    let area = screen_rect_to_diagram(screen_rect, transform);

    let visible: Vec<&ResolvedNode> = table
        .iter()
        .filter(|n| !n.node.hidden)
        .filter(|n| !(filter.exclude_unselectable && n.node.selectable == Some(false)))
        .filter(|n| {
            let Some(size) = n.dimensions() else {
                return true;
            };
            let overlap = overlap_area(&area, &n.rect(origin));
            (filter.partial && overlap > 0.0) || overlap >= size.area() || n.node.dragging
        })
        .collect();

    log::trace!("{} of {} nodes visible", visible.len(), table.len());
    visible
}

/// Bounding box of the measured nodes' absolute boxes.
pub fn rect_of_nodes<'a, I>(nodes: I, origin: NodeOrigin) -> Option<Rect>
where
    I: IntoIterator<Item = &'a ResolvedNode>,
{
    bounding_rect(
        nodes
            .into_iter()
            .filter(|n| n.has_area())
            .map(|n| n.rect(origin)),
    )
}

/// Topmost visible node containing `point` (diagram space). Ties in `z` go
/// to the node later in the table, which is drawn last.
pub fn node_at_point(table: &NodeTable, point: Point, origin: NodeOrigin) -> Option<&ResolvedNode> {
    table
        .iter()
        .filter(|n| !n.node.hidden && n.has_area() && n.rect(origin).contains(point))
        .max_by_key(|n| n.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::model::Node;
    use crate::resolve::{ResolveOptions, resolve_nodes};

    fn table(nodes: &[Node]) -> NodeTable {
        resolve_nodes(nodes, None, &ResolveOptions::default()).unwrap()
    }

    fn ids(nodes: &[&ResolvedNode]) -> Vec<String> {
        nodes.iter().map(|n| n.id().to_string()).collect()
    }

    #[test]
    fn partial_flag_controls_edge_overlap() {
        let t = table(&[
            Node::new("inside", Point::new(10.0, 10.0)).with_dimensions(20.0, 20.0),
            Node::new("straddling", Point::new(90.0, 10.0)).with_dimensions(20.0, 20.0),
            Node::new("outside", Point::new(300.0, 10.0)).with_dimensions(20.0, 20.0),
        ]);
        let screen = Rect::new(0.0, 0.0, 100.0, 100.0);

        let full = visible_nodes(&t, screen, Transform::default(), &VisibilityFilter::default(), NodeOrigin::TOP_LEFT);
        assert_eq!(ids(&full), vec!["inside"]);

        let partial = VisibilityFilter {
            partial: true,
            ..Default::default()
        };
        let some = visible_nodes(&t, screen, Transform::default(), &partial, NodeOrigin::TOP_LEFT);
        assert_eq!(ids(&some), vec!["inside", "straddling"]);
    }

    #[test]
    fn unmeasured_and_dragging_nodes_are_always_visible() {
        let mut dragged = Node::new("dragged", Point::new(500.0, 500.0)).with_dimensions(10.0, 10.0);
        dragged.dragging = true;
        let mut hidden = Node::new("hidden", Point::new(5.0, 5.0)).with_dimensions(10.0, 10.0);
        hidden.hidden = true;
        let t = table(&[Node::new("fresh", Point::new(900.0, 900.0)), dragged, hidden]);

        let got = visible_nodes(
            &t,
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Transform::default(),
            &VisibilityFilter::default(),
            NodeOrigin::TOP_LEFT,
        );
        assert_eq!(ids(&got), vec!["fresh", "dragged"]);
    }

    #[test]
    fn zero_area_nodes_count_as_visible() {
        // Fully contained trivially: overlap 0 >= area 0, wherever they sit.
        let t = table(&[
            Node::new("line", Point::new(10.0, 10.0)).with_dimensions(0.0, 10.0),
            Node::new("far_line", Point::new(800.0, 800.0)).with_dimensions(0.0, 10.0),
            Node::new("dot", Point::new(900.0, 10.0)).with_dimensions(0.0, 0.0),
            Node::new("outside", Point::new(300.0, 10.0)).with_dimensions(20.0, 20.0),
        ]);
        let screen = Rect::new(0.0, 0.0, 100.0, 100.0);

        let full = visible_nodes(&t, screen, Transform::default(), &VisibilityFilter::default(), NodeOrigin::TOP_LEFT);
        assert_eq!(ids(&full), vec!["line", "far_line", "dot"]);

        let partial = VisibilityFilter {
            partial: true,
            ..Default::default()
        };
        let some = visible_nodes(&t, screen, Transform::default(), &partial, NodeOrigin::TOP_LEFT);
        assert_eq!(ids(&some), vec!["line", "far_line", "dot"]);
    }

    #[test]
    fn query_rect_is_converted_to_diagram_space() {
        let t = table(&[Node::new("far", Point::new(150.0, 150.0)).with_dimensions(20.0, 20.0)]);
        let screen = Rect::new(0.0, 0.0, 100.0, 100.0);
        let none = visible_nodes(&t, screen, Transform::default(), &VisibilityFilter::default(), NodeOrigin::TOP_LEFT);
        assert!(none.is_empty());

        // At zoom 0.5 the same screen rect covers (0,0)-(200,200).
        let zoomed_out = Transform::new(0.0, 0.0, 0.5);
        let got = visible_nodes(&t, screen, zoomed_out, &VisibilityFilter::default(), NodeOrigin::TOP_LEFT);
        assert_eq!(ids(&got), vec!["far"]);
    }

    #[test]
    fn unselectable_nodes_are_skipped_on_request() {
        let mut locked = Node::new("locked", Point::new(10.0, 10.0)).with_dimensions(10.0, 10.0);
        locked.selectable = Some(false);
        let t = table(&[locked, Node::new("free", Point::new(30.0, 10.0)).with_dimensions(10.0, 10.0)]);
        let screen = Rect::new(0.0, 0.0, 100.0, 100.0);

        let all = visible_nodes(&t, screen, Transform::default(), &VisibilityFilter::default(), NodeOrigin::TOP_LEFT);
        assert_eq!(all.len(), 2);

        let marquee = VisibilityFilter {
            partial: false,
            exclude_unselectable: true,
        };
        let got = visible_nodes(&t, screen, Transform::default(), &marquee, NodeOrigin::TOP_LEFT);
        assert_eq!(ids(&got), vec!["free"]);
    }

    #[test]
    fn nested_child_intersects_its_parent() {
        let t = table(&[
            Node::new("a", Point::new(0.0, 0.0)).with_dimensions(100.0, 50.0),
            Node::new("b", Point::new(10.0, 10.0))
                .with_parent("a")
                .with_dimensions(20.0, 20.0),
        ]);
        let b = t.get(NodeId::intern("b")).unwrap();
        assert_eq!(b.position_absolute, Point::new(10.0, 10.0));
        assert!(intersects(b, &t, NodeOrigin::TOP_LEFT));
    }

    #[test]
    fn unmeasured_nodes_never_intersect() {
        let t = table(&[
            Node::new("sized", Point::new(0.0, 0.0)).with_dimensions(100.0, 100.0),
            Node::new("blank", Point::new(10.0, 10.0)),
            Node::new("flat", Point::new(10.0, 10.0)).with_dimensions(0.0, 10.0),
        ]);
        let sized = t.get(NodeId::intern("sized")).unwrap();
        assert!(!intersects(sized, &t, NodeOrigin::TOP_LEFT));
        assert!(!intersects(t.get(NodeId::intern("blank")).unwrap(), &t, NodeOrigin::TOP_LEFT));
    }

    #[test]
    fn edge_contact_counts_as_intersection() {
        let t = table(&[
            Node::new("l", Point::new(0.0, 0.0)).with_dimensions(10.0, 10.0),
            Node::new("r", Point::new(10.0, 0.0)).with_dimensions(10.0, 10.0),
            Node::new("far", Point::new(50.0, 0.0)).with_dimensions(10.0, 10.0),
        ]);
        assert!(intersects(t.get(NodeId::intern("l")).unwrap(), &t, NodeOrigin::TOP_LEFT));
        assert!(!intersects(t.get(NodeId::intern("far")).unwrap(), &t, NodeOrigin::TOP_LEFT));
    }

    #[test]
    fn rect_of_nodes_skips_unmeasured() {
        let t = table(&[
            Node::new("a", Point::new(-10.0, 0.0)).with_dimensions(20.0, 20.0),
            Node::new("b", Point::new(50.0, 40.0)).with_dimensions(10.0, 10.0),
            Node::new("c", Point::new(1000.0, 1000.0)),
        ]);
        assert_eq!(
            rect_of_nodes(t.iter(), NodeOrigin::TOP_LEFT),
            Some(Rect::new(-10.0, 0.0, 70.0, 50.0))
        );
        assert_eq!(rect_of_nodes(std::iter::empty(), NodeOrigin::TOP_LEFT), None);
    }

    #[test]
    fn node_at_point_prefers_highest_z() {
        let t = table(&[
            Node::new("back", Point::new(0.0, 0.0)).with_dimensions(100.0, 100.0).with_z_index(2),
            Node::new("front", Point::new(20.0, 20.0)).with_dimensions(20.0, 20.0).with_z_index(5),
            Node::new("later", Point::new(0.0, 0.0)).with_dimensions(100.0, 100.0).with_z_index(2),
        ]);
        let origin = NodeOrigin::TOP_LEFT;
        assert_eq!(node_at_point(&t, Point::new(25.0, 25.0), origin).map(|n| n.id().to_string()).as_deref(), Some("front"));
        // Equal z: the later node wins.
        assert_eq!(node_at_point(&t, Point::new(80.0, 80.0), origin).map(|n| n.id().to_string()).as_deref(), Some("later"));
        assert!(node_at_point(&t, Point::new(500.0, 500.0), origin).is_none());
    }
}
