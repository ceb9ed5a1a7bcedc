//! Render plan for `dg-core` diagrams.
//!
//! Turns a resolved node table and the raw edge list into what a renderer
//! draws each frame: z-ordered node placements, routed edge paths (as SVG
//! path data and as `kurbo` geometry) and point hit tests.

pub mod edges;
pub mod hit;
pub mod path;
pub mod plan;

pub use edges::{RoutedEdge, route_edge, route_edges};
pub use hit::{hit_test, hit_test_screen};
pub use path::{to_bez_path, to_kurbo_point, to_kurbo_rect};
pub use plan::{NodePlacement, Viewport, plan_nodes};
