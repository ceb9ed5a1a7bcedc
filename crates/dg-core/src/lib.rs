pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod model;
pub mod ports;
pub mod query;
pub mod resolve;
pub mod route;
pub mod transform;

pub use config::DiagramConfig;
pub use error::{Error, Result};
pub use geometry::{Dimensions, Point, Rect};
pub use id::NodeId;
pub use model::*;
pub use ports::{MeasuredPort, extract_port_bounds, find_port, node_port_anchor, port_anchor};
pub use query::{VisibilityFilter, intersects, node_at_point, rect_of_nodes, visible_nodes};
pub use resolve::{ResolveOptions, resolve_nodes};
pub use route::{EdgePath, EdgeTypeRegistry, RouteOptions, RouteRequest, route, route_connection_line};
pub use transform::{screen_to_diagram, snap_position};
