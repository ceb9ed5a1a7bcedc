//! Edge routing: straight, bezier and orthogonal ("step") paths.
//!
//! Every router produces a list of [`PathCmd`]s; the SVG path string is
//! derived from those by [`svg_path_data`], so back ends that want geometry
//! (see `dg-render`) and back ends that want strings see the same route.

use crate::geometry::{Point, distance};
use crate::model::{EdgeStyle, PathCmd, Side, svg_path_data};
use smallvec::{SmallVec, smallvec};
use std::collections::HashMap;

/// Gap between a port and the first bend of a step route.
pub const DEFAULT_OFFSET: f64 = 20.0;
/// Upper bound for the radius of rounded step bends.
pub const DEFAULT_BORDER_RADIUS: f64 = 5.0;
/// Bezier curvature used when the target lies behind the source.
pub const DEFAULT_CURVATURE: f64 = 0.25;

// ─── Options & results ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteOptions {
    pub offset: f64,
    pub border_radius: f64,
    /// Center override for the step split. A zero component counts as unset.
    pub center: Option<Point>,
    pub curvature: f64,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            border_radius: DEFAULT_BORDER_RADIUS,
            center: None,
            curvature: DEFAULT_CURVATURE,
        }
    }
}

/// Resolved endpoints of one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub source: Point,
    pub source_side: Side,
    pub target: Point,
    pub target_side: Side,
    pub style: EdgeStyle,
}

/// A routed edge, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePath {
    pub commands: Vec<PathCmd>,
    /// SVG path data for `commands`.
    pub path: String,
    /// Label anchor.
    pub label_x: f64,
    pub label_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl EdgePath {
    fn new(commands: Vec<PathCmd>, label: Point, offset_x: f64, offset_y: f64) -> Self {
        Self {
            path: svg_path_data(&commands),
            commands,
            label_x: label.x,
            label_y: label.y,
            offset_x,
            offset_y,
        }
    }

    pub fn label(&self) -> Point {
        Point::new(self.label_x, self.label_y)
    }
}

/// Midpoint between two endpoints plus half the span on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCenter {
    pub x: f64,
    pub y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

pub fn get_edge_center(source: Point, target: Point) -> EdgeCenter {
    let offset_x = (target.x - source.x).abs() / 2.0;
    let offset_y = (target.y - source.y).abs() / 2.0;
    EdgeCenter {
        x: if target.x < source.x {
            target.x + offset_x
        } else {
            target.x - offset_x
        },
        y: if target.y < source.y {
            target.y + offset_y
        } else {
            target.y - offset_y
        },
        offset_x,
        offset_y,
    }
}

// ─── Dispatch ────────────────────────────────────────────────────────────

/// Route one edge in the requested style.
pub fn route(request: &RouteRequest, options: &RouteOptions) -> EdgePath {
    match request.style {
        EdgeStyle::Straight => get_straight_path(request.source, request.target),
        EdgeStyle::Bezier => get_bezier_path(
            request.source,
            request.source_side,
            request.target,
            request.target_side,
            options.curvature,
        ),
        EdgeStyle::Step => get_step_path(
            request.source,
            request.source_side,
            request.target,
            request.target_side,
            options,
        ),
    }
}

/// The in-progress line drawn while a connection is dragged from a port
/// to the pointer. The free end faces the port's opposite side; step lines
/// have sharp corners.
pub fn route_connection_line(
    from: Point,
    from_side: Side,
    to: Point,
    style: EdgeStyle,
    options: &RouteOptions,
) -> EdgePath {
    let request = RouteRequest {
        source: from,
        source_side: from_side,
        target: to,
        target_side: from_side.opposite(),
        style,
    };
    let options = RouteOptions {
        border_radius: 0.0,
        ..*options
    };
    route(&request, &options)
}

// ─── Straight ────────────────────────────────────────────────────────────

pub fn get_straight_path(source: Point, target: Point) -> EdgePath {
    let center = get_edge_center(source, target);
    EdgePath::new(
        vec![
            PathCmd::MoveTo(source.x, source.y),
            PathCmd::LineTo(target.x, target.y),
        ],
        Point::new(center.x, center.y),
        center.offset_x,
        center.offset_y,
    )
}

// ─── Bezier ──────────────────────────────────────────────────────────────

fn control_offset(delta: f64, curvature: f64) -> f64 {
    if delta >= 0.0 {
        0.5 * delta
    } else {
        curvature * 25.0 * (-delta).sqrt()
    }
}

/// Control point for the endpoint `from`, pulled out along `side`.
fn control_point(side: Side, from: Point, to: Point, curvature: f64) -> Point {
    match side {
        Side::Left => Point::new(from.x - control_offset(from.x - to.x, curvature), from.y),
        Side::Right => Point::new(from.x + control_offset(to.x - from.x, curvature), from.y),
        Side::Top => Point::new(from.x, from.y - control_offset(from.y - to.y, curvature)),
        Side::Bottom => Point::new(from.x, from.y + control_offset(to.y - from.y, curvature)),
    }
}

/// Cubic bezier between two ports; the label sits on the curve at t = 0.5.
pub fn get_bezier_path(
    source: Point,
    source_side: Side,
    target: Point,
    target_side: Side,
    curvature: f64,
) -> EdgePath {
    let c1 = control_point(source_side, source, target, curvature);
    let c2 = control_point(target_side, target, source, curvature);
    let label = source * 0.125 + c1 * 0.375 + c2 * 0.375 + target * 0.125;
    EdgePath::new(
        vec![
            PathCmd::MoveTo(source.x, source.y),
            PathCmd::CubicTo(c1.x, c1.y, c2.x, c2.y, target.x, target.y),
        ],
        label,
        (label.x - source.x).abs(),
        (label.y - source.y).abs(),
    )
}

// ─── Step ────────────────────────────────────────────────────────────────

/// Waypoints of a step route plus the default center offsets.
///
/// The split between the gapped endpoints adds either zero or two points,
/// so the result always holds 4 or 6 waypoints.
pub fn step_points(
    source: Point,
    source_side: Side,
    target: Point,
    target_side: Side,
    options: &RouteOptions,
) -> (SmallVec<[Point; 6]>, f64, f64) {
    let source_dir = source_side.direction();
    let target_dir = target_side.direction();
    let source_gapped = source + source_dir * options.offset;
    let target_gapped = target + target_dir * options.offset;

    // Travel axis follows the source side; `direction` is +1 when the target
    // lies further along it.
    let horizontal = source_side.is_horizontal();
    let axis = |p: Point| if horizontal { p.x } else { p.y };
    let direction = if axis(source_gapped) < axis(target_gapped) {
        1.0
    } else {
        -1.0
    };

    let center = get_edge_center(source, target);
    let mut points: SmallVec<[Point; 6]> = smallvec![source, source_gapped];

    if axis(source_dir) * axis(target_dir) == -1.0 {
        let overridden = options.center.unwrap_or(Point::ZERO);
        let cx = if overridden.x != 0.0 { overridden.x } else { center.x };
        let cy = if overridden.y != 0.0 { overridden.y } else { center.y };

        let vertical_split = [
            Point::new(cx, source_gapped.y),
            Point::new(cx, target_gapped.y),
        ];
        let horizontal_split = [
            Point::new(source_gapped.x, cy),
            Point::new(target_gapped.x, cy),
        ];
        let split = if (axis(source_dir) == direction) == horizontal {
            vertical_split
        } else {
            horizontal_split
        };
        points.extend(split);
    }

    points.push(target_gapped);
    points.push(target);
    (points, center.offset_x, center.offset_y)
}

/// Rounded corner at `b` between segments `a→b` and `b→c`.
///
/// Collinear points yield a single line; otherwise a line stops short of the
/// corner and a quadratic curve turns through it.
pub fn get_bend(a: Point, b: Point, c: Point, radius: f64) -> SmallVec<[PathCmd; 2]> {
    let size = (distance(a, b) / 2.0).min(distance(b, c) / 2.0).min(radius);
    let Point { x, y } = b;

    if (a.x == x && x == c.x) || (a.y == y && y == c.y) {
        return smallvec![PathCmd::LineTo(x, y)];
    }

    if a.y == y {
        // Horizontal in, vertical out.
        let x_dir = if a.x < c.x { -1.0 } else { 1.0 };
        let y_dir = if a.y < c.y { 1.0 } else { -1.0 };
        return smallvec![
            PathCmd::LineTo(x + size * x_dir, y),
            PathCmd::QuadTo(x, y, x, y + size * y_dir),
        ];
    }

    let x_dir = if a.x < c.x { 1.0 } else { -1.0 };
    let y_dir = if a.y < c.y { -1.0 } else { 1.0 };
    smallvec![
        PathCmd::LineTo(x, y + size * y_dir),
        PathCmd::QuadTo(x, y, x + size * x_dir, y),
    ]
}

/// Orthogonal route with rounded bends. The label sits at the edge center.
pub fn get_step_path(
    source: Point,
    source_side: Side,
    target: Point,
    target_side: Side,
    options: &RouteOptions,
) -> EdgePath {
    let (points, offset_x, offset_y) =
        step_points(source, source_side, target, target_side, options);

    let mut commands = Vec::with_capacity(points.len() * 2);
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            commands.push(PathCmd::MoveTo(p.x, p.y));
        } else if i == points.len() - 1 {
            commands.push(PathCmd::LineTo(p.x, p.y));
        } else {
            commands.extend(get_bend(points[i - 1], *p, points[i + 1], options.border_radius));
        }
    }

    let center = get_edge_center(source, target);
    EdgePath::new(commands, Point::new(center.x, center.y), offset_x, offset_y)
}

// ─── Edge-type registry ──────────────────────────────────────────────────

/// Maps edge type tags to routing styles.
///
/// Built once per configuration. The `default` tag is the fallback for
/// edges whose tag is absent or unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeTypeRegistry {
    styles: HashMap<String, EdgeStyle>,
}

impl Default for EdgeTypeRegistry {
    fn default() -> Self {
        let styles = [
            ("straight", EdgeStyle::Straight),
            ("bezier", EdgeStyle::Bezier),
            ("step", EdgeStyle::Step),
            ("default", EdgeStyle::Step),
        ]
        .into_iter()
        .map(|(tag, style)| (tag.to_string(), style))
        .collect();
        Self { styles }
    }
}

impl EdgeTypeRegistry {
    /// Add or replace a tag.
    pub fn register(&mut self, tag: &str, style: EdgeStyle) {
        self.styles.insert(tag.to_string(), style);
    }

    pub fn get(&self, tag: &str) -> Option<EdgeStyle> {
        self.styles.get(tag).copied()
    }

    pub fn resolve(&self, tag: Option<&str>) -> EdgeStyle {
        if let Some(tag) = tag {
            if let Some(style) = self.get(tag) {
                return style;
            }
            log::trace!("unknown edge type {tag:?}, using default");
        }
        self.get("default").unwrap_or_default()
    }
}
