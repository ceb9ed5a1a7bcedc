//! Conversion of routed paths and boxes into `kurbo` geometry.

use dg_core::geometry::{Point, Rect};
use dg_core::model::PathCmd;
use kurbo::BezPath;

/// Build a `BezPath` from routed path commands.
pub fn to_bez_path(commands: &[PathCmd]) -> BezPath {
    let mut bez = BezPath::new();
    for cmd in commands {
        match *cmd {
            PathCmd::MoveTo(x, y) => bez.move_to((x, y)),
            PathCmd::LineTo(x, y) => bez.line_to((x, y)),
            PathCmd::QuadTo(cx, cy, ex, ey) => bez.quad_to((cx, cy), (ex, ey)),
            PathCmd::CubicTo(c1x, c1y, c2x, c2y, ex, ey) => {
                bez.curve_to((c1x, c1y), (c2x, c2y), (ex, ey))
            }
        }
    }
    bez
}

pub fn to_kurbo_point(p: Point) -> kurbo::Point {
    kurbo::Point::new(p.x, p.y)
}

pub fn to_kurbo_rect(r: Rect) -> kurbo::Rect {
    kurbo::Rect::new(r.x, r.y, r.right(), r.bottom())
}
