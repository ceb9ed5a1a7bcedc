//! Screen ↔ diagram coordinate conversion and grid snapping.
//!
//! Screen space is what pointer events report; diagram space is where node
//! positions live. The two are related by the viewport [`Transform`]:
//! `screen = diagram · zoom + (x, y)`.

use crate::geometry::{Dimensions, Point, Rect};
use crate::model::{CoordinateExtent, GridStep, Transform};

/// `(screen − (x, y)) / zoom`.
pub fn screen_to_diagram(screen: Point, transform: Transform) -> Point {
    (screen - Point::new(transform.x, transform.y)) / transform.zoom
}

/// `diagram · zoom + (x, y)`.
pub fn diagram_to_screen(diagram: Point, transform: Transform) -> Point {
    diagram * transform.zoom + Point::new(transform.x, transform.y)
}

/// Convert a rect drawn in screen space (e.g. a selection box) into diagram
/// space.
pub fn screen_rect_to_diagram(rect: Rect, transform: Transform) -> Rect {
    Rect::from_origin_size(
        screen_to_diagram(rect.origin(), transform),
        Dimensions::new(rect.width / transform.zoom, rect.height / transform.zoom),
    )
}

/// Inverse of [`screen_rect_to_diagram`].
pub fn diagram_rect_to_screen(rect: Rect, transform: Transform) -> Rect {
    Rect::from_origin_size(
        diagram_to_screen(rect.origin(), transform),
        Dimensions::new(rect.width * transform.zoom, rect.height * transform.zoom),
    )
}

/// Snap `position` to the grid.
///
/// Without a grid (or with a zero step) the position is returned unchanged.
/// With `center` and a node `size`, the node's box rather than its corner is
/// centered on grid cells: snapping runs on `position − (step − size) / 2`
/// and the offset is added back afterwards.
pub fn snap_position(
    position: Point,
    grid: Option<GridStep>,
    center: bool,
    size: Option<Dimensions>,
) -> Point {
    let Some(GridStep(sx, sy)) = grid.filter(GridStep::is_enabled) else {
        return position;
    };

    let offset = match (center, size) {
        (true, Some(size)) => Point::new((sx - size.width) / 2.0, (sy - size.height) / 2.0),
        _ => Point::ZERO,
    };

    let shifted = position - offset;
    Point::new(
        sx * (shifted.x / sx).round(),
        sy * (shifted.y / sy).round(),
    ) + offset
}

/// Keep a node's box (top-left `position`, optional `size`) inside `extent`.
///
/// If the extent is narrower than the node, the node is pinned to the
/// extent's minimum edge.
pub fn clamp_position(
    position: Point,
    extent: CoordinateExtent,
    size: Option<Dimensions>,
) -> Point {
    let size = size.unwrap_or_default();
    Point::new(
        position
            .x
            .min(extent.max.x - size.width)
            .max(extent.min.x),
        position
            .y
            .min(extent.max.y - size.height)
            .max(extent.min.y),
    )
}

/// Clamp a zoom level into `[min, max]`.
pub fn clamp_zoom(zoom: f64, min: f64, max: f64) -> f64 {
    zoom.min(max).max(min)
}

impl Transform {
    /// Translate the viewport by a screen-space delta.
    pub fn pan_by(self, dx: f64, dy: f64) -> Transform {
        Transform::new(self.x + dx, self.y + dy, self.zoom)
    }

    /// Zoom by `factor` around a screen-space `anchor`, keeping the diagram
    /// point under the anchor fixed. The resulting zoom is clamped.
    pub fn zoom_at(self, anchor: Point, factor: f64, min: f64, max: f64) -> Transform {
        let zoom = clamp_zoom(self.zoom * factor, min, max);
        let pinned = screen_to_diagram(anchor, self);
        let translate = anchor - pinned * zoom;
        Transform::new(translate.x, translate.y, zoom)
    }

    /// The diagram-space rect visible in a viewport of `width` × `height`
    /// screen pixels.
    pub fn visible_rect(self, width: f64, height: f64) -> Rect {
        screen_rect_to_diagram(Rect::new(0.0, 0.0, width, height), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn screen_to_diagram_divides_by_zoom() {
        let t = Transform::new(0.0, 0.0, 2.0);
        assert_eq!(screen_to_diagram(Point::new(50.0, 50.0), t), Point::new(25.0, 25.0));

        let t = Transform::new(100.0, -20.0, 0.5);
        let d = screen_to_diagram(Point::new(150.0, 30.0), t);
        assert_eq!(d, Point::new(100.0, 100.0));
        assert!(close(diagram_to_screen(d, t), Point::new(150.0, 30.0)));
    }

    #[test]
    fn rect_conversion_roundtrips() {
        let t = Transform::new(40.0, 10.0, 4.0);
        let screen = Rect::new(40.0, 10.0, 200.0, 100.0);
        let diagram = screen_rect_to_diagram(screen, t);
        assert_eq!(diagram, Rect::new(0.0, 0.0, 50.0, 25.0));
        assert_eq!(diagram_rect_to_screen(diagram, t), screen);
    }

    #[test]
    fn snap_without_grid_is_identity() {
        let p = Point::new(12.3, 45.6);
        assert_eq!(snap_position(p, None, false, None), p);
        assert_eq!(snap_position(p, Some(GridStep(0.0, 10.0)), false, None), p);
    }

    #[test]
    fn snap_rounds_half_away_from_zero() {
        let grid = Some(GridStep(10.0, 10.0));
        assert_eq!(
            snap_position(Point::new(25.0, 25.0), grid, false, None),
            Point::new(30.0, 30.0)
        );
        assert_eq!(
            snap_position(Point::new(-25.0, 14.9), grid, false, None),
            Point::new(-30.0, 10.0)
        );
    }

    #[test]
    fn snap_is_idempotent_and_bounded() {
        let grid = Some(GridStep(15.0, 8.0));
        for i in 0..200 {
            let p = Point::new(i as f64 * 1.37 - 120.0, i as f64 * -0.91 + 33.0);
            let once = snap_position(p, grid, false, None);
            let twice = snap_position(once, grid, false, None);
            assert!(close(once, twice), "{p:?}: {once:?} vs {twice:?}");
            assert!((once.x - p.x).abs() <= 7.5 + EPS);
            assert!((once.y - p.y).abs() <= 4.0 + EPS);
        }
    }

    #[test]
    fn centered_snap_aligns_box_center_to_cell_center() {
        let grid = Some(GridStep(20.0, 20.0));
        let size = Some(Dimensions::new(10.0, 10.0));
        let snapped = snap_position(Point::new(3.0, 21.0), grid, true, size);
        // Offset is (20 - 10) / 2 = 5, so corners land on 5 + 20k.
        assert_eq!(snapped, Point::new(5.0, 25.0));
        // Without a size the center flag has nothing to center.
        assert_eq!(
            snap_position(Point::new(3.0, 21.0), grid, true, None),
            Point::new(0.0, 20.0)
        );
    }

    #[test]
    fn clamp_keeps_box_inside_extent() {
        let extent = CoordinateExtent::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        let size = Some(Dimensions::new(20.0, 10.0));
        assert_eq!(
            clamp_position(Point::new(95.0, -5.0), extent, size),
            Point::new(80.0, 0.0)
        );
        assert_eq!(
            clamp_position(Point::new(50.0, 50.0), extent, size),
            Point::new(50.0, 50.0)
        );
    }

    #[test]
    fn zoom_at_pins_anchor() {
        let t = Transform::new(10.0, 20.0, 1.0);
        let anchor = Point::new(110.0, 70.0);
        let before = screen_to_diagram(anchor, t);
        let zoomed = t.zoom_at(anchor, 1.5, 0.5, 2.0);
        assert_eq!(zoomed.zoom, 1.5);
        assert!(close(screen_to_diagram(anchor, zoomed), before));

        let clamped = zoomed.zoom_at(anchor, 10.0, 0.5, 2.0);
        assert_eq!(clamped.zoom, 2.0);
    }
}
