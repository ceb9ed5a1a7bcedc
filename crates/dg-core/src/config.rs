//! Diagram-wide configuration.
//!
//! The host passes one [`DiagramConfig`], usually deserialized from the
//! same JSON props it hands its renderer. Every field has a default, so
//! `{}` is a valid config.

use crate::error::{Error, Result};
use crate::model::{CoordinateExtent, EdgeStyle, GridStep, NodeOrigin};
use crate::resolve::{DEFAULT_ELEVATION, ResolveOptions};
use crate::route::{DEFAULT_BORDER_RADIUS, DEFAULT_OFFSET, EdgeTypeRegistry, RouteOptions};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagramConfig {
    pub node_origin: NodeOrigin,
    pub grid_step: Option<GridStep>,
    /// Center dragged nodes on grid cells instead of snapping their corner.
    pub center_step: bool,
    pub elevate_nodes_on_select: bool,
    /// z bonus for selected nodes when elevation is on.
    pub elevation: i32,
    pub only_render_visible_elements: bool,
    pub nodes_draggable: bool,
    pub elements_selectable: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub node_extent: Option<CoordinateExtent>,
    /// Extra edge type tags, merged over the built-in ones.
    pub edge_types: HashMap<String, EdgeStyle>,
    pub edge_offset: f64,
    pub edge_border_radius: f64,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            node_origin: NodeOrigin::TOP_LEFT,
            grid_step: None,
            center_step: false,
            elevate_nodes_on_select: true,
            elevation: DEFAULT_ELEVATION,
            only_render_visible_elements: false,
            nodes_draggable: true,
            elements_selectable: true,
            min_zoom: 0.5,
            max_zoom: 2.0,
            node_extent: None,
            edge_types: HashMap::new(),
            edge_offset: DEFAULT_OFFSET,
            edge_border_radius: DEFAULT_BORDER_RADIUS,
        }
    }
}

impl DiagramConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DiagramConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let NodeOrigin(ox, oy) = self.node_origin;
        if !(0.0..=1.0).contains(&ox) || !(0.0..=1.0).contains(&oy) {
            return Err(invalid(format!(
                "nodeOrigin must lie in [0, 1]², got ({ox}, {oy})"
            )));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(invalid(format!(
                "zoom range must satisfy 0 < minZoom <= maxZoom, got [{}, {}]",
                self.min_zoom, self.max_zoom
            )));
        }
        if let Some(GridStep(sx, sy)) = self.grid_step
            && (sx < 0.0 || sy < 0.0)
        {
            return Err(invalid(format!(
                "gridStep must not be negative, got ({sx}, {sy})"
            )));
        }
        if self.edge_offset < 0.0 || self.edge_border_radius < 0.0 {
            return Err(invalid(
                "edgeOffset and edgeBorderRadius must not be negative".to_string(),
            ));
        }
        if let Some(extent) = self.node_extent
            && (extent.min.x > extent.max.x || extent.min.y > extent.max.y)
        {
            return Err(invalid("nodeExtent min must not exceed max".to_string()));
        }
        Ok(())
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            origin: self.node_origin,
            elevate_selected: self.elevate_nodes_on_select,
            elevation: self.elevation,
        }
    }

    pub fn route_options(&self) -> RouteOptions {
        RouteOptions {
            offset: self.edge_offset,
            border_radius: self.edge_border_radius,
            ..RouteOptions::default()
        }
    }

    /// Build the edge-type registry once for this config.
    pub fn edge_registry(&self) -> EdgeTypeRegistry {
        let mut registry = EdgeTypeRegistry::default();
        for (tag, style) in &self.edge_types {
            registry.register(tag, *style);
        }
        registry
    }
}

fn invalid(message: String) -> Error {
    log::warn!("rejecting diagram config: {message}");
    Error::InvalidConfig { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(DiagramConfig::from_json("{}").unwrap(), DiagramConfig::default());
    }

    #[test]
    fn parses_camel_case_fields() {
        let config = DiagramConfig::from_json(
            r#"{
                "nodeOrigin": [0.5, 0.5],
                "gridStep": [10, 10],
                "centerStep": true,
                "elevateNodesOnSelect": false,
                "nodeExtent": { "min": { "x": 0, "y": 0 }, "max": { "x": 500, "y": 400 } },
                "edgeTypes": { "smooth": "bezier" },
                "edgeBorderRadius": 0
            }"#,
        )
        .unwrap();
        assert_eq!(config.node_origin, NodeOrigin::CENTER);
        assert_eq!(config.grid_step, Some(GridStep(10.0, 10.0)));
        assert!(config.center_step);
        assert!(!config.elevate_nodes_on_select);
        assert_eq!(
            config.node_extent.map(|e| e.max),
            Some(Point::new(500.0, 400.0))
        );
        assert_eq!(config.edge_registry().resolve(Some("smooth")), EdgeStyle::Bezier);
        assert_eq!(config.route_options().border_radius, 0.0);
        assert_eq!(config.route_options().offset, DEFAULT_OFFSET);
    }

    #[test]
    fn rejects_origin_outside_unit_square() {
        let err = DiagramConfig::from_json(r#"{ "nodeOrigin": [1.5, 0] }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }), "{err}");
    }

    #[test]
    fn rejects_inverted_zoom_range() {
        let err = DiagramConfig::from_json(r#"{ "minZoom": 3, "maxZoom": 2 }"#).unwrap_err();
        assert!(err.to_string().contains("minZoom"));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = DiagramConfig::from_json("{ nodeOrigin: ").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
