//! Connector curves between laid-out cards.
//!
//! Each edge runs from the parent's trailing edge to the child's leading edge
//! as a cubic Bézier whose control points are pulled horizontally toward each
//! other, giving an S-curve rather than an elbow.

use serde::Serialize;

use super::engine::{BracketLayout, LayoutConfig};
use crate::model::{MatchId, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Cubic curve descriptor for one parent → child edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorPath {
    pub from: MatchId,
    pub to: MatchId,
    pub slot: Slot,
    pub start: Point,
    pub control_start: Point,
    pub control_end: Point,
    pub end: Point,
}

impl ConnectorPath {
    /// SVG path data, e.g. `M 200 40 C 214 40 226 88 240 88`.
    pub fn svg_path(&self) -> String {
        format!(
            "M {} {} C {} {} {} {} {} {}",
            self.start.x,
            self.start.y,
            self.control_start.x,
            self.control_start.y,
            self.control_end.x,
            self.control_end.y,
            self.end.x,
            self.end.y
        )
    }
}

pub struct ConnectorPathBuilder {
    curve_fraction: f32,
}

impl ConnectorPathBuilder {
    pub fn new(curve_fraction: f32) -> Self {
        Self { curve_fraction }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.curve_fraction)
    }

    /// Curves for every edge between two stored matches, in layout order of
    /// the child and slot A first.
    ///
    /// Edges touching a stub are skipped: placeholders are never drawn.
    pub fn build(&self, layout: &BracketLayout) -> Vec<ConnectorPath> {
        let graph = layout.graph();
        let mut paths = Vec::with_capacity(graph.edge_count());

        for child in layout.placements().iter().filter(|p| !p.is_stub) {
            for (slot, from) in graph.parents(child.id) {
                if graph.is_stub(from) {
                    continue;
                }
                let Some(parent) = layout.get(from) else {
                    continue;
                };

                let start = Point::new(parent.right(), parent.center_y);
                let end = Point::new(child.x, child.center_y);
                let pull = (end.x - start.x) * self.curve_fraction;

                paths.push(ConnectorPath {
                    from,
                    to: child.id,
                    slot,
                    start,
                    control_start: Point::new(start.x + pull, start.y),
                    control_end: Point::new(end.x - pull, end.y),
                    end,
                });
            }
        }
        paths
    }
}

impl Default for ConnectorPathBuilder {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}
