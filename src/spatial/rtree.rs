//! R-tree based spatial index using the rstar crate.
//!
//! Provides O(log n) spatial queries over laid-out match cards:
//! - Card under a point
//! - Cards intersecting a rectangle
//! - Nearest card within a tolerance

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::layout::{BracketLayout, PlacedMatch};
use crate::model::MatchId;

/// A card's final bounding box with its match id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRect {
    pub id: MatchId,
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl CardRect {
    pub fn new(id: MatchId, min: [f32; 2], max: [f32; 2]) -> Self {
        Self { id, min, max }
    }

    /// Bounding box of a placement at its final position.
    pub fn from_placement(placed: &PlacedMatch) -> Self {
        Self::new(
            placed.id,
            [placed.x, placed.top()],
            [placed.right(), placed.bottom()],
        )
    }
}

impl RTreeObject for CardRect {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for CardRect {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = (self.min[0] - point[0]).max(point[0] - self.max[0]).max(0.0);
        let dy = (self.min[1] - point[1]).max(point[1] - self.max[1]).max(0.0);
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        point[0] >= self.min[0] && point[0] <= self.max[0] && point[1] >= self.min[1] && point[1] <= self.max[1]
    }
}

/// Spatial index for match cards.
///
/// Uses an R*-tree for efficient spatial queries. Layout placeholders are
/// never indexed since nothing is drawn for them.
pub struct SpatialIndex {
    tree: RTree<CardRect>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk load a set of cards.
    pub fn from_cards(cards: Vec<CardRect>) -> Self {
        Self {
            tree: RTree::bulk_load(cards),
        }
    }

    /// Replace the contents with the stored matches of `layout`.
    pub fn rebuild(&mut self, layout: &BracketLayout) {
        let cards: Vec<CardRect> = layout
            .placements()
            .iter()
            .filter(|p| !p.is_stub)
            .map(CardRect::from_placement)
            .collect();
        self.tree = RTree::bulk_load(cards);
    }

    /// The card under a point, if any.
    pub fn match_at(&self, x: f32, y: f32) -> Option<MatchId> {
        self.tree.locate_at_point(&[x, y]).map(|card| card.id)
    }

    /// Every card intersecting a rectangle.
    pub fn matches_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<MatchId> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|card| card.id)
            .collect()
    }

    /// Find the nearest card within a maximum distance of its edge.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<MatchId> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|card| card.distance_2(&[x, y]) <= max_distance_sq)
            .map(|card| card.id)
    }

    /// Clear all cards from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::layout::{BracketLayoutEngine, MeasuredBox};
    use crate::model::Match;

    fn card(id: i32, x: f32, y: f32) -> CardRect {
        CardRect::new(MatchId(id), [x, y], [x + 100.0, y + 50.0])
    }

    #[test]
    fn test_match_at() {
        let index = SpatialIndex::from_cards(vec![card(1, 0.0, 0.0), card(2, 0.0, 100.0)]);

        assert_eq!(index.match_at(50.0, 25.0), Some(MatchId(1)));
        assert_eq!(index.match_at(50.0, 120.0), Some(MatchId(2)));
        assert_eq!(index.match_at(50.0, 75.0), None, "gap between cards");
    }

    #[test]
    fn test_matches_in_rect() {
        let index = SpatialIndex::from_cards(vec![card(1, 0.0, 0.0), card(2, 0.0, 100.0), card(3, 300.0, 50.0)]);

        let mut hits = index.matches_in_rect(-10.0, 40.0, 120.0, 110.0);
        hits.sort();
        assert_eq!(hits, vec![MatchId(1), MatchId(2)]);
    }

    #[test]
    fn test_nearest_within() {
        let index = SpatialIndex::from_cards(vec![card(1, 0.0, 0.0)]);

        assert_eq!(index.nearest_within(105.0, 25.0, 10.0), Some(MatchId(1)));
        assert_eq!(index.nearest_within(130.0, 25.0, 10.0), None);
    }

    #[test]
    fn test_layout_index_skips_stubs() {
        let matches = vec![
            Match::new(MatchId(1), 0, 1, 1),
            Match::new(MatchId(3), 0, 2, 1),
        ];
        let sizes: HashMap<MatchId, MeasuredBox> = [
            (MatchId(1), MeasuredBox::new(0.0, 0.0, 100.0, 50.0)),
            (MatchId(3), MeasuredBox::new(200.0, 0.0, 100.0, 50.0)),
        ]
        .into();
        let layout = BracketLayoutEngine::default().compute(&matches, &sizes);
        assert_eq!(layout.stubs().len(), 1);

        let mut index = SpatialIndex::new();
        index.rebuild(&layout);
        assert_eq!(index.len(), 2);
        assert_eq!(index.match_at(250.0, 25.0), Some(MatchId(3)));

        let everything = index.matches_in_rect(-1000.0, -1000.0, 1000.0, 1000.0);
        assert!(!everything.contains(&layout.stubs()[0].id));
    }

    #[test]
    fn test_clear() {
        let mut index = SpatialIndex::from_cards(vec![card(1, 0.0, 0.0)]);
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.match_at(10.0, 10.0), None);
    }
}
