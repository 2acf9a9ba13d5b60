//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based spatial index over the final card
//! rectangles of a bracket layout.

mod rtree;

pub use rtree::{CardRect, SpatialIndex};
