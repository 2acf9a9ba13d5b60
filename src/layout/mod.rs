//! Bracket layout.
//!
//! CPU-side passes that turn measured card boxes into final vertical offsets
//! and connector curves. The presentation layer renders cards at provisional
//! positions, measures them, and applies the offsets computed here.

pub mod connector;
pub mod engine;
pub mod stubs;

pub use connector::{ConnectorPath, ConnectorPathBuilder, Point};
pub use engine::{BracketLayout, BracketLayoutEngine, LayoutConfig, MeasuredBox, PlacedMatch};
pub use stubs::{Stub, StubArena};
