//! Match dependency resolution and the bracket graph.
//!
//! The resolver decides which earlier match feeds each slot; the graph stores
//! the resulting parent → child edges (plus layout placeholders) for the
//! layout and connector passes.

mod bracket_graph;
mod resolver;

pub use bracket_graph::{BracketGraph, Feed};
pub use resolver::{DependencyResolver, ParentLink, ResolvedParents, SlotFeed};
