//! Bracket data model.
//!
//! Matches are the central entity. Each carries a `(round, bracket_position)`
//! coordinate addressing a complete binary tree, team slots, a result, and
//! per-slot source pointers naming the match that feeds the slot.

mod ids;
mod records;

pub use ids::{MatchId, TeamId};
pub use records::{Edge, Match, MatchStatus, Outcome, RoundRobinRow, Slot, SourcePointer, TeamLite};
