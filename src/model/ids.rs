//! Identifier types.
//!
//! Matches and teams are addressed by small copyable newtypes so that a team
//! id can never be passed where a match id is expected. Both wrap plain
//! integers for cheap storage and WebAssembly interop.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Durable match identifier.
///
/// Supplied by the persistence layer or allocated by a generator. Any value
/// is valid, including negative ids for unsaved matches; layout placeholders
/// take ids below every id of the pass they belong to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub i32);

impl MatchId {
    /// Create a new MatchId from a raw i32.
    #[inline]
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    /// Get the raw i32 value.
    #[inline]
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Match({})", self.0)
    }
}

impl From<i32> for MatchId {
    #[inline]
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<MatchId> for i32 {
    #[inline]
    fn from(id: MatchId) -> Self {
        id.0
    }
}

/// Team identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl TeamId {
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team({})", self.0)
    }
}

impl From<u32> for TeamId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<TeamId> for u32 {
    #[inline]
    fn from(id: TeamId) -> Self {
        id.0
    }
}
