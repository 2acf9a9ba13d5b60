//! Layout placeholders for missing parent slots.
//!
//! A match at `(r, p)` expects its parents at `(r-1, 2p-1)` and `(r-1, 2p)`.
//! When the data has no match at one of those coordinates, a stub is put
//! there so every visible match keeps a complete set of anchors. Stubs exist
//! only for the duration of one layout pass: they take ids from a pass-local
//! arena that counts down from below the lowest stored id, carry no teams or
//! scores, and are never persisted.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::model::{Match, MatchId, Slot};

/// A placeholder match occupying an empty parent slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stub {
    pub id: MatchId,
    pub round: u32,
    pub bracket_position: u32,
    /// The single match this stub would feed.
    pub child: MatchId,
    /// Slot of `child` it sits behind.
    pub slot: Slot,
}

/// Hands out placeholder ids for one layout pass.
///
/// Ids start one below `min(lowest, 0)` and count down, so they never
/// collide with a stored match, including unsaved ones with negative ids.
#[derive(Debug)]
pub struct StubArena {
    next: i64,
}

impl StubArena {
    /// Arena whose ids all sit below `lowest`.
    pub fn below(lowest: MatchId) -> Self {
        Self {
            next: i64::from(lowest.raw().min(0)) - 1,
        }
    }

    /// Arena below every id in `ids`.
    pub fn below_all(ids: impl IntoIterator<Item = MatchId>) -> Self {
        Self::below(ids.into_iter().min().unwrap_or(MatchId(0)))
    }

    /// Next free id, or `None` once the `i32` range is exhausted.
    pub fn alloc(&mut self) -> Option<MatchId> {
        let id = i32::try_from(self.next).ok()?;
        self.next -= 1;
        Some(MatchId(id))
    }
}

impl Default for StubArena {
    fn default() -> Self {
        Self::below(MatchId(0))
    }
}

/// Insert stubs for every topology-default parent missing from the data.
///
/// `rounds` maps each round to its matches sorted by bracket position. Rounds
/// are walked first to last; round 1 never needs stubs.
pub fn inject_stubs(rounds: &BTreeMap<u32, Vec<&Match>>, arena: &mut StubArena) -> Vec<Stub> {
    let mut occupied: HashSet<(u32, u32)> = rounds
        .values()
        .flatten()
        .filter_map(|m| m.coordinate())
        .collect();

    let mut stubs = Vec::new();
    for (&round, matches) in rounds {
        if round < 2 {
            continue;
        }
        for m in matches {
            let Some([left, right]) = m.parent_coordinates() else {
                continue;
            };
            for (slot, (parent_round, parent_pos)) in [(Slot::A, left), (Slot::B, right)] {
                if !occupied.insert((parent_round, parent_pos)) {
                    continue;
                }
                let Some(id) = arena.alloc() else {
                    tracing::warn!(child = %m.id, "placeholder ids exhausted");
                    return stubs;
                };
                stubs.push(Stub {
                    id,
                    round: parent_round,
                    bracket_position: parent_pos,
                    child: m.id,
                    slot,
                });
            }
        }
    }

    if !stubs.is_empty() {
        tracing::debug!(stubs = stubs.len(), "injected layout placeholders");
    }
    stubs
}
