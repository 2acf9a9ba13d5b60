//! Parent resolution for bracket matches.
//!
//! Each slot of a match is fed by at most one earlier match. Which one is
//! decided by a fixed precedence:
//!
//! 1. **Explicit** - the slot's legacy link names an existing match id.
//! 2. **Coordinate** - the slot's source pointer names an existing
//!    `(round, bracket_position)`.
//! 3. **Topology** - the bracket arithmetic default, `(r-1, 2p-1)` for slot A
//!    and `(r-1, 2p)` for slot B.
//!
//! When exactly one slot resolves through tiers 1-2, the other slot takes
//! whichever topology default the first did not claim, preferring the left
//! one. Edits such as swaps and manual re-seeding therefore never snap back to
//! the defaults, while untouched matches resolve with no pointer data at all.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Edge, Match, MatchId, Outcome, Slot};

/// How a slot's parent was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "via", content = "matchId", rename_all = "camelCase")]
pub enum ParentLink {
    Explicit(MatchId),
    Coordinate(MatchId),
    Topology(MatchId),
}

impl ParentLink {
    pub fn match_id(self) -> MatchId {
        match self {
            ParentLink::Explicit(id) | ParentLink::Coordinate(id) | ParentLink::Topology(id) => id,
        }
    }
}

/// The resolved parent of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotFeed {
    pub link: ParentLink,
    /// Which result of the parent feeds the slot.
    pub outcome: Outcome,
}

/// Resolved parents of both slots of a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedParents {
    pub a: Option<SlotFeed>,
    pub b: Option<SlotFeed>,
}

impl ResolvedParents {
    pub fn get(&self, slot: Slot) -> Option<SlotFeed> {
        match slot {
            Slot::A => self.a,
            Slot::B => self.b,
        }
    }

    /// Parent match ids, slot A first.
    pub fn parent_ids(&self) -> impl Iterator<Item = MatchId> + '_ {
        [self.a, self.b].into_iter().flatten().map(|f| f.link.match_id())
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_none() && self.b.is_none()
    }
}

/// Strategies tried before the topology fallback, in precedence order.
#[derive(Debug, Clone, Copy)]
enum Strategy {
    Explicit,
    Coordinate,
}

const PRECEDENCE: [Strategy; 2] = [Strategy::Explicit, Strategy::Coordinate];

/// Resolves parents against one bracket's match set.
///
/// Matches without a valid coordinate are not indexed and have no parents.
pub struct DependencyResolver<'a> {
    matches: &'a [Match],
    by_id: HashMap<MatchId, &'a Match>,
    by_coordinate: HashMap<(u32, u32), &'a Match>,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(matches: &'a [Match]) -> Self {
        let mut by_id = HashMap::with_capacity(matches.len());
        let mut by_coordinate = HashMap::with_capacity(matches.len());

        for m in matches {
            if let Some(coord) = m.coordinate() {
                by_id.insert(m.id, m);
                by_coordinate.entry(coord).or_insert(m);
            }
        }

        Self {
            matches,
            by_id,
            by_coordinate,
        }
    }

    /// Look up an indexed match by id.
    pub fn get(&self, id: MatchId) -> Option<&'a Match> {
        self.by_id.get(&id).copied()
    }

    /// Look up an indexed match by `(round, bracket_position)`.
    pub fn at(&self, round: u32, bracket_position: u32) -> Option<&'a Match> {
        self.by_coordinate.get(&(round, bracket_position)).copied()
    }

    /// Resolve both slots of `m`.
    pub fn resolve(&self, m: &Match) -> ResolvedParents {
        let Some((round, pos)) = m.coordinate() else {
            return ResolvedParents::default();
        };

        let explicit_a = self.resolve_explicit(m, Slot::A);
        let explicit_b = self.resolve_explicit(m, Slot::B);

        let (left, right) = match m.parent_coordinates() {
            Some([(lr, lp), (rr, rp)]) => (self.at(lr, lp).map(|p| p.id), self.at(rr, rp).map(|p| p.id)),
            None => (None, None),
        };

        let feed = |slot: Slot, id: MatchId| SlotFeed {
            link: ParentLink::Topology(id),
            outcome: m.source(slot).map(|p| p.outcome).unwrap_or_default(),
        };

        let (a, b) = match (explicit_a, explicit_b) {
            (Some(a), Some(b)) => (Some(a), Some(b)),
            (None, None) => (left.map(|id| feed(Slot::A, id)), right.map(|id| feed(Slot::B, id))),
            (Some(a), None) => {
                let claimed = a.link.match_id();
                let fallback = [left, right].into_iter().flatten().find(|&id| id != claimed);
                (Some(a), fallback.map(|id| feed(Slot::B, id)))
            }
            (None, Some(b)) => {
                let claimed = b.link.match_id();
                let fallback = [left, right].into_iter().flatten().find(|&id| id != claimed);
                (fallback.map(|id| feed(Slot::A, id)), Some(b))
            }
        };

        let resolved = ResolvedParents { a, b };
        if round > 1 && resolved.is_empty() {
            tracing::warn!(match_id = %m.id, round, pos, "no resolvable parent for a later-round match");
        }
        resolved
    }

    /// Resolve every indexed match.
    pub fn resolve_all(&self) -> HashMap<MatchId, ResolvedParents> {
        self.matches
            .iter()
            .filter(|m| m.coordinate().is_some())
            .map(|m| (m.id, self.resolve(m)))
            .collect()
    }

    /// Every resolved parent → child edge, in match order, slot A first.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for m in self.matches.iter().filter(|m| m.coordinate().is_some()) {
            let parents = self.resolve(m);
            for slot in [Slot::A, Slot::B] {
                if let Some(feed) = parents.get(slot) {
                    edges.push(Edge {
                        from: feed.link.match_id(),
                        to: m.id,
                        slot,
                        outcome: feed.outcome,
                    });
                }
            }
        }
        edges
    }

    /// Tiers 1-2 for one slot.
    fn resolve_explicit(&self, m: &Match, slot: Slot) -> Option<SlotFeed> {
        let pointer = m.source(slot);
        let outcome = pointer.map(|p| p.outcome).unwrap_or_default();

        PRECEDENCE.iter().find_map(|strategy| {
            let link = match strategy {
                Strategy::Explicit => {
                    let id = m.link(slot)?;
                    ParentLink::Explicit(self.get(id)?.id)
                }
                Strategy::Coordinate => {
                    let p = pointer?;
                    ParentLink::Coordinate(self.at(p.round, p.bracket_position)?.id)
                }
            };
            if link.match_id() == m.id {
                tracing::trace!(match_id = %m.id, ?slot, "ignoring self-referencing parent");
                return None;
            }
            Some(SlotFeed { link, outcome })
        })
    }
}
