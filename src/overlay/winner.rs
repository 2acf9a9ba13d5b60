//! Display-only winner propagation.
//!
//! Finished matches imply who occupies the empty slots they feed. The result
//! is a separate map merged by the presentation layer; stored matches are
//! never written to, and a slot that already holds a team is never implied.

use std::collections::HashMap;

use serde::Serialize;

use crate::graph::DependencyResolver;
use crate::model::{Match, MatchId, MatchStatus, Outcome, Slot, TeamId};

/// Winner of a finished match with two distinct scores.
///
/// Draws, missing scores, and unfinished matches have no winner.
pub fn compute_winner(m: &Match) -> Option<TeamId> {
    let (a, b) = decided_scores(m)?;
    if a > b { m.team_a } else { m.team_b }
}

/// Loser of a finished match with two distinct scores.
pub fn compute_loser(m: &Match) -> Option<TeamId> {
    let (a, b) = decided_scores(m)?;
    if a > b { m.team_b } else { m.team_a }
}

fn decided_scores(m: &Match) -> Option<(u32, u32)> {
    if m.status != MatchStatus::Finished {
        return None;
    }
    match (m.score_a, m.score_b) {
        (Some(a), Some(b)) if a != b => Some((a, b)),
        _ => None,
    }
}

/// Teams implied for the empty slots of one match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpliedTeams {
    pub team_a: Option<TeamId>,
    pub team_b: Option<TeamId>,
}

impl ImpliedTeams {
    pub fn get(&self, slot: Slot) -> Option<TeamId> {
        match slot {
            Slot::A => self.team_a,
            Slot::B => self.team_b,
        }
    }

    fn set(&mut self, slot: Slot, team: TeamId) {
        match slot {
            Slot::A => self.team_a = Some(team),
            Slot::B => self.team_b = Some(team),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.team_a.is_none() && self.team_b.is_none()
    }
}

#[derive(Debug, Default)]
pub struct WinnerPropagator;

impl WinnerPropagator {
    pub fn new() -> Self {
        Self
    }

    /// Implied teams for every match with at least one fillable empty slot.
    ///
    /// Only direct parents are consulted: an implied team is not itself fed
    /// forward, since the parent's own result is still unknown.
    pub fn propagate(&self, matches: &[Match]) -> HashMap<MatchId, ImpliedTeams> {
        let resolver = DependencyResolver::new(matches);
        let mut overlay = HashMap::new();

        for m in matches.iter().filter(|m| m.coordinate().is_some()) {
            let parents = resolver.resolve(m);
            let mut implied = ImpliedTeams::default();

            for slot in [Slot::A, Slot::B] {
                if m.team(slot).is_some() {
                    continue;
                }
                let Some(feed) = parents.get(slot) else {
                    continue;
                };
                let Some(parent) = resolver.get(feed.link.match_id()) else {
                    continue;
                };
                let team = match feed.outcome {
                    Outcome::Win => compute_winner(parent),
                    Outcome::Lose => compute_loser(parent),
                };
                if let Some(team) = team {
                    implied.set(slot, team);
                }
            }

            if !implied.is_empty() {
                overlay.insert(m.id, implied);
            }
        }

        tracing::debug!(implied = overlay.len(), "propagated winners");
        overlay
    }
}
