//! Editing intents and first-round seeding helpers.
//!
//! The core never mutates stored matches. Instead it produces [`EditIntent`]s
//! that the editing layer applies (and persists) on its own schedule.
//! Validation here is advisory: a conflicting option is disabled with a
//! reason, never rejected with an error.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::BracketError;
use crate::model::{Match, MatchId, Slot, TeamId, TeamLite};

/// A mutation the editing layer should apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EditIntent {
    AssignTeam {
        #[serde(rename = "matchId")]
        match_id: MatchId,
        slot: Slot,
        team: Option<TeamId>,
    },
    SwapPair {
        #[serde(rename = "matchId")]
        match_id: MatchId,
    },
    BulkAssignFirstRound {
        rows: Vec<FirstRoundAssignment>,
    },
    ClearFirstRound,
}

/// Both slots of one round-1 match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstRoundAssignment {
    pub match_id: MatchId,
    pub team_a: Option<TeamId>,
    pub team_b: Option<TeamId>,
}

/// One entry of a first-round team picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedOption {
    pub team_id: TeamId,
    pub label: String,
    /// Why the option cannot be picked, if it cannot.
    pub disabled_reason: Option<String>,
}

impl SeedOption {
    pub fn is_disabled(&self) -> bool {
        self.disabled_reason.is_some()
    }
}

pub fn assign_team(
    matches: &[Match],
    match_id: MatchId,
    slot: Slot,
    team: Option<TeamId>,
) -> Result<EditIntent, BracketError> {
    find_match(matches, match_id)?;
    Ok(EditIntent::AssignTeam {
        match_id,
        slot,
        team,
    })
}

pub fn swap_pair(matches: &[Match], match_id: MatchId) -> Result<EditIntent, BracketError> {
    find_match(matches, match_id)?;
    Ok(EditIntent::SwapPair { match_id })
}

pub fn clear_first_round() -> EditIntent {
    EditIntent::ClearFirstRound
}

/// Build the team picker for one round-1 slot.
///
/// A team is disabled when it already sits in another round-1 slot, or when a
/// placed team already holds its seed.
pub fn seed_options(
    matches: &[Match],
    teams: &HashMap<TeamId, TeamLite>,
    eligible: &[TeamId],
    target: MatchId,
    slot: Slot,
) -> Vec<SeedOption> {
    let mut placed: HashMap<TeamId, MatchId> = HashMap::new();
    for m in first_round(matches) {
        for s in [Slot::A, Slot::B] {
            if m.id == target && s == slot {
                continue;
            }
            if let Some(team) = m.team(s) {
                placed.insert(team, m.id);
            }
        }
    }

    let used_seeds: HashMap<u32, TeamId> = placed
        .keys()
        .filter_map(|id| Some((teams.get(id)?.seed?, *id)))
        .collect();

    eligible
        .iter()
        .map(|&team_id| {
            let team = teams.get(&team_id);
            let seed = team.and_then(|t| t.seed);
            let label = match (team, seed) {
                (Some(t), Some(s)) => format!("{} (seed {s})", t.name),
                (Some(t), None) => t.name.clone(),
                (None, _) => team_id.to_string(),
            };

            let disabled_reason = if let Some(other) = placed.get(&team_id) {
                Some(format!("already placed in {other}"))
            } else {
                seed.and_then(|s| {
                    let holder = used_seeds.get(&s)?;
                    let name = teams
                        .get(holder)
                        .map(|t| t.name.clone())
                        .unwrap_or_else(|| holder.to_string());
                    Some(format!("seed {s} already used by {name}"))
                })
            };

            SeedOption {
                team_id,
                label,
                disabled_reason,
            }
        })
        .collect()
}

/// Rank `eligible`, then pair rank `i` against rank `S - 1 - i` into the
/// round-1 match at position `i + 1`, for a bracket of `S` slots.
///
/// `reseed` may supply the ranking; when it is absent or declines (returns
/// `None`), teams are ordered by seed with unseeded teams last. A supplied
/// ranking is cleaned before use: ids outside `eligible` and repeats are
/// dropped, and eligible teams it leaves out follow in seed order.
pub fn auto_seed_and_pair(
    matches: &[Match],
    teams: &HashMap<TeamId, TeamLite>,
    eligible: &[TeamId],
    reseed: Option<&dyn Fn(&[TeamId]) -> Option<Vec<TeamId>>>,
) -> EditIntent {
    let by_seed = rank_by_seed(teams, eligible);
    let ranked = match reseed.and_then(|f| f(eligible)) {
        Some(custom) => merge_ranking(custom, eligible, by_seed),
        None => by_seed,
    };

    let round_one = first_round(matches);
    let size = round_one.len() * 2;
    if ranked.len() > size {
        tracing::warn!(
            ranked = ranked.len(),
            slots = size,
            "more ranked teams than first-round slots; extra teams left out"
        );
    }

    let rows = round_one
        .iter()
        .enumerate()
        .map(|(i, m)| FirstRoundAssignment {
            match_id: m.id,
            team_a: ranked.get(i).copied(),
            team_b: ranked.get(size - 1 - i).copied(),
        })
        .collect();

    EditIntent::BulkAssignFirstRound { rows }
}

/// Round-1 matches sorted by bracket position.
fn first_round(matches: &[Match]) -> Vec<&Match> {
    let mut round_one: Vec<&Match> = matches
        .iter()
        .filter(|m| matches!(m.coordinate(), Some((1, _))))
        .collect();
    round_one.sort_by_key(|m| m.bracket_position);
    round_one
}

fn rank_by_seed(teams: &HashMap<TeamId, TeamLite>, eligible: &[TeamId]) -> Vec<TeamId> {
    let mut indexed: Vec<(usize, TeamId, Option<u32>)> = eligible
        .iter()
        .enumerate()
        .map(|(i, &id)| (i, id, teams.get(&id).and_then(|t| t.seed)))
        .collect();
    indexed.sort_by_key(|&(i, _, seed)| (seed.is_none(), seed, i));
    dedup_in_order(indexed.into_iter().map(|(_, id, _)| id).collect())
}

/// `custom` restricted to `eligible` without repeats, then the rest of `by_seed`.
fn merge_ranking(custom: Vec<TeamId>, eligible: &[TeamId], by_seed: Vec<TeamId>) -> Vec<TeamId> {
    let allowed: HashSet<TeamId> = eligible.iter().copied().collect();
    let (kept, foreign): (Vec<TeamId>, Vec<TeamId>) = custom.into_iter().partition(|id| allowed.contains(id));
    if !foreign.is_empty() {
        tracing::warn!(?foreign, "reseed ranking named ineligible teams; ignored");
    }

    let mut ranked = dedup_in_order(kept);
    let placed: HashSet<TeamId> = ranked.iter().copied().collect();
    let missing: Vec<TeamId> = by_seed.into_iter().filter(|id| !placed.contains(id)).collect();
    if !missing.is_empty() {
        tracing::debug!(missing = missing.len(), "reseed ranking incomplete; appending by seed");
    }
    ranked.extend(missing);
    ranked
}

fn dedup_in_order(ids: Vec<TeamId>) -> Vec<TeamId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn find_match(matches: &[Match], match_id: MatchId) -> Result<&Match, BracketError> {
    matches
        .iter()
        .find(|m| m.id == match_id)
        .ok_or(BracketError::UnknownMatch(match_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: u32, seed: Option<u32>) -> (TeamId, TeamLite) {
        (
            TeamId(id),
            TeamLite {
                id: TeamId(id),
                name: format!("Team {id}"),
                seed,
                logo: None,
            },
        )
    }

    fn round_one(count: u32) -> Vec<Match> {
        (1..=count)
            .map(|p| Match::new(MatchId(p as i32), 0, 1, p))
            .collect()
    }

    #[test]
    fn test_placed_team_is_disabled() {
        let teams: HashMap<_, _> = [team(1, Some(1)), team(2, Some(2)), team(3, None)].into();
        let mut matches = round_one(2);
        matches[1].team_a = Some(TeamId(2));

        let options = seed_options(&matches, &teams, &[TeamId(1), TeamId(2), TeamId(3)], MatchId(1), Slot::A);

        assert!(!options[0].is_disabled());
        assert_eq!(options[0].label, "Team 1 (seed 1)");
        assert_eq!(options[1].disabled_reason.as_deref(), Some("already placed in Match(2)"));
        assert!(!options[2].is_disabled());
        assert_eq!(options[2].label, "Team 3");
    }

    #[test]
    fn test_own_slot_does_not_disable() {
        let teams: HashMap<_, _> = [team(1, Some(1))].into();
        let mut matches = round_one(1);
        matches[0].team_a = Some(TeamId(1));

        let options = seed_options(&matches, &teams, &[TeamId(1)], MatchId(1), Slot::A);
        assert!(!options[0].is_disabled(), "the slot's current team stays selectable");
    }

    #[test]
    fn test_duplicate_seed_is_disabled() {
        let teams: HashMap<_, _> = [team(1, Some(3)), team(2, Some(3))].into();
        let mut matches = round_one(2);
        matches[1].team_b = Some(TeamId(1));

        let options = seed_options(&matches, &teams, &[TeamId(2)], MatchId(1), Slot::A);
        assert_eq!(options[0].disabled_reason.as_deref(), Some("seed 3 already used by Team 1"));
    }

    #[test]
    fn test_auto_seed_pairs_from_seed_metadata() {
        let teams: HashMap<_, _> = [
            team(10, Some(2)),
            team(11, None),
            team(12, Some(1)),
            team(13, Some(3)),
        ]
        .into();
        let matches = round_one(2);
        let eligible = [TeamId(10), TeamId(11), TeamId(12), TeamId(13)];

        let intent = auto_seed_and_pair(&matches, &teams, &eligible, None);
        // Ranking: 12, 10, 13, 11 -> (12 v 11), (10 v 13).
        assert_eq!(
            intent,
            EditIntent::BulkAssignFirstRound {
                rows: vec![
                    FirstRoundAssignment {
                        match_id: MatchId(1),
                        team_a: Some(TeamId(12)),
                        team_b: Some(TeamId(11)),
                    },
                    FirstRoundAssignment {
                        match_id: MatchId(2),
                        team_a: Some(TeamId(10)),
                        team_b: Some(TeamId(13)),
                    },
                ]
            }
        );
    }

    #[test]
    fn test_auto_seed_uses_callback_and_leaves_byes() {
        let teams = HashMap::new();
        let matches = round_one(2);
        let eligible = [TeamId(1), TeamId(2), TeamId(3)];
        let reverse = |ids: &[TeamId]| -> Option<Vec<TeamId>> { Some(ids.iter().rev().copied().collect()) };

        let intent = auto_seed_and_pair(&matches, &teams, &eligible, Some(&reverse));
        let EditIntent::BulkAssignFirstRound { rows } = intent else {
            panic!("expected bulk assignment");
        };
        assert_eq!(rows[0].team_a, Some(TeamId(3)));
        assert_eq!(rows[0].team_b, None, "rank 4 does not exist: bye");
        assert_eq!(rows[1].team_a, Some(TeamId(2)));
        assert_eq!(rows[1].team_b, Some(TeamId(1)));
    }

    #[test]
    fn test_declining_callback_falls_back_to_seeds() {
        let teams: HashMap<_, _> = [team(1, Some(2)), team(2, Some(1))].into();
        let matches = round_one(1);
        let decline = |_: &[TeamId]| -> Option<Vec<TeamId>> { None };

        let intent = auto_seed_and_pair(&matches, &teams, &[TeamId(1), TeamId(2)], Some(&decline));
        let EditIntent::BulkAssignFirstRound { rows } = intent else {
            panic!("expected bulk assignment");
        };
        assert_eq!((rows[0].team_a, rows[0].team_b), (Some(TeamId(2)), Some(TeamId(1))));
    }

    #[test]
    fn test_callback_ranking_limited_to_eligible() {
        let teams: HashMap<_, _> = [team(1, Some(1)), team(2, Some(2)), team(3, Some(3)), team(4, Some(4))].into();
        let matches = round_one(2);
        let eligible = [TeamId(1), TeamId(2), TeamId(3), TeamId(4)];
        let stray = |_: &[TeamId]| -> Option<Vec<TeamId>> { Some(vec![TeamId(99), TeamId(2), TeamId(2)]) };

        let intent = auto_seed_and_pair(&matches, &teams, &eligible, Some(&stray));
        let EditIntent::BulkAssignFirstRound { rows } = intent else {
            panic!("expected bulk assignment");
        };
        // Ranking: 2, then 1, 3, 4 by seed -> (2 v 4), (1 v 3).
        assert_eq!((rows[0].team_a, rows[0].team_b), (Some(TeamId(2)), Some(TeamId(4))));
        assert_eq!((rows[1].team_a, rows[1].team_b), (Some(TeamId(1)), Some(TeamId(3))));
    }

    #[test]
    fn test_callback_omissions_still_placed() {
        let teams: HashMap<_, _> = [team(1, Some(2)), team(2, Some(1)), team(3, None)].into();
        let matches = round_one(2);
        let eligible = [TeamId(1), TeamId(2), TeamId(3)];
        let partial = |_: &[TeamId]| -> Option<Vec<TeamId>> { Some(vec![TeamId(3)]) };

        let intent = auto_seed_and_pair(&matches, &teams, &eligible, Some(&partial));
        let EditIntent::BulkAssignFirstRound { rows } = intent else {
            panic!("expected bulk assignment");
        };
        let placed: Vec<TeamId> = rows.iter().flat_map(|r| [r.team_a, r.team_b]).flatten().collect();
        assert_eq!(placed.len(), 3, "every eligible team is placed once");
        // Ranking: 3, 2, 1 -> (3 v bye), (2 v 1).
        assert_eq!((rows[0].team_a, rows[0].team_b), (Some(TeamId(3)), None));
        assert_eq!((rows[1].team_a, rows[1].team_b), (Some(TeamId(2)), Some(TeamId(1))));
    }

    #[test]
    fn test_intents_check_match_exists() {
        let matches = round_one(1);
        assert!(swap_pair(&matches, MatchId(1)).is_ok());
        assert!(matches!(
            assign_team(&matches, MatchId(99), Slot::A, None),
            Err(BracketError::UnknownMatch(MatchId(99)))
        ));
        assert_eq!(clear_first_round(), EditIntent::ClearFirstRound);
    }
}
