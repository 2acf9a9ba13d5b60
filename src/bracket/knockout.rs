//! Single-elimination bracket construction.
//!
//! # Algorithm
//!
//! 1. Rank the entrants (seed ascending, unseeded last, ties by input order).
//! 2. Pad to the next power of two `N'` and place rank `r` into the slot that
//!    [`seed_order`] assigns seed `r`. Ranks beyond the entrant count are byes,
//!    which by construction of the seeding fall opposite the best seeds.
//! 3. Emit a round-1 match for every slot pair `(2p-1, 2p)`, byes included, so
//!    later rounds always have something to point at.
//! 4. Emit every later round by halving, leaving teams empty and writing
//!    winner pointers to `(round-1, 2p-1)` and `(round-1, 2p)`.

use serde::{Deserialize, Serialize};

use super::seeding::{bracket_size_for, round_count, seed_order};
use crate::model::{Match, MatchId, Slot, SourcePointer, TeamId};

/// An entrant to place into a bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrant {
    pub id: TeamId,
    #[serde(default)]
    pub seed: Option<u32>,
}

impl Entrant {
    pub fn seeded(id: TeamId, seed: u32) -> Self {
        Self { id, seed: Some(seed) }
    }

    pub fn unseeded(id: TeamId) -> Self {
        Self { id, seed: None }
    }
}

/// Options for bracket generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KnockoutOptions {
    /// Stage the generated matches belong to.
    pub stage_index: u32,
    /// First provisional id handed out; ids increase round by round.
    pub first_match_id: i32,
    /// Also write each bye entrant straight into the round-2 slot it feeds.
    pub auto_advance_byes: bool,
}

impl Default for KnockoutOptions {
    fn default() -> Self {
        Self {
            stage_index: 0,
            first_match_id: 1,
            auto_advance_byes: false,
        }
    }
}

/// How the two semifinals are paired when exactly two groups send two teams each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupPairing {
    /// A1 vs B2, B1 vs A2.
    #[default]
    Crossed,
    /// A1 vs B1, A2 vs B2.
    Straight,
}

/// Result of bracket generation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnockoutBracket {
    /// All matches, round-major then by bracket position.
    pub matches: Vec<Match>,
    /// Padded slot count (a power of two, or 0).
    pub bracket_size: usize,
    /// Number of rounds.
    pub rounds: u32,
}

impl KnockoutBracket {
    /// Matches of one round, in bracket order.
    pub fn round(&self, round: u32) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.round == Some(round))
    }

    /// Round-1 matches with exactly one entrant.
    pub fn bye_count(&self) -> usize {
        self.round(1).filter(|m| m.bye_winner().is_some()).count()
    }

    /// Matches that actually have to be played (`entrants - 1`).
    pub fn decisive_match_count(&self) -> usize {
        self.matches.len() - self.bye_count()
    }
}

/// Builds single-elimination brackets.
pub struct KnockoutBuilder {
    options: KnockoutOptions,
}

impl KnockoutBuilder {
    pub fn new(options: KnockoutOptions) -> Self {
        Self { options }
    }

    pub fn with_defaults() -> Self {
        Self::new(KnockoutOptions::default())
    }

    /// Build a seeded bracket for any number of entrants.
    ///
    /// Fewer than two entrants produce an empty bracket.
    pub fn build(&self, entrants: &[Entrant]) -> KnockoutBracket {
        if entrants.len() < 2 {
            return KnockoutBracket::default();
        }

        let ranked = rank_entrants(entrants);
        let size = bracket_size_for(ranked.len());
        let Ok(order) = seed_order(size) else {
            return KnockoutBracket::default();
        };

        let slots: Vec<Option<TeamId>> = order
            .iter()
            .map(|&seed| ranked.get(seed as usize - 1).copied())
            .collect();

        let bracket = self.wire(&slots);
        tracing::debug!(
            entrants = ranked.len(),
            bracket_size = bracket.bracket_size,
            byes = bracket.bye_count(),
            "built knockout bracket"
        );
        bracket
    }

    /// Build the knockout stage that follows a group stage.
    ///
    /// `groups[g]` lists group `g`'s teams in final standing order. With
    /// exactly two groups advancing two teams each, the semifinals are paired
    /// across groups according to `pairing`. Any other shape is seeded
    /// group-rank-major (A1, B1, ..., A2, B2, ...) through [`Self::build`].
    pub fn build_from_groups(
        &self,
        groups: &[Vec<TeamId>],
        advancing: usize,
        pairing: GroupPairing,
    ) -> KnockoutBracket {
        if groups.len() == 2 && advancing == 2 && groups.iter().all(|g| g.len() >= 2) {
            let (a, b) = (&groups[0], &groups[1]);
            let slots = match pairing {
                GroupPairing::Crossed => [a[0], b[1], b[0], a[1]],
                GroupPairing::Straight => [a[0], b[0], a[1], b[1]],
            };
            let slots: Vec<Option<TeamId>> = slots.into_iter().map(Some).collect();
            return self.wire(&slots);
        }

        let mut entrants = Vec::new();
        for rank in 0..advancing {
            for group in groups {
                if let Some(&team) = group.get(rank) {
                    entrants.push(Entrant::seeded(team, entrants.len() as u32 + 1));
                }
            }
        }
        self.build(&entrants)
    }

    /// Turn a filled round-1 slot list into a wired bracket.
    fn wire(&self, slots: &[Option<TeamId>]) -> KnockoutBracket {
        let size = slots.len();
        let rounds = round_count(size);
        let stage = self.options.stage_index;
        let mut next_id = self.options.first_match_id;
        let mut matches = Vec::with_capacity(size.saturating_sub(1));

        for (i, pair) in slots.chunks(2).enumerate() {
            let mut m = Match::new(MatchId(next_id), stage, 1, i as u32 + 1);
            next_id += 1;
            m.team_a = pair[0];
            m.team_b = pair.get(1).copied().flatten();
            matches.push(m);
        }

        let mut in_round = size / 2;
        for round in 2..=rounds {
            in_round /= 2;
            for pos in 1..=in_round as u32 {
                let mut m = Match::new(MatchId(next_id), stage, round, pos);
                next_id += 1;
                m.source_a = Some(SourcePointer::winner_of(round - 1, 2 * pos - 1));
                m.source_b = Some(SourcePointer::winner_of(round - 1, 2 * pos));
                matches.push(m);
            }
        }

        if self.options.auto_advance_byes && rounds >= 2 {
            advance_byes(&mut matches);
        }

        KnockoutBracket {
            matches,
            bracket_size: size,
            rounds,
        }
    }
}

/// Rank entrants: seed ascending, unseeded after all seeded, input order on ties.
fn rank_entrants(entrants: &[Entrant]) -> Vec<TeamId> {
    let mut indexed: Vec<(usize, &Entrant)> = entrants.iter().enumerate().collect();
    indexed.sort_by_key(|&(index, e)| (e.seed.is_none(), e.seed, index));
    indexed.into_iter().map(|(_, e)| e.id).collect()
}

/// Copy each round-1 bye winner into the round-2 slot its match feeds.
fn advance_byes(matches: &mut [Match]) {
    let byes: Vec<(u32, TeamId)> = matches
        .iter()
        .filter_map(|m| Some((m.bracket_position?, m.bye_winner()?)))
        .collect();

    for (pos, team) in byes {
        let child_pos = pos.div_ceil(2);
        let slot = if pos % 2 == 1 { Slot::A } else { Slot::B };
        if let Some(child) = matches
            .iter_mut()
            .find(|m| m.round == Some(2) && m.bracket_position == Some(child_pos))
        {
            child.set_team(slot, Some(team));
        }
    }
}
