//! Match records and the small value types around them.
//!
//! These mirror the objects the editing layer stores. Field names are
//! camelCase on the wire so plain JS objects deserialize directly.

use serde::{Deserialize, Serialize};

use super::ids::{MatchId, TeamId};

/// One of the two team slots of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    /// The other slot of the same match.
    #[inline]
    pub fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

/// Which result of a parent match feeds a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    #[default]
    Win,
    Lose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Finished,
}

/// Stable reference to the match feeding a slot.
///
/// Names a `(round, bracket_position)` coordinate rather than an array index,
/// so it survives reordering of the match list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePointer {
    #[serde(rename = "sourceRound")]
    pub round: u32,
    #[serde(rename = "sourceBracketPosition")]
    pub bracket_position: u32,
    #[serde(rename = "sourceOutcome", default)]
    pub outcome: Outcome,
}

impl SourcePointer {
    pub fn winner_of(round: u32, bracket_position: u32) -> Self {
        Self {
            round,
            bracket_position,
            outcome: Outcome::Win,
        }
    }

    pub fn loser_of(round: u32, bracket_position: u32) -> Self {
        Self {
            round,
            bracket_position,
            outcome: Outcome::Lose,
        }
    }
}

/// A stored match.
///
/// `round` and `bracket_position` are optional: rows without them (for
/// instance round-robin fixtures) are not part of any bracket and are ignored
/// by the knockout components.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Match {
    pub id: MatchId,
    pub stage_index: u32,
    pub group_index: Option<u32>,
    /// 1-based; 1 is the first bracket round.
    pub round: Option<u32>,
    /// 1-based, unique within a round.
    pub bracket_position: Option<u32>,
    #[serde(rename = "teamASlot")]
    pub team_a: Option<TeamId>,
    #[serde(rename = "teamBSlot")]
    pub team_b: Option<TeamId>,
    pub status: MatchStatus,
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
    pub source_a: Option<SourcePointer>,
    pub source_b: Option<SourcePointer>,
    /// Legacy explicit link to the match feeding slot A.
    pub link_a: Option<MatchId>,
    /// Legacy explicit link to the match feeding slot B.
    pub link_b: Option<MatchId>,
}

impl Match {
    /// Create a scheduled bracket match with no teams.
    pub fn new(id: MatchId, stage_index: u32, round: u32, bracket_position: u32) -> Self {
        Self {
            id,
            stage_index,
            round: Some(round),
            bracket_position: Some(bracket_position),
            ..Default::default()
        }
    }

    /// The `(round, bracket_position)` coordinate, if the match is part of a bracket.
    #[inline]
    pub fn coordinate(&self) -> Option<(u32, u32)> {
        match (self.round, self.bracket_position) {
            (Some(round), Some(pos)) if round > 0 && pos > 0 => Some((round, pos)),
            _ => None,
        }
    }

    /// Topology-default parent coordinates, `(r-1, 2p-1)` and `(r-1, 2p)`.
    ///
    /// `None` for round 1, for matches outside the bracket, and for
    /// positions too large to have addressable parents.
    pub fn parent_coordinates(&self) -> Option<[(u32, u32); 2]> {
        let (round, pos) = self.coordinate()?;
        if round < 2 {
            return None;
        }
        let right = pos.checked_mul(2)?;
        Some([(round - 1, right - 1), (round - 1, right)])
    }

    pub fn team(&self, slot: Slot) -> Option<TeamId> {
        match slot {
            Slot::A => self.team_a,
            Slot::B => self.team_b,
        }
    }

    pub fn set_team(&mut self, slot: Slot, team: Option<TeamId>) {
        match slot {
            Slot::A => self.team_a = team,
            Slot::B => self.team_b = team,
        }
    }

    pub fn source(&self, slot: Slot) -> Option<SourcePointer> {
        match slot {
            Slot::A => self.source_a,
            Slot::B => self.source_b,
        }
    }

    pub fn set_source(&mut self, slot: Slot, pointer: Option<SourcePointer>) {
        match slot {
            Slot::A => self.source_a = pointer,
            Slot::B => self.source_b = pointer,
        }
    }

    pub fn link(&self, slot: Slot) -> Option<MatchId> {
        match slot {
            Slot::A => self.link_a,
            Slot::B => self.link_b,
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    /// The team advancing without play, if this is a round-1 bye match.
    pub fn bye_winner(&self) -> Option<TeamId> {
        if self.round != Some(1) {
            return None;
        }
        match (self.team_a, self.team_b) {
            (Some(team), None) | (None, Some(team)) => Some(team),
            _ => None,
        }
    }
}

/// Lightweight team metadata supplied by the editing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLite {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub seed: Option<u32>,
    #[serde(default)]
    pub logo: Option<String>,
}

/// One fixture of a round-robin schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRobinRow {
    pub stage_index: u32,
    pub group_index: Option<u32>,
    /// 1-based and dense within one pass.
    pub matchday: u32,
    pub team_a: TeamId,
    pub team_b: TeamId,
}

/// Derived parent → child relationship between two matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(rename = "fromMatch")]
    pub from: MatchId,
    #[serde(rename = "toMatch")]
    pub to: MatchId,
    /// Slot of `to` that `from` feeds.
    pub slot: Slot,
    pub outcome: Outcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_requires_both_fields() {
        let mut m = Match::new(MatchId(1), 0, 2, 1);
        assert_eq!(m.coordinate(), Some((2, 1)));

        m.bracket_position = None;
        assert_eq!(m.coordinate(), None);

        m.bracket_position = Some(0);
        assert_eq!(m.coordinate(), None, "position 0 is not a valid coordinate");
    }

    #[test]
    fn test_parent_coordinates() {
        assert_eq!(
            Match::new(MatchId(1), 0, 3, 2).parent_coordinates(),
            Some([(2, 3), (2, 4)])
        );
        assert_eq!(Match::new(MatchId(1), 0, 1, 2).parent_coordinates(), None);
        assert_eq!(
            Match::new(MatchId(1), 0, 2, u32::MAX).parent_coordinates(),
            None,
            "position too large to address its parents"
        );
    }

    #[test]
    fn test_bye_winner() {
        let mut m = Match::new(MatchId(1), 0, 1, 1);
        m.team_a = Some(TeamId(7));
        assert_eq!(m.bye_winner(), Some(TeamId(7)));

        m.team_b = Some(TeamId(8));
        assert_eq!(m.bye_winner(), None);

        let mut later = Match::new(MatchId(2), 0, 2, 1);
        later.team_b = Some(TeamId(3));
        assert_eq!(later.bye_winner(), None, "only round 1 has byes");
    }

    #[test]
    fn test_slot_accessors() {
        let mut m = Match::new(MatchId(1), 0, 2, 1);
        m.set_team(Slot::B, Some(TeamId(4)));
        m.set_source(Slot::A, Some(SourcePointer::loser_of(1, 2)));

        assert_eq!(m.team(Slot::B), Some(TeamId(4)));
        assert_eq!(m.team(Slot::A), None);
        assert_eq!(m.source(Slot::A).map(|p| p.outcome), Some(Outcome::Lose));
        assert_eq!(Slot::A.other(), Slot::B);
    }
}
