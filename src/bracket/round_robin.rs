//! Round-robin schedule generation using the circle method.
//!
//! Position 0 stays fixed while the remaining entrants rotate one step per
//! matchday, so every entrant meets every other exactly once per pass. An odd
//! entrant count is padded with a bye sentinel; pairings against the sentinel
//! are dropped, giving each real entrant exactly one idle matchday per pass.

use std::num::NonZeroU32;

use crate::model::{RoundRobinRow, TeamId};

/// Round-robin scheduler for one group.
#[derive(Debug, Clone)]
pub struct RoundRobinScheduler {
    stage_index: u32,
    group_index: Option<u32>,
    repeats: NonZeroU32,
}

impl RoundRobinScheduler {
    pub fn new(stage_index: u32, repeats: NonZeroU32) -> Self {
        Self {
            stage_index,
            group_index: None,
            repeats,
        }
    }

    /// Tag generated rows with a group.
    pub fn in_group(mut self, group_index: u32) -> Self {
        self.group_index = Some(group_index);
        self
    }

    /// Generate the full schedule for `entrants`.
    ///
    /// Later passes repeat the base matchdays at an offset of one pass length,
    /// swapping home and away on every other pass.
    pub fn schedule(&self, entrants: &[TeamId]) -> Vec<RoundRobinRow> {
        if entrants.len() < 2 {
            return Vec::new();
        }

        let mut ring: Vec<Option<TeamId>> = entrants.iter().copied().map(Some).collect();
        if ring.len() % 2 == 1 {
            ring.push(None);
        }
        let m = ring.len();
        let rounds = (m - 1) as u32;
        let half = m / 2;

        let mut base = Vec::with_capacity(rounds as usize * half);
        for t in 0..rounds {
            for i in 0..half {
                if let (Some(team_a), Some(team_b)) = (ring[i], ring[m - 1 - i]) {
                    base.push(self.row(t + 1, team_a, team_b));
                }
            }
            // Move the last entrant to position 1; position 0 stays put.
            ring[1..].rotate_right(1);
        }

        let mut rows = base.clone();
        for k in 1..self.repeats.get() {
            let swap = k % 2 == 1;
            rows.extend(base.iter().map(|row| {
                let (team_a, team_b) = if swap {
                    (row.team_b, row.team_a)
                } else {
                    (row.team_a, row.team_b)
                };
                self.row(row.matchday + k * rounds, team_a, team_b)
            }));
        }

        tracing::debug!(
            entrants = entrants.len(),
            matchdays = rounds * self.repeats.get(),
            fixtures = rows.len(),
            "generated round robin"
        );
        rows
    }

    fn row(&self, matchday: u32, team_a: TeamId, team_b: TeamId) -> RoundRobinRow {
        RoundRobinRow {
            stage_index: self.stage_index,
            group_index: self.group_index,
            matchday,
            team_a,
            team_b,
        }
    }
}

/// Schedule every group of a stage, tagging rows with their group index.
pub fn schedule_groups(
    stage_index: u32,
    groups: &[Vec<TeamId>],
    repeats: NonZeroU32,
) -> Vec<RoundRobinRow> {
    groups
        .iter()
        .enumerate()
        .flat_map(|(g, teams)| {
            RoundRobinScheduler::new(stage_index, repeats)
                .in_group(g as u32)
                .schedule(teams)
        })
        .collect()
}
