//! Constraint-based vertical layout for knockout brackets.
//!
//! Every column (round) is laid out top to bottom in bracket-position order.
//! A match wants to sit at the vertical mean of the parents that feed it, so
//! the tree reads as a set of converging lines. Wanting is not enough, since
//! cards have real heights and must not overlap, so each round gets a
//! downward correction scan and an upward one, and the two are averaged.
//!
//! # Algorithm Overview
//!
//! 1. **Stub injection:** missing topology-default parents get placeholders
//!    so every visible match keeps its anchors.
//! 2. **Raw targets:** rounds are walked first to last. A match's raw target is
//!    the mean of its resolved, non-stub parents' final targets, or its own
//!    measured center when it has none.
//! 3. **Spacing:** within the round, a first-to-last scan pushes matches down
//!    until `target[i] >= target[i-1] + (h[i-1] + h[i]) / 2 + min_gap`, and a
//!    last-to-first scan from the same raw targets pulls them up by the same
//!    rule. Each card lands midway between its two corrected positions, so a
//!    crowded group spreads around its wanted center instead of only below it.
//!    Both scans satisfy every gap, hence so does their mean.
//! 4. **Offsets:** `target - measured center`. Stubs have no measured position;
//!    they follow their child and report their target as the offset.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::stubs::{inject_stubs, Stub, StubArena};
use crate::graph::{BracketGraph, DependencyResolver};
use crate::model::{Edge, Match, MatchId, Outcome};

/// Displacement below which a card does not count as moved.
const SPACING_TOLERANCE: f32 = 1e-3;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for bracket layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Minimum vertical gap between sibling cards (default: 16.0).
    pub min_gap: f32,
    /// Insert placeholders for missing parents (default: true).
    pub inject_stubs: bool,
    /// Horizontal share of a connector span taken by each control point (default: 0.35).
    pub curve_fraction: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_gap: 16.0,
            inject_stubs: true,
            curve_fraction: 0.35,
        }
    }
}

/// A rendered card as measured at its provisional position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasuredBox {
    pub x: f32,
    /// Top edge.
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl MeasuredBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

// =============================================================================
// Result
// =============================================================================

/// Final placement of one card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedMatch {
    pub id: MatchId,
    pub round: u32,
    pub bracket_position: u32,
    pub is_stub: bool,
    pub x: f32,
    pub width: f32,
    pub height: f32,
    /// Final vertical center.
    pub center_y: f32,
    /// Shift to apply to the card's provisional position.
    pub offset_y: f32,
}

impl PlacedMatch {
    #[inline]
    pub fn top(&self) -> f32 {
        self.center_y - self.height / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center_y + self.height / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Output of one layout pass.
pub struct BracketLayout {
    placements: Vec<PlacedMatch>,
    index: HashMap<MatchId, usize>,
    stubs: Vec<Stub>,
    graph: BracketGraph,
}

impl BracketLayout {
    /// Placements in round-major, position-minor order, stubs included.
    pub fn placements(&self) -> &[PlacedMatch] {
        &self.placements
    }

    pub fn get(&self, id: MatchId) -> Option<&PlacedMatch> {
        self.index.get(&id).map(|&i| &self.placements[i])
    }

    /// Placements of one round sorted by bracket position.
    pub fn round(&self, round: u32) -> Vec<&PlacedMatch> {
        self.placements.iter().filter(|p| p.round == round).collect()
    }

    /// Offsets of stored matches only, in placement order.
    pub fn real_offsets(&self) -> Vec<(MatchId, f32)> {
        self.placements
            .iter()
            .filter(|p| !p.is_stub)
            .map(|p| (p.id, p.offset_y))
            .collect()
    }

    pub fn stubs(&self) -> &[Stub] {
        &self.stubs
    }

    /// Dependency graph over the laid-out cards, stub edges included.
    pub fn graph(&self) -> &BracketGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Card being spaced within one round.
struct Card {
    id: MatchId,
    height: f32,
    target: f32,
}

pub struct BracketLayoutEngine {
    config: LayoutConfig,
}

impl BracketLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Lay out every match with a bracket coordinate.
    ///
    /// Matches missing from `measurements` are treated as zero-sized boxes at
    /// the origin.
    pub fn compute(&self, matches: &[Match], measurements: &HashMap<MatchId, MeasuredBox>) -> BracketLayout {
        let mut rounds: BTreeMap<u32, Vec<&Match>> = BTreeMap::new();
        for m in matches {
            if let Some((round, _)) = m.coordinate() {
                rounds.entry(round).or_default().push(m);
            }
        }
        for list in rounds.values_mut() {
            list.sort_by_key(|m| (m.bracket_position, m.id));
        }

        let resolver = DependencyResolver::new(matches);
        let parents = resolver.resolve_all();

        let mut arena = StubArena::below_all(matches.iter().map(|m| m.id));
        let stubs = if self.config.inject_stubs {
            inject_stubs(&rounds, &mut arena)
        } else {
            Vec::new()
        };

        let measured = |id: MatchId| measurements.get(&id).copied().unwrap_or_default();
        let unmeasured = rounds
            .values()
            .flatten()
            .filter(|m| !measurements.contains_key(&m.id))
            .count();
        if unmeasured > 0 {
            tracing::debug!(unmeasured, "laying out matches without a measurement");
        }

        // Raw targets and spacing, one round at a time.
        let mut targets: HashMap<MatchId, f32> = HashMap::new();
        let mut corrected_rounds = 0usize;
        for (&round, list) in &rounds {
            let mut cards: Vec<Card> = list
                .iter()
                .map(|m| {
                    let size = measured(m.id);
                    let parent_targets: Vec<f32> = parents
                        .get(&m.id)
                        .map(|p| {
                            p.parent_ids()
                                .filter_map(|id| targets.get(&id).copied())
                                .collect()
                        })
                        .unwrap_or_default();

                    let target = if parent_targets.is_empty() {
                        size.center_y()
                    } else {
                        parent_targets.iter().sum::<f32>() / parent_targets.len() as f32
                    };

                    Card {
                        id: m.id,
                        height: size.height,
                        target,
                    }
                })
                .collect();

            let moved = self.space_round(&mut cards);
            if moved > 0 {
                corrected_rounds += 1;
                tracing::trace!(round, moved, "spacing corrections applied");
            }

            targets.extend(cards.iter().map(|c| (c.id, c.target)));
        }

        // Placements.
        let mut column_x: HashMap<u32, f32> = HashMap::new();
        let mut placements = Vec::with_capacity(targets.len() + stubs.len());
        for (&round, list) in &rounds {
            for m in list {
                let size = measured(m.id);
                let center_y = targets.get(&m.id).copied().unwrap_or_else(|| size.center_y());
                column_x.entry(round).or_insert(size.x);
                placements.push(PlacedMatch {
                    id: m.id,
                    round,
                    bracket_position: m.bracket_position.unwrap_or_default(),
                    is_stub: false,
                    x: size.x,
                    width: size.width,
                    height: size.height,
                    center_y,
                    offset_y: center_y - size.center_y(),
                });
            }
        }

        for stub in &stubs {
            let center_y = targets.get(&stub.child).copied().unwrap_or_default();
            let x = column_x
                .get(&stub.round)
                .copied()
                .unwrap_or_else(|| measured(stub.child).x);
            placements.push(PlacedMatch {
                id: stub.id,
                round: stub.round,
                bracket_position: stub.bracket_position,
                is_stub: true,
                x,
                width: 0.0,
                height: 0.0,
                center_y,
                offset_y: center_y,
            });
        }
        placements.sort_by_key(|p| (p.round, p.bracket_position));

        let index = placements.iter().enumerate().map(|(i, p)| (p.id, i)).collect();

        let mut edges = resolver.edges();
        edges.extend(stubs.iter().map(|s| Edge {
            from: s.id,
            to: s.child,
            slot: s.slot,
            outcome: Outcome::Win,
        }));
        let real_ids: Vec<MatchId> = placements.iter().filter(|p| !p.is_stub).map(|p| p.id).collect();
        let stub_ids: Vec<MatchId> = stubs.iter().map(|s| s.id).collect();
        let graph = BracketGraph::from_parts(&real_ids, &stub_ids, &edges);

        tracing::debug!(
            matches = real_ids.len(),
            stubs = stubs.len(),
            edges = graph.edge_count(),
            rounds = rounds.len(),
            corrected_rounds,
            "computed bracket layout"
        );

        BracketLayout {
            placements,
            index,
            stubs,
            graph,
        }
    }

    /// Enforce non-overlap within one round. Returns how many cards moved.
    fn space_round(&self, cards: &mut [Card]) -> usize {
        let gap = self.config.min_gap;
        let need = |upper: &Card, lower: &Card| (upper.height + lower.height) / 2.0 + gap;

        // Downward: push each card below its upper neighbour.
        let mut down: Vec<f32> = cards.iter().map(|c| c.target).collect();
        for i in 1..cards.len() {
            down[i] = down[i].max(down[i - 1] + need(&cards[i - 1], &cards[i]));
        }

        // Upward: pull each card above its lower neighbour.
        let mut up: Vec<f32> = cards.iter().map(|c| c.target).collect();
        for i in (1..cards.len()).rev() {
            up[i - 1] = up[i - 1].min(up[i] - need(&cards[i - 1], &cards[i]));
        }

        let mut moved = 0;
        for (card, (d, u)) in cards.iter_mut().zip(down.into_iter().zip(up)) {
            let target = (d + u) / 2.0;
            if (target - card.target).abs() > SPACING_TOLERANCE {
                moved += 1;
            }
            card.target = target;
        }
        moved
    }
}

impl Default for BracketLayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}
