//! Bracket Core - WASM Module
//!
//! Tournament bracket generation, dependency resolution and bracket layout,
//! compiled to WebAssembly and exposed to JavaScript via wasm-bindgen.
//!
//! # Architecture
//!
//! - `model`: Match, team and schedule records shared with the editing layer
//! - `bracket`: Seeding, knockout and round-robin generation, editing intents
//! - `graph`: Parent resolution and the petgraph-backed bracket graph
//! - `layout`: Stub injection, vertical spacing and connector curves
//! - `overlay`: Display-only implied winners
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing

use std::collections::HashMap;
use std::num::NonZeroU32;

use js_sys::Function;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use web_sys::console;

pub mod bracket;
pub mod error;
pub mod graph;
pub mod layout;
pub mod model;
pub mod overlay;
pub mod spatial;

use bracket::{
    auto_seed_and_pair, schedule_groups, seed_options, Entrant, GroupPairing, KnockoutBuilder,
    KnockoutOptions,
};
use error::BracketError;
use graph::{BracketGraph, DependencyResolver};
use layout::{BracketLayout, BracketLayoutEngine, ConnectorPathBuilder, LayoutConfig, MeasuredBox, PlacedMatch};
use model::{Edge, Match, MatchId, Slot, TeamId, TeamLite};
use overlay::{compute_winner, WinnerPropagator};
use spatial::SpatialIndex;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

// =============================================================================
// Boundary helpers
// =============================================================================

/// Serialize for JS with plain objects for maps and `null` for `None`.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, BracketError> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

/// Decode a JS value, reporting failures to the browser console.
fn from_js<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, BracketError> {
    serde_wasm_bindgen::from_value(value).map_err(|err| {
        console::warn_1(&format!("bracket-core: could not decode {what}: {err}").into());
        BracketError::from(err)
    })
}

/// Like [`from_js`], but `undefined` and `null` give the default.
fn from_js_or_default<T: DeserializeOwned + Default>(value: JsValue, what: &str) -> Result<T, BracketError> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    from_js(value, what)
}

/// One measured card as sent by the presentation layer.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeasurementEntry {
    match_id: MatchId,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectorView {
    from: MatchId,
    to: MatchId,
    slot: Slot,
    /// SVG path data.
    d: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OffsetView {
    match_id: MatchId,
    offset_y: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutView<'a> {
    placements: &'a [PlacedMatch],
    offsets: Vec<OffsetView>,
    /// Parent → child edges between stored matches.
    edges: Vec<Edge>,
    connectors: Vec<ConnectorView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImpliedView {
    match_id: MatchId,
    team_a: Option<TeamId>,
    team_b: Option<TeamId>,
}

// =============================================================================
// Engine
// =============================================================================

/// Main entry point for one bracket view.
///
/// Holds the match list, team metadata and measurement cache handed over by
/// the editing layer. Every recomputation reads those inputs afresh; the last
/// layout is kept only for hit testing.
#[wasm_bindgen]
pub struct BracketEngine {
    matches: Vec<Match>,
    teams: HashMap<TeamId, TeamLite>,
    measurements: HashMap<MatchId, MeasuredBox>,
    config: LayoutConfig,
    layout: Option<BracketLayout>,
    spatial: SpatialIndex,
}

impl BracketEngine {
    /// Replace the match list. Invalidates the current layout.
    pub fn load_matches(&mut self, matches: Vec<Match>) {
        self.matches = matches;
        self.invalidate();
    }

    pub fn load_teams(&mut self, teams: Vec<TeamLite>) {
        self.teams = teams.into_iter().map(|t| (t.id, t)).collect();
    }

    /// Replace the measurement cache. Invalidates the current layout.
    pub fn load_measurements(&mut self, measurements: HashMap<MatchId, MeasuredBox>) {
        self.measurements = measurements;
        self.invalidate();
    }

    pub fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
        self.invalidate();
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn layout(&self) -> Option<&BracketLayout> {
        self.layout.as_ref()
    }

    /// Lay out the current matches and refresh the hit-testing index.
    pub fn relayout(&mut self) -> &BracketLayout {
        let layout = BracketLayoutEngine::new(self.config).compute(&self.matches, &self.measurements);
        self.spatial.rebuild(&layout);
        self.layout.insert(layout)
    }

    /// The stored match under a point of the last layout.
    pub fn match_at(&self, x: f32, y: f32) -> Option<MatchId> {
        self.spatial.match_at(x, y)
    }

    /// Matches fed by `id`, from the last layout or resolved afresh.
    pub fn children_of(&self, id: MatchId) -> Result<Vec<MatchId>, BracketError> {
        self.find(id)?;
        let mut children = match &self.layout {
            Some(layout) => layout.graph().children(id),
            None => {
                let ids: Vec<MatchId> = self.matches.iter().map(|m| m.id).collect();
                let edges = DependencyResolver::new(&self.matches).edges();
                BracketGraph::from_parts(&ids, &[], &edges).children(id)
            }
        };
        children.sort();
        Ok(children)
    }

    fn find(&self, id: MatchId) -> Result<&Match, BracketError> {
        self.matches
            .iter()
            .find(|m| m.id == id)
            .ok_or(BracketError::UnknownMatch(id))
    }

    fn invalidate(&mut self) {
        self.layout = None;
        self.spatial.clear();
    }
}

#[wasm_bindgen]
impl BracketEngine {
    /// Create an engine with no matches and the default layout config.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            matches: Vec::new(),
            teams: HashMap::new(),
            measurements: HashMap::new(),
            config: LayoutConfig::default(),
            layout: None,
            spatial: SpatialIndex::new(),
        }
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// Replace the match list with an array of match objects.
    #[wasm_bindgen(js_name = setMatches)]
    pub fn set_matches(&mut self, matches: JsValue) -> Result<(), JsValue> {
        let matches: Vec<Match> = from_js(matches, "matches")?;
        self.load_matches(matches);
        Ok(())
    }

    /// Replace team metadata with an array of `{ id, name, seed?, logo? }`.
    #[wasm_bindgen(js_name = setTeams)]
    pub fn set_teams(&mut self, teams: JsValue) -> Result<(), JsValue> {
        let teams: Vec<TeamLite> = from_js(teams, "teams")?;
        self.load_teams(teams);
        Ok(())
    }

    /// Replace the measurement cache with an array of
    /// `{ matchId, x, y, width, height }`.
    #[wasm_bindgen(js_name = setMeasurements)]
    pub fn set_measurements(&mut self, measurements: JsValue) -> Result<(), JsValue> {
        let entries: Vec<MeasurementEntry> = from_js(measurements, "measurements")?;
        self.load_measurements(
            entries
                .into_iter()
                .map(|e| (e.match_id, MeasuredBox::new(e.x, e.y, e.width, e.height)))
                .collect(),
        );
        Ok(())
    }

    /// Set layout options. Missing fields keep their defaults.
    #[wasm_bindgen(js_name = setLayoutConfig)]
    pub fn set_layout_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: LayoutConfig = from_js_or_default(config, "layout config")?;
        self.set_config(config);
        Ok(())
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Compute offsets and connector paths.
    ///
    /// Returns `{ placements, offsets: [{ matchId, offsetY }], edges, connectors: [{ from, to, slot, d }] }`.
    /// Offsets and edges cover stored matches only.
    #[wasm_bindgen(js_name = computeLayout)]
    pub fn compute_layout(&mut self) -> Result<JsValue, JsValue> {
        let builder = ConnectorPathBuilder::from_config(&self.config);
        let layout = self.relayout();
        let connectors = builder
            .build(layout)
            .into_iter()
            .map(|path| ConnectorView {
                from: path.from,
                to: path.to,
                slot: path.slot,
                d: path.svg_path(),
            })
            .collect();

        Ok(to_js(&LayoutView {
            placements: layout.placements(),
            offsets: layout
                .real_offsets()
                .into_iter()
                .map(|(match_id, offset_y)| OffsetView { match_id, offset_y })
                .collect(),
            edges: layout.graph().real_edges(),
            connectors,
        })?)
    }

    /// Id of the match card under a point, from the last computed layout.
    #[wasm_bindgen(js_name = hitTest)]
    pub fn hit_test(&self, x: f32, y: f32) -> Option<i32> {
        self.match_at(x, y).map(MatchId::raw)
    }

    /// Ids of every match card intersecting a rectangle.
    #[wasm_bindgen(js_name = matchesInRect)]
    pub fn matches_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<i32> {
        self.spatial
            .matches_in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .map(MatchId::raw)
            .collect()
    }

    /// Id of the card closest to a point, if its edge lies within `max_distance`.
    #[wasm_bindgen(js_name = nearestMatch)]
    pub fn nearest_match(&self, x: f32, y: f32, max_distance: f32) -> Option<i32> {
        self.spatial.nearest_within(x, y, max_distance).map(MatchId::raw)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Ids of the matches a match feeds, ascending.
    #[wasm_bindgen(js_name = childrenOf)]
    pub fn children_of_js(&self, match_id: i32) -> Result<Vec<i32>, JsValue> {
        let children = self.children_of(MatchId(match_id))?;
        Ok(children.into_iter().map(MatchId::raw).collect())
    }

    /// Resolved parents of one match: `{ a, b }`, each `{ link: { via, matchId }, outcome }` or null.
    #[wasm_bindgen(js_name = resolveParents)]
    pub fn resolve_parents(&self, match_id: i32) -> Result<JsValue, JsValue> {
        let m = self.find(MatchId(match_id))?;
        let parents = DependencyResolver::new(&self.matches).resolve(m);
        Ok(to_js(&parents)?)
    }

    #[wasm_bindgen(js_name = computeWinner)]
    pub fn compute_winner(&self, match_id: i32) -> Result<Option<u32>, JsValue> {
        let m = self.find(MatchId(match_id))?;
        Ok(compute_winner(m).map(TeamId::raw))
    }

    /// Implied teams for empty slots: `[{ matchId, teamA, teamB }]`.
    #[wasm_bindgen(js_name = impliedTeams)]
    pub fn implied_teams(&self) -> Result<JsValue, JsValue> {
        let mut rows: Vec<ImpliedView> = WinnerPropagator::new()
            .propagate(&self.matches)
            .into_iter()
            .map(|(match_id, implied)| ImpliedView {
                match_id,
                team_a: implied.team_a,
                team_b: implied.team_b,
            })
            .collect();
        rows.sort_by_key(|r| r.match_id);
        Ok(to_js(&rows)?)
    }

    /// Team picker entries for one round-1 slot.
    #[wasm_bindgen(js_name = seedOptions)]
    pub fn seed_options(&self, match_id: i32, slot: JsValue, eligible: Vec<u32>) -> Result<JsValue, JsValue> {
        let slot: Slot = from_js(slot, "slot")?;
        let eligible: Vec<TeamId> = eligible.into_iter().map(TeamId).collect();
        let options = seed_options(&self.matches, &self.teams, &eligible, MatchId(match_id), slot);
        Ok(to_js(&options)?)
    }

    // =========================================================================
    // Edit intents
    // =========================================================================

    #[wasm_bindgen(js_name = assignTeam)]
    pub fn assign_team(&self, match_id: i32, slot: JsValue, team: Option<u32>) -> Result<JsValue, JsValue> {
        let slot: Slot = from_js(slot, "slot")?;
        let intent = bracket::assign_team(&self.matches, MatchId(match_id), slot, team.map(TeamId))?;
        Ok(to_js(&intent)?)
    }

    #[wasm_bindgen(js_name = swapPair)]
    pub fn swap_pair(&self, match_id: i32) -> Result<JsValue, JsValue> {
        let intent = bracket::swap_pair(&self.matches, MatchId(match_id))?;
        Ok(to_js(&intent)?)
    }

    #[wasm_bindgen(js_name = clearFirstRound)]
    pub fn clear_first_round(&self) -> Result<JsValue, JsValue> {
        Ok(to_js(&bracket::clear_first_round())?)
    }

    /// Rank `eligible` and pair it into round 1.
    ///
    /// `reseed`, when given, receives the eligible ids and may return them in
    /// ranked order; returning nothing falls back to seed metadata.
    #[wasm_bindgen(js_name = autoSeedAndPair)]
    pub fn auto_seed_and_pair(&self, eligible: Vec<u32>, reseed: Option<Function>) -> Result<JsValue, JsValue> {
        let eligible: Vec<TeamId> = eligible.into_iter().map(TeamId).collect();

        let call_js = |ids: &[TeamId]| -> Option<Vec<TeamId>> {
            let callback = reseed.as_ref()?;
            let arg = to_js(ids).ok()?;
            let ranked = match callback.call1(&JsValue::NULL, &arg) {
                Ok(value) => value,
                Err(err) => {
                    console::warn_2(&"bracket-core: reseed callback threw".into(), &err);
                    return None;
                }
            };
            if ranked.is_undefined() || ranked.is_null() {
                return None;
            }
            from_js(ranked, "reseed result").ok()
        };

        let intent = auto_seed_and_pair(&self.matches, &self.teams, &eligible, Some(&call_js));
        Ok(to_js(&intent)?)
    }
}

impl Default for BracketEngine {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Generators
// =============================================================================

/// Seed placement for a power-of-two bracket size.
#[wasm_bindgen(js_name = seedOrder)]
pub fn seed_order(size: usize) -> Result<Vec<u32>, JsValue> {
    Ok(bracket::seed_order(size)?)
}

/// Build a single-elimination bracket from `[{ id, seed? }]`.
#[wasm_bindgen(js_name = generateKnockout)]
pub fn generate_knockout(entrants: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    let entrants: Vec<Entrant> = from_js(entrants, "entrants")?;
    let options: KnockoutOptions = from_js_or_default(options, "knockout options")?;
    let bracket = KnockoutBuilder::new(options).build(&entrants);
    Ok(to_js(&bracket)?)
}

/// Build the knockout stage following a group stage.
///
/// `groups` is an array of team-id arrays in standing order.
#[wasm_bindgen(js_name = generateGroupKnockout)]
pub fn generate_group_knockout(
    groups: JsValue,
    advancing: usize,
    pairing: JsValue,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let groups: Vec<Vec<TeamId>> = from_js(groups, "groups")?;
    let pairing: GroupPairing = from_js_or_default(pairing, "group pairing")?;
    let options: KnockoutOptions = from_js_or_default(options, "knockout options")?;
    let bracket = KnockoutBuilder::new(options).build_from_groups(&groups, advancing, pairing);
    Ok(to_js(&bracket)?)
}

/// Round-robin fixtures for every group of a stage.
#[wasm_bindgen(js_name = generateRoundRobin)]
pub fn generate_round_robin(stage_index: u32, groups: JsValue, repeats: u32) -> Result<JsValue, JsValue> {
    let repeats = NonZeroU32::new(repeats).ok_or(BracketError::InvalidRepeatCount(repeats))?;
    let groups: Vec<Vec<TeamId>> = from_js(groups, "groups")?;
    Ok(to_js(&schedule_groups(stage_index, &groups, repeats))?)
}
