//! Facade tests, run with `wasm-pack test --node`.

#![cfg(target_arch = "wasm32")]

use bracket_core_wasm::{generate_knockout, generate_round_robin, seed_order, BracketEngine};
use js_sys::{Array, Function, Reflect, JSON};
use serde::Deserialize;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

fn json(text: &str) -> JsValue {
    JSON::parse(text).unwrap()
}

fn get(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Placement {
    id: i32,
    is_stub: bool,
    center_y: f32,
    height: f32,
    round: u32,
}

#[derive(Deserialize)]
struct Connector {
    from: i32,
    to: i32,
    d: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Offset {
    match_id: i32,
    offset_y: f32,
}

#[derive(Deserialize)]
struct EdgeOut {
    from: i32,
    to: i32,
}

#[derive(Deserialize)]
struct LayoutOut {
    placements: Vec<Placement>,
    offsets: Vec<Offset>,
    edges: Vec<EdgeOut>,
    connectors: Vec<Connector>,
}

const MATCHES: &str = r#"[
    { "id": 1, "stageIndex": 0, "round": 1, "bracketPosition": 1, "teamASlot": 1, "teamBSlot": 4,
      "status": "finished", "scoreA": 3, "scoreB": 1 },
    { "id": 2, "stageIndex": 0, "round": 1, "bracketPosition": 2, "teamASlot": 2, "teamBSlot": 3 },
    { "id": 3, "stageIndex": 0, "round": 2, "bracketPosition": 1 }
]"#;

const MEASUREMENTS: &str = r#"[
    { "matchId": 1, "x": 0, "y": 0, "width": 200, "height": 80 },
    { "matchId": 2, "x": 0, "y": 80, "width": 200, "height": 80 },
    { "matchId": 3, "x": 260, "y": 40, "width": 200, "height": 80 }
]"#;

fn loaded_engine() -> BracketEngine {
    let mut engine = BracketEngine::new();
    engine.set_matches(json(MATCHES)).unwrap();
    engine.set_measurements(json(MEASUREMENTS)).unwrap();
    engine
}

#[wasm_bindgen_test]
fn seed_order_for_eight() {
    assert_eq!(seed_order(8).unwrap(), vec![1, 8, 4, 5, 2, 7, 3, 6]);
    assert!(seed_order(6).is_err());
}

#[wasm_bindgen_test]
fn layout_round_trip() {
    let mut engine = loaded_engine();
    engine.set_layout_config(json(r#"{ "minGap": 20 }"#)).unwrap();

    let out: LayoutOut = serde_wasm_bindgen::from_value(engine.compute_layout().unwrap()).unwrap();
    assert_eq!(out.placements.len(), 3);
    assert!(out.placements.iter().all(|p| !p.is_stub));

    let first: Vec<&Placement> = out.placements.iter().filter(|p| p.round == 1).collect();
    assert!(first[1].center_y - first[0].center_y >= (first[0].height + first[1].height) / 2.0 + 20.0);

    assert_eq!(out.connectors.len(), 2);
    assert!(out.connectors.iter().all(|c| c.to == 3 && c.from > 0));
    assert!(out.connectors[0].d.starts_with("M 200 "));

    assert_eq!(out.offsets.len(), 3);
    let first_offset = out.offsets.iter().find(|o| o.match_id == 1).unwrap();
    assert_eq!(first_offset.offset_y, -10.0, "the 20px gap is split between the first-round cards");
    assert_eq!(out.edges.len(), 2);
    assert!(out.edges.iter().all(|e| e.to == 3 && (e.from == 1 || e.from == 2)));

    assert_eq!(engine.hit_test(100.0, 40.0), Some(1));
    assert_eq!(engine.hit_test(-10.0, -10.0), None);
    assert_eq!(engine.nearest_match(205.0, 40.0, 10.0), Some(1));
    assert_eq!(engine.nearest_match(600.0, 40.0, 10.0), None);

    assert_eq!(engine.children_of_js(1).unwrap(), vec![3]);
    assert!(engine.children_of_js(3).unwrap().is_empty());
    assert!(engine.children_of_js(99).is_err());
}

#[wasm_bindgen_test]
fn winner_queries() {
    let engine = loaded_engine();
    assert_eq!(engine.compute_winner(1).unwrap(), Some(1));
    assert_eq!(engine.compute_winner(2).unwrap(), None);
    assert!(engine.compute_winner(99).is_err());

    let implied = Array::from(&engine.implied_teams().unwrap());
    assert_eq!(implied.length(), 1);
    let row = implied.get(0);
    assert_eq!(get(&row, "matchId").as_f64(), Some(3.0));
    assert_eq!(get(&row, "teamA").as_f64(), Some(1.0));
    assert!(get(&row, "teamB").is_null());

    let parents = engine.resolve_parents(3).unwrap();
    let link = get(&get(&parents, "a"), "link");
    assert_eq!(get(&link, "via").as_string().as_deref(), Some("topology"));
    assert_eq!(get(&link, "matchId").as_f64(), Some(1.0));
}

#[wasm_bindgen_test]
fn edit_intents() {
    let engine = loaded_engine();

    let intent = engine.swap_pair(2).unwrap();
    assert_eq!(get(&intent, "kind").as_string().as_deref(), Some("swapPair"));
    assert_eq!(get(&intent, "matchId").as_f64(), Some(2.0));

    let intent = engine.assign_team(3, JsValue::from_str("B"), Some(7)).unwrap();
    assert_eq!(get(&intent, "kind").as_string().as_deref(), Some("assignTeam"));
    assert_eq!(get(&intent, "slot").as_string().as_deref(), Some("B"));

    assert!(engine.swap_pair(42).is_err());

    let reverse = Function::new_with_args("ids", "return ids.slice().reverse();");
    let intent = engine.auto_seed_and_pair(vec![1, 2, 3, 4], Some(reverse)).unwrap();
    let rows = Array::from(&get(&intent, "rows"));
    assert_eq!(rows.length(), 2);
    assert_eq!(get(&rows.get(0), "teamA").as_f64(), Some(4.0));
    assert_eq!(get(&rows.get(0), "teamB").as_f64(), Some(1.0));
}

#[wasm_bindgen_test]
fn generators() {
    let bracket = generate_knockout(json(r#"[{ "id": 1, "seed": 1 }, { "id": 2, "seed": 2 }, { "id": 3 }]"#), JsValue::UNDEFINED)
        .unwrap();
    let matches = Array::from(&get(&bracket, "matches"));
    assert_eq!(matches.length(), 3);
    assert_eq!(get(&bracket, "bracketSize").as_f64(), Some(4.0));

    let rows = Array::from(&generate_round_robin(0, json("[[1, 2, 3, 4]]"), 2).unwrap());
    assert_eq!(rows.length(), 12);
    assert!(generate_round_robin(0, json("[[1, 2]]"), 0).is_err());
}
