//! Error type for contract violations and boundary decoding.
//!
//! The bracket algorithms themselves degrade instead of failing: missing
//! parents, malformed coordinates and empty inputs all produce empty-but-valid
//! results. Errors are reserved for callers that break a documented contract
//! and for values that cannot be decoded at the JS boundary.

use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::model::MatchId;

#[derive(Debug, Error)]
pub enum BracketError {
    #[error("bracket size must be a positive power of two, got {0}")]
    InvalidBracketSize(usize),

    #[error("round robin needs at least one pass, got {0}")]
    InvalidRepeatCount(u32),

    #[error("no match with id {0}")]
    UnknownMatch(MatchId),

    #[error("could not convert value: {0}")]
    Serialization(String),
}

impl From<serde_wasm_bindgen::Error> for BracketError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        BracketError::Serialization(err.to_string())
    }
}

impl From<BracketError> for JsValue {
    fn from(err: BracketError) -> Self {
        wasm_bindgen::JsError::new(&err.to_string()).into()
    }
}
