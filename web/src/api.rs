//! Entry points for the gameplay component, which lives outside this crate.
//!
//! Numbers cross the boundary as JS numbers (`f64`) and must be whole, non-negative and in range of the stored
//! integer type, anything else is thrown back before touching storage. Write failures are thrown as JS errors, reads
//! never throw.

use crate::storage::{self, TabStorage};
use exponentile_core::{GameHistoryEntry, GameState, LoadedGame};
use thiserror::Error;
use wasm_bindgen::prelude::*;

/// Largest integer a JS number holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{name} must be a whole number between 0 and {max}, got {value}")]
pub(crate) struct InvalidNumber {
    name: &'static str,
    value: f64,
    max: u64,
}

/// Converts a JS number into `T`, refusing `NaN`, infinities, fractions, negatives and out-of-range values.
pub(crate) fn js_integer<T>(name: &'static str, value: f64) -> Result<T, InvalidNumber>
where
    T: TryFrom<u64> + Bounded,
{
    let max = T::MAX_U64.min(MAX_SAFE_INTEGER as u64);
    let invalid = InvalidNumber { name, value, max };
    if !value.is_finite() || value.fract() != 0.0 || value < 0.0 || value > max as f64 {
        return Err(invalid);
    }
    T::try_from(value as u64).map_err(|_| invalid)
}

fn js_optional<T>(name: &'static str, value: Option<f64>) -> Result<Option<T>, InvalidNumber>
where
    T: TryFrom<u64> + Bounded,
{
    value.map(|value| js_integer(name, value)).transpose()
}

/// Upper bound of a stored integer type, as `u64`.
pub(crate) trait Bounded {
    const MAX_U64: u64;
}

impl Bounded for u32 {
    const MAX_U64: u64 = u32::MAX as u64;
}

impl Bounded for u64 {
    const MAX_U64: u64 = u64::MAX;
}

impl Bounded for i64 {
    const MAX_U64: u64 = i64::MAX as u64;
}

#[wasm_bindgen(js_name = saveGameState)]
pub fn save_game_state(
    board: Vec<u32>,
    score: f64,
    moves: f64,
    start_time: Option<f64>,
    seed: Option<f64>,
    duration: Option<f64>,
) -> Result<(), JsError> {
    let state = GameState {
        board,
        score: js_integer("score", score)?,
        moves: js_integer("moves", moves)?,
        start_time: js_optional("startTime", start_time)?,
        seed: js_optional("seed", seed)?,
        duration: js_optional("duration", duration)?,
    };
    storage::persisted().save_game_state(&state)?;
    Ok(())
}

/// The saved game as JSON, `undefined` when there is none.
#[wasm_bindgen(js_name = loadGameState)]
pub fn load_game_state() -> Option<String> {
    storage::persisted()
        .load_game_state()
        .and_then(|state| state.encode().ok())
}

#[wasm_bindgen(js_name = clearGameState)]
pub fn clear_game_state() -> Result<(), JsError> {
    storage::persisted().clear_game_state()?;
    Ok(())
}

/// Appends a finished game (JSON `GameHistoryEntry`) to the history, returns whether it set a new highscore.
#[wasm_bindgen(js_name = archiveGame)]
pub fn archive_game(entry: &str) -> Result<bool, JsError> {
    let entry: GameHistoryEntry = serde_json::from_str(entry)?;
    Ok(storage::persisted().archive_game(entry)?)
}

#[wasm_bindgen(js_name = getHighscore)]
pub fn get_highscore() -> f64 {
    storage::persisted().highscore() as f64
}

#[wasm_bindgen(js_name = setHighscore)]
pub fn set_highscore(highscore: f64) -> Result<(), JsError> {
    storage::persisted().set_highscore(js_integer("highscore", highscore)?)?;
    Ok(())
}

#[wasm_bindgen(js_name = isTutorialDone)]
pub fn is_tutorial_done() -> bool {
    storage::persisted().is_tutorial_done()
}

#[wasm_bindgen(js_name = finishTutorial)]
pub fn finish_tutorial() -> Result<(), JsError> {
    storage::persisted().finish_tutorial()?;
    Ok(())
}

/// The game handed over by the history page as JSON, consumed on read.
#[wasm_bindgen(js_name = takeLoadedGame)]
pub fn take_loaded_game() -> Option<String> {
    let loaded = LoadedGame::take_from(&TabStorage)?;
    serde_json::to_string(&loaded).ok()
}
