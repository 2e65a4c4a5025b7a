use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Snapshot of the game in progress, saved after every move and read back once on resume.
///
/// Optional fields are left out of the encoded form when absent, so a missing seed never comes back as seed `0`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub board: Vec<TileValue>,
    #[serde(alias = "points")]
    pub score: u64,
    pub moves: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Play time accumulated before the current session, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

impl GameState {
    pub fn new(board: Vec<TileValue>, score: u64, moves: u32) -> Self {
        Self {
            board,
            score,
            moves,
            start_time: None,
            seed: None,
            duration: None,
        }
    }

    /// Encodes the state for storage. A board that is not [`CELL_COUNT`] long is refused, since it could never be
    /// loaded back.
    pub fn encode(&self) -> Result<String> {
        self.check_board().map_err(|err| StoreError::Serialize {
            key: GAME_STATE_KEY.to_string(),
            reason: err.to_string(),
        })?;
        to_json(GAME_STATE_KEY, self)
    }

    pub fn decode(value: &str) -> core::result::Result<Self, DecodeError> {
        if value.trim().is_empty() {
            return Err(DecodeError::Empty);
        }

        let state: Self =
            serde_json::from_str(value).map_err(|err| DecodeError::Malformed(err.to_string()))?;
        state.check_board()?;
        Ok(state)
    }

    fn check_board(&self) -> core::result::Result<(), DecodeError> {
        if self.board.len() != CELL_COUNT {
            return Err(DecodeError::BoardSize {
                expected: CELL_COUNT,
                found: self.board.len(),
            });
        }
        Ok(())
    }
}

pub fn encode_game_state(
    board: &[TileValue],
    score: u64,
    moves: u32,
    start_time: Option<Timestamp>,
    seed: Option<u64>,
    duration: Option<u64>,
) -> Result<String> {
    GameState {
        board: board.to_vec(),
        score,
        moves,
        start_time,
        seed,
        duration,
    }
    .encode()
}

/// Decodes a stored game state, treating anything unreadable as no saved game.
pub fn decode_game_state(value: &str) -> Option<GameState> {
    match GameState::decode(value) {
        Ok(state) => Some(state),
        Err(DecodeError::Empty) => None,
        Err(err) => {
            log::warn!("Discarding saved game: {}", err);
            None
        }
    }
}

impl<P: KeyValueStore, L: KeyValueStore> PersistedState<P, L> {
    pub fn save_game_state(&self, state: &GameState) -> Result<()> {
        self.set(GAME_STATE_KEY, &state.encode()?)
    }

    pub fn load_game_state(&self) -> Option<GameState> {
        self.get(GAME_STATE_KEY)
            .and_then(|value| decode_game_state(&value))
    }

    /// Drops the saved in-progress game. Archiving a game to history does not call this on its own.
    pub fn clear_game_state(&self) -> Result<()> {
        self.remove(GAME_STATE_KEY)
    }
}
