use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::str::FromStr;
use serde::Serialize;

use crate::*;

pub const LOADED_BOARD_KEY: &str = "loadedGameBoard";
pub const LOADED_POINTS_KEY: &str = "loadedGamePoints";
pub const LOADED_MOVES_KEY: &str = "loadedGameMoves";
pub const LOADED_SEED_KEY: &str = "loadedGameSeed";
pub const LOADED_START_TIME_KEY: &str = "loadedGameStartTime";

const LOADED_KEYS: [&str; 5] = [
    LOADED_BOARD_KEY,
    LOADED_POINTS_KEY,
    LOADED_MOVES_KEY,
    LOADED_SEED_KEY,
    LOADED_START_TIME_KEY,
];

/// A past game picked from the history page, handed to the play page through per-tab storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedGame {
    pub board: Vec<TileValue>,
    pub score: u64,
    pub moves: u32,
    pub seed: u64,
    pub start_time: Timestamp,
}

impl LoadedGame {
    pub fn from_entry(entry: &GameHistoryEntry) -> Self {
        Self {
            board: entry.board.clone(),
            score: entry.score,
            moves: entry.moves,
            seed: entry.seed,
            start_time: entry.start_time,
        }
    }

    pub fn write_to(&self, store: &impl KeyValueStore) -> Result<()> {
        store.set(LOADED_BOARD_KEY, &to_json(LOADED_BOARD_KEY, &self.board)?)?;
        store.set(LOADED_POINTS_KEY, &self.score.to_string())?;
        store.set(LOADED_MOVES_KEY, &self.moves.to_string())?;
        store.set(LOADED_SEED_KEY, &self.seed.to_string())?;
        store.set(LOADED_START_TIME_KEY, &self.start_time.to_string())?;
        Ok(())
    }

    /// Reads a handed-off game and clears the handoff keys, whether or not they held a complete game.
    pub fn take_from(store: &impl KeyValueStore) -> Option<Self> {
        let read = |key: &str| match store.get(key) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("{}", err);
                None
            }
        };

        let board = read(LOADED_BOARD_KEY);
        let score = read(LOADED_POINTS_KEY);
        let moves = read(LOADED_MOVES_KEY);
        let seed = read(LOADED_SEED_KEY);
        let start_time = read(LOADED_START_TIME_KEY);

        for key in LOADED_KEYS {
            if let Err(err) = store.remove(key) {
                log::warn!("{}", err);
            }
        }

        let board = board?;
        let loaded = Self {
            board: serde_json::from_str(&board)
                .inspect_err(|err| log::warn!("Discarding loaded board: {}", err))
                .ok()?,
            score: parse_field(LOADED_POINTS_KEY, score?)?,
            moves: parse_field(LOADED_MOVES_KEY, moves?)?,
            seed: parse_field(LOADED_SEED_KEY, seed?)?,
            start_time: parse_field(LOADED_START_TIME_KEY, start_time?)?,
        };
        log::debug!("loaded game with seed {}", loaded.seed);
        Some(loaded)
    }
}

fn parse_field<T: FromStr>(key: &str, value: String) -> Option<T> {
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        log::warn!("Discarding loaded game, {:?} holds {:?}", key, value);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn entry() -> GameHistoryEntry {
        GameHistoryEntry {
            start_time: 1_700_000_000_000,
            stop_time: 1_700_000_600_000,
            score: 4096,
            moves: 77,
            seed: 123_456,
            board: vec![2; CELL_COUNT],
        }
    }

    #[test]
    fn handoff_is_consumed() {
        let tab = MemoryStore::new();
        let loaded = LoadedGame::from_entry(&entry());

        loaded.write_to(&tab).unwrap();
        assert_eq!(tab.get(LOADED_POINTS_KEY).unwrap().as_deref(), Some("4096"));
        assert_eq!(tab.get(LOADED_SEED_KEY).unwrap().as_deref(), Some("123456"));

        assert_eq!(LoadedGame::take_from(&tab), Some(loaded));
        assert!(tab.is_empty());
        assert_eq!(LoadedGame::take_from(&tab), None);
    }

    #[test]
    fn partial_handoff_is_cleared_and_ignored() {
        let tab = MemoryStore::with_entries([
            (LOADED_BOARD_KEY, "[1,2,3]"),
            (LOADED_POINTS_KEY, "10"),
            (LOADED_MOVES_KEY, "ten"),
            (LOADED_SEED_KEY, "1"),
            (LOADED_START_TIME_KEY, "0"),
            ("unrelated", "kept"),
        ]);

        assert_eq!(LoadedGame::take_from(&tab), None);
        assert_eq!(tab.len(), 1);
        assert!(tab.contains_key("unrelated"));
    }
}
