use alloc::string::ToString;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// One finished game. Entries are only ever appended to the stored history, never edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameHistoryEntry {
    pub start_time: Timestamp,
    pub stop_time: Timestamp,
    pub score: u64,
    pub moves: u32,
    pub seed: u64,
    pub board: Vec<TileValue>,
}

impl GameHistoryEntry {
    pub fn duration_ms(&self) -> u64 {
        self.stop_time.saturating_sub(self.start_time).max(0) as u64
    }
}

impl<P: KeyValueStore, L: KeyValueStore> PersistedState<P, L> {
    /// The stored history in insertion order. Missing or corrupt history reads as empty, and single entries that
    /// do not parse are skipped.
    pub fn history(&self) -> Vec<GameHistoryEntry> {
        let records = match self.stored_history() {
            Ok(records) => records,
            Err(err) => {
                log::warn!("{}, ignoring it", err);
                return Vec::new();
            }
        };

        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::warn!("Skipping unreadable history entry {}: {}", index, err);
                    None
                }
            })
            .collect()
    }

    /// The stored history as raw records, so entries this version cannot read survive a rewrite.
    fn stored_history(&self) -> Result<Vec<serde_json::Value>> {
        match self.get(HISTORY_KEY) {
            Some(value) if !value.trim().is_empty() => {
                serde_json::from_str(&value).map_err(|err| StoreError::Corrupt {
                    key: HISTORY_KEY.to_string(),
                    reason: err.to_string(),
                })
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Appends `entry` to the stored history.
    ///
    /// Fails without writing when the stored history is not a list at all. This is a plain read-modify-write: two
    /// overlapping appends (say, from two tabs) can lose one of the entries.
    pub fn append_history(&self, entry: GameHistoryEntry) -> Result<()> {
        let mut records = self.stored_history()?;
        let record = serde_json::to_value(&entry).map_err(|err| StoreError::Serialize {
            key: HISTORY_KEY.to_string(),
            reason: err.to_string(),
        })?;
        records.push(record);
        self.set(HISTORY_KEY, &to_json(HISTORY_KEY, &records)?)?;
        log::debug!("history now holds {} games", records.len());
        Ok(())
    }

    /// Stores a finished game and raises the highscore when it was beaten. Returns whether it was.
    pub fn archive_game(&self, entry: GameHistoryEntry) -> Result<bool> {
        let score = entry.score;
        self.append_history(entry)?;
        self.record_score(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::*;
    use alloc::vec;

    fn entry(stop_time: Timestamp, score: u64) -> GameHistoryEntry {
        GameHistoryEntry {
            start_time: stop_time - 60_000,
            stop_time,
            score,
            moves: 10,
            seed: 1,
            board: vec![1; CELL_COUNT],
        }
    }

    #[test]
    fn appends_keep_call_order() {
        let state = PersistedState::new(MemoryStore::new());
        assert!(state.history().is_empty());

        let entries: Vec<_> = (0..5).map(|i| entry(1_000_000 + i, 100 * i as u64)).collect();
        for e in &entries {
            state.append_history(e.clone()).unwrap();
        }

        assert_eq!(state.history(), entries);
    }

    const MIXED_HISTORY: &str = r#"[{"startTime":1,"stopTime":2,"score":10,"moves":1,"seed":5,"board":[1]},{"startTime":3,"stopTime":4,"score":20,"moves":1,"seed":-7,"board":[1]}]"#;

    #[test]
    fn corrupt_history_reads_as_empty() {
        let state = PersistedState::new(MemoryStore::with_entries([(HISTORY_KEY, "{oops")]));
        assert!(state.history().is_empty());

        let err = state.append_history(entry(5_000_000, 10)).unwrap_err();

        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(state.get(HISTORY_KEY).as_deref(), Some("{oops"));
    }

    #[test]
    fn unreadable_entries_are_skipped() {
        let state = PersistedState::new(MemoryStore::with_entries([(HISTORY_KEY, MIXED_HISTORY)]));

        let history = state.history();

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].seed, 5);
        assert_eq!(history[0].score, 10);
    }

    #[test]
    fn append_keeps_unreadable_entries() {
        let state = PersistedState::new(MemoryStore::with_entries([(HISTORY_KEY, MIXED_HISTORY)]));

        state.append_history(entry(5_000_000, 30)).unwrap();

        let stored = state.get(HISTORY_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&stored).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(3));
        assert_eq!(value[1]["seed"], -7);
        assert_eq!(value[2]["score"], 30);

        let scores: Vec<_> = state.history().iter().map(|e| e.score).collect();
        assert_eq!(scores, [10, 30]);
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let state = PersistedState::new(MemoryStore::new());
        state.append_history(entry(120_000, 300)).unwrap();

        let stored = state.get(HISTORY_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&stored).unwrap();

        assert_eq!(value[0]["startTime"], 60_000);
        assert_eq!(value[0]["stopTime"], 120_000);
        assert_eq!(value[0]["score"], 300);
        assert_eq!(value[0]["board"].as_array().map(Vec::len), Some(CELL_COUNT));
    }

    #[test]
    fn reads_history_written_by_older_clients() {
        let stored = r#"[{"startTime":1,"stopTime":3001,"score":96,"moves":4,"seed":99,"board":[1,2,3]}]"#;
        let legacy = MemoryStore::with_entries([(HISTORY_KEY, stored)]);
        let state = PersistedState::with_legacy(MemoryStore::new(), &legacy);

        let history = state.history();

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].seed, 99);
        assert_eq!(history[0].duration_ms(), 3000);
        assert!(legacy.is_empty());
    }

    #[test]
    fn failed_append_propagates() {
        let state = PersistedState::new(BrokenStore);
        assert!(matches!(
            state.append_history(entry(1, 1)),
            Err(StoreError::Write { .. })
        ));
    }

    #[test]
    fn archive_records_highscore() {
        let state = PersistedState::new(MemoryStore::new());

        assert!(state.archive_game(entry(10_000_000, 500)).unwrap());
        assert!(!state.archive_game(entry(20_000_000, 200)).unwrap());

        assert_eq!(state.highscore(), 500);
        assert_eq!(state.history().len(), 2);
    }
}
