use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use chrono::prelude::*;
use core::cmp::Ordering;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// History column the table can be sorted by.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    StartTime,
    StopTime,
    Score,
    Moves,
    Seed,
}

impl SortKey {
    pub const fn label(self) -> &'static str {
        use SortKey::*;
        match self {
            StartTime => "Started",
            StopTime => "Finished",
            Score => "Score",
            Moves => "Moves",
            Seed => "Seed",
        }
    }

    fn compare(self, a: &GameHistoryEntry, b: &GameHistoryEntry) -> Ordering {
        use SortKey::*;
        match self {
            StartTime => a.start_time.cmp(&b.start_time),
            StopTime => a.stop_time.cmp(&b.stop_time),
            Score => a.score.cmp(&b.score),
            Moves => a.moves.cmp(&b.moves),
            Seed => a.seed.cmp(&b.seed),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Current sort of the history table, most recently finished first by default.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Default for HistorySort {
    fn default() -> Self {
        Self {
            key: SortKey::StopTime,
            order: SortOrder::Desc,
        }
    }
}

impl HistorySort {
    pub const fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// Selecting the active key flips the order, selecting another key sorts by it descending.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == key {
            self.order = self.order.reversed();
        } else {
            self.key = key;
            self.order = SortOrder::Desc;
        }
    }

    /// Order indicator for a column header, `None` when the column is not the active one.
    pub fn order_for(&self, key: SortKey) -> Option<SortOrder> {
        (self.key == key).then_some(self.order)
    }

    pub fn compare(&self, a: &GameHistoryEntry, b: &GameHistoryEntry) -> Ordering {
        self.order.apply(self.key.compare(a, b))
    }
}

/// Stable sort: entries that compare equal keep their stored order.
pub fn sort_entries(entries: &mut [GameHistoryEntry], sort: HistorySort) {
    entries.sort_by(|a, b| sort.compare(a, b));
}

pub fn sorted(mut entries: Vec<GameHistoryEntry>, sort: HistorySort) -> Vec<GameHistoryEntry> {
    sort_entries(&mut entries, sort);
    entries
}

/// Renders the time between two timestamps as `1h 2m 3s`, dropping leading zero units but always keeping seconds.
pub fn format_duration(start: Timestamp, stop: Timestamp) -> String {
    let total_secs = stop.saturating_sub(start).max(0) / 1000;
    let seconds = total_secs % 60;
    let minutes = (total_secs / 60) % 60;
    let hours = total_secs / 3600;

    let mut parts: SmallVec<[String; 3]> = SmallVec::new();
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 || hours > 0 {
        parts.push(format!("{}m", minutes));
    }
    parts.push(format!("{}s", seconds));
    parts.join(" ")
}

pub fn format_timestamp(timestamp: Timestamp) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp)
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Formats a count with thousands separators, `1234567` becomes `1,234,567`.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Lays a stored board out as the square grid shown in previews, missing cells are empty.
pub fn board_grid(board: &[TileValue]) -> Array2<TileValue> {
    Array2::from_shape_fn((BOARD_SIZE, BOARD_SIZE), |(row, col)| {
        board.get(row * BOARD_SIZE + col).copied().unwrap_or(0)
    })
}
