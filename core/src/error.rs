use alloc::string::String;
use thiserror::Error;

/// Failures of the key/value backends.
///
/// Only the write-side kinds reach callers; read failures are logged and
/// treated as an absent value by [`PersistedState`](crate::PersistedState).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Could not read {key:?} from storage: {reason}")]
    Read { key: String, reason: String },
    #[error("Could not write {key:?} to storage: {reason}")]
    Write { key: String, reason: String },
    #[error("Could not remove {key:?} from storage: {reason}")]
    Remove { key: String, reason: String },
    #[error("Could not serialize value for {key:?}: {reason}")]
    Serialize { key: String, reason: String },
    #[error("Stored value of {key:?} is unreadable, refusing to overwrite it: {reason}")]
    Corrupt { key: String, reason: String },
}

impl StoreError {
    pub fn key(&self) -> &str {
        match self {
            Self::Read { key, .. }
            | Self::Write { key, .. }
            | Self::Remove { key, .. }
            | Self::Serialize { key, .. }
            | Self::Corrupt { key, .. } => key,
        }
    }
}

/// Reasons a stored game-state string could not be turned back into a [`GameState`](crate::GameState).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Game state is empty")]
    Empty,
    #[error("Malformed game state: {0}")]
    Malformed(String),
    #[error("Board has {found} cells, expected {expected}")]
    BoardSize { expected: usize, found: usize },
}

pub type Result<T> = core::result::Result<T, StoreError>;
