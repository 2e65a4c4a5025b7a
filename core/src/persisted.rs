use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use core::cell::RefCell;

use crate::*;

pub const HIGHSCORE_KEY: &str = "highscore";
pub const TUTORIAL_KEY: &str = "doneTutorial";
pub const HISTORY_KEY: &str = "gameHistory";
pub const GAME_STATE_KEY: &str = "gameState";

/// Two-tier persisted state: a primary store plus a legacy store that values get migrated out of.
///
/// The first read of a key in a session looks at the legacy tier. A value found there is copied into the primary
/// tier and removed from the legacy one, after which the key is remembered as checked and every later read is a
/// plain primary read. Keys written while their legacy copy could not be cleared stay unchecked, and the next
/// access retries the removal instead of migrating the stale copy.
#[derive(Debug)]
pub struct PersistedState<P, L = NoLegacy> {
    primary: P,
    legacy: L,
    checked: RefCell<BTreeSet<String>>,
    shadowed: RefCell<BTreeSet<String>>,
}

impl<P: KeyValueStore> PersistedState<P> {
    pub fn new(primary: P) -> Self {
        Self::with_legacy(primary, NoLegacy)
    }
}

impl<P: KeyValueStore, L: KeyValueStore> PersistedState<P, L> {
    pub fn with_legacy(primary: P, legacy: L) -> Self {
        Self {
            primary,
            legacy,
            checked: RefCell::new(BTreeSet::new()),
            shadowed: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn legacy(&self) -> &L {
        &self.legacy
    }

    /// Reads `key`, migrating it out of the legacy tier on first access. Read failures count as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.migrate(key) {
            return Some(value);
        }

        match self.primary.get(key) {
            Ok(value) => {
                log::trace!("get {:?}: {}", key, if value.is_some() { "hit" } else { "miss" });
                value
            }
            Err(err) => {
                log::warn!("{}, treating as absent", err);
                None
            }
        }
    }

    /// Writes `key` to the primary tier.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.primary.set(key, value)?;
        log::debug!("set {:?} ({} bytes)", key, value.len());
        self.forget_legacy(key);
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.primary.remove(key)?;
        log::debug!("removed {:?}", key);
        self.forget_legacy(key);
        Ok(())
    }

    fn is_checked(&self, key: &str) -> bool {
        self.checked.borrow().contains(key)
    }

    fn mark_checked(&self, key: &str) {
        self.shadowed.borrow_mut().remove(key);
        self.checked.borrow_mut().insert(key.to_string());
    }

    fn migrate(&self, key: &str) -> Option<String> {
        if self.is_checked(key) {
            return None;
        }
        if self.shadowed.borrow().contains(key) {
            self.forget_legacy(key);
            return None;
        }

        let value = match self.legacy.get(key) {
            Ok(Some(value)) if !value.is_empty() => value,
            Ok(_) => {
                self.mark_checked(key);
                return None;
            }
            Err(err) => {
                log::warn!("{}, skipping legacy lookup", err);
                self.mark_checked(key);
                return None;
            }
        };

        // the legacy copy stays put until the primary one exists
        if let Err(err) = self.primary.set(key, &value) {
            log::warn!("Could not migrate {:?} out of the legacy store: {}", key, err);
            return Some(value);
        }
        if let Err(err) = self.legacy.remove(key) {
            log::warn!("Migrated {:?} but could not clear the legacy copy: {}", key, err);
        }
        log::info!("Migrated {:?} out of the legacy store", key);
        self.mark_checked(key);
        Some(value)
    }

    /// A fresh primary write must not be shadowed by a stale legacy value on the next read.
    fn forget_legacy(&self, key: &str) {
        if self.is_checked(key) {
            return;
        }
        match self.legacy.remove(key) {
            Ok(()) => self.mark_checked(key),
            Err(err) => {
                log::warn!("{}, will retry", err);
                self.shadowed.borrow_mut().insert(key.to_string());
            }
        }
    }

    pub fn highscore(&self) -> u64 {
        self.get(HIGHSCORE_KEY)
            .and_then(|value| parse_leading_int(&value))
            .unwrap_or(0)
    }

    pub fn set_highscore(&self, highscore: u64) -> Result<()> {
        self.set(HIGHSCORE_KEY, &highscore.to_string())
    }

    /// Stores `score` as the highscore if it beats the current one, returns whether it did.
    pub fn record_score(&self, score: u64) -> Result<bool> {
        if score <= self.highscore() {
            return Ok(false);
        }
        self.set_highscore(score)?;
        log::info!("new highscore: {}", score);
        Ok(true)
    }

    pub fn is_tutorial_done(&self) -> bool {
        self.get(TUTORIAL_KEY).is_some_and(|value| !value.is_empty())
    }

    pub fn finish_tutorial(&self) -> Result<()> {
        self.set(TUTORIAL_KEY, "true")
    }
}

/// Parses the leading decimal digits of `value`, ignoring surrounding junk like `"42px"`.
pub(crate) fn parse_leading_int(value: &str) -> Option<u64> {
    let value = value.trim_start();
    let value = value.strip_prefix('+').unwrap_or(value);
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().ok()
}
