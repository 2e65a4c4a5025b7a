use exponentile_core::{KeyValueStore, PersistedState, Result, StoreError};
use gloo::storage::{LocalStorage, SessionStorage, Storage};
use std::cell::OnceCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlDocument;

pub(crate) type Persisted = PersistedState<BrowserPreferences, CookieJar>;

thread_local! {
    static PERSISTED: OnceCell<Rc<Persisted>> = const { OnceCell::new() };
}

/// Sets up the process-wide persisted state. Only the first call has an effect.
pub(crate) fn init(prefix: &str) {
    PERSISTED.with(|cell| {
        let state = PersistedState::with_legacy(BrowserPreferences::new(prefix), CookieJar);
        if cell.set(Rc::new(state)).is_err() {
            log::warn!("persisted state already initialized");
        }
    });
}

pub(crate) fn persisted() -> Rc<Persisted> {
    PERSISTED.with(|cell| {
        cell.get_or_init(|| {
            Rc::new(PersistedState::with_legacy(
                BrowserPreferences::default(),
                CookieJar,
            ))
        })
        .clone()
    })
}

fn reason(err: JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

fn read_error(key: &str, err: JsValue) -> StoreError {
    StoreError::Read {
        key: key.to_string(),
        reason: reason(err),
    }
}

fn write_error(key: &str, err: JsValue) -> StoreError {
    StoreError::Write {
        key: key.to_string(),
        reason: reason(err),
    }
}

fn remove_error(key: &str, err: JsValue) -> StoreError {
    StoreError::Remove {
        key: key.to_string(),
        reason: reason(err),
    }
}

/// Device preferences kept in LocalStorage as raw strings, namespaced by a key prefix.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BrowserPreferences {
    prefix: String,
}

impl BrowserPreferences {
    pub const DEFAULT_PREFIX: &'static str = "CapacitorStorage.";

    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    fn item_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl Default for BrowserPreferences {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFIX)
    }
}

impl KeyValueStore for BrowserPreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        LocalStorage::raw()
            .get_item(&self.item_key(key))
            .map_err(|err| read_error(key, err))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        LocalStorage::raw()
            .set_item(&self.item_key(key), value)
            .map_err(|err| write_error(key, err))
    }

    fn remove(&self, key: &str) -> Result<()> {
        LocalStorage::raw()
            .remove_item(&self.item_key(key))
            .map_err(|err| remove_error(key, err))
    }
}

/// Per-tab storage used to hand a game from the history page to the play page.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) struct TabStorage;

impl KeyValueStore for TabStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        SessionStorage::raw()
            .get_item(key)
            .map_err(|err| read_error(key, err))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        SessionStorage::raw()
            .set_item(key, value)
            .map_err(|err| write_error(key, err))
    }

    fn remove(&self, key: &str) -> Result<()> {
        SessionStorage::raw()
            .remove_item(key)
            .map_err(|err| remove_error(key, err))
    }
}

/// The cookies older releases kept their state in, only ever read from and cleared.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) struct CookieJar;

impl CookieJar {
    fn document() -> std::result::Result<HtmlDocument, JsValue> {
        gloo::utils::document()
            .dyn_into::<HtmlDocument>()
            .map_err(JsValue::from)
    }
}

impl KeyValueStore for CookieJar {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let cookies = Self::document()
            .and_then(|doc| doc.cookie())
            .map_err(|err| read_error(key, err))?;

        Ok(parse_cookie(&cookies, key).map(|raw| {
            js_sys::decode_uri_component(raw)
                .map(String::from)
                .unwrap_or_else(|_| raw.to_string())
        }))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let value = String::from(js_sys::encode_uri_component(value));
        Self::document()
            .and_then(|doc| doc.set_cookie(&format!("{}={}; path=/; max-age=31536000", key, value)))
            .map_err(|err| write_error(key, err))
    }

    fn remove(&self, key: &str) -> Result<()> {
        Self::document()
            .and_then(|doc| doc.set_cookie(&expired_cookie(key)))
            .map_err(|err| remove_error(key, err))
    }
}

/// Finds the raw value of cookie `key` in a `document.cookie` string.
pub(crate) fn parse_cookie<'a>(cookies: &'a str, key: &str) -> Option<&'a str> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value)
}

pub(crate) fn expired_cookie(key: &str) -> String {
    format!("{}=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/", key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_cookie_among_others() {
        let cookies = "theme=dark; highscore=2048; gameHistory=%5B%5D";
        assert_eq!(parse_cookie(cookies, "highscore"), Some("2048"));
        assert_eq!(parse_cookie(cookies, "gameHistory"), Some("%5B%5D"));
        assert_eq!(parse_cookie(cookies, "score"), None);
    }

    #[test]
    fn cookie_value_may_contain_equals() {
        assert_eq!(parse_cookie("gameState=a=b", "gameState"), Some("a=b"));
        assert_eq!(parse_cookie("", "gameState"), None);
    }

    #[test]
    fn prefs_are_namespaced() {
        let prefs = BrowserPreferences::default();
        assert_eq!(prefs.item_key("highscore"), "CapacitorStorage.highscore");
        assert_eq!(BrowserPreferences::new("").item_key("gameState"), "gameState");
    }

    #[test]
    fn expiry_clears_path_root() {
        assert_eq!(
            expired_cookie("doneTutorial"),
            "doneTutorial=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/"
        );
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use exponentile_core::{GameHistoryEntry, LoadedGame, CELL_COUNT};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn cookie_value_moves_into_local_storage() {
        CookieJar.set("highscore", "4096").unwrap();
        let prefs = BrowserPreferences::new("test.");
        prefs.remove("highscore").unwrap();
        let state = PersistedState::with_legacy(prefs.clone(), CookieJar);

        assert_eq!(state.highscore(), 4096);
        assert_eq!(CookieJar.get("highscore").unwrap(), None);
        assert_eq!(prefs.get("highscore").unwrap().as_deref(), Some("4096"));
    }

    #[wasm_bindgen_test]
    fn handoff_goes_through_session_storage() {
        let entry = GameHistoryEntry {
            start_time: 1,
            stop_time: 2,
            score: 3,
            moves: 4,
            seed: 5,
            board: vec![1; CELL_COUNT],
        };
        let loaded = LoadedGame::from_entry(&entry);

        loaded.write_to(&TabStorage).unwrap();

        assert_eq!(LoadedGame::take_from(&TabStorage), Some(loaded));
        assert_eq!(TabStorage.get("loadedGameBoard").unwrap(), None);
    }
}
