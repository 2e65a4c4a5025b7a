#![no_std]

extern crate alloc;

use alloc::string::{String, ToString};
use serde::Serialize;

pub use error::*;
pub use game_state::*;
pub use handoff::*;
pub use history::*;
pub use persisted::*;
pub use store::*;
pub use types::*;
pub use view::*;

mod error;
mod game_state;
mod handoff;
mod history;
mod persisted;
mod store;
mod types;
mod view;

pub(crate) fn to_json<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|err| StoreError::Serialize {
        key: key.to_string(),
        reason: err.to_string(),
    })
}
