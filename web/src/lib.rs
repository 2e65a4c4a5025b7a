use clap::Parser;
use wasm_bindgen::prelude::*;

mod api;
mod history;
mod storage;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Prefix of the LocalStorage keys the preferences live under
    #[arg(long, default_value = storage::BrowserPreferences::DEFAULT_PREFIX)]
    storage_prefix: String,

    /// Where "load game" navigates to, relative to the history page
    #[arg(long, default_value = "../exponentile/")]
    play_path: String,
}

/// Parses arguments given in the location hash, e.g. `#-vv&--play-path=/play/`.
fn parse_hash_args(location_hash: &str) -> Result<Args, clap::Error> {
    Args::try_parse_from(location_hash.split(['#', '&']))
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::{document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window()
        .location()
        .hash()
        .unwrap_or_else(|_| "".to_string());

    let args = parse_hash_args(&location_hash).expect("Could not parse args");
    if let Some(log_level) = args.verbose.log_level() {
        console_log::init_with_level(log_level).expect("Error initializing logger");
    }
    log::debug!("storage prefix: {:?}", args.storage_prefix);

    storage::init(&args.storage_prefix);

    let Some(root) = document().get_element_by_id("history") else {
        log::debug!("no history element, only exposing the storage API");
        return;
    };

    log::debug!("App started");
    let props = history::HistoryProps {
        play_path: args.play_path.into(),
    };
    yew::Renderer::<history::HistoryView>::with_root_and_props(root, props).render();
}
