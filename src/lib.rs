//! Whack-a-mole core crate.
//!
//! The game logic (`game`, `board`, `fsm`, `timeline`) is headless and
//! deterministic: it runs against a virtual millisecond clock and talks to
//! the outside world only through the `Presenter` and `ScoreStore` traits.
//! On wasm32 the `web` module binds those traits to the DOM and
//! `localStorage` and exposes `start_game()` to JS.

use wasm_bindgen::prelude::*;

pub mod board;
pub mod config;
pub mod error;
pub mod fsm;
pub mod game;
pub mod presenter;
pub mod store;
pub mod timeline;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use board::{Board, Slot, TargetKind, visible_duration_ms};
pub use config::{Config, ConfigError, Params};
pub use error::{PresenterError, StoreError};
pub use fsm::{EndReason, RoundAction, RoundFsm, RoundPhase};
pub use game::{Game, GameState};
pub use presenter::{
    Counters, Cue, Presenter, PresenterEvent, RecordingPresenter, RoundSummary, Screen,
    TargetVisual,
};
pub use store::{MemoryStore, ScoreStore};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // a second init only means a logger is already installed
    #[cfg(target_arch = "wasm32")]
    let _ = console_log::init_with_level(log::Level::Info);
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Bind the page and show the main menu with default settings.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::boot(Config::default())
}

/// Same as `start_game`, with settings overridden from a JSON object. Missing
/// fields keep their defaults.
#[cfg(all(target_arch = "wasm32", feature = "serde_json"))]
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    let config = Config::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    web::boot(config)
}
