// Browser tests: `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;
use whack_mole::store::HIGH_SCORE_KEY;
use whack_mole::web::LocalStorageStore;
use whack_mole::{EndReason, Game, MemoryStore, RecordingPresenter, ScoreStore, StoreError};

wasm_bindgen_test_configure!(run_in_browser);

fn local_storage() -> web_sys::Storage {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .expect("localStorage")
}

#[wasm_bindgen_test]
fn high_score_key_is_stable() {
    let storage = local_storage();
    storage.set_item(HIGH_SCORE_KEY, "75").expect("set");
    assert_eq!(
        storage.get_item("whackMoleHighScore").expect("get"),
        Some("75".to_string())
    );
    storage.remove_item(HIGH_SCORE_KEY).expect("remove");
}

#[wasm_bindgen_test]
fn local_storage_store_round_trip() {
    local_storage().remove_item(HIGH_SCORE_KEY).expect("remove");
    let mut store = LocalStorageStore::open();
    assert_eq!(store.load_high_score(), Ok(None));
    store.save_high_score(130).expect("save");
    assert_eq!(store.load_high_score(), Ok(Some(130)));
    assert_eq!(
        local_storage().get_item(HIGH_SCORE_KEY).expect("get"),
        Some("130".to_string())
    );
    local_storage().remove_item(HIGH_SCORE_KEY).expect("remove");
}

#[wasm_bindgen_test]
fn corrupt_stored_value_is_reported() {
    local_storage().set_item(HIGH_SCORE_KEY, "abc").expect("set");
    let store = LocalStorageStore::open();
    assert_eq!(
        store.load_high_score(),
        Err(StoreError::Corrupt("abc".to_string()))
    );
    local_storage().remove_item(HIGH_SCORE_KEY).expect("remove");
}

#[wasm_bindgen_test]
fn headless_round_runs_in_browser() {
    let mut g = Game::new(
        whack_mole::Config {
            good_probability: 0.0,
            max_bad_hits: 1,
            ..Default::default()
        },
        RecordingPresenter::new(),
        MemoryStore::new(),
        9,
    )
    .expect("valid config");
    g.start();
    let slot = g
        .board()
        .slots()
        .position(|s| s.is_whackable())
        .expect("target up");
    g.resolve(slot);
    g.advance_to(300);
    assert_eq!(
        g.last_summary().map(|s| s.reason),
        Some(EndReason::BadHitsExceeded)
    );
    assert_eq!(g.store().load_high_score(), Ok(None));
}

const PAGE: &str = r#"
<div id="main-menu"><button id="start-game"></button><button id="how-to-play"></button></div>
<div id="how-to-screen"><button id="back-from-howto"></button></div>
<div id="game-screen">
  <span id="time"></span><span id="score"></span><span id="lives"></span>
  <span id="bad-hits"></span><span id="high-score"></span>
  <button id="pause-game"></button><button id="back-menu"></button>
  <input id="volume-slider" type="range" min="0" max="100"><i id="sound-icon"></i>
  <div class="game-board"><div class="holes-container"></div><div id="hammer"></div></div>
</div>
<div id="game-over-modal">
  <span id="final-score"></span><span id="best-score"></span><span id="time-left"></span>
  <p id="game-over-message"></p>
  <button id="play-again"></button><button id="back-to-menu"></button>
</div>
<audio id="mole-appear-sound"></audio><audio id="good-hit-sound"></audio>
<audio id="bad-hit-sound"></audio><audio id="bg-music"></audio>
<audio id="good-spawn-sound"></audio><audio id="bad-spawn-sound"></audio>
"#;

#[wasm_bindgen_test]
fn start_game_binds_the_page() {
    let doc = web_sys::window()
        .and_then(|w| w.document())
        .expect("document");
    doc.body().expect("body").set_inner_html(PAGE);

    whack_mole::start_game().expect("boot");

    let container = doc
        .query_selector(".holes-container")
        .expect("query")
        .expect("container");
    assert_eq!(container.child_element_count(), 9);
    let menu = doc.get_element_by_id("main-menu").expect("menu");
    assert!(menu.class_list().contains("active"));
    let time = doc.get_element_by_id("time").expect("time");
    assert_eq!(time.text_content().as_deref(), Some("90"));
}
