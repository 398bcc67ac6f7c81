//! Browser shell: binds the DOM, owns the single `Game` instance and drives
//! it from `requestAnimationFrame`. Every event handler first advances the
//! game clock to `performance.now()` so input is resolved against the same
//! timeline the deadlines run on.

mod dom;
mod storage;

pub use dom::DomPresenter;
pub use storage::LocalStorageStore;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlImageElement, HtmlInputElement, window};

use crate::config::Config;
use crate::game::Game;
use crate::presenter::Bounds;

use dom::element;

type WebGame = Game<DomPresenter, LocalStorageStore>;

thread_local! {
    static GAME: RefCell<Option<WebGame>> = const { RefCell::new(None) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn now_ms() -> u64 {
    window()
        .and_then(|w| w.performance())
        .map_or(0, |p| p.now().max(0.0) as u64)
}

/// Advance the clock to `at_ms` and run `f` on the game. `None` before boot,
/// or if a handler fires while the game is already borrowed.
fn with_game_at<R>(at_ms: u64, f: impl FnOnce(&mut WebGame) -> R) -> Option<R> {
    GAME.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            log::warn!("game busy; dropping event");
            return None;
        };
        let game = slot.as_mut()?;
        game.advance_to(at_ms);
        Some(f(game))
    })
}

fn with_game<R>(f: impl FnOnce(&mut WebGame) -> R) -> Option<R> {
    with_game_at(now_ms(), f)
}

pub fn boot(config: Config) -> Result<(), JsValue> {
    if GAME.with(|cell| cell.borrow().is_some()) {
        log::warn!("game already started");
        return Ok(());
    }
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let container = doc
        .query_selector(".holes-container")?
        .ok_or_else(|| JsValue::from_str("missing .holes-container"))?;
    let (holes, moles) = build_holes(&doc, &container, config.slot_count)?;
    let presenter = DomPresenter::bind(&doc, moles)?;

    let mut seed = [0u8; 8];
    getrandom::getrandom(&mut seed).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let mut game = Game::new(
        config,
        presenter,
        LocalStorageStore::open(),
        u64::from_le_bytes(seed),
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    game.advance_to(now_ms());
    game.boot();

    if let Ok(slider) = element(&doc, "volume-slider")?.dyn_into::<HtmlInputElement>() {
        let percent = (game.state().volume * 100.0).round();
        slider.set_value(&percent.to_string());
    }
    GAME.with(|cell| *cell.borrow_mut() = Some(game));

    bind_controls(&doc)?;
    bind_holes(holes)?;
    bind_pointer(&doc)?;
    start_frame_loop();
    log::info!("whack-mole ready");
    Ok(())
}

/// Fill the container with one `.hole` per slot, each holding a hidden
/// `img.mole`.
fn build_holes(
    doc: &Document,
    container: &Element,
    count: usize,
) -> Result<(Vec<Element>, Vec<HtmlImageElement>), JsValue> {
    container.set_inner_html("");
    let mut holes = Vec::with_capacity(count);
    let mut moles = Vec::with_capacity(count);
    for index in 0..count {
        let hole = doc.create_element("div")?;
        hole.set_class_name("hole");
        hole.set_attribute("data-index", &index.to_string())?;
        let mole: HtmlImageElement = doc.create_element("img")?.dyn_into()?;
        mole.set_class_name("mole");
        mole.set_alt("");
        mole.style().set_property("display", "none")?;
        hole.append_child(&mole)?;
        container.append_child(&hole)?;
        holes.push(hole);
        moles.push(mole);
    }
    Ok((holes, moles))
}

// --- Listeners ---------------------------------------------------------------

fn on_click(doc: &Document, id: &str, mut handler: impl FnMut() + 'static) -> Result<(), JsValue> {
    let el = element(doc, id)?;
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
        handler();
    }) as Box<dyn FnMut(_)>);
    el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn bind_controls(doc: &Document) -> Result<(), JsValue> {
    on_click(doc, "start-game", || {
        with_game(|g| g.start());
    })?;
    on_click(doc, "how-to-play", || {
        with_game(|g| g.show_instructions());
    })?;
    on_click(doc, "back-from-howto", || {
        with_game(|g| g.show_menu());
    })?;
    on_click(doc, "pause-game", || {
        with_game(|g| g.toggle_pause());
    })?;
    on_click(doc, "back-menu", || {
        // the game must not be borrowed while the dialog is open
        let live = with_game(|g| g.is_playing()).unwrap_or(false);
        if !live {
            return;
        }
        let confirmed = window()
            .and_then(|w| {
                w.confirm_with_message("Are you sure you want to return to the main menu?")
                    .ok()
            })
            .unwrap_or(false);
        if confirmed {
            with_game(|g| g.return_to_menu());
        }
    })?;
    on_click(doc, "play-again", || {
        with_game(|g| g.restart());
    })?;
    on_click(doc, "back-to-menu", || {
        with_game(|g| g.return_to_menu());
    })?;

    let slider: HtmlInputElement = element(doc, "volume-slider")?.dyn_into()?;
    let input = slider.clone();
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
        match input.value().parse::<f64>() {
            Ok(percent) => {
                with_game(|g| g.set_volume_percent(percent));
            }
            Err(e) => log::warn!("bad volume value {:?}: {e}", input.value()),
        }
    }) as Box<dyn FnMut(_)>);
    slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn bind_holes(holes: Vec<Element>) -> Result<(), JsValue> {
    for (index, hole) in holes.into_iter().enumerate() {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_game(|g| g.resolve(index));
        }) as Box<dyn FnMut(_)>);
        hole.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn board_bounds(doc: &Document) -> Option<Bounds> {
    let board = doc.query_selector(".game-board").ok().flatten()?;
    let rect = board.get_bounding_client_rect();
    Some(Bounds {
        left: rect.left(),
        top: rect.top(),
        width: rect.width(),
        height: rect.height(),
    })
}

fn bind_pointer(doc: &Document) -> Result<(), JsValue> {
    {
        let doc_move = doc.clone();
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let Some(bounds) = board_bounds(&doc_move) else {
                return;
            };
            let (x, y) = (evt.client_x() as f64, evt.client_y() as f64);
            with_game(|g| g.pointer_moved(x, y, bounds));
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_game(|g| g.pointer_pressed());
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

// --- Frame loop --------------------------------------------------------------

fn request_frame(callback: &FrameCallback) {
    if let (Some(w), Some(cb)) = (window(), callback.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

fn start_frame_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        // frame timestamps share the performance.now() origin
        with_game_at(ts.max(0.0) as u64, |_| ());
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
}
