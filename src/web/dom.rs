//! DOM-backed presenter: screens are toggled with the `active` class, targets
//! are `img.mole` elements inside `.hole` divs, audio cues are `<audio>`
//! elements looked up by id.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlAudioElement, HtmlElement, HtmlImageElement};

use crate::board::TargetKind;
use crate::error::PresenterError;
use crate::presenter::{
    Counters, Cue, HammerPosition, Presenter, RoundSummary, Screen, TargetVisual, VolumeLevel,
};

// Image variants per category; indexed by `variant % len`. Paths are relative
// to the host page.
const GOOD_IMAGES: &[&str] = &["img/SPEAKI_SENYUM_1.webp", "img/SPEAKI_SENYUM_1.webp"];
const BAD_IMAGES: &[&str] = &["img/sinbe11.webp", "img/sinbe11.webp"];
const GOOD_HIT_IMAGES: &[&str] = &[
    "img/SPEAKI_TERGANTUNG_ORANGNYA.webp",
    "img/SPEAKI_TERGANTUNG_ORANGNYA.webp",
];
const BAD_HIT_IMAGES: &[&str] = &["img/sinbe22.webp", "img/sinbe22.webp"];

fn image_for(kind: TargetKind, variant: u8, hit: bool) -> &'static str {
    let set = match (kind, hit) {
        (TargetKind::Good, false) => GOOD_IMAGES,
        (TargetKind::Bad, false) => BAD_IMAGES,
        (TargetKind::Good, true) => GOOD_HIT_IMAGES,
        (TargetKind::Bad, true) => BAD_HIT_IMAGES,
    };
    set[variant as usize % set.len()]
}

fn cue_element_id(cue: Cue) -> &'static str {
    match cue {
        Cue::Appear => "mole-appear-sound",
        Cue::GoodHit => "good-hit-sound",
        Cue::BadHit => "bad-hit-sound",
        Cue::Ambience => "bg-music",
        Cue::GoodSpawn => "good-spawn-sound",
        Cue::BadSpawn => "bad-spawn-sound",
    }
}

pub(crate) fn element(doc: &Document, id: &str) -> Result<Element, JsValue> {
    doc.get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))
}

fn set_active(el: &Element, active: bool) {
    let _ = el.class_list().toggle_with_force("active", active);
}

fn set_text(el: &Element, value: impl ToString) {
    el.set_text_content(Some(&value.to_string()));
}

pub struct DomPresenter {
    main_menu: Element,
    game_screen: Element,
    how_to_screen: Element,
    game_over_modal: Element,

    time: Element,
    score: Element,
    lives: Element,
    bad_hits: Element,
    high_score: Element,

    final_score: Element,
    best_score: Element,
    time_left: Element,
    game_over_message: Element,

    moles: Vec<HtmlImageElement>,
    hammer: HtmlElement,
    pause_button: Element,
    sound_icon: Element,
    sounds: Vec<(Cue, HtmlAudioElement)>,
    // shared handler for rejected `play()` promises (autoplay policy etc.)
    on_play_rejected: Closure<dyn FnMut(JsValue)>,
}

impl DomPresenter {
    pub fn bind(doc: &Document, moles: Vec<HtmlImageElement>) -> Result<Self, JsValue> {
        let mut sounds = Vec::with_capacity(Cue::ALL.len());
        for cue in Cue::ALL {
            let audio: HtmlAudioElement = element(doc, cue_element_id(cue))?.dyn_into()?;
            sounds.push((cue, audio));
        }
        let on_play_rejected = Closure::wrap(Box::new(move |err: JsValue| {
            log::warn!("audio playback rejected: {err:?}");
        }) as Box<dyn FnMut(JsValue)>);

        Ok(Self {
            main_menu: element(doc, "main-menu")?,
            game_screen: element(doc, "game-screen")?,
            how_to_screen: element(doc, "how-to-screen")?,
            game_over_modal: element(doc, "game-over-modal")?,
            time: element(doc, "time")?,
            score: element(doc, "score")?,
            lives: element(doc, "lives")?,
            bad_hits: element(doc, "bad-hits")?,
            high_score: element(doc, "high-score")?,
            final_score: element(doc, "final-score")?,
            best_score: element(doc, "best-score")?,
            time_left: element(doc, "time-left")?,
            game_over_message: element(doc, "game-over-message")?,
            moles,
            hammer: element(doc, "hammer")?.dyn_into()?,
            pause_button: element(doc, "pause-game")?,
            sound_icon: element(doc, "sound-icon")?,
            sounds,
            on_play_rejected,
        })
    }

    fn audio(&self, cue: Cue) -> Option<&HtmlAudioElement> {
        self.sounds.iter().find(|(c, _)| *c == cue).map(|(_, a)| a)
    }
}

impl Presenter for DomPresenter {
    fn show_target(&mut self, slot: usize, kind: TargetKind, variant: u8, visual: TargetVisual) {
        let Some(mole) = self.moles.get(slot) else {
            return;
        };
        mole.set_src(image_for(kind, variant, visual == TargetVisual::Hit));
        let category = if kind.is_good() { "good" } else { "bad" };
        let class = match visual {
            TargetVisual::Appearing | TargetVisual::Hiding => format!("mole {category}"),
            TargetVisual::Idle => format!("mole {category} active"),
            TargetVisual::Hit => format!("mole {category} active hit"),
        };
        mole.set_class_name(&class);
        let _ = mole.style().set_property("display", "block");
    }

    fn set_target_visual(&mut self, slot: usize, visual: TargetVisual) {
        let Some(mole) = self.moles.get(slot) else {
            return;
        };
        let classes = mole.class_list();
        let _ = match visual {
            TargetVisual::Appearing | TargetVisual::Hiding => classes.remove_1("active"),
            TargetVisual::Idle => classes.add_1("active"),
            TargetVisual::Hit => classes.add_1("hit"),
        };
    }

    fn hide_target(&mut self, slot: usize) {
        if let Some(mole) = self.moles.get(slot) {
            let _ = mole.class_list().remove_2("active", "hit");
            let _ = mole.style().set_property("display", "none");
        }
    }

    fn update_counters(&mut self, counters: &Counters) {
        set_text(&self.time, counters.time_left);
        set_text(&self.score, counters.score);
        set_text(&self.lives, counters.lives);
        set_text(&self.bad_hits, counters.bad_hits);
        set_text(&self.high_score, counters.high_score);
    }

    fn show_screen(&mut self, screen: Screen) {
        match screen {
            Screen::Menu => {
                set_active(&self.game_screen, false);
                set_active(&self.how_to_screen, false);
                set_active(&self.game_over_modal, false);
                set_active(&self.main_menu, true);
            }
            Screen::Play => {
                set_active(&self.main_menu, false);
                set_active(&self.how_to_screen, false);
                set_active(&self.game_over_modal, false);
                set_active(&self.game_screen, true);
            }
            Screen::Instructions => {
                set_active(&self.main_menu, false);
                set_active(&self.how_to_screen, true);
            }
            Screen::GameOver => set_active(&self.game_over_modal, true),
        }
    }

    fn show_summary(&mut self, summary: &RoundSummary) {
        set_text(&self.final_score, summary.final_score);
        set_text(&self.best_score, summary.best_score);
        set_text(&self.time_left, summary.time_left);
        let (title, hint) = summary.reason.headline();
        self.game_over_message
            .set_inner_html(&format!("{title}<br>{hint}"));
    }

    fn set_pause_indicator(&mut self, paused: bool) {
        let html = if paused {
            "<i class=\"fas fa-play\"></i> RESUME"
        } else {
            "<i class=\"fas fa-pause\"></i> PAUSE"
        };
        self.pause_button.set_inner_html(html);
    }

    fn play_cue(&mut self, cue: Cue) -> Result<(), PresenterError> {
        let audio = self.audio(cue).ok_or_else(|| PresenterError::Audio {
            cue,
            reason: "no audio element".into(),
        })?;
        audio.set_current_time(0.0);
        let promise: js_sys::Promise = audio.play().map_err(|e| PresenterError::Audio {
            cue,
            reason: format!("{e:?}"),
        })?;
        let _ = promise.catch(&self.on_play_rejected);
        Ok(())
    }

    fn stop_cue(&mut self, cue: Cue) {
        if let Some(audio) = self.audio(cue) {
            let _ = audio.pause();
            // ambience resumes where it left off
            if cue != Cue::Ambience {
                audio.set_current_time(0.0);
            }
        }
    }

    fn set_volume(&mut self, volume: f32, level: VolumeLevel) {
        for (_, audio) in &self.sounds {
            audio.set_volume(volume as f64);
        }
        let icon = match level {
            VolumeLevel::Muted => "fas fa-volume-mute",
            VolumeLevel::Low => "fas fa-volume-down",
            VolumeLevel::High => "fas fa-volume-up",
        };
        self.sound_icon.set_class_name(icon);
    }

    fn move_hammer(&mut self, position: HammerPosition) {
        let style = self.hammer.style();
        let _ = style.set_property("left", &format!("{}px", position.x));
        let _ = style.set_property("top", &format!("{}px", position.y));
    }

    fn swing_hammer(&mut self, swinging: bool) {
        let _ = self.hammer.class_list().toggle_with_force("swing", swinging);
    }
}
