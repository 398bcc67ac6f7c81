//! Render surface seam. The game core never touches the DOM; it tells a
//! `Presenter` what changed and the presenter decides how to draw or play it.

use crate::board::TargetKind;
use crate::error::PresenterError;
use crate::fsm::EndReason;

/// Named screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Menu,
    Play,
    Instructions,
    /// Game-over overlay shown on top of the play screen.
    GameOver,
}

/// Named audio cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Appear,
    GoodHit,
    BadHit,
    Ambience,
    GoodSpawn,
    BadSpawn,
}

impl Cue {
    pub const ALL: [Cue; 6] = [
        Cue::Appear,
        Cue::GoodHit,
        Cue::BadHit,
        Cue::Ambience,
        Cue::GoodSpawn,
        Cue::BadSpawn,
    ];

    pub fn spawn_for(kind: TargetKind) -> Cue {
        match kind {
            TargetKind::Good => Cue::GoodSpawn,
            TargetKind::Bad => Cue::BadSpawn,
        }
    }

    pub fn hit_for(kind: TargetKind) -> Cue {
        match kind {
            TargetKind::Good => Cue::GoodHit,
            TargetKind::Bad => Cue::BadHit,
        }
    }
}

/// Visual state of a target in its hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetVisual {
    Appearing,
    Idle,
    Hit,
    Hiding,
}

/// Icon bucket for the current volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeLevel {
    Muted,
    Low,
    High,
}

impl VolumeLevel {
    pub fn for_volume(volume: f32) -> Self {
        if volume <= 0.0 {
            VolumeLevel::Muted
        } else if volume < 0.5 {
            VolumeLevel::Low
        } else {
            VolumeLevel::High
        }
    }
}

/// The four live counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Counters {
    pub time_left: u32,
    pub score: i64,
    pub lives: u32,
    pub bad_hits: u32,
    pub high_score: i64,
}

/// Final stats for the game-over overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundSummary {
    pub reason: EndReason,
    pub final_score: i64,
    pub best_score: i64,
    pub time_left: u32,
    pub new_high_score: bool,
}

// --- Hammer ------------------------------------------------------------------

pub const HAMMER_SIZE: f64 = 80.0;

/// Board rectangle in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Hammer offset relative to the board's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HammerPosition {
    pub x: f64,
    pub y: f64,
}

impl HammerPosition {
    /// Centre the hammer on the pointer and keep it inside the board.
    pub fn follow(client_x: f64, client_y: f64, board: Bounds) -> Self {
        let half = HAMMER_SIZE / 2.0;
        let x = client_x - board.left - half;
        let y = client_y - board.top - half;
        Self {
            x: x.min(board.width - HAMMER_SIZE).max(0.0),
            y: y.min(board.height - HAMMER_SIZE).max(0.0),
        }
    }
}

// --- Presenter ---------------------------------------------------------------

pub trait Presenter {
    /// Put a target of `kind` / `variant` into `slot` in the given visual state.
    fn show_target(&mut self, slot: usize, kind: TargetKind, variant: u8, visual: TargetVisual);
    fn set_target_visual(&mut self, slot: usize, visual: TargetVisual);
    fn hide_target(&mut self, slot: usize);
    fn update_counters(&mut self, counters: &Counters);
    fn show_screen(&mut self, screen: Screen);
    fn show_summary(&mut self, summary: &RoundSummary);
    /// `paused == true` means the control should now offer "resume".
    fn set_pause_indicator(&mut self, paused: bool);
    fn play_cue(&mut self, cue: Cue) -> Result<(), PresenterError>;
    fn stop_cue(&mut self, cue: Cue);
    fn set_volume(&mut self, volume: f32, level: VolumeLevel);
    fn move_hammer(&mut self, position: HammerPosition);
    fn swing_hammer(&mut self, swinging: bool);
}

/// One recorded presenter call.
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    ShowTarget {
        slot: usize,
        kind: TargetKind,
        variant: u8,
        visual: TargetVisual,
    },
    TargetVisual {
        slot: usize,
        visual: TargetVisual,
    },
    HideTarget(usize),
    Counters(Counters),
    Screen(Screen),
    Summary(RoundSummary),
    PauseIndicator(bool),
    PlayCue(Cue),
    StopCue(Cue),
    Volume(f32, VolumeLevel),
    Hammer(HammerPosition),
    Swing(bool),
}

/// Headless presenter that records every call; can be told to fail audio.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub events: Vec<PresenterEvent>,
    pub fail_audio: bool,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn played(&self) -> Vec<Cue> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::PlayCue(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    pub fn last_counters(&self) -> Option<Counters> {
        self.events.iter().rev().find_map(|e| match e {
            PresenterEvent::Counters(c) => Some(*c),
            _ => None,
        })
    }

    pub fn last_screen(&self) -> Option<Screen> {
        self.events.iter().rev().find_map(|e| match e {
            PresenterEvent::Screen(s) => Some(*s),
            _ => None,
        })
    }

    pub fn last_summary(&self) -> Option<RoundSummary> {
        self.events.iter().rev().find_map(|e| match e {
            PresenterEvent::Summary(s) => Some(*s),
            _ => None,
        })
    }
}

impl Presenter for RecordingPresenter {
    fn show_target(&mut self, slot: usize, kind: TargetKind, variant: u8, visual: TargetVisual) {
        self.events.push(PresenterEvent::ShowTarget {
            slot,
            kind,
            variant,
            visual,
        });
    }

    fn set_target_visual(&mut self, slot: usize, visual: TargetVisual) {
        self.events.push(PresenterEvent::TargetVisual { slot, visual });
    }

    fn hide_target(&mut self, slot: usize) {
        self.events.push(PresenterEvent::HideTarget(slot));
    }

    fn update_counters(&mut self, counters: &Counters) {
        self.events.push(PresenterEvent::Counters(*counters));
    }

    fn show_screen(&mut self, screen: Screen) {
        self.events.push(PresenterEvent::Screen(screen));
    }

    fn show_summary(&mut self, summary: &RoundSummary) {
        self.events.push(PresenterEvent::Summary(*summary));
    }

    fn set_pause_indicator(&mut self, paused: bool) {
        self.events.push(PresenterEvent::PauseIndicator(paused));
    }

    fn play_cue(&mut self, cue: Cue) -> Result<(), PresenterError> {
        self.events.push(PresenterEvent::PlayCue(cue));
        if self.fail_audio {
            return Err(PresenterError::Audio {
                cue,
                reason: "audio disabled".into(),
            });
        }
        Ok(())
    }

    fn stop_cue(&mut self, cue: Cue) {
        self.events.push(PresenterEvent::StopCue(cue));
    }

    fn set_volume(&mut self, volume: f32, level: VolumeLevel) {
        self.events.push(PresenterEvent::Volume(volume, level));
    }

    fn move_hammer(&mut self, position: HammerPosition) {
        self.events.push(PresenterEvent::Hammer(position));
    }

    fn swing_hammer(&mut self, swinging: bool) {
        self.events.push(PresenterEvent::Swing(swinging));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Bounds {
        Bounds {
            left: 100.0,
            top: 50.0,
            width: 600.0,
            height: 600.0,
        }
    }

    #[test]
    fn test_hammer_centres_on_pointer() {
        let pos = HammerPosition::follow(400.0, 350.0, board());
        assert_eq!(pos, HammerPosition { x: 260.0, y: 260.0 });
    }

    #[test]
    fn test_hammer_is_clamped_to_board() {
        let top_left = HammerPosition::follow(0.0, 0.0, board());
        assert_eq!(top_left, HammerPosition { x: 0.0, y: 0.0 });
        let bottom_right = HammerPosition::follow(5_000.0, 5_000.0, board());
        assert_eq!(bottom_right, HammerPosition { x: 520.0, y: 520.0 });
    }

    #[test]
    fn test_volume_level_buckets() {
        assert_eq!(VolumeLevel::for_volume(0.0), VolumeLevel::Muted);
        assert_eq!(VolumeLevel::for_volume(0.3), VolumeLevel::Low);
        assert_eq!(VolumeLevel::for_volume(0.5), VolumeLevel::High);
    }
}
