//! Game core: one owned `Game` holding the round state, the board, the round
//! state machine and the timeline of pending deadlines.
//!
//! Nothing in here blocks or reads a wall clock. The driver (the web shell's
//! animation-frame loop, or a test) calls [`Game::advance_to`] with a
//! monotonic millisecond timestamp and forwards player input; every wait is a
//! named [`Deferred`] entry that can be cancelled on state transitions.

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::{Board, TargetKind, visible_duration_ms};
use crate::config::{Config, ConfigError};
use crate::fsm::{EndReason, RoundAction, RoundFsm, RoundPhase};
use crate::presenter::{
    Bounds, Counters, Cue, HammerPosition, Presenter, RoundSummary, Screen, TargetVisual,
    VolumeLevel,
};
use crate::store::ScoreStore;
use crate::timeline::{DeadlineId, Deferred, Due, Timeline};

/// Mutable round record.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub score: i64,
    pub time_left: u32,
    /// Displayed only; nothing decrements it.
    pub lives: u32,
    pub bad_hits: u32,
    pub high_score: i64,
    pub volume: f32,
    /// Set the instant the round is decided but the end is still being shown.
    pub pending_end: Option<EndReason>,
}

impl GameState {
    fn fresh(config: &Config, high_score: i64) -> Self {
        Self {
            score: 0,
            time_left: config.round_secs,
            lives: config.starting_lives,
            bad_hits: 0,
            high_score,
            volume: config.default_volume.clamp(0.0, 1.0),
            pending_end: None,
        }
    }
}

pub struct Game<P: Presenter, S: ScoreStore> {
    config: Config,
    state: GameState,
    board: Board,
    timeline: Timeline,
    fsm: RoundFsm,
    screen: Screen,
    rng: SmallRng,
    presenter: P,
    store: S,
    clock: Option<DeadlineId>,
    pending_spawn: Option<DeadlineId>,
    hammer_reset: Option<DeadlineId>,
    last_summary: Option<RoundSummary>,
}

impl<P: Presenter, S: ScoreStore> Game<P, S> {
    /// Build a game and load the persisted high score. A missing or unreadable
    /// score starts from 0.
    pub fn new(config: Config, presenter: P, store: S, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let high_score = match store.load_high_score() {
            Ok(Some(score)) => score,
            Ok(None) => 0,
            Err(e) => {
                warn!("high score unavailable, starting from 0: {e}");
                0
            }
        };
        Ok(Self {
            state: GameState::fresh(&config, high_score),
            board: Board::new(config.slot_count),
            timeline: Timeline::new(),
            fsm: RoundFsm::new(),
            screen: Screen::Menu,
            rng: SmallRng::seed_from_u64(seed),
            presenter,
            store,
            clock: None,
            pending_spawn: None,
            hammer_reset: None,
            last_summary: None,
            config,
        })
    }

    /// Initial render: menu screen, counters, volume.
    pub fn boot(&mut self) {
        self.show_screen(Screen::Menu);
        self.render_counters();
        let volume = self.state.volume;
        self.presenter
            .set_volume(volume, VolumeLevel::for_volume(volume));
    }

    // --- Accessors -----------------------------------------------------------

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> RoundPhase {
        self.fsm.phase()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn now_ms(&self) -> u64 {
        self.timeline.now_ms()
    }

    pub fn is_playing(&self) -> bool {
        self.fsm.is_playing()
    }

    pub fn is_paused(&self) -> bool {
        self.fsm.is_paused()
    }

    pub fn last_summary(&self) -> Option<&RoundSummary> {
        self.last_summary.as_ref()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn counters(&self) -> Counters {
        Counters {
            time_left: self.state.time_left,
            score: self.state.score,
            lives: self.state.lives,
            bad_hits: self.state.bad_hits,
            high_score: self.state.high_score,
        }
    }

    /// Playing, unpaused and not already decided.
    fn is_live(&self) -> bool {
        self.fsm.phase() == RoundPhase::Playing && self.state.pending_end.is_none()
    }

    // --- Time ----------------------------------------------------------------

    /// Run every deadline due at or before `now_ms`, in order, then settle the
    /// clock at `now_ms`. Timestamps older than the current time are ignored.
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some(due) = self.timeline.pop_due(now_ms) {
            self.timeline.set_now(due.at_ms);
            self.dispatch(due);
        }
        self.timeline.set_now(now_ms);
    }

    fn dispatch(&mut self, due: Due) {
        match due.action {
            Deferred::ClockTick => {
                if self.clock != Some(due.id) {
                    return;
                }
                // re-arm first so an ending tick can cancel it
                self.clock = Some(self.timeline.schedule_in(self.config.tick_ms, Deferred::ClockTick));
                self.tick();
            }
            Deferred::Reveal(slot) => {
                if self.board.slot(slot).is_some_and(|s| s.is_whackable()) {
                    self.presenter.set_target_visual(slot, TargetVisual::Idle);
                }
            }
            Deferred::AutoHide(slot) => {
                if self.release_slot_deadline(slot, due.id)
                    && self.board.slot(slot).is_some_and(|s| s.is_active() && !s.is_hit())
                {
                    self.hide(slot);
                }
            }
            Deferred::FinishHide(slot) => {
                if self.release_slot_deadline(slot, due.id) {
                    self.finish_hide(slot);
                }
            }
            Deferred::HitHide(slot) => {
                if self.release_slot_deadline(slot, due.id) {
                    self.hide(slot);
                }
            }
            Deferred::SpawnNext => {
                if self.pending_spawn == Some(due.id) {
                    self.pending_spawn = None;
                    self.spawn();
                }
            }
            Deferred::EndRound(reason) => {
                self.end(reason);
            }
            Deferred::HammerReset => {
                if self.hammer_reset == Some(due.id) {
                    self.hammer_reset = None;
                    self.presenter.swing_hammer(false);
                }
            }
        }
    }

    /// Schedule the single lifecycle deadline of a slot, replacing any older one.
    fn set_slot_deadline(&mut self, slot: usize, delay_ms: u64, action: Deferred) {
        let id = self.timeline.schedule_in(delay_ms, action);
        if let Some(s) = self.board.slot_mut(slot) {
            if let Some(old) = s.deadline.replace(id) {
                self.timeline.cancel(old);
            }
        }
    }

    fn release_slot_deadline(&mut self, slot: usize, id: DeadlineId) -> bool {
        match self.board.slot_mut(slot) {
            Some(s) if s.deadline == Some(id) => {
                s.deadline = None;
                true
            }
            _ => false,
        }
    }

    // --- Clock ---------------------------------------------------------------

    fn start_clock(&mut self) {
        self.stop_clock();
        self.clock = Some(self.timeline.schedule_in(self.config.tick_ms, Deferred::ClockTick));
    }

    fn stop_clock(&mut self) {
        if let Some(id) = self.clock.take() {
            self.timeline.cancel(id);
        }
    }

    /// One countdown step. Ignored unless playing, unpaused and undecided, so
    /// a round already lost to bad hits keeps that reason.
    pub fn tick(&mut self) {
        if !self.is_live() {
            return;
        }
        self.state.time_left = self.state.time_left.saturating_sub(1);
        self.render_counters();
        if self.state.time_left == 0 {
            self.end(EndReason::TimeExpired);
        }
    }

    // --- Spawner -------------------------------------------------------------

    /// Put a new target into a random free slot. Returns the slot used, or
    /// `None` when not playing or every slot is taken.
    pub fn spawn(&mut self) -> Option<usize> {
        if !self.is_live() {
            return None;
        }
        let free = self.board.inactive_indices();
        if free.is_empty() {
            return None;
        }
        let slot = free[self.rng.gen_range(0..free.len())];
        let kind = if self.rng.gen_bool(self.config.good_probability) {
            TargetKind::Good
        } else {
            TargetKind::Bad
        };
        let variant = self.rng.gen_range(0..self.config.image_variants.max(1));
        let visible_ms = visible_duration_ms(self.state.score, self.state.time_left, &self.config);

        self.board.activate(slot, kind, variant);
        self.play(Cue::spawn_for(kind));
        self.presenter
            .show_target(slot, kind, variant, TargetVisual::Appearing);
        self.timeline
            .schedule_in(self.config.reveal_delay_ms, Deferred::Reveal(slot));
        self.set_slot_deadline(slot, visible_ms.round() as u64, Deferred::AutoHide(slot));
        debug!("spawned {kind:?} target in slot {slot} for {visible_ms:.0}ms");
        Some(slot)
    }

    fn schedule_spawn(&mut self) {
        if self.pending_spawn.is_some() {
            return;
        }
        self.pending_spawn = Some(
            self.timeline
                .schedule_in(self.config.respawn_delay_ms, Deferred::SpawnNext),
        );
    }

    /// Start retreating a target. The slot is freed after the settle delay.
    pub fn hide(&mut self, slot: usize) {
        if !self.board.begin_hiding(slot) {
            return;
        }
        self.presenter.set_target_visual(slot, TargetVisual::Hiding);
        self.set_slot_deadline(slot, self.config.hide_settle_ms, Deferred::FinishHide(slot));
    }

    fn finish_hide(&mut self, slot: usize) {
        if !self.board.deactivate(slot) {
            return;
        }
        self.presenter.hide_target(slot);
        if self.is_live() {
            self.schedule_spawn();
        }
    }

    /// Clear the board at once and drop every round-scoped deadline.
    pub fn hide_all(&mut self) {
        let dropped = self.timeline.cancel_where(Deferred::is_round_scoped);
        self.pending_spawn = None;
        for slot in self.board.clear() {
            self.presenter.hide_target(slot);
        }
        if dropped > 0 {
            debug!("cancelled {dropped} pending deadlines");
        }
    }

    // --- Input ---------------------------------------------------------------

    /// Resolve a click on `slot`. Returns the kind that was hit, or `None`
    /// when the click did nothing.
    pub fn resolve(&mut self, slot: usize) -> Option<TargetKind> {
        if !self.is_live() {
            return None;
        }
        let kind = self.board.mark_hit(slot)?;
        match kind {
            TargetKind::Good => {
                self.state.score += self.config.good_points;
            }
            TargetKind::Bad => {
                self.state.score -= self.config.bad_penalty;
                self.state.bad_hits += 1;
                if self.state.bad_hits >= self.config.max_bad_hits {
                    self.state.pending_end = Some(EndReason::BadHitsExceeded);
                    self.timeline.schedule_in(
                        self.config.game_over_delay_ms,
                        Deferred::EndRound(EndReason::BadHitsExceeded),
                    );
                }
            }
        }
        let variant = self.board.slot(slot).map_or(0, |s| s.variant());

        self.presenter.stop_cue(Cue::GoodSpawn);
        self.presenter.stop_cue(Cue::BadSpawn);
        self.play(Cue::hit_for(kind));
        self.presenter
            .show_target(slot, kind, variant, TargetVisual::Hit);
        self.render_counters();
        self.set_slot_deadline(slot, self.config.hit_display_ms, Deferred::HitHide(slot));
        debug!(
            "hit {kind:?} in slot {slot}: score={} bad_hits={}",
            self.state.score, self.state.bad_hits
        );
        Some(kind)
    }

    /// Slider input in `[0, 100]`.
    pub fn set_volume_percent(&mut self, percent: f64) {
        let volume = (percent.clamp(0.0, 100.0) / 100.0) as f32;
        self.state.volume = volume;
        self.presenter
            .set_volume(volume, VolumeLevel::for_volume(volume));
    }

    /// Follow-cursor hammer. Cosmetic.
    pub fn pointer_moved(&mut self, client_x: f64, client_y: f64, board: Bounds) {
        if !self.fsm.is_playing() {
            return;
        }
        self.presenter
            .move_hammer(HammerPosition::follow(client_x, client_y, board));
    }

    /// Hammer swing on any click during live play. Cosmetic.
    pub fn pointer_pressed(&mut self) {
        if self.fsm.phase() != RoundPhase::Playing {
            return;
        }
        if let Some(old) = self.hammer_reset.take() {
            self.timeline.cancel(old);
        }
        self.presenter.swing_hammer(true);
        self.hammer_reset = Some(
            self.timeline
                .schedule_in(self.config.hammer_swing_ms, Deferred::HammerReset),
        );
    }

    // --- Round lifecycle -----------------------------------------------------

    pub fn start(&mut self) -> bool {
        self.begin_round(RoundAction::Start)
    }

    /// Leave the game-over overlay and play again.
    pub fn restart(&mut self) -> bool {
        self.begin_round(RoundAction::Restart)
    }

    fn begin_round(&mut self, action: RoundAction) -> bool {
        if !self.fsm.transition(action).success {
            return false;
        }
        self.hide_all();
        self.state = GameState {
            volume: self.state.volume,
            ..GameState::fresh(&self.config, self.state.high_score)
        };
        self.last_summary = None;

        self.show_screen(Screen::Play);
        self.presenter.set_pause_indicator(false);
        self.render_counters();
        self.start_clock();
        self.spawn();
        self.play(Cue::Ambience);
        info!("round started ({}s)", self.config.round_secs);
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.fsm.transition(RoundAction::Pause).success {
            return false;
        }
        self.presenter.set_pause_indicator(true);
        self.presenter.stop_cue(Cue::Ambience);
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.fsm.transition(RoundAction::Resume).success {
            return false;
        }
        self.presenter.set_pause_indicator(false);
        self.play(Cue::Ambience);
        // a target that retreated during the pause left nothing to respawn it
        if self.is_live() && self.board.active_count() == 0 {
            self.schedule_spawn();
        }
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.fsm.phase() {
            RoundPhase::Playing => self.pause(),
            RoundPhase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Finish the round. `Abandoned` is the same as [`Game::return_to_menu`].
    pub fn end(&mut self, reason: EndReason) -> bool {
        if reason == EndReason::Abandoned {
            return self.return_to_menu();
        }
        if !self.fsm.transition(RoundAction::End).success {
            return false;
        }
        self.stop_clock();
        self.hide_all();
        self.presenter.stop_cue(Cue::Ambience);
        let new_high_score = self.record_high_score();

        let summary = RoundSummary {
            reason,
            final_score: self.state.score,
            best_score: self.state.high_score,
            time_left: self.state.time_left,
            new_high_score,
        };
        self.last_summary = Some(summary);
        self.render_counters();
        self.presenter.show_summary(&summary);
        self.show_screen(Screen::GameOver);
        info!(
            "round over ({}): score={} best={}",
            reason.as_str(),
            summary.final_score,
            summary.best_score
        );
        true
    }

    /// Abandon a live round, or dismiss the game-over overlay, and go to the
    /// menu. The high score is not touched.
    pub fn return_to_menu(&mut self) -> bool {
        let transition = self.fsm.transition(RoundAction::ReturnToMenu);
        if !transition.success {
            return false;
        }
        self.stop_clock();
        self.hide_all();
        self.presenter.stop_cue(Cue::Ambience);
        self.presenter.set_pause_indicator(false);
        self.show_screen(Screen::Menu);
        if transition.from != RoundPhase::Ended {
            info!("round abandoned at score {}", self.state.score);
        }
        true
    }

    /// Menu button outside a round; inside one it abandons the round.
    pub fn show_menu(&mut self) {
        if self.fsm.phase() == RoundPhase::Idle {
            self.show_screen(Screen::Menu);
        } else {
            self.return_to_menu();
        }
    }

    pub fn show_instructions(&mut self) -> bool {
        if self.fsm.phase() != RoundPhase::Idle {
            return false;
        }
        self.show_screen(Screen::Instructions);
        true
    }

    // --- Helpers -------------------------------------------------------------

    fn record_high_score(&mut self) -> bool {
        if self.state.score <= self.state.high_score {
            return false;
        }
        self.state.high_score = self.state.score;
        if let Err(e) = self.store.save_high_score(self.state.high_score) {
            warn!("could not persist high score {}: {e}", self.state.high_score);
        }
        info!("new high score {}", self.state.high_score);
        true
    }

    fn play(&mut self, cue: Cue) {
        if self.state.volume <= 0.0 {
            return;
        }
        if let Err(e) = self.presenter.play_cue(cue) {
            warn!("{e}");
        }
    }

    fn show_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.presenter.show_screen(screen);
    }

    fn render_counters(&mut self) {
        let counters = self.counters();
        self.presenter.update_counters(&counters);
    }
}
