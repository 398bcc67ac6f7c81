// Integration tests (native) for the `whack-mole` crate.
// Whole rounds are driven through the public `Game` API with a recording
// presenter and an in-memory store, on a virtual clock.

use whack_mole::timeline::Deferred;
use whack_mole::{
    Config, EndReason, Game, MemoryStore, RecordingPresenter, RoundPhase, Screen, ScoreStore,
    TargetKind,
};

const STEP_MS: u64 = 10;

fn config(good_probability: f64) -> Config {
    Config {
        good_probability,
        ..Config::default()
    }
}

fn new_game<S: ScoreStore>(config: Config, store: S) -> Game<RecordingPresenter, S> {
    Game::new(config, RecordingPresenter::new(), store, 42).expect("valid config")
}

/// Step the clock until a target can be hit, then hit it.
fn hit_next<S: ScoreStore>(g: &mut Game<RecordingPresenter, S>) -> TargetKind {
    let deadline = g.now_ms() + 10_000;
    while g.now_ms() < deadline {
        let slot = g.board().slots().position(|s| s.is_whackable());
        if let Some(slot) = slot {
            return g.resolve(slot).expect("whackable target resolves");
        }
        let next = g.now_ms() + STEP_MS;
        g.advance_to(next);
    }
    panic!("no target appeared within 10s");
}

#[test]
fn three_bad_hits_end_the_round() {
    let mut g = new_game(config(0.0), MemoryStore::new());
    g.start();
    for _ in 0..3 {
        assert_eq!(hit_next(&mut g), TargetKind::Bad);
    }
    assert_eq!(g.state().score, -30);
    assert_eq!(g.state().bad_hits, 3);
    assert_eq!(g.state().pending_end, Some(EndReason::BadHitsExceeded));
    assert_eq!(g.phase(), RoundPhase::Playing, "end is shown after a short delay");

    let decided_at = g.now_ms();
    g.advance_to(decided_at + 300);
    assert_eq!(g.phase(), RoundPhase::Ended);
    let summary = g.last_summary().copied().expect("summary");
    assert_eq!(summary.reason, EndReason::BadHitsExceeded);
    assert_eq!(summary.final_score, -30);
    assert_eq!(summary.best_score, 0);
    assert!(!summary.new_high_score);
    assert_eq!(g.store().writes, 0);
    assert_eq!(g.presenter().last_screen(), Some(Screen::GameOver));
}

#[test]
fn untouched_round_expires_after_ninety_seconds() {
    let mut g = new_game(config(1.0), MemoryStore::new());
    g.start();
    g.advance_to(89_999);
    assert_eq!(g.phase(), RoundPhase::Playing);
    assert_eq!(g.state().time_left, 1);
    g.advance_to(90_000);
    assert_eq!(g.phase(), RoundPhase::Ended);
    assert_eq!(g.state().time_left, 0);
    let summary = g.last_summary().copied().expect("summary");
    assert_eq!(summary.reason, EndReason::TimeExpired);
    assert_eq!(summary.final_score, 0);
    assert_eq!(g.board().active_count(), 0);
    assert!(!g.timeline().any(Deferred::is_round_scoped));
}

#[test]
fn pause_freezes_the_countdown() {
    let mut g = new_game(config(0.7), MemoryStore::new());
    g.start();
    g.advance_to(10_000);
    assert_eq!(g.state().time_left, 80);
    assert!(g.pause());
    g.advance_to(15_000);
    assert_eq!(g.state().time_left, 80);
    assert!(g.resume());
    g.advance_to(15_999);
    assert_eq!(g.state().time_left, 80);
    g.advance_to(16_000);
    assert_eq!(g.state().time_left, 79);
}

#[test]
fn clicks_are_ignored_while_paused() {
    let mut g = new_game(config(1.0), MemoryStore::new());
    g.start();
    let slot = g
        .board()
        .slots()
        .position(|s| s.is_active())
        .expect("target up");
    g.advance_to(50);
    g.pause();
    assert_eq!(g.resolve(slot), None);
    assert_eq!(g.state().score, 0);
}

#[test]
fn resume_restarts_spawning_after_board_emptied_during_pause() {
    let mut g = new_game(config(0.7), MemoryStore::new());
    g.start();
    g.advance_to(100);
    g.pause();
    g.advance_to(5_000);
    assert_eq!(g.board().active_count(), 0, "target retreated while paused");

    g.resume();
    g.advance_to(5_499);
    assert_eq!(g.board().active_count(), 0);
    g.advance_to(5_500);
    assert_eq!(g.board().active_count(), 1);
}

#[test]
fn at_most_one_target_per_cycle() {
    let mut g = new_game(config(0.7), MemoryStore::new());
    g.start();
    let mut now = 0;
    while g.phase() == RoundPhase::Playing && now < 90_000 {
        assert!(g.board().active_count() <= 1, "two targets up at {now}ms");
        // hit good targets to keep the round going; leave bad ones alone
        let good = g
            .board()
            .slots()
            .position(|s| s.is_whackable() && s.is_good());
        if let Some(slot) = good {
            g.resolve(slot);
        }
        now += STEP_MS;
        g.advance_to(now);
    }
    assert!(g.state().score > 0);
    assert_eq!(g.state().bad_hits, 0);
}

#[test]
fn high_score_persists_and_never_decreases() {
    let mut store = MemoryStore::new();
    {
        let mut g = new_game(config(1.0), &mut store);
        g.start();
        hit_next(&mut g);
        hit_next(&mut g);
        g.advance_to(90_000);
        let summary = g.last_summary().copied().expect("summary");
        assert_eq!(summary.final_score, 20);
        assert!(summary.new_high_score);
        assert_eq!(g.state().high_score, 20);
    }
    assert_eq!(store.raw(), Some("20"));
    assert_eq!(store.writes, 1);

    {
        let mut g = new_game(config(1.0), &mut store);
        assert_eq!(g.state().high_score, 20);
        g.start();
        hit_next(&mut g);
        g.advance_to(90_000);
        let summary = g.last_summary().copied().expect("summary");
        assert_eq!(summary.final_score, 10);
        assert_eq!(summary.best_score, 20);
        assert!(!summary.new_high_score);
    }
    assert_eq!(store.raw(), Some("20"));
    assert_eq!(store.writes, 1);
}

#[test]
fn return_to_menu_cancels_everything() {
    let mut g = new_game(config(0.7), MemoryStore::new());
    g.start();
    g.advance_to(2_050);
    g.pointer_pressed();
    assert!(g.return_to_menu());
    assert_eq!(g.phase(), RoundPhase::Idle);
    assert_eq!(g.screen(), Screen::Menu);
    assert_eq!(g.board().active_count(), 0);
    assert!(!g.timeline().any(Deferred::is_round_scoped));

    let time_left = g.state().time_left;
    g.advance_to(20_000);
    assert_eq!(g.state().time_left, time_left);
    assert_eq!(g.board().active_count(), 0);
    assert_eq!(g.store().writes, 0, "abandoning never records a score");
}

#[test]
fn restart_after_game_over_starts_fresh() {
    let mut g = new_game(config(0.0), MemoryStore::new());
    g.start();
    for _ in 0..3 {
        hit_next(&mut g);
    }
    let now = g.now_ms();
    g.advance_to(now + 300);
    assert_eq!(g.phase(), RoundPhase::Ended);

    assert!(g.restart());
    assert_eq!(g.phase(), RoundPhase::Playing);
    assert_eq!(g.state().score, 0);
    assert_eq!(g.state().bad_hits, 0);
    assert_eq!(g.state().time_left, 90);
    assert_eq!(g.state().pending_end, None);
    assert!(g.last_summary().is_none());
    assert_eq!(g.board().active_count(), 1);
}

#[test]
fn same_seed_plays_the_same_round() {
    let run = || {
        let mut g = new_game(config(0.7), MemoryStore::new());
        g.start();
        let mut spawns = Vec::new();
        for now in (0..30_000).step_by(STEP_MS as usize) {
            g.advance_to(now);
            if let Some(slot) = g.board().slots().position(|s| s.is_active()) {
                if spawns.last() != Some(&slot) {
                    spawns.push(slot);
                }
            }
        }
        spawns
    };
    assert_eq!(run(), run());
}

#[test]
fn abandoned_round_deadlines_do_not_reach_the_next_round() {
    let mut g = new_game(config(0.0), MemoryStore::new());
    g.start();
    hit_next(&mut g);
    let abandoned_at = g.now_ms();
    g.return_to_menu();

    assert!(g.start());
    let slot = g
        .board()
        .slots()
        .position(|s| s.is_active())
        .expect("fresh target");
    // the old hit-hide and clock deadlines would have fired by now
    g.advance_to(abandoned_at + 999);
    assert!(g.board().slot(slot).is_some_and(|s| s.is_whackable()));
    assert_eq!(g.state().bad_hits, 0);
    assert_eq!(g.state().time_left, 90);
}

#[test]
fn default_spawns_split_good_and_bad_and_spread_over_slots() {
    const RUNS: u64 = 4_000;
    let mut good = 0;
    let mut per_slot = [0u32; 9];
    for seed in 0..RUNS {
        let mut g = Game::new(
            Config::default(),
            RecordingPresenter::new(),
            MemoryStore::new(),
            seed,
        )
        .expect("valid config");
        g.start();
        let slot = g
            .board()
            .slots()
            .position(|s| s.is_active())
            .expect("first target");
        per_slot[slot] += 1;
        if g.board().slot(slot).is_some_and(|s| s.is_good()) {
            good += 1;
        }
    }
    let ratio = good as f64 / RUNS as f64;
    assert!((0.66..=0.74).contains(&ratio), "good ratio {ratio}");
    for (slot, count) in per_slot.iter().enumerate() {
        assert!((333..=555).contains(count), "slot {slot} chosen {count} times");
    }
}
