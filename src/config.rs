//! Game tuning.
//!
//! `Params` holds the fixed constants the game ships with; `Config` is the
//! runtime copy a `Game` is built from, so tests and embedders can tighten or
//! loosen individual knobs without touching the rules.

use thiserror::Error;

/// Game tuning parameters for the mole board
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Board
    pub const SLOT_COUNT: usize = 9;
    pub const IMAGE_VARIANTS: u8 = 2;

    // Round
    pub const ROUND_SECS: u32 = 90;
    pub const STARTING_LIVES: u32 = 3;
    pub const MAX_BAD_HITS: u32 = 3;
    pub const TICK_MS: u64 = 1_000;

    // Scoring
    pub const GOOD_POINTS: i64 = 10;
    pub const BAD_PENALTY: i64 = 10;
    pub const GOOD_PROBABILITY: f64 = 0.7;

    // Difficulty curve: max(MIN, BASE / (1 + score/SCORE_DIV + elapsed/TIME_DIV))
    pub const BASE_VISIBLE_MS: f64 = 1_300.0;
    pub const MIN_VISIBLE_MS: f64 = 350.0;
    pub const SCORE_DIVISOR: f64 = 200.0;
    pub const ELAPSED_DIVISOR: f64 = 60.0;

    // One-shot delays
    pub const REVEAL_DELAY_MS: u64 = 10;
    pub const HIDE_SETTLE_MS: u64 = 300;
    pub const RESPAWN_DELAY_MS: u64 = 500;
    pub const HIT_DISPLAY_MS: u64 = 300;
    pub const GAME_OVER_DELAY_MS: u64 = 300;
    pub const HAMMER_SWING_MS: u64 = 100;

    // Audio
    pub const DEFAULT_VOLUME: f32 = 0.7;
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("good_probability must be within [0, 1], got {0}")]
    Probability(f64),
    #[error("slot_count must be at least 1")]
    NoSlots,
    #[error("max_bad_hits must be at least 1")]
    NoBadHitBudget,
    #[error("base_visible_ms must be positive, got {0}")]
    VisibleDuration(f64),
    #[error("tick_ms must be positive")]
    TickInterval,
    #[error("difficulty divisors must be positive and finite, got {0}")]
    DifficultyDivisor(f64),
    #[error("min_visible_ms must be finite and not negative, got {0}")]
    MinVisibleDuration(f64),
    #[error("default_volume must be within [0, 1], got {0}")]
    Volume(f32),
    #[cfg(feature = "serde_json")]
    #[error("invalid config json: {0}")]
    Json(String),
}

/// Game configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    pub slot_count: usize,
    pub image_variants: u8,
    pub round_secs: u32,
    pub starting_lives: u32,
    pub max_bad_hits: u32,
    pub tick_ms: u64,
    pub good_points: i64,
    pub bad_penalty: i64,
    pub good_probability: f64,
    pub base_visible_ms: f64,
    pub min_visible_ms: f64,
    pub score_divisor: f64,
    pub elapsed_divisor: f64,
    pub reveal_delay_ms: u64,
    pub hide_settle_ms: u64,
    pub respawn_delay_ms: u64,
    pub hit_display_ms: u64,
    pub game_over_delay_ms: u64,
    pub hammer_swing_ms: u64,
    pub default_volume: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slot_count: Params::SLOT_COUNT,
            image_variants: Params::IMAGE_VARIANTS,
            round_secs: Params::ROUND_SECS,
            starting_lives: Params::STARTING_LIVES,
            max_bad_hits: Params::MAX_BAD_HITS,
            tick_ms: Params::TICK_MS,
            good_points: Params::GOOD_POINTS,
            bad_penalty: Params::BAD_PENALTY,
            good_probability: Params::GOOD_PROBABILITY,
            base_visible_ms: Params::BASE_VISIBLE_MS,
            min_visible_ms: Params::MIN_VISIBLE_MS,
            score_divisor: Params::SCORE_DIVISOR,
            elapsed_divisor: Params::ELAPSED_DIVISOR,
            reveal_delay_ms: Params::REVEAL_DELAY_MS,
            hide_settle_ms: Params::HIDE_SETTLE_MS,
            respawn_delay_ms: Params::RESPAWN_DELAY_MS,
            hit_display_ms: Params::HIT_DISPLAY_MS,
            game_over_delay_ms: Params::GAME_OVER_DELAY_MS,
            hammer_swing_ms: Params::HAMMER_SWING_MS,
            default_volume: Params::DEFAULT_VOLUME,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.good_probability) {
            return Err(ConfigError::Probability(self.good_probability));
        }
        if self.slot_count == 0 {
            return Err(ConfigError::NoSlots);
        }
        if self.max_bad_hits == 0 {
            return Err(ConfigError::NoBadHitBudget);
        }
        if !(self.base_visible_ms.is_finite() && self.base_visible_ms > 0.0) {
            return Err(ConfigError::VisibleDuration(self.base_visible_ms));
        }
        if !(self.min_visible_ms.is_finite() && self.min_visible_ms >= 0.0) {
            return Err(ConfigError::MinVisibleDuration(self.min_visible_ms));
        }
        for divisor in [self.score_divisor, self.elapsed_divisor] {
            if !(divisor.is_finite() && divisor > 0.0) {
                return Err(ConfigError::DifficultyDivisor(divisor));
            }
        }
        if !(0.0..=1.0).contains(&self.default_volume) {
            return Err(ConfigError::Volume(self.default_volume));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::TickInterval);
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON config; missing fields keep their defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
