//! High-score persistence seam: one integer under one key.

use crate::error::StoreError;

/// Key the best score lives under.
pub const HIGH_SCORE_KEY: &str = "whackMoleHighScore";

pub trait ScoreStore {
    /// `Ok(None)` when nothing has been stored yet.
    fn load_high_score(&self) -> Result<Option<i64>, StoreError>;
    fn save_high_score(&mut self, score: i64) -> Result<(), StoreError>;
}

/// Parse a stored value. Surrounding whitespace is tolerated.
pub fn parse_high_score(raw: &str) -> Result<i64, StoreError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| StoreError::Corrupt(raw.to_string()))
}

/// In-process store for native runs and tests. Holds the raw text the way a
/// browser key-value store would.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    raw: Option<String>,
    pub writes: usize,
    pub unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            ..Self::default()
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl ScoreStore for MemoryStore {
    fn load_high_score(&self) -> Result<Option<i64>, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        self.raw.as_deref().map(parse_high_score).transpose()
    }

    fn save_high_score(&mut self, score: i64) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        self.raw = Some(score.to_string());
        self.writes += 1;
        Ok(())
    }
}

impl<S: ScoreStore + ?Sized> ScoreStore for &mut S {
    fn load_high_score(&self) -> Result<Option<i64>, StoreError> {
        (**self).load_high_score()
    }

    fn save_high_score(&mut self, score: i64) -> Result<(), StoreError> {
        (**self).save_high_score(score)
    }
}
