use thiserror::Error;

use crate::presenter::Cue;

/// Failures of the high-score store. None of these stop a round.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("score storage is unavailable")]
    Unavailable,
    #[error("score storage rejected the write: {0}")]
    Rejected(String),
    #[error("stored high score is not an integer: {0:?}")]
    Corrupt(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PresenterError {
    #[error("failed to play {cue:?} cue: {reason}")]
    Audio { cue: Cue, reason: String },
}
