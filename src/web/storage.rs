use web_sys::{Storage, window};

use crate::error::StoreError;
use crate::store::{HIGH_SCORE_KEY, ScoreStore, parse_high_score};

/// High score in `window.localStorage`. Private browsing modes may refuse
/// storage entirely; the store then reports `Unavailable` on every call.
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn open() -> Self {
        let storage = window().and_then(|w| w.local_storage().ok()).flatten();
        if storage.is_none() {
            log::warn!("localStorage unavailable; high score will not persist");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StoreError> {
        self.storage.as_ref().ok_or(StoreError::Unavailable)
    }
}

impl ScoreStore for LocalStorageStore {
    fn load_high_score(&self) -> Result<Option<i64>, StoreError> {
        let raw = self
            .storage()?
            .get_item(HIGH_SCORE_KEY)
            .map_err(|e| StoreError::Rejected(format!("{e:?}")))?;
        raw.as_deref().map(parse_high_score).transpose()
    }

    fn save_high_score(&mut self, score: i64) -> Result<(), StoreError> {
        self.storage()?
            .set_item(HIGH_SCORE_KEY, &score.to_string())
            .map_err(|e| StoreError::Rejected(format!("{e:?}")))
    }
}
