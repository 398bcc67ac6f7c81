//! Mole board: a fixed row-major grid of holes ("slots") that each host at most
//! one target at a time, plus the difficulty curve that decides how long a
//! freshly spawned target stays up.

use crate::config::Config;
use crate::timeline::DeadlineId;

// --- Targets -----------------------------------------------------------------

/// Category of a spawned target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetKind {
    /// Rewarding target: hitting it scores.
    Good,
    /// Penalizing target: hitting it costs points and counts toward the bad-hit limit.
    Bad,
}

impl TargetKind {
    pub fn is_good(self) -> bool {
        matches!(self, TargetKind::Good)
    }
}

// --- Slots -------------------------------------------------------------------

/// One hole on the board.
#[derive(Clone, Debug)]
pub struct Slot {
    active: bool,      // a target currently occupies the hole
    kind: TargetKind,  // category of the current / last target
    hit: bool,         // target already resolved this appearance
    hiding: bool,      // retreat animation running, deactivation pending
    variant: u8,       // cosmetic image variant
    pub(crate) deadline: Option<DeadlineId>, // single pending slot deadline
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            active: false,
            kind: TargetKind::Good,
            hit: false,
            hiding: false,
            variant: 0,
            deadline: None,
        }
    }
}

impl Slot {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_hit(&self) -> bool {
        self.hit
    }

    pub fn is_hiding(&self) -> bool {
        self.hiding
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn is_good(&self) -> bool {
        self.kind.is_good()
    }

    pub fn variant(&self) -> u8 {
        self.variant
    }

    /// Whether a click on this slot right now would score.
    pub fn is_whackable(&self) -> bool {
        self.active && !self.hit && !self.hiding
    }
}

// --- Board -------------------------------------------------------------------

/// Runtime board state.
#[derive(Clone, Debug)]
pub struct Board {
    slots: Vec<Slot>,
}

impl Board {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![Slot::default(); slot_count],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.slots.get_mut(index)
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    /// Indices of every slot that could take a new target.
    pub fn inactive_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.active)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// Place a fresh target. Refuses slots that are already occupied.
    pub(crate) fn activate(&mut self, index: usize, kind: TargetKind, variant: u8) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if !slot.active => {
                slot.active = true;
                slot.kind = kind;
                slot.variant = variant;
                slot.hit = false;
                slot.hiding = false;
                true
            }
            _ => false,
        }
    }

    /// Resolve a hit. Returns the target's kind the first time only.
    pub(crate) fn mark_hit(&mut self, index: usize) -> Option<TargetKind> {
        let slot = self.slots.get_mut(index)?;
        if !slot.is_whackable() {
            return None;
        }
        slot.hit = true;
        Some(slot.kind)
    }

    /// Start the retreat. Returns false when there is nothing to hide or it is
    /// already on its way down.
    pub(crate) fn begin_hiding(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.active && !slot.hiding => {
                slot.hiding = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn deactivate(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.active => {
                slot.active = false;
                slot.hit = false;
                slot.hiding = false;
                true
            }
            _ => false,
        }
    }

    /// Deactivate everything; returns the slots that were occupied. Pending
    /// deadline ids are dropped here, cancelling them is the caller's job.
    pub(crate) fn clear(&mut self) -> Vec<usize> {
        let mut cleared = Vec::new();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.active {
                cleared.push(i);
            }
            slot.active = false;
            slot.hit = false;
            slot.hiding = false;
            slot.deadline = None;
        }
        cleared
    }
}

// --- Difficulty --------------------------------------------------------------

/// How long (ms) a newly spawned target stays up.
///
/// `max(min, base / (1 + score / score_div + elapsed / elapsed_div))`, where
/// `elapsed` is the number of round seconds already spent. A negative score
/// slows the curve down.
pub fn visible_duration_ms(score: i64, time_left: u32, config: &Config) -> f64 {
    let elapsed = config.round_secs.saturating_sub(time_left) as f64;
    let speed = 1.0 + score as f64 / config.score_divisor + elapsed / config.elapsed_divisor;
    if speed <= 0.0 {
        // only reachable with a custom config that allows a deep negative score
        return config.base_visible_ms.max(config.min_visible_ms);
    }
    (config.base_visible_ms / speed).max(config.min_visible_ms)
}
