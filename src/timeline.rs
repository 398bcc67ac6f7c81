//! Virtual-time queue of named deferred actions.
//!
//! Every wait in the game is a `Deferred` entry in a `Timeline` instead of a
//! free-floating callback, so each one has an id and can be cancelled when the
//! round changes state. The driver moves time forward; entries due at the same
//! instant pop in scheduling order.

use std::collections::{BTreeMap, HashMap};

use crate::fsm::EndReason;

/// Handle to a scheduled deadline, used to cancel it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeadlineId(u64);

/// Everything the game ever waits for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deferred {
    /// Repeating countdown tick.
    ClockTick,
    /// Switch a freshly spawned target from appearing to idle.
    Reveal(usize),
    /// Visible duration ran out.
    AutoHide(usize),
    /// Retreat animation finished; deactivate the slot.
    FinishHide(usize),
    /// Spawn the next target.
    SpawnNext,
    /// Hit display finished; start hiding the slot.
    HitHide(usize),
    /// Delayed end of round so the last hit is perceptible.
    EndRound(EndReason),
    /// Clear the hammer swing visual.
    HammerReset,
}

impl Deferred {
    /// Round-scoped entries are wiped whenever the board is cleared.
    pub fn is_round_scoped(&self) -> bool {
        !matches!(self, Deferred::ClockTick | Deferred::HammerReset)
    }

    /// Slot this entry acts on, if any.
    pub fn slot(&self) -> Option<usize> {
        match *self {
            Deferred::Reveal(i)
            | Deferred::AutoHide(i)
            | Deferred::FinishHide(i)
            | Deferred::HitHide(i) => Some(i),
            _ => None,
        }
    }
}

/// A popped, due entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Due {
    pub at_ms: u64,
    pub id: DeadlineId,
    pub action: Deferred,
}

#[derive(Debug, Default)]
pub struct Timeline {
    now_ms: u64,
    next_seq: u64,
    queue: BTreeMap<(u64, u64), Deferred>, // (due_ms, seq) -> action
    due_of: HashMap<u64, u64>,             // seq -> due_ms, for cancellation
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Move the current time forward. Going backwards is ignored.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    pub fn schedule_in(&mut self, delay_ms: u64, action: Deferred) -> DeadlineId {
        self.schedule_at(self.now_ms.saturating_add(delay_ms), action)
    }

    pub fn schedule_at(&mut self, at_ms: u64, action: Deferred) -> DeadlineId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((at_ms, seq), action);
        self.due_of.insert(seq, at_ms);
        DeadlineId(seq)
    }

    /// Returns true if the deadline was still pending.
    pub fn cancel(&mut self, id: DeadlineId) -> bool {
        match self.due_of.remove(&id.0) {
            Some(at) => self.queue.remove(&(at, id.0)).is_some(),
            None => false,
        }
    }

    /// Cancel every pending entry matching `pred`; returns how many went.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&Deferred) -> bool) -> usize {
        let doomed: Vec<(u64, u64)> = self
            .queue
            .iter()
            .filter(|(_, action)| pred(action))
            .map(|(key, _)| *key)
            .collect();
        for key in &doomed {
            self.queue.remove(key);
            self.due_of.remove(&key.1);
        }
        doomed.len()
    }

    pub fn is_pending(&self, id: DeadlineId) -> bool {
        self.due_of.contains_key(&id.0)
    }

    pub fn any(&self, mut pred: impl FnMut(&Deferred) -> bool) -> bool {
        self.queue.values().any(|action| pred(action))
    }

    /// Pop the earliest entry due at or before `until_ms`.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Due> {
        let (&(at_ms, seq), _) = self.queue.iter().next()?;
        if at_ms > until_ms {
            return None;
        }
        let action = self.queue.remove(&(at_ms, seq))?;
        self.due_of.remove(&seq);
        Some(Due {
            at_ms,
            id: DeadlineId(seq),
            action,
        })
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_due_order_then_schedule_order() {
        let mut tl = Timeline::new();
        tl.schedule_in(300, Deferred::HitHide(1));
        tl.schedule_in(100, Deferred::HammerReset);
        tl.schedule_in(300, Deferred::EndRound(EndReason::BadHitsExceeded));

        assert_eq!(tl.pop_due(99), None);
        assert_eq!(tl.pop_due(1_000).map(|d| d.action), Some(Deferred::HammerReset));
        assert_eq!(tl.pop_due(1_000).map(|d| d.action), Some(Deferred::HitHide(1)));
        assert_eq!(
            tl.pop_due(1_000).map(|d| d.action),
            Some(Deferred::EndRound(EndReason::BadHitsExceeded))
        );
        assert!(tl.is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut tl = Timeline::new();
        let id = tl.schedule_in(500, Deferred::SpawnNext);
        assert!(tl.is_pending(id));
        assert!(tl.cancel(id));
        assert!(!tl.cancel(id));
        assert_eq!(tl.pop_due(u64::MAX), None);
    }

    #[test]
    fn test_cancel_where_keeps_clock_and_hammer() {
        let mut tl = Timeline::new();
        tl.schedule_in(1_000, Deferred::ClockTick);
        tl.schedule_in(100, Deferred::HammerReset);
        tl.schedule_in(10, Deferred::Reveal(0));
        tl.schedule_in(1_300, Deferred::AutoHide(0));
        tl.schedule_in(500, Deferred::SpawnNext);

        assert_eq!(tl.cancel_where(Deferred::is_round_scoped), 3);
        assert_eq!(tl.len(), 2);
        assert!(!tl.any(|a| a.slot().is_some()));
    }

    #[test]
    fn test_now_is_monotonic() {
        let mut tl = Timeline::new();
        tl.set_now(1_000);
        tl.set_now(400);
        assert_eq!(tl.now_ms(), 1_000);
        let id = tl.schedule_in(10, Deferred::SpawnNext);
        let due = tl.pop_due(1_010).expect("due");
        assert_eq!(due.id, id);
        assert_eq!(due.at_ms, 1_010);
    }
}
