//! Round State Machine
//!
//! `Idle -> Playing <-> Paused -> Ended -> Idle`, plus the abandon path back to
//! `Idle` from any live phase. Transitions that are not in the table are
//! rejected and leave the phase unchanged.

/// Round phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoundPhase {
    Idle,
    Playing,
    Paused,
    Ended,
}

/// Actions that trigger phase transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundAction {
    Start,
    Pause,
    Resume,
    End,
    ReturnToMenu,
    Restart,
}

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndReason {
    /// The countdown reached zero.
    TimeExpired,
    /// Too many bad targets were hit.
    BadHitsExceeded,
    /// The player went back to the menu mid-round.
    Abandoned,
}

impl EndReason {
    /// Stable kebab-case identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            EndReason::TimeExpired => "time-expired",
            EndReason::BadHitsExceeded => "bad-hits-exceeded",
            EndReason::Abandoned => "abandoned",
        }
    }

    /// Two-line game-over message.
    pub fn headline(self) -> (&'static str, &'static str) {
        match self {
            EndReason::TimeExpired => ("TIME'S UP!", "Try again for a higher score!"),
            EndReason::BadHitsExceeded => {
                ("TOO MANY BAD HITS!", "Be careful which targets you pick!")
            }
            EndReason::Abandoned => ("ROUND ABANDONED", ""),
        }
    }
}

/// Result of a phase transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub success: bool,
    pub from: RoundPhase,
    pub to: RoundPhase,
    pub action: RoundAction,
}

#[derive(Debug, Clone)]
pub struct RoundFsm {
    phase: RoundPhase,
}

impl RoundFsm {
    pub fn new() -> Self {
        Self {
            phase: RoundPhase::Idle,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn can_transition(&self, action: RoundAction) -> bool {
        self.next_phase(action).is_some()
    }

    pub fn transition(&mut self, action: RoundAction) -> Transition {
        let from = self.phase;
        match self.next_phase(action) {
            Some(to) => {
                self.phase = to;
                Transition {
                    success: true,
                    from,
                    to,
                    action,
                }
            }
            None => Transition {
                success: false,
                from,
                to: from,
                action,
            },
        }
    }

    fn next_phase(&self, action: RoundAction) -> Option<RoundPhase> {
        use RoundAction::*;
        use RoundPhase::*;
        match (self.phase, action) {
            (Idle, Start) => Some(Playing),

            (Playing, Pause) => Some(Paused),
            (Paused, Resume) => Some(Playing),

            (Playing | Paused, End) => Some(Ended),
            (Playing | Paused | Ended, ReturnToMenu) => Some(Idle),

            (Ended, Restart) => Some(Playing),

            _ => None,
        }
    }

    /// True while a round is live, paused or not.
    pub fn is_playing(&self) -> bool {
        matches!(self.phase, RoundPhase::Playing | RoundPhase::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.phase == RoundPhase::Paused
    }
}

impl Default for RoundFsm {
    fn default() -> Self {
        Self::new()
    }
}
