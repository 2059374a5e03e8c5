//! Round lifecycle state machine.
//!
//! [`transition`] is a pure function from the current [`RoundState`] and one
//! [`Event`] to the next state plus the effects to apply to the [`Round`].
//! [`RoundAccumulator`] owns a round and applies those effects.
//!
//! A round closes on either of two signals, whichever arrives first:
//! the received hit that follows a death/loss line, or the return to the
//! main menu once the round has started.

use crate::model::{Event, GameMode, Region, Round, RoundId};
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::debug;

/// Lifecycle position of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoundState {
    /// No start signal seen yet.
    #[default]
    Idle,
    /// Started and in progress.
    Open,
    /// Death or loss seen; waiting for the killing blow's damage line.
    AwaitingFinishDamage,
    /// Terminal.
    Finished,
}

impl RoundState {
    /// Whether a start signal has been seen and the round is not closed yet.
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Open | Self::AwaitingFinishDamage)
    }

    /// Kebab-case name for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Open => "open",
            Self::AwaitingFinishDamage => "awaiting-finish-damage",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change to apply to the round, produced by [`transition`].
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEffect {
    /// Fold the event's attributed damage into the round.
    FoldDamage,
    /// Set the start time; `None` means "now".
    Start(Option<DateTime<Utc>>),
    /// Mark the round won.
    MarkWin {
        /// Score of the win line.
        score: Option<i64>,
    },
    /// Mark the round lost.
    MarkLoss {
        /// Score of the death or loss line.
        score: Option<i64>,
    },
    /// Count one kill.
    AddKill,
    /// Close the round.
    Finish {
        /// Timestamp of the finishing line.
        end: Option<DateTime<Utc>>,
        /// Score carried by the finishing line.
        score: Option<i64>,
    },
    /// A start signal arrived while a round was already running.
    IgnoredGameStart,
}

/// Compute the next state and effects for one event.
///
/// Rules, first match wins after damage folding:
/// 1. Attributed damage is folded once the round has started.
/// 2. `AwaitingFinishDamage` and a received hit: finish.
/// 3. Win: mark won (round stays open).
/// 4. Death or loss: mark lost, await the finishing damage line.
/// 5. Started and menu return: finish.
/// 6. Game start while `Idle`: open.
///
/// Damage, win, loss, death and kill only count once the round has started,
/// so hits logged between rounds never land in the next one. A `Finished`
/// round ignores everything.
pub fn transition(state: RoundState, event: &Event) -> (RoundState, Vec<RoundEffect>) {
    if state == RoundState::Finished {
        return (state, Vec::new());
    }

    let mut effects = Vec::new();
    if state.is_started() && event.attributed_damage().is_some() {
        effects.push(RoundEffect::FoldDamage);
    }

    let finish = RoundEffect::Finish {
        end: event.timestamp,
        score: event.score,
    };

    let next = if state == RoundState::AwaitingFinishDamage && event.is_received_hit() {
        effects.push(finish);
        RoundState::Finished
    } else if event.is_win {
        if state.is_started() {
            effects.push(RoundEffect::MarkWin { score: event.score });
        }
        state
    } else if event.is_death || event.is_loss {
        if state.is_started() {
            effects.push(RoundEffect::MarkLoss { score: event.score });
            RoundState::AwaitingFinishDamage
        } else {
            state
        }
    } else if event.is_kill {
        if state.is_started() {
            effects.push(RoundEffect::AddKill);
        }
        state
    } else if state.is_started() && event.is_game_end {
        effects.push(finish);
        RoundState::Finished
    } else if event.is_game_start {
        if state == RoundState::Idle {
            effects.push(RoundEffect::Start(event.timestamp));
            RoundState::Open
        } else {
            effects.push(RoundEffect::IgnoredGameStart);
            state
        }
    } else {
        state
    };

    (next, effects)
}

// ===== RoundAccumulator =====

/// Owns the round being played and its lifecycle state.
#[derive(Debug, Clone)]
pub struct RoundAccumulator {
    round: Round,
    state: RoundState,
}

impl RoundAccumulator {
    /// Fresh `Idle` round.
    pub fn new(id: RoundId) -> Self {
        Self {
            round: Round::new(id),
            state: RoundState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Round built so far.
    pub fn round(&self) -> &Round {
        &self.round
    }

    /// Whether the round reached `Finished`.
    pub fn is_finished(&self) -> bool {
        self.state == RoundState::Finished
    }

    /// Feed one event. Returns the effects that were applied.
    pub fn apply(&mut self, event: &Event) -> Vec<RoundEffect> {
        let (next, effects) = transition(self.state, event);

        for effect in &effects {
            self.apply_effect(effect, event);
        }

        if next != self.state {
            debug!(
                round = %self.round.id(),
                from = %self.state,
                to = %next,
                line = event.line_number,
                "round transition"
            );
        }
        self.state = next;
        effects
    }

    fn apply_effect(&mut self, effect: &RoundEffect, event: &Event) {
        match effect {
            RoundEffect::FoldDamage => {
                if let Some((opponent, instance)) = event.attributed_damage() {
                    self.round.record_damage(opponent, instance);
                }
            }
            RoundEffect::Start(start) => self.round.set_start(start.unwrap_or_else(Utc::now)),
            RoundEffect::MarkWin { score } => self.round.mark_win(*score),
            RoundEffect::MarkLoss { score } => self.round.mark_loss(*score),
            RoundEffect::AddKill => self.round.add_kill(),
            RoundEffect::Finish { end, score } => self.round.finish(*end, *score, false),
            RoundEffect::IgnoredGameStart => {}
        }
    }

    /// Set the match type announced for this round.
    pub fn set_mode(&mut self, mode: GameMode, level: Option<String>) {
        self.round.set_mode(mode, level);
    }

    /// Set the region the round is played in.
    pub fn set_region(&mut self, region: Region) {
        self.round.set_region(region);
    }

    /// Close a started round at end of input, taking end time and score from
    /// the last processed event.
    pub fn force_finish(&mut self, last_event: Option<&Event>) {
        if self.state == RoundState::Finished {
            return;
        }
        let end = last_event.and_then(|e| e.timestamp);
        let score = last_event.and_then(|e| e.score);
        self.round.finish(end, score, true);

        debug!(round = %self.round.id(), from = %self.state, "round force-finished");
        self.state = RoundState::Finished;
    }

    /// Hand the round over.
    pub fn into_round(self) -> Round {
        self.round
    }
}
