//! Round (one played match) data.
//!
//! A `Round` is built up by [`crate::state::RoundAccumulator`] and handed to
//! the session once it finishes. Accessors are public, mutation is not.

use crate::model::{DamageInstance, DamageSummary, GameMode, Region};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

/// Identity of a round within one session.
///
/// Allocated by the session orchestrator, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoundId(u32);

impl RoundId {
    /// Wrap a raw id.
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw id.
    pub fn get(&self) -> u32 {
        self.0
    }

    /// The id that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A damage instance with the opponent it was exchanged with.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedDamage {
    /// Name as logged, bot ids included.
    pub opponent: String,
    /// The hit itself.
    pub instance: DamageInstance,
}

/// One match from start signal to terminating signal.
///
/// # Invariants
///
/// - `start` is set at most once, on the first game-start signal
/// - every entry of `damage_instances` is also folded into `damage` and into
///   the opponent's entry in `opponents`
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    id: RoundId,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    is_win: bool,
    is_loss: bool,
    score: Option<i64>,
    kills: u32,
    mode: GameMode,
    level: Option<String>,
    region: Region,
    is_finished: bool,
    force_finished: bool,
    damage: DamageSummary,
    opponents: HashMap<String, DamageSummary>,
    damage_instances: Vec<AttributedDamage>,
}

impl Round {
    /// Empty, not yet started round.
    pub fn new(id: RoundId) -> Self {
        Self {
            id,
            start: None,
            end: None,
            is_win: false,
            is_loss: false,
            score: None,
            kills: 0,
            mode: GameMode::Unknown,
            level: None,
            region: Region::Unknown,
            is_finished: false,
            force_finished: false,
            damage: DamageSummary::new(),
            opponents: HashMap::new(),
            damage_instances: Vec::new(),
        }
    }

    /// Session-local id.
    pub fn id(&self) -> RoundId {
        self.id
    }

    /// Timestamp of the game-start line.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    /// Timestamp of the finishing line.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    /// Wall time between start and end, when both are known.
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.end? - self.start?)
    }

    /// RankScoring win seen.
    pub fn is_win(&self) -> bool {
        self.is_win
    }

    /// RankScoring loss seen.
    pub fn is_loss(&self) -> bool {
        self.is_loss
    }

    /// Score of the last win or loss line.
    pub fn score(&self) -> Option<i64> {
        self.score
    }

    /// RankScoring kills.
    pub fn kills(&self) -> u32 {
        self.kills
    }

    /// Mode from the welcome, or `Bot` for tutorial maps.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Map path from the welcome.
    pub fn level(&self) -> Option<&str> {
        self.level.as_deref()
    }

    /// Region known when the round started.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Whether a game-start signal was seen.
    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }

    /// Whether the round was closed.
    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    /// Whether the round was closed at end of input rather than by a finish signal.
    pub fn force_finished(&self) -> bool {
        self.force_finished
    }

    /// Damage summary over the whole round.
    pub fn damage(&self) -> &DamageSummary {
        &self.damage
    }

    /// Per-opponent damage for this round.
    pub fn opponents(&self) -> &HashMap<String, DamageSummary> {
        &self.opponents
    }

    /// Attributed hits in log order.
    pub fn damage_instances(&self) -> &[AttributedDamage] {
        &self.damage_instances
    }

    // ===== crate-internal mutation =====

    pub(crate) fn record_damage(&mut self, opponent: &str, instance: &DamageInstance) {
        self.damage.add(instance);
        self.opponents
            .entry(opponent.to_string())
            .or_default()
            .add(instance);
        self.damage_instances.push(AttributedDamage {
            opponent: opponent.to_string(),
            instance: instance.clone(),
        });
    }

    pub(crate) fn set_start(&mut self, start: DateTime<Utc>) {
        if self.start.is_none() {
            self.start = Some(start);
        }
    }

    pub(crate) fn mark_win(&mut self, score: Option<i64>) {
        self.is_win = true;
        if score.is_some() {
            self.score = score;
        }
    }

    pub(crate) fn mark_loss(&mut self, score: Option<i64>) {
        self.is_loss = true;
        if score.is_some() {
            self.score = score;
        }
    }

    pub(crate) fn add_kill(&mut self) {
        self.kills += 1;
    }

    pub(crate) fn set_mode(&mut self, mode: GameMode, level: Option<String>) {
        self.mode = mode;
        if level.is_some() {
            self.level = level;
        }
    }

    pub(crate) fn set_region(&mut self, region: Region) {
        self.region = region;
    }

    pub(crate) fn finish(&mut self, end: Option<DateTime<Utc>>, score: Option<i64>, forced: bool) {
        if end.is_some() {
            self.end = end;
        }
        if score.is_some() {
            self.score = score;
        }
        self.is_finished = true;
        self.force_finished = forced;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 8, 19, 18, 0, secs).unwrap()
    }

    #[test]
    fn new_round_is_idle_and_empty() {
        let round = Round::new(RoundId::new(1));
        assert!(!round.is_started());
        assert!(!round.is_finished());
        assert_eq!(round.mode(), GameMode::Unknown);
        assert!(round.damage().is_empty());
        assert!(round.opponents().is_empty());
    }

    #[test]
    fn start_is_set_once() {
        let mut round = Round::new(RoundId::new(1));
        round.set_start(at(1));
        round.set_start(at(5));
        assert_eq!(round.start(), Some(at(1)));
    }

    #[test]
    fn record_damage_feeds_summary_opponent_and_log() {
        let mut round = Round::new(RoundId::new(1));
        round.record_damage("Alice", &DamageInstance::dealt(20.0, 1.0));
        round.record_damage("Alice", &DamageInstance::received(5.0, 1.0));
        round.record_damage("Bob", &DamageInstance::dealt(7.0, 1.0));

        assert_eq!(round.damage().dealt().amount, 27.0);
        assert_eq!(round.opponents().len(), 2);
        assert_eq!(round.opponents()["Alice"].received().amount, 5.0);
        assert_eq!(round.damage_instances().len(), 3);
        assert_eq!(round.damage_instances()[2].opponent, "Bob");
    }

    #[test]
    fn finish_without_time_keeps_end_unset() {
        let mut round = Round::new(RoundId::new(1));
        round.set_start(at(1));
        round.finish(None, None, false);
        assert!(round.is_finished());
        assert_eq!(round.end(), None);
        assert_eq!(round.duration(), None);
    }

    #[test]
    fn finish_score_overrides_win_score() {
        let mut round = Round::new(RoundId::new(1));
        round.mark_win(Some(100));
        round.finish(Some(at(30)), Some(120), false);
        assert_eq!(round.score(), Some(120));

        let mut round = Round::new(RoundId::new(2));
        round.mark_win(Some(100));
        round.finish(Some(at(30)), None, false);
        assert_eq!(round.score(), Some(100));
    }

    #[test]
    fn round_ids_increment() {
        let id = RoundId::new(1);
        assert_eq!(id.next().get(), 2);
        assert_eq!(id.to_string(), "#1");
    }
}
