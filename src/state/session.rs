//! Session orchestration.
//!
//! [`SessionOrchestrator`] consumes lines in order, extracts events, drives
//! the current [`RoundAccumulator`] and maintains the session aggregates:
//! global counters and damage, the player table and metadata.

use crate::config::ParserOptions;
use crate::model::{
    Event, GameMode, LogWarning, Region, Round, RoundId, SessionResult,
};
use crate::parser::EventExtractor;
use crate::state::round::{RoundAccumulator, RoundEffect};
use tracing::{debug, info, warn};

/// API versions the parser has been checked against.
pub const TESTED_API_VERSIONS: [u32; 2] = [93315, 95121];

/// Clients older than this do not log kills and deaths reliably.
pub const MIN_RELIABLE_KILL_API_VERSION: u32 = 93315;

/// Sequential, single-owner analyzer of one log.
///
/// Each line is fully applied before the next is considered. Round ids are
/// allocated here, starting at 1, so independent runs never share state.
#[derive(Debug)]
pub struct SessionOrchestrator {
    extractor: EventExtractor,
    current: RoundAccumulator,
    next_round_id: RoundId,
    /// Bot map load seen for the current round; overrides the welcome mode.
    bot_game: bool,
    /// Last region announced; carried into later rounds.
    region: Option<Region>,
    last_event: Option<Event>,
    line_number: usize,
    result: SessionResult,
}

impl SessionOrchestrator {
    /// Fresh session with round `#1` pending.
    pub fn new(options: ParserOptions) -> Self {
        let first = RoundId::new(1);
        Self {
            extractor: EventExtractor::new(options),
            current: RoundAccumulator::new(first),
            next_round_id: first.next(),
            bot_game: false,
            region: None,
            last_event: None,
            line_number: 0,
            result: SessionResult::default(),
        }
    }

    /// Options the extractor runs with.
    pub fn options(&self) -> &ParserOptions {
        self.extractor.options()
    }

    /// The round currently being accumulated.
    pub fn current_round(&self) -> &RoundAccumulator {
        &self.current
    }

    /// Aggregates so far. Rounds still open are not included.
    pub fn result(&self) -> &SessionResult {
        &self.result
    }

    /// Process one raw line (without trailing newline).
    ///
    /// Blank lines only count towards the total.
    pub fn feed_line(&mut self, line: &str) {
        self.line_number += 1;
        self.result.metadata.total_lines += 1;
        if line.trim().is_empty() {
            return;
        }

        let extraction = self.extractor.extract(line, self.line_number);
        let event = extraction.event;

        self.result.metadata.note_module(&event.module);
        if let Some(timestamp) = event.timestamp {
            self.result.metadata.note_timestamp(timestamp);
        }
        for warning in &extraction.warnings {
            self.record_warning(warning, Some(event.line_number));
        }

        if !event.interesting {
            return;
        }
        self.result.metadata.relevant_lines += 1;

        self.apply_event(&event);

        self.last_event = Some(event.clone());
        self.result.events.push(event);
    }

    /// Process every line of `lines` in order.
    pub fn feed_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.feed_line(line.as_ref());
        }
    }

    fn apply_event(&mut self, event: &Event) {
        self.note_version(event);
        self.note_round_context(event);

        if let Some((_, instance)) = event.attributed_damage() {
            self.result.summary.damage.add(instance);
        }
        self.count_score(event);

        let effects = self.current.apply(event);
        if effects.contains(&RoundEffect::IgnoredGameStart) {
            self.record_warning(&LogWarning::GameStartDuringRound, Some(event.line_number));
        }

        if self.current.is_finished() {
            self.flush_round();
        }
    }

    /// Keep the first version lines and compare later ones against them.
    fn note_version(&mut self, event: &Event) {
        let metadata = &mut self.result.metadata;
        if metadata.game_version.is_none() {
            metadata.game_version.clone_from(&event.version.game);
        }

        let Some(api) = event.version.api.filter(|&api| api != 0) else {
            return;
        };

        let warnings = match metadata.api_version {
            None => {
                metadata.api_version = Some(api);
                let mut warnings = Vec::new();
                if !TESTED_API_VERSIONS.contains(&api) {
                    warnings.push(LogWarning::UntestedApiVersion { version: api });
                }
                if api < MIN_RELIABLE_KILL_API_VERSION {
                    warnings.push(LogWarning::UnreliableKillTracking { version: api });
                }
                warnings
            }
            Some(first) if first != api => {
                vec![LogWarning::ApiVersionMismatch { first, seen: api }]
            }
            Some(_) => Vec::new(),
        };

        for warning in &warnings {
            self.record_warning(warning, Some(event.line_number));
        }
    }

    /// Apply mode, map and region signals to the current round.
    fn note_round_context(&mut self, event: &Event) {
        if event.is_bot_game {
            self.bot_game = true;
            self.current.set_mode(GameMode::Bot, None);
        }

        if let Some(game_type) = &event.game_type {
            let mode = if self.bot_game {
                GameMode::Bot
            } else {
                game_type.mode
            };
            self.current.set_mode(mode, Some(game_type.level.clone()));
        }

        if let Some(region) = event.region {
            self.region = Some(region);
            self.current.set_region(region);
        }
    }

    fn count_score(&mut self, event: &Event) {
        let Some(kind) = event.rank_kind() else {
            return;
        };

        let mode = self.current.round().mode();
        if !mode.counts_toward_score() {
            self.record_warning(
                &LogWarning::ScoreOutsideKnownMode {
                    kind: kind.to_string(),
                    mode: mode.to_string(),
                },
                Some(event.line_number),
            );
            return;
        }

        let summary = &mut self.result.summary;
        if event.is_win {
            summary.wins += 1;
        }
        if event.is_loss {
            summary.losses += 1;
        }
        if event.is_kill {
            summary.kills += 1;
        }
        if event.is_death {
            summary.deaths += 1;
        }
    }

    /// Move the finished round into the result and open a fresh `Idle` one.
    fn flush_round(&mut self) {
        let mut next = RoundAccumulator::new(self.next_round_id);
        if let Some(region) = self.region {
            next.set_region(region);
        }
        self.next_round_id = self.next_round_id.next();
        self.bot_game = false;

        let finished = std::mem::replace(&mut self.current, next).into_round();
        self.push_round(finished);
    }

    fn push_round(&mut self, round: Round) {
        for (name, damage) in round.opponents() {
            self.result
                .players
                .entry(name.clone())
                .or_default()
                .record_round(damage);
        }

        debug!(
            round = %round.id(),
            mode = %round.mode(),
            win = round.is_win(),
            loss = round.is_loss(),
            opponents = round.opponents().len(),
            forced = round.force_finished(),
            "round finished"
        );
        self.result.rounds.push(round);
    }

    fn record_warning(&mut self, warning: &LogWarning, line: Option<usize>) {
        if self.result.metadata.warnings.push(warning, line) {
            warn!(
                line = ?line,
                category = warning.category().as_str(),
                "{}",
                warning
            );
        }
    }

    /// End of known data: force-finish a started round and return the result.
    pub fn finish(mut self) -> SessionResult {
        if self.current.state().is_started() {
            let last = self.last_event.take();
            self.current.force_finish(last.as_ref());
            let round = self.current.round().clone();
            self.push_round(round);
        }
        self.log_completion();
        self.result
    }

    /// Cancellation: return the result, discarding any round still open.
    pub fn abort(self) -> SessionResult {
        if self.current.state().is_started() {
            debug!(round = %self.current.round().id(), "open round discarded");
        }
        self.log_completion();
        self.result
    }

    fn log_completion(&self) {
        let result = &self.result;
        info!(
            total_lines = result.metadata.total_lines,
            relevant_lines = result.metadata.relevant_lines,
            rounds = result.rounds.len(),
            players = result.players.len(),
            warnings = result.metadata.warnings.len(),
            "session analyzed"
        );
    }
}

/// Analyze a complete sequence of lines.
pub fn analyze_lines<I, S>(lines: I, options: ParserOptions) -> SessionResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut orchestrator = SessionOrchestrator::new(options);
    orchestrator.feed_lines(lines);
    orchestrator.finish()
}

/// Analyze newline-delimited text. Trailing `\r` is stripped per line.
pub fn analyze_str(text: &str, options: ParserOptions) -> SessionResult {
    analyze_lines(
        text.lines().map(|line| line.strip_suffix('\r').unwrap_or(line)),
        options,
    )
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
