//! Session-level results: rounds, player table, global counters and metadata.

use crate::model::{DamageSummary, Event, LogWarning, Round, WarningCategory};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

// ===== SessionResult =====

/// Everything an analysis run produces.
///
/// These are the live aggregate objects; summaries can be merged further. See
/// [`crate::model::snapshot`] for an inert serializable copy.
#[derive(Debug, Clone, Default)]
pub struct SessionResult {
    /// Interesting events in log order.
    pub events: Vec<Event>,
    /// Finished rounds in the order they ended.
    pub rounds: Vec<Round>,
    /// Opponents met across all rounds.
    pub players: HashMap<String, PlayerRecord>,
    /// Session-wide counters and damage.
    pub summary: GlobalSummary,
    /// Line counts, versions and warnings.
    pub metadata: SessionMetadata,
}

impl SessionResult {
    /// Player table entries sorted by name.
    pub fn players_sorted(&self) -> Vec<(&String, &PlayerRecord)> {
        let mut players: Vec<_> = self.players.iter().collect();
        players.sort_by(|a, b| a.0.cmp(b.0));
        players
    }
}

/// Cross-round data for one opponent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerRecord {
    /// Damage exchanged over all rounds.
    pub damage: DamageSummary,
    /// Number of rounds in which this opponent appeared at least once.
    pub times_met: u32,
}

impl PlayerRecord {
    /// Fold one round's damage against this opponent.
    pub fn record_round(&mut self, damage: &DamageSummary) {
        self.damage.merge(damage);
        self.times_met += 1;
    }
}

/// Session-wide counters and damage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlobalSummary {
    /// Counted wins.
    pub wins: u32,
    /// Counted losses.
    pub losses: u32,
    /// Counted kills.
    pub kills: u32,
    /// Counted deaths.
    pub deaths: u32,
    /// Every hit, including those outside a round.
    pub damage: DamageSummary,
}

// ===== Metadata =====

/// Line counts, client version and warnings.
#[derive(Debug, Clone, Default)]
pub struct SessionMetadata {
    /// Lines read, blank ones included.
    pub total_lines: usize,
    /// Lines that produced an interesting event.
    pub relevant_lines: usize,
    /// First non-zero API version seen.
    pub api_version: Option<u32>,
    /// First game version string seen.
    pub game_version: Option<String>,
    /// First timestamp seen.
    pub start: Option<DateTime<Utc>>,
    /// Last timestamp seen.
    pub end: Option<DateTime<Utc>>,
    /// Distinct module names in first-seen order.
    pub modules: Vec<String>,
    /// De-duplicated warnings.
    pub warnings: WarningLog,
}

impl SessionMetadata {
    /// Remember a module name if it has not been seen yet.
    pub fn note_module(&mut self, module: &str) {
        if !self.modules.iter().any(|m| m == module) {
            self.modules.push(module.to_string());
        }
    }

    /// Widen the session time span to include `timestamp`.
    pub fn note_timestamp(&mut self, timestamp: DateTime<Utc>) {
        if self.start.is_none() {
            self.start = Some(timestamp);
        }
        self.end = Some(timestamp);
    }
}

/// A de-duplicated warning with where it first occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningRecord {
    /// Class of the warning.
    pub category: WarningCategory,
    /// Display text, also the de-duplication key.
    pub message: String,
    /// Line of the first occurrence; `None` for end-of-input findings.
    pub first_line: Option<usize>,
    /// Times the message was pushed.
    pub occurrences: u32,
}

/// Warnings de-duplicated by message, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct WarningLog {
    records: Vec<WarningRecord>,
    /// Message to index in `records`.
    index: HashMap<String, usize>,
}

impl WarningLog {
    /// Record a warning.
    ///
    /// Returns `true` the first time a message is seen; repeated messages only
    /// bump the occurrence count of the existing record.
    pub fn push(&mut self, warning: &LogWarning, line: Option<usize>) -> bool {
        let message = warning.to_string();
        if let Some(&position) = self.index.get(&message) {
            self.records[position].occurrences += 1;
            return false;
        }

        self.index.insert(message.clone(), self.records.len());
        self.records.push(WarningRecord {
            category: warning.category(),
            message,
            first_line: line,
            occurrences: 1,
        });
        true
    }

    /// Records in first-seen order.
    pub fn records(&self) -> &[WarningRecord] {
        &self.records
    }

    /// Distinct messages.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.records.iter().any(|r| r.message.contains(needle))
    }
}
