//! Inert, fully-valued copy of a [`SessionResult`] for serialization.
//!
//! Derived values (average ranges, dealt/received totals) are materialised and
//! maps are ordered so the JSON output is stable between runs.

use crate::model::{
    AttributedDamage, DamageStat, DamageSummary, DealtReceived, Event, PlayerRecord, Round,
    SessionResult,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Serialized [`DamageStat`] with its average range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageStatSnapshot {
    /// Damage from unblocked hits.
    pub amount: f64,
    /// Unblocked hits.
    pub count: u64,
    /// Range of every hit.
    pub range_sum: f64,
    /// `rangeSum / count`.
    pub average_range: f64,
    /// Backstabs.
    pub backstab_count: u64,
    /// Headshots.
    pub headshot_count: u64,
    /// Blocked melee hits.
    pub melee_block_count: u64,
    /// Blocked ranged hits.
    pub range_block_count: u64,
    /// Estimated damage absorbed by ranged blocks.
    pub range_block_amount: f64,
}

impl From<&DamageStat> for DamageStatSnapshot {
    fn from(stat: &DamageStat) -> Self {
        Self {
            amount: stat.amount,
            count: stat.count,
            range_sum: stat.range_sum,
            average_range: stat.average_range(),
            backstab_count: stat.backstab_count,
            headshot_count: stat.headshot_count,
            melee_block_count: stat.melee_block_count,
            range_block_count: stat.range_block_count,
            range_block_amount: stat.range_block_amount,
        }
    }
}

/// Serialized [`DealtReceived`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealtReceivedSnapshot {
    /// Dealt bucket.
    pub dealt: DamageStatSnapshot,
    /// Received bucket.
    pub received: DamageStatSnapshot,
}

impl From<&DealtReceived> for DealtReceivedSnapshot {
    fn from(pair: &DealtReceived) -> Self {
        Self {
            dealt: (&pair.dealt).into(),
            received: (&pair.received).into(),
        }
    }
}

/// Serialized [`DamageSummary`] with derived totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageSummarySnapshot {
    /// Melee buckets.
    pub melee: DealtReceivedSnapshot,
    /// Ranged buckets.
    pub ranged: DealtReceivedSnapshot,
    /// AFK buckets.
    pub afk: DealtReceivedSnapshot,
    /// All dealt buckets summed.
    pub dealt: DamageStatSnapshot,
    /// All received buckets summed.
    pub received: DamageStatSnapshot,
    /// Average range over every bucket.
    pub average_range: f64,
}

impl From<&DamageSummary> for DamageSummarySnapshot {
    fn from(summary: &DamageSummary) -> Self {
        Self {
            melee: (&summary.melee).into(),
            ranged: (&summary.ranged).into(),
            afk: (&summary.afk).into(),
            dealt: (&summary.dealt()).into(),
            received: (&summary.received()).into(),
            average_range: summary.average_range(),
        }
    }
}

/// One attributed hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageInstanceSnapshot {
    /// Opponent.
    pub name: String,
    /// Dealt amount, 0 for received hits.
    pub dealt: f64,
    /// Received amount, 0 for dealt hits.
    pub received: f64,
    /// Distance in metres.
    pub range: f64,
    /// Line timestamp.
    pub timestamp: Option<DateTime<Utc>>,
    /// Ranged classification.
    pub is_ranged: bool,
    /// AFK classification.
    #[serde(rename = "isAFK")]
    pub is_afk: bool,
    /// Headshot flag.
    pub is_headshot: bool,
    /// Backstab flag.
    pub is_backstab: bool,
    /// Block flag.
    pub is_blocked: bool,
    /// Local player landed the hit.
    pub is_dealt: bool,
    /// Local player took the hit.
    pub is_received: bool,
    /// Block percentage, 0 if none.
    pub block: u32,
}

impl From<&AttributedDamage> for DamageInstanceSnapshot {
    fn from(hit: &AttributedDamage) -> Self {
        let instance = &hit.instance;
        Self {
            name: hit.opponent.clone(),
            dealt: instance.dealt_amount(),
            received: instance.received_amount(),
            range: instance.range(),
            timestamp: instance.timestamp(),
            is_ranged: instance.is_ranged(),
            is_afk: instance.is_afk(),
            is_headshot: instance.is_headshot(),
            is_backstab: instance.is_backstab(),
            is_blocked: instance.is_blocked(),
            is_dealt: instance.is_dealt(),
            is_received: instance.is_received(),
            block: instance.block(),
        }
    }
}

/// Serialized [`Round`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSnapshot {
    /// Round id.
    pub id: u32,
    /// Game-start timestamp.
    pub start: Option<DateTime<Utc>>,
    /// Finishing timestamp.
    pub end: Option<DateTime<Utc>>,
    /// Round won.
    pub is_win: bool,
    /// Round lost.
    pub is_loss: bool,
    /// Score from RankScoring.
    pub score: Option<i64>,
    /// Kills.
    pub kills: u32,
    /// Lowercase mode name.
    pub mode: String,
    /// Map path.
    pub level: Option<String>,
    /// Region host fragment.
    pub region: String,
    /// Round was closed.
    pub is_finished: bool,
    /// Closed at end of input.
    pub force_finished: bool,
    /// Damage over the whole round.
    pub damage_summary: DamageSummarySnapshot,
    /// Per-opponent damage, by name.
    pub players: BTreeMap<String, DamageSummarySnapshot>,
    /// Hits in log order.
    pub damage_instances: Vec<DamageInstanceSnapshot>,
}

impl From<&Round> for RoundSnapshot {
    fn from(round: &Round) -> Self {
        Self {
            id: round.id().get(),
            start: round.start(),
            end: round.end(),
            is_win: round.is_win(),
            is_loss: round.is_loss(),
            score: round.score(),
            kills: round.kills(),
            mode: round.mode().to_string(),
            level: round.level().map(str::to_string),
            region: round.region().to_string(),
            is_finished: round.is_finished(),
            force_finished: round.force_finished(),
            damage_summary: round.damage().into(),
            players: round
                .opponents()
                .iter()
                .map(|(name, summary)| (name.clone(), summary.into()))
                .collect(),
            damage_instances: round.damage_instances().iter().map(Into::into).collect(),
        }
    }
}

/// Serialized [`PlayerRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    /// Damage over all rounds.
    pub damage: DamageSummarySnapshot,
    /// Rounds the opponent appeared in.
    pub times_met: u32,
}

impl From<&PlayerRecord> for PlayerSnapshot {
    fn from(record: &PlayerRecord) -> Self {
        Self {
            damage: (&record.damage).into(),
            times_met: record.times_met,
        }
    }
}

/// Compact per-event view; only populated fields are emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSnapshot {
    /// 1-based line number.
    pub line: usize,
    /// Line timestamp.
    pub timestamp: Option<DateTime<Utc>>,
    /// Module name.
    pub module: String,
    /// Game-start signal.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_game_start: bool,
    /// Menu-return signal.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_game_end: bool,
    /// Round won.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_win: bool,
    /// Round lost.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_loss: bool,
    /// RankScoring kill.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_kill: bool,
    /// RankScoring death.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_death: bool,
    /// Score from RankScoring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    /// Opponent of a damage line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
    /// `bot` for bot maps, else the welcome mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Region from a region line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl From<&Event> for EventSnapshot {
    fn from(event: &Event) -> Self {
        let mode = if event.is_bot_game {
            Some("bot".to_string())
        } else {
            event.game_type.as_ref().map(|g| g.mode.to_string())
        };
        Self {
            line: event.line_number,
            timestamp: event.timestamp,
            module: event.module.clone(),
            is_game_start: event.is_game_start,
            is_game_end: event.is_game_end,
            is_win: event.is_win,
            is_loss: event.is_loss,
            is_kill: event.is_kill,
            is_death: event.is_death,
            score: event.score,
            opponent: event.opponent.clone(),
            mode,
            region: event.region.map(|r| r.to_string()),
        }
    }
}

/// Session-wide counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySnapshot {
    /// Counted wins.
    pub wins: u32,
    /// Counted losses.
    pub losses: u32,
    /// Kills.
    pub kills: u32,
    /// Counted deaths.
    pub deaths: u32,
    /// Every hit in the session.
    pub damage: DamageSummarySnapshot,
}

/// Line counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineCounts {
    /// Lines read.
    pub total: usize,
    /// Lines with an interesting event.
    pub relevant: usize,
}

/// Serialized warning record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningSnapshot {
    /// Kebab-case category.
    pub category: &'static str,
    /// Warning text.
    pub message: String,
    /// Line of the first occurrence.
    pub first_line: Option<usize>,
    /// Times seen.
    pub occurrences: u32,
}

/// Versions, time span and warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaSnapshot {
    /// Line counters.
    pub lines: LineCounts,
    /// Client API version.
    pub version: Option<u32>,
    /// Game build string.
    pub game_version: Option<String>,
    /// First timestamp.
    pub start: Option<DateTime<Utc>>,
    /// Last timestamp.
    pub end: Option<DateTime<Utc>>,
    /// Distinct modules in first-seen order.
    pub modules: Vec<String>,
    /// De-duplicated warnings.
    pub warnings: Vec<WarningSnapshot>,
}

/// Serializable session result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Session metadata.
    pub meta: MetaSnapshot,
    /// Interesting events.
    pub entries: Vec<EventSnapshot>,
    /// Finished rounds.
    pub games: Vec<RoundSnapshot>,
    /// Opponents by name.
    pub players: BTreeMap<String, PlayerSnapshot>,
    /// Global counters.
    pub summary: SummarySnapshot,
}

impl From<&SessionResult> for SessionSnapshot {
    fn from(result: &SessionResult) -> Self {
        let meta = &result.metadata;
        Self {
            meta: MetaSnapshot {
                lines: LineCounts {
                    total: meta.total_lines,
                    relevant: meta.relevant_lines,
                },
                version: meta.api_version,
                game_version: meta.game_version.clone(),
                start: meta.start,
                end: meta.end,
                modules: meta.modules.clone(),
                warnings: meta
                    .warnings
                    .records()
                    .iter()
                    .map(|w| WarningSnapshot {
                        category: w.category.as_str(),
                        message: w.message.clone(),
                        first_line: w.first_line,
                        occurrences: w.occurrences,
                    })
                    .collect(),
            },
            entries: result.events.iter().map(Into::into).collect(),
            games: result.rounds.iter().map(Into::into).collect(),
            players: result
                .players
                .iter()
                .map(|(name, record)| (name.clone(), record.into()))
                .collect(),
            summary: SummarySnapshot {
                wins: result.summary.wins,
                losses: result.summary.losses,
                kills: result.summary.kills,
                deaths: result.summary.deaths,
                damage: (&result.summary.damage).into(),
            },
        }
    }
}
