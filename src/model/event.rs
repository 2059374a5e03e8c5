//! Typed events extracted from single log lines.
//!
//! An [`Event`] is the immutable result of running one raw line through the
//! extractor. It is folded into round and session state and then dropped;
//! rounds and summaries own the durable data.

use chrono::{DateTime, Utc};
use std::fmt;

/// Hits measured beyond this many meters are ranged.
pub const RANGED_THRESHOLD_M: f64 = 3.0;

/// Hits measured beyond this many meters are presumed to come from traps or
/// turrets nobody was aiming.
pub const AFK_THRESHOLD_M: f64 = 300.0;

/// Block percentage that marks an explosive/ranged block.
pub const RANGED_BLOCK_PERCENT: u32 = 50;

/// Block percentages the client is known to emit.
pub const KNOWN_BLOCK_PERCENTS: [u32; 3] = [25, 50, 100];

// ===== Event =====

/// One log line after extraction.
///
/// Every line produces an `Event`; only lines where a sub-parser recognised
/// the payload are `interesting`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    /// 1-based line number in the input.
    pub line_number: usize,
    /// UTC time from the line header, if the line had one.
    pub timestamp: Option<DateTime<Utc>>,
    /// Module name (trailing colon stripped).
    pub module: String,
    /// `GotoState: NewState: Playing`.
    pub is_game_start: bool,
    /// `GotoState: NewState: MainMenu`.
    pub is_game_end: bool,
    /// RankScoring `win`.
    pub is_win: bool,
    /// RankScoring `loss`.
    pub is_loss: bool,
    /// RankScoring `kill`.
    pub is_kill: bool,
    /// RankScoring `death`.
    pub is_death: bool,
    /// A sub-parser recognised the payload and the event was not discarded.
    pub interesting: bool,
    /// Value attached to a RankScoring line.
    pub score: Option<i64>,
    /// The other player of a damage line.
    pub opponent: Option<String>,
    /// Hit parsed from a damage line.
    pub damage: Option<DamageInstance>,
    /// Mode and map from a server welcome.
    pub game_type: Option<GameType>,
    /// Versions announced by `LogInit`.
    pub version: VersionInfo,
    /// Backend region from the client-web url.
    pub region: Option<Region>,
    /// Set when the map load marks a bot/tutorial match.
    pub is_bot_game: bool,
}

impl Event {
    /// The damage instance together with its opponent, when both are present.
    pub fn attributed_damage(&self) -> Option<(&str, &DamageInstance)> {
        match (&self.opponent, &self.damage) {
            (Some(name), Some(damage)) => Some((name.as_str(), damage)),
            _ => None,
        }
    }

    /// Whether this event carries a hit the local player took.
    pub fn is_received_hit(&self) -> bool {
        self.damage.as_ref().is_some_and(DamageInstance::is_received)
    }

    /// The RankScoring verb this event carries, if any.
    pub fn rank_kind(&self) -> Option<RankKind> {
        if self.is_win {
            Some(RankKind::Win)
        } else if self.is_loss {
            Some(RankKind::Loss)
        } else if self.is_kill {
            Some(RankKind::Kill)
        } else if self.is_death {
            Some(RankKind::Death)
        } else {
            None
        }
    }
}

/// Client build information from `LogInit` lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionInfo {
    /// Free-form game build string.
    pub game: Option<String>,
    /// Numeric client API version.
    pub api: Option<u32>,
}

// ===== RankScoring =====

/// The four RankScoring verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankKind {
    /// Round won.
    Win,
    /// Round lost.
    Loss,
    /// Opponent killed.
    Kill,
    /// Local player died.
    Death,
}

impl RankKind {
    /// Parse a verb, ignoring ASCII case.
    pub fn parse(verb: &str) -> Option<Self> {
        match verb.to_ascii_lowercase().as_str() {
            "win" => Some(Self::Win),
            "loss" => Some(Self::Loss),
            "kill" => Some(Self::Kill),
            "death" => Some(Self::Death),
            _ => None,
        }
    }

    /// Lowercase verb as it appears in the log.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Kill => "kill",
            Self::Death => "death",
        }
    }
}

impl fmt::Display for RankKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== Game mode / region =====

/// Match type of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    /// Solo jungle.
    Solo,
    /// Team jungle.
    Team,
    /// Lightning (short) matches.
    Lightning,
    /// Private custom matches.
    Custom,
    /// Solo trials.
    Trials,
    /// Tutorial or jungle with bots.
    Bot,
    /// Mode key not recognised, or no welcome seen.
    #[default]
    Unknown,
}

impl GameMode {
    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solo => "solo",
            Self::Team => "team",
            Self::Lightning => "lightning",
            Self::Custom => "custom",
            Self::Trials => "trials",
            Self::Bot => "bot",
            Self::Unknown => "unknown",
        }
    }

    /// Whether win/loss/kill/death signals in this mode feed the global counters.
    ///
    /// Unknown and bot rounds are excluded so tutorial matches and
    /// misclassified rounds do not skew the totals.
    pub fn counts_toward_score(&self) -> bool {
        !matches!(self, Self::Unknown | Self::Bot)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mode and map announced by the server welcome.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameType {
    /// Mode mapped from the game-mode blueprint key.
    pub mode: GameMode,
    /// Map path below `/Game/Maps/`.
    pub level: String,
}

/// Backend region the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    /// Europe.
    Eu,
    /// US east coast.
    UsEast,
    /// US west coast.
    UsWest,
    /// Oceania.
    Ocn,
    /// Host fragment not recognised, or no region seen.
    #[default]
    Unknown,
}

impl Region {
    /// Map the host fragment from the client-web url to a region.
    pub fn from_host_fragment(raw: &str) -> Self {
        match raw {
            "eu" => Self::Eu,
            "us-east" => Self::UsEast,
            "us-west" => Self::UsWest,
            "ocn" => Self::Ocn,
            _ => Self::Unknown,
        }
    }

    /// Host fragment form of the region.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eu => "eu",
            Self::UsEast => "us-east",
            Self::UsWest => "us-west",
            Self::Ocn => "ocn",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== DamageInstance =====

/// Which side of a hit the local player was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageSide {
    /// `You hit ...`.
    Dealt,
    /// `Struck by ...`.
    Received,
}

/// Aggregation bucket of a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageCategory {
    /// Within ranged threshold.
    Melee,
    /// Beyond the ranged threshold, or a ranged block.
    Ranged,
    /// Ranged and beyond the AFK threshold.
    Afk,
}

/// A single recorded hit.
///
/// Classification flags are derived from range and block at construction and
/// cannot be set independently, so every instance lands in exactly one
/// (side, category) bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageInstance {
    side: DamageSide,
    amount: f64,
    range: f64,
    timestamp: Option<DateTime<Utc>>,
    is_ranged: bool,
    is_afk: bool,
    is_headshot: bool,
    is_backstab: bool,
    block: Option<u32>,
}

impl DamageInstance {
    /// A hit the local player dealt.
    pub fn dealt(amount: f64, range: f64) -> Self {
        Self::new(DamageSide::Dealt, amount, range)
    }

    /// A hit the local player received.
    pub fn received(amount: f64, range: f64) -> Self {
        Self::new(DamageSide::Received, amount, range)
    }

    /// Build an instance and classify it by range.
    pub fn new(side: DamageSide, amount: f64, range: f64) -> Self {
        let is_ranged = range > RANGED_THRESHOLD_M;
        Self {
            side,
            amount,
            range,
            timestamp: None,
            is_ranged,
            is_afk: is_ranged && range > AFK_THRESHOLD_M,
            is_headshot: false,
            is_backstab: false,
            block: None,
        }
    }

    /// Mark the hit as blocked by `percent`.
    ///
    /// A 50% block is the explosive/ranged block signature and reclassifies
    /// the hit as ranged whatever its measured range.
    pub fn with_block(mut self, percent: u32) -> Self {
        self.block = Some(percent);
        if percent == RANGED_BLOCK_PERCENT {
            self.is_ranged = true;
        }
        self
    }

    /// Mark the hit as a backstab.
    pub fn with_backstab(mut self) -> Self {
        self.is_backstab = true;
        self
    }

    /// Mark the hit as a headshot.
    pub fn with_headshot(mut self) -> Self {
        self.is_headshot = true;
        self
    }

    /// Attach the line timestamp.
    pub fn with_timestamp(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Dealt or received.
    pub fn side(&self) -> DamageSide {
        self.side
    }

    /// Whether the local player landed the hit.
    pub fn is_dealt(&self) -> bool {
        self.side == DamageSide::Dealt
    }

    /// Whether the local player took the hit.
    pub fn is_received(&self) -> bool {
        self.side == DamageSide::Received
    }

    /// The damage value on the populated side.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Damage dealt (0 for received hits).
    pub fn dealt_amount(&self) -> f64 {
        if self.is_dealt() {
            self.amount
        } else {
            0.0
        }
    }

    /// Damage received (0 for dealt hits).
    pub fn received_amount(&self) -> f64 {
        if self.is_received() {
            self.amount
        } else {
            0.0
        }
    }

    /// Distance in metres.
    pub fn range(&self) -> f64 {
        self.range
    }

    /// Timestamp of the line the hit came from.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Ranged by distance or by block signature.
    pub fn is_ranged(&self) -> bool {
        self.is_ranged
    }

    /// Beyond the AFK threshold.
    pub fn is_afk(&self) -> bool {
        self.is_afk
    }

    /// Headshot flag.
    pub fn is_headshot(&self) -> bool {
        self.is_headshot
    }

    /// Backstab flag.
    pub fn is_backstab(&self) -> bool {
        self.is_backstab
    }

    /// Whether any block applied.
    pub fn is_blocked(&self) -> bool {
        self.block.is_some()
    }

    /// Block percentage, 0 when the hit was not blocked.
    pub fn block(&self) -> u32 {
        self.block.unwrap_or(0)
    }

    /// Bucket the hit aggregates into.
    pub fn category(&self) -> DamageCategory {
        if self.is_ranged && self.is_afk {
            DamageCategory::Afk
        } else if self.is_ranged {
            DamageCategory::Ranged
        } else {
            DamageCategory::Melee
        }
    }
}
