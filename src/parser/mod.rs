//! Line parser for engine log lines.
//!
//! Turns one raw line into a typed [`Event`]. The line header and module name
//! are parsed here; the payload is handed to the sub-parser registered for the
//! module in [`DISPATCH_TABLE`]. Sub-parsers are pure functions returning a
//! [`Patch`] of field updates that is folded into the event.

pub mod damage;
pub mod modules;

use crate::config::ParserOptions;
use crate::model::{DamageInstance, Event, GameType, LogWarning, RankKind, Region};
use chrono::{DateTime, NaiveDate, Utc};

/// Module name used when a line has no module token.
pub const UNRECOGNIZED_MODULE: &str = "<unrecognized module>";

/// Game and API versions.
pub const MODULE_VERSION: &str = "LogInit";
/// Client-web url carrying the region.
pub const MODULE_REGION: &str = "FrontEnd:Display";
/// Game start and menu return.
pub const MODULE_GAME_STATE: &str = "LogOnline";
/// Server welcome with mode and map.
pub const MODULE_GAME_TYPE: &str = "LogNet";
/// Map loads, used to spot bot maps.
pub const MODULE_BOT_GAME: &str = "LogLoad";
/// Dealt and received hits.
pub const MODULE_DAMAGE: &str = "VictoryDamage:Display";
/// Win, loss, kill and death scores.
pub const MODULE_RANK_SCORING: &str = "LogOnline:Warning";

/// Signature shared by all sub-parsers: `(payload, options) -> patch`.
pub type SubParser = fn(&str, &ParserOptions) -> Patch;

/// Module name to sub-parser. Dispatch is by exact name.
pub const DISPATCH_TABLE: &[(&str, SubParser)] = &[
    (MODULE_VERSION, modules::parse_version),
    (MODULE_REGION, modules::parse_region),
    (MODULE_GAME_STATE, modules::parse_game_state),
    (MODULE_GAME_TYPE, modules::parse_game_type),
    (MODULE_BOT_GAME, modules::parse_bot_game),
    (MODULE_DAMAGE, damage::parse_damage),
    (MODULE_RANK_SCORING, modules::parse_rank_scoring),
];

/// Look up the sub-parser that owns `module`.
pub fn sub_parser_for(module: &str) -> Option<SubParser> {
    DISPATCH_TABLE
        .iter()
        .find(|(name, _)| *name == module)
        .map(|(_, parser)| *parser)
}

// ===== Patch =====

/// One field assignment produced by a sub-parser.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// Game build string.
    GameVersion(String),
    /// Client API version.
    ApiVersion(u32),
    /// Backend region.
    Region(Region),
    /// Round start signal.
    GameStart,
    /// Menu return signal.
    GameEnd,
    /// Mode and map from a welcome.
    GameType(GameType),
    /// Bot or tutorial map loaded.
    BotGame,
    /// One hit.
    Damage {
        /// Other party of the hit.
        opponent: String,
        /// The classified hit.
        instance: DamageInstance,
    },
    /// RankScoring line.
    Rank {
        /// Scored verb.
        kind: RankKind,
        /// Score value as logged.
        score: i64,
    },
}

/// What a sub-parser made of a payload.
///
/// `matched` marks a successful structural match and makes the line
/// interesting, even when the value itself was anomalous.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Patch {
    /// The payload had the owned shape.
    pub matched: bool,
    /// The line matched but must be dropped (bot opponent with bots ignored).
    pub discarded: bool,
    /// Fields to set on the event.
    pub updates: Vec<FieldUpdate>,
    /// Findings about the payload.
    pub warnings: Vec<LogWarning>,
}

impl Patch {
    /// Payload not recognised; nothing to report.
    pub fn no_match() -> Self {
        Self::default()
    }

    /// Payload recognised with a single update.
    pub fn matched(update: FieldUpdate) -> Self {
        Self {
            matched: true,
            updates: vec![update],
            ..Self::default()
        }
    }

    /// Payload recognised but nothing to set.
    pub fn matched_empty() -> Self {
        Self {
            matched: true,
            ..Self::default()
        }
    }

    /// Owned module, payload of the wrong shape.
    pub fn mismatch(warning: LogWarning) -> Self {
        Self {
            warnings: vec![warning],
            ..Self::default()
        }
    }

    /// Attach a warning.
    pub fn with_warning(mut self, warning: LogWarning) -> Self {
        self.warnings.push(warning);
        self
    }

    /// Drop the whole event, including its warnings.
    pub fn discard(mut self) -> Self {
        self.discarded = true;
        self.warnings.clear();
        self
    }
}

// ===== Extraction =====

/// An extracted event with the warnings raised while parsing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// The parsed line.
    pub event: Event,
    /// Warnings raised by the sub-parser.
    pub warnings: Vec<LogWarning>,
}

/// Stateless line-to-event extractor.
#[derive(Debug, Clone, Default)]
pub struct EventExtractor {
    options: ParserOptions,
}

impl EventExtractor {
    /// Extractor for the given options.
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Options in effect.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Extract one line. See [`extract_event`].
    pub fn extract(&self, line: &str, line_number: usize) -> Extraction {
        extract_event(line, line_number, &self.options)
    }
}

/// Parse a single line into an [`Event`].
///
/// Never fails: lines without a header have no timestamp, lines without a
/// module token get [`UNRECOGNIZED_MODULE`], and payloads no sub-parser
/// recognises yield an uninteresting event.
///
/// # Arguments
///
/// * `line` - The raw line, without trailing newline
/// * `line_number` - 1-based line number, used for warnings
/// * `options` - Parser options (bot filtering)
pub fn extract_event(line: &str, line_number: usize, options: &ParserOptions) -> Extraction {
    let (timestamp, rest) = match parse_header(line) {
        Some((timestamp, rest)) => (timestamp, rest),
        None => (None, line),
    };
    let (module, payload) = split_module(rest);

    let patch = match sub_parser_for(module) {
        Some(parser) => parser(payload, options),
        None => Patch::no_match(),
    };

    let base = Event {
        line_number,
        timestamp,
        module: module.to_string(),
        ..Event::default()
    };

    fold_patch(base, patch)
}

/// Fold a sub-parser patch into an event.
fn fold_patch(base: Event, patch: Patch) -> Extraction {
    let Patch {
        matched,
        discarded,
        updates,
        warnings,
    } = patch;

    let mut event = updates.into_iter().fold(base, apply_update);
    event.interesting = matched && !discarded;

    Extraction { event, warnings }
}

fn apply_update(mut event: Event, update: FieldUpdate) -> Event {
    match update {
        FieldUpdate::GameVersion(game) => event.version.game = Some(game),
        FieldUpdate::ApiVersion(api) => event.version.api = Some(api),
        FieldUpdate::Region(region) => event.region = Some(region),
        FieldUpdate::GameStart => event.is_game_start = true,
        FieldUpdate::GameEnd => event.is_game_end = true,
        FieldUpdate::GameType(game_type) => event.game_type = Some(game_type),
        FieldUpdate::BotGame => event.is_bot_game = true,
        FieldUpdate::Damage { opponent, instance } => {
            // Hits carry the line time so the round log can be replayed
            event.damage = Some(instance.with_timestamp(event.timestamp));
            event.opponent = Some(opponent);
        }
        FieldUpdate::Rank { kind, score } => {
            event.score = Some(score);
            match kind {
                RankKind::Win => event.is_win = true,
                RankKind::Loss => event.is_loss = true,
                RankKind::Kill => event.is_kill = true,
                RankKind::Death => event.is_death = true,
            }
        }
    }
    event
}

// ===== Header =====

/// Split off the `[YYYY.MM.DD-HH.MM.SS:mmm][seq]` header.
///
/// Returns `None` when the line does not start with a header. A header whose
/// digits do not form a valid date is still stripped but yields no timestamp.
pub fn parse_header(line: &str) -> Option<(Option<DateTime<Utc>>, &str)> {
    let inner_and_rest = line.strip_prefix('[')?;
    let (stamp, rest) = inner_and_rest.split_once(']')?;

    // Same character class the client uses for the stamp
    let is_stamp = !stamp.is_empty()
        && stamp
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | ':'));
    if !is_stamp {
        return None;
    }

    // Optional frame counter bracket, any width (e.g. "[464]" or "[  0]")
    let rest = match rest.strip_prefix('[') {
        Some(seq_and_rest) => match seq_and_rest.split_once(']') {
            Some((_, after)) => after,
            None => rest,
        },
        None => rest,
    };

    Some((parse_stamp(stamp), rest))
}

/// Parse `YYYY.MM.DD-HH.MM.SS:mmm` by fixed offsets into a UTC time.
fn parse_stamp(stamp: &str) -> Option<DateTime<Utc>> {
    let field = |range: std::ops::Range<usize>| -> Option<u32> { stamp.get(range)?.parse().ok() };

    let year = stamp.get(0..4)?.parse::<i32>().ok()?;
    let month = field(5..7)?;
    let day = field(8..10)?;
    let hour = field(11..13)?;
    let minute = field(14..16)?;
    let second = field(17..19)?;
    let millis = field(20..23)?;

    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_milli_opt(hour, minute, second, millis)
        .map(|naive| naive.and_utc())
}

/// Split the module token from the payload.
///
/// The module is everything up to the first whitespace, with one trailing
/// colon removed. The payload is the remainder with leading whitespace
/// trimmed.
pub fn split_module(rest: &str) -> (&str, &str) {
    let token_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let token = &rest[..token_end];
    if token.is_empty() {
        return (UNRECOGNIZED_MODULE, rest.trim_start());
    }

    let module = token.strip_suffix(':').unwrap_or(token);
    let module = if module.is_empty() {
        UNRECOGNIZED_MODULE
    } else {
        module
    };
    (module, rest[token_end..].trim_start())
}

/// Byte offset of `needle` in `haystack`, ignoring ASCII case.
pub(crate) fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    // ASCII lowercasing keeps byte offsets, so the index is valid for `haystack`
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
