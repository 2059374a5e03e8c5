//! `VictoryDamage:Display` sub-parser.
//!
//! ```text
//! You hit <name> for <amount> damage (<range> m) [BLOCKED <n>%] [BACKSTAB!] [HEADSHOT!]
//! Struck by <name> for <amount> damage (<range> m) [...]
//! ```

use super::{find_ignore_ascii_case, FieldUpdate, Patch};
use crate::config::ParserOptions;
use crate::model::event::KNOWN_BLOCK_PERCENTS;
use crate::model::{DamageInstance, DamageSide, LogWarning};

const DEALT_PREFIX: &str = "You hit ";
const RECEIVED_PREFIX: &str = "Struck by ";
const AMOUNT_SEPARATOR: &str = " for ";
const DAMAGE_OPEN: &str = " damage (";
const RANGE_CLOSE: &str = " m)";
const BLOCKED_MARKER: &str = "BLOCKED ";
const BACKSTAB_MARKER: &str = "BACKSTAB!";
const HEADSHOT_MARKER: &str = "HEADSHOT!";

const BOT_TAG: &str = "<BOT>";
const BOT_HEX_ID_LEN: usize = 32;

/// Parse a damage payload.
///
/// A payload matching neither shape is a structural mismatch and yields a
/// warning. Anomalous qualifiers are applied and warned about.
pub fn parse_damage(payload: &str, options: &ParserOptions) -> Patch {
    let Some(hit) = parse_hit(payload) else {
        return Patch::mismatch(LogWarning::MalformedDamage {
            payload: payload.to_string(),
        });
    };

    let mut warnings = Vec::new();
    let mut instance = DamageInstance::new(hit.side, hit.amount, hit.range);

    if let Some(percent) = parse_block(hit.suffix) {
        instance = instance.with_block(percent);
        if !KNOWN_BLOCK_PERCENTS.contains(&percent) {
            warnings.push(LogWarning::AbnormalBlock { percent });
        }
    }
    if hit.suffix.contains(BACKSTAB_MARKER) {
        instance = instance.with_backstab();
    }
    if hit.suffix.contains(HEADSHOT_MARKER) {
        instance = instance.with_headshot();
    }

    if instance.is_blocked() && instance.is_backstab() {
        warnings.push(LogWarning::BackstabWhileBlocked);
    }
    if instance.is_blocked() && instance.is_afk() {
        warnings.push(LogWarning::AfkRangeWhileBlocked);
    }

    let is_bot = is_bot_name(hit.opponent);
    let patch = warnings.into_iter().fold(
        Patch::matched(FieldUpdate::Damage {
            opponent: hit.opponent.to_string(),
            instance,
        }),
        Patch::with_warning,
    );

    if options.ignore_bots && is_bot {
        patch.discard()
    } else {
        patch
    }
}

/// Structural pieces of a damage payload.
#[derive(Debug, Clone, PartialEq)]
struct RawHit<'a> {
    side: DamageSide,
    opponent: &'a str,
    amount: f64,
    range: f64,
    suffix: &'a str,
}

fn parse_hit(payload: &str) -> Option<RawHit<'_>> {
    let (side, rest) = if let Some(start) = find_ignore_ascii_case(payload, DEALT_PREFIX) {
        (DamageSide::Dealt, &payload[start + DEALT_PREFIX.len()..])
    } else {
        let start = find_ignore_ascii_case(payload, RECEIVED_PREFIX)?;
        (DamageSide::Received, &payload[start + RECEIVED_PREFIX.len()..])
    };

    // "<name> for <amount>" | " damage (" | "<range> m)<suffix>"
    let damage_open = find_ignore_ascii_case(rest, DAMAGE_OPEN)?;
    let head = &rest[..damage_open];
    let tail = &rest[damage_open + DAMAGE_OPEN.len()..];

    // Names may contain " for ", so split on the last one
    let separator = head.to_ascii_lowercase().rfind(AMOUNT_SEPARATOR)?;
    let opponent = &head[..separator];
    let amount_text = &head[separator + AMOUNT_SEPARATOR.len()..];
    if opponent.is_empty() {
        return None;
    }
    let amount = parse_decimal(amount_text, true)?;

    let range_close = tail.find(RANGE_CLOSE)?;
    let range = parse_decimal(&tail[..range_close], false)?;
    let suffix = &tail[range_close + RANGE_CLOSE.len()..];

    Some(RawHit {
        side,
        opponent,
        amount,
        range,
        suffix,
    })
}

/// Parse `-?[0-9.]+` (sign only when allowed) into a float.
fn parse_decimal(text: &str, allow_negative: bool) -> Option<f64> {
    let digits = match text.strip_prefix('-') {
        Some(rest) if allow_negative => rest,
        Some(_) => return None,
        None => text,
    };
    let well_formed = digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.');
    if !well_formed {
        return None;
    }
    text.parse().ok()
}

/// Percentage from a `BLOCKED <n>%` suffix.
fn parse_block(suffix: &str) -> Option<u32> {
    let start = find_ignore_ascii_case(suffix, BLOCKED_MARKER)?;
    let rest = &suffix[start + BLOCKED_MARKER.len()..];
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 || !rest[digits_end..].starts_with('%') {
        return None;
    }
    rest[..digits_end].parse().ok()
}

/// Whether a player name carries a bot identifier: `<BOT>`, a digit, `-`,
/// then a 32 character uppercase hex id.
pub fn is_bot_name(name: &str) -> bool {
    name.match_indices(BOT_TAG)
        .any(|(index, _)| is_bot_id(&name.as_bytes()[index + BOT_TAG.len()..]))
}

fn is_bot_id(bytes: &[u8]) -> bool {
    bytes.len() >= 2 + BOT_HEX_ID_LEN
        && bytes[0].is_ascii_digit()
        && bytes[1] == b'-'
        && bytes[2..2 + BOT_HEX_ID_LEN]
            .iter()
            .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(b))
}
