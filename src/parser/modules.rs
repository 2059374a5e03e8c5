//! Sub-parsers for the session-level modules: version, region, game state,
//! game type, bot games and rank scoring.
//!
//! Each function receives the payload of a line whose module it owns. Lines
//! of the owned module that carry unrelated chatter return [`Patch::no_match`].

use super::{find_ignore_ascii_case, FieldUpdate, Patch};
use crate::config::ParserOptions;
use crate::model::{GameMode, GameType, LogWarning, RankKind, Region};

// ===== Version (LogInit) =====

const API_VERSION_PREFIX: &str = "API Version:";
const GAME_VERSION_PREFIX: &str = "Version:";

/// `Version: <game>` or `API Version: <integer>`.
pub fn parse_version(payload: &str, _options: &ParserOptions) -> Patch {
    if let Some(raw) = payload.strip_prefix(API_VERSION_PREFIX) {
        let raw = raw.trim();
        let digits_end = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
        return match raw[..digits_end].parse::<u32>() {
            Ok(api) => Patch::matched(FieldUpdate::ApiVersion(api)),
            Err(_) => Patch::mismatch(LogWarning::InvalidApiVersion {
                raw: raw.to_string(),
            }),
        };
    }

    match payload.strip_prefix(GAME_VERSION_PREFIX) {
        Some(game) if !game.trim().is_empty() => {
            Patch::matched(FieldUpdate::GameVersion(game.trim().to_string()))
        }
        _ => Patch::no_match(),
    }
}

// ===== Region (FrontEnd:Display) =====

const APPID_MARKER: &str = "appid is ";
const CLIENT_WEB_PREFIX: &str = ", using url https://clientweb-";
const CLIENT_WEB_SUFFIX: &str = ".theculling.net/api";

/// `appid is <id>, using url https://clientweb-<region>.theculling.net/api`.
pub fn parse_region(payload: &str, _options: &ParserOptions) -> Patch {
    let Some(after_appid) = payload.strip_prefix(APPID_MARKER) else {
        return Patch::no_match();
    };
    let Some((_, after_prefix)) = after_appid.split_once(CLIENT_WEB_PREFIX) else {
        return Patch::no_match();
    };
    let Some((raw, _)) = after_prefix.split_once(CLIENT_WEB_SUFFIX) else {
        return Patch::no_match();
    };

    let region = Region::from_host_fragment(raw);
    let patch = Patch::matched(FieldUpdate::Region(region));
    if region == Region::Unknown {
        patch.with_warning(LogWarning::UnknownRegion {
            raw: raw.to_string(),
        })
    } else {
        patch
    }
}

// ===== Game state (LogOnline) =====

const STATE_PLAYING: &str = "GotoState: NewState: Playing";
const STATE_MAIN_MENU: &str = "GotoState: NewState: MainMenu";

/// Client state changes into a match or back to the menu.
pub fn parse_game_state(payload: &str, _options: &ParserOptions) -> Patch {
    if payload.contains(STATE_PLAYING) {
        Patch::matched(FieldUpdate::GameStart)
    } else if payload.contains(STATE_MAIN_MENU) {
        Patch::matched(FieldUpdate::GameEnd)
    } else {
        Patch::no_match()
    }
}

// ===== Game type (LogNet) =====

const WELCOME_MARKER: &str = "Welcomed by server";
const LEVEL_PREFIX: &str = "(Level: /Game/Maps/";
const GAME_PREFIX: &str = ", Game: /Game/Blueprints/GameMode/";

/// Server game mode class to match type.
pub static GAME_MODES: phf::Map<&'static str, GameMode> = phf::phf_map! {
    "VictoryGameMode_Solo.VictoryGameMode_Solo_C" => GameMode::Solo,
    "VictoryGameMode.VictoryGameMode_C" => GameMode::Team,
    "VictoryGameMode_Lightning.VictoryGameMode_Lightning_C" => GameMode::Lightning,
    "VictoryGameMode_Custom.VictoryGameMode_Custom_C" => GameMode::Custom,
    "VictoryGameMode_TrialsSolo.VictoryGameMode_TrialsSolo_C" => GameMode::Trials,
};

/// `Welcomed by server (Level: /Game/Maps/<level>, Game: /Game/Blueprints/GameMode/<key>)`.
///
/// An unmapped mode key still matches, with [`GameMode::Unknown`] and a
/// warning.
pub fn parse_game_type(payload: &str, _options: &ParserOptions) -> Patch {
    if !payload.contains(WELCOME_MARKER) {
        return Patch::no_match();
    }

    let Some((level, key)) = split_welcome(payload) else {
        return Patch::mismatch(LogWarning::MalformedWelcome {
            payload: payload.to_string(),
        });
    };

    let mode = GAME_MODES.get(key).copied().unwrap_or_default();
    let patch = Patch::matched(FieldUpdate::GameType(GameType {
        mode,
        level: level.to_string(),
    }));
    if mode == GameMode::Unknown {
        patch.with_warning(LogWarning::UnknownGameMode {
            key: key.to_string(),
        })
    } else {
        patch
    }
}

fn split_welcome(payload: &str) -> Option<(&str, &str)> {
    let level_start = find_ignore_ascii_case(payload, LEVEL_PREFIX)? + LEVEL_PREFIX.len();
    let rest = &payload[level_start..];

    let game_at = find_ignore_ascii_case(rest, GAME_PREFIX)?;
    let level = &rest[..game_at];
    let rest = &rest[game_at + GAME_PREFIX.len()..];

    let key = &rest[..rest.find(')')?];
    if level.is_empty() || level.contains(',') || key.is_empty() {
        return None;
    }
    Some((level, key))
}

// ===== Bot game (LogLoad) =====

const LOAD_MAP_PREFIX: &str = "LoadMap:";
const TUTORIAL_MAP: &str = "/Game/Maps/Tutorial";
const JUNGLE_MAP: &str = "/Game/Maps/Jungle";

/// `LoadMap: <url>` for the tutorial map, or the jungle map with bots enabled.
pub fn parse_bot_game(payload: &str, _options: &ParserOptions) -> Patch {
    let Some(url) = payload.strip_prefix(LOAD_MAP_PREFIX) else {
        return Patch::no_match();
    };

    let mut parts = url.trim().split('?');
    let path = parts.next().unwrap_or_default();

    let is_bot_game = path.contains(TUTORIAL_MAP)
        || (path.contains(JUNGLE_MAP) && parts.any(is_bot_flag));
    if is_bot_game {
        Patch::matched(FieldUpdate::BotGame)
    } else {
        Patch::no_match()
    }
}

/// `bots`, `bBots`, optionally `=1` or `=true`.
fn is_bot_flag(option: &str) -> bool {
    let (name, value) = option.split_once('=').unwrap_or((option, "1"));
    let is_bot_name = name.eq_ignore_ascii_case("bots") || name.eq_ignore_ascii_case("bbots");
    is_bot_name && (value == "1" || value.eq_ignore_ascii_case("true"))
}

// ===== Rank scoring (LogOnline:Warning) =====

const RANK_SCORING_PREFIX: &str = "RankScoring ";

/// `RankScoring <verb>: <signed integer>`.
pub fn parse_rank_scoring(payload: &str, _options: &ParserOptions) -> Patch {
    let Some(start) = find_ignore_ascii_case(payload, RANK_SCORING_PREFIX) else {
        return Patch::no_match();
    };
    let Some((verb, value)) = payload[start + RANK_SCORING_PREFIX.len()..].split_once(':') else {
        return Patch::no_match();
    };
    let verb = verb.trim();
    if verb.is_empty() || !verb.chars().all(|c| c.is_ascii_alphabetic()) {
        return Patch::no_match();
    }
    let Some(score) = parse_signed_prefix(value.trim_start()) else {
        return Patch::no_match();
    };

    match RankKind::parse(verb) {
        Some(kind) => Patch::matched(FieldUpdate::Rank { kind, score }),
        None => Patch::matched_empty().with_warning(LogWarning::UnknownRankVerb {
            verb: verb.to_string(),
        }),
    }
}

/// Leading `-?[0-9]+` of `text`.
fn parse_signed_prefix(text: &str) -> Option<i64> {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let sign_len = text.len() - unsigned.len();
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if digits == 0 {
        return None;
    }
    text[..sign_len + digits].parse().ok()
}
