//! Tests for the session orchestrator.

use super::*;
use crate::model::WarningCategory;
use chrono::{TimeZone, Utc};

const SOLO_WELCOME: &str = "LogNet: Welcomed by server (Level: /Game/Maps/Jungle/Jungle_P, Game: /Game/Blueprints/GameMode/VictoryGameMode_Solo.VictoryGameMode_Solo_C)";
const PLAYING: &str = "LogOnline: GotoState: NewState: Playing";
const MAIN_MENU: &str = "LogOnline: GotoState: NewState: MainMenu";
const BOT: &str = "<BOT>2-FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF";

/// Prefix `body` with a header `secs` seconds after 18:00:00.
fn line(secs: u32, body: &str) -> String {
    format!(
        "[2016.08.19-18.{:02}.{:02}:000][{}]{}",
        secs / 60,
        secs % 60,
        secs,
        body
    )
}

fn at(secs: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 8, 19, 18, 0, 0).unwrap() + chrono::Duration::seconds(secs as i64)
}

fn analyze(lines: &[String]) -> SessionResult {
    analyze_lines(lines, ParserOptions::default())
}

fn direct_kill_round(offset: u32, opponent: &str) -> Vec<String> {
    vec![
        line(offset, SOLO_WELCOME),
        line(offset + 1, PLAYING),
        line(
            offset + 2,
            &format!("VictoryDamage:Display: You hit {} for 20 damage (1 m)", opponent),
        ),
        line(offset + 3, "LogOnline:Warning: RankScoring death: 0"),
        line(offset + 4, "LogOnline:Warning: RankScoring loss: 12"),
        line(
            offset + 5,
            &format!("VictoryDamage:Display: Struck by {} for 10 damage (5 m)", opponent),
        ),
    ]
}

// ===== Round finishing paths =====

#[test]
fn death_then_damage_finishes_on_damage_line() {
    let lines = vec![
        line(0, PLAYING),
        line(1, "LogOnline:Warning: RankScoring death: 0"),
        line(2, "VictoryDamage:Display: Struck by X for 10 damage (5 m)"),
    ];
    let result = analyze(&lines);

    assert_eq!(result.rounds.len(), 1);
    let round = &result.rounds[0];
    assert!(round.is_finished());
    assert!(!round.force_finished());
    assert!(round.is_loss());
    assert_eq!(round.end(), Some(at(2)));
}

#[test]
fn death_then_menu_finishes_on_menu_line() {
    let lines = vec![
        line(0, PLAYING),
        line(1, "LogOnline:Warning: RankScoring death: 0"),
        line(9, MAIN_MENU),
    ];
    let result = analyze(&lines);

    assert_eq!(result.rounds.len(), 1);
    let round = &result.rounds[0];
    assert!(!round.force_finished());
    assert_eq!(round.end(), Some(at(9)));
}

#[test]
fn open_round_is_force_finished_at_end_of_input() {
    let lines = vec![
        line(0, PLAYING),
        line(4, "VictoryDamage:Display: You hit Y for 7 damage (1 m)"),
    ];
    let result = analyze(&lines);

    assert_eq!(result.rounds.len(), 1);
    let round = &result.rounds[0];
    assert!(round.force_finished());
    assert_eq!(round.end(), Some(at(4)));
    assert!(round.end() >= round.start());
}

#[test]
fn abort_discards_open_round() {
    let mut orchestrator = SessionOrchestrator::new(ParserOptions::default());
    orchestrator.feed_lines(vec![
        line(0, PLAYING),
        line(4, "VictoryDamage:Display: You hit Y for 7 damage (1 m)"),
    ]);
    let result = orchestrator.abort();

    assert!(result.rounds.is_empty());
    // Global damage is already folded
    assert_eq!(result.summary.damage.dealt().count, 1);
}

#[test]
fn idle_placeholder_is_never_appended() {
    let result = analyze(&[line(0, MAIN_MENU), line(1, SOLO_WELCOME)]);
    assert!(result.rounds.is_empty());
}

#[test]
fn rounds_get_increasing_ids() {
    let mut lines = direct_kill_round(0, "A");
    lines.extend(direct_kill_round(100, "B"));
    let result = analyze(&lines);

    let ids: Vec<u32> = result.rounds.iter().map(|r| r.id().get()).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn second_game_start_warns_once_and_keeps_round() {
    let result = analyze(&[line(0, PLAYING), line(5, PLAYING), line(6, PLAYING)]);

    assert_eq!(result.rounds.len(), 1);
    assert_eq!(result.rounds[0].start(), Some(at(0)));
    let lifecycle: Vec<_> = result
        .metadata
        .warnings
        .records()
        .iter()
        .filter(|r| r.category == WarningCategory::Lifecycle)
        .collect();
    assert_eq!(lifecycle.len(), 1);
    assert_eq!(lifecycle[0].occurrences, 2);
}

// ===== Aggregates =====

#[test]
fn times_met_counts_rounds_not_hits() {
    let mut lines = direct_kill_round(0, "Alice");
    lines.extend(direct_kill_round(100, "Alice"));
    let result = analyze(&lines);

    let alice = &result.players["Alice"];
    assert_eq!(alice.times_met, 2);
    assert_eq!(alice.damage.dealt().count, 2);
    assert_eq!(alice.damage.received().count, 2);
}

#[test]
fn trailing_hit_after_finish_stays_out_of_next_round() {
    let lines = vec![
        line(0, PLAYING),
        line(1, "LogOnline:Warning: RankScoring death: 0"),
        line(2, "VictoryDamage:Display: Struck by Killer for 10 damage (5 m)"),
        line(3, "VictoryDamage:Display: Struck by Killer for 5 damage (5 m)"),
        line(4, MAIN_MENU),
        line(10, PLAYING),
        line(20, MAIN_MENU),
    ];
    let result = analyze(&lines);

    assert_eq!(result.rounds.len(), 2);
    let first = &result.rounds[0];
    assert_eq!(first.damage_instances().len(), 1);
    assert!(first.opponents().contains_key("Killer"));

    let second = &result.rounds[1];
    assert!(second.damage_instances().is_empty());
    assert!(second.opponents().is_empty());
    assert!(second.damage().is_empty());

    assert_eq!(result.players["Killer"].times_met, 1);
    // Between-round hits still reach the session totals
    assert_eq!(result.summary.damage.received().count, 2);
    assert_eq!(result.summary.damage.received().amount, 15.0);
}

#[test]
fn hit_before_first_round_counts_only_globally() {
    let lines = vec![
        line(0, "VictoryDamage:Display: You hit Early for 3 damage (1 m)"),
        line(1, PLAYING),
        line(2, MAIN_MENU),
    ];
    let result = analyze(&lines);

    assert_eq!(result.rounds.len(), 1);
    assert!(result.rounds[0].opponents().is_empty());
    assert!(!result.players.contains_key("Early"));
    assert_eq!(result.summary.damage.dealt().count, 1);
}

#[test]
fn global_damage_includes_every_hit() {
    let result = analyze(&direct_kill_round(0, "Alice"));
    assert_eq!(result.summary.damage.dealt().amount, 20.0);
    assert_eq!(result.summary.damage.received().amount, 10.0);
}

#[test]
fn scoring_counts_under_known_mode() {
    let result = analyze(&direct_kill_round(0, "Alice"));
    assert_eq!(result.summary.deaths, 1);
    assert_eq!(result.summary.losses, 1);
    assert_eq!(result.rounds[0].mode(), GameMode::Solo);
    assert_eq!(result.rounds[0].level(), Some("Jungle/Jungle_P"));
}

#[test]
fn scoring_under_unknown_mode_is_skipped_with_warning() {
    let lines = vec![
        line(0, PLAYING),
        line(1, "LogOnline:Warning: RankScoring kill: 5"),
        line(2, "LogOnline:Warning: RankScoring kill: 5"),
    ];
    let result = analyze(&lines);

    assert_eq!(result.summary.kills, 0);
    // Still counted on the round itself
    assert_eq!(result.rounds[0].kills(), 2);
    assert_eq!(result.metadata.warnings.len(), 1);
    assert!(result.metadata.warnings.contains("kill"));
}

#[test]
fn bot_map_overrides_welcome_mode_until_round_ends() {
    let mut lines = vec![
        line(0, "LogLoad: LoadMap: /Game/Maps/Jungle/Jungle_P?bBots=1"),
        line(1, SOLO_WELCOME),
        line(2, PLAYING),
        line(3, "LogOnline:Warning: RankScoring win: 100"),
        line(4, MAIN_MENU),
    ];
    lines.extend(direct_kill_round(100, "Alice"));
    let result = analyze(&lines);

    assert_eq!(result.rounds.len(), 2);
    assert_eq!(result.rounds[0].mode(), GameMode::Bot);
    assert!(result.rounds[0].is_win());
    assert_eq!(result.summary.wins, 0);
    assert_eq!(result.rounds[1].mode(), GameMode::Solo);
}

#[test]
fn region_carries_into_later_rounds() {
    let mut lines = vec![line(
        0,
        "FrontEnd:Display: appid is 437220, using url https://clientweb-eu.theculling.net/api",
    )];
    lines.extend(direct_kill_round(10, "A"));
    lines.extend(direct_kill_round(100, "B"));
    let result = analyze(&lines);

    assert!(result.rounds.iter().all(|r| r.region() == Region::Eu));
}

#[test]
fn ignored_bots_never_reach_aggregates() {
    let lines = vec![
        line(0, SOLO_WELCOME),
        line(1, PLAYING),
        line(2, &format!("VictoryDamage:Display: You hit {} for 20 damage (1 m)", BOT)),
        line(3, "VictoryDamage:Display: You hit Human for 5 damage (1 m)"),
        line(4, MAIN_MENU),
    ];
    let result = analyze_lines(&lines, ParserOptions { ignore_bots: true });

    assert!(!result.players.contains_key(BOT));
    assert_eq!(result.players.len(), 1);
    assert_eq!(result.summary.damage.dealt().amount, 5.0);
    assert_eq!(result.rounds[0].damage_instances().len(), 1);
}

// ===== Metadata =====

#[test]
fn line_counts_and_modules() {
    let lines = vec![
        line(0, "LogInit: Version: 4.11.2-93315+++RedHarvest+Staging"),
        String::new(),
        line(1, "LogTemp: nothing to see"),
        line(2, PLAYING),
    ];
    let result = analyze(&lines);

    assert_eq!(result.metadata.total_lines, 4);
    assert_eq!(result.metadata.relevant_lines, 2);
    assert_eq!(result.events.len(), 2);
    assert_eq!(result.metadata.modules, vec!["LogInit", "LogTemp", "LogOnline"]);
    assert_eq!(
        result.metadata.game_version.as_deref(),
        Some("4.11.2-93315+++RedHarvest+Staging")
    );
    assert_eq!(result.metadata.start, Some(at(0)));
    assert_eq!(result.metadata.end, Some(at(2)));
}

#[test]
fn first_nonzero_api_version_is_kept() {
    let result = analyze(&[
        line(0, "LogInit: API Version: 0"),
        line(1, "LogInit: API Version: 95121"),
        line(2, "LogInit: API Version: 95121"),
    ]);
    assert_eq!(result.metadata.api_version, Some(95121));
    assert!(result.metadata.warnings.is_empty());
}

#[test]
fn api_version_mismatch_warns_without_overwrite() {
    let result = analyze(&[
        line(0, "LogInit: API Version: 93315"),
        line(1, "LogInit: API Version: 95121"),
    ]);
    assert_eq!(result.metadata.api_version, Some(93315));
    assert_eq!(result.metadata.warnings.len(), 1);
    assert_eq!(
        result.metadata.warnings.records()[0].category,
        WarningCategory::Version
    );
}

#[test]
fn old_api_version_warns_twice() {
    let result = analyze(&[line(0, "LogInit: API Version: 90000")]);
    let messages: Vec<_> = result
        .metadata
        .warnings
        .records()
        .iter()
        .map(|r| r.message.clone())
        .collect();
    assert_eq!(messages.len(), 2, "{:?}", messages);
}

#[test]
fn abnormal_block_warns_once_and_processing_continues() {
    let lines = vec![
        line(0, SOLO_WELCOME),
        line(1, PLAYING),
        line(2, "VictoryDamage:Display: Struck by Z for 30 damage (1 m) BLOCKED 37%"),
        line(3, "VictoryDamage:Display: You hit Z for 10 damage (1 m)"),
        line(4, MAIN_MENU),
    ];
    let result = analyze(&lines);

    let records = result.metadata.warnings.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].message.contains("37"));
    assert_eq!(records[0].first_line, Some(3));

    let round = &result.rounds[0];
    assert_eq!(round.damage().melee.received.melee_block_count, 1);
    assert_eq!(round.damage_instances().len(), 2);
}

#[test]
fn malformed_damage_line_is_warned_and_skipped() {
    let result = analyze(&[line(0, "VictoryDamage:Display: You hit nobody")]);
    assert_eq!(result.metadata.relevant_lines, 0);
    assert_eq!(
        result.metadata.warnings.records()[0].category,
        WarningCategory::Structural
    );
}

#[test]
fn analyze_str_handles_crlf() {
    let text = format!("{}\r\n{}\r\n", line(0, PLAYING), line(3, MAIN_MENU));
    let result = analyze_str(&text, ParserOptions::default());
    assert_eq!(result.rounds.len(), 1);
    assert_eq!(result.rounds[0].end(), Some(at(3)));
}
