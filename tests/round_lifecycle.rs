//! Round lifecycle scenarios through the public API.

use chrono::{DateTime, TimeZone, Utc};
use culling_log_parser::model::{DamageCategory, DamageInstance, Event, WarningCategory};
use culling_log_parser::state::{transition, RoundEffect, RoundState};
use culling_log_parser::{analyze_str, ParserOptions, SessionOrchestrator};

fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 8, 19, h, m, s).unwrap()
}

fn analyze(log: &str) -> culling_log_parser::model::SessionResult {
    analyze_str(log, ParserOptions::default())
}

#[test]
fn direct_kill_finishes_on_damage_line() {
    let result = analyze(
        "[2016.08.19-18.46.20:000][1]LogOnline: GotoState: NewState: Playing
[2016.08.19-18.49.00:000][2]LogOnline:Warning: RankScoring death: -5
[2016.08.19-18.49.01:000][3]VictoryDamage:Display: Struck by X for 10 damage (5 m)
",
    );

    assert_eq!(result.rounds.len(), 1);
    let round = &result.rounds[0];
    assert!(round.is_loss());
    assert!(round.is_finished());
    assert!(!round.force_finished());
    assert_eq!(round.start(), Some(at(18, 46, 20)));
    assert_eq!(round.end(), Some(at(18, 49, 1)));
    assert_eq!(
        round.damage().category(DamageCategory::Ranged).received.count,
        1,
        "the killing blow still lands in the round"
    );
}

#[test]
fn indirect_kill_finishes_on_menu_line() {
    let result = analyze(
        "[2016.08.19-18.46.20:000][1]LogOnline: GotoState: NewState: Playing
[2016.08.19-18.49.00:000][2]LogOnline:Warning: RankScoring death: -5
[2016.08.19-18.51.49:605][3]LogOnline: GotoState: NewState: MainMenu
",
    );

    assert_eq!(result.rounds.len(), 1);
    let round = &result.rounds[0];
    assert!(round.is_loss());
    assert!(!round.force_finished());
    assert_eq!(
        round.end(),
        Some(at(18, 51, 49) + chrono::Duration::milliseconds(605))
    );
}

#[test]
fn win_alone_does_not_close_round() {
    let mut orchestrator = SessionOrchestrator::new(ParserOptions::default());
    orchestrator.feed_line("[2016.08.19-18.46.20:000][1]LogOnline: GotoState: NewState: Playing");
    orchestrator.feed_line("[2016.08.19-18.59.00:000][2]LogOnline:Warning: RankScoring win: 300");

    assert_eq!(orchestrator.current_round().state(), RoundState::Open);
    assert!(orchestrator.current_round().round().is_win());

    let result = orchestrator.finish();
    assert_eq!(result.rounds.len(), 1);
    assert!(result.rounds[0].force_finished());
    assert_eq!(result.rounds[0].end(), Some(at(18, 59, 0)));
}

#[test]
fn truncated_log_force_finishes_open_round() {
    let result = analyze(
        "[2016.08.19-18.46.20:000][1]LogOnline: GotoState: NewState: Playing
[2016.08.19-18.47.00:000][2]VictoryDamage:Display: You hit Alice for 22 damage (1.77 m)
",
    );

    assert_eq!(result.rounds.len(), 1);
    let round = &result.rounds[0];
    assert!(round.force_finished());
    assert_eq!(round.end(), Some(at(18, 47, 0)));
    let melee = round.damage().category(DamageCategory::Melee);
    assert_eq!(melee.dealt.count, 1);
    assert_eq!(melee.dealt.amount, 22.0);
    assert_eq!(melee.dealt.average_range(), 1.77);
}

#[test]
fn abnormal_block_warns_once_and_continues() {
    let result = analyze(
        "[2016.08.19-18.46.20:000][1]LogOnline: GotoState: NewState: Playing
[2016.08.19-18.47.00:000][2]VictoryDamage:Display: Struck by Bob for 5 damage (1 m) BLOCKED 37%
[2016.08.19-18.47.01:000][3]VictoryDamage:Display: Struck by Bob for 5 damage (1 m) BLOCKED 37%
[2016.08.19-18.47.02:000][4]VictoryDamage:Display: You hit Bob for 9 damage (1 m)
",
    );

    let warnings = &result.metadata.warnings;
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings.records()[0].category, WarningCategory::UnknownEnumeration);
    assert_eq!(warnings.records()[0].occurrences, 2);

    let melee = result.rounds[0].damage().category(DamageCategory::Melee);
    assert_eq!(melee.received.melee_block_count, 2);
    assert_eq!(melee.dealt.count, 1, "later lines still processed");
}

#[test]
fn menu_before_any_round_is_ignored() {
    let result = analyze("[2016.08.19-18.00.00:000][1]LogOnline: GotoState: NewState: MainMenu\n");
    assert!(result.rounds.is_empty());
}

// ===== Transition function =====

#[test]
fn transition_game_start_opens_idle_round() {
    let event = Event {
        timestamp: Some(at(18, 0, 0)),
        is_game_start: true,
        ..Event::default()
    };
    let (state, effects) = transition(RoundState::Idle, &event);
    assert_eq!(state, RoundState::Open);
    assert_eq!(effects, vec![RoundEffect::Start(Some(at(18, 0, 0)))]);
}

#[test]
fn transition_received_hit_after_death_finishes() {
    let event = Event {
        timestamp: Some(at(18, 5, 0)),
        opponent: Some("X".to_string()),
        damage: Some(DamageInstance::received(10.0, 5.0)),
        ..Event::default()
    };
    let (state, effects) = transition(RoundState::AwaitingFinishDamage, &event);
    assert_eq!(state, RoundState::Finished);
    assert_eq!(
        effects,
        vec![
            RoundEffect::FoldDamage,
            RoundEffect::Finish {
                end: Some(at(18, 5, 0)),
                score: None
            }
        ]
    );
}

#[test]
fn transition_dealt_hit_after_death_keeps_waiting() {
    let event = Event {
        opponent: Some("X".to_string()),
        damage: Some(DamageInstance::dealt(10.0, 5.0)),
        ..Event::default()
    };
    let (state, effects) = transition(RoundState::AwaitingFinishDamage, &event);
    assert_eq!(state, RoundState::AwaitingFinishDamage);
    assert_eq!(effects, vec![RoundEffect::FoldDamage]);
}

#[test]
fn transition_finished_ignores_everything() {
    let event = Event {
        is_game_start: true,
        is_win: true,
        ..Event::default()
    };
    let (state, effects) = transition(RoundState::Finished, &event);
    assert_eq!(state, RoundState::Finished);
    assert!(effects.is_empty());
}
