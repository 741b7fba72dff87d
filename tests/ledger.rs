//! Integration tests for the event ledger and player statistics.

mod common;

use common::FlakyStore;
use tournament_engine::{
    add_event, create_tournament, finalize_match, recompute_player_statistics, register_team,
    remove_event, schedule_match, top_scorers, EntityStore, EventType, GameMatch, MatchEvent,
    MemoryStore, NewEvent, PlayerId, PlayerStatistic, Table, TeamId, Tournament, TournamentError,
    TournamentFormat,
};
use uuid::Uuid;

fn setup<S: EntityStore>(store: &S) -> (GameMatch, TeamId, TeamId) {
    let t = create_tournament(store, Tournament::new("League", TournamentFormat::RoundRobin, 4)).unwrap();
    let home = register_team(store, t.id, "Home", 11).unwrap();
    let away = register_team(store, t.id, "Away", 11).unwrap();
    let game = schedule_match(store, t.id, home.id, away.id, None, "Round 1").unwrap();
    (game, home.id, away.id)
}

fn event(game: &GameMatch, player_id: PlayerId, team_id: TeamId, event_type: EventType) -> NewEvent {
    NewEvent {
        match_id: game.id,
        player_id,
        team_id,
        event_type,
        minute: Some(10),
    }
}

fn stat_of<S: EntityStore>(store: &S, player_id: PlayerId) -> PlayerStatistic {
    store
        .query(|s: &PlayerStatistic| s.player_id == player_id)
        .unwrap()
        .remove(0)
}

#[test]
fn add_event_creates_statistics_row() {
    let store = MemoryStore::new();
    let (game, home, _) = setup(&store);
    let player = Uuid::new_v4();

    add_event(&store, event(&game, player, home, EventType::Goal)).unwrap();
    add_event(&store, event(&game, player, home, EventType::Assist)).unwrap();

    let stat = stat_of(&store, player);
    assert_eq!((stat.goals, stat.assists), (1, 1));
    assert_eq!(stat.tournament_id, game.tournament_id);
    assert!(!stat.is_suspended);
}

#[test]
fn add_event_rejects_team_outside_match() {
    let store = MemoryStore::new();
    let (game, _, _) = setup(&store);

    let err = add_event(&store, event(&game, Uuid::new_v4(), Uuid::new_v4(), EventType::Goal)).unwrap_err();
    assert!(matches!(err, TournamentError::PreconditionFailed(_)));
    assert_eq!(store.count(|_: &MatchEvent| true).unwrap(), 0);
}

#[test]
fn add_then_remove_restores_counters() {
    let store = MemoryStore::new();
    let (game, home, _) = setup(&store);
    let player = Uuid::new_v4();
    add_event(&store, event(&game, player, home, EventType::Goal)).unwrap();
    let before = stat_of(&store, player);

    for kind in [EventType::Goal, EventType::Assist, EventType::YellowCard] {
        let e = add_event(&store, event(&game, player, home, kind)).unwrap();
        remove_event(&store, e.id).unwrap();
        let after = stat_of(&store, player);
        assert_eq!(
            (after.goals, after.assists, after.yellow_cards, after.is_suspended),
            (before.goals, before.assists, before.yellow_cards, before.is_suspended),
            "{kind:?}"
        );
    }
}

#[test]
fn removing_second_yellow_lifts_suspension() {
    let store = MemoryStore::new();
    let (game, home, _) = setup(&store);
    let player = Uuid::new_v4();

    add_event(&store, event(&game, player, home, EventType::YellowCard)).unwrap();
    let second = add_event(&store, event(&game, player, home, EventType::YellowCard)).unwrap();
    let stat = stat_of(&store, player);
    assert!(stat.is_suspended);
    assert_eq!(stat.suspension_matches_remaining, 1);

    remove_event(&store, second.id).unwrap();
    let stat = stat_of(&store, player);
    assert_eq!(stat.yellow_cards, 1);
    assert!(!stat.is_suspended);
    assert_eq!(stat.suspension_matches_remaining, 0);
}

#[test]
fn removing_red_card_keeps_suspension() {
    let store = MemoryStore::new();
    let (game, _, away) = setup(&store);
    let player = Uuid::new_v4();

    let red = add_event(&store, event(&game, player, away, EventType::RedCard)).unwrap();
    remove_event(&store, red.id).unwrap();

    let stat = stat_of(&store, player);
    assert_eq!(stat.red_cards, 0);
    assert!(stat.is_suspended);
}

#[test]
fn remove_unknown_event_is_not_found() {
    let store = MemoryStore::new();
    assert!(matches!(
        remove_event(&store, Uuid::new_v4()),
        Err(TournamentError::NotFound(_))
    ));
}

#[test]
fn failed_statistics_write_withdraws_event() {
    let store = FlakyStore::default();
    let (game, home, _) = setup(&store);
    store.break_table(Table::PlayerStatistics);

    let err = add_event(&store, event(&game, Uuid::new_v4(), home, EventType::Goal)).unwrap_err();
    assert!(matches!(err, TournamentError::Store(_)));
    assert_eq!(store.count(|_: &MatchEvent| true).unwrap(), 0);
    assert_eq!(store.count(|_: &PlayerStatistic| true).unwrap(), 0);
}

#[test]
fn failed_statistics_revert_restores_event() {
    let store = FlakyStore::default();
    let (game, home, _) = setup(&store);
    let player = Uuid::new_v4();
    let goal = add_event(&store, event(&game, player, home, EventType::Goal)).unwrap();

    store.break_table(Table::PlayerStatistics);
    assert!(remove_event(&store, goal.id).is_err());
    store.recover();

    assert_eq!(store.count(|e: &MatchEvent| e.id == goal.id).unwrap(), 1);
    assert_eq!(stat_of(&store, player).goals, 1);
}

#[test]
fn recompute_rebuilds_drifted_counters() {
    let store = MemoryStore::new();
    let (game, home, away) = setup(&store);
    let scorer = Uuid::new_v4();
    let keeper = Uuid::new_v4();
    add_event(&store, event(&game, scorer, home, EventType::Goal)).unwrap();
    add_event(&store, event(&game, scorer, home, EventType::Goal)).unwrap();

    // Corrupt one row and log an event behind the ledger's back.
    let mut drifted = stat_of(&store, scorer);
    drifted.goals = 7;
    store.update(&drifted).unwrap();
    store
        .insert(&MatchEvent {
            id: Uuid::new_v4(),
            tournament_id: game.tournament_id,
            match_id: game.id,
            player_id: keeper,
            team_id: away,
            event_type: EventType::RedCard,
            minute: None,
            created_at: chrono::Utc::now(),
        })
        .unwrap();

    assert_eq!(recompute_player_statistics(&store, game.tournament_id).unwrap(), 2);
    assert_eq!(stat_of(&store, scorer).goals, 2);
    let keeper_stat = stat_of(&store, keeper);
    assert_eq!(keeper_stat.red_cards, 1);
    assert!(keeper_stat.is_suspended);

    // Already consistent: nothing to write.
    assert_eq!(recompute_player_statistics(&store, game.tournament_id).unwrap(), 0);
}

#[test]
fn recompute_does_not_count_served_yellows_again() {
    let store = MemoryStore::new();
    let (first, home, away) = setup(&store);
    let player = Uuid::new_v4();
    add_event(&store, event(&first, player, home, EventType::YellowCard)).unwrap();
    add_event(&store, event(&first, player, home, EventType::YellowCard)).unwrap();
    finalize_match(&store, first.id, 1, 0).unwrap();

    let second = schedule_match(&store, first.tournament_id, home, away, None, "Round 2").unwrap();
    finalize_match(&store, second.id, 0, 0).unwrap();
    let served = stat_of(&store, player);
    assert_eq!((served.yellow_cards, served.is_suspended), (0, false));

    assert_eq!(recompute_player_statistics(&store, first.tournament_id).unwrap(), 0);
    assert_eq!(stat_of(&store, player).yellow_cards, 0);

    let third = schedule_match(&store, first.tournament_id, home, away, None, "Round 3").unwrap();
    add_event(&store, event(&third, player, home, EventType::YellowCard)).unwrap();
    let stat = stat_of(&store, player);
    assert_eq!(stat.yellow_cards, 1);
    assert!(!stat.is_suspended);
}

#[test]
fn recompute_after_removing_a_served_yellow() {
    let store = MemoryStore::new();
    let (first, home, away) = setup(&store);
    let player = Uuid::new_v4();
    let yellow = add_event(&store, event(&first, player, home, EventType::YellowCard)).unwrap();
    add_event(&store, event(&first, player, home, EventType::YellowCard)).unwrap();
    finalize_match(&store, first.id, 1, 0).unwrap();
    let second = schedule_match(&store, first.tournament_id, home, away, None, "Round 2").unwrap();
    finalize_match(&store, second.id, 0, 0).unwrap();

    remove_event(&store, yellow.id).unwrap();
    assert_eq!(recompute_player_statistics(&store, first.tournament_id).unwrap(), 0);
    let stat = stat_of(&store, player);
    assert_eq!((stat.yellow_cards, stat.served_yellows), (0, 1));
}

#[test]
fn top_scorers_order_by_goals_then_assists() {
    let store = MemoryStore::new();
    let (game, home, away) = setup(&store);
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    for (player, team, kinds) in [
        (a, home, vec![EventType::Goal]),
        (b, away, vec![EventType::Goal, EventType::Goal]),
        (c, home, vec![EventType::Goal, EventType::Assist]),
    ] {
        for kind in kinds {
            add_event(&store, event(&game, player, team, kind)).unwrap();
        }
    }
    add_event(&store, event(&game, Uuid::new_v4(), away, EventType::Assist)).unwrap();

    let top: Vec<PlayerId> = top_scorers(&store, game.tournament_id, 10)
        .unwrap()
        .into_iter()
        .map(|s| s.player_id)
        .collect();
    assert_eq!(top, vec![b, c, a]);
    assert_eq!(top_scorers(&store, game.tournament_id, 1).unwrap().len(), 1);
}
