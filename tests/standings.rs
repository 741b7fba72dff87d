//! Integration tests for group tables, round-robin tables and the CSV export.

mod common;

use common::FlakyStore;
use tournament_engine::{
    create_missing_groups, create_tournament, finalize_match, generate_fixtures, group_table,
    group_tables, groups_of, register_team, round_robin_standings, set_payment_status,
    standings_to_csv, tournament_tables, EntityStore, GameMatch, GroupStanding, MatchStatus,
    MemoryStore, PaymentStatus, StandingSlot, Table, Team, Tournament, TournamentError,
    TournamentFormat, TournamentId,
};

fn approved_teams<S: EntityStore>(store: &S, tid: TournamentId, names: &[&str]) -> Vec<Team> {
    names
        .iter()
        .map(|name| {
            let team = register_team(store, tid, name, 5).unwrap();
            set_payment_status(store, team.id, PaymentStatus::Approved).unwrap();
            team
        })
        .collect()
}

fn team_at(slot: &StandingSlot) -> Option<&str> {
    match slot {
        StandingSlot::Team { row, .. } => Some(row.team_name.as_str()),
        StandingSlot::Placeholder { .. } => None,
    }
}

#[test]
fn group_table_ranks_results_and_pads_seats() {
    let store = MemoryStore::new();
    let tid = create_tournament(&store, Tournament::new("Cup", TournamentFormat::GroupsOnly, 8))
        .unwrap()
        .id;
    create_missing_groups(&store, tid).unwrap();
    // Alternating: Lions and Bears share the first group.
    approved_teams(&store, tid, &["Lions", "Wolves", "Bears", "Hawks"]);
    assert_eq!(generate_fixtures(&store, tid).unwrap(), 2);

    let first_group = groups_of(&store, tid).unwrap().remove(0);
    let game = store
        .query(|m: &GameMatch| m.group_id == Some(first_group.id))
        .unwrap()
        .remove(0);
    let finalized = finalize_match(&store, game.id, 1, 2).unwrap();
    assert_eq!(finalized.standings_updated, 2);

    let table = group_table(&store, first_group.id).unwrap();
    assert_eq!(table.name, "Group A");
    assert_eq!(table.slots.len(), 4);
    assert_eq!(table.placeholders(), 2);
    assert_eq!(team_at(&table.slots[0]), Some("Bears"));
    assert_eq!(team_at(&table.slots[1]), Some("Lions"));
    if let StandingSlot::Team { row, .. } = &table.slots[0] {
        assert_eq!((row.played, row.wins, row.points, row.goal_difference), (1, 1, 3, 1));
    }

    let tables = group_tables(&store, tid).unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[1].name, "Group B");
}

#[test]
fn empty_group_is_all_placeholders() {
    let store = MemoryStore::new();
    let tid = create_tournament(&store, Tournament::new("Cup", TournamentFormat::GroupsKnockout, 16))
        .unwrap()
        .id;
    create_missing_groups(&store, tid).unwrap();

    for table in group_tables(&store, tid).unwrap() {
        assert_eq!(table.slots.len(), 4);
        assert_eq!(table.placeholders(), 4);
    }
}

#[test]
fn round_robin_table_follows_completed_matches() {
    let store = MemoryStore::new();
    let tid = create_tournament(&store, Tournament::new("League", TournamentFormat::RoundRobin, 4))
        .unwrap()
        .id;
    let teams = approved_teams(&store, tid, &["North", "South", "East"]);
    assert_eq!(generate_fixtures(&store, tid).unwrap(), 3);

    // North wins everything, South and East draw.
    for game in store.query(|m: &GameMatch| m.tournament_id == tid).unwrap() {
        let (home, away) = if game.home_team_id == teams[0].id {
            (2, 0)
        } else if game.away_team_id == teams[0].id {
            (0, 2)
        } else {
            (1, 1)
        };
        finalize_match(&store, game.id, home, away).unwrap();
    }

    let table = round_robin_standings(&store, tid).unwrap();
    assert_eq!(table.group_id, None);
    assert_eq!(table.slots.len(), 4);
    assert_eq!(table.placeholders(), 1);
    assert_eq!(team_at(&table.slots[0]), Some("North"));
    if let StandingSlot::Team { row, .. } = &table.slots[0] {
        assert_eq!((row.played, row.points, row.goals_for), (2, 6, 4));
    }
    if let StandingSlot::Team { row, .. } = &table.slots[1] {
        assert_eq!((row.played, row.points), (2, 1));
    }
}

#[test]
fn csv_export_has_one_line_per_seat() {
    let store = MemoryStore::new();
    let tid = create_tournament(&store, Tournament::new("League", TournamentFormat::RoundRobin, 4))
        .unwrap()
        .id;
    approved_teams(&store, tid, &["North", "South"]);

    let csv = standings_to_csv(&tournament_tables(&store, tid).unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("group,position,team"));
    assert_eq!(lines.iter().filter(|l| l.contains(",TBD,")).count(), 2);
}

/// Two teams in one group with their group match scheduled.
fn group_pair(store: &FlakyStore) -> (GameMatch, Vec<Team>) {
    let tid = create_tournament(store, Tournament::new("Cup", TournamentFormat::GroupsOnly, 4))
        .unwrap()
        .id;
    create_missing_groups(store, tid).unwrap();
    // Two groups of capacity two: the first and third team share "Group A".
    let teams = approved_teams(store, tid, &["Lions", "Wolves", "Bears"]);
    generate_fixtures(store, tid).unwrap();
    let game = store
        .query(|m: &GameMatch| m.tournament_id == tid && m.home_team_id == teams[0].id)
        .unwrap()
        .remove(0);
    (game, vec![teams[0].clone(), teams[2].clone()])
}

fn points<S: EntityStore>(store: &S, teams: &[Team]) -> Vec<u32> {
    teams
        .iter()
        .map(|t| {
            store
                .query(|s: &GroupStanding| s.team_id == t.id)
                .unwrap()
                .remove(0)
                .points
        })
        .collect()
}

fn status_of<S: EntityStore>(store: &S, game: &GameMatch) -> MatchStatus {
    store.get::<GameMatch>(game.id).unwrap().unwrap().status
}

#[test]
fn finalize_can_be_retried_after_standings_fail() {
    let store = FlakyStore::default();
    let (game, teams) = group_pair(&store);

    store.break_table(Table::GroupStandings);
    assert!(matches!(
        finalize_match(&store, game.id, 2, 0),
        Err(TournamentError::Store(_))
    ));
    assert_eq!(status_of(&store, &game), MatchStatus::Scheduled);

    store.recover();
    finalize_match(&store, game.id, 2, 0).unwrap();
    assert_eq!(points(&store, &teams), vec![3, 0]);
    assert_eq!(status_of(&store, &game), MatchStatus::Completed);
}

#[test]
fn half_written_standings_are_taken_back() {
    let store = FlakyStore::default();
    let (game, teams) = group_pair(&store);

    // Home standing goes through, away standing fails once.
    store.fail_writes(Table::GroupStandings, 1, 1);
    assert!(finalize_match(&store, game.id, 2, 0).is_err());
    assert_eq!(points(&store, &teams), vec![0, 0]);

    finalize_match(&store, game.id, 2, 0).unwrap();
    assert_eq!(points(&store, &teams), vec![3, 0]);
}

#[test]
fn failed_match_write_takes_standings_back() {
    let store = FlakyStore::default();
    let (game, teams) = group_pair(&store);

    store.break_table(Table::Matches);
    assert!(finalize_match(&store, game.id, 1, 1).is_err());
    assert_eq!(points(&store, &teams), vec![0, 0]);

    store.recover();
    finalize_match(&store, game.id, 1, 1).unwrap();
    assert_eq!(points(&store, &teams), vec![1, 1]);
}
