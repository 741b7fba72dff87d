//! Integration tests for suspensions served on match completion.

use tournament_engine::{
    add_event, create_tournament, finalize_match, process_suspensions, record_goal, register_team,
    schedule_match, EntityStore, EventType, GameMatch, MatchStatus, MemoryStore, NewEvent,
    PlayerId, PlayerStatistic, Team, Tournament, TournamentError, TournamentFormat, TournamentId,
};
use uuid::Uuid;

struct League {
    store: MemoryStore,
    id: TournamentId,
    teams: Vec<Team>,
}

impl League {
    fn new() -> Self {
        let store = MemoryStore::new();
        let id = create_tournament(&store, Tournament::new("League", TournamentFormat::RoundRobin, 4))
            .unwrap()
            .id;
        let teams = ["Rovers", "United", "City"]
            .iter()
            .map(|name| register_team(&store, id, name, 11).unwrap())
            .collect();
        Self { store, id, teams }
    }

    fn game(&self, home: usize, away: usize) -> GameMatch {
        schedule_match(&self.store, self.id, self.teams[home].id, self.teams[away].id, None, "Round 1").unwrap()
    }

    fn card(&self, game: &GameMatch, player_id: PlayerId, team: usize, event_type: EventType) {
        add_event(
            &self.store,
            NewEvent {
                match_id: game.id,
                player_id,
                team_id: self.teams[team].id,
                event_type,
                minute: None,
            },
        )
        .unwrap();
    }

    fn stat(&self, player_id: PlayerId) -> PlayerStatistic {
        self.store
            .query(|s: &PlayerStatistic| s.player_id == player_id)
            .unwrap()
            .remove(0)
    }
}

#[test]
fn accumulation_suspension_is_served_and_yellows_reset() {
    let league = League::new();
    let player = Uuid::new_v4();
    let first = league.game(0, 1);
    league.card(&first, player, 0, EventType::YellowCard);
    league.card(&first, player, 0, EventType::YellowCard);

    // The match that triggered the suspension does not count towards serving it.
    assert_eq!(finalize_match(&league.store, first.id, 0, 0).unwrap().processed_players, 0);
    assert!(league.stat(player).is_suspended);

    let second = league.game(0, 2);
    assert_eq!(finalize_match(&league.store, second.id, 1, 0).unwrap().processed_players, 1);
    let stat = league.stat(player);
    assert!(!stat.is_suspended);
    assert_eq!(stat.suspension_matches_remaining, 0);
    assert_eq!(stat.yellow_cards, 0);
}

#[test]
fn red_card_suspension_keeps_card_count() {
    let league = League::new();
    let player = Uuid::new_v4();
    let first = league.game(0, 1);
    league.card(&first, player, 1, EventType::RedCard);
    finalize_match(&league.store, first.id, 2, 0).unwrap();

    let second = league.game(1, 2);
    finalize_match(&league.store, second.id, 0, 0).unwrap();

    let stat = league.stat(player);
    assert!(!stat.is_suspended);
    assert_eq!(stat.red_cards, 1);
}

#[test]
fn a_card_that_did_not_suspend_does_not_delay_serving() {
    let league = League::new();
    let player = Uuid::new_v4();
    let first = league.game(0, 1);
    league.card(&first, player, 0, EventType::RedCard);
    finalize_match(&league.store, first.id, 0, 0).unwrap();

    // Booked on the bench while sitting out: one yellow, no new suspension.
    let second = league.game(0, 2);
    league.card(&second, player, 0, EventType::YellowCard);
    assert_eq!(finalize_match(&league.store, second.id, 1, 0).unwrap().processed_players, 1);

    let stat = league.stat(player);
    assert!(!stat.is_suspended);
    assert_eq!(stat.yellow_cards, 1);
}

#[test]
fn players_of_other_teams_keep_their_suspension() {
    let league = League::new();
    let player = Uuid::new_v4();
    let first = league.game(2, 0);
    league.card(&first, player, 2, EventType::RedCard);
    finalize_match(&league.store, first.id, 0, 1).unwrap();

    // City does not play this one.
    let other = league.game(0, 1);
    let summary = finalize_match(&league.store, other.id, 1, 1).unwrap();
    assert_eq!(summary.processed_players, 0);
    assert!(league.stat(player).is_suspended);
}

#[test]
fn suspensions_need_a_completed_match() {
    let league = League::new();
    let game = league.game(0, 1);
    assert!(matches!(
        process_suspensions(&league.store, game.id, league.id),
        Err(TournamentError::PreconditionFailed(_))
    ));
}

#[test]
fn suspensions_check_the_tournament() {
    let league = League::new();
    let game = league.game(0, 1);
    finalize_match(&league.store, game.id, 0, 0).unwrap();
    assert!(matches!(
        process_suspensions(&league.store, game.id, Uuid::new_v4()),
        Err(TournamentError::NotFound(_))
    ));
}

#[test]
fn finalize_twice_is_refused() {
    let league = League::new();
    let game = league.game(0, 1);
    finalize_match(&league.store, game.id, 3, 1).unwrap();
    assert!(matches!(
        finalize_match(&league.store, game.id, 3, 2),
        Err(TournamentError::PreconditionFailed(_))
    ));
}

#[test]
fn live_goals_update_the_score() {
    let league = League::new();
    let game = league.game(0, 1);

    record_goal(&league.store, game.id, league.teams[1].id, Some(12)).unwrap();
    let game = record_goal(&league.store, game.id, league.teams[1].id, Some(40)).unwrap();
    assert_eq!((game.home_score, game.away_score), (Some(0), Some(2)));
    assert_eq!(game.status, MatchStatus::Scheduled);

    assert!(matches!(
        record_goal(&league.store, game.id, league.teams[2].id, None),
        Err(TournamentError::PreconditionFailed(_))
    ));
}
