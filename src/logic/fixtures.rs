//! Match scheduling: group and round-robin fixtures, the opening knockout round,
//! single matches and their removal.

use crate::logic::{bracket_size, fetch, groups_of, ledger, round_name};
use crate::models::{
    Draw, GameMatch, Goal, GroupId, MatchEvent, MatchId, Team, TeamId, Tournament, TournamentError,
    TournamentFormat, TournamentId,
};
use crate::store::EntityStore;

/// Single round-robin pairings for `n` entrants (circle method), as index pairs per round.
///
/// Odd counts get a bye each round. Every pair meets exactly once.
pub fn round_robin_pairings(n: usize) -> Vec<Vec<(usize, usize)>> {
    if n < 2 {
        return Vec::new();
    }
    let mut slots: Vec<Option<usize>> = (0..n).map(Some).collect();
    if n % 2 == 1 {
        slots.push(None);
    }
    let len = slots.len();

    let mut rounds = Vec::with_capacity(len - 1);
    for _ in 0..len - 1 {
        let round = (0..len / 2)
            .filter_map(|i| match (slots[i], slots[len - 1 - i]) {
                (Some(a), Some(b)) => Some((a, b)),
                _ => None,
            })
            .collect();
        rounds.push(round);
        // First seat fixed, the rest rotate one step.
        slots[1..].rotate_right(1);
    }
    rounds
}

/// Write one match per pairing; round labels are "Round 1", "Round 2", ...
fn write_round_robin<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
    group_id: Option<GroupId>,
    teams: &[TeamId],
) -> Result<usize, TournamentError> {
    let mut created = 0;
    for (r, round) in round_robin_pairings(teams.len()).iter().enumerate() {
        for &(home, away) in round {
            let game = GameMatch::new(tournament_id, teams[home], teams[away], group_id, format!("Round {}", r + 1));
            store.insert(&game)?;
            created += 1;
        }
    }
    Ok(created)
}

/// Schedule every group's single round-robin. Fails if group matches already exist.
pub fn generate_group_fixtures<S: EntityStore>(store: &S, tournament_id: TournamentId) -> Result<usize, TournamentError> {
    let tournament: Tournament = fetch(store, tournament_id, "Tournament")?;
    if !tournament.format.uses_groups() {
        return Err(TournamentError::PreconditionFailed(
            "tournament format has no group stage".to_string(),
        ));
    }
    if store.count(|m: &GameMatch| m.tournament_id == tournament_id && m.group_id.is_some())? > 0 {
        return Err(TournamentError::PreconditionFailed("group fixtures already exist".to_string()));
    }

    let draws = store.query(|d: &Draw| d.tournament_id == tournament_id)?;
    let mut created = 0;
    for group in groups_of(store, tournament_id)? {
        let members: Vec<TeamId> = draws
            .iter()
            .filter(|d| d.group_id == Some(group.id))
            .map(|d| d.team_id)
            .collect();
        created += write_round_robin(store, tournament_id, Some(group.id), &members)?;
    }
    log::info!("Scheduled {} group matches for {}", created, tournament_id);
    Ok(created)
}

/// Schedule a single round-robin over every drawn team of a round-robin tournament.
pub fn generate_round_robin_fixtures<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
) -> Result<usize, TournamentError> {
    let tournament: Tournament = fetch(store, tournament_id, "Tournament")?;
    if tournament.format != TournamentFormat::RoundRobin {
        return Err(TournamentError::PreconditionFailed("tournament is not round-robin".to_string()));
    }
    if store.count(|m: &GameMatch| m.tournament_id == tournament_id)? > 0 {
        return Err(TournamentError::PreconditionFailed("fixtures already exist".to_string()));
    }

    let teams: Vec<TeamId> = store
        .query(|d: &Draw| d.tournament_id == tournament_id)?
        .into_iter()
        .map(|d| d.team_id)
        .collect();
    let created = write_round_robin(store, tournament_id, None, &teams)?;
    log::info!("Scheduled {} round-robin matches for {}", created, tournament_id);
    Ok(created)
}

/// Schedule the opening knockout round: positions (1,2), (3,4), ... of the bracket.
/// A pair with an empty position is a bye and gets no match.
pub fn generate_bracket_matches<S: EntityStore>(store: &S, tournament_id: TournamentId) -> Result<usize, TournamentError> {
    let tournament: Tournament = fetch(store, tournament_id, "Tournament")?;
    if tournament.format != TournamentFormat::Knockout {
        return Err(TournamentError::PreconditionFailed("tournament is not a knockout".to_string()));
    }
    let size = bracket_size(tournament.max_participants);
    let round = round_name(size);
    if store.count(|m: &GameMatch| m.tournament_id == tournament_id && m.round == round)? > 0 {
        return Err(TournamentError::PreconditionFailed(format!("{} already scheduled", round)));
    }

    let draws = store.query(|d: &Draw| d.tournament_id == tournament_id)?;
    let at = |pos: u32| draws.iter().find(|d| d.bracket_position == Some(pos)).map(|d| d.team_id);

    let mut created = 0;
    for pos in (1..=size).step_by(2) {
        if let (Some(home), Some(away)) = (at(pos), at(pos + 1)) {
            store.insert(&GameMatch::new(tournament_id, home, away, None, round))?;
            created += 1;
        }
    }
    log::info!("Scheduled {} {} matches for {}", created, round, tournament_id);
    Ok(created)
}

/// Schedule the opening matches the tournament format calls for.
pub fn generate_fixtures<S: EntityStore>(store: &S, tournament_id: TournamentId) -> Result<usize, TournamentError> {
    let tournament: Tournament = fetch(store, tournament_id, "Tournament")?;
    match tournament.format {
        TournamentFormat::GroupsKnockout | TournamentFormat::GroupsOnly => {
            generate_group_fixtures(store, tournament_id)
        }
        TournamentFormat::Knockout => generate_bracket_matches(store, tournament_id),
        TournamentFormat::RoundRobin => generate_round_robin_fixtures(store, tournament_id),
    }
}

/// Schedule a single match between two distinct teams of the tournament.
pub fn schedule_match<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
    home_team_id: TeamId,
    away_team_id: TeamId,
    group_id: Option<GroupId>,
    round: &str,
) -> Result<GameMatch, TournamentError> {
    if home_team_id == away_team_id {
        return Err(TournamentError::PreconditionFailed("a team cannot play itself".to_string()));
    }
    let _: Tournament = fetch(store, tournament_id, "Tournament")?;
    for team_id in [home_team_id, away_team_id] {
        let entered = store.count(|t: &Team| t.id == team_id && t.tournament_id == tournament_id)?;
        if entered == 0 {
            return Err(TournamentError::NotFound(format!(
                "Team {} in tournament {}",
                team_id, tournament_id
            )));
        }
    }
    let game = GameMatch::new(tournament_id, home_team_id, away_team_id, group_id, round);
    store.insert(&game)?;
    Ok(game)
}

/// Delete a match: its events first (through the ledger, so statistics follow), then
/// its goals, then the match row.
pub fn delete_match<S: EntityStore>(store: &S, match_id: MatchId) -> Result<(), TournamentError> {
    let game: GameMatch = fetch(store, match_id, "Match")?;
    for event in store.query(|e: &MatchEvent| e.match_id == match_id)? {
        ledger::remove_event(store, event.id)?;
    }
    store.delete_where(|g: &Goal| g.match_id == match_id)?;
    store.delete_where(|m: &GameMatch| m.id == match_id)?;
    log::info!("Deleted match {} ({})", match_id, game.tournament_id);
    Ok(())
}
