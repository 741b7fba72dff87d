//! Standings Aggregator: ordering, group tables with "TBD" seats, round-robin tables, CSV.

use crate::logic::{fetch, group_capacity, groups_of};
use crate::models::{
    Draw, GameMatch, Group, GroupId, GroupStanding, Team, TeamId, Tournament, TournamentError,
    TournamentId,
};
use crate::store::EntityStore;
use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;

/// One team's line in a table.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct StandingRow {
    pub team_id: TeamId,
    pub team_name: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
}

impl StandingRow {
    fn from_standing(s: &GroupStanding, team_name: String) -> Self {
        Self {
            team_id: s.team_id,
            team_name,
            played: s.played(),
            wins: s.wins,
            draws: s.draws,
            losses: s.losses,
            goals_for: s.goals_for,
            goals_against: s.goals_against,
            goal_difference: s.goal_difference,
            points: s.points,
        }
    }

    fn record_result(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        self.goal_difference = self.goals_for as i32 - self.goals_against as i32;
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.wins += 1;
                self.points += 3;
            }
            Ordering::Equal => {
                self.draws += 1;
                self.points += 1;
            }
            Ordering::Less => self.losses += 1,
        }
    }
}

/// Sort by points, wins, goal difference, goals scored (all descending).
/// Stable: rows tied on every key keep their input order.
pub fn sort_standings(rows: &mut [StandingRow]) {
    rows.sort_by_key(|r| {
        (
            Reverse(r.points),
            Reverse(r.wins),
            Reverse(r.goal_difference),
            Reverse(r.goals_for),
        )
    });
}

/// A seat in a group table: a ranked team or an unfilled slot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StandingSlot {
    Team { position: usize, row: StandingRow },
    Placeholder { position: usize },
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GroupTable {
    pub group_id: Option<GroupId>,
    pub name: String,
    pub slots: Vec<StandingSlot>,
}

impl GroupTable {
    fn build(group_id: Option<GroupId>, name: String, mut rows: Vec<StandingRow>, capacity: usize) -> Self {
        sort_standings(&mut rows);
        let filled = rows.len();
        let mut slots: Vec<StandingSlot> = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| StandingSlot::Team { position: i + 1, row })
            .collect();
        slots.extend((filled..capacity).map(|i| StandingSlot::Placeholder { position: i + 1 }));
        Self { group_id, name, slots }
    }

    pub fn placeholders(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, StandingSlot::Placeholder { .. }))
            .count()
    }
}

fn team_names<S: EntityStore>(store: &S, tournament_id: TournamentId) -> Result<HashMap<TeamId, String>, TournamentError> {
    Ok(store
        .query(|t: &Team| t.tournament_id == tournament_id)?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect())
}

fn table_for_group<S: EntityStore>(
    store: &S,
    group: &Group,
    names: &HashMap<TeamId, String>,
    capacity: usize,
) -> Result<GroupTable, TournamentError> {
    let rows = store
        .query(|s: &GroupStanding| s.group_id == group.id)?
        .iter()
        .map(|s| StandingRow::from_standing(s, names.get(&s.team_id).cloned().unwrap_or_default()))
        .collect();
    Ok(GroupTable::build(Some(group.id), group.name.clone(), rows, capacity))
}

/// Ranked table of one group, padded with placeholders up to the group capacity.
pub fn group_table<S: EntityStore>(store: &S, group_id: GroupId) -> Result<GroupTable, TournamentError> {
    let group: Group = fetch(store, group_id, "Group")?;
    let tournament: Tournament = fetch(store, group.tournament_id, "Tournament")?;
    let names = team_names(store, tournament.id)?;
    table_for_group(store, &group, &names, group_capacity(tournament.max_participants) as usize)
}

/// Tables of every group of a tournament, in display order.
pub fn group_tables<S: EntityStore>(store: &S, tournament_id: TournamentId) -> Result<Vec<GroupTable>, TournamentError> {
    let tournament: Tournament = fetch(store, tournament_id, "Tournament")?;
    let names = team_names(store, tournament_id)?;
    let capacity = group_capacity(tournament.max_participants) as usize;
    groups_of(store, tournament_id)?
        .iter()
        .map(|g| table_for_group(store, g, &names, capacity))
        .collect()
}

/// Single table derived from completed matches over all drawn teams (round-robin format).
pub fn round_robin_standings<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
) -> Result<GroupTable, TournamentError> {
    let tournament: Tournament = fetch(store, tournament_id, "Tournament")?;
    let names = team_names(store, tournament_id)?;

    let mut rows: Vec<StandingRow> = store
        .query(|d: &Draw| d.tournament_id == tournament_id)?
        .into_iter()
        .map(|d| StandingRow {
            team_id: d.team_id,
            team_name: names.get(&d.team_id).cloned().unwrap_or_default(),
            ..StandingRow::default()
        })
        .collect();

    let completed = store.query(|m: &GameMatch| m.tournament_id == tournament_id && m.is_completed())?;
    for m in completed {
        let (home, away) = (m.home_score.unwrap_or(0), m.away_score.unwrap_or(0));
        for row in rows.iter_mut() {
            if row.team_id == m.home_team_id {
                row.record_result(home, away);
            } else if row.team_id == m.away_team_id {
                row.record_result(away, home);
            }
        }
    }

    Ok(GroupTable::build(
        None,
        tournament.name,
        rows,
        tournament.max_participants as usize,
    ))
}

/// Tables for any format: one per group, or a single table for the other formats.
pub fn tournament_tables<S: EntityStore>(
    store: &S,
    tournament_id: TournamentId,
) -> Result<Vec<GroupTable>, TournamentError> {
    let tournament: Tournament = fetch(store, tournament_id, "Tournament")?;
    if tournament.format.uses_groups() {
        group_tables(store, tournament_id)
    } else {
        Ok(vec![round_robin_standings(store, tournament_id)?])
    }
}

/// Render tables as CSV, one line per seat; unfilled seats read "TBD".
pub fn standings_to_csv(tables: &[GroupTable]) -> Result<String, TournamentError> {
    let export_err = |e: csv::Error| TournamentError::Export(e.to_string());
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "group", "position", "team", "played", "wins", "draws", "losses", "goals_for",
        "goals_against", "goal_difference", "points",
    ])
    .map_err(export_err)?;

    for table in tables {
        for slot in &table.slots {
            let record = match slot {
                StandingSlot::Team { position, row } => vec![
                    table.name.clone(),
                    position.to_string(),
                    row.team_name.clone(),
                    row.played.to_string(),
                    row.wins.to_string(),
                    row.draws.to_string(),
                    row.losses.to_string(),
                    row.goals_for.to_string(),
                    row.goals_against.to_string(),
                    row.goal_difference.to_string(),
                    row.points.to_string(),
                ],
                StandingSlot::Placeholder { position } => {
                    let mut r = vec![table.name.clone(), position.to_string(), "TBD".to_string()];
                    r.extend(std::iter::repeat(String::new()).take(8));
                    r
                }
            };
            wtr.write_record(&record).map_err(export_err)?;
        }
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| TournamentError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TournamentError::Export(e.to_string()))
}
