//! Groups and per-group standing rows.

use crate::models::team::TeamId;
use crate::models::tournament::TournamentId;
use crate::store::{Record, Table};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a group.
pub type GroupId = Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub tournament_id: TournamentId,
    /// "Group A", "Group B", ...
    pub name: String,
    /// Stable display order; also the tie-break when picking the emptiest group.
    pub display_order: u32,
}

impl Group {
    /// Group at `display_order` (0-based), labelled by letter.
    pub fn new(tournament_id: TournamentId, display_order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: format!("Group {}", group_letter(display_order)),
            display_order,
        }
    }
}

/// A, B, ..., Z, then AA, AB, ... like spreadsheet columns.
fn group_letter(index: u32) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        out.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}

impl Record for Group {
    const TABLE: Table = Table::Groups;

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_keys(&self) -> Vec<String> {
        vec![format!("{}:{}", self.tournament_id, self.display_order)]
    }
}

/// Running record of one team inside one group.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupStanding {
    pub id: Uuid,
    pub tournament_id: TournamentId,
    pub group_id: GroupId,
    pub team_id: TeamId,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
    pub version: u64,
}

impl GroupStanding {
    pub fn new(tournament_id: TournamentId, group_id: GroupId, team_id: TeamId) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            group_id,
            team_id,
            ..Self::default()
        }
    }

    /// Fold one finished match into the counters (3 points a win, 1 a draw).
    pub fn record_result(&mut self, scored: u32, conceded: u32) {
        self.goals_for += scored;
        self.goals_against += conceded;
        self.goal_difference = self.goals_for as i32 - self.goals_against as i32;
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => {
                self.wins += 1;
                self.points += 3;
            }
            std::cmp::Ordering::Equal => {
                self.draws += 1;
                self.points += 1;
            }
            std::cmp::Ordering::Less => self.losses += 1,
        }
    }

    /// Take one result back out of the counters.
    pub fn revert_result(&mut self, scored: u32, conceded: u32) {
        self.goals_for = self.goals_for.saturating_sub(scored);
        self.goals_against = self.goals_against.saturating_sub(conceded);
        self.goal_difference = self.goals_for as i32 - self.goals_against as i32;
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => {
                self.wins = self.wins.saturating_sub(1);
                self.points = self.points.saturating_sub(3);
            }
            std::cmp::Ordering::Equal => {
                self.draws = self.draws.saturating_sub(1);
                self.points = self.points.saturating_sub(1);
            }
            std::cmp::Ordering::Less => self.losses = self.losses.saturating_sub(1),
        }
    }

    pub fn played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }
}

impl Record for GroupStanding {
    const TABLE: Table = Table::GroupStandings;

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_keys(&self) -> Vec<String> {
        vec![format!("{}:{}", self.group_id, self.team_id)]
    }

    fn version(&self) -> Option<u64> {
        Some(self.version)
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_roll_over_like_columns() {
        assert_eq!(group_letter(0), "A");
        assert_eq!(group_letter(7), "H");
        assert_eq!(group_letter(25), "Z");
        assert_eq!(group_letter(26), "AA");
    }

    #[test]
    fn record_result_tracks_points_and_difference() {
        let mut s = GroupStanding::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        s.record_result(3, 1);
        s.record_result(0, 0);
        s.record_result(0, 2);
        assert_eq!((s.wins, s.draws, s.losses), (1, 1, 1));
        assert_eq!(s.points, 4);
        assert_eq!(s.goal_difference, 0);
        assert_eq!(s.played(), 3);
    }

    #[test]
    fn revert_result_undoes_record_result() {
        let mut s = GroupStanding::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        s.record_result(1, 1);
        let before = s.clone();
        s.record_result(2, 0);
        s.revert_result(2, 0);
        assert_eq!(s, before);
    }
}
