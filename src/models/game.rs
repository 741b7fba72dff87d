//! Match (game), live goals, and per-player match events.

use crate::models::group::GroupId;
use crate::models::player::PlayerId;
use crate::models::team::TeamId;
use crate::models::tournament::TournamentId;
use crate::store::{Record, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Unique identifier for a match event.
pub type EventId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Completed,
}

/// Which side of a match a team is on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

/// A single match between two teams. Scores stay `None` until entered.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub group_id: Option<GroupId>,
    /// "Round 1", "Quarterfinals", ...
    pub round: String,
    pub status: MatchStatus,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
}

impl GameMatch {
    pub fn new(
        tournament_id: TournamentId,
        home_team_id: TeamId,
        away_team_id: TeamId,
        group_id: Option<GroupId>,
        round: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            home_team_id,
            away_team_id,
            group_id,
            round: round.into(),
            status: MatchStatus::Scheduled,
            home_score: None,
            away_score: None,
        }
    }

    pub fn side_of(&self, team_id: TeamId) -> Option<Side> {
        if team_id == self.home_team_id {
            Some(Side::Home)
        } else if team_id == self.away_team_id {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.side_of(team_id).is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }
}

impl Record for GameMatch {
    const TABLE: Table = Table::Matches;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Scoreline entry recorded live during a match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub tournament_id: TournamentId,
    pub match_id: MatchId,
    pub team_id: TeamId,
    pub minute: Option<u32>,
    pub recorded_at: DateTime<Utc>,
}

impl Record for Goal {
    const TABLE: Table = Table::Goals;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Goal,
    Assist,
    YellowCard,
    RedCard,
}

/// A goal/assist/card credited to one player in one match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: EventId,
    pub tournament_id: TournamentId,
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub event_type: EventType,
    pub minute: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Record for MatchEvent {
    const TABLE: Table = Table::MatchEvents;

    fn id(&self) -> Uuid {
        self.id
    }
}
