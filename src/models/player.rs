//! Per-tournament player statistics and suspension state.

use crate::models::game::EventType;
use crate::models::team::TeamId;
use crate::models::tournament::TournamentId;
use crate::store::{Record, Table};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player.
pub type PlayerId = Uuid;

/// Yellow cards that trigger an accumulation suspension.
pub const YELLOW_CARD_LIMIT: u32 = 2;

/// Running totals for one (tournament, player, team).
///
/// `is_suspended` is stored next to `suspension_matches_remaining`; every method here
/// keeps `is_suspended == (suspension_matches_remaining > 0)`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatistic {
    pub id: Uuid,
    pub tournament_id: TournamentId,
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub is_suspended: bool,
    pub suspension_matches_remaining: u32,
    /// Yellow cards wiped by served accumulation suspensions. They stay in the event
    /// log, so rebuilding from the log subtracts them.
    #[serde(default)]
    pub served_yellows: u32,
    pub version: u64,
}

impl PlayerStatistic {
    /// All counters zero, not suspended.
    pub fn new(tournament_id: TournamentId, player_id: PlayerId, team_id: TeamId) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            player_id,
            team_id,
            ..Self::default()
        }
    }

    fn suspend_for_next_match(&mut self) {
        self.is_suspended = true;
        self.suspension_matches_remaining = 1;
    }

    fn lift_suspension(&mut self) {
        self.is_suspended = false;
        self.suspension_matches_remaining = 0;
    }

    /// Apply the delta of a newly recorded event. A 2nd yellow or any red suspends.
    pub fn apply_event(&mut self, event_type: EventType) {
        match event_type {
            EventType::Goal => self.goals += 1,
            EventType::Assist => self.assists += 1,
            EventType::YellowCard => {
                self.yellow_cards += 1;
                if self.yellow_cards >= YELLOW_CARD_LIMIT {
                    self.suspend_for_next_match();
                }
            }
            EventType::RedCard => {
                self.red_cards += 1;
                self.suspend_for_next_match();
            }
        }
    }

    /// Undo an event: decrement (floored at 0). Dropping below the yellow limit lifts the
    /// suspension; removing a red card does not.
    pub fn revert_event(&mut self, event_type: EventType) {
        match event_type {
            EventType::Goal => self.goals = self.goals.saturating_sub(1),
            EventType::Assist => self.assists = self.assists.saturating_sub(1),
            EventType::YellowCard => {
                if self.yellow_cards == 0 && self.served_yellows > 0 {
                    // The card was already wiped by a served suspension.
                    self.served_yellows -= 1;
                    return;
                }
                self.yellow_cards = self.yellow_cards.saturating_sub(1);
                if self.yellow_cards < YELLOW_CARD_LIMIT {
                    self.lift_suspension();
                }
            }
            EventType::RedCard => self.red_cards = self.red_cards.saturating_sub(1),
        }
    }

    /// Serve one match of suspension. Returns true when the suspension is now over.
    ///
    /// Accumulated yellows are wiped only when an accumulation suspension (no reds) ends.
    pub fn serve_match(&mut self) -> bool {
        if !self.is_suspended || self.suspension_matches_remaining == 0 {
            return false;
        }
        self.suspension_matches_remaining -= 1;
        if self.suspension_matches_remaining > 0 {
            return false;
        }
        self.is_suspended = false;
        if self.yellow_cards >= YELLOW_CARD_LIMIT && self.red_cards == 0 {
            self.served_yellows += self.yellow_cards;
            self.yellow_cards = 0;
        }
        true
    }
}

impl Record for PlayerStatistic {
    const TABLE: Table = Table::PlayerStatistics;

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_keys(&self) -> Vec<String> {
        vec![format!("{}:{}:{}", self.tournament_id, self.player_id, self.team_id)]
    }

    fn version(&self) -> Option<u64> {
        Some(self.version)
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}
