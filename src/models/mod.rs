//! Data structures for the tournament: entrants, draws, groups, matches, statistics.

mod draw;
mod game;
mod group;
mod player;
mod team;
mod tournament;

pub use draw::{Draw, DrawId};
pub use game::{EventId, EventType, GameMatch, Goal, MatchEvent, MatchId, MatchStatus, Side};
pub use group::{Group, GroupId, GroupStanding};
pub use player::{PlayerId, PlayerStatistic, YELLOW_CARD_LIMIT};
pub use team::{PaymentStatus, Team, TeamId};
pub use tournament::{Tournament, TournamentError, TournamentFormat, TournamentId, TournamentStatus};
