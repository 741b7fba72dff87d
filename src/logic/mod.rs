//! Tournament business logic: registration, draws, scheduling, results, statistics.

mod bracket;
mod draws;
mod fixtures;
mod groups;
mod ledger;
mod registration;
mod reset;
mod results;
mod standings;
mod suspensions;

pub use bracket::{bracket_size, round_name};
pub use draws::{
    draw_team, on_payment_status_changed, populate_draws, DrawOutcome, PaymentStatusChange,
    PopulateSummary,
};
pub use fixtures::{
    delete_match, generate_bracket_matches, generate_fixtures, generate_group_fixtures,
    generate_round_robin_fixtures, round_robin_pairings, schedule_match,
};
pub use groups::{create_missing_groups, group_capacity, group_count_for, groups_of, GroupsCreated};
pub use ledger::{add_event, recompute_player_statistics, remove_event, top_scorers, NewEvent};
pub use registration::{
    advance_status, change_format, create_tournament, delete_team, register_team,
    set_payment_status,
};
pub use reset::{reset_tournament, ResetSummary};
pub use results::{finalize_match, record_goal, MatchFinalized};
pub use standings::{
    group_table, group_tables, round_robin_standings, sort_standings, standings_to_csv,
    tournament_tables, GroupTable, StandingRow, StandingSlot,
};
pub use suspensions::{process_suspensions, SuspensionSummary};

use crate::models::TournamentError;
use crate::store::{EntityStore, Record};
use uuid::Uuid;

/// Load a row by id or fail with `NotFound` naming `what`.
fn fetch<S: EntityStore, R: Record>(store: &S, id: Uuid, what: &str) -> Result<R, TournamentError> {
    store
        .get::<R>(id)?
        .ok_or_else(|| TournamentError::NotFound(format!("{} {}", what, id)))
}
