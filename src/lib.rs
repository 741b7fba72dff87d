//! Tournament organizer: library with models, the entity store seam and business logic
//! (draws, brackets, event ledger, suspensions, standings).

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use config::Config;
pub use logic::{
    add_event, advance_status, bracket_size, change_format, create_missing_groups,
    create_tournament, delete_match, delete_team, draw_team, finalize_match,
    generate_bracket_matches, generate_fixtures, generate_group_fixtures, generate_round_robin_fixtures,
    group_capacity, group_count_for, group_table, group_tables, groups_of,
    on_payment_status_changed, populate_draws, process_suspensions, recompute_player_statistics,
    record_goal, register_team, remove_event, reset_tournament, round_name,
    round_robin_pairings, round_robin_standings, schedule_match, set_payment_status,
    sort_standings, standings_to_csv, top_scorers, tournament_tables, DrawOutcome, GroupTable, GroupsCreated,
    MatchFinalized, NewEvent, PaymentStatusChange, PopulateSummary, ResetSummary, StandingRow,
    StandingSlot, SuspensionSummary,
};
pub use models::{
    Draw, EventId, EventType, GameMatch, Goal, Group, GroupId, GroupStanding, MatchEvent, MatchId,
    MatchStatus, PaymentStatus, PlayerId, PlayerStatistic, Side, Team, TeamId, Tournament,
    TournamentError, TournamentFormat, TournamentId, TournamentStatus,
};
pub use store::{EntityStore, MemoryStore, Record, StoreError, Table};
