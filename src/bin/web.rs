//! Single binary web server: JSON API over the tournament engine and an in-memory store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, DRAW_SEED (reproducible bulk draws), RUST_LOG.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tournament_engine::{
    add_event, advance_status, change_format, create_missing_groups, create_tournament,
    delete_match, delete_team, finalize_match, generate_fixtures, group_table,
    on_payment_status_changed, populate_draws, process_suspensions, recompute_player_statistics,
    record_goal, register_team, remove_event, reset_tournament, schedule_match, set_payment_status,
    standings_to_csv, top_scorers, tournament_tables, Config, EntityStore, EventType, GroupId,
    MemoryStore, NewEvent, PaymentStatus, PaymentStatusChange, PlayerId, TeamId, Tournament,
    TournamentError, TournamentFormat, TournamentId, TournamentStatus,
};
use uuid::Uuid;

/// Shared state: the store plus the RNG used by bulk draws.
struct AppState {
    store: MemoryStore,
    draw_rng: Mutex<StdRng>,
}

type State = Data<AppState>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    format: TournamentFormat,
    max_participants: u32,
    #[serde(default)]
    entry_fee_cents: u32,
}

#[derive(Deserialize)]
struct FormatBody {
    format: TournamentFormat,
}

#[derive(Deserialize)]
struct StatusBody {
    status: TournamentStatus,
}

#[derive(Deserialize)]
struct RegisterTeamBody {
    name: String,
    #[serde(default)]
    players_count: u32,
}

#[derive(Deserialize)]
struct PaymentStatusBody {
    payment_status: PaymentStatus,
}

/// Trigger payload; identifiers are optional here so a missing one is a 400, not a parse error.
#[derive(Deserialize)]
struct TriggerBody {
    tournament_id: Option<TournamentId>,
    team_id: Option<TeamId>,
    new_payment_status: Option<PaymentStatus>,
    #[serde(default)]
    old_payment_status: PaymentStatus,
}

#[derive(Deserialize)]
struct SuspensionBody {
    match_id: Option<Uuid>,
    tournament_id: Option<TournamentId>,
}

#[derive(Deserialize)]
struct ScheduleMatchBody {
    home_team_id: TeamId,
    away_team_id: TeamId,
    group_id: Option<GroupId>,
    round: String,
}

#[derive(Deserialize)]
struct GoalBody {
    team_id: TeamId,
    minute: Option<u32>,
}

#[derive(Deserialize)]
struct FinalizeBody {
    home_score: u32,
    away_score: u32,
}

#[derive(Deserialize)]
struct EventBody {
    player_id: PlayerId,
    team_id: TeamId,
    event_type: EventType,
    minute: Option<u32>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct IdPath {
    id: Uuid,
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::PreconditionFailed(_) => HttpResponse::BadRequest().json(body),
        TournamentError::NotFound(_) => HttpResponse::NotFound().json(body),
        TournamentError::ConstraintViolation(_)
        | TournamentError::Conflict(_)
        | TournamentError::CapacityExceeded { .. } => HttpResponse::Conflict().json(body),
        TournamentError::Store(_) | TournamentError::Export(_) => {
            log::error!("{}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn respond<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(&e),
    }
}

fn missing(field: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": format!("Missing {}", field) }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-engine",
    })
}

#[post("/api/tournaments")]
async fn api_create_tournament(state: State, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let tournament =
        Tournament::new(body.name.trim(), body.format, body.max_participants).with_entry_fee(body.entry_fee_cents);
    respond(create_tournament(&state.store, tournament))
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: State, path: Path<TournamentPath>) -> HttpResponse {
    match state.store.get::<Tournament>(path.id) {
        Ok(Some(t)) => HttpResponse::Ok().json(t),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
        Err(e) => error_response(&TournamentError::from(e)),
    }
}

/// Change format (only before any draw exists).
#[put("/api/tournaments/{id}/format")]
async fn api_set_format(state: State, path: Path<TournamentPath>, body: Json<FormatBody>) -> HttpResponse {
    respond(change_format(&state.store, path.id, body.format))
}

#[put("/api/tournaments/{id}/status")]
async fn api_set_status(state: State, path: Path<TournamentPath>, body: Json<StatusBody>) -> HttpResponse {
    respond(advance_status(&state.store, path.id, body.status))
}

#[post("/api/tournaments/{id}/teams")]
async fn api_register_team(state: State, path: Path<TournamentPath>, body: Json<RegisterTeamBody>) -> HttpResponse {
    respond(register_team(&state.store, path.id, &body.name, body.players_count))
}

/// Update a team's payment status; approval draws the team.
#[put("/api/teams/{id}/payment-status")]
async fn api_set_payment_status(state: State, path: Path<IdPath>, body: Json<PaymentStatusBody>) -> HttpResponse {
    respond(set_payment_status(&state.store, path.id, body.payment_status))
}

#[delete("/api/teams/{id}")]
async fn api_delete_team(state: State, path: Path<IdPath>) -> HttpResponse {
    respond(delete_team(&state.store, path.id).map(|()| serde_json::json!({ "deleted": true })))
}

/// Draw trigger entry point, for status changes written by other services.
#[post("/api/draws/trigger")]
async fn api_draw_trigger(state: State, body: Json<TriggerBody>) -> HttpResponse {
    let Some(tournament_id) = body.tournament_id else {
        return missing("tournament_id");
    };
    let Some(team_id) = body.team_id else {
        return missing("team_id");
    };
    let Some(new_payment_status) = body.new_payment_status else {
        return missing("new_payment_status");
    };
    respond(on_payment_status_changed(
        &state.store,
        PaymentStatusChange {
            tournament_id,
            team_id,
            new_payment_status,
            old_payment_status: body.old_payment_status,
        },
    ))
}

#[post("/api/tournaments/{id}/groups")]
async fn api_create_groups(state: State, path: Path<TournamentPath>) -> HttpResponse {
    respond(create_missing_groups(&state.store, path.id))
}

/// Bulk draw of every approved, undrawn team.
#[post("/api/tournaments/{id}/draws/populate")]
async fn api_populate_draws(state: State, path: Path<TournamentPath>) -> HttpResponse {
    let mut rng = match state.draw_rng.lock() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().json(serde_json::json!({ "error": "lock error" })),
    };
    respond(populate_draws(&state.store, &mut *rng, path.id))
}

/// Irreversible: wipes draws, matches and statistics.
#[post("/api/tournaments/{id}/reset")]
async fn api_reset(state: State, path: Path<TournamentPath>) -> HttpResponse {
    respond(reset_tournament(&state.store, path.id))
}

#[post("/api/tournaments/{id}/fixtures")]
async fn api_generate_fixtures(state: State, path: Path<TournamentPath>) -> HttpResponse {
    respond(generate_fixtures(&state.store, path.id).map(|n| serde_json::json!({ "matches_created": n })))
}

#[post("/api/tournaments/{id}/matches")]
async fn api_schedule_match(state: State, path: Path<TournamentPath>, body: Json<ScheduleMatchBody>) -> HttpResponse {
    respond(schedule_match(
        &state.store,
        path.id,
        body.home_team_id,
        body.away_team_id,
        body.group_id,
        &body.round,
    ))
}

#[delete("/api/matches/{id}")]
async fn api_delete_match(state: State, path: Path<IdPath>) -> HttpResponse {
    respond(delete_match(&state.store, path.id).map(|()| serde_json::json!({ "deleted": true })))
}

#[post("/api/matches/{id}/goals")]
async fn api_record_goal(state: State, path: Path<IdPath>, body: Json<GoalBody>) -> HttpResponse {
    respond(record_goal(&state.store, path.id, body.team_id, body.minute))
}

#[post("/api/matches/{id}/finalize")]
async fn api_finalize_match(state: State, path: Path<IdPath>, body: Json<FinalizeBody>) -> HttpResponse {
    respond(finalize_match(&state.store, path.id, body.home_score, body.away_score))
}

#[post("/api/matches/{id}/events")]
async fn api_add_event(state: State, path: Path<IdPath>, body: Json<EventBody>) -> HttpResponse {
    respond(add_event(
        &state.store,
        NewEvent {
            match_id: path.id,
            player_id: body.player_id,
            team_id: body.team_id,
            event_type: body.event_type,
            minute: body.minute,
        },
    ))
}

#[delete("/api/events/{id}")]
async fn api_remove_event(state: State, path: Path<IdPath>) -> HttpResponse {
    respond(remove_event(&state.store, path.id))
}

#[post("/api/suspensions/process")]
async fn api_process_suspensions(state: State, body: Json<SuspensionBody>) -> HttpResponse {
    let Some(match_id) = body.match_id else {
        return missing("match_id");
    };
    let Some(tournament_id) = body.tournament_id else {
        return missing("tournament_id");
    };
    respond(process_suspensions(&state.store, match_id, tournament_id))
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: State, path: Path<TournamentPath>) -> HttpResponse {
    respond(tournament_tables(&state.store, path.id))
}

#[get("/api/tournaments/{id}/standings.csv")]
async fn api_standings_csv(state: State, path: Path<TournamentPath>) -> HttpResponse {
    match tournament_tables(&state.store, path.id).and_then(|tables| standings_to_csv(&tables)) {
        Ok(csv) => HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(csv),
        Err(e) => error_response(&e),
    }
}

#[get("/api/groups/{id}/standings")]
async fn api_group_standings(state: State, path: Path<IdPath>) -> HttpResponse {
    respond(group_table(&state.store, path.id))
}

#[get("/api/tournaments/{id}/top-scorers")]
async fn api_top_scorers(state: State, path: Path<TournamentPath>) -> HttpResponse {
    respond(top_scorers(&state.store, path.id, 10))
}

/// Rebuild player counters from the event log after a partial ledger failure.
#[post("/api/tournaments/{id}/statistics/recompute")]
async fn api_recompute_statistics(state: State, path: Path<TournamentPath>) -> HttpResponse {
    respond(recompute_player_statistics(&state.store, path.id).map(|n| serde_json::json!({ "rows_written": n })))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    if let Some(seed) = config.draw_seed {
        log::info!("Bulk draws seeded with {}", seed);
    }
    let state = Data::new(AppState {
        store: MemoryStore::new(),
        draw_rng: Mutex::new(config.draw_rng()),
    });

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_standings_csv)
            .service(api_standings)
            .service(api_get_tournament)
            .service(api_set_format)
            .service(api_set_status)
            .service(api_register_team)
            .service(api_set_payment_status)
            .service(api_delete_team)
            .service(api_draw_trigger)
            .service(api_create_groups)
            .service(api_populate_draws)
            .service(api_reset)
            .service(api_generate_fixtures)
            .service(api_schedule_match)
            .service(api_delete_match)
            .service(api_record_goal)
            .service(api_finalize_match)
            .service(api_add_event)
            .service(api_remove_event)
            .service(api_process_suspensions)
            .service(api_group_standings)
            .service(api_top_scorers)
            .service(api_recompute_statistics)
    })
    .bind(bind)?
    .run()
    .await
}
