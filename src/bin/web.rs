//! Single binary web server: JSON API over the competition registry.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, DATA_FILE (default competition.json), RNG_SEED (u64).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use fencing_tournament_web::{
    import, Club, Competition, CompetitionError, CompetitionId, Competitor, CompetitorId,
    EngineConfig, JsonStore, Referee, RefereeId, Registry, Snapshot, SnapshotSink, Weapon,
};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use uuid::Uuid;

type AppState = Data<RwLock<Registry>>;

/// Sink that queues snapshots for a background task, so requests never wait on disk.
/// Writes happen in order; when several snapshots are queued only the newest is written.
struct BackgroundWriter {
    tx: mpsc::UnboundedSender<Arc<Snapshot>>,
}

impl BackgroundWriter {
    fn spawn(store: JsonStore) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Arc<Snapshot>>();
        actix_web::rt::spawn(async move {
            while let Some(mut snapshot) = rx.recv().await {
                while let Ok(newer) = rx.try_recv() {
                    snapshot = newer;
                }
                let store = store.clone();
                if let Err(e) = tokio::task::spawn_blocking(move || store.persist(snapshot)).await {
                    log::error!("Snapshot writer failed: {}", e);
                }
            }
        });
        Self { tx }
    }
}

impl SnapshotSink for BackgroundWriter {
    fn persist(&self, snapshot: Arc<Snapshot>) {
        if self.tx.send(snapshot).is_err() {
            log::error!("Snapshot writer is gone; change not saved");
        }
    }
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CompetitorBody {
    name: String,
    #[serde(default)]
    club: String,
    #[serde(default)]
    license: String,
    #[serde(default)]
    weapons: BTreeSet<Weapon>,
}

#[derive(Deserialize)]
struct RefereeBody {
    name: String,
    #[serde(default)]
    license: String,
    #[serde(default)]
    specialties: BTreeSet<Weapon>,
}

#[derive(Deserialize)]
struct CreateCompetitionBody {
    name: String,
    #[serde(default)]
    organizer: String,
    date: NaiveDate,
    #[serde(default)]
    venue: String,
    weapon: Weapon,
    qualifier_cutoff: Option<usize>,
}

#[derive(Deserialize)]
struct PoolsBody {
    #[serde(default = "default_pool_count")]
    pool_count: usize,
}

fn default_pool_count() -> usize {
    1
}

#[derive(Deserialize)]
struct BracketBody {
    qualifier_count: Option<usize>,
}

#[derive(Deserialize)]
struct CutoffBody {
    qualifier_cutoff: usize,
}

#[derive(Deserialize)]
struct ScoreBody {
    touches_1: u32,
    touches_2: u32,
    #[serde(default = "default_completed")]
    completed: bool,
}

fn default_completed() -> bool {
    true
}

/// Path segment: competition id (e.g. /api/competitions/{id})
#[derive(Deserialize)]
struct CompetitionPath {
    id: CompetitionId,
}

#[derive(Deserialize)]
struct CompetitorPath {
    id: CompetitorId,
}

#[derive(Deserialize)]
struct RefereePath {
    id: RefereeId,
}

/// Path segments: competition id and competitor id.
#[derive(Deserialize)]
struct RegistrationPath {
    id: CompetitionId,
    competitor_id: CompetitorId,
}

#[derive(Deserialize)]
struct PoolPath {
    id: CompetitionId,
    pool_id: Uuid,
}

/// Path segments: competition, pool-or-round, bout.
#[derive(Deserialize)]
struct BoutPath {
    id: CompetitionId,
    stage_id: Uuid,
    bout_id: Uuid,
}

fn error_response(e: &CompetitionError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    if e.is_not_found() {
        HttpResponse::NotFound().json(body)
    } else {
        HttpResponse::BadRequest().json(body)
    }
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

/// Run `f` against the registry, then answer with the competition's new state.
fn change_competition(
    state: &AppState,
    id: CompetitionId,
    f: impl FnOnce(&mut Registry) -> Result<(), CompetitionError>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match f(&mut *g).and_then(|()| g.competition(id).cloned()) {
        Ok(c) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "fencing-tournament-web",
    })
}

#[get("/api/competitors")]
async fn api_list_competitors(state: AppState) -> HttpResponse {
    match state.read() {
        Ok(g) => HttpResponse::Ok().json(g.list_competitors()),
        Err(_) => lock_error(),
    }
}

#[post("/api/competitors")]
async fn api_add_competitor(state: AppState, body: Json<CompetitorBody>) -> HttpResponse {
    let body = body.into_inner();
    let competitor = Competitor::new(body.name.trim(), Club::new(body.club), body.license, body.weapons);
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.add_competitor(competitor.clone()) {
        Ok(()) => HttpResponse::Ok().json(competitor),
        Err(e) => error_response(&e),
    }
}

/// Edit a competitor's record in place (id stays the same).
#[put("/api/competitors/{id}")]
async fn api_update_competitor(
    state: AppState,
    path: Path<CompetitorPath>,
    body: Json<CompetitorBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let Some(existing) = g.competitor(path.id).cloned() else {
        return error_response(&CompetitionError::CompetitorNotFound(path.id));
    };
    let updated = Competitor {
        name: body.name.trim().to_string(),
        club: Club {
            name: body.club,
            ..existing.club
        },
        license: body.license,
        weapons: body.weapons,
        ..existing
    };
    match g.update_competitor(updated.clone()) {
        Ok(()) => HttpResponse::Ok().json(updated),
        Err(e) => error_response(&e),
    }
}

#[delete("/api/competitors/{id}")]
async fn api_remove_competitor(state: AppState, path: Path<CompetitorPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.remove_competitor(path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

/// Bulk import: CSV body with header `name,club,license,weapons`.
#[post("/api/competitors/import")]
async fn api_import_competitors(state: AppState, body: String) -> HttpResponse {
    let fencers = match import::competitors_from_csv(body.as_bytes()) {
        Ok(f) => f,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
        }
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let mut added = 0;
    for fencer in fencers {
        match g.add_competitor(fencer) {
            Ok(()) => added += 1,
            Err(e) => log::warn!("Skipped imported competitor: {}", e),
        }
    }
    HttpResponse::Ok().json(serde_json::json!({ "added": added }))
}

#[get("/api/referees")]
async fn api_list_referees(state: AppState) -> HttpResponse {
    match state.read() {
        Ok(g) => HttpResponse::Ok().json(g.list_referees()),
        Err(_) => lock_error(),
    }
}

#[post("/api/referees")]
async fn api_add_referee(state: AppState, body: Json<RefereeBody>) -> HttpResponse {
    let body = body.into_inner();
    let referee = Referee::new(body.name.trim(), body.license, body.specialties);
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.add_referee(referee.clone()) {
        Ok(()) => HttpResponse::Ok().json(referee),
        Err(e) => error_response(&e),
    }
}

#[delete("/api/referees/{id}")]
async fn api_remove_referee(state: AppState, path: Path<RefereePath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.remove_referee(path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

#[get("/api/competitions")]
async fn api_list_competitions(state: AppState) -> HttpResponse {
    match state.read() {
        Ok(g) => HttpResponse::Ok().json(g.competitions()),
        Err(_) => lock_error(),
    }
}

#[post("/api/competitions")]
async fn api_create_competition(state: AppState, body: Json<CreateCompetitionBody>) -> HttpResponse {
    let body = body.into_inner();
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let mut competition = Competition::new(body.name, body.organizer, body.date, body.venue, body.weapon);
    competition.qualifier_cutoff = body
        .qualifier_cutoff
        .unwrap_or(g.config().default_qualifier_cutoff);
    match g.add_competition(competition.clone()) {
        Ok(()) => HttpResponse::Ok().json(competition),
        Err(e) => error_response(&e),
    }
}

#[get("/api/competitions/{id}")]
async fn api_get_competition(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.competition(path.id) {
        Ok(c) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

#[delete("/api/competitions/{id}")]
async fn api_delete_competition(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.remove_competition(path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

/// Toggle one fencer's registration.
#[post("/api/competitions/{id}/registrations/{competitor_id}")]
async fn api_toggle_registration(state: AppState, path: Path<RegistrationPath>) -> HttpResponse {
    change_competition(&state, path.id, |r| {
        r.toggle_registration(path.id, path.competitor_id).map(|_| ())
    })
}

#[post("/api/competitions/{id}/registrations")]
async fn api_register_all(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    change_competition(&state, path.id, |r| r.register_all(path.id))
}

#[put("/api/competitions/{id}/qualifier-cutoff")]
async fn api_set_cutoff(
    state: AppState,
    path: Path<CompetitionPath>,
    body: Json<CutoffBody>,
) -> HttpResponse {
    change_competition(&state, path.id, |r| {
        r.set_qualifier_cutoff(path.id, body.qualifier_cutoff)
    })
}

/// Draw (or redraw) the pools; discards any bracket.
#[post("/api/competitions/{id}/pools")]
async fn api_generate_pools(
    state: AppState,
    path: Path<CompetitionPath>,
    body: Option<Json<PoolsBody>>,
) -> HttpResponse {
    let pool_count = body.map(|b| b.pool_count).unwrap_or_else(default_pool_count);
    change_competition(&state, path.id, |r| r.generate_pools(path.id, pool_count))
}

#[get("/api/competitions/{id}/ranking")]
async fn api_ranking(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.ranking(path.id) {
        Ok(r) => HttpResponse::Ok().json(r),
        Err(e) => error_response(&e),
    }
}

#[get("/api/competitions/{id}/pools/{pool_id}/ranking")]
async fn api_pool_ranking(state: AppState, path: Path<PoolPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.pool_ranking(path.id, path.pool_id) {
        Ok(r) => HttpResponse::Ok().json(r),
        Err(e) => error_response(&e),
    }
}

#[get("/api/ranking")]
async fn api_global_ranking(state: AppState) -> HttpResponse {
    match state.read() {
        Ok(g) => HttpResponse::Ok().json(g.global_ranking()),
        Err(_) => lock_error(),
    }
}

/// Build the bracket from the current ranking; replaces any earlier bracket.
#[post("/api/competitions/{id}/bracket")]
async fn api_generate_bracket(
    state: AppState,
    path: Path<CompetitionPath>,
    body: Option<Json<BracketBody>>,
) -> HttpResponse {
    let qualifiers = body.and_then(|b| b.qualifier_count);
    change_competition(&state, path.id, |r| r.generate_bracket(path.id, qualifiers))
}

#[post("/api/competitions/{id}/bracket/advance")]
async fn api_advance_round(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    change_competition(&state, path.id, |r| r.advance_round(path.id))
}

/// Score a bout in a pool or an elimination round.
#[put("/api/competitions/{id}/stages/{stage_id}/bouts/{bout_id}")]
async fn api_score_bout(
    state: AppState,
    path: Path<BoutPath>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    change_competition(&state, path.id, |r| {
        r.update_bout_score(
            path.id,
            path.stage_id,
            path.bout_id,
            body.touches_1,
            body.touches_2,
            body.completed,
        )
    })
}

#[post("/api/competitions/{id}/simulate/pools")]
async fn api_simulate_pools(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    change_competition(&state, path.id, |r| r.simulate_pools(path.id))
}

#[post("/api/competitions/{id}/simulate/round")]
async fn api_simulate_round(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    change_competition(&state, path.id, |r| r.simulate_round(path.id))
}

#[post("/api/competitions/{id}/simulate/all")]
async fn api_simulate_all(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    change_competition(&state, path.id, |r| r.simulate_all(path.id))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_file() -> String {
    "competition.json".to_string()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let data_file = std::env::var("DATA_FILE").unwrap_or_else(|_| default_data_file());
    let rng = match std::env::var("RNG_SEED").ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(seed) => {
            log::info!("Using fixed RNG seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let store = JsonStore::new(&data_file);
    let registry = Registry::open(&store, EngineConfig::default(), rng)
        .map_err(|e| {
            log::error!("Refusing to start without {}: {}", data_file, e);
            std::io::Error::other(e)
        })?
        .with_sink(BackgroundWriter::spawn(store));
    log::info!(
        "Loaded {} fencers, {} referees, {} competitions from {}",
        registry.list_competitors().len(),
        registry.list_referees().len(),
        registry.competitions().len(),
        data_file
    );

    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(registry));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_import_competitors)
            .service(api_list_competitors)
            .service(api_add_competitor)
            .service(api_update_competitor)
            .service(api_remove_competitor)
            .service(api_list_referees)
            .service(api_add_referee)
            .service(api_remove_referee)
            .service(api_list_competitions)
            .service(api_create_competition)
            .service(api_get_competition)
            .service(api_delete_competition)
            .service(api_toggle_registration)
            .service(api_register_all)
            .service(api_set_cutoff)
            .service(api_generate_pools)
            .service(api_ranking)
            .service(api_pool_ranking)
            .service(api_global_ranking)
            .service(api_generate_bracket)
            .service(api_advance_round)
            .service(api_score_bout)
            .service(api_simulate_pools)
            .service(api_simulate_round)
            .service(api_simulate_all)
    })
    .bind(bind)?
    .run()
    .await
}
