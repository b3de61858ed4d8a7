use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use maze_core::{CommandError, Control, Graph, MoveReport, OutcomeKind, RngKind, SessionError};
use maze_host::{HostConfig, HostError, MazeSession, SessionSeeds, SessionView};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Solved sessions are dropped after this much idle time, or the TTL if shorter
const SOLVED_GRACE: Duration = Duration::from_secs(60);

/// A session plus the bookkeeping the server keeps for it
struct SessionEntry {
    session: MazeSession,
    /// Set while an automated solve owns the session
    solving: bool,
    last_used: Instant,
}

impl SessionEntry {
    fn new(session: MazeSession) -> Self {
        Self {
            session,
            solving: false,
            last_used: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_used = Instant::now();
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        if self.solving {
            return false;
        }
        let limit = if self.session.is_solved() { SOLVED_GRACE.min(ttl) } else { ttl };
        self.last_used.elapsed() >= limit
    }
}

/// Shared server state: one cell graph, many sessions
struct AppState {
    graph: Arc<Graph>,
    config: HostConfig,
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    next_module_id: AtomicU64,
}

impl AppState {
    fn new(graph: Graph, config: HostConfig) -> Self {
        Self {
            graph: Arc::new(graph),
            config,
            sessions: Mutex::new(HashMap::new()),
            next_module_id: AtomicU64::new(1),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<Uuid, SessionEntry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop sessions idle past the TTL, and solved ones past the grace period
    fn evict_stale(&self, sessions: &mut HashMap<Uuid, SessionEntry>) {
        let ttl = self.config.session_ttl;
        sessions.retain(|id, entry| {
            let stale = entry.is_stale(ttl);
            if stale {
                tracing::debug!("Evicting idle session {}", id);
            }
            !stale
        });
    }
}

/// Clears a session's `solving` flag when the solve handler finishes,
/// including when the client disconnects and the future is dropped
struct SolveGuard {
    state: web::Data<AppState>,
    id: Uuid,
}

impl Drop for SolveGuard {
    fn drop(&mut self) {
        if let Some(entry) = self.state.sessions().get_mut(&self.id) {
            entry.solving = false;
        }
    }
}

// Request/Response types

#[derive(Debug, Deserialize)]
struct CreateSessionRequest {
    rule_seed: i32,
    placement_seed: Option<u32>,
    rng: Option<RngKind>,
}

#[derive(Debug, Deserialize)]
struct MoveRequest {
    control: Control,
}

#[derive(Debug, Deserialize)]
struct CommandRequest {
    command: String,
}

#[derive(Debug, Serialize, Default)]
struct SessionResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<SessionView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reports: Vec<MoveReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SessionResponse {
    fn ok(id: Uuid, session: &MazeSession, reports: Vec<MoveReport>) -> Self {
        Self {
            success: true,
            session_id: Some(id),
            session: Some(session.view()),
            reports,
            error: None,
        }
    }
}

fn not_found(id: Uuid) -> HttpResponse {
    HttpResponse::NotFound().json(SessionResponse {
        error: Some(format!("no session with id {}", id)),
        ..Default::default()
    })
}

fn solve_running(id: Uuid, session: &MazeSession) -> HttpResponse {
    HttpResponse::Conflict().json(SessionResponse {
        success: false,
        session_id: Some(id),
        session: Some(session.view()),
        reports: Vec::new(),
        error: Some("a solve is already running on this session".to_string()),
    })
}

/// Map a host error onto a status code, keeping any partial command progress
fn error_response(id: Uuid, session: &MazeSession, err: HostError) -> HttpResponse {
    let (mut builder, reports) = match &err {
        HostError::Session(SessionError::Solved) => (HttpResponse::Conflict(), Vec::new()),
        HostError::Command(failure) if failure.error == CommandError::Solved => {
            (HttpResponse::Conflict(), failure.reports.clone())
        }
        HostError::Command(failure) => (HttpResponse::BadRequest(), failure.reports.clone()),
        HostError::UnknownLabel(_) | HostError::Config(_) => (HttpResponse::BadRequest(), Vec::new()),
        _ => (HttpResponse::InternalServerError(), Vec::new()),
    };
    builder.json(SessionResponse {
        success: false,
        session_id: Some(id),
        session: Some(session.view()),
        reports,
        error: Some(err.to_string()),
    })
}

// API Handlers

/// POST /api/sessions
/// Generate a maze and place start and goal
async fn create_session(state: web::Data<AppState>, req: web::Json<CreateSessionRequest>) -> impl Responder {
    let rng = req.rng.unwrap_or(state.config.rng);
    let placement_seed = req.placement_seed.unwrap_or_else(|| Uuid::new_v4().as_u128() as u32);
    let module_id = state.next_module_id.fetch_add(1, Ordering::Relaxed);
    tracing::info!("Received create-session request for rule seed: {}", req.rule_seed);

    match MazeSession::start(
        state.graph.clone(),
        SessionSeeds::new(req.rule_seed, placement_seed),
        rng,
        module_id,
    ) {
        Ok(session) => {
            let id = Uuid::new_v4();
            let response = SessionResponse::ok(id, &session, Vec::new());
            let mut sessions = state.sessions();
            state.evict_stale(&mut sessions);
            sessions.insert(id, SessionEntry::new(session));
            tracing::info!("Created session {} (module {})", id, module_id);
            HttpResponse::Created().json(response)
        }
        Err(e) => {
            tracing::error!("Failed to create session: {}", e);
            HttpResponse::InternalServerError().json(SessionResponse {
                error: Some(e.to_string()),
                ..Default::default()
            })
        }
    }
}

/// GET /api/sessions/{id}
async fn get_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();
    let mut sessions = state.sessions();
    match sessions.get_mut(&id) {
        Some(entry) => {
            entry.touch();
            HttpResponse::Ok().json(SessionResponse::ok(id, &entry.session, Vec::new()))
        }
        None => not_found(id),
    }
}

/// DELETE /api/sessions/{id}
async fn delete_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();
    let mut sessions = state.sessions();
    match sessions.get(&id) {
        Some(entry) if entry.solving => solve_running(id, &entry.session),
        Some(_) => {
            sessions.remove(&id);
            tracing::info!("Deleted session {}", id);
            HttpResponse::Ok().json(SessionResponse {
                success: true,
                session_id: Some(id),
                ..Default::default()
            })
        }
        None => not_found(id),
    }
}

/// POST /api/sessions/{id}/move
async fn press_control(state: web::Data<AppState>, path: web::Path<Uuid>, req: web::Json<MoveRequest>) -> impl Responder {
    let id = path.into_inner();
    let mut sessions = state.sessions();
    let Some(entry) = sessions.get_mut(&id) else {
        return not_found(id);
    };
    if entry.solving {
        return solve_running(id, &entry.session);
    }
    entry.touch();
    match entry.session.press(req.control) {
        Ok(report) => HttpResponse::Ok().json(SessionResponse::ok(id, &entry.session, vec![report])),
        Err(e) => error_response(id, &entry.session, e),
    }
}

/// POST /api/sessions/{id}/reset
async fn reset_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();
    let mut sessions = state.sessions();
    let Some(entry) = sessions.get_mut(&id) else {
        return not_found(id);
    };
    if entry.solving {
        return solve_running(id, &entry.session);
    }
    entry.touch();
    match entry.session.reset() {
        Ok(()) => HttpResponse::Ok().json(SessionResponse::ok(id, &entry.session, Vec::new())),
        Err(e) => error_response(id, &entry.session, e),
    }
}

/// POST /api/sessions/{id}/command
/// Run a text command such as "move 1432 bridge"
async fn run_command(state: web::Data<AppState>, path: web::Path<Uuid>, req: web::Json<CommandRequest>) -> impl Responder {
    let id = path.into_inner();
    let mut sessions = state.sessions();
    let Some(entry) = sessions.get_mut(&id) else {
        return not_found(id);
    };
    if entry.solving {
        return solve_running(id, &entry.session);
    }
    entry.touch();
    match entry.session.run_command(&req.command) {
        Ok(reports) => HttpResponse::Ok().json(SessionResponse::ok(id, &entry.session, reports)),
        Err(e) => error_response(id, &entry.session, e),
    }
}

/// POST /api/sessions/{id}/solve
/// Walk the shortest path with the configured delay between steps.
/// Other mutations of the session are refused until the walk ends.
async fn solve_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();
    let controls = {
        let mut sessions = state.sessions();
        let Some(entry) = sessions.get_mut(&id) else {
            return not_found(id);
        };
        if entry.solving {
            return solve_running(id, &entry.session);
        }
        if entry.session.is_solved() {
            return HttpResponse::Ok().json(SessionResponse::ok(id, &entry.session, Vec::new()));
        }
        entry.solving = true;
        entry.touch();
        entry.session.solution()
    };
    let _solving = SolveGuard { state: state.clone(), id };
    tracing::info!("Solving session {} in {} moves", id, controls.len());

    let mut reports = Vec::with_capacity(controls.len());
    for (step, control) in controls.into_iter().enumerate() {
        if step > 0 && !state.config.solve_delay.is_zero() {
            actix_rt::time::sleep(state.config.solve_delay).await;
        }

        // Held for one press; the guard must not be dropped while it is
        let mut sessions = state.sessions();
        let Some(entry) = sessions.get_mut(&id) else {
            return not_found(id);
        };
        entry.touch();
        match entry.session.press(control) {
            Ok(report) => {
                reports.push(report);
                if report.kind != OutcomeKind::Moved {
                    break;
                }
            }
            Err(e) => return error_response(id, &entry.session, e),
        }
    }

    let sessions = state.sessions();
    let response = match sessions.get(&id) {
        Some(entry) => HttpResponse::Ok().json(SessionResponse::ok(id, &entry.session, reports)),
        None => not_found(id),
    };
    drop(sessions);
    response
}

/// GET /health
/// Health check endpoint
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "crazy-maze-api"
    }))
}

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/api/sessions", web::post().to(create_session))
        .route("/api/sessions/{id}", web::get().to(get_session))
        .route("/api/sessions/{id}", web::delete().to(delete_session))
        .route("/api/sessions/{id}/move", web::post().to(press_control))
        .route("/api/sessions/{id}/reset", web::post().to(reset_session))
        .route("/api/sessions/{id}/command", web::post().to(run_command))
        .route("/api/sessions/{id}/solve", web::post().to(solve_session));
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Crazy Maze API Server");

    let config = HostConfig::from_env().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let graph = config
        .load_graph()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    tracing::info!("Cell graph has {} cells", graph.len());

    let bind_address = config.bind_address.clone();
    tracing::info!("Binding to {}", bind_address);

    let state = web::Data::new(AppState::new(graph, config));

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().limit(65_536))
            .configure(configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
