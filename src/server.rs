use crate::backend::{HighsBackend, SolverBackend};
use crate::config::Settings;
use crate::data::{AssignmentInput, AssignmentReport};
use crate::decode::render_csv;
use crate::error::AssignError;
use crate::solver;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use serde_json::json;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub backend: Arc<dyn SolverBackend>,
}

impl AppState {
    pub fn new(settings: Settings, backend: Arc<dyn SolverBackend>) -> Self {
        Self {
            settings: Arc::new(settings),
            backend,
        }
    }
}

impl IntoResponse for AssignError {
    fn into_response(self) -> Response {
        let status = match &self {
            AssignError::InvalidTable { .. }
            | AssignError::UnmappedValue { .. }
            | AssignError::InvalidWeight { .. } => StatusCode::BAD_REQUEST,
            AssignError::Infeasible { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AssignError::Solver(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({
            "error": self.to_string(),
            "diagnostics": self.diagnostics(),
        });
        (status, Json(body)).into_response()
    }
}

// solving is CPU bound; each request gets its own model on the blocking pool
async fn run_solve(
    state: AppState,
    input: AssignmentInput,
) -> Result<AssignmentReport, AssignError> {
    tokio::task::spawn_blocking(move || {
        solver::solve(&input, &state.settings, state.backend.as_ref())
    })
    .await
    .map_err(|e| {
        error!("Solve task failed: {e}");
        AssignError::Solver(format!("solve task failed: {e}"))
    })?
}

async fn assign_handler(
    State(state): State<AppState>,
    Json(input): Json<AssignmentInput>,
) -> Result<Json<AssignmentReport>, AssignError> {
    run_solve(state, input).await.map(Json)
}

async fn assign_csv_handler(
    State(state): State<AppState>,
    Json(input): Json<AssignmentInput>,
) -> Result<impl IntoResponse, AssignError> {
    let report = run_solve(state, input).await?;
    Ok(([(header::CONTENT_TYPE, "text/csv")], render_csv(&report)))
}

async fn health_handler() -> &'static str {
    "ok"
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/roommates/assign", post(assign_handler))
        .route("/v1/roommates/assign/csv", post(assign_csv_handler))
        .with_state(state)
}

pub async fn run_server(settings: Settings) -> std::io::Result<()> {
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let backend: Arc<dyn SolverBackend> = Arc::new(HighsBackend::new(settings.solver.clone()));
    let app = router(AppState::new(settings, backend));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
