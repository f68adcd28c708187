use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::assets::{self, SpriteKind, SpriteSet};
use crate::beaker::{BeakerGeometry, Frame};
use crate::config::SimConfig;
use crate::error::{ApiError, ApiResult, AssetError, LifecycleError};
use crate::lifecycle::Sketch;
use crate::page::{INDEX_HTML, INFO_HTML};
use crate::reconciler::ProtonRequest;
use crate::session::Counters;
use crate::view::{Control, Views};

struct SessionEntry {
    sketch: Sketch,
    last_seen: Instant,
}

/// Shared state for the axum handlers. Each learner gets their own sketch;
/// the table lock is held only for the duration of one call into it.
#[derive(Clone)]
pub struct AppState {
    sessions: Arc<Mutex<HashMap<Uuid, SessionEntry>>>,
    sim: Arc<SimConfig>,
    max_idle: Duration,
}

impl AppState {
    pub fn new(sim: SimConfig, max_idle: Duration) -> Self {
        AppState {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            sim: Arc::new(sim),
            max_idle,
        }
    }

    pub fn session_count(&self) -> ApiResult<usize> {
        Ok(self.lock()?.len())
    }

    fn lock(&self) -> ApiResult<std::sync::MutexGuard<'_, HashMap<Uuid, SessionEntry>>> {
        self.sessions.lock().map_err(|_| ApiError::SessionsPoisoned)
    }

    fn with_session<T>(&self, id: Uuid, f: impl FnOnce(&mut Sketch) -> ApiResult<T>) -> ApiResult<T> {
        let mut sessions = self.lock()?;
        let entry = sessions
            .get_mut(&id)
            .ok_or(ApiError::SessionNotFound { id })?;
        entry.last_seen = Instant::now();
        f(&mut entry.sketch)
    }

    /// Drop sessions whose page has stopped asking for frames.
    fn prune_idle(&self) -> ApiResult<usize> {
        let mut sessions = self.lock()?;
        let before = sessions.len();
        let max_idle = self.max_idle;
        sessions.retain(|_, entry| entry.last_seen.elapsed() < max_idle);
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!(pruned, remaining = sessions.len(), "pruned idle sessions");
        }
        Ok(pruned)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/info", get(info))
        .route("/health", get(health))
        .route("/assets/:name", get(asset))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", axum::routing::delete(delete_session))
        .route("/api/sessions/:id/frame", get(frame))
        .route("/api/sessions/:id/edit", post(edit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::SessionNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Asset(AssetError::UnknownSprite { .. }) => StatusCode::NOT_FOUND,
            ApiError::Lifecycle(LifecycleError::Preload(_))
            | ApiError::Asset(_)
            | ApiError::SessionsPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Lifecycle(_) => StatusCode::CONFLICT,
        };
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Serialize)]
struct SessionCreated {
    id: Uuid,
    sprites: SpriteSet,
    geometry: BeakerGeometry,
    views: Views,
    counters: Counters,
}

#[derive(Serialize)]
struct FrameResponse {
    frame: Frame,
    views: Views,
    counters: Counters,
}

#[derive(Deserialize)]
struct EditRequest {
    control: Control,
    value: String,
}

#[derive(Serialize)]
struct EditResponse {
    accepted: bool,
    request: Option<ProtonRequest>,
    views: Views,
    counters: Counters,
}

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn info() -> impl IntoResponse {
    Html(INFO_HTML)
}

async fn health(State(app): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(json!({ "status": "ok", "sessions": app.session_count()? })))
}

async fn asset(Path(name): Path<String>) -> ApiResult<impl IntoResponse> {
    let kind = SpriteKind::from_name(&name).ok_or_else(|| AssetError::UnknownSprite { name: name.clone() })?;
    let png = assets::load_sprite(kind)?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        png.as_ref().clone(),
    ))
}

async fn create_session(State(app): State<AppState>) -> ApiResult<Json<SessionCreated>> {
    app.prune_idle()?;

    let mut sketch = Sketch::new(app.sim.as_ref().clone());
    let sprites = sketch.preload()?;
    let geometry = sketch.setup()?;
    let state = sketch.state().ok_or(LifecycleError::NotSetUp)?;
    let (views, counters) = (state.views.clone(), state.counters);

    let id = Uuid::new_v4();
    app.lock()?.insert(
        id,
        SessionEntry {
            sketch,
            last_seen: Instant::now(),
        },
    );
    info!(%id, "session created");

    Ok(Json(SessionCreated {
        id,
        sprites,
        geometry,
        views,
        counters,
    }))
}

async fn delete_session(State(app): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    match app.lock()?.remove(&id) {
        Some(_) => {
            info!(%id, "session closed");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::SessionNotFound { id }),
    }
}

async fn frame(State(app): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<FrameResponse>> {
    app.with_session(id, |sketch| {
        let frame = sketch.frame()?;
        let state = sketch.state().ok_or(LifecycleError::NotSetUp)?;
        Ok(FrameResponse {
            frame,
            views: state.views.clone(),
            counters: state.counters,
        })
    })
    .map(Json)
}

async fn edit(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<EditRequest>,
) -> ApiResult<Json<EditResponse>> {
    app.with_session(id, |sketch| {
        let request = sketch.edit(body.control, &body.value)?;
        let state = sketch.state().ok_or(LifecycleError::NotSetUp)?;
        Ok(EditResponse {
            accepted: request.is_some(),
            request,
            views: state.views.clone(),
            counters: state.counters,
        })
    })
    .map(Json)
}
