//! HTTP routes for report sketches.

use crate::error::ApiError;
use crate::events::{self, EventHub, SketchEvent};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection, ws::WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use sketchpad_core::{
    ReportId, Sketch, SketchDocument, SketchId, SketchStore, SketchType, SketchUpdate,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SketchStore>,
    pub events: Arc<EventHub>,
}

impl AppState {
    pub fn new(store: Arc<dyn SketchStore>) -> Self {
        Self {
            store,
            events: Arc::new(EventHub::new()),
        }
    }
}

/// Body of `POST /reports/{report_id}/sketches`. Malformed strokes reject
/// the whole request.
#[derive(Debug, Deserialize)]
pub struct CreateSketch {
    pub sketch_type: SketchType,
    #[serde(default)]
    pub data: SketchDocument,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/reports/{report_id}/sketches", get(list_sketches).post(create_sketch))
        .route("/reports/{report_id}/events", get(report_events))
        .route(
            "/sketches/{id}",
            get(get_sketch).put(update_sketch).delete(delete_sketch),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> &'static str {
    "Sketchpad Server - sketches at /reports/{id}/sketches, events at /reports/{id}/events"
}

async fn health() -> &'static str {
    "ok"
}

async fn list_sketches(
    State(state): State<AppState>,
    Path(report_id): Path<ReportId>,
) -> Result<Json<Vec<Sketch>>, ApiError> {
    Ok(Json(state.store.list_sketches(&report_id).await?))
}

async fn create_sketch(
    State(state): State<AppState>,
    Path(report_id): Path<ReportId>,
    body: Result<Json<CreateSketch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let sketch = state
        .store
        .create_sketch(&report_id, body.sketch_type, body.data)
        .await?;
    info!("Created sketch {} for report {}", sketch.id, sketch.report_id);

    state.events.publish(
        &sketch.report_id,
        SketchEvent::Created {
            sketch: sketch.clone(),
        },
    );
    Ok((StatusCode::CREATED, Json(sketch)))
}

async fn get_sketch(
    State(state): State<AppState>,
    Path(id): Path<SketchId>,
) -> Result<Json<Sketch>, ApiError> {
    Ok(Json(state.store.get_sketch(id).await?))
}

async fn update_sketch(
    State(state): State<AppState>,
    Path(id): Path<SketchId>,
    update: Result<Json<SketchUpdate>, JsonRejection>,
) -> Result<Json<Sketch>, ApiError> {
    let Json(update) = update?;
    let sketch = state.store.update_sketch(id, update).await?;
    state.events.publish(
        &sketch.report_id,
        SketchEvent::Updated {
            sketch: sketch.clone(),
        },
    );
    Ok(Json(sketch))
}

async fn delete_sketch(
    State(state): State<AppState>,
    Path(id): Path<SketchId>,
) -> Result<StatusCode, ApiError> {
    let report_id = state.store.get_sketch(id).await?.report_id;
    state.store.delete_sketch(id).await?;
    info!("Deleted sketch {} from report {}", id, report_id);

    let event = SketchEvent::Deleted {
        id,
        report_id: report_id.clone(),
    };
    state.events.publish(&report_id, event);
    Ok(StatusCode::NO_CONTENT)
}

async fn report_events(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(report_id): Path<ReportId>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| events::handle_socket(socket, state.events, report_id))
}
