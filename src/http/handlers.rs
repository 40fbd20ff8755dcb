//! HTTP request handlers for the rating facade.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::airtable::StoreError;
use crate::types::{coerce_stars, PersonRecord};

use super::AppState;

/// Build the axum router with all routes
pub(super) fn router(state: Arc<AppState>) -> axum::Router {
    use axum::routing::{get, post};
    use tower_http::cors::CorsLayer;
    use tower_http::trace::TraceLayer;

    axum::Router::new()
        .route("/search", get(search))
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/save", post(save))
        .route("/status", get(status))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error response body
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

type HandlerError = (StatusCode, Json<ErrorBody>);

fn error_body(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

/// Map facade errors onto HTTP responses. Validation failures carry a
/// specific message; datastore and transport failures are logged in full
/// but reported generically.
fn store_error(operation: &'static str, err: StoreError) -> HandlerError {
    match err {
        StoreError::MissingField(_) => error_body(StatusCode::BAD_REQUEST, err.to_string()),
        StoreError::NotFound(_) => error_body(StatusCode::NOT_FOUND, err.to_string()),
        other => {
            tracing::error!("{} failed: {}", operation, other);
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{operation} request failed"),
            )
        }
    }
}

// -- /search --

#[derive(Deserialize)]
struct SearchParams {
    /// Free-text name query
    q: Option<String>,
    /// Legacy alias for `q`
    search: Option<String>,
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<PersonRecord>>, HandlerError> {
    let query = params.q.or(params.search).unwrap_or_default();

    let records = state
        .store
        .search(&query)
        .await
        .map_err(|e| store_error("search", e))?;

    Ok(Json(records))
}

// -- /create, /update, /save --

#[derive(Deserialize)]
struct SaveBody {
    vorname: Option<String>,
    nachname: Option<String>,
    /// Accepted as a number or numeric string; anything else counts as 0
    sterne: Option<serde_json::Value>,
    #[serde(rename = "recordId")]
    record_id: Option<String>,
}

#[derive(Serialize)]
struct SaveResponse {
    success: bool,
    record: PersonRecord,
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SaveBody>,
) -> Result<Json<SaveResponse>, HandlerError> {
    let record = state
        .store
        .create_person(
            body.vorname.as_deref().unwrap_or(""),
            body.nachname.as_deref().unwrap_or(""),
            coerce_stars(body.sterne.as_ref()),
        )
        .await
        .map_err(|e| store_error("save", e))?;

    Ok(Json(SaveResponse {
        success: true,
        record,
    }))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SaveBody>,
) -> Result<Json<SaveResponse>, HandlerError> {
    let Some(record_id) = body.record_id.filter(|id| !id.is_empty()) else {
        return Err(error_body(StatusCode::BAD_REQUEST, "recordId is required"));
    };

    let record = state
        .store
        .update_rating(&record_id, coerce_stars(body.sterne.as_ref()))
        .await
        .map_err(|e| store_error("save", e))?;

    Ok(Json(SaveResponse {
        success: true,
        record,
    }))
}

/// Combined save: dispatches on the presence of an existing identifier.
/// The identifier is never guessed server-side.
async fn save(
    state: State<Arc<AppState>>,
    Json(body): Json<SaveBody>,
) -> Result<Json<SaveResponse>, HandlerError> {
    if body.record_id.as_deref().is_some_and(|id| !id.is_empty()) {
        update(state, Json(body)).await
    } else {
        create(state, Json(body)).await
    }
}

// -- /status --

/// Service info plus the client-side tuning knobs interactive clients
/// pick up at startup (debounce interval, status message lifetime).
#[derive(Serialize)]
struct StatusResponse {
    status: String,
    table: String,
    max_stars: u32,
    track_log: bool,
    debounce_ms: u64,
    status_clear_ms: u64,
}

async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        table: state.store.table_url().to_string(),
        max_stars: state.config.ratings.max_stars,
        track_log: state.config.ratings.track_log,
        debounce_ms: state.config.search.debounce_ms,
        status_clear_ms: state.config.client.status_clear_ms,
    })
}
