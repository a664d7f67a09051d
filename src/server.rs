//! HTTP server exposing one search session.
//!
//! Routes:
//! - `GET  /health`
//! - `POST /search`            `{ "query": "Author One, Author Two" }`
//! - `POST /import?format=csv` raw spreadsheet body
//! - `GET  /publications`      current page
//! - `PATCH /criteria`         partial criteria update
//! - `POST /criteria/clear`
//! - `POST /authors/toggle`    `{ "author": "..." }`
//! - `GET  /export/{format}`   `xlsx`, `bib` or `docx` download

use crate::coordinator::{FetchCoordinator, FetchOutcome};
use crate::error::ScholarSearchError;
use crate::export::{self, ExportFormat};
use crate::import::{self, SheetFormat};
use crate::models::{Publication, SortOrder};
use crate::session::{SearchSession, SessionSummary};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared server state: the fetch coordinator and the single active session
pub struct AppState {
    pub coordinator: FetchCoordinator,
    pub session: RwLock<SearchSession>,
}

impl AppState {
    pub fn new(coordinator: FetchCoordinator) -> Self {
        Self {
            coordinator,
            session: RwLock::new(SearchSession::new()),
        }
    }
}

/// Build the router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/search", post(search_handler))
        .route("/import", post(import_handler))
        .route("/publications", get(publications_handler))
        .route("/criteria", patch(criteria_handler))
        .route("/criteria/clear", post(clear_handler))
        .route("/authors/toggle", post(toggle_handler))
        .route("/export/{format}", get(export_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until the listener fails.
pub async fn run(state: Arc<AppState>, addr: SocketAddr) -> crate::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Error body returned by every handler
#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: String,
    message: String,
}

struct ApiError(StatusCode, String);

impl From<ScholarSearchError> for ApiError {
    fn from(e: ScholarSearchError) -> Self {
        let status = match &e {
            ScholarSearchError::Validation(_) | ScholarSearchError::Import(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.1,
        };
        (self.0, Json(body)).into_response()
    }
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: String,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    session: SessionSummary,
}

async fn run_search(state: &AppState, query: &str) -> Result<Json<SearchResponse>, ApiError> {
    let outcome = state.coordinator.fetch(&state.session, query).await?;

    let status = match outcome {
        FetchOutcome::Loaded { .. } => "success",
        FetchOutcome::Failed => "failed",
        FetchOutcome::Superseded => "superseded",
    };

    let session = state.session.read().await;
    Ok(Json(SearchResponse {
        status,
        message: session.status_message(),
        session: session.summary(),
    }))
}

/// Fetch publications for a comma-separated author query
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    info!(query = %req.query, "Search request");
    run_search(&state, &req.query).await
}

#[derive(Debug, Deserialize)]
struct ImportParams {
    #[serde(default = "default_import_format")]
    format: String,
}

fn default_import_format() -> String {
    "xlsx".to_string()
}

/// Import an author spreadsheet and fetch its authors
async fn import_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImportParams>,
    body: Bytes,
) -> Result<Json<SearchResponse>, ApiError> {
    let format: SheetFormat = params.format.parse()?;
    let authors = import::authors_from_bytes(&body, format)?;
    let query = authors.join(",");
    info!(authors = authors.len(), "Import request");
    run_search(&state, &query).await
}

#[derive(Debug, Serialize)]
struct PublicationsResponse<'a> {
    loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    page: usize,
    total_pages: usize,
    total_count: usize,
    items: Vec<&'a Publication>,
}

/// Current page of results
async fn publications_handler(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.read().await;
    let view = session.view();
    let body = PublicationsResponse {
        loading: session.is_loading(),
        message: session.status_message(),
        page: view.page,
        total_pages: view.display_total_pages(),
        total_count: view.total_count,
        items: view.items.clone(),
    };
    Json(body).into_response()
}

/// Partial criteria update; absent fields keep their value.
#[derive(Debug, Default, Deserialize)]
struct CriteriaUpdate {
    search_term: Option<String>,
    #[serde(default, with = "double_option")]
    start_year: Option<Option<i32>>,
    #[serde(default, with = "double_option")]
    end_year: Option<Option<i32>>,
    sort_order: Option<SortOrder>,
    page: Option<usize>,
    selected_authors: Option<Vec<String>>,
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

async fn criteria_handler(
    State(state): State<Arc<AppState>>,
    Json(update): Json<CriteriaUpdate>,
) -> Json<SessionSummary> {
    let mut session = state.session.write().await;

    if let Some(term) = update.search_term {
        session.set_search_term(term);
    }
    if let Some(authors) = update.selected_authors {
        session.select_authors(authors);
    }
    if update.start_year.is_some() || update.end_year.is_some() {
        let start = update.start_year.unwrap_or(session.criteria().start_year);
        let end = update.end_year.unwrap_or(session.criteria().end_year);
        session.set_year_range(start, end);
    }
    if let Some(order) = update.sort_order {
        session.set_sort_order(order);
    }
    // Re-clamp even without an explicit page: filters may shrink the page count
    let page = update.page.unwrap_or(session.criteria().page);
    session.go_to_page(page);

    Json(session.summary())
}

async fn clear_handler(State(state): State<Arc<AppState>>) -> Json<SessionSummary> {
    let mut session = state.session.write().await;
    session.clear_filters();
    let page = session.criteria().page;
    session.go_to_page(page);
    Json(session.summary())
}

#[derive(Debug, Deserialize)]
struct ToggleRequest {
    author: String,
}

async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<SessionSummary>, ApiError> {
    let mut session = state.session.write().await;
    if session.results().get(&req.author).is_none() {
        return Err(ApiError(
            StatusCode::NOT_FOUND,
            format!("Unknown author: {}", req.author),
        ));
    }
    session.toggle_author(&req.author);
    let page = session.criteria().page;
    session.go_to_page(page);
    Ok(Json(session.summary()))
}

/// Download the filtered publications
async fn export_handler(
    State(state): State<Arc<AppState>>,
    Path(format): Path<String>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = format.parse()?;

    let bytes = {
        let session = state.session.read().await;
        let publications = session.export_list();
        export::render(format, &publications).map_err(|e| {
            error!(format = %format, error = %e, "Export failed");
            ApiError::from(e)
        })?
    };

    let disposition = format!("attachment; filename=\"{}\"", format.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
