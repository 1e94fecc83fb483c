//! HTTP server for the guest import dialog.
//!
//! The dialog drives one import session through these endpoints. Decoding
//! runs on the blocking pool and the batch insert runs outside the session
//! lock, so a slow file or a slow store never blocks other sessions.
//!
//! # API Endpoints
//!
//! | Method | Path                                 | Description                     |
//! |--------|--------------------------------------|---------------------------------|
//! | GET    | `/health`                            | Health check                    |
//! | GET    | `/api/guests/template?lang=es\|en`   | Download the example workbook   |
//! | GET    | `/api/weddings/{wedding_id}/guests`  | Guests of a wedding             |
//! | POST   | `/api/weddings/{wedding_id}/imports` | Open an import session          |
//! | GET    | `/api/imports/{id}`                  | Current session snapshot        |
//! | POST   | `/api/imports/{id}/file`             | Upload a spreadsheet (`file`)   |
//! | POST   | `/api/imports/{id}/reset`            | Back to the upload step         |
//! | POST   | `/api/imports/{id}/commit`           | Insert the valid rows           |
//! | DELETE | `/api/imports/{id}`                  | Close the dialog                |
//! | GET    | `/api/logs?session={id}`             | SSE stream for real-time logs   |

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use super::logs::{log_error, log_info, log_success, LOG_BROADCASTER};
use super::types::{
    error_response, import_error_code, import_error_status, CommitResponse, GuestListResponse,
    OpenSessionResponse, PreviewResponse, TemplateQuery,
};
use crate::commit::insert_batch;
use crate::config::ServerConfig;
use crate::error::{ImportError, ParseError, ServerError, SessionError};
use crate::session::{SessionRegistry, SessionView};
use crate::store::{GuestStore, SupabaseClient};
use crate::template::{template_bytes, TemplateLanguage, XLSX_CONTENT_TYPE};
use crate::transform::pipeline::parse_guests;

/// How often abandoned sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Status and JSON error body returned by failing handlers.
pub type ApiError = (StatusCode, Json<Value>);

/// Shared server state.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub sessions: Arc<SessionRegistry>,
}

impl<S> AppState<S> {
    pub fn new(store: S) -> Self {
        Self::with_registry(store, SessionRegistry::new())
    }

    pub fn with_registry(store: S, sessions: SessionRegistry) -> Self {
        Self {
            store: Arc::new(store),
            sessions: Arc::new(sessions),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

/// Start the HTTP server against the hosted store.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    let store = SupabaseClient::from_env()?;
    let idle_timeout = chrono::Duration::minutes(i64::from(config.session_idle_minutes));
    let state = AppState::with_registry(store, SessionRegistry::with_idle_timeout(idle_timeout));
    spawn_session_sweeper(Arc::clone(&state.sessions));
    let app = router(state, config.max_upload_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("🚀 Guestlist server running on http://localhost:{}", config.port);
    println!("   POST /api/weddings/{{wedding_id}}/imports - Open an import");
    println!("   POST /api/imports/{{id}}/file             - Upload a spreadsheet");
    println!("   POST /api/imports/{{id}}/commit           - Import valid guests");
    println!("   GET  /api/guests/template               - Example workbook");
    println!("   GET  /api/logs                          - SSE log stream");
    println!(
        "   Upload limit: {} MB, idle sessions dropped after {} min",
        config.max_upload_bytes / (1024 * 1024),
        config.session_idle_minutes
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drop import sessions the client abandoned.
fn spawn_session_sweeper(sessions: Arc<SessionRegistry>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            match sessions.evict_idle() {
                Ok(0) => {}
                Ok(n) => log_info(format!("Dropped {} idle import sessions", n)),
                Err(e) => log_error(format!("Session sweep failed: {}", e)),
            }
        }
    });
}

/// Build the router over any guest store.
pub fn router<S>(state: AppState<S>, max_upload_bytes: usize) -> Router
where
    S: GuestStore + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/guests/template", get(download_template))
        .route("/api/weddings/{wedding_id}/guests", get(list_guests::<S>))
        .route("/api/weddings/{wedding_id}/imports", post(open_import::<S>))
        .route(
            "/api/imports/{id}",
            get(get_import::<S>).delete(close_import::<S>),
        )
        .route("/api/imports/{id}/file", post(upload_file::<S>))
        .route("/api/imports/{id}/reset", post(reset_import::<S>))
        .route("/api/imports/{id}/commit", post(commit_import::<S>))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

fn import_failure(err: ImportError) -> ApiError {
    log_error(err.to_string());
    (
        import_error_status(&err),
        Json(error_response(import_error_code(&err), &err.to_string())),
    )
}

fn session_failure(err: SessionError) -> ApiError {
    import_failure(ImportError::Session(err))
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(error_response("bad_request", message)),
    )
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "guestlist",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "template": "GET /api/guests/template",
            "open": "POST /api/weddings/{wedding_id}/imports",
            "upload": "POST /api/imports/{id}/file",
            "commit": "POST /api/imports/{id}/commit",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

#[derive(Debug, Default, Deserialize)]
struct LogsQuery {
    session: Option<String>,
}

/// SSE endpoint for real-time log streaming, optionally for one session.
async fn sse_logs(
    Query(query): Query<LogsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();
    let session = query.session;

    let stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(entry) if entry.visible_to(session.as_deref()) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Example workbook download.
async fn download_template(Query(query): Query<TemplateQuery>) -> Result<Response, ApiError> {
    let language = match query.lang.as_deref() {
        Some(lang) => lang
            .parse::<TemplateLanguage>()
            .map_err(|e| bad_request(&e))?,
        None => TemplateLanguage::default(),
    };

    let bytes = template_bytes(language).map_err(|e| {
        log_error(format!("Template generation failed: {}", e));
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(error_response("template_error", &e.to_string())),
        )
    })?;

    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", language.file_name()),
        ),
    ];
    Ok((headers, bytes).into_response())
}

async fn list_guests<S>(
    State(state): State<AppState<S>>,
    Path(wedding_id): Path<String>,
) -> Result<Json<GuestListResponse>, ApiError>
where
    S: GuestStore + Send + Sync + 'static,
{
    let guests = state
        .store
        .list_guests(&wedding_id)
        .await
        .map_err(|e| import_failure(e.into()))?;

    Ok(Json(GuestListResponse {
        wedding_id,
        total: guests.len(),
        guests,
    }))
}

async fn open_import<S>(
    State(state): State<AppState<S>>,
    Path(wedding_id): Path<String>,
) -> Result<(StatusCode, Json<OpenSessionResponse>), ApiError>
where
    S: GuestStore + Send + Sync + 'static,
{
    if wedding_id.trim().is_empty() {
        return Err(bad_request("wedding id is required"));
    }
    let id = state.sessions.open(&wedding_id).map_err(session_failure)?;
    log_info(format!("Import opened for wedding {}", wedding_id));

    Ok((
        StatusCode::CREATED,
        Json(OpenSessionResponse {
            session_id: id.to_string(),
            wedding_id,
            step: "upload".to_string(),
        }),
    ))
}

async fn get_import<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError>
where
    S: GuestStore + Send + Sync + 'static,
{
    let view = state
        .sessions
        .with_session(id, |s| s.view())
        .map_err(session_failure)?;
    Ok(Json(view))
}

/// Upload endpoint: reads the `file` field and runs the preview.
async fn upload_file<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<PreviewResponse>, ApiError>
where
    S: GuestStore + Send + Sync + 'static,
{
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            e.status(),
            Json(error_response("bad_request", &format!("Multipart error: {}", e))),
        )
    })? {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| {
                        (
                            e.status(),
                            Json(error_response("bad_request", &format!("Read error: {}", e))),
                        )
                    })?
                    .to_vec(),
            );
        }
    }

    let bytes = file_data.ok_or_else(|| bad_request("No file provided"))?;
    let file_name = file_name.ok_or_else(|| bad_request("File name is missing"))?;

    log_info(format!("📄 Upload: {} ({} bytes)", file_name, bytes.len()));

    process_upload(&state, id, file_name, bytes).await.map(Json)
}

/// Decode an uploaded file for a session and return its preview.
pub async fn process_upload<S>(
    state: &AppState<S>,
    id: Uuid,
    file_name: String,
    bytes: Vec<u8>,
) -> Result<PreviewResponse, ApiError>
where
    S: GuestStore + Send + Sync + 'static,
{
    state
        .sessions
        .with_session(id, |s| s.begin_processing(&file_name))
        .map_err(session_failure)?
        .map_err(import_failure)?;

    let name = file_name.clone();
    let result = tokio::task::spawn_blocking(move || parse_guests(&name, &bytes))
        .await
        .unwrap_or_else(|e| {
            Err(ImportError::Parse(ParseError::Workbook(format!(
                "decoder stopped: {}",
                e
            ))))
        });

    state
        .sessions
        .with_session(id, |s| {
            s.finish_processing(result)
                .map(|preview| preview.status())
                .map(|status| PreviewResponse::new(s.view(), status))
        })
        .map_err(session_failure)?
        .map_err(import_failure)
}

async fn reset_import<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError>
where
    S: GuestStore + Send + Sync + 'static,
{
    let view = state
        .sessions
        .with_session(id, |s| s.reset().map(|()| s.view()))
        .map_err(session_failure)?
        .map_err(session_failure)?;
    Ok(Json(view))
}

/// Commit the session's valid rows in one batch insert.
async fn commit_import<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CommitResponse>, ApiError>
where
    S: GuestStore + Send + Sync + 'static,
{
    let payloads = state
        .sessions
        .with_session(id, |s| s.begin_commit())
        .map_err(session_failure)?
        .map_err(import_failure)?;

    let result = insert_batch(state.store.as_ref(), &payloads).await;

    let outcome = state
        .sessions
        .with_session(id, |s| s.finish_commit(result))
        .map_err(session_failure)?
        .map_err(import_failure)?;

    log_success(outcome.message());
    Ok(Json(CommitResponse::from(outcome)))
}

async fn close_import<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
    S: GuestStore + Send + Sync + 'static,
{
    state.sessions.close(id).map_err(session_failure)?;
    Ok(StatusCode::NO_CONTENT)
}
