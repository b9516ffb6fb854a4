//! Spendwise Web Server
//!
//! Axum-based REST API for the Spendwise expense tracker.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Upload size limits
//! - Sanitized error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use spendwise_core::{
    check_health, AIClient, AiSettings, Categorizer, CompletionBackend, Database,
    Error as CoreError, ExpenseTracker, InsightGenerator,
};

mod handlers;

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Request body limit for uploads (file plus multipart framing)
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_SIZE + 64 * 1024;

/// Environment variable listing allowed CORS origins (comma-separated)
pub const ALLOWED_ORIGINS_ENV: &str = "SPENDWISE_ALLOWED_ORIGINS";

/// Server configuration
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Read allowed origins from `SPENDWISE_ALLOWED_ORIGINS`
    pub fn from_env() -> Self {
        let allowed_origins = std::env::var(ALLOWED_ORIGINS_ENV)
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self { allowed_origins }
    }
}

/// Shared application state
pub struct AppState {
    pub tracker: ExpenseTracker,
    pub insights: InsightGenerator,
    /// Backend handle, kept for health reporting only
    pub ai: Option<AIClient>,
    /// Upper bound for one backend health check
    pub health_timeout: Duration,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(
        db: Database,
        ai: Option<AIClient>,
        settings: &AiSettings,
        config: ServerConfig,
    ) -> Self {
        let categorizer = Categorizer::new(ai.clone(), settings);
        Self {
            tracker: ExpenseTracker::new(db, categorizer),
            insights: InsightGenerator::new(ai.clone(), settings),
            ai,
            health_timeout: settings.request.timeout,
            config,
        }
    }
}

/// Build the router around prepared state
pub fn create_router(state: AppState, static_dir: Option<&str>) -> Router {
    let cors = build_cors(&state.config);
    let state = Arc::new(state);

    let routes = Router::new()
        .route(
            "/expenses",
            get(handlers::list_expenses)
                .post(handlers::create_expense)
                .delete(handlers::delete_expenses),
        )
        .route(
            "/expenses/upload",
            post(handlers::upload_expenses).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/expenses/summary", get(handlers::expense_summary))
        .route("/insights", get(handlers::get_insights))
        .route("/health", get(handlers::health));

    let mut app = routes
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    // Serve a dashboard bundle if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

fn build_cors(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        cors
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Start the server
///
/// Loads AI settings and the backend from the environment, then listens on
/// `host:port` until the process is stopped.
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let settings = AiSettings::load()?;
    let ai = AIClient::from_env();

    check_ai_connection(ai.as_ref(), settings.request.timeout).await;

    let app = create_router(AppState::new(db, ai, &settings, config), static_dir);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(ai: Option<&AIClient>, timeout: Duration) {
    match ai {
        Some(client) => {
            if check_health(client, timeout).await {
                info!(
                    "✅ AI backend connected: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  AI backend configured but not responding: {} (model: {})",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            info!("ℹ️  AI backend not configured (set OPENAI_API_KEY or AI_BACKEND=ollama with OLLAMA_HOST); expenses will be categorized as Other");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            if self.status.is_server_error() {
                error!(error = %err, status = %self.status, "Request failed");
            } else {
                warn!(error = %err, status = %self.status, "Request rejected");
            }
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

/// Status and client-facing message for core errors the caller can act on
fn classify_core_error(err: &CoreError) -> Option<(StatusCode, String)> {
    match err {
        // Unreadable uploads are the client's to fix
        CoreError::InvalidImportSchema(_)
        | CoreError::UnsupportedFileType(_)
        | CoreError::InvalidData(_)
        | CoreError::Csv(_)
        | CoreError::Spreadsheet(_) => Some((StatusCode::BAD_REQUEST, err.to_string())),
        CoreError::NotFound(_) => Some((StatusCode::NOT_FOUND, err.to_string())),
        // Backend details stay in the log
        CoreError::InsightUnavailable(_) => Some((
            StatusCode::BAD_GATEWAY,
            "AI insights are currently unavailable".to_string(),
        )),
        _ => None,
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        if let Some((status, message)) = err.downcast_ref::<CoreError>().and_then(classify_core_error)
        {
            return Self {
                status,
                message,
                internal: Some(err),
            };
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
