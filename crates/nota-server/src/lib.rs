//! Nota Web Server
//!
//! Axum-based JSON API for the Nota bookkeeping console.
//!
//! The bookkeeping backend is the system of record and handles
//! authentication; this server classifies expense patterns and shapes
//! requests to and from the backend:
//! - Expense pattern classification (local, no backend call)
//! - Category averages built from the backend's monthly aggregates
//! - Passthrough of everything else under `/api/backend/`
//!
//! Security features:
//! - Restrictive CORS policy
//! - Security headers (CSP, nosniff, frame denial)
//! - Request body size limit on passthrough
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use nota_core::{
    BackendClient, ConsoleConfig, CurrencyFormat, ExpenseClassifier, ExpenseSource, FeatureAccess,
};

mod handlers;

/// Maximum passthrough request body size (10 MB)
pub const MAX_FORWARD_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Full path prefix of the passthrough route; must match the `/api` nest below
const BACKEND_ROUTE_PREFIX: &str = "/api/backend";

/// Header carrying the signed-in user's email, set by the backend session layer
const USER_EMAIL_HEADER: &str = "x-user-email";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only in production)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub classifier: ExpenseClassifier,
    pub currency: CurrencyFormat,
    pub access: FeatureAccess,
    /// Passthrough client for the backend
    pub backend: BackendClient,
    /// Source of expense aggregates (the backend in production)
    pub expenses: Arc<dyn ExpenseSource>,
}

/// Extract user email from request headers (for feature gating and logging)
/// Returns "anonymous" when the session layer did not identify the user
pub fn get_user_email(headers: &HeaderMap) -> String {
    headers
        .get(USER_EMAIL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Authorization header value to pass through to the backend, if any
pub fn get_authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Create the application router
pub fn create_router(console: &ConsoleConfig, config: ServerConfig) -> anyhow::Result<Router> {
    let backend = BackendClient::new(&console.backend)?;
    Ok(create_router_with_client(console, config, backend))
}

/// Create the application router around an existing backend client
///
/// The client serves both the passthrough and the expense aggregates.
pub fn create_router_with_client(
    console: &ConsoleConfig,
    config: ServerConfig,
    backend: BackendClient,
) -> Router {
    let expenses: Arc<dyn ExpenseSource> = Arc::new(backend.clone());
    create_router_with_source(console, config, backend, expenses)
}

/// Create the application router with an explicit expense source (for testing)
pub fn create_router_with_source(
    console: &ConsoleConfig,
    config: ServerConfig,
    backend: BackendClient,
    expenses: Arc<dyn ExpenseSource>,
) -> Router {
    info!(
        "Backend configured: {} (timeout {}s)",
        backend.base_url(),
        console.backend.timeout_secs
    );
    if !console.features.beta_users.is_empty() {
        info!("Beta features enabled for {} user(s)", console.features.beta_users.len());
    }

    let state = Arc::new(AppState {
        classifier: console.classifier(),
        currency: console.display.currency_format(),
        access: console.features.clone(),
        backend,
        expenses,
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/features", get(handlers::get_features))
        // Expense pattern classifier
        .route("/expenses/classify", post(handlers::classify_expense))
        .route("/expenses/averages", get(handlers::expense_averages))
        // Everything else goes to the backend untouched
        .route("/backend/*path", any(handlers::forward_to_backend));

    // Build CORS layer
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        // Allow specified origins
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; connect-src 'self'; frame-ancestors 'none'",
    );

    Router::new()
        .nest("/api", api_routes)
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
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ))
}

/// Start the server with custom configuration
pub async fn serve(
    console: &ConsoleConfig,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let backend = BackendClient::new(&console.backend)?;

    // Check backend connection
    if backend.health_check().await {
        info!("✅ Backend connected: {}", backend.base_url());
    } else {
        warn!("⚠️  Backend not responding: {}", backend.base_url());
    }

    let app = create_router_with_client(console, config, backend);

    let addr = format!("{}:{}", host, port);
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
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

    pub fn bad_gateway(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a backend failure to a client-facing error
    ///
    /// Auth and not-found answers keep their status so the client can react
    /// (e.g. redirect to login); everything else becomes 502.
    pub fn from_backend(err: nota_core::Error) -> Self {
        match err {
            nota_core::Error::Backend { status, message }
                if matches!(status, 401 | 403 | 404) =>
            {
                Self {
                    status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                    message,
                    internal: None,
                }
            }
            nota_core::Error::InvalidData(message) => Self::bad_request(&message),
            other => Self {
                status: StatusCode::BAD_GATEWAY,
                message: "Backend unavailable".to_string(),
                internal: Some(other.into()),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
