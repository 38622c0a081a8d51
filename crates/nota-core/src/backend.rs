//! Bookkeeping backend client
//!
//! Thin HTTP client for the external backend that owns the books. The base
//! URL is injected once through [`BackendConfig`]; handlers never read it
//! from the environment themselves.
//!
//! Authentication is the backend's business: callers pass the incoming
//! `Authorization` header value through untouched.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::models::ExpenseSummary;

/// Longest backend error body echoed into an error message
const MAX_ERROR_MESSAGE_LEN: usize = 200;

/// Source of per-category annual expense aggregates
#[async_trait]
pub trait ExpenseSource: Send + Sync {
    /// Fetch the monthly expense aggregation for a year
    async fn fetch_expense_summary(
        &self,
        year: i32,
        authorization: Option<&str>,
    ) -> Result<ExpenseSummary>;
}

/// A request to pass through to the backend unchanged
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    /// Backend path, e.g. "/api/scadenziario"
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ForwardRequest {
    pub fn get(path: &str) -> Self {
        Self {
            method: Method::GET,
            path: path.to_string(),
            query: None,
            authorization: None,
            content_type: None,
            body: Vec::new(),
        }
    }
}

/// Backend response relayed as-is
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// HTTP client for the bookkeeping backend
#[derive(Clone)]
pub struct BackendClient {
    http_client: Client,
    base_url: String,
    expense_summary_path: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http_client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http_client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            expense_summary_path: config.expense_summary_path.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check whether the backend answers its health endpoint
    pub async fn health_check(&self) -> bool {
        match self.http_client.get(self.url("/health")).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Backend health check failed");
                false
            }
        }
    }

    /// Pass a request through to the backend and relay its response
    ///
    /// Non-2xx responses are relayed too; only transport failures are errors.
    pub async fn forward(&self, request: ForwardRequest) -> Result<ForwardedResponse> {
        let path = normalize_path(&request.path)?;
        let mut url = self.url(&path);
        if let Some(query) = request.query.as_deref().filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }

        debug!(method = %request.method, url = %url, "Forwarding request to backend");

        let mut builder = self.http_client.request(request.method, &url);
        if let Some(auth) = request.authorization.as_deref() {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if let Some(content_type) = request.content_type.as_deref() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(ForwardedResponse {
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl ExpenseSource for BackendClient {
    async fn fetch_expense_summary(
        &self,
        year: i32,
        authorization: Option<&str>,
    ) -> Result<ExpenseSummary> {
        let mut request = self
            .http_client
            .get(self.url(&self.expense_summary_path))
            .query(&[("year", year)]);
        if let Some(auth) = authorization {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = ensure_success(request.send().await?).await?;
        let summary: ExpenseSummary = response.json().await?;
        debug!(
            year = summary.year,
            categories = summary.categories.len(),
            "Fetched expense summary"
        );
        Ok(summary)
    }
}

/// Turn a non-2xx response into [`Error::Backend`]
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
    warn!(status = status.as_u16(), message = %message, "Backend request failed");

    Err(Error::Backend {
        status: status.as_u16(),
        message,
    })
}

/// Pull a readable message out of a backend error body
///
/// Understands `{"detail": ...}`, `{"error": ...}` and `{"message": ...}`;
/// anything else is returned as trimmed text.
fn extract_error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(text) = json.get(key).and_then(|v| v.as_str()) {
                return Some(text.to_string());
            }
        }
    }

    Some(body.chars().take(MAX_ERROR_MESSAGE_LEN).collect())
}

/// Ensure a leading slash and refuse parent-directory segments
fn normalize_path(path: &str) -> Result<String> {
    if path.split('/').any(|segment| segment == "..") {
        return Err(Error::InvalidData(format!(
            "Backend path may not contain '..': {}",
            path
        )));
    }
    if path.starts_with('/') {
        Ok(path.to_string())
    } else {
        Ok(format!("/{}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockBackendServer, MOCK_TOKEN};

    fn client_for(server: &MockBackendServer) -> BackendClient {
        let config = BackendConfig {
            base_url: format!("{}/", server.url()),
            ..Default::default()
        };
        BackendClient::new(&config).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = BackendConfig {
            base_url: "http://backend:8000/".to_string(),
            ..Default::default()
        };
        let client = BackendClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://backend:8000");
        assert_eq!(client.url("/health"), "http://backend:8000/health");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("api/x").unwrap(), "/api/x");
        assert_eq!(normalize_path("/api/x").unwrap(), "/api/x");
        assert!(normalize_path("/api/../admin").is_err());
        // dots inside a segment are fine
        assert_eq!(normalize_path("/files/a..b.pdf").unwrap(), "/files/a..b.pdf");
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"detail": "Not authenticated"}"#).as_deref(),
            Some("Not authenticated")
        );
        assert_eq!(
            extract_error_message(r#"{"error": "boom"}"#).as_deref(),
            Some("boom")
        );
        assert_eq!(
            extract_error_message("  upstream timeout ").as_deref(),
            Some("upstream timeout")
        );
        assert_eq!(extract_error_message("   "), None);
        assert_eq!(
            extract_error_message(&"x".repeat(500)).map(|m| m.len()),
            Some(MAX_ERROR_MESSAGE_LEN)
        );
    }

    #[tokio::test]
    async fn test_fetch_expense_summary() {
        let server = MockBackendServer::start().await;
        let client = client_for(&server);

        let auth = format!("Bearer {}", MOCK_TOKEN);
        let summary = client
            .fetch_expense_summary(2025, Some(&auth))
            .await
            .unwrap();

        assert_eq!(summary, MockBackendServer::sample_summary(2025));
    }

    #[tokio::test]
    async fn test_fetch_expense_summary_unauthorized() {
        let server = MockBackendServer::start().await;
        let client = client_for(&server);

        let err = client.fetch_expense_summary(2025, None).await.unwrap_err();
        match err {
            Error::Backend { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Not authenticated");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_expense_summary_unknown_year() {
        let server = MockBackendServer::start().await;
        let client = client_for(&server);

        let auth = format!("Bearer {}", MOCK_TOKEN);
        let err = client
            .fetch_expense_summary(1999, Some(&auth))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_health_check() {
        let mut server = MockBackendServer::start().await;
        let client = client_for(&server);
        assert!(client.health_check().await);

        server.stop();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let unreachable = BackendClient::new(&BackendConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert!(!unreachable.health_check().await);
    }

    #[tokio::test]
    async fn test_forward_relays_request() {
        let server = MockBackendServer::start().await;
        let client = client_for(&server);

        let response = client
            .forward(ForwardRequest {
                method: Method::POST,
                path: "echo/scadenziario".to_string(),
                query: Some("page=2".to_string()),
                authorization: Some("Bearer abc".to_string()),
                content_type: Some("application/json".to_string()),
                body: br#"{"amount": 10}"#.to_vec(),
            })
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type.as_deref(), Some("application/json"));
        let echoed: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(echoed["method"], "POST");
        assert_eq!(echoed["path"], "/echo/scadenziario");
        assert_eq!(echoed["query"], "page=2");
        assert_eq!(echoed["authorization"], "Bearer abc");
        assert_eq!(echoed["body"], r#"{"amount": 10}"#);
    }

    #[tokio::test]
    async fn test_forward_relays_error_status() {
        let server = MockBackendServer::start().await;
        let client = client_for(&server);

        let response = client
            .forward(ForwardRequest::get("/does-not-exist"))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
    }
}
