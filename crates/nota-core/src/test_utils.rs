//! Test utilities for nota-core
//!
//! This module provides testing infrastructure including a mock bookkeeping
//! backend that can be used for development and integration tests.

use axum::{
    body::Bytes,
    extract::{Json, Query},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use tokio::sync::oneshot;

use crate::models::{CategoryExpenses, ExpenseSummary, MonthlyBreakdown};

/// Bearer token the mock backend accepts
pub const MOCK_TOKEN: &str = "test-token";

/// Mock bookkeeping backend for testing and development
pub struct MockBackendServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockBackendServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/health", get(handle_health))
            .route("/api/reports/expenses/monthly", get(handle_expense_summary))
            .route("/echo/*rest", any(handle_echo));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// The expense summary served for any year from 2000 on
    ///
    /// One category per classifier outcome:
    /// - Utenze: 85/month all year (full year, 85.00)
    /// - Assicurazione auto: 2000 in March (occasional, 166.67)
    /// - Riscaldamento: 400/month Jan-Mar and Oct-Dec (seasonal, 200.00)
    /// - Manutenzione caldaia: 1500 in June and November (occasional, 250.00)
    /// - Cancelleria: 600 without monthly detail (fallback, 50.00)
    /// - Abbonamenti: nothing spent (no data)
    pub fn sample_summary(year: i32) -> ExpenseSummary {
        let with_months = |months: &[(u8, f64)]| {
            let mut breakdown = MonthlyBreakdown::new();
            for &(month, expense) in months {
                breakdown.set(month, expense).unwrap();
            }
            Some(breakdown)
        };

        ExpenseSummary {
            year,
            categories: vec![
                CategoryExpenses {
                    category: "Utenze".to_string(),
                    subject: Some("Enel".to_string()),
                    total_expense: 1020.0,
                    monthly_breakdown: Some(MonthlyBreakdown::from_monthly_amounts([85.0; 12])),
                },
                CategoryExpenses {
                    category: "Assicurazione auto".to_string(),
                    subject: None,
                    total_expense: 2000.0,
                    monthly_breakdown: with_months(&[(3, 2000.0)]),
                },
                CategoryExpenses {
                    category: "Riscaldamento".to_string(),
                    subject: None,
                    total_expense: 2400.0,
                    monthly_breakdown: with_months(&[
                        (1, 400.0),
                        (2, 400.0),
                        (3, 400.0),
                        (10, 400.0),
                        (11, 400.0),
                        (12, 400.0),
                    ]),
                },
                CategoryExpenses {
                    category: "Manutenzione caldaia".to_string(),
                    subject: None,
                    total_expense: 3000.0,
                    monthly_breakdown: with_months(&[(6, 1500.0), (11, 1500.0)]),
                },
                CategoryExpenses {
                    category: "Cancelleria".to_string(),
                    subject: None,
                    total_expense: 600.0,
                    monthly_breakdown: None,
                },
                CategoryExpenses {
                    category: "Abbonamenti".to_string(),
                    subject: None,
                    total_expense: 0.0,
                    monthly_breakdown: Some(MonthlyBreakdown::new()),
                },
            ],
        }
    }
}

impl Drop for MockBackendServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Health endpoint
async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    year: i32,
}

/// Monthly expense aggregation endpoint
async fn handle_expense_summary(headers: HeaderMap, Query(query): Query<SummaryQuery>) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| token == MOCK_TOKEN)
        .unwrap_or(false);

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "detail": "Not authenticated" })),
        )
            .into_response();
    }

    if query.year < 2000 {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "detail": format!("No data for year {}", query.year) })),
        )
            .into_response();
    }

    Json(MockBackendServer::sample_summary(query.year)).into_response()
}

/// Echo endpoint for passthrough tests
async fn handle_echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    Json(serde_json::json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "authorization": header_value(header::AUTHORIZATION),
        "content_type": header_value(header::CONTENT_TYPE),
        "body": String::from_utf8_lossy(&body),
    }))
    .into_response()
}
