//! Expense pattern handlers

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::HeaderMap,
    Json,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{get_authorization, get_user_email, AppError, AppState};
use nota_core::{
    summarize, AveragesReport, ClassificationResult, ClassifyOptions, Method, MonthlyBreakdown,
};

/// Oldest year the averages endpoint accepts
const MIN_YEAR: i32 = 2000;
/// Latest year the averages endpoint accepts
const MAX_YEAR: i32 = 2100;

/// Request body for classifying a single expense pattern
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    /// Annual total; missing counts as no data
    #[serde(default)]
    pub total_expense: Option<f64>,
    #[serde(default)]
    pub monthly_breakdown: Option<MonthlyBreakdown>,
    #[serde(default)]
    pub forced_method: Option<Method>,
}

/// Classification plus its display string
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    #[serde(flatten)]
    pub result: ClassificationResult,
    pub formatted_average: String,
}

/// POST /api/expenses/classify - Classify one annual expense pattern
pub async fn classify_expense(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<ClassifyResponse>, AppError> {
    let Json(req) = payload.map_err(|rejection| AppError::bad_request(&rejection.body_text()))?;

    let options = ClassifyOptions {
        forced_method: req.forced_method,
    };
    let result = state.classifier.classify(
        req.total_expense.unwrap_or(0.0),
        req.monthly_breakdown.as_ref(),
        &options,
    );
    debug!(method = %result.method, average = result.average, "Classified expense pattern");

    let formatted_average = state.currency.format(result.average);
    Ok(Json(ClassifyResponse {
        result,
        formatted_average,
    }))
}

/// Query parameters for the averages report
#[derive(Debug, Deserialize)]
pub struct AveragesQuery {
    /// Analyzed year (defaults to the current year)
    pub year: Option<i32>,
    /// Force one averaging method for every category
    pub method: Option<String>,
}

/// GET /api/expenses/averages - Monthly averages for every category of a year
///
/// Fetches the year's aggregates from the backend (forwarding the caller's
/// credentials) and classifies each category.
pub async fn expense_averages(
    State(state): State<Arc<AppState>>,
    params: Result<Query<AveragesQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Json<AveragesReport>, AppError> {
    let Query(params) =
        params.map_err(|rejection| AppError::bad_request(&rejection.body_text()))?;
    let year = params.year.unwrap_or_else(|| Utc::now().year());
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(AppError::bad_request(&format!(
            "Year must be between {} and {}",
            MIN_YEAR, MAX_YEAR
        )));
    }

    let forced_method = params
        .method
        .as_deref()
        .map(str::parse::<Method>)
        .transpose()
        .map_err(|e| AppError::bad_request(&e))?;

    let authorization = get_authorization(&headers);
    let summary = state
        .expenses
        .fetch_expense_summary(year, authorization.as_deref())
        .await
        .map_err(AppError::from_backend)?;

    let mut report = summarize(
        &summary,
        &state.classifier,
        &ClassifyOptions { forced_method },
    );
    report.format_amounts(&state.currency);

    info!(
        user = %get_user_email(&headers),
        year,
        categories = report.categories.len(),
        "Built expense averages"
    );

    Ok(Json(report))
}
