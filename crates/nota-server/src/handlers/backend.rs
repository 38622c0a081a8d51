//! Backend passthrough handler

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{OriginalUri, Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{get_authorization, AppError, AppState, BACKEND_ROUTE_PREFIX, MAX_FORWARD_BODY_SIZE};
use nota_core::ForwardRequest;

/// ANY /api/backend/*path - Relay a request to the bookkeeping backend
///
/// Method, raw (still percent-encoded) path, query string, `Authorization`,
/// `Content-Type` and body are passed through; the backend's status, content
/// type and body come back unchanged.
pub async fn forward_to_backend(
    State(state): State<Arc<AppState>>,
    OriginalUri(original_uri): OriginalUri,
    Path(decoded_path): Path<String>,
    request: Request,
) -> Result<Response, AppError> {
    if has_parent_segment(&decoded_path) {
        return Err(AppError::bad_request("Backend path may not contain '..'"));
    }
    let path = original_uri
        .path()
        .strip_prefix(BACKEND_ROUTE_PREFIX)
        .map(str::to_string)
        .ok_or_else(|| AppError::bad_request("Invalid backend path"))?;

    let method = request.method().clone();
    let query = request.uri().query().map(str::to_string);
    let authorization = get_authorization(request.headers());
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = axum::body::to_bytes(request.into_body(), MAX_FORWARD_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Request body too large"))?;

    let forwarded = state
        .backend
        .forward(ForwardRequest {
            method,
            path,
            query,
            authorization,
            content_type,
            body: body.to_vec(),
        })
        .await
        .map_err(AppError::from_backend)?;

    let status = StatusCode::from_u16(forwarded.status)
        .map_err(|_| AppError::bad_gateway("Backend returned an invalid status code"))?;

    let mut response = (status, Body::from(forwarded.body)).into_response();
    if let Some(value) = forwarded
        .content_type
        .as_deref()
        .and_then(|ct| ct.parse().ok())
    {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }

    Ok(response)
}

/// Whether any `/`-separated segment is `..`
fn has_parent_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment == "..")
}
