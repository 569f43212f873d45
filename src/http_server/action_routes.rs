//! Action HTTP Routes
//!
//! `POST /actions/{feature}` accepts a url-encoded form or a JSON object
//! and answers with the dispatch outcome. `GET /actions/{feature}/schema`
//! describes the fields the feature expects.

use std::sync::Arc;

use axum::{
    extract::{FromRequest, Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::features::{FeatureName, Features};
use crate::schema::RawInput;

/// Action routes over a shared feature registry
pub fn action_routes(features: Arc<Features>) -> Router {
    Router::new()
        .route("/:feature", post(action_handler))
        .route("/:feature/schema", get(schema_handler))
        .with_state(features)
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    let body = ErrorResponse {
        error: error.into(),
        code: status.as_u16(),
    };
    (status, Json(body)).into_response()
}

fn unknown_feature(name: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("Unknown action '{}'", name))
}

async fn action_handler(
    State(features): State<Arc<Features>>,
    Path(name): Path<String>,
    request: Request,
) -> Response {
    let Some(feature) = FeatureName::parse(&name) else {
        return unknown_feature(&name);
    };

    let raw = match read_input(request).await {
        Ok(raw) => raw,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let (status, body) = features.dispatch_json(feature, &raw).await;
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

async fn schema_handler(
    State(features): State<Arc<Features>>,
    Path(name): Path<String>,
) -> Response {
    match FeatureName::parse(&name) {
        Some(feature) => (StatusCode::OK, Json(features.schema(feature))).into_response(),
        None => unknown_feature(&name),
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

async fn read_input(request: Request) -> Result<RawInput, String> {
    if is_json(request.headers()) {
        let Json(value) = Json::<Value>::from_request(request, &())
            .await
            .map_err(|r| r.body_text())?;
        RawInput::from_json(value).ok_or_else(|| "Expected a JSON object".to_string())
    } else {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(request, &())
            .await
            .map_err(|r| r.body_text())?;
        Ok(RawInput::from_pairs(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_is_json() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        assert!(is_json(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        assert!(!is_json(&headers));
    }

    #[test]
    fn test_error_response_serialization() {
        let body = ErrorResponse {
            error: "Unknown action 'admin'".to_string(),
            code: 404,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], 404);
    }
}
