use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};

use super::domain::RecordId;
use super::ingest::{ingest, RawRecord};
use super::repository::{ObservationRepository, RecordFilter, RepositoryError};
use super::service::{ObservationService, ServiceError};

/// Router builder exposing HTTP endpoints for the observation log.
pub fn observation_router<R>(service: Arc<ObservationService<R>>) -> Router
where
    R: ObservationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/observations",
            get(list_handler::<R>).post(submit_handler::<R>),
        )
        .route("/api/v1/observations/score", post(score_handler::<R>))
        .route(
            "/api/v1/observations/:id",
            put(update_handler::<R>).delete(delete_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<ObservationService<R>>>,
    Query(filter): Query<RecordFilter>,
) -> Response
where
    R: ObservationRepository + 'static,
{
    match service.list(&filter) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<ObservationService<R>>>,
    axum::Json(body): axum::Json<Value>,
) -> Response
where
    R: ObservationRepository + 'static,
{
    let raw = match raw_from_body(body) {
        Ok(raw) => raw,
        Err(response) => return response,
    };
    match service.submit_raw(&raw) {
        Ok(stored) => (StatusCode::CREATED, axum::Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn score_handler<R>(
    State(service): State<Arc<ObservationService<R>>>,
    axum::Json(body): axum::Json<Value>,
) -> Response
where
    R: ObservationRepository + 'static,
{
    match raw_from_body(body) {
        Ok(raw) => {
            let card = service.preview(&ingest(&raw));
            (StatusCode::OK, axum::Json(card)).into_response()
        }
        Err(response) => response,
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<ObservationService<R>>>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<Value>,
) -> Response
where
    R: ObservationRepository + 'static,
{
    let raw = match raw_from_body(body) {
        Ok(raw) => raw,
        Err(response) => return response,
    };
    match service.update_raw(&RecordId(id), &raw) {
        Ok(stored) => (StatusCode::OK, axum::Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<ObservationService<R>>>,
    Path(id): Path<String>,
) -> Response
where
    R: ObservationRepository + 'static,
{
    match service.delete(&RecordId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

fn raw_from_body(body: Value) -> Result<RawRecord, Response> {
    match body {
        Value::Object(map) => Ok(RawRecord::from_json_map(&map)),
        _ => {
            let payload = json!({
                "error": "request body must be a JSON object keyed by column name",
            });
            Err((StatusCode::BAD_REQUEST, axum::Json(payload)).into_response())
        }
    }
}

pub(crate) fn error_response(error: ServiceError) -> Response {
    let (status, payload) = match &error {
        ServiceError::Validation(report) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "error": error.to_string(),
                "violations": report.violations,
                "messages": report.messages(),
            }),
        ),
        ServiceError::Repository(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, json!({ "error": error.to_string() }))
        }
        ServiceError::Repository(RepositoryError::Forbidden) => {
            (StatusCode::FORBIDDEN, json!({ "error": error.to_string() }))
        }
        ServiceError::Repository(RepositoryError::Storage(_)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": error.to_string() }),
        ),
    };
    (status, axum::Json(payload)).into_response()
}
