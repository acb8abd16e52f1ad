//! HTTP surface for the student records service.
//!
//! - `GET /students` – List every stored student.
//! - `POST /students` – Create one student (JSON object) or many (JSON array).
//! - `PUT /students` – Bulk update; each element carries its own `id`.
//! - `DELETE /students?ids=1,2,3` – Bulk delete; returns `{ "deleted": [...] }`. Only the first
//!   `ids` value is read.
//! - `GET|PUT|DELETE /students/{id}` – Single-record read, full replace, and delete.
//! - `GET /students/{id}/summary` – Generate a free-text summary via the text-generation service.
//!
//! Bulk endpoints drop invalid, duplicate, or absent items silently and return only the items
//! that were applied. Any other method on these paths answers `405 Method not allowed`.

use crate::store::{RecordStore, StoreError, Student, StudentId, parse_id_list};
use crate::summarization::{SummaryError, SummaryGateway};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Record store owning all students.
    pub store: Arc<RecordStore>,
    /// Summary gateway backed by the same store.
    pub gateway: Arc<SummaryGateway>,
}

impl AppState {
    /// Bundle a store and the gateway built over it.
    pub fn new(store: Arc<RecordStore>, gateway: Arc<SummaryGateway>) -> Self {
        Self { store, gateway }
    }
}

/// Build the HTTP router exposing the student API surface.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/students",
            get(list_students)
                .post(create_students)
                .put(update_students)
                .delete(delete_students)
                .fallback(method_not_allowed),
        )
        .route("/students/", any(student_id_missing))
        .route(
            "/students/:id",
            get(get_student)
                .put(update_student)
                .delete(delete_student)
                .fallback(method_not_allowed),
        )
        .route(
            "/students/:id/summary",
            get(summarize_student).fallback(method_not_allowed),
        )
        .with_state(state)
}

/// Body accepted by `POST /students`, chosen by the JSON shape of the payload.
#[derive(Debug, PartialEq)]
enum StudentPayload {
    One(Student),
    Many(Vec<Student>),
}

impl StudentPayload {
    fn from_slice(body: &[u8]) -> Result<Self, ApiError> {
        match serde_json::from_slice::<Value>(body).map_err(|_| ApiError::MalformedRequest)? {
            value @ Value::Array(_) => decode(value).map(Self::Many),
            value @ Value::Object(_) => decode(value).map(Self::One),
            _ => Err(ApiError::MalformedRequest),
        }
    }
}

/// Response of `POST /students`, mirroring the request shape.
#[derive(Serialize)]
#[serde(untagged)]
enum Created {
    One(Student),
    Many(Vec<Student>),
}

/// Response body for `DELETE /students`.
#[derive(Serialize)]
struct DeletedResponse {
    deleted: Vec<StudentId>,
}

/// Response body for `DELETE /students/{id}`.
#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// Response body for `GET /students/{id}/summary`.
#[derive(Serialize)]
struct SummaryResponse {
    summary: String,
}

async fn list_students(State(state): State<AppState>) -> Json<Vec<Student>> {
    Json(state.store.get_all())
}

/// Create one student or many, depending on whether the body is an object or an array.
async fn create_students(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Created>, ApiError> {
    match StudentPayload::from_slice(&body)? {
        StudentPayload::One(student) => {
            let created = state.store.create(student)?;
            tracing::info!(student_id = created.id, "Student created");
            Ok(Json(Created::One(created)))
        }
        StudentPayload::Many(students) => {
            let requested = students.len();
            let created = state.store.create_bulk(students);
            tracing::info!(requested, created = created.len(), "Bulk create completed");
            Ok(Json(Created::Many(created)))
        }
    }
}

async fn update_students(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<Student>>, ApiError> {
    let students: Vec<Student> = decode_slice(&body)?;
    let requested = students.len();
    let updated = state.store.update_bulk(students);
    tracing::info!(requested, updated = updated.len(), "Bulk update completed");
    Ok(Json(updated))
}

async fn delete_students(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let raw = first_query_value(&pairs, "ids")
        .filter(|ids| !ids.is_empty())
        .ok_or(ApiError::MissingIds)?;
    let deleted = state.store.delete_bulk(&parse_id_list(raw));
    tracing::info!(deleted = ?deleted, "Bulk delete completed");
    Ok(Json(DeletedResponse { deleted }))
}

async fn get_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Student>, ApiError> {
    let id = parse_path_id(&raw_id)?;
    Ok(Json(state.store.get(id)?))
}

/// Replace a student in full; the path id overrides any id in the body.
async fn update_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Student>, ApiError> {
    let id = parse_path_id(&raw_id)?;
    if !state.store.contains(id) {
        return Err(StoreError::NotFound(id).into());
    }
    let student: Student = decode_slice(&body)?;
    let updated = state.store.update(id, student)?;
    tracing::info!(student_id = id, "Student updated");
    Ok(Json(updated))
}

async fn delete_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_path_id(&raw_id)?;
    state.store.delete(id)?;
    tracing::info!(student_id = id, "Student deleted");
    Ok(Json(MessageResponse {
        message: "Student deleted",
    }))
}

async fn summarize_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let id = parse_path_id(&raw_id)?;
    let summary = state.gateway.summarize(id).await?;
    Ok(Json(SummaryResponse { summary }))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn student_id_missing() -> ApiError {
    ApiError::MissingId
}

/// First value for `key`; later repetitions of the key are ignored.
fn first_query_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

fn parse_path_id(raw: &str) -> Result<StudentId, ApiError> {
    raw.parse().map_err(|_| ApiError::InvalidId)
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|_| ApiError::MalformedRequest)
}

fn decode_slice<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::MalformedRequest)
}

/// Request failures and their HTTP rendering.
#[derive(Debug)]
enum ApiError {
    Store(StoreError),
    Summary(SummaryError),
    MalformedRequest,
    InvalidId,
    MissingId,
    MissingIds,
    MethodNotAllowed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Store(error) => store_error_response(&error),
            Self::Summary(error) => summary_error_response(error),
            Self::MalformedRequest => (StatusCode::BAD_REQUEST, "Invalid request".to_string()),
            Self::InvalidId => (StatusCode::BAD_REQUEST, "Invalid ID".to_string()),
            Self::MissingId => (StatusCode::BAD_REQUEST, "Student ID missing".to_string()),
            Self::MissingIds => (StatusCode::BAD_REQUEST, "No ids provided".to_string()),
            Self::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_string(),
            ),
        };
        (status, message).into_response()
    }
}

/// Map summary failures to a generic 500 body; transport detail is only logged.
fn summary_error_response(error: SummaryError) -> (StatusCode, String) {
    let message = match &error {
        SummaryError::Store(inner) => return store_error_response(inner),
        SummaryError::GatewayUnreachable(_) => "Failed to contact summary service",
        SummaryError::MalformedResponse(_) => "Invalid response from summary service",
        SummaryError::MissingContent => "Missing summary content",
    };
    tracing::warn!(%error, "Summary generation failed");
    (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
}

fn store_error_response(error: &StoreError) -> (StatusCode, String) {
    let status = match error {
        StoreError::InvalidData { reason } => {
            tracing::debug!(reason, "Rejected student payload");
            StatusCode::BAD_REQUEST
        }
        StoreError::DuplicateId(_) => StatusCode::BAD_REQUEST,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
    };
    (status, error.to_string())
}

impl From<StoreError> for ApiError {
    fn from(inner: StoreError) -> Self {
        Self::Store(inner)
    }
}

impl From<SummaryError> for ApiError {
    fn from(inner: SummaryError) -> Self {
        Self::Summary(inner)
    }
}
