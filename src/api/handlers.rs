//! HTTP request handlers for the attendance report API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregation::aggregate_attendance;
use crate::calculation::format_attendance_times;
use crate::error::ReportResult;
use crate::models::ReportRequest;
use crate::report::{ExportOutcome, ExportResult};

use super::request::AttendanceQuery;
use super::response::{ApiError, ApiErrorResponse, AttendancePreview};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/attendance", post(attendance_handler))
        .route("/export", post(export_handler))
        .with_state(state)
}

/// Handler for POST /attendance.
///
/// Returns the aggregated, normalized records the report would contain.
async fn attendance_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceQuery>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing attendance preview");

    let query = match payload {
        Ok(Json(query)) => query,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let start_time = Instant::now();
    match preview(&state, &query).await {
        Ok(preview) => {
            info!(
                correlation_id = %correlation_id,
                employees = preview.employees.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Attendance preview completed"
            );
            json_response(StatusCode::OK, &preview)
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Attendance preview failed");
            let api_error = ApiErrorResponse::from(err);
            json_response(api_error.status, &api_error.error)
        }
    }
}

async fn preview(state: &AppState, query: &AttendanceQuery) -> ReportResult<AttendancePreview> {
    let period = query.period()?;
    let records = aggregate_attendance(state.store(), &query.employee_ids, &period).await?;
    let normalized = format_attendance_times(&records)?;
    Ok(AttendancePreview::new(&period, &normalized))
}

/// Handler for POST /export.
///
/// Always answers with the `{success, file_path?, error?}` contract; the
/// status code reflects the kind of failure.
async fn export_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing export request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let config = state.config();
    let picker = config.destination_picker();
    let start_time = Instant::now();
    let result = config
        .exporter()
        .export(state.store(), &request, &picker)
        .await;

    match &result {
        Ok(ExportOutcome::Saved { file_path }) => {
            info!(
                correlation_id = %correlation_id,
                employees = request.employee_ids.len(),
                path = %file_path.display(),
                duration_us = start_time.elapsed().as_micros(),
                "Export completed successfully"
            );
            json_response(StatusCode::OK, &ExportResult::from(&result))
        }
        Ok(ExportOutcome::Cancelled) => {
            info!(correlation_id = %correlation_id, "Export cancelled");
            json_response(StatusCode::OK, &ExportResult::from(&result))
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Export failed");
            let status = ApiErrorResponse::from(err).status;
            json_response(status, &ExportResult::failed(err))
        }
    }
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Maps a JSON extraction failure to a 400 response.
fn rejection_response(rejection: JsonRejection, correlation_id: Uuid) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, &error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::aggregation::MemoryStore;
    use crate::config::{ConfigLoader, ReportConfig};
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn manifest_path(relative: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
    }

    fn create_test_state(output_dir: PathBuf) -> AppState {
        let config = ConfigLoader::from_config(ReportConfig {
            template: manifest_path("config/templates/attendance.yaml"),
            output_dir,
            file_name_pattern: "ChamCong_{start}_{end}".to_string(),
            listen: "127.0.0.1:0".to_string(),
            data: None,
        });
        let store = MemoryStore::load(manifest_path("config/demo_store.yaml"))
            .expect("Failed to load demo store");
        AppState::new(config, Arc::new(store))
    }

    fn post(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_preview_returns_normalized_records() {
        let dir = tempfile::tempdir().unwrap();
        let router = create_router(create_test_state(dir.path().to_path_buf()));

        let body = serde_json::json!({
            "employee_ids": [2, 1],
            "start_date": "2025-03-01",
            "end_date": "2025-03-31"
        });
        let response = router.oneshot(post("/attendance", body.to_string())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["business_days"], 21);
        assert_eq!(json["employees"][0]["employee_id"], 1);
        assert_eq!(json["employees"][1]["employee_id"], 2);
        assert_eq!(json["employees"][0]["days"][0]["display_start"], "08:15");
    }

    #[tokio::test]
    async fn test_preview_malformed_json_returns_400() {
        let dir = tempfile::tempdir().unwrap();
        let router = create_router(create_test_state(dir.path().to_path_buf()));

        let response = router
            .oneshot(post("/attendance", "{invalid json".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_preview_missing_field_returns_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let router = create_router(create_test_state(dir.path().to_path_buf()));

        let body = serde_json::json!({ "employee_ids": [1], "start_date": "2025-03-01" });
        let response = router.oneshot(post("/attendance", body.to_string())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_export_writes_into_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let router = create_router(create_test_state(dir.path().to_path_buf()));

        let body = serde_json::json!({
            "employee_ids": [1, 2, 3],
            "start_date": "2025-03-01",
            "end_date": "2025-03-31",
            "projects": [{ "id": 10, "name": "Alpha", "employee_ids": [1, 3] }]
        });
        let response = router.oneshot(post("/export", body.to_string())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let expected = dir.path().join("ChamCong_20250301_20250331.xlsx");
        assert_eq!(json["success"], true);
        assert_eq!(json["file_path"], expected.display().to_string());
        assert!(expected.exists());
    }

    #[tokio::test]
    async fn test_export_period_longer_than_template_returns_400() {
        let dir = tempfile::tempdir().unwrap();
        let router = create_router(create_test_state(dir.path().to_path_buf()));

        let body = serde_json::json!({
            "employee_ids": [1],
            "start_date": "2025-03-01",
            "end_date": "2025-04-15"
        });
        let response = router.oneshot(post("/export", body.to_string())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert!(json.get("file_path").is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
