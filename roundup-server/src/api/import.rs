//! CSV import endpoints
//!
//! POST /api/import/preview - expand CSV into records without storing them
//! POST /api/import         - expand CSV and create every record in the store

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use roundup_common::csv_import::import_records;
use roundup_common::InterviewRecord;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::airtable::StoreCredentials;
use crate::error::status_from_u16;
use crate::import::submit_records;
use crate::{ApiError, ApiResult, AppState};

/// POST /api/import/preview body
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub csv: String,
}

/// Expanded records
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub total: usize,
    pub records: Vec<InterviewRecord>,
}

/// POST /api/import body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub base_id: Option<String>,
    pub table_id: Option<String>,
    pub token: Option<String>,
    #[serde(default)]
    pub csv: String,
}

/// POST /api/import/preview
pub async fn preview_import(Json(payload): Json<PreviewRequest>) -> Json<PreviewResponse> {
    let records = import_records(&payload.csv);
    Json(PreviewResponse {
        total: records.len(),
        records,
    })
}

/// POST /api/import
///
/// **Response:** `{success, total_records, created_records, error?, batches}`.
/// 200 when every batch was created; otherwise the first failed batch's
/// upstream status, with per-batch outcomes in the body.
pub async fn import_csv(
    State(state): State<AppState>,
    Json(payload): Json<ImportRequest>,
) -> ApiResult<Response> {
    let creds = StoreCredentials::new(payload.token, payload.base_id, payload.table_id)?;

    let records = import_records(&payload.csv);
    if records.is_empty() {
        return Err(ApiError::BadRequest("CSV contains no data rows".to_string()));
    }

    info!(records = records.len(), "Importing CSV");
    let report = submit_records(&state.store, &creds, &records).await;

    let status = report
        .first_failure_status()
        .map(status_from_u16)
        .unwrap_or(StatusCode::OK);

    Ok((status, Json(report)).into_response())
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/api/import/preview", post(preview_import))
        .route("/api/import", post(import_csv))
}
