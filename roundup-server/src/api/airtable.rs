//! Record store passthrough endpoints
//!
//! GET  /api/airtable/test     - validate token and table
//! GET  /api/airtable/records  - list every record
//! POST /api/airtable/records  - create up to 10 records

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::airtable::StoreCredentials;
use crate::{ApiResult, AppState};

/// Credentials passed as query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreQuery {
    pub token: Option<String>,
    pub base_id: Option<String>,
    pub table_id: Option<String>,
}

impl StoreQuery {
    pub fn credentials(self) -> ApiResult<StoreCredentials> {
        Ok(StoreCredentials::new(self.token, self.base_id, self.table_id)?)
    }
}

/// POST /api/airtable/records body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordsRequest {
    pub base_id: Option<String>,
    pub table_id: Option<String>,
    pub token: Option<String>,
    #[serde(default)]
    pub records: Vec<Value>,
}

/// GET /api/airtable/test
///
/// **Response:** `{"success": true}`, or `{"error": ".."}` with the upstream status
pub async fn test_connection(
    State(state): State<AppState>,
    Query(query): Query<StoreQuery>,
) -> ApiResult<Json<Value>> {
    let creds = query.credentials()?;
    state.store.test_connection(&creds).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/airtable/records
///
/// Returns the store's list payload, all pages merged.
pub async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<StoreQuery>,
) -> ApiResult<Json<Value>> {
    let creds = query.credentials()?;
    Ok(Json(state.store.list_records(&creds).await?))
}

/// POST /api/airtable/records
///
/// Records must already be wrapped as `{fields: {...}}`; at most 10.
pub async fn create_records(
    State(state): State<AppState>,
    Json(payload): Json<CreateRecordsRequest>,
) -> ApiResult<Json<Value>> {
    let creds = StoreCredentials::new(payload.token, payload.base_id, payload.table_id)?;
    Ok(Json(state.store.create_raw(&creds, payload.records).await?))
}

/// Build record store routes
pub fn airtable_routes() -> Router<AppState> {
    Router::new()
        .route("/api/airtable/test", get(test_connection))
        .route("/api/airtable/records", get(list_records).post(create_records))
}
