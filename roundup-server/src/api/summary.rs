//! Dashboard summary endpoint

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use roundup_common::stats::{companies, compute_stats, RecordFilter, RecordStats};
use roundup_common::StoredRecord;
use serde::{Deserialize, Serialize};

use crate::airtable::StoreCredentials;
use crate::{ApiResult, AppState};

/// Credentials plus optional filters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub token: Option<String>,
    pub base_id: Option<String>,
    pub table_id: Option<String>,
    pub company: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Computed over the whole table, filters ignored
    pub stats: RecordStats,
    pub companies: Vec<String>,
    /// Filtered records
    pub records: Vec<StoredRecord>,
}

/// GET /api/records/summary
pub async fn records_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<SummaryResponse>> {
    let creds = StoreCredentials::new(query.token, query.base_id, query.table_id)?;
    let all = state.store.list_interview_records(&creds).await?;

    let filter = RecordFilter {
        company: query.company,
        status: query.status,
    };

    Ok(Json(SummaryResponse {
        stats: compute_stats(&all),
        companies: companies(&all),
        records: filter.apply(&all),
    }))
}

pub fn summary_routes() -> Router<AppState> {
    Router::new().route("/api/records/summary", get(records_summary))
}
