//! Email endpoints
//!
//! POST /api/send-email    - send one invitation
//! POST /api/send-emails   - send invitations for several records
//! POST /api/email/preview - render an invitation without sending
//! GET  /api/email-logs    - recent send attempts

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use roundup_common::template::{EmailPreview, InvitationEmail};
use roundup_common::{InterviewRecord, StoredRecord};
use serde::Deserialize;

use crate::dispatcher::{BulkReport, OperatorConfig, SendEmailRequest, SendOutcome};
use crate::email_log::EmailLogEntry;
use crate::{ApiError, ApiResult, AppState};

/// POST /api/send-emails body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSendRequest {
    #[serde(default)]
    pub records: Vec<StoredRecord>,
    #[serde(flatten)]
    pub operator: OperatorConfig,
}

/// POST /api/email/preview body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub record: InterviewRecord,
    #[serde(default)]
    pub from_email: String,
}

/// POST /api/send-email
///
/// **Response:** `{success, message, tat, response}`; on failure
/// `{error, details}` with the provider status, or 400
/// `{error: "MailerSend key not configured"}`.
pub async fn send_email(
    State(state): State<AppState>,
    Json(request): Json<SendEmailRequest>,
) -> ApiResult<Json<SendOutcome>> {
    Ok(Json(state.dispatcher.dispatch(&request).await?))
}

/// POST /api/send-emails
///
/// One independent send per record; partial success is normal and each
/// record's outcome is reported.
pub async fn send_emails(
    State(state): State<AppState>,
    Json(request): Json<BulkSendRequest>,
) -> ApiResult<Json<BulkReport>> {
    if request.records.is_empty() {
        return Err(ApiError::BadRequest("Select at least one record".to_string()));
    }
    let report = state
        .dispatcher
        .dispatch_many(&request.records, &request.operator)
        .await;
    Ok(Json(report))
}

/// POST /api/email/preview
pub async fn preview_email(Json(request): Json<PreviewRequest>) -> Json<EmailPreview> {
    Json(InvitationEmail::new(&request.record).preview(&request.from_email))
}

/// GET /api/email-logs
pub async fn email_logs(State(state): State<AppState>) -> Json<Vec<EmailLogEntry>> {
    Json(state.email_log.entries().await)
}

/// Build email routes
pub fn email_routes() -> Router<AppState> {
    Router::new()
        .route("/api/send-email", post(send_email))
        .route("/api/send-emails", post(send_emails))
        .route("/api/email/preview", post(preview_email))
        .route("/api/email-logs", get(email_logs))
}
