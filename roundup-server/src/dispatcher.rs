//! Email dispatcher
//!
//! Sends one invitation through the email provider and, once the provider
//! has accepted it, marks the originating record as sent. The status patch
//! is best-effort: the email is already out and cannot be recalled, so a
//! patch failure is logged and the send still succeeds.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use roundup_common::tat::{reference_time, turnaround_minutes};
use roundup_common::template::InvitationEmail;
use roundup_common::{EmailStatus, StoredRecord};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::airtable::{AirtableClient, StoreCredentials};
use crate::email_log::{EmailLog, EmailLogEntry, SendStatus};
use crate::mailersend::{MailError, Mailbox, MailerSendClient, OutgoingEmail};

/// Table used for the status patch when the request names none
pub const DEFAULT_TABLE_NAME: &str = "Interviews";

/// One send request, as posted by the UI
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub candidate: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub html: String,
    pub record_id: Option<String>,
    pub airtable_table_name: Option<String>,
    pub airtable_base_id: Option<String>,
    pub airtable_token: Option<String>,
    pub mailersend_key: Option<String>,
    #[serde(default)]
    pub from_email: String,
    /// Store creation time of the record, used for TAT
    pub record_created_at: Option<String>,
    /// "Added On" value of the record, TAT fallback
    pub added_on: Option<String>,
    pub round_number: Option<u32>,
}

impl SendEmailRequest {
    /// Build a request for a stored record using the invitation template
    pub fn for_record(record: &StoredRecord, operator: &OperatorConfig) -> Self {
        let invitation = InvitationEmail::new(&record.fields);
        Self {
            to: record.fields.candidate_email.clone(),
            candidate: record.fields.candidate.clone(),
            subject: invitation.subject(),
            html: invitation.html(),
            record_id: Some(record.id.clone()),
            airtable_table_name: operator.airtable_table_name.clone(),
            airtable_base_id: operator.airtable_base_id.clone(),
            airtable_token: operator.airtable_token.clone(),
            mailersend_key: operator.mailersend_key.clone(),
            from_email: operator.from_email.clone(),
            record_created_at: record.created_time.clone(),
            added_on: Some(record.fields.added_on.clone()).filter(|s| !s.is_empty()),
            round_number: Some(record.fields.round_number),
        }
    }

    /// Store credentials for the status patch, when all are present
    fn patch_target(&self) -> Option<(StoreCredentials, String)> {
        let record_id = self
            .record_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())?
            .to_string();
        let table = self
            .airtable_table_name
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string());
        let creds = StoreCredentials::new(
            self.airtable_token.clone(),
            self.airtable_base_id.clone(),
            Some(table),
        )
        .ok()?;
        Some((creds, record_id))
    }
}

/// Operator settings sent along with bulk requests
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorConfig {
    pub airtable_table_name: Option<String>,
    pub airtable_base_id: Option<String>,
    pub airtable_token: Option<String>,
    pub mailersend_key: Option<String>,
    #[serde(default)]
    pub from_email: String,
}

/// Successful send
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendOutcome {
    pub success: bool,
    pub message: String,
    /// Turnaround minutes; `null` when no reference time was available
    pub tat: Option<f64>,
    pub response: Value,
}

/// Per-record result of a bulk send
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemResult {
    pub record_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated bulk send result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkReport {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<BulkItemResult>,
}

/// Sends invitations and records their outcome
#[derive(Debug, Clone)]
pub struct EmailDispatcher {
    store: AirtableClient,
    mailer: MailerSendClient,
    log: EmailLog,
    sender_name: String,
}

impl EmailDispatcher {
    pub fn new(
        store: AirtableClient,
        mailer: MailerSendClient,
        log: EmailLog,
        sender_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            mailer,
            log,
            sender_name: sender_name.into(),
        }
    }

    /// Send one email and mark its record as sent
    pub async fn dispatch(&self, request: &SendEmailRequest) -> Result<SendOutcome, MailError> {
        let api_key = request
            .mailersend_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(MailError::MissingKey)?;

        let email = OutgoingEmail::single(
            Mailbox {
                email: request.from_email.trim().to_string(),
                name: self.sender_name.clone(),
            },
            Mailbox {
                email: request.to.trim().to_string(),
                name: request.candidate.clone(),
            },
            request.subject.clone(),
            request.html.clone(),
        );

        debug!(
            record_id = request.record_id.as_deref().unwrap_or("-"),
            "Dispatching invitation email"
        );

        let receipt = match self.mailer.send(api_key, &email).await {
            Ok(receipt) => receipt,
            // Rejected locally, nothing was attempted
            Err(e @ (MailError::MissingKey | MailError::InvalidRequest(_))) => return Err(e),
            Err(e) => {
                self.log_attempt(request, Utc::now(), SendStatus::Failed, None, Some(e.to_string()))
                    .await;
                return Err(e);
            }
        };

        let sent_at = Utc::now();
        let patch_target = request.patch_target();
        let tat = self.compute_tat(request, patch_target.as_ref(), sent_at).await;

        if let Some((creds, record_id)) = &patch_target {
            self.mark_sent(creds, record_id, sent_at, tat).await;
        }

        self.log_attempt(request, sent_at, SendStatus::Sent, tat, None)
            .await;

        info!(
            record_id = request.record_id.as_deref().unwrap_or("-"),
            tat_minutes = tat,
            "Invitation email sent"
        );

        let response = match receipt.message_id {
            Some(id) if receipt.body.is_null() => json!({ "messageId": id }),
            _ => receipt.body,
        };

        Ok(SendOutcome {
            success: true,
            message: "Email sent successfully".to_string(),
            tat,
            response,
        })
    }

    /// Send one email per record concurrently and collect every outcome
    ///
    /// Records already marked sent are reported as failures without a send.
    pub async fn dispatch_many(
        &self,
        records: &[StoredRecord],
        operator: &OperatorConfig,
    ) -> BulkReport {
        let sends = records.iter().map(|record| async move {
            if record.fields.email_status == EmailStatus::Sent {
                return BulkItemResult {
                    record_id: record.id.clone(),
                    success: false,
                    tat: None,
                    error: Some("Email already sent".to_string()),
                };
            }

            let request = SendEmailRequest::for_record(record, operator);
            match self.dispatch(&request).await {
                Ok(outcome) => BulkItemResult {
                    record_id: record.id.clone(),
                    success: true,
                    tat: outcome.tat,
                    error: None,
                },
                Err(e) => BulkItemResult {
                    record_id: record.id.clone(),
                    success: false,
                    tat: None,
                    error: Some(e.to_string()),
                },
            }
        });

        let results = join_all(sends).await;
        let sent = results.iter().filter(|r| r.success).count();

        info!(
            total = results.len(),
            sent = sent,
            failed = results.len() - sent,
            "Bulk send finished"
        );

        BulkReport {
            total: results.len(),
            sent,
            failed: results.len() - sent,
            results,
        }
    }

    /// Elapsed minutes since the record was created (or added)
    ///
    /// Falls back to reading the record from the store when the request
    /// carries no reference time.
    async fn compute_tat(
        &self,
        request: &SendEmailRequest,
        patch_target: Option<&(StoreCredentials, String)>,
        sent_at: DateTime<Utc>,
    ) -> Option<f64> {
        let mut reference = reference_time(
            request.record_created_at.as_deref(),
            request.added_on.as_deref(),
        );

        if reference.is_none() {
            if let Some((creds, record_id)) = patch_target {
                match self.store.get_record(creds, record_id).await {
                    Ok(record) => {
                        reference = reference_time(
                            record.created_time.as_deref(),
                            Some(record.fields.added_on.as_str()),
                        );
                    }
                    Err(e) => {
                        warn!(record_id = %record_id, error = %e, "Could not read record for TAT");
                    }
                }
            }
        }

        reference.map(|reference| turnaround_minutes(reference, sent_at))
    }

    /// Best-effort status patch after a successful send
    async fn mark_sent(
        &self,
        creds: &StoreCredentials,
        record_id: &str,
        sent_at: DateTime<Utc>,
        tat: Option<f64>,
    ) {
        let mut fields = Map::new();
        fields.insert("Email Status".to_string(), json!(EmailStatus::Sent.as_str()));
        fields.insert("Email Sent At".to_string(), json!(sent_at.to_rfc3339()));
        if let Some(tat) = tat {
            fields.insert("TAT Minutes".to_string(), json!(tat));
        }

        if let Err(e) = self
            .store
            .patch_record(creds, record_id, Value::Object(fields))
            .await
        {
            warn!(record_id = record_id, error = %e, "Record store update failed after send");
        }
    }

    async fn log_attempt(
        &self,
        request: &SendEmailRequest,
        at: DateTime<Utc>,
        status: SendStatus,
        tat: Option<f64>,
        error: Option<String>,
    ) {
        self.log
            .record(EmailLogEntry {
                id: Uuid::new_v4(),
                candidate_email: request.to.clone(),
                candidate_name: request.candidate.clone(),
                round_number: request.round_number,
                record_id: request.record_id.clone(),
                sent_at: at,
                status,
                tat_minutes: tat,
                error,
            })
            .await;
    }
}
