//! Record store (Airtable) client
//!
//! Thin request/response passthrough to the store's REST API. The client
//! holds no credentials: every call takes a [`StoreCredentials`] supplied by
//! the operator with the request. Upstream failures keep their status code
//! and message; nothing is retried.

use reqwest::{RequestBuilder, Url};
use roundup_common::{InterviewRecord, StoredRecord};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The store rejects create requests with more records than this
pub const MAX_RECORDS_PER_REQUEST: usize = 10;

/// Upper bound on list pages (100 records each) followed in one listing
pub const MAX_LIST_PAGES: usize = 1000;

/// Record store client errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing {0}")]
    MissingCredential(&'static str),

    #[error("Too many records in one request: {0} (max 10)")]
    TooManyRecords(usize),

    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Pagination error: {0}")]
    Pagination(String),
}

impl StoreError {
    /// HTTP status to report to the caller
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::MissingCredential(_) | StoreError::TooManyRecords(_) => 400,
            StoreError::Upstream { status, .. } => *status,
            StoreError::InvalidUrl(_) => 500,
            StoreError::Network(_) | StoreError::Parse(_) | StoreError::Pagination(_) => 502,
        }
    }
}

/// Operator-supplied access to one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCredentials {
    pub token: String,
    pub base_id: String,
    pub table_id: String,
}

impl StoreCredentials {
    /// Build credentials, rejecting blank values
    pub fn new(
        token: Option<String>,
        base_id: Option<String>,
        table_id: Option<String>,
    ) -> Result<Self, StoreError> {
        fn required(value: Option<String>, name: &'static str) -> Result<String, StoreError> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(StoreError::MissingCredential(name))
        }

        Ok(Self {
            token: required(token, "token")?,
            base_id: required(base_id, "baseId")?,
            table_id: required(table_id, "tableId")?,
        })
    }
}

/// One page of a list response
#[derive(Debug, Deserialize)]
struct ListPage {
    #[serde(default)]
    records: Vec<Value>,
    offset: Option<String>,
}

/// Record store API client
#[derive(Debug, Clone)]
pub struct AirtableClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl AirtableClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(base_url.to_string()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// `{base_url}/{base_id}/{table_id}[/{record_id}]`, each segment escaped
    fn table_url(&self, creds: &StoreCredentials, record_id: Option<&str>) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.push(&creds.base_id);
            segments.push(&creds.table_id);
            if let Some(id) = record_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Read at most one record to validate reachability and token
    pub async fn test_connection(&self, creds: &StoreCredentials) -> Result<(), StoreError> {
        let url = self.table_url(creds, None)?;
        info!(base_id = %creds.base_id, table_id = %creds.table_id, "Testing record store connection");

        self.send(self.http_client.get(url).query(&[("maxRecords", "1")]), creds)
            .await?;
        Ok(())
    }

    /// Read every record in the table, following pagination
    ///
    /// Returns the store's list payload with all pages merged into a single
    /// `records` array.
    pub async fn list_records(&self, creds: &StoreCredentials) -> Result<Value, StoreError> {
        let url = self.table_url(creds, None)?;
        info!(base_id = %creds.base_id, table_id = %creds.table_id, "Listing records");

        let mut records = Vec::new();
        let mut offset: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut request = self.http_client.get(url.clone());
            if let Some(offset) = &offset {
                request = request.query(&[("offset", offset.as_str())]);
            }

            let body = self.send(request, creds).await?;
            let page: ListPage =
                serde_json::from_value(body).map_err(|e| StoreError::Parse(e.to_string()))?;
            pages += 1;
            records.extend(page.records);

            let next = match page.offset {
                Some(next) if !next.is_empty() => next,
                _ => break,
            };
            if offset.as_deref() == Some(next.as_str()) {
                return Err(StoreError::Pagination(format!(
                    "store repeated offset '{}'",
                    next
                )));
            }
            if pages >= MAX_LIST_PAGES {
                return Err(StoreError::Pagination(format!(
                    "more than {} pages",
                    MAX_LIST_PAGES
                )));
            }
            offset = Some(next);
        }

        debug!(pages = pages, records = records.len(), "Listed records");
        Ok(json!({ "records": records }))
    }

    /// Read every record and decode it as an interview record
    ///
    /// Records whose fields cannot be decoded are skipped with a warning.
    pub async fn list_interview_records(
        &self,
        creds: &StoreCredentials,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        let payload = self.list_records(creds).await?;
        let raw = match payload.get("records") {
            Some(Value::Array(records)) => records.clone(),
            _ => Vec::new(),
        };

        Ok(raw
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<StoredRecord>(record) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "Skipping record with undecodable fields");
                    None
                }
            })
            .collect())
    }

    /// Read one record by id
    pub async fn get_record(
        &self,
        creds: &StoreCredentials,
        record_id: &str,
    ) -> Result<StoredRecord, StoreError> {
        let url = self.table_url(creds, Some(record_id))?;
        let body = self.send(self.http_client.get(url), creds).await?;
        serde_json::from_value(body).map_err(|e| StoreError::Parse(e.to_string()))
    }

    /// Create records already wrapped as `{fields: {...}}`
    pub async fn create_raw(
        &self,
        creds: &StoreCredentials,
        records: Vec<Value>,
    ) -> Result<Value, StoreError> {
        if records.len() > MAX_RECORDS_PER_REQUEST {
            return Err(StoreError::TooManyRecords(records.len()));
        }

        let url = self.table_url(creds, None)?;
        info!(
            base_id = %creds.base_id,
            table_id = %creds.table_id,
            count = records.len(),
            "Creating records"
        );

        self.send(
            self.http_client.post(url).json(&json!({ "records": records })),
            creds,
        )
        .await
    }

    /// Create interview records (at most [`MAX_RECORDS_PER_REQUEST`])
    pub async fn create_records(
        &self,
        creds: &StoreCredentials,
        records: &[InterviewRecord],
    ) -> Result<Value, StoreError> {
        let wrapped = records
            .iter()
            .map(|record| json!({ "fields": record }))
            .collect();
        self.create_raw(creds, wrapped).await
    }

    /// Update named fields of one record
    pub async fn patch_record(
        &self,
        creds: &StoreCredentials,
        record_id: &str,
        fields: Value,
    ) -> Result<Value, StoreError> {
        let url = self.table_url(creds, Some(record_id))?;
        debug!(record_id = record_id, "Patching record");

        self.send(
            self.http_client.patch(url).json(&json!({ "fields": fields })),
            creds,
        )
        .await
    }

    /// Attach the bearer token, send, and map failures
    async fn send(
        &self,
        request: RequestBuilder,
        creds: &StoreCredentials,
    ) -> Result<Value, StoreError> {
        let response = request
            .bearer_auth(&creds.token)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = upstream_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Upstream error").to_string());
            warn!(status = status.as_u16(), message = %message, "Record store request failed");
            return Err(StoreError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| StoreError::Parse(e.to_string()))
    }
}

/// Extract the human-readable message from a store error body
///
/// The store answers either `{"error": {"type": .., "message": ..}}` or
/// `{"error": "NOT_FOUND"}`; anything else is passed through as raw text.
pub fn upstream_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => match value.get("error") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Object(obj)) => obj
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| obj.get("type").and_then(Value::as_str))
                .map(str::to_string),
            _ => Some(body.to_string()),
        },
        Err(_) => Some(body.to_string()),
    }
}
