//! Transactional email provider (MailerSend) client
//!
//! Sends one HTML message to one recipient. The provider key is supplied by
//! the operator per request and never stored.

use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Email provider client errors
#[derive(Debug, Error)]
pub enum MailError {
    #[error("MailerSend key not configured")]
    MissingKey,

    #[error("Invalid email request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Upstream { status: u16, message: String },
}

impl MailError {
    /// HTTP status to report to the caller
    pub fn status_code(&self) -> u16 {
        match self {
            MailError::MissingKey | MailError::InvalidRequest(_) => 400,
            MailError::Upstream { status, .. } => *status,
            MailError::Network(_) => 502,
        }
    }
}

/// Sender or recipient address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mailbox {
    pub email: String,
    pub name: String,
}

/// Provider send payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub from: Mailbox,
    pub to: Vec<Mailbox>,
    pub subject: String,
    pub html: String,
}

impl OutgoingEmail {
    /// Single-recipient message
    pub fn single(from: Mailbox, to: Mailbox, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            from,
            to: vec![to],
            subject: subject.into(),
            html: html.into(),
        }
    }
}

/// Accepted send
#[derive(Debug, Clone, PartialEq)]
pub struct SendReceipt {
    /// Provider message id (`X-Message-Id` header), when returned
    pub message_id: Option<String>,
    /// Provider response body; `null` for the usual empty 202 reply
    pub body: Value,
}

/// Email provider API client
#[derive(Debug, Clone)]
pub struct MailerSendClient {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl MailerSendClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, MailError> {
        let endpoint = Url::parse(endpoint).map_err(|e| MailError::InvalidRequest(e.to_string()))?;
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MailError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }

    /// Submit one message
    pub async fn send(&self, api_key: &str, email: &OutgoingEmail) -> Result<SendReceipt, MailError> {
        if api_key.trim().is_empty() {
            return Err(MailError::MissingKey);
        }
        if email.from.email.trim().is_empty() {
            return Err(MailError::InvalidRequest("sender address is required".to_string()));
        }
        if email.to.iter().any(|to| to.email.trim().is_empty()) || email.to.is_empty() {
            return Err(MailError::InvalidRequest("recipient address is required".to_string()));
        }

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(api_key.trim())
            .json(email)
            .send()
            .await
            .map_err(|e| MailError::Network(e.to_string()))?;

        let status = response.status();
        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response
            .text()
            .await
            .map_err(|e| MailError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = upstream_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Upstream error").to_string());
            warn!(status = status.as_u16(), message = %message, "Email provider rejected send");
            return Err(MailError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        info!(
            status = status.as_u16(),
            message_id = message_id.as_deref().unwrap_or("-"),
            "Email accepted by provider"
        );

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(SendReceipt { message_id, body })
    }
}

/// Provider errors carry `{"message": "..."}`; otherwise pass the raw body
pub fn upstream_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(body.to_string())),
        Err(_) => Some(body.to_string()),
    }
}
