//! roundup-server library
//!
//! Stateless proxy between the browser UI, the record store and the email
//! provider. Operator credentials arrive with each request and are never
//! stored.

use axum::Router;
use chrono::{DateTime, Utc};
use roundup_common::config::TomlConfig;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod airtable;
pub mod api;
pub mod dispatcher;
pub mod email_log;
pub mod error;
pub mod import;
pub mod mailersend;

pub use crate::error::{ApiError, ApiResult};

use crate::airtable::AirtableClient;
use crate::dispatcher::EmailDispatcher;
use crate::email_log::EmailLog;
use crate::mailersend::MailerSendClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Record store client
    pub store: AirtableClient,
    /// Email sender (shares the store client and the log)
    pub dispatcher: EmailDispatcher,
    /// Recent send attempts
    pub email_log: EmailLog,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Build clients from bootstrap configuration
    pub fn new(config: &TomlConfig) -> roundup_common::Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let store = AirtableClient::new(&config.airtable_api_url, timeout)
            .map_err(|e| roundup_common::Error::Config(format!("airtable_api_url: {}", e)))?;
        let mailer = MailerSendClient::new(&config.mailersend_api_url, timeout)
            .map_err(|e| roundup_common::Error::Config(format!("mailersend_api_url: {}", e)))?;
        let email_log = EmailLog::new(config.email_log_capacity);
        let dispatcher = EmailDispatcher::new(
            store.clone(),
            mailer,
            email_log.clone(),
            config.sender_name.clone(),
        );

        Ok(Self {
            store,
            dispatcher,
            email_log,
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
///
/// API routes first, then the static UI.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::airtable_routes())
        .merge(api::import_routes())
        .merge(api::email_routes())
        .merge(api::summary_routes())
        .merge(api::health_routes())
        .merge(api::ui_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
