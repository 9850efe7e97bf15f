//! HTTP API handlers for roundup-server

pub mod airtable;
pub mod buildinfo;
pub mod email;
pub mod health;
pub mod import;
pub mod summary;
pub mod ui;

pub use airtable::airtable_routes;
pub use email::email_routes;
pub use health::health_routes;
pub use import::import_routes;
pub use summary::summary_routes;
pub use ui::ui_routes;
