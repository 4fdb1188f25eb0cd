//! Waypoint Event Check-In Management System
//!
//! A Rust implementation of the Waypoint check-in server, providing an
//! action-dispatch JSON API for QR-code check-ins against time-, location-
//! and capacity-bounded activities, plus the admin surface managing
//! locations, activities, users, announcements and venues.

use std::sync::Arc;

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod geo;
pub mod lock;
pub mod models;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub lock: lock::RequestLock,
}
