//! Athenaeum Library Management System
//!
//! A Rust implementation of the Athenaeum lending and reservation server,
//! providing a REST JSON API over the catalog, loan and reservation
//! lifecycle for members and staff.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
