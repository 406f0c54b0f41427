//! Libris Library Catalog Server
//!
//! A Rust REST API server for a library catalog: book records with
//! checkout/checkin, Google sign-in, JWT access/refresh tokens and
//! role-based permissions.

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
