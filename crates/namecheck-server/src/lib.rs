//! # namecheck-server
//!
//! HTTP endpoint for realistic-name classification.
//!
//! | Route | Method | Purpose |
//! |---|---|---|
//! | `/predict` | POST | Classify `{"name": ..., "model"?: ...}` |
//! | `/health` | GET | Provider readiness (200 ok or 503 degraded) plus default model |
//! | `/models` | GET | Default model and allow-list |
//!
//! A pre-check rejection is a normal 200 answer. Caller mistakes are 400;
//! failures of the remote model are 500 with a fixed message.

use std::sync::Arc;

use namecheck_runtime::NameClassifier;

pub mod config;
pub mod error;
pub mod routes;

pub use config::{ConfigOverrides, ServerConfig, ServerConfigError};
pub use error::ApiError;
pub use routes::create_router;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<NameClassifier>,
}

impl AppState {
    pub fn new(classifier: NameClassifier) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }
}
