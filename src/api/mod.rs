pub mod cohort_report;
pub mod health;

use crate::error::AppError;
use crate::orchestration::ReportService;
use axum::http::Uri;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub report: Arc<ReportService>,
}

impl AppState {
    pub fn new(report: Arc<ReportService>) -> Self {
        Self { report }
    }
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health::home))
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/cohort-report", get(cohort_report::get_cohort_report))
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}
