use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::engine::ReportRow;
use crate::error::AppError;
use crate::orchestration::PersistFailure;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortReportResponse {
    pub message: String,
    pub data: Vec<ReportRow>,
    pub persist_failures: Vec<PersistFailure>,
}

/// Build the cohort report, write it to disk and return the rows.
pub async fn get_cohort_report(
    State(state): State<AppState>,
) -> Result<Json<CohortReportResponse>, AppError> {
    let outcome = state.report.run().await.map_err(|e| {
        tracing::error!(error = %e, "Cohort report failed");
        AppError::from(e)
    })?;

    Ok(Json(CohortReportResponse {
        message: format!(
            "Successfully wrote cohort report to {}!",
            outcome.report_path.display()
        ),
        data: outcome.rows,
        persist_failures: outcome.persist_failures,
    }))
}
