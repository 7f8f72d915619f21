use crate::config::{Config, PersistFailurePolicy};
use crate::engine::{build_report_rows, BucketError, ReportRow};
use crate::export::{write_report_csv, ExportError};
use crate::orchestration::marker::{FirstOrderMarker, PersistFailure};
use crate::store::{CustomerStore, StoreError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Runs the cohort report end to end: fetch, mark, aggregate, write.
#[derive(Debug, Clone)]
pub struct ReportService {
    store: Arc<dyn CustomerStore>,
    marker: FirstOrderMarker,
    report_path: PathBuf,
    failure_policy: PersistFailurePolicy,
}

#[derive(Debug)]
pub struct ReportOutcome {
    pub rows: Vec<ReportRow>,
    /// Flag writes that failed; empty on a clean run.
    pub persist_failures: Vec<PersistFailure>,
    pub report_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to fetch customers with orders: {0}")]
    Fetch(#[source] StoreError),
    #[error("{} first-order update(s) failed to persist", .0.len())]
    PersistAborted(Vec<PersistFailure>),
    #[error(transparent)]
    DataIntegrity(#[from] BucketError),
    #[error("failed to write report: {0}")]
    Sink(#[from] ExportError),
}

impl ReportService {
    pub fn new(
        store: Arc<dyn CustomerStore>,
        report_path: impl Into<PathBuf>,
        mark_concurrency: usize,
        failure_policy: PersistFailurePolicy,
    ) -> Self {
        Self {
            marker: FirstOrderMarker::new(store.clone(), mark_concurrency),
            store,
            report_path: report_path.into(),
            failure_policy,
        }
    }

    pub fn from_config(store: Arc<dyn CustomerStore>, config: &Config) -> Self {
        Self::new(
            store,
            config.report_path.clone(),
            config.mark_concurrency,
            config.persist_failure_policy,
        )
    }

    /// Build the report rows without writing the CSV sink.
    pub async fn build(&self) -> Result<(Vec<ReportRow>, Vec<PersistFailure>), ReportError> {
        let mut customers = self
            .store
            .fetch_customers_with_orders()
            .await
            .map_err(ReportError::Fetch)?;
        tracing::info!(customers = customers.len(), "Fetched customers with orders");

        let marked = self.marker.mark(&mut customers).await;
        if !marked.is_complete() {
            match self.failure_policy {
                PersistFailurePolicy::Abort => {
                    return Err(ReportError::PersistAborted(marked.failures));
                }
                PersistFailurePolicy::Continue => {
                    tracing::warn!(
                        failures = marked.failures.len(),
                        "Continuing cohort report with unpersisted first-order flags"
                    );
                }
            }
        }

        let rows = build_report_rows(customers)?;
        tracing::info!(cohorts = rows.len(), "Built cohort report rows");
        Ok((rows, marked.failures))
    }

    /// Build the report and write it to the configured CSV path.
    pub async fn run(&self) -> Result<ReportOutcome, ReportError> {
        let (rows, persist_failures) = self.build().await?;
        write_report_csv(&self.report_path, &rows)?;

        Ok(ReportOutcome {
            rows,
            persist_failures,
            report_path: self.report_path.clone(),
        })
    }
}
