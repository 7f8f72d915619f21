//! Async glue between the store and the pure report stages.

pub mod marker;
pub mod report;

pub use marker::{FirstOrderMarker, MarkOutcome, PersistFailure};
pub use report::{ReportError, ReportOutcome, ReportService};
