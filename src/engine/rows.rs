//! Pivoting cohort summaries into flat report rows.

use super::distinct::CohortSummary;
use crate::domain::{CohortKey, CohortKeyError, TimeBand};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

pub const COHORT_COLUMN: &str = "Cohort";
pub const CUSTOMERS_COLUMN: &str = "Customers";

/// One row of the report: a cohort week and a cell per band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub cohort: String,
    pub customers: String,
    pub bands: Vec<(TimeBand, String)>,
}

impl ReportRow {
    /// Column headers for rows built over `bands`.
    pub fn headers(bands: &[TimeBand]) -> Vec<&'static str> {
        [COHORT_COLUMN, CUSTOMERS_COLUMN]
            .into_iter()
            .chain(bands.iter().map(|b| b.label()))
            .collect()
    }

    /// Column headers of this row.
    pub fn columns(&self) -> Vec<&'static str> {
        [COHORT_COLUMN, CUSTOMERS_COLUMN]
            .into_iter()
            .chain(self.bands.iter().map(|(b, _)| b.label()))
            .collect()
    }

    /// Cell values in column order.
    pub fn values(&self) -> Vec<&str> {
        [self.cohort.as_str(), self.customers.as_str()]
            .into_iter()
            .chain(self.bands.iter().map(|(_, v)| v.as_str()))
            .collect()
    }

    /// Cell value by column header.
    pub fn get(&self, column: &str) -> Option<&str> {
        match column {
            COHORT_COLUMN => Some(self.cohort.as_str()),
            CUSTOMERS_COLUMN => Some(self.customers.as_str()),
            label => self
                .bands
                .iter()
                .find(|(band, _)| band.label() == label)
                .map(|(_, v)| v.as_str()),
        }
    }
}

impl Serialize for ReportRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.bands.len()))?;
        map.serialize_entry(COHORT_COLUMN, &self.cohort)?;
        map.serialize_entry(CUSTOMERS_COLUMN, &self.customers)?;
        for (band, value) in &self.bands {
            map.serialize_entry(band.label(), value)?;
        }
        map.end()
    }
}

/// Render a `YYYY_WW` cohort token as `M/DD - M/DD`.
pub fn format_cohort_date(cohort_week: &str) -> Result<String, CohortKeyError> {
    cohort_week
        .parse::<CohortKey>()
        .map(|key| key.date_range_label())
}

/// Build one row per requested cohort key, with one cell per band.
///
/// Keys missing from `summaries` still get a row, with blank cells; bands
/// without data for a cohort are blank.
pub fn format_for_csv(
    summaries: &[CohortSummary],
    cohort_keys: &[CohortKey],
    bands: &[TimeBand],
) -> Vec<ReportRow> {
    let by_key: HashMap<CohortKey, &CohortSummary> =
        summaries.iter().map(|s| (s.key, s)).collect();

    cohort_keys
        .iter()
        .map(|key| {
            let summary = by_key.get(key);
            ReportRow {
                cohort: key.date_range_label(),
                customers: summary
                    .map(|s| format!("{} Customers", s.customer_count))
                    .unwrap_or_default(),
                bands: bands
                    .iter()
                    .map(|band| {
                        let cell = summary
                            .and_then(|s| s.bands.get(band))
                            .map(|b| format!("{}, {}", b.distinct_user_count, b.first_order_count))
                            .unwrap_or_default();
                        (*band, cell)
                    })
                    .collect(),
            }
        })
        .collect()
}
