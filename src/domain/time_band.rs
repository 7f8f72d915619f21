//! Fixed elapsed-day bands used as report columns.

use serde::{Serialize, Serializer};

/// Day-offset range measured from the start of a cohort week.
///
/// Bands are contiguous and closed on both ends; the last one is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeBand {
    Days0To6,
    Days7To13,
    Days14To20,
    Days21To27,
    Days28To34,
    Days35To41,
    Days42Plus,
}

impl TimeBand {
    /// Every band, in column order.
    pub const ALL: [TimeBand; 7] = [
        TimeBand::Days0To6,
        TimeBand::Days7To13,
        TimeBand::Days14To20,
        TimeBand::Days21To27,
        TimeBand::Days28To34,
        TimeBand::Days35To41,
        TimeBand::Days42Plus,
    ];

    /// Band containing `days` elapsed since the cohort week started.
    ///
    /// Negative offsets have no band.
    pub fn from_elapsed_days(days: i64) -> Option<TimeBand> {
        if days < 0 {
            return None;
        }
        let index = (days / 7).min(6) as usize;
        Some(Self::ALL[index])
    }

    /// Column label, e.g. `"7 - 13 days"`.
    pub fn label(&self) -> &'static str {
        match self {
            TimeBand::Days0To6 => "0 - 6 days",
            TimeBand::Days7To13 => "7 - 13 days",
            TimeBand::Days14To20 => "14 - 20 days",
            TimeBand::Days21To27 => "21 - 27 days",
            TimeBand::Days28To34 => "28 - 34 days",
            TimeBand::Days35To41 => "35 - 41 days",
            TimeBand::Days42Plus => "42+ days",
        }
    }
}

impl std::fmt::Display for TimeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TimeBand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
