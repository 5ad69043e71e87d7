//! Typed record parsers: zone, history, alarm, and device records.

pub mod alarm;
pub mod device;
pub mod history;
pub mod zone;

use chrono::{DateTime, TimeZone, Utc};

/// History and alarm timestamps are minute offsets from this epoch.
pub(crate) fn pcmi_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(crate::constants::BASE_YEAR_FOR_DATES, 1, 1, 0, 0, 0)
        .single()
        .expect("1980-01-01 00:00:00 UTC is a valid, unambiguous timestamp")
}
