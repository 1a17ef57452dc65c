//! Business-day arithmetic in the restaurant's local offset.

use chrono::{Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

use crate::domain::foundation::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessCalendar {
    offset: FixedOffset,
}

impl BusinessCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub fn today(&self) -> NaiveDate {
        self.date_of(&Timestamp::now())
    }

    pub fn date_of(&self, at: &Timestamp) -> NaiveDate {
        at.business_date(self.offset)
    }

    /// `[start, end)` of `date` in UTC.
    pub fn bounds(&self, date: NaiveDate) -> (Timestamp, Timestamp) {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let utc_midnight =
            local_midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        let start = Utc.from_utc_datetime(&utc_midnight);
        (
            Timestamp::from_datetime(start),
            Timestamp::from_datetime(start + Duration::days(1)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn at(rfc3339: &str) -> Timestamp {
        Timestamp::from_datetime(DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc))
    }

    #[test]
    fn utc_bounds_are_midnight_to_midnight() {
        let calendar = BusinessCalendar::utc();
        let (start, end) = calendar.bounds(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(start.to_iso_string(), "2024-05-01T00:00:00.000Z");
        assert_eq!(end.to_iso_string(), "2024-05-02T00:00:00.000Z");
    }

    #[test]
    fn negative_offset_shifts_the_window_later() {
        let calendar = BusinessCalendar::new(FixedOffset::west_opt(5 * 3600).unwrap());
        let (start, _) = calendar.bounds(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(start.to_iso_string(), "2024-05-01T05:00:00.000Z");

        // 02:00 UTC on the 2nd is still the evening of the 1st locally.
        assert_eq!(
            calendar.date_of(&at("2024-05-02T02:00:00Z")),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
    }
}
