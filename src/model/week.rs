//! Week-of-month arithmetic and the week labels that head each block.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The format of the dates inside a week label's range, e.g. `06/01`.
const RANGE_FORMAT: &str = "%d/%m";

/// The label row text of a week block, e.g. `Week 2 (06/01 - 12/01)`.
///
/// The number is the Monday-based week of the month and the range is the Monday through Sunday
/// of the week containing the date, which may spill into the neighbouring month.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekLabel(String);

impl WeekLabel {
    pub fn for_date(date: NaiveDate) -> Self {
        let (start, end) = week_range(date);
        Self(format!(
            "Week {} ({} - {})",
            week_of_month(date),
            start.format(RANGE_FORMAT),
            end.format(RANGE_FORMAT)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for WeekLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for WeekLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<&str> for WeekLabel {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The 1-based week of the month containing `date`, where weeks start on Monday and the first
/// (possibly partial) week contains the 1st.
pub fn week_of_month(date: NaiveDate) -> u32 {
    let first_weekday = date
        .with_day(1)
        .unwrap_or(date)
        .weekday()
        .number_from_monday();
    (date.day() + first_weekday - 1).div_ceil(7)
}

/// The Monday and Sunday of the week containing `date`.
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = i64::from(date.weekday().num_days_from_monday());
    let start = date - Duration::days(offset);
    (start, start + Duration::days(6))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_week_of_month_month_starting_wednesday() {
        // January 2025 starts on a Wednesday
        assert_eq!(week_of_month(date("2025-01-01")), 1);
        assert_eq!(week_of_month(date("2025-01-05")), 1);
        assert_eq!(week_of_month(date("2025-01-06")), 2);
        assert_eq!(week_of_month(date("2025-01-12")), 2);
        assert_eq!(week_of_month(date("2025-01-13")), 3);
        assert_eq!(week_of_month(date("2025-01-31")), 5);
    }

    #[test]
    fn test_week_of_month_month_starting_monday() {
        // September 2025 starts on a Monday
        assert_eq!(week_of_month(date("2025-09-01")), 1);
        assert_eq!(week_of_month(date("2025-09-07")), 1);
        assert_eq!(week_of_month(date("2025-09-08")), 2);
    }

    #[test]
    fn test_week_of_month_month_starting_sunday() {
        // June 2025 starts on a Sunday, so the 1st is a week on its own
        assert_eq!(week_of_month(date("2025-06-01")), 1);
        assert_eq!(week_of_month(date("2025-06-02")), 2);
        assert_eq!(week_of_month(date("2025-06-30")), 6);
    }

    #[test]
    fn test_week_range_spills_into_previous_month() {
        let (start, end) = week_range(date("2025-01-01"));
        assert_eq!(start, date("2024-12-30"));
        assert_eq!(end, date("2025-01-05"));
    }

    #[test]
    fn test_week_range_sunday_belongs_to_preceding_monday() {
        let (start, end) = week_range(date("2025-01-12"));
        assert_eq!(start, date("2025-01-06"));
        assert_eq!(end, date("2025-01-12"));
    }

    #[test]
    fn test_label() {
        assert_eq!(
            WeekLabel::for_date(date("2025-01-06")).as_str(),
            "Week 2 (06/01 - 12/01)"
        );
        assert_eq!(
            WeekLabel::for_date(date("2025-01-03")).as_str(),
            "Week 1 (30/12 - 05/01)"
        );
        assert_eq!(
            WeekLabel::for_date(date("2025-01-08")),
            WeekLabel::for_date(date("2025-01-11"))
        );
    }
}
