use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Identifies the calendar month a transaction belongs to. This is both the partition name and
/// its display title, e.g. `January 2025`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> anyhow::Result<Self> {
        if !(1..=12).contains(&month) {
            anyhow::bail!("Month must be between 1 and 12, got {month}");
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl From<NaiveDate> for PeriodKey {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl Display for PeriodKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.first_day() {
            Some(day) => write!(f, "{}", day.format("%B %Y")),
            None => write!(f, "{:04}-{:02}", self.year, self.month),
        }
    }
}

impl FromStr for PeriodKey {
    type Err = anyhow::Error;

    /// Accepts the display form (`January 2025`, case-insensitive, abbreviations allowed) or
    /// `2025-01`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }
        let date = NaiveDate::parse_from_str(&format!("1 {s}"), "%d %B %Y")
            .map_err(|e| anyhow::anyhow!("Invalid period '{s}', expected e.g. 'January 2025': {e}"))?;
        Ok(Self::from_date(date))
    }
}

impl Serialize for PeriodKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PeriodKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PeriodKey::from_str(&s).map_err(serde::de::Error::custom)
    }
}
