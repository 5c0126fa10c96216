//! Export configuration types
//!
//! This module defines the options that shape CSV export: which time columns
//! to emit, which value channels, the sample rate, and the date filter.

use crate::packet::Packet;
use crate::types::{DecoderError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Accepted date format for range arguments
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which value channels to emit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueColumns {
    /// The seven known single-value channels
    #[default]
    Known,
    /// Indices 1..=2 and 89..=105, known or not
    All,
}

/// Output sample rate; the high rates expand each packet into several lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleRate {
    /// One line per packet
    #[default]
    #[serde(rename = "1hz")]
    OneHz,
    /// Ten lines per packet carrying the pulse waveform
    #[serde(rename = "10hz")]
    TenHz,
    /// Twenty-five lines per packet carrying the three flow/pressure waveforms
    #[serde(rename = "25hz")]
    TwentyFiveHz,
}

impl SampleRate {
    /// Output lines per packet
    pub fn lines_per_packet(self) -> usize {
        match self {
            SampleRate::OneHz => 1,
            SampleRate::TenHz => 10,
            SampleRate::TwentyFiveHz => 25,
        }
    }
}

/// Configuration for CSV export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Emit the seconds column
    pub time_seconds: bool,

    /// Emit the seven raw timestamp fields
    pub time_ymd: bool,

    /// Value channel selection
    pub values: ValueColumns,

    /// Sample rate
    pub rate: SampleRate,

    /// Emit a header row before the data
    pub header: bool,

    /// Inclusive date filter: empty, `[day]` or `[start, end]`
    pub dates: Vec<String>,
}

impl ExportConfig {
    /// Create a new export configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: emit the seconds column
    pub fn with_time_seconds(mut self, enabled: bool) -> Self {
        self.time_seconds = enabled;
        self
    }

    /// Builder method: emit raw timestamp fields
    pub fn with_time_ymd(mut self, enabled: bool) -> Self {
        self.time_ymd = enabled;
        self
    }

    /// Builder method: select value channels
    pub fn with_values(mut self, values: ValueColumns) -> Self {
        self.values = values;
        self
    }

    /// Builder method: set sample rate
    pub fn with_rate(mut self, rate: SampleRate) -> Self {
        self.rate = rate;
        self
    }

    /// Builder method: emit a header row
    pub fn with_header(mut self, enabled: bool) -> Self {
        self.header = enabled;
        self
    }

    /// Builder method: set the date filter
    pub fn with_dates<S: Into<String>>(mut self, dates: impl IntoIterator<Item = S>) -> Self {
        self.dates = dates.into_iter().map(Into::into).collect();
        self
    }

    /// Parse the date filter
    pub fn date_filter(&self) -> Result<DateFilter> {
        DateFilter::parse(&self.dates)
    }
}

/// User-specified date bounds, before defaults are applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateFilter {
    /// Parse zero, one or two `YYYY-MM-DD` strings
    ///
    /// A single date collapses the range to that day.
    pub fn parse<S: AsRef<str>>(dates: &[S]) -> Result<Self> {
        let parsed = dates
            .iter()
            .map(|s| parse_date(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let filter = match parsed.as_slice() {
            [] => Self::default(),
            [day] => Self {
                start: Some(*day),
                end: Some(*day),
            },
            [start, end] => Self {
                start: Some(*start),
                end: Some(*end),
            },
            more => {
                return Err(DecoderError::InvalidDateRange(format!(
                    "expected at most 2 dates, got {}",
                    more.len()
                )))
            }
        };

        if let (Some(start), Some(end)) = (filter.start, filter.end) {
            if start > end {
                return Err(DecoderError::InvalidDateRange(format!(
                    "start {} is after end {}",
                    start, end
                )));
            }
        }

        Ok(filter)
    }

    /// Fill missing bounds from the first and last packet
    ///
    /// Returns `None` when a bound is missing and there are no packets.
    pub fn resolve(&self, packets: &[Packet]) -> Option<DateRange> {
        let start = self.start.or_else(|| packets.first().map(|p| p.date))?;
        let end = self.end.or_else(|| packets.last().map(|p| p.date))?;
        Some(DateRange { start, end })
    }
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// True if `date` lies within the range, bounds included
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| DecoderError::InvalidDateRange(format!("'{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_export_config_builder() {
        let config = ExportConfig::new()
            .with_time_seconds(true)
            .with_values(ValueColumns::All)
            .with_rate(SampleRate::TenHz)
            .with_dates(["2023-05-10"]);

        assert!(config.time_seconds);
        assert!(!config.time_ymd);
        assert_eq!(config.values, ValueColumns::All);
        assert_eq!(config.rate.lines_per_packet(), 10);
        assert_eq!(config.dates, vec!["2023-05-10".to_string()]);
    }

    #[test]
    fn test_single_date_collapses_range() {
        let filter = DateFilter::parse(&["2023-05-10"]).unwrap();
        assert_eq!(filter.start, Some(day(2023, 5, 10)));
        assert_eq!(filter.end, Some(day(2023, 5, 10)));
    }

    #[test]
    fn test_invalid_date_inputs() {
        assert!(DateFilter::parse(&["2023-13-01"]).unwrap_err().is_input_error());
        assert!(DateFilter::parse(&["yesterday"]).is_err());
        assert!(DateFilter::parse(&["2023-05-11", "2023-05-10"]).is_err());
        assert!(DateFilter::parse(&["2023-05-10", "2023-05-11", "2023-05-12"]).is_err());
    }

    #[test]
    fn test_range_is_inclusive() {
        let range = DateFilter::parse(&["2023-05-10", "2023-05-12"])
            .unwrap()
            .resolve(&[])
            .unwrap();

        assert!(range.contains(day(2023, 5, 10)));
        assert!(range.contains(day(2023, 5, 12)));
        assert!(!range.contains(day(2023, 5, 9)));
        assert!(!range.contains(day(2023, 5, 13)));
    }

    #[test]
    fn test_unbounded_filter_without_packets() {
        let empty: [&str; 0] = [];
        assert_eq!(DateFilter::parse(&empty).unwrap().resolve(&[]), None);
    }
}
