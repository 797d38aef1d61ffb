//! Time boundary parsing, range resolution, and interval sizing.

pub mod datemath;
pub mod interval;
mod timezone;

pub use datemath::DateMath;
pub use interval::IntervalCalc;
pub use timezone::Timezone;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_RANGE_FROM: &str = "now-6h";
pub const DEFAULT_RANGE_TO: &str = "now";

/// A time boundary as it appears in a URL or stored state.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTime {
    /// Relative expression such as `now-6h`, resolved by date math.
    Relative(String),
    /// Absolute instant.
    Absolute(DateTime<Utc>),
}

/// A raw range as stored in session state: unresolved boundary strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTimeRange {
    pub from: String,
    pub to: String,
}

impl Default for RawTimeRange {
    fn default() -> Self {
        Self {
            from: DEFAULT_RANGE_FROM.to_string(),
            to: DEFAULT_RANGE_TO.to_string(),
        }
    }
}

/// A resolved range. The raw strings are retained alongside the absolute
/// instants so the range can be re-serialized without loss.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub raw: RawTimeRange,
}

/// Classify a raw boundary representation by shape.
///
/// Strings containing `now` pass through as relative expressions; fixed
/// lengths select date formats (8 = `YYYYMMDD`, 15 = `YYYYMMDDTHHmmss`,
/// 19 = legacy `YYYY-MM-DD HH:mm:ss`); purely numeric input is an epoch in
/// milliseconds. Anything else is unparseable and yields `None`.
pub fn parse_raw_time(value: &Value) -> Option<RawTime> {
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_i64().and_then(from_epoch_ms),
        Value::String(s) => parse_raw_time_str(s),
        _ => None,
    }
}

pub fn parse_raw_time_str(value: &str) -> Option<RawTime> {
    if value.contains("now") {
        return Some(RawTime::Relative(value.to_string()));
    }
    match value.len() {
        8 => NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(at_utc),
        15 => NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
            .ok()
            .map(at_utc),
        19 => NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(at_utc),
        _ => value.parse::<i64>().ok().and_then(from_epoch_ms),
    }
}

fn at_utc(naive: NaiveDateTime) -> RawTime {
    RawTime::Absolute(Utc.from_utc_datetime(&naive))
}

fn from_epoch_ms(ms: i64) -> Option<RawTime> {
    Utc.timestamp_millis_opt(ms).single().map(RawTime::Absolute)
}

/// Resolves raw boundaries to absolute instants. Relative expressions go
/// through date math; `round_up` selects ceiling semantics for rounded
/// expressions.
pub trait DateMathParser {
    fn parse(&self, value: &RawTime, round_up: bool, tz: Timezone) -> Option<DateTime<Utc>>;
}

/// Resolve a raw range from a URL: the lower bound floors to the start of
/// its granularity, the upper bound ceils. An unresolvable boundary yields
/// `None`; the caller surfaces it as an invalid range.
pub fn get_time_range_from_url(
    raw: &RawTimeRange,
    parser: &dyn DateMathParser,
    tz: Timezone,
) -> Option<TimeRange> {
    let from = parse_raw_time_str(&raw.from)?;
    let to = parse_raw_time_str(&raw.to)?;
    Some(TimeRange {
        from: parser.parse(&from, false, tz)?,
        to: parser.parse(&to, true, tz)?,
        raw: raw.clone(),
    })
}

/// A resolved query interval in both display and millisecond form.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryIntervals {
    pub interval: String,
    pub interval_ms: i64,
}

/// Sizes an interval to a range and point resolution, clamped below by an
/// optional `low_limit` interval string.
pub trait IntervalCalculator {
    fn calculate(
        &self,
        range: &TimeRange,
        resolution: usize,
        low_limit: Option<&str>,
    ) -> QueryIntervals;
}

/// Interval for a query batch. Without a resolution there is nothing to
/// adapt to and a fixed `1s` default is returned.
pub fn get_intervals(
    range: &TimeRange,
    low_limit: Option<&str>,
    resolution: Option<usize>,
    calc: &dyn IntervalCalculator,
) -> QueryIntervals {
    match resolution {
        None | Some(0) => QueryIntervals {
            interval: "1s".to_string(),
            interval_ms: 1000,
        },
        Some(resolution) => calc.calculate(range, resolution, low_limit),
    }
}
