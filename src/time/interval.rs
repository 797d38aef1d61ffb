//! Default interval calculator.
//!
//! Snaps the per-point interval implied by a range and resolution to a
//! ladder of round values, clamped below by an optional limit.

use super::{IntervalCalculator, QueryIntervals, TimeRange};

/// Round intervals, ascending. The calculator picks the largest step not
/// exceeding the computed target.
const LADDER: &[(i64, &str)] = &[
    (1, "1ms"),
    (10, "10ms"),
    (100, "100ms"),
    (1_000, "1s"),
    (10_000, "10s"),
    (30_000, "30s"),
    (60_000, "1m"),
    (300_000, "5m"),
    (600_000, "10m"),
    (1_800_000, "30m"),
    (3_600_000, "1h"),
    (10_800_000, "3h"),
    (21_600_000, "6h"),
    (43_200_000, "12h"),
    (86_400_000, "1d"),
    (604_800_000, "1w"),
    (2_592_000_000, "30d"),
    (31_536_000_000, "1y"),
];

pub struct IntervalCalc;

impl IntervalCalculator for IntervalCalc {
    fn calculate(
        &self,
        range: &TimeRange,
        resolution: usize,
        low_limit: Option<&str>,
    ) -> QueryIntervals {
        let span_ms = (range.to - range.from).num_milliseconds().max(1);
        let target = span_ms / resolution.max(1) as i64;
        let (ms, label) = LADDER
            .iter()
            .rev()
            .find(|(ms, _)| *ms <= target)
            .copied()
            .unwrap_or(LADDER[0]);
        if let Some(limit) = low_limit
            && let Some(limit_ms) = parse_interval_ms(limit)
            && ms < limit_ms
        {
            return QueryIntervals {
                interval: limit.to_string(),
                interval_ms: limit_ms,
            };
        }
        QueryIntervals {
            interval: label.to_string(),
            interval_ms: ms,
        }
    }
}

/// Parse interval strings such as `250ms`, `10s`, `1m`, `2h`.
pub fn parse_interval_ms(text: &str) -> Option<i64> {
    let split = text.find(|c: char| !c.is_ascii_digit())?;
    if split == 0 {
        return None;
    }
    let amount: i64 = text[..split].parse().ok()?;
    let factor = match &text[split..] {
        "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        "w" => 604_800_000,
        "y" => 31_536_000_000,
        _ => return None,
    };
    amount.checked_mul(factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{DateMath, RawTimeRange, Timezone, get_time_range_from_url};

    fn hour_range() -> TimeRange {
        let raw = RawTimeRange {
            from: "now-1h".to_string(),
            to: "now".to_string(),
        };
        get_time_range_from_url(&raw, &DateMath, Timezone::Local).unwrap()
    }

    #[test]
    fn one_hour_at_hundreds_of_points_snaps_to_ten_seconds() {
        // 3600s / 300 points = 12s target, ladder floor 10s
        let intervals = IntervalCalc.calculate(&hour_range(), 300, None);
        assert_eq!(intervals.interval, "10s");
        assert_eq!(intervals.interval_ms, 10_000);
    }

    #[test]
    fn low_limit_clamps_small_intervals() {
        let intervals = IntervalCalc.calculate(&hour_range(), 300, Some("1m"));
        assert_eq!(intervals.interval, "1m");
        assert_eq!(intervals.interval_ms, 60_000);
    }

    #[test]
    fn low_limit_below_computed_interval_is_ignored() {
        let intervals = IntervalCalc.calculate(&hour_range(), 300, Some("1s"));
        assert_eq!(intervals.interval, "10s");
    }

    #[test]
    fn parse_interval_ms_units() {
        assert_eq!(parse_interval_ms("250ms"), Some(250));
        assert_eq!(parse_interval_ms("10s"), Some(10_000));
        assert_eq!(parse_interval_ms("1m"), Some(60_000));
        assert_eq!(parse_interval_ms("2h"), Some(7_200_000));
        assert_eq!(parse_interval_ms("bogus"), None);
        assert_eq!(parse_interval_ms("10"), None);
        assert_eq!(parse_interval_ms("s"), None);
    }
}
