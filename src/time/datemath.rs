//! Default date-math engine for relative time expressions.
//!
//! Expressions start at `now` and chain offset and rounding operations:
//! `now-6h`, `now/d`, `now-1d/w`, `now+30m`. Rounding honors the supplied
//! timezone; `round_up` turns `/unit` into "end of unit" (start of the next
//! unit minus one millisecond).

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Timelike, Utc};

use super::{DateMathParser, RawTime, Timezone};

pub struct DateMath;

impl DateMathParser for DateMath {
    fn parse(&self, value: &RawTime, round_up: bool, tz: Timezone) -> Option<DateTime<Utc>> {
        match value {
            RawTime::Absolute(t) => Some(*t),
            RawTime::Relative(expr) => parse_expression(expr, round_up, tz),
        }
    }
}

fn parse_expression(expr: &str, round_up: bool, tz: Timezone) -> Option<DateTime<Utc>> {
    let mut rest = expr.strip_prefix("now")?;
    let mut time = Utc::now();
    while !rest.is_empty() {
        let op = rest.chars().next()?;
        match op {
            '/' => {
                let unit = rest[1..].chars().next()?;
                time = round_to_unit(time, unit, round_up, tz)?;
                rest = &rest[1 + unit.len_utf8()..];
            }
            '+' | '-' => {
                rest = &rest[1..];
                let digits = rest.find(|c: char| !c.is_ascii_digit())?;
                // a missing amount means 1, as in `now-d`
                let amount: i64 = if digits == 0 {
                    1
                } else {
                    rest[..digits].parse().ok()?
                };
                let signed = if op == '-' { -amount } else { amount };
                let unit = rest[digits..].chars().next()?;
                time = apply_offset(time, signed, unit)?;
                rest = &rest[digits + unit.len_utf8()..];
            }
            _ => return None,
        }
    }
    Some(time)
}

fn apply_offset(time: DateTime<Utc>, amount: i64, unit: char) -> Option<DateTime<Utc>> {
    let shifted = match unit {
        's' => time + Duration::seconds(amount),
        'm' => time + Duration::minutes(amount),
        'h' => time + Duration::hours(amount),
        'd' => time + Duration::days(amount),
        'w' => time + Duration::weeks(amount),
        'M' => shift_months(time, amount)?,
        'y' => shift_months(time, amount.checked_mul(12)?)?,
        _ => return None,
    };
    Some(shifted)
}

fn shift_months(time: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    if months >= 0 {
        time.checked_add_months(Months::new(u32::try_from(months).ok()?))
    } else {
        time.checked_sub_months(Months::new(u32::try_from(-months).ok()?))
    }
}

fn round_to_unit(
    time: DateTime<Utc>,
    unit: char,
    round_up: bool,
    tz: Timezone,
) -> Option<DateTime<Utc>> {
    let local = tz.to_fixed_offset(time);
    let offset = *local.offset();
    let date = local.date_naive();
    let floor = match unit {
        's' => local.naive_local().with_nanosecond(0)?,
        'm' => local.naive_local().with_nanosecond(0)?.with_second(0)?,
        'h' => local
            .naive_local()
            .with_nanosecond(0)?
            .with_second(0)?
            .with_minute(0)?,
        'd' => date.and_hms_opt(0, 0, 0)?,
        'w' => {
            // weeks start on Monday
            let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
            monday.and_hms_opt(0, 0, 0)?
        }
        'M' => date.with_day(1)?.and_hms_opt(0, 0, 0)?,
        'y' => NaiveDate::from_ymd_opt(date.year(), 1, 1)?.and_hms_opt(0, 0, 0)?,
        _ => return None,
    };
    let floored = chrono::TimeZone::from_local_datetime(&offset, &floor)
        .single()?
        .with_timezone(&Utc);
    if round_up {
        Some(apply_offset(floored, 1, unit)? - Duration::milliseconds(1))
    } else {
        Some(floored)
    }
}
