use chrono::offset::Offset;
use chrono::{DateTime, FixedOffset, Local, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Timezone the pane resolves ranges in. `Local` follows the host clock,
/// `Named` is an IANA zone.
#[derive(Debug, Clone, Copy, Default)]
pub enum Timezone {
    #[default]
    Local,
    Named(Tz),
}

impl Timezone {
    /// Lenient parse: empty/`local` map to `Local`, `utc`/`z` to UTC,
    /// anything else must be a valid IANA name.
    pub fn parse(value: Option<&str>) -> Option<Self> {
        let Some(raw) = value else {
            return Some(Timezone::Local);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("local") {
            return Some(Timezone::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
            return Some(Timezone::Named(chrono_tz::UTC));
        }
        Tz::from_str(trimmed).ok().map(Timezone::Named)
    }

    pub(crate) fn to_fixed_offset(self, utc: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Timezone::Local => {
                let local = utc.with_timezone(&Local);
                let offset = local.offset().fix();
                local.with_timezone(&offset)
            }
            Timezone::Named(tz) => {
                let local = utc.with_timezone(&tz);
                let offset = local.offset().fix();
                local.with_timezone(&offset)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_blank_and_local_all_mean_local() {
        for value in [None, Some(""), Some("   "), Some("local"), Some("LOCAL")] {
            assert!(matches!(Timezone::parse(value), Some(Timezone::Local)));
        }
    }

    #[test]
    fn utc_aliases_resolve_to_utc() {
        for value in ["utc", "UTC", "z", "Z", " utc "] {
            assert!(matches!(
                Timezone::parse(Some(value)),
                Some(Timezone::Named(chrono_tz::UTC))
            ));
        }
    }

    #[test]
    fn iana_names_resolve() {
        assert!(matches!(
            Timezone::parse(Some("Asia/Tokyo")),
            Some(Timezone::Named(chrono_tz::Asia::Tokyo))
        ));
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(Timezone::parse(Some("Atlantis/Capital")).is_none());
        assert!(Timezone::parse(Some("+09:00")).is_none());
    }

    #[test]
    fn to_fixed_offset_applies_the_zone_offset() {
        let utc = "2026-03-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        // Tokyo has no DST, so the offset is UTC+9 year-round
        let tokyo = Timezone::parse(Some("Asia/Tokyo")).unwrap();
        let fixed = tokyo.to_fixed_offset(utc);
        assert_eq!(fixed.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(
            fixed.format("%Y-%m-%d %H:%M").to_string(),
            "2026-03-01 09:00"
        );
    }
}
