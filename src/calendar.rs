//! Weekend arithmetic and compact-date helpers
//!
//! All race-day reasoning happens in Japan Standard Time. Only [`now_local`]
//! and [`today_local`] read the clock; everything else takes the reference
//! instant as an argument.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};
use chrono_tz::Asia::Tokyo;

use crate::error::{Result, ScheduleError};

/// Hour (JST) after which a race day's card is considered closed
pub const BETTING_CUTOFF_HOUR: u32 = 16;

/// Current wall-clock time in JST
pub fn now_local() -> NaiveDateTime {
    Utc::now().with_timezone(&Tokyo).naive_local()
}

/// Today's date in JST
pub fn today_local() -> NaiveDate {
    now_local().date()
}

/// Saturday and Sunday of the weekend that `reference` belongs to.
///
/// A Sunday looks back to the Saturday before it; every other day looks
/// forward, with a Saturday being its own weekend.
pub fn current_weekend(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    if reference.weekday() == Weekday::Sun {
        return (reference - Duration::days(1), reference);
    }

    // Mon=0 .. Sat=5
    let ahead = 5 - i64::from(reference.weekday().num_days_from_monday());
    let saturday = reference + Duration::days(ahead);
    (saturday, saturday + Duration::days(1))
}

/// The race day currently being bet on.
///
/// Saturday until its 16:00 cutoff, then Sunday until its cutoff, then the
/// following Saturday.
pub fn pivot_date(now: NaiveDateTime) -> NaiveDate {
    let (saturday, sunday) = current_weekend(now.date());

    if before_cutoff(now, saturday) {
        saturday
    } else if before_cutoff(now, sunday) {
        sunday
    } else {
        saturday + Duration::days(7)
    }
}

fn before_cutoff(now: NaiveDateTime, day: NaiveDate) -> bool {
    now.date() < day || (now.date() == day && now.hour() < BETTING_CUTOFF_HOUR)
}

/// Format as zero-padded YYYYMMDD
pub fn to_compact_date(date: NaiveDate) -> String {
    format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
}

/// Parse a YYYYMMDD string.
///
/// Anything other than eight ASCII digits naming a real date is
/// [`ScheduleError::InvalidDateFormat`].
pub fn parse_compact_date(s: &str) -> Result<NaiveDate> {
    let invalid = || ScheduleError::InvalidDateFormat(s.to_string());

    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let year: i32 = s[0..4].parse().map_err(|_| invalid())?;
    let month: u32 = s[4..6].parse().map_err(|_| invalid())?;
    let day: u32 = s[6..8].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Whole days from `today` to `date`, never negative
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days().max(0)
}

/// [`days_until`] for a compact date string
pub fn days_until_compact(date: &str, today: NaiveDate) -> Result<i64> {
    Ok(days_until(parse_compact_date(date)?, today))
}

/// Short "M/D" rendering for display
pub fn format_for_display(date: &str) -> Result<String> {
    let parsed = parse_compact_date(date)?;
    Ok(format!("{}/{}", parsed.month(), parsed.day()))
}

/// Japanese weekday label
pub fn weekday_label(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "月",
        Weekday::Tue => "火",
        Weekday::Wed => "水",
        Weekday::Thu => "木",
        Weekday::Fri => "金",
        Weekday::Sat => "土",
        Weekday::Sun => "日",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_compact_round_trip() {
        for s in ["20250412", "20240229", "19991231", "20260101"] {
            assert_eq!(to_compact_date(parse_compact_date(s).unwrap()), s);
        }
    }

    #[test]
    fn test_to_compact_date_pads() {
        assert_eq!(to_compact_date(date(2025, 4, 5)), "20250405");
    }

    #[test]
    fn test_parse_compact_date_rejects_malformed() {
        for s in ["", "2025041", "202504120", "2025-4-1", "2025O412", "２０２５０４１２"] {
            assert!(
                matches!(parse_compact_date(s), Err(ScheduleError::InvalidDateFormat(_))),
                "{s:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_compact_date_rejects_impossible_dates() {
        assert!(parse_compact_date("20250230").is_err());
        assert!(parse_compact_date("20251301").is_err());
        assert!(parse_compact_date("20250100").is_err());
    }

    #[test]
    fn test_sunday_looks_back() {
        // 2025-04-13 is a Sunday
        let (sat, sun) = current_weekend(date(2025, 4, 13));
        assert_eq!(sat, date(2025, 4, 12));
        assert_eq!(sun, date(2025, 4, 13));
    }

    #[test]
    fn test_weekdays_look_forward() {
        // 2025-04-07 (Mon) .. 2025-04-11 (Fri)
        for d in 7..=11 {
            let reference = date(2025, 4, d);
            let (sat, sun) = current_weekend(reference);
            assert_eq!(sat, date(2025, 4, 12));
            assert_eq!(sun, date(2025, 4, 13));
            assert!(sat > reference);
            assert!((sat - reference).num_days() <= 6);
        }
    }

    #[test]
    fn test_saturday_is_its_own_weekend() {
        let (sat, sun) = current_weekend(date(2025, 4, 12));
        assert_eq!(sat, date(2025, 4, 12));
        assert_eq!(sun, date(2025, 4, 13));
    }

    #[test]
    fn test_weekend_property_over_a_year() {
        let mut reference = date(2025, 1, 1);
        while reference.year() == 2025 {
            let (sat, sun) = current_weekend(reference);
            assert_eq!(sat.weekday(), Weekday::Sat);
            assert_eq!(sun - sat, Duration::days(1));
            match reference.weekday() {
                Weekday::Sun => assert_eq!(sat, reference - Duration::days(1)),
                Weekday::Sat => assert_eq!(sat, reference),
                _ => {
                    assert!(sat > reference);
                    assert!((sat - reference).num_days() <= 6);
                }
            }
            reference = reference + Duration::days(1);
        }
    }

    #[test]
    fn test_weekend_straddles_month() {
        // 2025-05-31 is a Saturday
        let (sat, sun) = current_weekend(date(2025, 5, 28));
        assert_eq!(sat, date(2025, 5, 31));
        assert_eq!(sun, date(2025, 6, 1));
    }

    #[test]
    fn test_pivot_weekday_is_saturday() {
        assert_eq!(pivot_date(at(2025, 4, 9, 23, 0)), date(2025, 4, 12));
    }

    #[test]
    fn test_pivot_saturday_cutoff() {
        assert_eq!(pivot_date(at(2025, 4, 12, 15, 59)), date(2025, 4, 12));
        assert_eq!(pivot_date(at(2025, 4, 12, 16, 0)), date(2025, 4, 13));
    }

    #[test]
    fn test_pivot_sunday_cutoff() {
        assert_eq!(pivot_date(at(2025, 4, 13, 9, 30)), date(2025, 4, 13));
        assert_eq!(pivot_date(at(2025, 4, 13, 16, 0)), date(2025, 4, 19));
        assert_eq!(pivot_date(at(2025, 4, 13, 23, 59)), date(2025, 4, 19));
    }

    #[test]
    fn test_pivot_idempotent_before_cutoff() {
        let first = pivot_date(at(2025, 4, 12, 10, 0));
        let second = pivot_date(at(2025, 4, 12, 10, 1));
        assert_eq!(first, second);
    }

    #[test]
    fn test_days_until_clamps() {
        let today = date(2025, 4, 10);
        assert_eq!(days_until(date(2025, 4, 12), today), 2);
        assert_eq!(days_until(today, today), 0);
        assert_eq!(days_until(date(2025, 4, 1), today), 0);
    }

    #[test]
    fn test_days_until_compact() {
        let today = date(2025, 4, 10);
        assert_eq!(days_until_compact("20250413", today).unwrap(), 3);
        assert!(days_until_compact("bad", today).is_err());
    }

    #[test]
    fn test_format_for_display() {
        assert_eq!(format_for_display("20250412").unwrap(), "4/12");
        assert!(format_for_display("2025041").is_err());
    }

    #[test]
    fn test_weekday_label() {
        assert_eq!(weekday_label(date(2025, 4, 12)), "土");
        assert_eq!(weekday_label(date(2025, 4, 13)), "日");
    }
}
