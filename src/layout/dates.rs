use chrono::{Datelike, Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ir::Granularity;

static CANONICAL_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date {0:?} (expected YYYY-MM-DD)")]
pub struct InvalidDate(pub String);

/// Parses a canonical `YYYY-MM-DD` date. Non-padded fields are rejected.
pub fn parse_date(value: &str) -> Result<NaiveDate, InvalidDate> {
    let trimmed = value.trim();
    if !CANONICAL_DATE_RE.is_match(trimmed) {
        return Err(InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| InvalidDate(value.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Next period boundary strictly after `date`.
///
/// Weeks end on Sunday, months on their last day, years on Dec 31. `None`
/// only when the boundary falls outside the representable calendar.
pub fn next_boundary(date: NaiveDate, granularity: Granularity) -> Option<NaiveDate> {
    match granularity {
        Granularity::Days => date.succ_opt(),
        Granularity::Weeks => {
            let to_sunday = 6 - u64::from(date.weekday().num_days_from_monday());
            let step = if to_sunday == 0 { 7 } else { to_sunday };
            date.checked_add_days(Days::new(step))
        }
        Granularity::Months => {
            let end = month_end(date.year(), date.month())?;
            if end > date {
                return Some(end);
            }
            let (year, month) = if date.month() == 12 {
                (date.year() + 1, 1)
            } else {
                (date.year(), date.month() + 1)
            };
            month_end(year, month)
        }
        Granularity::Years => {
            let end = NaiveDate::from_ymd_opt(date.year(), 12, 31)?;
            if end > date {
                Some(end)
            } else {
                NaiveDate::from_ymd_opt(date.year() + 1, 12, 31)
            }
        }
    }
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: &str) -> NaiveDate {
        parse_date(value).unwrap()
    }

    #[test]
    fn parses_only_canonical_dates() {
        assert_eq!(d("2025-03-04"), NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert!(parse_date("2025-3-4").is_err());
        assert!(parse_date("04/03/2025").is_err());
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("").is_err());
        assert_eq!(format_date(d(" 2025-12-01 ")), "2025-12-01");
    }

    #[test]
    fn weeks_end_on_sunday() {
        // 2025-01-01 is a Wednesday.
        assert_eq!(next_boundary(d("2025-01-01"), Granularity::Weeks), Some(d("2025-01-05")));
        // Already Sunday: a full week later.
        assert_eq!(next_boundary(d("2025-01-05"), Granularity::Weeks), Some(d("2025-01-12")));
        assert_eq!(next_boundary(d("2025-01-04"), Granularity::Weeks), Some(d("2025-01-05")));
    }

    #[test]
    fn months_roll_on_last_day() {
        assert_eq!(next_boundary(d("2025-01-15"), Granularity::Months), Some(d("2025-01-31")));
        assert_eq!(next_boundary(d("2025-01-31"), Granularity::Months), Some(d("2025-02-28")));
        assert_eq!(next_boundary(d("2024-01-31"), Granularity::Months), Some(d("2024-02-29")));
        assert_eq!(next_boundary(d("2025-12-31"), Granularity::Months), Some(d("2026-01-31")));
    }

    #[test]
    fn years_roll_on_dec_31() {
        assert_eq!(next_boundary(d("2025-06-01"), Granularity::Years), Some(d("2025-12-31")));
        assert_eq!(next_boundary(d("2025-12-31"), Granularity::Years), Some(d("2026-12-31")));
    }

    #[test]
    fn days_step_by_one() {
        assert_eq!(next_boundary(d("2025-02-28"), Granularity::Days), Some(d("2025-03-01")));
    }

    #[test]
    fn boundaries_are_strictly_increasing() {
        let granularities = [
            Granularity::Days,
            Granularity::Weeks,
            Granularity::Months,
            Granularity::Years,
        ];
        let mut date = d("2023-12-25");
        let end = d("2025-01-10");
        while date <= end {
            for granularity in granularities {
                let next = next_boundary(date, granularity).unwrap();
                assert!(next > date, "{granularity:?} did not advance from {date}");
            }
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn calendar_overflow_is_none() {
        assert_eq!(next_boundary(NaiveDate::MAX, Granularity::Days), None);
        assert_eq!(next_boundary(NaiveDate::MAX, Granularity::Years), None);
    }

    #[test]
    fn day_difference_is_signed() {
        assert_eq!(days_between(d("2025-01-01"), d("2025-01-31")), 30);
        assert_eq!(days_between(d("2025-01-31"), d("2025-01-01")), -30);
    }
}
