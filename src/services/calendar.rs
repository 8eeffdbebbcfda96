//! Exchange trading calendar.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc, Weekday};

/// Answers whether the exchange is open on a given local date.
pub trait TradingCalendar: Send + Sync {
    fn is_trading_day(&self, date: NaiveDate) -> bool;

    /// Exchange-local date for a UTC instant.
    fn exchange_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.date_naive()
    }
}

/// NYSE full-day closures. Early closes count as trading days.
#[derive(Debug, Default, Clone, Copy)]
pub struct NyseCalendar;

impl NyseCalendar {
    /// Observed full-day holidays for `year`, ascending.
    pub fn holidays(year: i32) -> Vec<NaiveDate> {
        let mut days = Vec::with_capacity(10);

        // A Saturday New Year's Day is not moved back into the previous year.
        if let Some(new_year) = NaiveDate::from_ymd_opt(year, 1, 1) {
            match new_year.weekday() {
                Weekday::Sat => {}
                _ => days.push(observed(new_year)),
            }
        }
        days.extend(nth_weekday(year, 1, Weekday::Mon, 3));
        days.extend(nth_weekday(year, 2, Weekday::Mon, 3));
        if let Some(easter) = easter_sunday(year) {
            days.push(easter - Duration::days(2));
        }
        days.extend(last_weekday(year, 5, Weekday::Mon));
        if year >= 2022 {
            days.extend(NaiveDate::from_ymd_opt(year, 6, 19).map(observed));
        }
        days.extend(NaiveDate::from_ymd_opt(year, 7, 4).map(observed));
        days.extend(nth_weekday(year, 9, Weekday::Mon, 1));
        days.extend(nth_weekday(year, 11, Weekday::Thu, 4));
        days.extend(NaiveDate::from_ymd_opt(year, 12, 25).map(observed));

        days.sort();
        days
    }

    pub fn is_holiday(date: NaiveDate) -> bool {
        Self::holidays(date.year()).contains(&date)
    }
}

impl TradingCalendar for NyseCalendar {
    fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !Self::is_holiday(date)
    }

    fn exchange_date(&self, now: DateTime<Utc>) -> NaiveDate {
        let offset_hours = if is_us_dst(now) { -4 } else { -5 };
        match FixedOffset::east_opt(offset_hours * 3600) {
            Some(tz) => now.with_timezone(&tz).date_naive(),
            None => now.date_naive(),
        }
    }
}

fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    nth_weekday(year, month, weekday, 5).or_else(|| nth_weekday(year, month, weekday, 4))
}

/// Gregorian Easter (anonymous computus).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// US daylight saving: second Sunday of March 07:00 UTC to first Sunday of
/// November 06:00 UTC.
fn is_us_dst(now: DateTime<Utc>) -> bool {
    let year = now.year();
    let start = nth_weekday(year, 3, Weekday::Sun, 2)
        .and_then(|d| d.and_hms_opt(7, 0, 0))
        .map(|t| Utc.from_utc_datetime(&t));
    let end = nth_weekday(year, 11, Weekday::Sun, 1)
        .and_then(|d| d.and_hms_opt(6, 0, 0))
        .map(|t| Utc.from_utc_datetime(&t));
    match (start, end) {
        (Some(start), Some(end)) => now >= start && now < end,
        _ => false,
    }
}
