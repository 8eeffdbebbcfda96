//! Unit tests for the NYSE calendar

use chrono::{NaiveDate, TimeZone, Utc};
use radar::services::calendar::{easter_sunday, NyseCalendar, TradingCalendar};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_holidays_2024() {
    let expected = vec![
        date(2024, 1, 1),
        date(2024, 1, 15),
        date(2024, 2, 19),
        date(2024, 3, 29),
        date(2024, 5, 27),
        date(2024, 6, 19),
        date(2024, 7, 4),
        date(2024, 9, 2),
        date(2024, 11, 28),
        date(2024, 12, 25),
    ];
    assert_eq!(NyseCalendar::holidays(2024), expected);
}

#[test]
fn test_weekend_observance() {
    let calendar = NyseCalendar;
    // Sunday July 4th 2021 observed Monday.
    assert!(!calendar.is_trading_day(date(2021, 7, 5)));
    // Saturday July 4th 2026 observed Friday.
    assert!(!calendar.is_trading_day(date(2026, 7, 3)));
    // Sunday Christmas 2022 observed Monday.
    assert!(!calendar.is_trading_day(date(2022, 12, 26)));
}

#[test]
fn test_saturday_new_year_not_observed() {
    // 2022-01-01 was a Saturday; Friday 2021-12-31 stayed open.
    assert!(NyseCalendar.is_trading_day(date(2021, 12, 31)));
    assert!(!NyseCalendar::holidays(2022).contains(&date(2021, 12, 31)));
}

#[test]
fn test_juneteenth_from_2022() {
    assert!(NyseCalendar.is_trading_day(date(2021, 6, 18)));
    // 2022-06-19 was a Sunday.
    assert!(!NyseCalendar.is_trading_day(date(2022, 6, 20)));
}

#[test]
fn test_weekends_closed() {
    assert!(!NyseCalendar.is_trading_day(date(2024, 6, 15)));
    assert!(!NyseCalendar.is_trading_day(date(2024, 6, 16)));
    assert!(NyseCalendar.is_trading_day(date(2024, 6, 17)));
}

#[test]
fn test_easter() {
    assert_eq!(easter_sunday(2000), Some(date(2000, 4, 23)));
    assert_eq!(easter_sunday(2024), Some(date(2024, 3, 31)));
    assert_eq!(easter_sunday(2025), Some(date(2025, 4, 20)));
    assert_eq!(easter_sunday(2026), Some(date(2026, 4, 5)));
}

#[test]
fn test_exchange_date_tracks_us_eastern() {
    let calendar = NyseCalendar;
    // EDT (UTC-4)
    let summer = Utc.with_ymd_and_hms(2024, 7, 2, 2, 0, 0).unwrap();
    assert_eq!(calendar.exchange_date(summer), date(2024, 7, 1));
    // EST (UTC-5)
    let winter_late = Utc.with_ymd_and_hms(2024, 1, 10, 4, 30, 0).unwrap();
    assert_eq!(calendar.exchange_date(winter_late), date(2024, 1, 9));
    let winter = Utc.with_ymd_and_hms(2024, 1, 10, 5, 30, 0).unwrap();
    assert_eq!(calendar.exchange_date(winter), date(2024, 1, 10));
}
