use chrono::{NaiveDate, Weekday};
use chore_wheel::MonthCalendar;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn reference_is_normalized_to_first_of_month() {
    let calendar = MonthCalendar::new(d(2026, 10, 19), Weekday::Tue);
    assert_eq!(calendar.reference_month(), d(2026, 10, 1));
    assert_eq!(calendar.month_start(0), Some(d(2026, 10, 1)));
}

#[test]
fn labels_follow_month_offsets() {
    let calendar = MonthCalendar::new(d(2026, 10, 1), Weekday::Tue);
    assert_eq!(calendar.label(0), "October 2026");
    assert_eq!(calendar.label(3), "January 2027");
    assert_eq!(calendar.label(-1), "September 2026");
}

#[test]
fn week_dates_start_on_first_rotation_day() {
    let calendar = MonthCalendar::new(d(2026, 10, 1), Weekday::Tue);
    assert_eq!(
        calendar.week_dates(0),
        vec![d(2026, 10, 6), d(2026, 10, 13), d(2026, 10, 20), d(2026, 10, 27)]
    );
    assert_eq!(calendar.week_dates(1)[0], d(2026, 11, 3));
}

#[test]
fn rotation_day_on_the_first_counts() {
    let calendar = MonthCalendar::new(d(2026, 10, 1), Weekday::Thu);
    assert_eq!(calendar.week_dates(0)[0], d(2026, 10, 1));
}

#[test]
fn skip_dates_push_rotation_forward() {
    let calendar =
        MonthCalendar::new(d(2026, 10, 1), Weekday::Tue).with_skip_dates([d(2026, 10, 13)]);
    let dates = calendar.week_dates(0);
    assert_eq!(dates[1], d(2026, 10, 14));
    assert_eq!(dates[2], d(2026, 10, 20));

    let mut calendar = calendar;
    calendar.add_skip_date(d(2026, 10, 14));
    assert_eq!(calendar.week_dates(0)[1], d(2026, 10, 15));
    assert_eq!(calendar.skip_dates().count(), 2);
}

#[test]
fn out_of_range_offsets_degrade_gracefully() {
    let calendar = MonthCalendar::new(d(2026, 10, 1), Weekday::Tue);
    assert_eq!(calendar.month_start(i64::MAX), None);
    assert_eq!(calendar.label(i64::MAX), format!("month {}", i64::MAX));
    assert!(calendar.week_dates(i64::MAX).is_empty());
}
