use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// `[date 00:00:00, date 23:59:59]`
pub(crate) fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    let end = date.and_hms_opt(23, 59, 59).unwrap_or(start);
    (start, end)
}

/// Jours de `start` à `end` inclus, dans l'ordre croissant.
pub(crate) fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

pub(crate) fn span_days(start: NaiveDate, end: NaiveDate) -> i64 {
    end.signed_duration_since(start).num_days() + 1
}

pub(crate) fn day_of_week(date: NaiveDate) -> (u32, &'static str) {
    let weekday = date.weekday();
    let name = match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    };
    (weekday.number_from_monday(), name)
}
