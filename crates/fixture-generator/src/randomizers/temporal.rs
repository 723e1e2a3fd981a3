//! Date and time value generators.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use fixture_core::Value;
use rand::Rng;
use std::time::Duration;

const SECONDS_PER_DAY: u32 = 86_400;

/// Longest generated duration, in seconds (30 days).
const MAX_DURATION_SECS: u64 = 30 * SECONDS_PER_DAY as u64;

/// Pick a date in `[start, end]`. An inverted range yields `start`.
pub fn random_date<R: Rng>(rng: &mut R, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let span = end.signed_duration_since(start).num_days();
    if span <= 0 {
        return start;
    }
    let offset = rng.gen_range(0..=span as u64);
    start.checked_add_days(Days::new(offset)).unwrap_or(start)
}

/// Pick a time of day with whole-second precision.
pub fn random_time<R: Rng>(rng: &mut R) -> NaiveTime {
    let secs = rng.gen_range(0..SECONDS_PER_DAY);
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or_default()
}

/// Pick a date-time whose date lies in `[start, end]`.
pub fn random_datetime<R: Rng>(rng: &mut R, start: NaiveDate, end: NaiveDate) -> NaiveDateTime {
    let date = random_date(rng, start, end);
    date.and_time(random_time(rng))
}

/// Generate a date in the given range.
pub fn generate_date<R: Rng>(rng: &mut R, range: (NaiveDate, NaiveDate)) -> Value {
    Value::Date(random_date(rng, range.0, range.1))
}

pub fn generate_time<R: Rng>(rng: &mut R) -> Value {
    Value::Time(random_time(rng))
}

/// Generate a date-time whose date lies in the given range.
pub fn generate_datetime<R: Rng>(rng: &mut R, range: (NaiveDate, NaiveDate)) -> Value {
    Value::DateTime(random_datetime(rng, range.0, range.1))
}

/// Generate a date-time in a random whole-hour UTC offset between -12:00
/// and +14:00.
pub fn generate_zoned_datetime<R: Rng>(rng: &mut R, range: (NaiveDate, NaiveDate)) -> Value {
    let utc = random_datetime(rng, range.0, range.1);
    let hours = rng.gen_range(-12..=14);
    let offset = FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix());
    Value::ZonedDateTime(DateTime::from_naive_utc_and_offset(utc, offset))
}

/// Generate a duration of up to 30 days with nanosecond precision.
pub fn generate_duration<R: Rng>(rng: &mut R) -> Value {
    let secs = rng.gen_range(0..=MAX_DURATION_SECS);
    let nanos = rng.gen_range(0..1_000_000_000);
    Value::Duration(Duration::new(secs, nanos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_generate_date_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let range = (ymd(2020, 1, 1), ymd(2024, 12, 31));

        for _ in 0..100 {
            if let Value::Date(date) = generate_date(&mut rng, range) {
                assert!(date >= range.0 && date <= range.1);
            } else {
                panic!("Expected Date value");
            }
        }
    }

    #[test]
    fn test_single_day_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let day = ymd(2021, 6, 15);
        assert_eq!(random_date(&mut rng, day, day), day);
        assert_eq!(random_date(&mut rng, day, ymd(2020, 1, 1)), day);
    }

    #[test]
    fn test_generate_datetime_years() {
        let mut rng = StdRng::seed_from_u64(42);
        let range = (ymd(2020, 1, 1), ymd(2022, 12, 31));

        if let Value::DateTime(dt) = generate_datetime(&mut rng, range) {
            assert!(dt.year() >= 2020 && dt.year() <= 2022);
        } else {
            panic!("Expected DateTime value");
        }
    }

    #[test]
    fn test_zoned_datetime_offset_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let range = (ymd(2000, 1, 1), ymd(2030, 12, 31));

        for _ in 0..50 {
            if let Value::ZonedDateTime(dt) = generate_zoned_datetime(&mut rng, range) {
                let offset = dt.offset().local_minus_utc();
                assert!((-12 * 3600..=14 * 3600).contains(&offset));
                assert_eq!(offset % 3600, 0);
            } else {
                panic!("Expected ZonedDateTime value");
            }
        }
    }

    #[test]
    fn test_zoned_datetime_deterministic() {
        let range = (ymd(2000, 1, 1), ymd(2030, 12, 31));
        let first = generate_zoned_datetime(&mut StdRng::seed_from_u64(9), range);
        let second = generate_zoned_datetime(&mut StdRng::seed_from_u64(9), range);
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_duration_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        if let Value::Duration(d) = generate_duration(&mut rng) {
            assert!(d.as_secs() <= MAX_DURATION_SECS);
        } else {
            panic!("Expected Duration value");
        }
    }
}
