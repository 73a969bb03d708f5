//! Scalar decoders for header fields and transaction columns.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use crate::error::ParseError;

/// Parses a base-10 signed 64-bit integer.
///
/// Surrounding whitespace is ignored, so `" 5 "` reads as 5.
pub(crate) fn parse_integer(field: &str, raw: &str) -> Result<i64, ParseError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|source| ParseError::InvalidInteger {
            field: field.to_owned(),
            value: raw.to_owned(),
            source,
        })
}

/// Parses an exact decimal with `.` as separator, keeping the input scale.
///
/// Only an optional sign, digits and a single decimal point are accepted,
/// after surrounding whitespace is dropped. Exponents (`1e5`) and bare
/// fractions (`.5`) are rejected; the server never sends either.
pub(crate) fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, ParseError> {
    let invalid = |reason: String| ParseError::InvalidDecimal {
        field: field.to_owned(),
        value: raw.to_owned(),
        reason,
    };
    let text = raw.trim();
    let unsigned = text
        .strip_prefix(['-', '+'])
        .unwrap_or(text);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "0"));
    let is_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(whole) || !is_digits(fraction) {
        return Err(invalid("expected digits with an optional '.' separator".to_owned()));
    }
    Decimal::from_str_exact(text).map_err(|err| invalid(err.to_string()))
}

/// Parses a date field in the `YYYY-MM-DD±HH:MM` grammar.
pub(crate) fn parse_date(field: &str, raw: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    parse_offset_date(raw.trim()).map_err(|reason| ParseError::InvalidDate {
        field: field.to_owned(),
        value: raw.to_owned(),
        reason,
    })
}

/// Parses `YYYY-MM-DD` immediately followed by a signed `HH:MM` offset,
/// e.g. `2017-01-01+01:00`.
///
/// The result is local midnight of that date in the given fixed offset.
pub(crate) fn parse_offset_date(raw: &str) -> Result<DateTime<FixedOffset>, &'static str> {
    // The offset holds no sign of its own, so the last sign starts it.
    let split = raw.rfind(['+', '-']).ok_or("missing UTC offset")?;
    let (date_part, offset_part) = raw.split_at(split);
    let date = parse_calendar_date(date_part)?;
    let offset = parse_utc_offset(offset_part)?;
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(offset)
        .single()
        .ok_or("date out of range")
}

/// Parses the `YYYY-MM-DD` part.
fn parse_calendar_date(raw: &str) -> Result<NaiveDate, &'static str> {
    const EXPECTED: &str = "expected a YYYY-MM-DD date";
    let mut parts = raw.split('-');
    let (Some(year_text), Some(month_text), Some(day_text), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(EXPECTED);
    };
    let year = fixed_digits::<i32>(year_text, 4).ok_or(EXPECTED)?;
    let month = fixed_digits::<u32>(month_text, 2).ok_or(EXPECTED)?;
    let day = fixed_digits::<u32>(day_text, 2).ok_or(EXPECTED)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or("no such calendar date")
}

/// Parses the `±HH:MM` part.
fn parse_utc_offset(raw: &str) -> Result<FixedOffset, &'static str> {
    const EXPECTED: &str = "expected a ±HH:MM offset";
    let (sign, rest) = if let Some(rest) = raw.strip_prefix('+') {
        (1_i32, rest)
    } else if let Some(rest) = raw.strip_prefix('-') {
        (-1_i32, rest)
    } else {
        return Err(EXPECTED);
    };
    let (hours_text, minutes_text) = rest.split_once(':').ok_or(EXPECTED)?;
    let hours = fixed_digits::<i32>(hours_text, 2).ok_or(EXPECTED)?;
    let minutes = fixed_digits::<i32>(minutes_text, 2).ok_or(EXPECTED)?;
    if hours > 23 || minutes > 59 {
        return Err("offset out of range");
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or("offset out of range")
}

/// Parses exactly `len` ASCII digits.
fn fixed_digits<T: core::str::FromStr>(raw: &str, len: usize) -> Option<T> {
    if raw.len() != len || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike as _, TimeZone as _, Timelike as _, Utc};

    use super::*;

    fn offset_hours(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    #[test]
    fn date_with_positive_offset() {
        let date = parse_offset_date("2017-01-01+01:00").unwrap();
        assert_eq!(
            date,
            offset_hours(1).with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(date.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn date_equals_same_instant_in_utc() {
        let date = parse_offset_date("2017-01-01+01:00").unwrap();
        let utc = Utc.with_ymd_and_hms(2016, 12, 31, 23, 0, 0).unwrap();
        assert_eq!(date, utc);
        assert_eq!(date.with_timezone(&Utc), utc);
    }

    #[test]
    fn date_at_utc_midnight_compares_by_instant() {
        let zero = parse_offset_date("2017-01-01+00:00").unwrap();
        let utc = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(zero, utc);
    }

    #[test]
    fn date_keeps_wall_clock_in_its_offset() {
        let date = parse_offset_date("2017-04-11+02:00").unwrap();
        assert_eq!(date.day(), 11);
        assert_eq!(date.hour(), 0);
        assert_eq!(date.naive_utc().day(), 10);
    }

    #[test]
    fn date_with_negative_offset() {
        let date = parse_offset_date("2017-01-01-05:00").unwrap();
        assert_eq!(date.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(date.with_timezone(&Utc).hour(), 5);
    }

    #[test]
    fn date_with_non_zero_offset_minutes() {
        let date = parse_offset_date("2020-02-29+05:45").unwrap();
        assert_eq!(date.offset().local_minus_utc(), 5 * 3600 + 45 * 60);
        let utc = date.with_timezone(&Utc);
        assert_eq!((utc.day(), utc.hour(), utc.minute()), (28, 18, 15));
    }

    #[test]
    fn date_rejects_missing_offset() {
        assert!(parse_offset_date("2017-01-01").is_err());
        assert!(parse_offset_date("20170101").is_err());
    }

    #[test]
    fn date_rejects_bad_parts() {
        assert!(parse_offset_date("2017-13-01+01:00").is_err());
        assert!(parse_offset_date("2017-02-30+01:00").is_err());
        assert!(parse_offset_date("2017-1-01+01:00").is_err());
        assert!(parse_offset_date("2017-01-01+1:00").is_err());
        assert!(parse_offset_date("2017-01-01+24:00").is_err());
        assert!(parse_offset_date("2017-01-01+01:60").is_err());
        assert!(parse_offset_date("2017-01-01T00:00:00Z").is_err());
    }

    #[test]
    fn date_error_names_field() {
        let err = parse_date("dateStart", "yesterday").unwrap_err();
        assert!(err.to_string().contains("dateStart"));
    }

    #[test]
    fn decimal_keeps_exact_text() {
        let amount = parse_decimal("column_1", "45.97").unwrap();
        assert_eq!(amount.to_string(), "45.97");
        assert_eq!(parse_decimal("openingBalance", "0.00").unwrap().to_string(), "0.00");
    }

    #[test]
    fn decimal_accepts_sign() {
        assert_eq!(parse_decimal("column_1", "-1500.5").unwrap().to_string(), "-1500.5");
        assert_eq!(parse_decimal("column_1", "+3").unwrap(), Decimal::from(3));
    }

    #[test]
    fn decimal_rejects_non_numeric() {
        for raw in ["", "abc", "1,5", "1.2.3", "1e5", ".5", "5.", "--1", "1_000"] {
            let err = parse_decimal("column_1", raw).unwrap_err();
            assert!(matches!(err, ParseError::InvalidDecimal { .. }), "{raw}");
        }
    }

    #[test]
    fn scalars_ignore_surrounding_whitespace() {
        assert_eq!(parse_integer("idFrom", " 5 ").unwrap(), 5);
        assert_eq!(parse_decimal("column_1", "\n  45.97 ").unwrap().to_string(), "45.97");
    }

    #[test]
    fn integer_parses_large_ids() {
        assert_eq!(parse_integer("column_22", "13926601410").unwrap(), 13_926_601_410);
        assert!(parse_integer("column_22", "12.5").is_err());
    }
}
