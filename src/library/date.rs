use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{
    error::FeelError,
    library::core::{EvalResult, arity_mismatch, exact_args, has_null},
    util::num::{decimal_to_i32_checked, decimal_to_u32_checked},
    value::{
        core::Value,
        duration::Duration,
        temporal::{ZonedDateTime, parse_date},
    },
};

/// Converts to a date or builds one from its fields.
///
/// Accepts:
/// - `date(literal)`: parses `yyyy-mm-dd`.
/// - `date(date)`: returns the date unchanged.
/// - `date(dateAndTime)`: keeps the local date and drops the time.
/// - `date(year, month, day)`: builds the date, rejecting impossible days.
///
/// # Errors
/// - [`FeelError::InvalidLiteral`] for a malformed literal.
/// - [`FeelError::InvalidArgument`] for an impossible calendar date.
///
/// # Example
/// ```
/// use feelib::{Value, library::date::date};
///
/// let d = date(&[Value::from(2024), Value::from(2), Value::from(29)]).unwrap();
/// assert_eq!(d, date(&[Value::from("2024-02-29")]).unwrap());
///
/// assert!(date(&[Value::from(2023), Value::from(2), Value::from(29)]).is_err());
/// ```
pub fn date(args: &[Value]) -> EvalResult<Value> {
    if has_null(args) {
        return Ok(Value::Null);
    }

    match args {
        [Value::String(literal)] => Ok(Value::from(parse_date(literal)?)),
        [Value::Date(d)] => Ok(Value::from(*d)),
        [Value::DateTime(dt)] => Ok(Value::from(dt.date())),
        [other] => Err(other.type_error("string, date or date and time")),
        [year, month, day] => {
            let year = decimal_to_i32_checked(year.as_number()?)?;
            let month = decimal_to_u32_checked(month.as_number()?)?;
            let day = decimal_to_u32_checked(day.as_number()?)?;
            NaiveDate::from_ymd_opt(year, month, day).map(Value::from)
                                                     .ok_or_else(|| {
                                                         FeelError::invalid_argument(format!("{year}-{month}-{day} is not a calendar date"))
                                                     })
        },
        _ => Err(arity_mismatch("1 or 3", args.len())),
    }
}

/// Converts to a date and time, or combines a date with a time.
///
/// `dateAndTime(literal)` accepts a date-time with an optional `Z`, numeric
/// offset, `@Zone/Id` or `[Zone/Id]` suffix, or a bare date meaning
/// midnight. Without an offset or zone, UTC is assumed. A named zone is
/// resolved to the offset in force at that local time.
///
/// `dateAndTime(date, time)` first moves the time to UTC, wrapping around
/// midnight without changing the date, and then places it on the date at UTC.
/// A date and time in the first position contributes its date.
///
/// # Example
/// ```
/// use feelib::{Value, library::{date::date_and_time, time::time}};
///
/// let day = Value::from(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
/// let ten = time(&[Value::from("12:00:00+02:00")]).unwrap();
///
/// let combined = date_and_time(&[day, ten]).unwrap();
/// assert_eq!(combined, date_and_time(&[Value::from("2024-01-01T10:00:00Z")]).unwrap());
/// ```
pub fn date_and_time(args: &[Value]) -> EvalResult<Value> {
    if has_null(args) {
        return Ok(Value::Null);
    }

    match args {
        [Value::String(literal)] => Ok(Value::from(ZonedDateTime::parse(literal)?)),
        [Value::DateTime(dt)] => Ok(Value::from(*dt)),
        [Value::Date(d)] => Ok(Value::from(ZonedDateTime::at_utc(d.and_time(NaiveTime::MIN))?)),
        [other] => Err(other.type_error("string, date or date and time")),
        [day, Value::Time(t)] => {
            let day = match day {
                Value::Date(d) => *d,
                Value::DateTime(dt) => dt.date(),
                other => return Err(other.type_error("date")),
            };
            Ok(Value::from(ZonedDateTime::at_utc(NaiveDateTime::new(day, t.to_utc()))?))
        },
        [_, other] => Err(other.type_error("time")),
        _ => Err(arity_mismatch("1 or 2", args.len())),
    }
}

/// Projects the local date out of a date or date-time.
fn local_date(value: &Value) -> EvalResult<NaiveDate> {
    match value {
        Value::Date(d) => Ok(*d),
        Value::DateTime(dt) => Ok(dt.date()),
        other => Err(other.type_error("date or date and time")),
    }
}

fn date_field(args: &[Value], field: fn(&NaiveDate) -> i64) -> EvalResult<Value> {
    match exact_args::<1>(args)? {
        [Value::Null] => Ok(Value::Null),
        [value] => Ok(Value::from(field(&local_date(value)?))),
    }
}

/// Returns the year of a date or date-time.
pub fn year(args: &[Value]) -> EvalResult<Value> {
    date_field(args, |d| i64::from(d.year()))
}

/// Returns the month (1 to 12) of a date or date-time.
pub fn month(args: &[Value]) -> EvalResult<Value> {
    date_field(args, |d| i64::from(d.month()))
}

/// Returns the day of the month of a date or date-time.
pub fn day(args: &[Value]) -> EvalResult<Value> {
    date_field(args, |d| i64::from(d.day()))
}

/// Local date-time used for calendar arithmetic; dates count from midnight.
fn local_date_time(value: &Value) -> EvalResult<NaiveDateTime> {
    match value {
        Value::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
        Value::DateTime(dt) => Ok(dt.local()),
        other => Err(other.type_error("date or date and time")),
    }
}

/// Computes the whole years and months between two dates or date-times.
///
/// The result counts calendar months: the difference of the `(year, month)`
/// fields, minus one when the day and time of `to` have not yet reached those
/// of `from`. It is a year-month duration and is negative when `to` precedes
/// `from`.
///
/// # Example
/// ```
/// use feelib::{Value, library::date::years_and_months_duration};
///
/// let from = Value::from(chrono::NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
/// let to = Value::from(chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
///
/// let d = years_and_months_duration(&[from, to]).unwrap();
/// assert_eq!(d.to_string(), "P1Y1M");
/// ```
pub fn years_and_months_duration(args: &[Value]) -> EvalResult<Value> {
    let [from, to] = exact_args::<2>(args)?;
    if has_null(args) {
        return Ok(Value::Null);
    }
    let from = local_date_time(from)?;
    let to = local_date_time(to)?;

    let month_index = |dt: &NaiveDateTime| i64::from(dt.year()) * 12 + i64::from(dt.month0());
    let remainder = |dt: &NaiveDateTime| (dt.day(), dt.time());

    let mut months = month_index(&to) - month_index(&from);
    if months > 0 && remainder(&to) < remainder(&from) {
        months -= 1;
    } else if months < 0 && remainder(&to) > remainder(&from) {
        months += 1;
    }

    Ok(Value::from(Duration::YearMonth { months }))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn d(literal: &str) -> Value {
        Value::from(parse_date(literal).unwrap())
    }

    fn dt(literal: &str) -> Value {
        Value::from(ZonedDateTime::parse(literal).unwrap())
    }

    #[rstest]
    #[case("2024-01-31", "2024-03-01", "P1M")]
    #[case("2024-01-31", "2024-02-29", "P0M")]
    #[case("2024-01-15", "2024-01-15", "P0M")]
    #[case("2020-02-29", "2024-02-29", "P4Y")]
    #[case("2024-03-01", "2024-01-31", "-P1M")]
    #[case("2024-05-10", "2023-02-10", "-P1Y3M")]
    fn calendar_months_between_dates(#[case] from: &str, #[case] to: &str, #[case] expected: &str) {
        let result = years_and_months_duration(&[d(from), d(to)]).unwrap();
        assert_eq!(result.to_string(), expected);
    }

    #[test]
    fn time_of_day_counts_towards_the_remainder() {
        let from = dt("2024-01-15T12:00:00Z");

        let before = years_and_months_duration(&[from.clone(), dt("2024-02-15T11:59:59Z")]).unwrap();
        let after = years_and_months_duration(&[from, dt("2024-02-15T12:00:00Z")]).unwrap();

        assert_eq!(before.to_string(), "P0M");
        assert_eq!(after.to_string(), "P1M");
    }

    #[test]
    fn date_truncates_date_time() {
        assert_eq!(date(&[dt("2024-06-30T23:30:00-05:00")]).unwrap(), d("2024-06-30"));
    }

    #[rstest]
    #[case("2024-02-30")]
    #[case("")]
    #[case("2024-1-5")]
    #[case("+2024-01-05")]
    #[case("2024-01-05 ")]
    #[case("24-01-05")]
    #[case("2024/01/05")]
    fn rejects_bad_literals(#[case] literal: &str) {
        assert!(date(&[Value::from(literal)]).is_err());
    }

    #[test]
    fn combining_normalizes_time_to_utc_within_the_day() {
        let t = Value::from(crate::value::temporal::OffsetTime::parse("01:00:00+02:00").unwrap());
        let combined = date_and_time(&[d("2024-01-02"), t]).unwrap();

        assert_eq!(combined.to_string(), "2024-01-02T23:00:00Z");
    }

    #[test]
    fn extended_years_need_a_sign_and_more_than_four_digits() {
        assert_eq!(date(&[Value::from("-0044-03-15")]).unwrap().to_string(), "-0044-03-15");
        assert_eq!(year(&[date(&[Value::from("+12024-01-01")]).unwrap()]).unwrap(), Value::from(12024));
    }

    #[test]
    fn wrong_argument_counts_are_errors() {
        assert!(matches!(year(&[]), Err(FeelError::ArgumentCountMismatch { .. })));
        assert!(matches!(years_and_months_duration(&[d("2024-01-01")]),
                         Err(FeelError::ArgumentCountMismatch { .. })));
        assert!(matches!(date(&[Value::from(2024), Value::from(1)]), Err(FeelError::ArgumentCountMismatch { .. })));
    }

    #[test]
    fn fields_of_dates_and_date_times() {
        assert_eq!(year(&[d("2024-02-29")]).unwrap(), Value::from(2024));
        assert_eq!(month(&[dt("2024-02-29T10:00:00@Europe/Paris")]).unwrap(), Value::from(2));
        assert_eq!(day(&[Value::Null]).unwrap(), Value::Null);
        assert!(day(&[Value::from("2024-02-29")]).is_err());
    }
}
