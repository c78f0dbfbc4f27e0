use chrono::{FixedOffset, NaiveTime, Timelike};

use crate::{
    error::FeelError,
    library::core::{EvalResult, arity_mismatch, exact_args, has_null},
    util::num::{decimal_to_u32_checked, split_seconds},
    value::{
        core::Value,
        duration::Duration,
        temporal::{OffsetTime, utc},
    },
};

/// Largest UTC offset, in hours, that a time may carry.
const MAX_OFFSET_HOURS: i64 = 18;

/// Converts to a time or builds one from its fields.
///
/// Accepts:
/// - `time(literal)`: parses `hh:mm[:ss[.f]]` with an optional `Z` or
///   `±hh:mm`; UTC is assumed without one.
/// - `time(time)`: returns the time unchanged.
/// - `time(dateAndTime)`: the local time of day with its offset.
/// - `time(hour, minute, second)`: a UTC time; `second` may be fractional.
/// - `time(hour, minute, second, offset)`: `offset` is a days-and-time
///   duration of whole minutes giving the UTC offset.
///
/// # Errors
/// - [`FeelError::InvalidLiteral`] for a malformed literal, including one with
///   a named zone.
/// - [`FeelError::InvalidArgument`] for out-of-range fields, offsets beyond
///   ±18 hours or offsets with a seconds part.
///
/// # Example
/// ```
/// use feelib::{
///     Value,
///     library::{duration::duration, time::time},
/// };
///
/// let offset = duration(&[Value::from("-PT5H30M")]).unwrap();
/// let t = time(&[Value::from(9), Value::from(15), Value::from(0), offset]).unwrap();
///
/// assert_eq!(t.to_string(), "09:15:00-05:30");
/// assert_eq!(t, time(&[Value::from("09:15:00-05:30")]).unwrap());
/// ```
pub fn time(args: &[Value]) -> EvalResult<Value> {
    if has_null(args) {
        return Ok(Value::Null);
    }

    match args {
        [Value::String(literal)] => Ok(Value::from(OffsetTime::parse(literal)?)),
        [Value::Time(t)] => Ok(Value::from(*t)),
        [Value::DateTime(dt)] => Ok(Value::from(dt.time())),
        [other] => Err(other.type_error("string, time or date and time")),
        [hour, minute, second] => Ok(Value::from(OffsetTime::new(clock(hour, minute, second)?, utc()))),
        [hour, minute, second, offset] => {
            let offset = offset_from_duration(offset.as_duration()?)?;
            Ok(Value::from(OffsetTime::new(clock(hour, minute, second)?, offset)))
        },
        _ => Err(arity_mismatch("1 or 3 or 4", args.len())),
    }
}

fn clock(hour: &Value, minute: &Value, second: &Value) -> EvalResult<NaiveTime> {
    let hour = decimal_to_u32_checked(hour.as_number()?)?;
    let minute = decimal_to_u32_checked(minute.as_number()?)?;
    let (second, nano) = split_seconds(second.as_number()?)?;

    NaiveTime::from_hms_nano_opt(hour, minute, second, nano).ok_or_else(|| {
        FeelError::invalid_argument(format!("{hour:02}:{minute:02}:{second:02} is not a time of day"))
    })
}

fn offset_from_duration(offset: &Duration) -> EvalResult<FixedOffset> {
    let Duration::DayTime(delta) = offset else {
        return Err(FeelError::TypeError { expected: "days and time duration",
                                          found:    "years and months duration", });
    };
    let seconds = delta.num_seconds();
    if seconds % 60 != 0 || delta.subsec_nanos() != 0 {
        return Err(FeelError::invalid_argument(format!("offset {offset} is not a whole number of minutes")));
    }
    if seconds.abs() > MAX_OFFSET_HOURS * 3_600 {
        return Err(FeelError::invalid_argument(format!("offset {offset} exceeds {MAX_OFFSET_HOURS} hours")));
    }

    i32::try_from(seconds).ok()
                          .and_then(FixedOffset::east_opt)
                          .ok_or_else(|| FeelError::invalid_argument(format!("invalid offset {offset}")))
}

/// Projects the local time of day out of a time or date-time.
fn local_time(value: &Value) -> EvalResult<OffsetTime> {
    match value {
        Value::Time(t) => Ok(*t),
        Value::DateTime(dt) => Ok(dt.time()),
        other => Err(other.type_error("time or date and time")),
    }
}

fn time_field(args: &[Value], field: fn(&NaiveTime) -> u32) -> EvalResult<Value> {
    match exact_args::<1>(args)? {
        [Value::Null] => Ok(Value::Null),
        [value] => Ok(Value::from(i64::from(field(&local_time(value)?.time())))),
    }
}

/// Returns the hour of a time or date-time.
pub fn hour(args: &[Value]) -> EvalResult<Value> {
    time_field(args, |t| t.hour())
}

/// Returns the minute of a time or date-time.
pub fn minute(args: &[Value]) -> EvalResult<Value> {
    time_field(args, |t| t.minute())
}

/// Returns the whole seconds of a time or date-time.
pub fn second(args: &[Value]) -> EvalResult<Value> {
    time_field(args, |t| t.second())
}

/// Returns the UTC offset of a time or date-time as a days-and-time duration
/// (`timezone` and `time offset`).
///
/// Offsets are counted in whole minutes.
///
/// # Example
/// ```
/// use feelib::{Value, library::time::{time, timezone}};
///
/// let t = time(&[Value::from("10:00:00-03:30")]).unwrap();
/// assert_eq!(timezone(&[t]).unwrap().to_string(), "-PT3H30M");
/// ```
pub fn timezone(args: &[Value]) -> EvalResult<Value> {
    match exact_args::<1>(args)? {
        [Value::Null] => Ok(Value::Null),
        [value] => {
            let seconds = local_time(value)?.offset().local_minus_utc();
            Ok(Value::from(Duration::from_minutes(i64::from(seconds / 60))))
        },
    }
}
