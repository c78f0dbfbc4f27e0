use crate::{
    library::core::{EvalResult, exact_args},
    value::{core::Value, duration::Duration},
};

/// Converts an ISO-8601 duration literal into a duration.
///
/// Both kinds are accepted: `P1Y2M` gives a years-and-months duration and
/// `P1DT2H30.5S` a days-and-time duration. A blank literal is unknown and
/// yields `null`. A duration argument is returned unchanged.
///
/// # Errors
/// - [`crate::error::FeelError::InvalidLiteral`] for malformed text.
/// - [`crate::error::FeelError::MixedDuration`] for a literal that combines
///   year-month and day-time components.
///
/// # Example
/// ```
/// use feelib::{Value, library::duration::duration};
///
/// assert_eq!(duration(&[Value::from("P1Y14M")]).unwrap().to_string(), "P2Y2M");
/// assert_eq!(duration(&[Value::from("PT90M")]).unwrap().to_string(), "PT1H30M");
/// assert_eq!(duration(&[Value::from(" ")]).unwrap(), Value::Null);
/// assert!(duration(&[Value::from("P1YT1H")]).is_err());
/// ```
pub fn duration(args: &[Value]) -> EvalResult<Value> {
    match exact_args::<1>(args)? {
        [Value::Null] => Ok(Value::Null),
        [Value::Duration(d)] => Ok(Value::from(*d)),
        [Value::String(literal)] if literal.trim().is_empty() => Ok(Value::Null),
        [Value::String(literal)] => Ok(Value::from(Duration::parse(literal.trim())?)),
        [other] => Err(other.type_error("string or duration")),
    }
}

/// Applies a component accessor; a duration of the other kind has no such
/// component and yields `null`.
fn component<T>(args: &[Value], field: fn(&Duration) -> Option<T>) -> EvalResult<Value>
    where Value: From<T>
{
    match exact_args::<1>(args)? {
        [Value::Null] => Ok(Value::Null),
        [value] => Ok(field(value.as_duration()?).map_or(Value::Null, Value::from)),
    }
}

/// Whole years of a years-and-months duration.
///
/// # Example
/// ```
/// use feelib::{Value, library::duration::{duration, years}};
///
/// let d = duration(&[Value::from("-P2Y5M")]).unwrap();
/// assert_eq!(years(&[d]).unwrap(), Value::from(-2));
///
/// let d = duration(&[Value::from("P3D")]).unwrap();
/// assert_eq!(years(&[d]).unwrap(), Value::Null);
/// ```
pub fn years(args: &[Value]) -> EvalResult<Value> {
    component(args, Duration::years)
}

/// Months beyond whole years of a years-and-months duration.
pub fn months(args: &[Value]) -> EvalResult<Value> {
    component(args, Duration::months)
}

/// Whole days of a days-and-time duration.
pub fn days(args: &[Value]) -> EvalResult<Value> {
    component(args, Duration::days)
}

/// Hours beyond whole days of a days-and-time duration.
pub fn hours(args: &[Value]) -> EvalResult<Value> {
    component(args, Duration::hours)
}

/// Minutes beyond whole hours of a days-and-time duration.
pub fn minutes(args: &[Value]) -> EvalResult<Value> {
    component(args, Duration::minutes)
}

/// Seconds beyond whole minutes, fraction included.
pub fn seconds(args: &[Value]) -> EvalResult<Value> {
    component(args, Duration::seconds)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{error::FeelError, library::numeric::parse_decimal};

    fn d(literal: &str) -> Value {
        duration(&[Value::from(literal)]).unwrap()
    }

    #[rstest]
    #[case("P1DT25H", 2, 1, 0)]
    #[case("PT3725S", 0, 1, 2)]
    #[case("-P1DT2H3M", -1, -2, -3)]
    fn day_time_components(#[case] literal: &str, #[case] day: i64, #[case] hour: i64, #[case] minute: i64) {
        let value = d(literal);
        assert_eq!(days(&[value.clone()]).unwrap(), Value::from(day));
        assert_eq!(hours(&[value.clone()]).unwrap(), Value::from(hour));
        assert_eq!(minutes(&[value]).unwrap(), Value::from(minute));
    }

    #[test]
    fn fractional_seconds_survive() {
        assert_eq!(seconds(&[d("PT1M2.25S")]).unwrap(), Value::from(parse_decimal("2.25").unwrap()));
    }

    #[test]
    fn components_of_the_other_kind_are_null() {
        assert_eq!(months(&[d("PT1H")]).unwrap(), Value::Null);
        assert_eq!(hours(&[d("P1Y")]).unwrap(), Value::Null);
        assert_eq!(seconds(&[d("P1M")]).unwrap(), Value::Null);
    }

    #[test]
    fn year_month_split() {
        let value = d("P27M");
        assert_eq!(years(&[value.clone()]).unwrap(), Value::from(2));
        assert_eq!(months(&[value]).unwrap(), Value::from(3));
    }

    #[test]
    fn rejects_non_durations() {
        assert!(matches!(years(&[Value::from("P1Y")]), Err(FeelError::TypeError { .. })));
        assert!(matches!(duration(&[Value::from("P1YT1H")]), Err(FeelError::MixedDuration { .. })));
        assert!(duration(&[Value::from(5)]).is_err());
        assert!(matches!(seconds(&[]), Err(FeelError::ArgumentCountMismatch { .. })));
    }
}
