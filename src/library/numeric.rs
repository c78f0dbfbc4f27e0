use std::cmp::Ordering;

use bigdecimal::{BigDecimal, RoundingMode, Zero};

use crate::{
    error::FeelError,
    library::core::{EvalResult, arity_mismatch, exact_args, has_null, variadic_items},
    util::num::{MAX_EXPONENT, decimal_to_i64_checked, to_working_precision, usize_to_decimal},
    value::core::Value,
};

/// Parses a decimal numeral such as `-12.50`, `.5` or `1.2e-3`.
///
/// Only the plain numeral grammar is accepted: an optional sign, digits with
/// at most one decimal point, and an optional exponent. Grouping characters,
/// whitespace and underscores are rejected. Digits beyond the working
/// precision are rounded half to even.
///
/// # Returns
/// - `Some(BigDecimal)`: The parsed number.
/// - `None`: The text is not a numeral or its exponent leaves the decimal
///   range.
///
/// # Example
/// ```
/// use feelib::library::numeric::parse_decimal;
///
/// assert_eq!(parse_decimal("-12.50").unwrap().to_plain_string(), "-12.5");
/// assert_eq!(parse_decimal("1.2e3").unwrap().to_plain_string(), "1200");
/// assert_eq!(parse_decimal(".5").unwrap().to_plain_string(), "0.5");
/// assert_eq!(parse_decimal("1_000"), None);
/// assert_eq!(parse_decimal("1e9999"), None);
/// assert_eq!(parse_decimal(""), None);
/// ```
#[must_use]
pub fn parse_decimal(text: &str) -> Option<BigDecimal> {
    let (sign, body) = match text.split_at_checked(1) {
        Some(("-", rest)) => ("-", rest),
        Some(("+", rest)) => ("", rest),
        _ => ("", text),
    };
    let (mantissa, exponent) = match body.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e.strip_prefix('+').unwrap_or(e))),
        None => (body, None),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int.is_empty() && frac.is_empty()) || !digits(int) || !digits(frac) {
        return None;
    }
    if let Some(e) = exponent {
        let unsigned = e.strip_prefix('-').unwrap_or(e);
        if unsigned.is_empty() || !digits(unsigned) || unsigned.parse::<u32>().is_err() {
            return None;
        }
    }

    let int = if int.is_empty() { "0" } else { int };
    let canonical = if frac.is_empty() {
        format!("{sign}{int}")
    } else {
        format!("{sign}{int}.{frac}")
    };

    let exact = match exponent {
        Some(e) => format!("{canonical}e{e}").parse().ok()?,
        None => canonical.parse().ok()?,
    };
    to_working_precision(&exact).ok()
}

/// Converts a string into a number.
///
/// Accepts one or three arguments:
/// - `number(from)` parses a plain numeral.
/// - `number(from, groupingSeparator, decimalSeparator)` first splits `from`
///   on the decimal separator (at most once), strips every grouping separator
///   from the integer part and then parses the result.
///
/// A blank `from` or an unknown separator yields `null` without an error.
///
/// # Parameters
/// - `args`: `[from]` or `[from, groupingSeparator, decimalSeparator]`.
///
/// # Returns
/// `Value::Number` on success.
///
/// # Errors
/// - [`FeelError::InvalidLiteral`] if the text is not a numeral or holds the
///   decimal separator more than once.
/// - [`FeelError::TypeError`] if an argument is not a string.
/// - [`FeelError::ArgumentCountMismatch`] for two or more than three arguments.
///
/// # Example
/// ```
/// use feelib::{Value, library::numeric::number};
///
/// let n = number(&[Value::from("1.000.000,01"), Value::from("."), Value::from(",")]).unwrap();
/// assert_eq!(n.to_string(), "1000000.01");
///
/// assert!(number(&[Value::from("not-a-number")]).is_err());
/// ```
pub fn number(args: &[Value]) -> EvalResult<Value> {
    let (from, separators) = match args {
        [from] => (from, None),
        [from, grouping, separator] => (from, Some((grouping, separator))),
        _ => return Err(arity_mismatch("1 or 3", args.len())),
    };
    if from.is_null() || from.as_str()?.trim().is_empty() || has_null(args) {
        return Ok(Value::Null);
    }
    let from = from.as_str()?;

    let literal = match separators {
        Some((grouping, separator)) => {
            let (grouping, separator) = (grouping.as_str()?, separator.as_str()?);
            if separator.is_empty() {
                return Err(FeelError::invalid_argument("decimal separator must not be empty"));
            }
            let parts = from.split(separator).collect::<Vec<_>>();
            let strip = |part: &str| {
                if grouping.is_empty() {
                    part.to_owned()
                } else {
                    part.replace(grouping, "")
                }
            };
            match parts.as_slice() {
                [whole] => strip(whole),
                [whole, fraction] => format!("{}.{fraction}", strip(whole)),
                _ => return Err(FeelError::invalid_literal("number", from)),
            }
        },
        None => from.to_owned(),
    };

    parse_decimal(&literal).map(Value::from)
                           .ok_or_else(|| FeelError::invalid_literal("number", from))
}

/// Rounds a number to `scale` fractional digits, half to even.
///
/// A negative scale rounds to tens, hundreds and so on. Scales beyond the
/// decimal range behave as their nearest bound: a very large scale keeps the
/// number as it is and a very negative one rounds it to zero.
///
/// # Example
/// ```
/// use feelib::{
///     Value,
///     library::numeric::{decimal, parse_decimal},
/// };
///
/// let r = decimal(&[Value::from(parse_decimal("2.5").unwrap()), Value::from(0)]).unwrap();
/// assert_eq!(r, Value::from(2));
///
/// let r = decimal(&[Value::from(1250), Value::from(-2)]).unwrap();
/// assert_eq!(r, Value::from(1200));
/// ```
pub fn decimal(args: &[Value]) -> EvalResult<Value> {
    let [n, scale] = exact_args::<2>(args)?;
    if has_null(args) {
        return Ok(Value::Null);
    }
    let n = n.as_number()?;
    let widest = MAX_EXPONENT + 1;
    let scale = decimal_to_i64_checked(scale.as_number()?)?.clamp(-widest, 2 * widest);

    let rounded = if scale >= 0 {
        n.with_scale_round(scale, RoundingMode::HalfEven)
    } else {
        let (digits, exponent) = n.as_bigint_and_exponent();
        let shifted = BigDecimal::new(digits, exponent - scale).with_scale_round(0, RoundingMode::HalfEven);
        let (quotient, exponent) = shifted.into_bigint_and_exponent();
        BigDecimal::new(quotient, exponent + scale)
    };

    Ok(Value::from(to_working_precision(&rounded)?))
}

/// Rounds a number down to the nearest integer.
///
/// # Example
/// ```
/// use feelib::{
///     Value,
///     library::numeric::{floor, parse_decimal},
/// };
///
/// assert_eq!(floor(&[Value::from(parse_decimal("-1.5").unwrap())]).unwrap(), Value::from(-2));
/// assert_eq!(floor(&[Value::Null]).unwrap(), Value::Null);
/// assert!(floor(&[]).is_err());
/// ```
pub fn floor(args: &[Value]) -> EvalResult<Value> {
    unary(args, |n| n.with_scale_round(0, RoundingMode::Floor))
}

/// Rounds a number up to the nearest integer.
pub fn ceiling(args: &[Value]) -> EvalResult<Value> {
    unary(args, |n| n.with_scale_round(0, RoundingMode::Ceiling))
}

/// Returns the absolute value of a number.
pub fn abs(args: &[Value]) -> EvalResult<Value> {
    unary(args, BigDecimal::abs)
}

fn unary(args: &[Value], op: fn(&BigDecimal) -> BigDecimal) -> EvalResult<Value> {
    match exact_args::<1>(args)? {
        [Value::Null] => Ok(Value::Null),
        [value] => Ok(Value::from(op(value.as_number()?))),
    }
}

/// Returns the remainder of a floored division: the result takes the sign of
/// the divisor.
///
/// # Errors
/// - [`FeelError::DivisionByZero`] if the divisor is zero.
///
/// # Example
/// ```
/// use feelib::{Value, library::numeric::modulo};
///
/// assert_eq!(modulo(&[Value::from(12), Value::from(5)]).unwrap(), Value::from(2));
/// assert_eq!(modulo(&[Value::from(-12), Value::from(5)]).unwrap(), Value::from(3));
/// assert_eq!(modulo(&[Value::from(12), Value::from(-5)]).unwrap(), Value::from(-3));
/// ```
pub fn modulo(args: &[Value]) -> EvalResult<Value> {
    let [dividend, divisor] = exact_args::<2>(args)?;
    if has_null(args) {
        return Ok(Value::Null);
    }
    let (dividend, divisor) = (dividend.as_number()?, divisor.as_number()?);
    if divisor.is_zero() {
        return Err(FeelError::DivisionByZero);
    }

    let zero = BigDecimal::zero();
    let remainder = dividend.clone() % divisor.clone();
    let floored = if !remainder.is_zero() && (remainder < zero) != (*divisor < zero) {
        remainder + divisor
    } else {
        remainder
    };

    Ok(Value::from(to_working_precision(&floored)?))
}

/// Implements `odd` (`want_odd == true`) and `even`.
///
/// # Errors
/// - [`FeelError::Fractional`] if the number is not an integer.
pub fn parity(args: &[Value], want_odd: bool) -> EvalResult<Value> {
    let n = match exact_args::<1>(args)? {
        [Value::Null] => return Ok(Value::Null),
        [value] => value.as_number()?,
    };
    if !n.is_integer() {
        return Err(FeelError::Fractional { value: n.clone() });
    }

    let odd = !(n.clone() % BigDecimal::from(2)).is_zero();
    Ok(Value::from(odd == want_odd))
}

/// The aggregate functions sharing the list-or-variadic calling convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// Smallest element.
    Min,
    /// Largest element.
    Max,
    /// Sum of the elements.
    Sum,
    /// Sum divided by the element count.
    Mean,
    /// Product of the elements.
    Product,
}

/// Applies an aggregate function.
///
/// A single list argument is aggregated as a whole. Any other arguments are
/// aggregated as if they had been passed inside one list. A `null` or empty
/// list yields `null`.
///
/// `min` and `max` work on any ordered kind (numbers, strings, dates, times,
/// date-times and same-kind durations) and keep the first of several equal
/// candidates. The other aggregates need numbers.
///
/// # Errors
/// - [`FeelError::TypeError`] if an element has the wrong kind, including a
///   `null` element.
/// - [`FeelError::Overflow`] if a running result's exponent leaves the
///   decimal range.
///
/// # Example
/// ```
/// use feelib::{
///     Value,
///     library::numeric::{Aggregate, aggregate},
/// };
///
/// let list = Value::from(vec![Value::from(3), Value::from(1), Value::from(2)]);
/// assert_eq!(aggregate(Aggregate::Min, &[list.clone()]).unwrap(), Value::from(1));
/// assert_eq!(aggregate(Aggregate::Mean, &[list]).unwrap(), Value::from(2));
///
/// let spread = [Value::from(1), Value::from(2), Value::from(3)];
/// assert_eq!(aggregate(Aggregate::Sum, &spread).unwrap(), Value::from(6));
///
/// assert_eq!(aggregate(Aggregate::Max, &[Value::from(Vec::new())]).unwrap(), Value::Null);
/// ```
pub fn aggregate(kind: Aggregate, args: &[Value]) -> EvalResult<Value> {
    let Some(items) = variadic_items(args) else {
        return Ok(Value::Null);
    };
    let Some((first, rest)) = items.split_first() else {
        return Ok(Value::Null);
    };

    match kind {
        Aggregate::Min | Aggregate::Max => {
            let wanted = if kind == Aggregate::Min { Ordering::Less } else { Ordering::Greater };
            first.compare(first)?;
            let mut best = first;
            for item in rest {
                if item.compare(best)? == wanted {
                    best = item;
                }
            }
            Ok(best.clone())
        },
        Aggregate::Sum | Aggregate::Mean => {
            let sum = fold(items, BigDecimal::zero(), |acc, n| acc + n)?;
            if kind == Aggregate::Sum {
                return Ok(Value::from(sum));
            }
            let mean = to_working_precision(&(sum / usize_to_decimal(items.len())))?;
            Ok(Value::from(mean))
        },
        Aggregate::Product => Ok(Value::from(fold(items, BigDecimal::from(1), |acc, n| acc * n)?)),
    }
}

fn fold(items: &[Value],
        init: BigDecimal,
        op: fn(BigDecimal, &BigDecimal) -> BigDecimal)
        -> EvalResult<BigDecimal> {
    items.iter()
         .try_fold(init, |acc, item| to_working_precision(&op(acc, item.as_number()?)))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn num(text: &str) -> Value {
        Value::from(parse_decimal(text).unwrap())
    }

    #[rstest]
    #[case("1", "1")]
    #[case("-0.0", "0")]
    #[case("+1.500", "1.5")]
    #[case("1.", "1")]
    #[case("1E2", "100")]
    #[case("2.5e-3", "0.0025")]
    #[case("000123.4500", "123.45")]
    fn parses_numerals(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(number(&[Value::from(text)]).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("not-a-number")]
    #[case("1,000")]
    #[case(" 1")]
    #[case("1e")]
    #[case("--1")]
    #[case(".")]
    #[case("1.2.3")]
    #[case("1e6145")]
    #[case("1e-6145")]
    #[case("1e99999999999")]
    fn rejects_malformed_numerals(#[case] text: &str) {
        assert!(matches!(number(&[Value::from(text)]), Err(FeelError::InvalidLiteral { .. })));
    }

    #[rstest]
    #[case("1e30", "1000000000000000000000000000000")]
    #[case("1e-30", "0.000000000000000000000000000001")]
    #[case("123456789012345678901234567890", "123456789012345678901234567890")]
    #[case("79228162514264337593543950336", "79228162514264337593543950336")]
    #[case("0.1234567890123456789012345678901234", "0.1234567890123456789012345678901234")]
    fn keeps_wide_numerals_exact(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(number(&[Value::from(text)]).unwrap().to_string(), expected);
    }

    #[test]
    fn rounds_numerals_to_sixty_four_digits() {
        let literal = format!("0.{}5", "1".repeat(64));
        let rounded = number(&[Value::from(literal.as_str())]).unwrap();
        assert_eq!(rounded.to_string(), format!("0.{}2", "1".repeat(63)));
    }

    #[test]
    fn blank_literal_is_unknown_without_error() {
        assert_eq!(number(&[Value::from("  ")]).unwrap(), Value::Null);
    }

    #[rstest]
    #[case("1 000,5", " ", ",", Some("1000.5"))]
    #[case("1,000,000", ",", ".", Some("1000000"))]
    #[case("1.000.000", ".", ",", Some("1000000"))]
    #[case("1,2,3", ".", ",", None)]
    fn parses_with_separators(#[case] text: &str,
                              #[case] grouping: &str,
                              #[case] separator: &str,
                              #[case] expected: Option<&str>) {
        let result = number(&[Value::from(text), Value::from(grouping), Value::from(separator)]);
        assert_eq!(result.ok().map(|v| v.to_string()), expected.map(str::to_owned));
    }

    #[test]
    fn unknown_separator_is_unknown() {
        let result = number(&[Value::from("1,5"), Value::Null, Value::from(",")]).unwrap();
        assert_eq!(result, Value::Null);
    }

    #[rstest]
    #[case("2.5", 0, "2")]
    #[case("3.5", 0, "4")]
    #[case("-2.5", 0, "-2")]
    #[case("1.125", 2, "1.12")]
    #[case("1.135", 2, "1.14")]
    #[case("150", -2, "200")]
    #[case("250", -2, "200")]
    #[case("0.5", 7000, "0.5")]
    #[case("4e6144", -7000, "0")]
    fn rounds_half_even(#[case] n: &str, #[case] scale: i64, #[case] expected: &str) {
        let result = decimal(&[num(n), Value::from(scale)]).unwrap();
        assert_eq!(result.to_string(), expected);
    }

    #[rstest]
    #[case("1.5", "1", "2")]
    #[case("-1.5", "-2", "-1")]
    #[case("3", "3", "3")]
    fn floor_and_ceiling(#[case] n: &str, #[case] down: &str, #[case] up: &str) {
        assert_eq!(floor(&[num(n)]).unwrap().to_string(), down);
        assert_eq!(ceiling(&[num(n)]).unwrap().to_string(), up);
    }

    #[test]
    fn modulo_by_zero_fails() {
        assert_eq!(modulo(&[Value::from(1), Value::from(0)]), Err(FeelError::DivisionByZero));
    }

    #[test]
    fn parity_requires_integers() {
        assert_eq!(parity(&[Value::from(-3)], true).unwrap(), Value::Boolean(true));
        assert_eq!(parity(&[Value::from(4)], true).unwrap(), Value::Boolean(false));
        assert!(parity(&[num("2.5")], false).is_err());
    }

    #[test]
    fn min_keeps_first_of_equals() {
        let items = [num("1.0"), num("1"), num("2")];
        assert_eq!(aggregate(Aggregate::Min, &items).unwrap().to_string(), "1");
        assert_eq!(aggregate(Aggregate::Max, &items).unwrap(), Value::from(2));
    }

    #[test]
    fn min_orders_strings() {
        let items = [Value::from("b"), Value::from("a"), Value::from("c")];
        assert_eq!(aggregate(Aggregate::Min, &items).unwrap(), Value::from("a"));
    }

    #[test]
    fn mean_strips_trailing_zeros() {
        let items = [num("1.50"), num("2.50")];
        assert_eq!(aggregate(Aggregate::Mean, &items).unwrap().to_string(), "2");
        assert_eq!(aggregate(Aggregate::Sum, &items).unwrap().to_string(), "4");
    }

    #[test]
    fn mixed_elements_fail_the_whole_call() {
        let items = [Value::from(1), Value::from("2")];
        assert!(aggregate(Aggregate::Sum, &items).is_err());
        assert!(aggregate(Aggregate::Max, &items).is_err());

        let with_null = [Value::from(1), Value::Null];
        assert!(aggregate(Aggregate::Mean, &with_null).is_err());
    }

    #[test]
    fn unknown_or_empty_input_is_unknown() {
        assert_eq!(aggregate(Aggregate::Sum, &[Value::Null]).unwrap(), Value::Null);
        assert_eq!(aggregate(Aggregate::Product, &[Value::from(Vec::new())]).unwrap(), Value::Null);
    }

    #[test]
    fn sums_beyond_machine_integers() {
        let items = [num("5e28"), num("5e28")];
        assert_eq!(aggregate(Aggregate::Sum, &items).unwrap().to_string(), format!("1{}", "0".repeat(29)));
    }

    #[test]
    fn product_overflow_is_an_error() {
        let huge = num("1e5000");
        assert_eq!(aggregate(Aggregate::Product, &[huge.clone(), huge]), Err(FeelError::Overflow));
    }

    #[test]
    fn mean_rounds_to_the_working_precision() {
        let items = [Value::from(1), Value::from(0), Value::from(0)];
        let mean = aggregate(Aggregate::Mean, &items).unwrap().to_string();
        assert_eq!(mean, format!("0.{}", "3".repeat(64)));
    }

    #[rstest]
    #[case(floor, 0)]
    #[case(ceiling, 2)]
    #[case(abs, 0)]
    #[case(decimal, 1)]
    #[case(modulo, 3)]
    #[case(number, 2)]
    fn wrong_argument_counts_are_errors(#[case] f: fn(&[Value]) -> EvalResult<Value>, #[case] given: usize) {
        let args = vec![Value::from(1); given];
        assert!(matches!(f(&args), Err(FeelError::ArgumentCountMismatch { found, .. }) if found == given));
    }
}
