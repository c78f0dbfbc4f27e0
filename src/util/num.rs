use std::num::NonZeroU64;

use bigdecimal::{BigDecimal, num_bigint::BigInt, RoundingMode, ToPrimitive, Zero};

use crate::{error::FeelError, library::core::EvalResult};

/// Significant digits kept by every decimal result.
pub const WORKING_PRECISION: u64 = 64;

/// Largest decimal exponent, in either direction, a number may carry.
pub const MAX_EXPONENT: i64 = 6_144;

const PRECISION: NonZeroU64 = NonZeroU64::MIN.saturating_add(WORKING_PRECISION - 1);

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Rounds a decimal to [`WORKING_PRECISION`] significant digits, half to
/// even, and strips trailing zeros.
///
/// ## Errors
/// Returns [`FeelError::Overflow`] if the rounded number's decimal exponent
/// lies beyond [`MAX_EXPONENT`] in either direction.
///
/// ## Example
/// ```
/// use bigdecimal::BigDecimal;
/// use feelib::util::num::to_working_precision;
///
/// let third = BigDecimal::from(1) / BigDecimal::from(3);
/// assert_eq!(to_working_precision(&third).unwrap().digits(), 64);
///
/// let huge: BigDecimal = "1e7000".parse().unwrap();
/// assert!(to_working_precision(&huge).is_err());
/// ```
pub fn to_working_precision(value: &BigDecimal) -> EvalResult<BigDecimal> {
    if value.is_zero() {
        return Ok(BigDecimal::zero());
    }

    let rounded = value.with_precision_round(PRECISION, RoundingMode::HalfEven).normalized();
    let (_, scale) = rounded.as_bigint_and_exponent();
    let exponent = i64::try_from(rounded.digits()).ok()
                                                  .and_then(|digits| digits.checked_sub(1))
                                                  .and_then(|e| e.checked_sub(scale))
                                                  .ok_or(FeelError::Overflow)?;
    if exponent.abs() > MAX_EXPONENT {
        return Err(FeelError::Overflow);
    }
    Ok(rounded)
}

/// Safely converts a decimal to `i64` if the value is integral and within
/// range.
///
/// ## Errors
/// Returns [`FeelError::Fractional`] for values with a fractional part and
/// [`FeelError::OutOfRange`] for values outside the `i64` range.
///
/// ## Example
/// ```
/// use bigdecimal::BigDecimal;
/// use feelib::{error::FeelError, util::num::decimal_to_i64_checked};
///
/// assert_eq!(decimal_to_i64_checked(&BigDecimal::from(-3)).unwrap(), -3);
/// assert_eq!(decimal_to_i64_checked(&"3.00".parse().unwrap()).unwrap(), 3);
///
/// let err = decimal_to_i64_checked(&"1.5".parse().unwrap()).unwrap_err();
/// assert!(matches!(err, FeelError::Fractional { .. }));
/// ```
pub fn decimal_to_i64_checked(value: &BigDecimal) -> EvalResult<i64> {
    if !value.is_integer() {
        return Err(FeelError::Fractional { value: value.clone() });
    }
    value.to_i64().ok_or_else(|| FeelError::OutOfRange { value: value.clone() })
}

/// Safely converts a decimal to `i32` if the value is integral and within
/// range.
///
/// ## Errors
/// Same as [`decimal_to_i64_checked`], with the `i32` range.
pub fn decimal_to_i32_checked(value: &BigDecimal) -> EvalResult<i32> {
    let wide = decimal_to_i64_checked(value)?;
    i32::try_from(wide).map_err(|_| FeelError::OutOfRange { value: value.clone() })
}

/// Safely converts a decimal to `u32` if the value is integral,
/// non-negative and within range.
///
/// ## Example
/// ```
/// use bigdecimal::BigDecimal;
/// use feelib::{error::FeelError, util::num::decimal_to_u32_checked};
///
/// assert_eq!(decimal_to_u32_checked(&BigDecimal::from(12)).unwrap(), 12);
///
/// let err = decimal_to_u32_checked(&BigDecimal::from(-1)).unwrap_err();
/// assert!(matches!(err, FeelError::OutOfRange { .. }));
/// ```
pub fn decimal_to_u32_checked(value: &BigDecimal) -> EvalResult<u32> {
    let wide = decimal_to_i64_checked(value)?;
    u32::try_from(wide).map_err(|_| FeelError::OutOfRange { value: value.clone() })
}

/// Splits a non-negative decimal number of seconds into whole seconds and
/// nanoseconds.
///
/// Digits beyond nanosecond resolution are truncated.
///
/// ## Errors
/// Returns [`FeelError::OutOfRange`] for negative values or values that do not
/// fit a `u32` number of seconds.
///
/// ## Example
/// ```
/// use feelib::util::num::split_seconds;
///
/// assert_eq!(split_seconds(&"15.5".parse().unwrap()).unwrap(), (15, 500_000_000));
/// assert_eq!(split_seconds(&"0.0000000019".parse().unwrap()).unwrap(), (0, 1));
/// ```
pub fn split_seconds(value: &BigDecimal) -> EvalResult<(u32, u32)> {
    let out_of_range = || FeelError::OutOfRange { value: value.clone() };
    if *value < BigDecimal::zero() {
        return Err(out_of_range());
    }

    let nanos = (value.clone() * BigDecimal::from(NANOS_PER_SECOND)).with_scale_round(0, RoundingMode::Down)
                                                                     .to_u64()
                                                                     .ok_or_else(out_of_range)?;
    let per_second = u64::from(NANOS_PER_SECOND);
    let whole = u32::try_from(nanos / per_second).map_err(|_| out_of_range())?;
    let fraction = u32::try_from(nanos % per_second).map_err(|_| out_of_range())?;
    Ok((whole, fraction))
}

/// Converts a list length or position into a decimal.
#[must_use]
pub fn usize_to_decimal(value: usize) -> BigDecimal {
    BigDecimal::new(BigInt::from(value), 0)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn dec(text: &str) -> BigDecimal {
        text.parse().unwrap()
    }

    #[rstest]
    #[case("1e30", "1000000000000000000000000000000")]
    #[case("1e-30", "0.000000000000000000000000000001")]
    #[case("1.000", "1")]
    #[case("0.1234567890123456789012345678901234", "0.1234567890123456789012345678901234")]
    fn keeps_numbers_inside_the_precision(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(to_working_precision(&dec(text)).unwrap().to_plain_string(), expected);
    }

    #[test]
    fn rounds_the_65th_digit_half_even() {
        let ones = "1".repeat(63);
        let even = to_working_precision(&dec(&format!("{ones}25"))).unwrap();
        let odd = to_working_precision(&dec(&format!("{ones}35"))).unwrap();

        assert_eq!(even.to_plain_string(), format!("{ones}20"));
        assert_eq!(odd.to_plain_string(), format!("{ones}40"));
    }

    #[rstest]
    #[case("1e6144", true)]
    #[case("1e6145", false)]
    #[case("1e-6144", true)]
    #[case("1e-6145", false)]
    fn exponent_range(#[case] text: &str, #[case] accepted: bool) {
        assert_eq!(to_working_precision(&dec(text)).is_ok(), accepted);
    }

    #[test]
    fn integer_conversions_refuse_huge_values() {
        assert!(matches!(decimal_to_i64_checked(&dec("1e30")), Err(FeelError::OutOfRange { .. })));
        assert!(matches!(decimal_to_i32_checked(&dec("1e-30")), Err(FeelError::Fractional { .. })));
    }
}
