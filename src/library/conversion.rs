use crate::{
    library::core::{EvalResult, exact_args},
    value::core::Value,
};

/// Converts any value into a string.
///
/// - `null` becomes the text `"null"`.
/// - Numbers use plain notation without trailing zeros or exponent.
/// - Strings are returned unchanged.
/// - Temporal values use their ISO-8601 form.
/// - Lists and contexts use their display form.
///
/// # Example
/// ```
/// use feelib::{
///     Value,
///     library::{conversion::string, numeric::parse_decimal},
/// };
///
/// let n = Value::from(parse_decimal("12.500").unwrap());
/// assert_eq!(string(&[n]).unwrap(), Value::from("12.5"));
/// assert_eq!(string(&[Value::from(parse_decimal("1e30").unwrap())]).unwrap(),
///            Value::from("1000000000000000000000000000000"));
/// assert_eq!(string(&[Value::Null]).unwrap(), Value::from("null"));
/// assert_eq!(string(&[Value::from("x")]).unwrap(), Value::from("x"));
/// ```
pub fn string(args: &[Value]) -> EvalResult<Value> {
    Ok(match exact_args::<1>(args)? {
        [Value::String(s)] => Value::from(s.as_str()),
        [other] => Value::from(other.to_string()),
    })
}
