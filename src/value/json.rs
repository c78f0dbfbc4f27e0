use serde_json::{Map, Value as Json};
use thiserror::Error;

use crate::{
    error::FeelError,
    library::numeric::parse_decimal,
    value::{
        context::Context,
        core::Value,
        duration::Duration,
        lambda::Lambda,
        temporal::{OffsetTime, ZonedDateTime, parse_date},
    },
};

/// A JSON value that has no library counterpart.
#[derive(Debug, Error)]
#[error("{cause}")]
pub struct DecodeError {
    /// The tag of the offending object, or `number` for a number literal.
    pub tag:   &'static str,
    /// Why the conversion failed.
    #[source]
    pub cause: FeelError,
}

impl DecodeError {
    const fn new(tag: &'static str, cause: FeelError) -> Self {
        Self { tag, cause }
    }
}

/// Converts a JSON document into a library value.
///
/// Arrays become lists, objects become contexts and numbers are read as
/// decimals from their exact text. Objects with a single tag key build the
/// values JSON has no syntax for:
///
/// | Object                                | Value                               |
/// |---------------------------------------|-------------------------------------|
/// | `{"@date": "2024-01-31"}`             | date                                |
/// | `{"@time": "10:00:00+02:00"}`         | time                                |
/// | `{"@dateAndTime": "2024-01-31T10:00Z"}` | date and time                     |
/// | `{"@duration": "P1Y"}`                | duration                            |
/// | `{"@lessThan": "<", "by": 1}`         | comparison callback for `sort`      |
///
/// `@lessThan` accepts `"<"` (ascending) or `">"` (descending). With `by`,
/// list elements are compared by their element at that 1-based position.
///
/// # Example
/// ```
/// use feelib::{Value, value::json::from_json};
///
/// let json = serde_json::json!([1.50, {"@date": "2024-01-31"}, {"a": null}]);
/// let value = from_json(&json).unwrap();
///
/// assert_eq!(value.to_string(), "[1.5, 2024-01-31, {a: null}]");
/// ```
pub fn from_json(json: &Json) -> Result<Value, DecodeError> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::from(*b),
        Json::Number(n) => {
            let text = n.to_string();
            let number = parse_decimal(&text).ok_or_else(|| {
                                                 DecodeError::new("number",
                                                                  FeelError::invalid_literal("number", text.as_str()))
                                             })?;
            Value::from(number)
        },
        Json::String(s) => Value::from(s.as_str()),
        Json::Array(items) => items.iter().map(from_json).collect::<Result<Value, _>>()?,
        Json::Object(map) => from_object(map)?,
    })
}

fn from_object(map: &Map<String, Json>) -> Result<Value, DecodeError> {
    if let Some(order) = map.get("@lessThan") {
        return comparator(map, order);
    }

    if map.len() == 1
       && let Some((key, Json::String(literal))) = map.iter().next()
    {
        let tagged = match key.as_str() {
            "@date" => Some(parse_date(literal).map(Value::from).map_err(|e| DecodeError::new("@date", e))),
            "@time" => Some(OffsetTime::parse(literal).map(Value::from).map_err(|e| DecodeError::new("@time", e))),
            "@dateAndTime" => {
                Some(ZonedDateTime::parse(literal).map(Value::from)
                                                  .map_err(|e| DecodeError::new("@dateAndTime", e)))
            },
            "@duration" => {
                Some(Duration::parse(literal).map(Value::from)
                                             .map_err(|e| DecodeError::new("@duration", e)))
            },
            _ => None,
        };
        if let Some(value) = tagged {
            return value;
        }
    }

    let mut context = Context::new();
    for (key, value) in map {
        context.insert(key.as_str(), from_json(value)?);
    }
    Ok(Value::from(context))
}

fn comparator(map: &Map<String, Json>, order: &Json) -> Result<Value, DecodeError> {
    let invalid = |details: &str| DecodeError::new("@lessThan", FeelError::invalid_argument(details));

    let descending = match order.as_str() {
        Some("<") => false,
        Some(">") => true,
        _ => return Err(invalid("expected \"<\" or \">\"")),
    };
    let by = match map.get("by") {
        None => None,
        Some(position) => {
            let index = position.as_u64()
                                .and_then(|p| usize::try_from(p).ok())
                                .and_then(|p| p.checked_sub(1))
                                .ok_or_else(|| invalid("\"by\" must be a positive position"))?;
            Some(index)
        },
    };
    if map.keys().any(|k| k != "@lessThan" && k != "by") {
        return Err(invalid("unexpected key"));
    }

    let less = Lambda::new(move |args| {
        let [a, b] = args else {
            return Value::Null;
        };
        match (sort_key(a, by), sort_key(b, by)) {
            (Some(a), Some(b)) => a.compare(b)
                                   .map_or(Value::Null, |o| Value::from(if descending { o.is_gt() } else { o.is_lt() })),
            _ => Value::Null,
        }
    });
    Ok(Value::from(less))
}

fn sort_key(value: &Value, by: Option<usize>) -> Option<&Value> {
    match (by, value) {
        (None, _) => Some(value),
        (Some(index), Value::List(items)) => items.get(index),
        (Some(_), _) => None,
    }
}
