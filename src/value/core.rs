use std::{cmp::Ordering, fmt, sync::Arc};

use chrono::NaiveDate;
use bigdecimal::BigDecimal;

use crate::{
    error::FeelError,
    library::core::EvalResult,
    value::{
        context::Context,
        duration::Duration,
        lambda::Lambda,
        temporal::{OffsetTime, ZonedDateTime},
    },
};

/// Represents a value received or produced by a built-in function.
///
/// Every variant is immutable once created. Lists and contexts are shared
/// behind an [`Arc`], so cloning a value is cheap and values can be handed to
/// several evaluation threads at once.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The distinguished unknown value (`null`).
    #[default]
    Null,
    /// A decimal number. Numbers built through `From<BigDecimal>` are normalized,
    /// so `1.50` and `1.5` are stored (and printed) identically.
    Number(BigDecimal),
    /// `true` or `false`.
    Boolean(bool),
    /// A string of Unicode scalar values.
    String(String),
    /// A calendar date without time or zone.
    Date(NaiveDate),
    /// A time of day with a fixed UTC offset.
    Time(OffsetTime),
    /// A date and time with a UTC offset and, optionally, a named zone.
    DateTime(ZonedDateTime),
    /// A year-month or day-time duration.
    Duration(Duration),
    /// An ordered, possibly heterogeneous sequence.
    List(Arc<Vec<Self>>),
    /// A key/value record.
    Context(Arc<Context>),
    /// A caller-supplied callback, such as the `sort` predicate.
    Function(Lambda),
}

impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Self::Number(d.normalized())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(BigDecimal::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(BigDecimal::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<OffsetTime> for Value {
    fn from(t: OffsetTime) -> Self {
        Self::Time(t)
    }
}

impl From<ZonedDateTime> for Value {
    fn from(dt: ZonedDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Self::Duration(d)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(Arc::new(v))
    }
}

impl From<Context> for Value {
    fn from(c: Context) -> Self {
        Self::Context(Arc::new(c))
    }
}

impl From<Lambda> for Value {
    fn from(f: Lambda) -> Self {
        Self::Function(f)
    }
}

impl FromIterator<Self> for Value {
    fn from_iter<I: IntoIterator<Item = Self>>(iter: I) -> Self {
        Self::List(Arc::new(iter.into_iter().collect()))
    }
}

impl Value {
    /// Returns the FEEL name of the value's type, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::DateTime(_) => "date and time",
            Self::Duration(Duration::YearMonth { .. }) => "years and months duration",
            Self::Duration(Duration::DayTime(_)) => "days and time duration",
            Self::List(_) => "list",
            Self::Context(_) => "context",
            Self::Function(_) => "function",
        }
    }

    /// Returns `true` if the value is the unknown value.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the value is a list.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Builds the type error reported when this value is not of the
    /// `expected` kind.
    #[must_use]
    pub const fn type_error(&self, expected: &'static str) -> FeelError {
        FeelError::TypeError { expected,
                               found: self.type_name() }
    }

    /// Borrows the decimal inside a number.
    ///
    /// # Returns
    /// - `Ok(&BigDecimal)`: If the value is a number.
    /// - `Err(FeelError::TypeError)`: Otherwise.
    ///
    /// # Example
    /// ```
    /// use bigdecimal::BigDecimal;
    /// use feelib::Value;
    ///
    /// let n = Value::from("2.50".parse::<BigDecimal>().unwrap());
    /// assert_eq!(n.as_number().unwrap().to_plain_string(), "2.5");
    /// assert!(Value::from("2.5").as_number().is_err());
    /// ```
    pub const fn as_number(&self) -> EvalResult<&BigDecimal> {
        match self {
            Self::Number(n) => Ok(n),
            _ => Err(self.type_error("number")),
        }
    }

    /// Returns the boolean, or a type error for anything else.
    pub const fn as_bool(&self) -> EvalResult<bool> {
        match self {
            Self::Boolean(b) => Ok(*b),
            _ => Err(self.type_error("boolean")),
        }
    }

    /// Borrows the text of a string.
    pub fn as_str(&self) -> EvalResult<&str> {
        match self {
            Self::String(s) => Ok(s.as_str()),
            _ => Err(self.type_error("string")),
        }
    }

    /// Borrows the elements of a list.
    pub fn as_list(&self) -> EvalResult<&[Self]> {
        match self {
            Self::List(items) => Ok(items.as_slice()),
            _ => Err(self.type_error("list")),
        }
    }

    /// Borrows a context.
    pub fn as_context(&self) -> EvalResult<&Context> {
        match self {
            Self::Context(c) => Ok(c.as_ref()),
            _ => Err(self.type_error("context")),
        }
    }

    /// Borrows a callback.
    pub const fn as_function(&self) -> EvalResult<&Lambda> {
        match self {
            Self::Function(f) => Ok(f),
            _ => Err(self.type_error("function")),
        }
    }

    /// Borrows a duration.
    pub const fn as_duration(&self) -> EvalResult<&Duration> {
        match self {
            Self::Duration(d) => Ok(d),
            _ => Err(self.type_error("duration")),
        }
    }

    /// Compares two values of the same ordered kind.
    ///
    /// Numbers, strings, dates, times, date-times and durations of the same
    /// kind are ordered. Times are compared on the UTC time line and
    /// date-times by instant. Any other pairing, including a `null` operand,
    /// is a type error.
    ///
    /// # Example
    /// ```
    /// use std::cmp::Ordering;
    ///
    /// use feelib::Value;
    ///
    /// assert_eq!(Value::from(1).compare(&Value::from(2)).unwrap(), Ordering::Less);
    /// assert_eq!(Value::from("b").compare(&Value::from("a")).unwrap(),
    ///            Ordering::Greater);
    /// assert!(Value::from(1).compare(&Value::from("1")).is_err());
    /// ```
    pub fn compare(&self, other: &Self) -> EvalResult<Ordering> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => Ok(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Ok(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Ok(a.cmp(b)),
            (Self::Time(a), Self::Time(b)) => Ok(a.utc_key().cmp(&b.utc_key())),
            (Self::DateTime(a), Self::DateTime(b)) => Ok(a.instant().cmp(b.instant())),
            (Self::Duration(a), Self::Duration(b)) => {
                a.partial_cmp(b).ok_or_else(|| other.type_error(self.type_name()))
            },
            _ => Err(other.type_error(self.type_name())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Number(n) => write!(f, "{}", n.normalized().to_plain_string()),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Time(t) => write!(f, "{t}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::Duration(d) => write!(f, "{d}"),
            Self::List(items) => {
                write!(f, "[")?;

                for (index, value) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }

                    write!(f, "{value}")?;
                }

                write!(f, "]")
            },
            Self::Context(c) => write!(f, "{c}"),
            Self::Function(_) => write!(f, "function"),
        }
    }
}
