use crate::{
    library::core::{EvalResult, exact_args, variadic_items},
    value::core::Value,
};

/// A three-valued truth value.
///
/// Anything that is not exactly `true` or `false`, including values of other
/// kinds, is [`Tribool::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tribool {
    /// Exactly `true`.
    True,
    /// Exactly `false`.
    False,
    /// Neither.
    Unknown,
}

impl From<&Value> for Tribool {
    fn from(value: &Value) -> Self {
        match value {
            Value::Boolean(true) => Self::True,
            Value::Boolean(false) => Self::False,
            _ => Self::Unknown,
        }
    }
}

impl From<Tribool> for Value {
    fn from(b: Tribool) -> Self {
        match b {
            Tribool::True => Self::Boolean(true),
            Tribool::False => Self::Boolean(false),
            Tribool::Unknown => Self::Null,
        }
    }
}

impl Tribool {
    /// Logical negation; unknown stays unknown.
    #[must_use]
    pub const fn not(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
        }
    }

    /// Conjunction over a sequence: false if any element is false, true if
    /// every element is true, unknown otherwise.
    ///
    /// # Example
    /// ```
    /// use feelib::library::boolean::Tribool::{self, False, True, Unknown};
    ///
    /// assert_eq!(Tribool::all([True, Unknown, False]), False);
    /// assert_eq!(Tribool::all([True, Unknown]), Unknown);
    /// assert_eq!(Tribool::all([]), True);
    /// ```
    pub fn all(items: impl IntoIterator<Item = Self>) -> Self {
        items.into_iter().fold(Self::True, |acc, b| match (acc, b) {
                             (Self::False, _) | (_, Self::False) => Self::False,
                             (Self::Unknown, _) | (_, Self::Unknown) => Self::Unknown,
                             _ => Self::True,
                         })
    }

    /// Disjunction over a sequence, the dual of [`Tribool::all`].
    pub fn any(items: impl IntoIterator<Item = Self>) -> Self {
        Self::all(items.into_iter().map(Self::not)).not()
    }
}

/// Negates a boolean.
///
/// # Returns
/// - `Value::Boolean` with the negated value.
/// - `Value::Null` if the operand is unknown.
///
/// # Errors
/// Returns a type error for non-boolean operands.
pub fn not(args: &[Value]) -> EvalResult<Value> {
    match exact_args::<1>(args)? {
        [Value::Null] => Ok(Value::Null),
        [value] => Ok(Value::from(!value.as_bool()?)),
    }
}

/// Implements `and` (also `all`).
///
/// Takes a single list, or the operands themselves. An unknown list yields
/// `null`. Otherwise the result is `false` as soon as one element is exactly
/// `false`, even next to unknown elements; `true` if every element is exactly
/// `true`; and `null` in every other case.
///
/// # Example
/// ```
/// use feelib::{Value, library::boolean::and};
///
/// let t = Value::Boolean(true);
/// let f = Value::Boolean(false);
///
/// assert_eq!(and(&[t.clone(), t.clone()]).unwrap(), t);
/// assert_eq!(and(&[t.clone(), Value::Null, f.clone()]).unwrap(), f);
/// assert_eq!(and(&[Value::from(vec![t, Value::Null])]).unwrap(), Value::Null);
/// ```
pub fn and(args: &[Value]) -> EvalResult<Value> {
    Ok(variadic_items(args).map_or(Value::Null, |items| {
                               Value::from(Tribool::all(items.iter().map(Tribool::from)))
                           }))
}

/// Implements `or` (also `any`), the dual of [`and`].
pub fn or(args: &[Value]) -> EvalResult<Value> {
    Ok(variadic_items(args).map_or(Value::Null, |items| {
                               Value::from(Tribool::any(items.iter().map(Tribool::from)))
                           }))
}
