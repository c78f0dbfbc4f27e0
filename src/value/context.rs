use std::fmt;

use indexmap::IndexMap;

use crate::value::core::Value;

/// An ordered mapping from names to values.
///
/// Iteration follows insertion order, but equality does not: two contexts are
/// equal when they hold the same keys bound to equal values.
///
/// # Example
/// ```
/// use feelib::{Value, value::context::Context};
///
/// let a: Context = [("x", Value::from(1)), ("y", Value::from(2))].into_iter().collect();
/// let b: Context = [("y", Value::from(2)), ("x", Value::from(1))].into_iter().collect();
///
/// assert_eq!(a, b);
/// assert_eq!(a.keys().collect::<Vec<_>>(), ["x", "y"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Context {
    entries: IndexMap<String, Value>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `key` to `value`, replacing an earlier binding in place.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Looks up the value bound to `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the context has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, (key, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        write!(f, "}}")
    }
}
