use std::{fmt, sync::Arc};

use crate::value::core::Value;

type Callback = dyn Fn(&[Value]) -> Value + Send + Sync;

/// A caller-supplied function value.
///
/// The evaluator wraps its own closures (for example the comparison handed to
/// `sort`) in a `Lambda` so they can be passed to built-ins like any other
/// argument. Two lambdas are equal only if they share the same callback.
///
/// # Example
/// ```
/// use feelib::{Value, value::lambda::Lambda};
///
/// let less = Lambda::new(|args| Value::from(args[0].compare(&args[1]).is_ok_and(|o| o.is_lt())));
///
/// assert_eq!(less.apply(&[Value::from(1), Value::from(2)]), Value::Boolean(true));
/// assert_eq!(less, less.clone());
/// ```
#[derive(Clone)]
pub struct Lambda(Arc<Callback>);

impl Lambda {
    /// Wraps a callback.
    pub fn new<F>(f: F) -> Self
        where F: Fn(&[Value]) -> Value + Send + Sync + 'static
    {
        Self(Arc::new(f))
    }

    /// Invokes the callback.
    #[must_use]
    pub fn apply(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }
}

impl PartialEq for Lambda {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lambda({:p})", Arc::as_ptr(&self.0))
    }
}
