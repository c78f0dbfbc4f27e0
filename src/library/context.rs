use crate::{
    library::core::{EvalResult, exact_args, has_null},
    value::{context::Context, core::Value},
};

/// Structural equality of two contexts.
///
/// Two unknown contexts are equal; an unknown and a known one are not.
/// Otherwise the contexts are equal when they bind the same keys to equal
/// values, whatever the insertion order.
///
/// # Example
/// ```
/// use feelib::{Value, library::context::context_equal, value::context::Context};
///
/// let a: Context = [("x", Value::from(1)), ("y", Value::from(2))].into_iter().collect();
/// let b: Context = [("y", Value::from(2)), ("x", Value::from(1))].into_iter().collect();
///
/// assert_eq!(context_equal(&[Value::from(a.clone()), Value::from(b)]).unwrap(), Value::from(true));
/// assert_eq!(context_equal(&[Value::from(a), Value::Null]).unwrap(), Value::from(false));
/// assert_eq!(context_equal(&[Value::Null, Value::Null]).unwrap(), Value::from(true));
/// ```
pub fn context_equal(args: &[Value]) -> EvalResult<Value> {
    let [a, b] = exact_args::<2>(args)?;
    Ok(Value::from(contexts_equal(a, b)?))
}

/// Logical negation of [`context_equal`].
pub fn context_not_equal(args: &[Value]) -> EvalResult<Value> {
    let [a, b] = exact_args::<2>(args)?;
    Ok(Value::from(!contexts_equal(a, b)?))
}

fn contexts_equal(a: &Value, b: &Value) -> EvalResult<bool> {
    match (a, b) {
        (Value::Null, Value::Null) => Ok(true),
        (Value::Null, other) | (other, Value::Null) => other.as_context().map(|_| false),
        (a, b) => Ok(a.as_context()? == b.as_context()?),
    }
}

/// Looks up the value bound to `key`; `null` when the key is absent.
pub fn get_value(args: &[Value]) -> EvalResult<Value> {
    let [context, key] = exact_args::<2>(args)?;
    if has_null(args) {
        return Ok(Value::Null);
    }
    let (context, key) = (context.as_context()?, key.as_str()?);

    Ok(context.get(key).cloned().unwrap_or_default())
}

/// Lists the entries of a context, in insertion order, as `{key, value}`
/// contexts.
///
/// # Example
/// ```
/// use feelib::{Value, library::context::get_entries, value::context::Context};
///
/// let c: Context = [("a", Value::from(1))].into_iter().collect();
///
/// let entries = get_entries(&[Value::from(c)]).unwrap();
/// assert_eq!(entries.to_string(), r#"[{key: "a", value: 1}]"#);
/// ```
pub fn get_entries(args: &[Value]) -> EvalResult<Value> {
    match exact_args::<1>(args)? {
        [Value::Null] => Ok(Value::Null),
        [context] => Ok(context.as_context()?
                             .iter()
                             .map(|(key, value)| {
                                 let entry: Context = [("key", Value::from(key)), ("value", value.clone())].into_iter().collect();
                                 Value::from(entry)
                             })
                             .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(entries: &[(&str, i64)]) -> Value {
        Value::from(entries.iter()
                           .map(|&(k, v)| (k, Value::from(v)))
                           .collect::<Context>())
    }

    #[test]
    fn equality_needs_same_keys_and_values() {
        let base = ctx(&[("a", 1), ("b", 2)]);

        assert_eq!(context_equal(&[base.clone(), ctx(&[("a", 1)])]).unwrap(), Value::from(false));
        assert_eq!(context_equal(&[base.clone(), ctx(&[("a", 1), ("b", 3)])]).unwrap(), Value::from(false));
        assert_eq!(context_not_equal(&[base.clone(), ctx(&[("b", 2), ("a", 1)])]).unwrap(), Value::from(false));
        assert_eq!(context_not_equal(&[Value::Null, base]).unwrap(), Value::from(true));
    }

    #[test]
    fn non_contexts_are_rejected() {
        assert!(context_equal(&[Value::from(1), Value::from(1)]).is_err());
        assert!(context_equal(&[Value::Null, Value::from("a")]).is_err());
    }

    #[test]
    fn lookup() {
        let c = ctx(&[("a", 1)]);

        assert_eq!(get_value(&[c.clone(), Value::from("a")]).unwrap(), Value::from(1));
        assert_eq!(get_value(&[c.clone(), Value::from("z")]).unwrap(), Value::Null);
        assert_eq!(get_value(&[c, Value::Null]).unwrap(), Value::Null);
    }

    #[test]
    fn entries_keep_insertion_order() {
        let entries = get_entries(&[ctx(&[("z", 1), ("a", 2)])]).unwrap();
        let keys: Vec<Value> = entries.as_list()
                                      .unwrap()
                                      .iter()
                                      .map(|e| e.as_context().unwrap().get("key").cloned().unwrap())
                                      .collect();

        assert_eq!(keys, [Value::from("z"), Value::from("a")]);
    }
}
