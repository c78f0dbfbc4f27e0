use crate::{
    error::FeelError,
    library::core::{EvalResult, arity_mismatch, exact_args, has_null},
    util::num::{decimal_to_i64_checked, usize_to_decimal},
    value::core::Value,
};

/// Upper bound on the number of elements `rangeToList` materializes.
const MAX_RANGE_LENGTH: i64 = 10_000_000;

/// Maps a 1-based position onto a 0-based index.
///
/// Positions `1..=len` count from the front and `-len..=-1` from the back
/// (`-1` is the last element). Anything else, including `0`, is out of
/// bounds.
fn position(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let zero_based = if (1..=len).contains(&index) {
        index - 1
    } else if (-len..=-1).contains(&index) {
        len + index
    } else {
        return None;
    };
    usize::try_from(zero_based).ok()
}

/// Borrows the elements of a list argument; an unknown list counts as empty.
fn items_or_empty(value: &Value) -> EvalResult<&[Value]> {
    match value {
        Value::Null => Ok(&[]),
        other => other.as_list(),
    }
}

fn index_arg(value: &Value) -> EvalResult<i64> {
    decimal_to_i64_checked(value.as_number()?)
}

fn out_of_bounds(index: i64, length: usize) -> FeelError {
    FeelError::IndexOutOfBounds { index, length }
}

/// Keeps the first occurrence of every value, comparing by value equality.
fn dedup(items: impl IntoIterator<Item = Value>) -> Vec<Value> {
    let mut distinct: Vec<Value> = Vec::new();
    for item in items {
        if !distinct.contains(&item) {
            distinct.push(item);
        }
    }
    distinct
}

/// Returns whether a list holds a value equal to `element`.
///
/// An unknown element is found if the list holds an unknown element. An
/// unknown list yields `null`.
pub fn list_contains(args: &[Value]) -> EvalResult<Value> {
    match exact_args::<2>(args)? {
        [Value::Null, _] => Ok(Value::Null),
        [list, element] => Ok(Value::from(list.as_list()?.contains(element))),
    }
}

/// Returns a new list with `items…` added after the elements of `list`.
///
/// # Example
/// ```
/// use feelib::{Value, library::list::append};
///
/// let list = Value::from(vec![Value::from(1)]);
/// let appended = append(&[list, Value::from(2), Value::Null]).unwrap();
///
/// assert_eq!(appended.to_string(), "[1, 2, null]");
/// ```
pub fn append(args: &[Value]) -> EvalResult<Value> {
    let Some((list, items)) = args.split_first() else {
        return Err(arity_mismatch("at least 1", 0));
    };
    let mut result = items_or_empty(list)?.to_vec();
    result.extend_from_slice(items);
    Ok(Value::from(result))
}

/// Counts the elements of a list; an unknown list has none.
pub fn count(args: &[Value]) -> EvalResult<Value> {
    let [list] = exact_args::<1>(args)?;
    Ok(Value::from(usize_to_decimal(items_or_empty(list)?.len())))
}

/// Returns the elements of `list` from `start`, optionally limited to
/// `length` elements.
///
/// # Returns
/// - The selected elements.
/// - An empty list when `list` is unknown, `start` is out of bounds or
///   `length` is not positive.
///
/// # Errors
/// [`FeelError::IndexOutOfBounds`] if `length` runs past the end of the list.
///
/// # Example
/// ```
/// use feelib::{Value, library::list::sublist};
///
/// let list: Value = (1..=5).map(Value::from).collect();
///
/// assert_eq!(sublist(&[list.clone(), Value::from(-2)]).unwrap().to_string(), "[4, 5]");
/// assert_eq!(sublist(&[list.clone(), Value::from(2), Value::from(2)]).unwrap().to_string(), "[2, 3]");
/// assert_eq!(sublist(&[list, Value::from(9)]).unwrap().to_string(), "[]");
/// ```
pub fn sublist(args: &[Value]) -> EvalResult<Value> {
    let (list, start, length) = match args {
        [list, start] => (list, start, None),
        [list, start, length] => (list, start, Some(length)),
        _ => return Err(arity_mismatch("2 or 3", args.len())),
    };
    let items = items_or_empty(list)?;
    if has_null(&args[1..]) {
        return Ok(Value::Null);
    }

    let start = index_arg(start)?;
    let Some(from) = position(start, items.len()) else {
        return Ok(Value::from(Vec::new()));
    };

    let to = match length {
        None => items.len(),
        Some(length) => {
            let length = index_arg(length)?;
            if length <= 0 {
                return Ok(Value::from(Vec::new()));
            }
            let end = usize::try_from(length).ok()
                                             .and_then(|n| from.checked_add(n))
                                             .filter(|&end| end <= items.len());
            end.ok_or_else(|| out_of_bounds(start.saturating_add(length - 1), items.len()))?
        },
    };

    Ok(Value::from(items[from..to].to_vec()))
}

/// Joins lists end to end.
///
/// # Errors
/// Returns a type error if an argument is not a list.
pub fn concatenate(args: &[Value]) -> EvalResult<Value> {
    if has_null(args) {
        return Ok(Value::Null);
    }

    let mut result = Vec::new();
    for list in args {
        result.extend_from_slice(list.as_list()?);
    }
    Ok(Value::from(result))
}

/// Inserts `item` before `position`; an out-of-bounds position leaves the
/// list unchanged.
///
/// # Example
/// ```
/// use feelib::{Value, library::list::insert_before};
///
/// let list: Value = (1..=3).map(Value::from).collect();
///
/// let result = insert_before(&[list.clone(), Value::from(-1), Value::from(9)]).unwrap();
/// assert_eq!(result.to_string(), "[1, 2, 9, 3]");
///
/// let result = insert_before(&[list, Value::from(4), Value::from(9)]).unwrap();
/// assert_eq!(result.to_string(), "[1, 2, 3]");
/// ```
pub fn insert_before(args: &[Value]) -> EvalResult<Value> {
    let [list, at, item] = exact_args::<3>(args)?;
    let mut result = items_or_empty(list)?.to_vec();
    if at.is_null() {
        return Ok(Value::Null);
    }

    if let Some(index) = position(index_arg(at)?, result.len()) {
        result.insert(index, item.clone());
    }
    Ok(Value::from(result))
}

/// Removes the element at a positive 1-based position.
///
/// # Errors
/// [`FeelError::IndexOutOfBounds`] unless `1 <= position <= count(list)`.
pub fn remove(args: &[Value]) -> EvalResult<Value> {
    let [list, at] = exact_args::<2>(args)?;
    let mut result = items_or_empty(list)?.to_vec();
    if at.is_null() {
        return Ok(Value::Null);
    }

    let index = index_arg(at)?;
    match position(index, result.len()) {
        Some(i) if index > 0 => {
            result.remove(i);
            Ok(Value::from(result))
        },
        _ => Err(out_of_bounds(index, result.len())),
    }
}

/// Returns the elements in reverse order.
pub fn reverse(args: &[Value]) -> EvalResult<Value> {
    let [list] = exact_args::<1>(args)?;
    Ok(items_or_empty(list)?.iter().rev().cloned().collect())
}

/// Returns every 1-based position whose element equals `match`.
///
/// # Example
/// ```
/// use feelib::{Value, library::list::index_of};
///
/// let list: Value = [1, 2, 1].into_iter().map(Value::from).collect();
///
/// assert_eq!(index_of(&[list.clone(), Value::from(1)]).unwrap().to_string(), "[1, 3]");
/// assert_eq!(index_of(&[list, Value::from(7)]).unwrap().to_string(), "[]");
/// ```
pub fn index_of(args: &[Value]) -> EvalResult<Value> {
    let [list, wanted] = exact_args::<2>(args)?;
    Ok(items_or_empty(list)?.iter()
                            .enumerate()
                            .filter(|(_, item)| *item == wanted)
                            .map(|(i, _)| Value::from(usize_to_decimal(i + 1)))
                            .collect())
}

/// Concatenates lists and drops repeated values, keeping first occurrences.
pub fn union(args: &[Value]) -> EvalResult<Value> {
    if has_null(args) {
        return Ok(Value::Null);
    }

    let mut joined = Vec::new();
    for list in args {
        joined.extend_from_slice(list.as_list()?);
    }
    Ok(Value::from(dedup(joined)))
}

/// Drops repeated values, keeping first occurrences in order.
pub fn distinct_values(args: &[Value]) -> EvalResult<Value> {
    let [list] = exact_args::<1>(args)?;
    Ok(Value::from(dedup(items_or_empty(list)?.iter().cloned())))
}

fn collect_leaves(items: &[Value], into: &mut Vec<Value>) {
    for item in items {
        match item {
            Value::List(nested) => collect_leaves(nested, into),
            leaf => into.push(leaf.clone()),
        }
    }
}

/// Replaces nested lists by their elements, at any depth.
///
/// # Example
/// ```
/// use feelib::{Value, library::list::{flatten, flatten_first_level}};
///
/// let inner = Value::from(vec![Value::from(3), Value::from(4)]);
/// let middle = Value::from(vec![Value::from(2), inner]);
/// let list = Value::from(vec![Value::from(1), middle, Value::from(5)]);
///
/// assert_eq!(flatten(&[list.clone()]).unwrap().to_string(), "[1, 2, 3, 4, 5]");
/// assert_eq!(flatten_first_level(&[list]).unwrap().to_string(), "[1, 2, [3, 4], 5]");
/// ```
pub fn flatten(args: &[Value]) -> EvalResult<Value> {
    match exact_args::<1>(args)? {
        [Value::Null] => Ok(Value::Null),
        [list] => {
            let mut result = Vec::new();
            collect_leaves(list.as_list()?, &mut result);
            Ok(Value::from(result))
        },
    }
}

/// Replaces directly nested lists by their elements, one level deep.
pub fn flatten_first_level(args: &[Value]) -> EvalResult<Value> {
    match exact_args::<1>(args)? {
        [Value::Null] => Ok(Value::Null),
        [list] => {
            let mut result = Vec::new();
            for item in list.as_list()? {
                match item {
                    Value::List(nested) => result.extend_from_slice(nested),
                    other => result.push(other.clone()),
                }
            }
            Ok(Value::from(result))
        },
    }
}

/// Stable merge sort driven by a strict "less than" predicate.
///
/// The right element moves ahead only when the predicate answers exactly
/// `true`, so elements the predicate cannot order keep their relative
/// positions. Inconsistent predicates give an unspecified order but never
/// fail.
fn merge_sort(mut items: Vec<Value>, less: &dyn Fn(&Value, &Value) -> bool) -> Vec<Value> {
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let mut left = merge_sort(items, less).into_iter().peekable();
    let mut right = merge_sort(right, less).into_iter().peekable();

    let mut merged = Vec::with_capacity(left.len() + right.len());
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => less(r, l),
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        merged.extend(if take_right { right.next() } else { left.next() });
    }
    merged
}

/// Sorts a list with a caller-supplied predicate.
///
/// `precedes` is called with two elements and must answer `true` when the
/// first sorts strictly before the second. The sort is stable. Any other
/// answer, including `null`, counts as "not before".
///
/// # Example
/// ```
/// use feelib::{Value, library::list::sort, value::lambda::Lambda};
///
/// let descending = Lambda::new(|args| {
///     Value::from(args[1].compare(&args[0]).is_ok_and(|o| o.is_lt()))
/// });
/// let list: Value = [2, 3, 1].into_iter().map(Value::from).collect();
///
/// let sorted = sort(&[list, Value::Function(descending)]).unwrap();
/// assert_eq!(sorted.to_string(), "[3, 2, 1]");
/// ```
pub fn sort(args: &[Value]) -> EvalResult<Value> {
    let [list, precedes] = exact_args::<2>(args)?;
    if list.is_null() {
        return Ok(Value::Null);
    }
    let items = list.as_list()?.to_vec();
    let precedes = precedes.as_function()?;

    let less = |a: &Value, b: &Value| precedes.apply(&[a.clone(), b.clone()]) == Value::Boolean(true);
    Ok(Value::from(merge_sort(items, &less)))
}

/// Collects the arguments into a list.
pub fn as_list(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(args.to_vec()))
}

/// Returns the only element of a singleton list; `null` for any other
/// length.
pub fn as_element(args: &[Value]) -> EvalResult<Value> {
    match exact_args::<1>(args)? {
        [Value::Null] => Ok(Value::Null),
        [list] => match list.as_list()? {
            [only] => Ok(only.clone()),
            _ => Ok(Value::Null),
        },
    }
}

/// Materializes the integers of a range.
///
/// # Parameters
/// - `openStart`: `true` to exclude `start`.
/// - `start`: First integer of the range.
/// - `openEnd`: `true` to exclude `end`.
/// - `end`: Last integer of the range.
///
/// # Returns
/// The integers in ascending order; an empty list when a bound is unknown
/// or the range is empty.
///
/// # Errors
/// - A type error if a flag is not a boolean.
/// - [`FeelError::InvalidArgument`] for ranges of more than ten million
///   elements.
///
/// # Example
/// ```
/// use feelib::{Value, library::list::range_to_list};
///
/// let closed = range_to_list(&[Value::from(false), Value::from(1), Value::from(false), Value::from(5)]);
/// assert_eq!(closed.unwrap().to_string(), "[1, 2, 3, 4, 5]");
///
/// let open = range_to_list(&[Value::from(true), Value::from(1), Value::from(true), Value::from(5)]);
/// assert_eq!(open.unwrap().to_string(), "[2, 3, 4]");
/// ```
pub fn range_to_list(args: &[Value]) -> EvalResult<Value> {
    let [open_start, start, open_end, end] = exact_args::<4>(args)?;
    let (open_start, open_end) = (open_start.as_bool()?, open_end.as_bool()?);
    if start.is_null() || end.is_null() {
        return Ok(Value::from(Vec::new()));
    }

    let start = index_arg(start)?;
    let end = index_arg(end)?;
    let first = if open_start { start.checked_add(1) } else { Some(start) };
    let last = if open_end { end.checked_sub(1) } else { Some(end) };
    let (Some(first), Some(last)) = (first, last) else {
        return Err(FeelError::Overflow);
    };

    if last.checked_sub(first).is_none_or(|span| span >= MAX_RANGE_LENGTH) {
        return Err(FeelError::invalid_argument(format!("range {first}..{last} has too many elements")));
    }

    Ok((first..=last).map(Value::from).collect())
}

/// Returns the element at a 1-based position; negative positions count from
/// the end.
///
/// # Errors
/// [`FeelError::IndexOutOfBounds`] when the position addresses no element.
///
/// # Example
/// ```
/// use feelib::{Value, library::list::element_at};
///
/// let list: Value = ["a", "b", "c"].into_iter().map(Value::from).collect();
///
/// assert_eq!(element_at(&[list.clone(), Value::from(-1)]).unwrap(), Value::from("c"));
/// assert!(element_at(&[list, Value::from(0)]).is_err());
/// ```
pub fn element_at(args: &[Value]) -> EvalResult<Value> {
    let [list, at] = exact_args::<2>(args)?;
    if has_null(args) {
        return Ok(Value::Null);
    }
    let items = list.as_list()?;
    let index = index_arg(at)?;

    position(index, items.len()).map(|i| items[i].clone())
                                .ok_or_else(|| out_of_bounds(index, items.len()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::value::lambda::Lambda;

    fn nums(items: &[i64]) -> Value {
        items.iter().copied().map(Value::from).collect()
    }

    #[rstest]
    #[case(1, 3, Some(0))]
    #[case(3, 3, Some(2))]
    #[case(-1, 3, Some(2))]
    #[case(-3, 3, Some(0))]
    #[case(0, 3, None)]
    #[case(4, 3, None)]
    #[case(-4, 3, None)]
    #[case(1, 0, None)]
    fn positions(#[case] index: i64, #[case] len: usize, #[case] expected: Option<usize>) {
        assert_eq!(position(index, len), expected);
    }

    #[rstest]
    #[case(&[2], "[2, 3, 4, 5]")]
    #[case(&[-2], "[4, 5]")]
    #[case(&[2, 2], "[2, 3]")]
    #[case(&[-3, 2], "[3, 4]")]
    #[case(&[0], "[]")]
    #[case(&[6], "[]")]
    #[case(&[2, 0], "[]")]
    #[case(&[2, -1], "[]")]
    fn sublists(#[case] bounds: &[i64], #[case] expected: &str) {
        let mut args = vec![nums(&[1, 2, 3, 4, 5])];
        args.extend(bounds.iter().copied().map(Value::from));
        assert_eq!(sublist(&args).unwrap().to_string(), expected);
    }

    #[test]
    fn sublist_running_past_the_end_fails() {
        let result = sublist(&[nums(&[1, 2, 3]), Value::from(2), Value::from(5)]);
        assert!(matches!(result, Err(FeelError::IndexOutOfBounds { .. })));
    }

    #[rstest]
    #[case(1, Ok("[2, 3]"))]
    #[case(3, Ok("[1, 2]"))]
    #[case(0, Err(()))]
    #[case(4, Err(()))]
    #[case(-1, Err(()))]
    fn removal(#[case] index: i64, #[case] expected: Result<&str, ()>) {
        let result = remove(&[nums(&[1, 2, 3]), Value::from(index)]);
        assert_eq!(result.map(|v| v.to_string()).map_err(|_| ()), expected.map(str::to_owned));
    }

    #[rstest]
    #[case(1, Some(10))]
    #[case(-1, Some(30))]
    #[case(-3, Some(10))]
    #[case(0, None)]
    #[case(4, None)]
    #[case(-4, None)]
    fn element_positions(#[case] index: i64, #[case] expected: Option<i64>) {
        let result = element_at(&[nums(&[10, 20, 30]), Value::from(index)]);
        assert_eq!(result.ok(), expected.map(Value::from));
    }

    #[test]
    fn unknown_lists() {
        assert_eq!(count(&[Value::Null]).unwrap(), Value::from(0));
        assert_eq!(reverse(&[Value::Null]).unwrap(), nums(&[]));
        assert_eq!(append(&[Value::Null, Value::from(1)]).unwrap(), nums(&[1]));
        assert_eq!(flatten(&[Value::Null]).unwrap(), Value::Null);
        assert_eq!(list_contains(&[Value::Null, Value::from(1)]).unwrap(), Value::Null);
        assert_eq!(concatenate(&[nums(&[1]), Value::Null]).unwrap(), Value::Null);
    }

    #[test]
    fn contains_finds_unknown_elements() {
        let list = Value::from(vec![Value::from(1), Value::Null]);
        assert_eq!(list_contains(&[list.clone(), Value::Null]).unwrap(), Value::from(true));
        assert_eq!(list_contains(&[list, Value::from(2)]).unwrap(), Value::from(false));
    }

    #[test]
    fn distinct_and_union_keep_first_occurrences() {
        assert_eq!(distinct_values(&[nums(&[1, 2, 2, 3, 1])]).unwrap(), nums(&[1, 2, 3]));
        assert_eq!(union(&[nums(&[3, 1]), nums(&[1, 2, 3])]).unwrap(), nums(&[3, 1, 2]));
    }

    #[test]
    fn concatenation_requires_lists() {
        assert_eq!(concatenate(&[nums(&[1]), nums(&[]), nums(&[2, 3])]).unwrap(), nums(&[1, 2, 3]));
        assert!(concatenate(&[nums(&[1]), Value::from(2)]).is_err());
    }

    #[test]
    fn sort_is_stable() {
        let pair = |key: i64, tag: &str| Value::from(vec![Value::from(key), Value::from(tag)]);
        let by_key = Lambda::new(|args| {
            let key = |v: &Value| v.as_list().map(|items| items[0].clone()).unwrap_or_default();
            Value::from(key(&args[0]).compare(&key(&args[1])).is_ok_and(|o| o.is_lt()))
        });

        let list = Value::from(vec![pair(2, "x"), pair(1, "a"), pair(2, "y"), pair(1, "b")]);
        let sorted = sort(&[list, Value::Function(by_key)]).unwrap();

        assert_eq!(sorted, Value::from(vec![pair(1, "a"), pair(1, "b"), pair(2, "x"), pair(2, "y")]));
    }

    #[test]
    fn sort_tolerates_inconsistent_predicates() {
        let always = Lambda::new(|_| Value::from(true));
        let sorted = sort(&[nums(&[5, 4, 3, 2, 1, 0]), Value::Function(always)]).unwrap();

        assert_eq!(count(&[sorted]).unwrap(), Value::from(6));
    }

    #[rstest]
    #[case(false, 3, false, 3, "[3]")]
    #[case(true, 3, true, 4, "[]")]
    #[case(false, 5, false, 1, "[]")]
    #[case(false, -2, true, 1, "[-2, -1, 0]")]
    fn ranges(#[case] open_start: bool, #[case] start: i64, #[case] open_end: bool, #[case] end: i64, #[case] expected: &str) {
        let args = [Value::from(open_start), Value::from(start), Value::from(open_end), Value::from(end)];
        assert_eq!(range_to_list(&args).unwrap().to_string(), expected);
    }

    #[test]
    fn huge_ranges_are_refused() {
        let args = [Value::from(false), Value::from(0), Value::from(false), Value::from(i64::MAX)];
        assert!(matches!(range_to_list(&args), Err(FeelError::InvalidArgument { .. })));
    }

    #[test]
    fn as_element_needs_a_singleton() {
        assert_eq!(as_element(&[nums(&[7])]).unwrap(), Value::from(7));
        assert_eq!(as_element(&[nums(&[7, 8])]).unwrap(), Value::Null);
        assert_eq!(as_list(&[]).unwrap(), nums(&[]));
    }

    #[rstest]
    #[case(element_at, 0)]
    #[case(element_at, 1)]
    #[case(sublist, 1)]
    #[case(sublist, 4)]
    #[case(append, 0)]
    #[case(count, 0)]
    #[case(insert_before, 2)]
    #[case(range_to_list, 3)]
    #[case(sort, 1)]
    fn wrong_argument_counts_are_errors(#[case] f: fn(&[Value]) -> EvalResult<Value>, #[case] given: usize) {
        let args = vec![nums(&[1, 2, 3]); given];
        assert!(matches!(f(&args), Err(FeelError::ArgumentCountMismatch { found, .. }) if found == given));
    }
}
