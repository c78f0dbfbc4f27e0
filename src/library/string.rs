use regex::{NoExpand, Regex, RegexBuilder};

use crate::{
    error::FeelError,
    library::core::{EvalResult, arity_mismatch, exact_args, has_null},
    util::num::{decimal_to_i64_checked, usize_to_decimal},
    value::core::Value,
};

/// Applies a two-string predicate, answering `null` when either operand is
/// unknown.
fn test_strings(args: &[Value], test: fn(&str, &str) -> bool) -> EvalResult<Value> {
    let [string, needle] = exact_args::<2>(args)?;
    if has_null(args) {
        return Ok(Value::Null);
    }
    Ok(Value::from(test(string.as_str()?, needle.as_str()?)))
}

/// Tests whether `string` contains `match`.
///
/// # Example
/// ```
/// use feelib::{Value, library::string::contains};
///
/// assert_eq!(contains(&[Value::from("foobar"), Value::from("ob")]).unwrap(), Value::Boolean(true));
/// assert_eq!(contains(&[Value::Null, Value::from("ob")]).unwrap(), Value::Null);
/// ```
pub fn contains(args: &[Value]) -> EvalResult<Value> {
    test_strings(args, |s, m| s.contains(m))
}

/// Tests whether `string` starts with `match`.
pub fn starts_with(args: &[Value]) -> EvalResult<Value> {
    test_strings(args, |s, m| s.starts_with(m))
}

/// Tests whether `string` ends with `match`.
pub fn ends_with(args: &[Value]) -> EvalResult<Value> {
    test_strings(args, |s, m| s.ends_with(m))
}

/// Counts the characters (not bytes) of a string.
pub fn string_length(args: &[Value]) -> EvalResult<Value> {
    match exact_args::<1>(args)? {
        [Value::Null] => Ok(Value::Null),
        [value] => Ok(Value::from(usize_to_decimal(value.as_str()?.chars().count()))),
    }
}

/// Converts a string to upper case.
pub fn upper_case(args: &[Value]) -> EvalResult<Value> {
    match exact_args::<1>(args)? {
        [Value::Null] => Ok(Value::Null),
        [value] => Ok(Value::from(value.as_str()?.to_uppercase())),
    }
}

/// Converts a string to lower case.
pub fn lower_case(args: &[Value]) -> EvalResult<Value> {
    match exact_args::<1>(args)? {
        [Value::Null] => Ok(Value::Null),
        [value] => Ok(Value::from(value.as_str()?.to_lowercase())),
    }
}

/// Extracts part of a string.
///
/// Positions count characters from 1. A negative start counts from the end,
/// so `-1` is the last character. Without a length the rest of the string is
/// returned.
///
/// # Parameters
/// - `args`: `[string, start]` or `[string, start, length]`.
///
/// # Errors
/// - [`FeelError::IndexOutOfBounds`] if `start` is `0`, lies before the first
///   character or more than one past the last, or if `length` runs past the
///   end.
/// - [`FeelError::InvalidArgument`] for a negative length.
///
/// # Example
/// ```
/// use feelib::{Value, library::string::substring};
///
/// let s = Value::from("foobar");
///
/// assert_eq!(substring(&[s.clone(), Value::from(3)]).unwrap(), Value::from("obar"));
/// assert_eq!(substring(&[s.clone(), Value::from(-2)]).unwrap(), Value::from("ar"));
/// assert_eq!(substring(&[s.clone(), Value::from(2), Value::from(3)]).unwrap(), Value::from("oob"));
/// assert!(substring(&[s, Value::from(0)]).is_err());
/// ```
pub fn substring(args: &[Value]) -> EvalResult<Value> {
    let (string, start, length) = match args {
        [string, start] => (string, start, None),
        [string, start, length] => (string, start, Some(length)),
        _ => return Err(arity_mismatch("2 or 3", args.len())),
    };
    if has_null(args) {
        return Ok(Value::Null);
    }
    let chars = string.as_str()?.chars().collect::<Vec<_>>();
    let start = decimal_to_i64_checked(start.as_number()?)?;
    let out_of_bounds = || FeelError::IndexOutOfBounds { index:  start,
                                                         length: chars.len(), };

    let from = match start {
        0 => return Err(out_of_bounds()),
        s if s > 0 => usize::try_from(s - 1).map_err(|_| out_of_bounds())?,
        s => chars.len()
                  .checked_sub(usize::try_from(s.unsigned_abs()).map_err(|_| out_of_bounds())?)
                  .ok_or_else(out_of_bounds)?,
    };
    if from > chars.len() {
        return Err(out_of_bounds());
    }

    let to = match length {
        None => chars.len(),
        Some(length) => {
            let length = decimal_to_i64_checked(length.as_number()?)?;
            let length = usize::try_from(length).map_err(|_| {
                                                     FeelError::invalid_argument(format!("negative length {length}"))
                                                 })?;
            match from.checked_add(length) {
                Some(to) if to <= chars.len() => to,
                _ => return Err(out_of_bounds()),
            }
        },
    };

    Ok(Value::from(chars[from..to].iter().collect::<String>()))
}

/// Returns the part of `string` before the first occurrence of `match`, or
/// the empty string if there is none.
///
/// # Example
/// ```
/// use feelib::{Value, library::string::substring_before};
///
/// let r = substring_before(&[Value::from("foobar"), Value::from("bar")]).unwrap();
/// assert_eq!(r, Value::from("foo"));
///
/// let r = substring_before(&[Value::from("foobar"), Value::from("xyz")]).unwrap();
/// assert_eq!(r, Value::from(""));
/// ```
pub fn substring_before(args: &[Value]) -> EvalResult<Value> {
    let [string, needle] = exact_args::<2>(args)?;
    if has_null(args) {
        return Ok(Value::Null);
    }
    let (string, needle) = (string.as_str()?, needle.as_str()?);
    Ok(Value::from(string.find(needle).map_or("", |i| &string[..i])))
}

/// Returns the part of `string` after the first occurrence of `match`, or the
/// empty string if there is none.
pub fn substring_after(args: &[Value]) -> EvalResult<Value> {
    let [string, needle] = exact_args::<2>(args)?;
    if has_null(args) {
        return Ok(Value::Null);
    }
    let (string, needle) = (string.as_str()?, needle.as_str()?);
    Ok(Value::from(string.find(needle).map_or("", |i| &string[i + needle.len()..])))
}

/// Options derived from a flag string.
struct Flags {
    literal: bool,
}

/// Compiles `pattern` with the flag letters `s` (dot matches newlines), `m`
/// (multi-line anchors), `i` (case-insensitive), `x` (ignore pattern
/// whitespace) and `q` (match the pattern literally).
fn compile(pattern: &str, flags: &str) -> EvalResult<(Regex, Flags)> {
    let mut options = Flags { literal: false };
    let (mut dot_all, mut multi_line, mut ignore_case, mut extended) = (false, false, false, false);

    for flag in flags.chars() {
        match flag {
            's' => dot_all = true,
            'm' => multi_line = true,
            'i' => ignore_case = true,
            'x' => extended = true,
            'q' => options.literal = true,
            other => {
                return Err(FeelError::Pattern { details: format!("unknown flag '{other}'") });
            },
        }
    }

    let source = if options.literal {
        regex::escape(pattern)
    } else {
        pattern.to_owned()
    };
    let regex = RegexBuilder::new(&source).dot_matches_new_line(dot_all)
                                          .multi_line(multi_line)
                                          .case_insensitive(ignore_case)
                                          .ignore_whitespace(extended && !options.literal)
                                          .build()?;
    Ok((regex, options))
}

/// Rewrites an XPath replacement string (`$1`, `\$`, `\\`) into the syntax
/// of the `regex` crate.
fn translate_replacement(replacement: &str) -> EvalResult<String> {
    let invalid = || FeelError::Pattern { details: format!("invalid replacement '{replacement}'") };

    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\\') => out.push('\\'),
                Some('$') => out.push_str("$$"),
                _ => return Err(invalid()),
            },
            '$' => {
                let mut group = String::new();
                while let Some(d) = chars.next_if(char::is_ascii_digit) {
                    group.push(d);
                }
                if group.is_empty() {
                    return Err(invalid());
                }
                out.push_str(&format!("${{{group}}}"));
            },
            c => out.push(c),
        }
    }
    Ok(out)
}

/// Replaces every match of a regular expression.
///
/// The replacement may refer to capture groups as `$1`, `$2`, ...; `\$` and
/// `\\` stand for a literal dollar sign and backslash. With the `q` flag both
/// the pattern and the replacement are taken literally.
///
/// # Parameters
/// - `args`: `[input, pattern, replacement]` or
///   `[input, pattern, replacement, flags]`.
///
/// # Errors
/// - [`FeelError::Pattern`] for an invalid pattern, flag or replacement, or
///   a pattern that matches the empty string.
///
/// # Example
/// ```
/// use feelib::{Value, library::string::replace};
///
/// let r = replace(&[Value::from("abcd"), Value::from("(ab)|(a)"), Value::from("[1=$1][2=$2]")]).unwrap();
/// assert_eq!(r, Value::from("[1=ab][2=]cd"));
///
/// let r = replace(&[Value::from("a.b.c"), Value::from("."), Value::from("$"), Value::from("q")]).unwrap();
/// assert_eq!(r, Value::from("a$b$c"));
/// ```
pub fn replace(args: &[Value]) -> EvalResult<Value> {
    let (input, pattern, replacement, flags) = match args {
        [input, pattern, replacement] => (input, pattern, replacement, None),
        [input, pattern, replacement, flags] => (input, pattern, replacement, Some(flags)),
        _ => return Err(arity_mismatch("3 or 4", args.len())),
    };
    if has_null(&args[..3]) {
        return Ok(Value::Null);
    }
    let (input, pattern, replacement) = (input.as_str()?, pattern.as_str()?, replacement.as_str()?);
    let flags = match flags {
        None | Some(Value::Null) => "",
        Some(flags) => flags.as_str()?,
    };

    let (regex, options) = compile(pattern, flags)?;
    if regex.is_match("") {
        return Err(FeelError::Pattern { details: format!("'{pattern}' matches the empty string") });
    }

    let replaced = if options.literal {
        regex.replace_all(input, NoExpand(replacement))
    } else {
        regex.replace_all(input, translate_replacement(replacement)?.as_str())
    };
    Ok(Value::from(replaced.into_owned()))
}

/// Tests whether some part of `input` matches a regular expression.
///
/// An unknown input or pattern answers `false`.
///
/// # Errors
/// - [`FeelError::Pattern`] for an invalid pattern or flag.
///
/// # Example
/// ```
/// use feelib::{Value, library::string::matches};
///
/// let r = matches(&[Value::from("Hello"), Value::from("^h.*O$"), Value::from("i")]).unwrap();
/// assert_eq!(r, Value::Boolean(true));
///
/// assert_eq!(matches(&[Value::Null, Value::from("a")]).unwrap(), Value::Boolean(false));
/// ```
pub fn matches(args: &[Value]) -> EvalResult<Value> {
    let (input, pattern, flags) = match args {
        [input, pattern] => (input, pattern, None),
        [input, pattern, flags] => (input, pattern, Some(flags)),
        _ => return Err(arity_mismatch("2 or 3", args.len())),
    };
    if input.is_null() || pattern.is_null() {
        return Ok(Value::from(false));
    }
    let (input, pattern) = (input.as_str()?, pattern.as_str()?);
    let flags = match flags {
        None | Some(Value::Null) => "",
        Some(flags) => flags.as_str()?,
    };

    let (regex, _) = compile(pattern, flags)?;
    Ok(Value::from(regex.is_match(input)))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn call(f: fn(&[Value]) -> EvalResult<Value>, args: &[&str]) -> EvalResult<Value> {
        f(&args.iter().map(|a| Value::from(*a)).collect::<Vec<_>>())
    }

    #[rstest]
    #[case("foobar", 1, None, Some("foobar"))]
    #[case("foobar", 6, None, Some("r"))]
    #[case("foobar", 7, None, Some(""))]
    #[case("foobar", 8, None, None)]
    #[case("foobar", -6, None, Some("foobar"))]
    #[case("foobar", -7, None, None)]
    #[case("foobar", 0, None, None)]
    #[case("foobar", -3, Some(2), Some("ba"))]
    #[case("foobar", 5, Some(2), Some("ar"))]
    #[case("foobar", 5, Some(3), None)]
    #[case("foobar", 1, Some(-1), None)]
    #[case("héllo wörld", -5, Some(2), Some("wö"))]
    fn substring_positions(#[case] s: &str,
                           #[case] start: i64,
                           #[case] length: Option<i64>,
                           #[case] expected: Option<&str>) {
        let mut args = vec![Value::from(s), Value::from(start)];
        args.extend(length.map(Value::from));

        assert_eq!(substring(&args).ok(), expected.map(Value::from));
    }

    #[test]
    fn length_counts_characters() {
        assert_eq!(call(string_length, &["héllo"]).unwrap(), Value::from(5));
        assert_eq!(call(string_length, &["😀"]).unwrap(), Value::from(1));
    }

    #[test]
    fn case_conversion() {
        assert_eq!(call(upper_case, &["aBc"]).unwrap(), Value::from("ABC"));
        assert_eq!(call(lower_case, &["aBc"]).unwrap(), Value::from("abc"));
        assert_eq!(upper_case(&[Value::Null]).unwrap(), Value::Null);
    }

    #[test]
    fn substring_after_missing_match_is_empty() {
        assert_eq!(call(substring_after, &["foobar", "ob"]).unwrap(), Value::from("ar"));
        assert_eq!(call(substring_after, &["foobar", "x"]).unwrap(), Value::from(""));
        assert_eq!(substring_after(&[Value::from("a"), Value::Null]).unwrap(), Value::Null);
    }

    #[rstest]
    #[case("abcd", "ab", "xx", "", "xxcd")]
    #[case("abracadabra", "a(.)", "a$1$1", "", "abbraccaddabbra")]
    #[case("darted", "^(.*?)d(.*)$", "$1c$2", "", "carted")]
    #[case("AAA", "a", "b", "i", "bbb")]
    #[case("a b", "a b", "c", "x", "a b")]
    #[case("price", "e", "\\$", "", "pric$")]
    #[case("one\ntwo", "^t", "T", "m", "one\nTwo")]
    fn replaces_matches(#[case] input: &str,
                        #[case] pattern: &str,
                        #[case] replacement: &str,
                        #[case] flags: &str,
                        #[case] expected: &str) {
        let result = call(replace, &[input, pattern, replacement, flags]).unwrap();
        assert_eq!(result, Value::from(expected));
    }

    #[rstest]
    #[case("abc", "x*", "y", "")]
    #[case("abc", "(", "y", "")]
    #[case("abc", "b", "$x", "")]
    #[case("abc", "b", "\\n", "")]
    #[case("abc", "b", "y", "z")]
    fn rejects_bad_patterns(#[case] input: &str,
                            #[case] pattern: &str,
                            #[case] replacement: &str,
                            #[case] flags: &str) {
        let result = call(replace, &[input, pattern, replacement, flags]);
        assert!(matches!(result, Err(FeelError::Pattern { .. })));
    }

    #[test]
    fn markup_in_input_is_plain_text() {
        let result = call(matches, &["<a>&amp;</a>", "&amp;"]).unwrap();
        assert_eq!(result, Value::Boolean(true));

        let result = call(replace, &["<b>x</b>", "<b>", "["]).unwrap();
        assert_eq!(result, Value::from("[x</b>"));
    }

    #[test]
    fn wrong_argument_counts_are_errors() {
        assert!(matches!(call(substring, &["foobar"]), Err(FeelError::ArgumentCountMismatch { .. })));
        assert!(matches!(call(replace, &["a", "b"]), Err(FeelError::ArgumentCountMismatch { .. })));
        assert!(matches!(call(matches, &["a"]), Err(FeelError::ArgumentCountMismatch { .. })));
        assert!(matches!(call(contains, &[]), Err(FeelError::ArgumentCountMismatch { .. })));
        assert!(matches!(call(upper_case, &["a", "b"]), Err(FeelError::ArgumentCountMismatch { .. })));
    }

    #[test]
    fn matches_with_flags() {
        assert_eq!(call(matches, &["a\nb", "a.b"]).unwrap(), Value::Boolean(false));
        assert_eq!(call(matches, &["a\nb", "a.b", "s"]).unwrap(), Value::Boolean(true));
        assert!(call(matches, &["abc", "[", ""]).is_err());
    }
}
