use serde_json::Value as Json;

use crate::{
    error::ScriptError,
    library::core::Library,
    value::{core::Value, json::from_json},
};

/// One parsed call line.
struct Call<'a> {
    function: &'a str,
    args:     Vec<Value>,
    expected: Option<Value>,
}

/// Runs a call script with a library that discards diagnostics.
///
/// See [`run_script_with`] for the script format.
///
/// # Errors
/// Returns the first [`ScriptError`] met while reading or running the
/// script.
///
/// # Examples
/// ```
/// use feelib::run_script;
///
/// let script = r#"
///     // Lists are 1-based; negative positions count from the end.
///     sublist [[1, 2, 3, 4, 5], -2] => [4, 5]
///     string length ["héllo"] => 5
/// "#;
/// assert!(run_script(script, false).is_ok());
///
/// // Failures inside a function are null, not script errors.
/// assert!(run_script(r#"number ["not-a-number"] => null"#, false).is_ok());
///
/// // A wrong expectation is.
/// assert!(run_script("count [[1, 2]] => 3", false).is_err());
/// ```
pub fn run_script(source: &str, auto_print: bool) -> Result<(), ScriptError> {
    run_script_with(&Library::new(), source, auto_print)
}

/// Runs a call script against `library`.
///
/// Each non-blank line is one call: a function name (canonical or a FEEL
/// alias, which may contain spaces), a JSON array of arguments, and
/// optionally `=>` followed by the JSON of the expected result. `//` starts a
/// comment that runs to the end of the line. JSON values are decoded with
/// [`from_json`], so tagged objects such as `{"@date": "2024-01-31"}` stand
/// for values JSON cannot express.
///
/// # Parameters
/// - `library`: The library whose functions are called.
/// - `source`: The script text.
/// - `auto_print`: Print the result of every call to standard output.
///
/// # Errors
/// Returns the first [`ScriptError`] met. Calls that fail inside the library
/// return `null` and are reported to the library's sink instead.
pub fn run_script_with(library: &Library, source: &str, auto_print: bool) -> Result<(), ScriptError> {
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = strip_comment(raw).trim();
        if text.is_empty() {
            continue;
        }

        let call = parse_call(text, line)?;
        let actual = library.call(call.function, &call.args);
        log::debug!(target: "feelib::script", "line {line}: {} -> {actual}", call.function);

        if auto_print {
            println!("{actual}");
        }

        if let Some(expected) = call.expected
           && actual != expected
        {
            return Err(ScriptError::AssertionFailed { function: call.function.to_owned(),
                                                      expected: expected.to_string(),
                                                      actual: actual.to_string(),
                                                      line });
        }
    }

    Ok(())
}

/// Cuts a `//` comment, ignoring slashes inside JSON strings.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    let mut previous_slash = false;

    for (i, c) in line.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {},
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '/' if previous_slash => return &line[..i - 1],
            _ => {},
        }
        previous_slash = c == '/';
    }

    line
}

fn parse_call(text: &str, line: usize) -> Result<Call<'_>, ScriptError> {
    let Some(open) = text.find('[') else {
        return Err(ScriptError::ExpectedArgumentList { line });
    };
    let function = text[..open].trim();
    if function.is_empty() {
        return Err(ScriptError::ExpectedFunctionName { line });
    }
    if !Library::is_builtin(function) {
        return Err(ScriptError::UnknownFunction { name: function.to_owned(),
                                                  line });
    }

    let rest = &text[open..];
    let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Json>();
    let args = match stream.next() {
        Some(Ok(Json::Array(items))) => items,
        Some(Ok(_)) => return Err(ScriptError::ExpectedArgumentList { line }),
        Some(Err(e)) => return Err(invalid_json(&e, line)),
        None => return Err(ScriptError::ExpectedArgumentList { line }),
    };
    let tail = rest[stream.byte_offset()..].trim();

    let args = args.iter()
                   .map(|arg| decode(arg, line))
                   .collect::<Result<Vec<_>, _>>()?;

    let expected = if tail.is_empty() {
        None
    } else if let Some(expected) = tail.strip_prefix("=>") {
        let json = serde_json::from_str::<Json>(expected).map_err(|e| invalid_json(&e, line))?;
        Some(decode(&json, line)?)
    } else {
        return Err(ScriptError::InvalidJson { details: format!("unexpected text '{tail}' after the arguments"),
                                              line });
    };

    Ok(Call { function,
              args,
              expected })
}

fn decode(json: &Json, line: usize) -> Result<Value, ScriptError> {
    from_json(json).map_err(|e| ScriptError::InvalidValue { tag: e.tag.to_owned(),
                                                            details: e.cause.to_string(),
                                                            line })
}

fn invalid_json(e: &serde_json::Error, line: usize) -> ScriptError {
    ScriptError::InvalidJson { details: e.to_string(),
                               line }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("count [[1]] // trailing", "count [[1]] ")]
    #[case(r#"contains ["a//b", "//"] => true"#, r#"contains ["a//b", "//"] => true"#)]
    #[case(r#"contains ["\"//", "/"] // x"#, r#"contains ["\"//", "/"] "#)]
    #[case("// only a comment", "")]
    fn comments(#[case] line: &str, #[case] expected: &str) {
        assert_eq!(strip_comment(line), expected);
    }

    #[test]
    fn names_may_contain_spaces() {
        let call = parse_call(r#"string length ["abc"] => 3"#, 1).unwrap();

        assert_eq!(call.function, "string length");
        assert_eq!(call.args, [Value::from("abc")]);
        assert_eq!(call.expected, Some(Value::from(3)));
    }

    #[rstest]
    #[case("count", "Expected a JSON array")]
    #[case("[1]", "Expected a function name")]
    #[case("nope [1]", "Unknown function 'nope'")]
    #[case("count [[1]", "Invalid JSON")]
    #[case("count [[1]] = 1", "unexpected text")]
    #[case(r#"date [{"@date": "2024-02-30"}]"#, "Cannot decode @date value")]
    fn malformed_lines(#[case] text: &str, #[case] message: &str) {
        let Err(e) = parse_call(text, 7) else {
            panic!("'{text}' was accepted");
        };
        let rendered = e.to_string();

        assert!(rendered.starts_with("Error on line 7:"), "{rendered}");
        assert!(rendered.contains(message), "{rendered}");
    }

    #[test]
    fn failed_assertions_report_both_values() {
        let err = run_script("\n\nabs [-2] => 3", false).unwrap_err();

        assert_eq!(err.to_string(), "Error on line 3: Assertion failed: abs returned 2, expected 3.");
    }
}
