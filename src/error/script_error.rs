use thiserror::Error;

/// Represents all errors that can occur while running a call script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A line does not start with a function name.
    #[error("Error on line {line}: Expected a function name.")]
    ExpectedFunctionName {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Called a function that is not part of the library.
    #[error("Error on line {line}: Unknown function '{name}'.")]
    UnknownFunction {
        /// The name of the function.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// The arguments or the expected result are not valid JSON.
    #[error("Error on line {line}: Invalid JSON: {details}.")]
    InvalidJson {
        /// The message reported by the JSON reader.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// The arguments are valid JSON but not an array.
    #[error("Error on line {line}: Expected a JSON array of arguments.")]
    ExpectedArgumentList {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A JSON value, such as a tagged object (`{"@date": ...}`), could not be
    /// converted into a library value.
    #[error("Error on line {line}: Cannot decode {tag} value: {details}")]
    InvalidValue {
        /// The tag, such as `@date`, or `number` for plain numbers.
        tag:     String,
        /// Details about why the value is invalid.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A call did not produce the expected value.
    #[error("Error on line {line}: Assertion failed: {function} returned {actual}, expected {expected}.")]
    AssertionFailed {
        /// The function that was called.
        function: String,
        /// The expected value.
        expected: String,
        /// The value actually returned.
        actual:   String,
        /// The source line where the error occurred.
        line:     usize,
    },
}
