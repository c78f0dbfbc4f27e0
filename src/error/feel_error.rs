use bigdecimal::BigDecimal;
use thiserror::Error;

/// Represents every reason a built-in function call can fail.
///
/// A `FeelError` never escapes the library facade: [`crate::Library::call`]
/// records it as a diagnostic and answers `null` instead. It is still exposed so
/// that callers using [`crate::Library::try_call`] can inspect the cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeelError {
    /// Called a function that is not part of the library.
    #[error("Unknown function '{name}'.")]
    UnknownFunction {
        /// The requested name.
        name: String,
    },
    /// The wrong number of arguments was supplied to a function.
    #[error("Argument count mismatch: expected {expected}, found {found}.")]
    ArgumentCountMismatch {
        /// Human readable description of the accepted arities.
        expected: String,
        /// The number of arguments actually supplied.
        found:    usize,
    },
    /// A value had an unexpected or incompatible type.
    #[error("Type error: expected {expected}, found {found}.")]
    TypeError {
        /// The expected kind of value.
        expected: &'static str,
        /// The kind of value that was found.
        found:    &'static str,
    },
    /// A textual literal could not be converted.
    #[error("Invalid {kind} literal '{literal}'.")]
    InvalidLiteral {
        /// The kind of literal (`number`, `date`, ...).
        kind:    &'static str,
        /// The offending text.
        literal: String,
    },
    /// An argument was invalid or out of range.
    #[error("Invalid argument: {details}.")]
    InvalidArgument {
        /// Details about why the argument is invalid.
        details: String,
    },
    /// Tried to access a list element outside the allowed positions.
    #[error("Index '{index}' out of bounds [1, {length}].")]
    IndexOutOfBounds {
        /// The position that was requested.
        index:  i64,
        /// The length of the list.
        length: usize,
    },
    /// Attempted division by zero.
    #[error("Division by zero.")]
    DivisionByZero,
    /// A decimal operation left the representable range.
    #[error("Arithmetic overflow while trying to compute result.")]
    Overflow,
    /// Tried to use a fractional number where an integer was required.
    #[error("Value {value} is fractional and cannot be used as an integer.")]
    Fractional {
        /// The fractional value.
        value: BigDecimal,
    },
    /// A number does not fit the machine integer it has to be converted to.
    #[error("Value {value} is out of range.")]
    OutOfRange {
        /// The out-of-range value.
        value: BigDecimal,
    },
    /// The regular-expression engine rejected a pattern, flag or replacement.
    #[error("Invalid pattern: {details}.")]
    Pattern {
        /// The message reported for the pattern.
        details: String,
    },
    /// A duration literal mixes year-month and day-time components.
    #[error("Duration '{literal}' mixes year-month and day-time components.")]
    MixedDuration {
        /// The offending literal.
        literal: String,
    },
}

impl FeelError {
    /// Shorthand for an [`FeelError::InvalidArgument`] with the given details.
    pub fn invalid_argument(details: impl Into<String>) -> Self {
        Self::InvalidArgument { details: details.into() }
    }

    /// Shorthand for an [`FeelError::InvalidLiteral`].
    pub fn invalid_literal(kind: &'static str, literal: impl Into<String>) -> Self {
        Self::InvalidLiteral { kind,
                               literal: literal.into() }
    }
}

impl From<regex::Error> for FeelError {
    fn from(e: regex::Error) -> Self {
        Self::Pattern { details: e.to_string() }
    }
}
