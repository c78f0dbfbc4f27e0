use std::{fmt, sync::Arc};

use crate::{
    diagnostics::{Diagnostic, DiagnosticSink, SilentSink},
    error::FeelError,
    library::{boolean, context, conversion, date, duration, list, numeric, string, time},
    value::core::Value,
};

/// Result type returned by every built-in function.
pub type EvalResult<T> = Result<T, FeelError>;

/// Type alias for builtin function handlers.
///
/// A builtin receives a slice of argument values whose length already matches
/// its [`Arity`].
type BuiltinFn = fn(&[Value]) -> EvalResult<Value>;

/// Specifies the allowed number of arguments for a builtin.
///
/// - `Exact(n)` means the builtin must receive exactly `n` arguments.
/// - `OneOf(slice)` means the builtin accepts any arity listed in `slice`.
/// - `AtLeast(n)` means the builtin is variadic with at least `n` arguments.
#[derive(Debug, Clone, Copy)]
pub enum Arity {
    /// Exactly this many arguments.
    Exact(usize),
    /// Any of the listed counts.
    OneOf(&'static [usize]),
    /// This many arguments or more.
    AtLeast(usize),
}

impl Arity {
    /// Tests whether the given argument count satisfies this arity constraint.
    ///
    /// Returns `true` if the count is permitted, `false` otherwise.
    #[must_use]
    pub fn check(&self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == *m,
            Self::OneOf(arr) => arr.contains(&n),
            Self::AtLeast(m) => n >= *m,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::OneOf(counts) => {
                let counts = counts.iter().map(ToString::to_string).collect::<Vec<_>>();
                write!(f, "{}", counts.join(" or "))
            },
            Self::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Defines builtin functions by generating a lookup table and a name list.
///
/// Each entry provides:
/// - a canonical name followed by its FEEL aliases (`"a" | "b"`),
/// - the accepted arity,
/// - a function pointer implementing the builtin.
///
/// The macro produces:
/// - `BuiltinDef` (internal metadata),
/// - `BUILTIN_TABLE` (static table for lookup),
/// - `BUILTIN_FUNCTIONS` (public list of canonical builtin names).
macro_rules! builtin_functions {
    (
        $(
            $name:literal $(| $alias:literal)* => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        struct BuiltinDef {
            name:    &'static str,
            aliases: &'static [&'static str],
            arity:   Arity,
            func:    BuiltinFn,
        }
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, aliases: &[$($alias),*], arity: $arity, func: $func },
            )*
        ];
        /// Canonical names of every built-in function.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    // Numbers
    "number"                                        => { arity: Arity::OneOf(&[1, 3]), func: numeric::number },
    "decimal"                                       => { arity: Arity::Exact(2), func: numeric::decimal },
    "floor"                                         => { arity: Arity::Exact(1), func: numeric::floor },
    "ceiling"                                       => { arity: Arity::Exact(1), func: numeric::ceiling },
    "abs"                                           => { arity: Arity::Exact(1), func: numeric::abs },
    "modulo"                                        => { arity: Arity::Exact(2), func: numeric::modulo },
    "odd"                                           => { arity: Arity::Exact(1), func: |args| numeric::parity(args, true) },
    "even"                                          => { arity: Arity::Exact(1), func: |args| numeric::parity(args, false) },
    "min"                                           => { arity: Arity::AtLeast(1), func: |args| numeric::aggregate(numeric::Aggregate::Min, args) },
    "max"                                           => { arity: Arity::AtLeast(1), func: |args| numeric::aggregate(numeric::Aggregate::Max, args) },
    "sum"                                           => { arity: Arity::AtLeast(1), func: |args| numeric::aggregate(numeric::Aggregate::Sum, args) },
    "mean"                                          => { arity: Arity::AtLeast(1), func: |args| numeric::aggregate(numeric::Aggregate::Mean, args) },
    "product"                                       => { arity: Arity::AtLeast(1), func: |args| numeric::aggregate(numeric::Aggregate::Product, args) },

    // Booleans
    "not"                                           => { arity: Arity::Exact(1), func: boolean::not },
    "and" | "all"                                   => { arity: Arity::AtLeast(1), func: boolean::and },
    "or" | "any"                                    => { arity: Arity::AtLeast(1), func: boolean::or },

    // Strings
    "string"                                        => { arity: Arity::Exact(1), func: conversion::string },
    "contains"                                      => { arity: Arity::Exact(2), func: string::contains },
    "startsWith" | "starts with"                    => { arity: Arity::Exact(2), func: string::starts_with },
    "endsWith" | "ends with"                        => { arity: Arity::Exact(2), func: string::ends_with },
    "stringLength" | "string length"                => { arity: Arity::Exact(1), func: string::string_length },
    "substring"                                     => { arity: Arity::OneOf(&[2, 3]), func: string::substring },
    "upperCase" | "upper case"                      => { arity: Arity::Exact(1), func: string::upper_case },
    "lowerCase" | "lower case"                      => { arity: Arity::Exact(1), func: string::lower_case },
    "substringBefore" | "substring before"          => { arity: Arity::Exact(2), func: string::substring_before },
    "substringAfter" | "substring after"            => { arity: Arity::Exact(2), func: string::substring_after },
    "replace"                                       => { arity: Arity::OneOf(&[3, 4]), func: string::replace },
    "matches"                                       => { arity: Arity::OneOf(&[2, 3]), func: string::matches },

    // Dates and date-times
    "date"                                          => { arity: Arity::OneOf(&[1, 3]), func: date::date },
    "dateAndTime" | "date and time"                 => { arity: Arity::OneOf(&[1, 2]), func: date::date_and_time },
    "year"                                          => { arity: Arity::Exact(1), func: date::year },
    "month"                                         => { arity: Arity::Exact(1), func: date::month },
    "day"                                           => { arity: Arity::Exact(1), func: date::day },
    "yearsAndMonthsDuration"
        | "years and months duration"               => { arity: Arity::Exact(2), func: date::years_and_months_duration },

    // Times
    "time"                                          => { arity: Arity::OneOf(&[1, 3, 4]), func: time::time },
    "hour"                                          => { arity: Arity::Exact(1), func: time::hour },
    "minute"                                        => { arity: Arity::Exact(1), func: time::minute },
    "second"                                        => { arity: Arity::Exact(1), func: time::second },
    "timezone"                                      => { arity: Arity::Exact(1), func: time::timezone },
    "timeOffset" | "time offset"                    => { arity: Arity::Exact(1), func: time::timezone },

    // Durations
    "duration"                                      => { arity: Arity::Exact(1), func: duration::duration },
    "years"                                         => { arity: Arity::Exact(1), func: duration::years },
    "months"                                        => { arity: Arity::Exact(1), func: duration::months },
    "days"                                          => { arity: Arity::Exact(1), func: duration::days },
    "hours"                                         => { arity: Arity::Exact(1), func: duration::hours },
    "minutes"                                       => { arity: Arity::Exact(1), func: duration::minutes },
    "seconds"                                       => { arity: Arity::Exact(1), func: duration::seconds },

    // Lists
    "listContains" | "list contains"                => { arity: Arity::Exact(2), func: list::list_contains },
    "append"                                        => { arity: Arity::AtLeast(1), func: list::append },
    "count"                                         => { arity: Arity::Exact(1), func: list::count },
    "sublist"                                       => { arity: Arity::OneOf(&[2, 3]), func: list::sublist },
    "concatenate"                                   => { arity: Arity::AtLeast(1), func: list::concatenate },
    "insertBefore" | "insert before"                => { arity: Arity::Exact(3), func: list::insert_before },
    "remove"                                        => { arity: Arity::Exact(2), func: list::remove },
    "reverse"                                       => { arity: Arity::Exact(1), func: list::reverse },
    "indexOf" | "index of"                          => { arity: Arity::Exact(2), func: list::index_of },
    "union"                                         => { arity: Arity::AtLeast(1), func: list::union },
    "distinctValues" | "distinct values"            => { arity: Arity::Exact(1), func: list::distinct_values },
    "flatten"                                       => { arity: Arity::Exact(1), func: list::flatten },
    "flattenFirstLevel"                             => { arity: Arity::Exact(1), func: list::flatten_first_level },
    "sort"                                          => { arity: Arity::Exact(2), func: list::sort },
    "asList"                                        => { arity: Arity::AtLeast(0), func: list::as_list },
    "asElement"                                     => { arity: Arity::Exact(1), func: list::as_element },
    "rangeToList"                                   => { arity: Arity::Exact(4), func: list::range_to_list },
    "elementAt"                                     => { arity: Arity::Exact(2), func: list::element_at },

    // Contexts
    "contextEqual"                                  => { arity: Arity::Exact(2), func: context::context_equal },
    "contextNotEqual"                               => { arity: Arity::Exact(2), func: context::context_not_equal },
    "getValue" | "get value"                        => { arity: Arity::Exact(2), func: context::get_value },
    "getEntries" | "get entries"                    => { arity: Arity::Exact(1), func: context::get_entries },
}

fn lookup(name: &str) -> Option<&'static BuiltinDef> {
    BUILTIN_TABLE.iter()
                 .find(|b| b.name == name || b.aliases.contains(&name))
}

/// Borrows the arguments of a built-in that takes exactly `N` of them.
///
/// # Errors
/// [`FeelError::ArgumentCountMismatch`] if `args` does not hold `N` values.
pub(crate) fn exact_args<const N: usize>(args: &[Value]) -> EvalResult<&[Value; N]> {
    args.try_into().map_err(|_| arity_mismatch(N, args.len()))
}

/// Builds the error for a call with `found` arguments where `expected` were
/// accepted.
pub(crate) fn arity_mismatch(expected: impl fmt::Display, found: usize) -> FeelError {
    FeelError::ArgumentCountMismatch { expected: expected.to_string(),
                                       found }
}

/// Returns `true` if any argument is the unknown value.
///
/// Most built-ins answer `null` for such calls without reporting anything.
pub(crate) fn has_null(args: &[Value]) -> bool {
    args.iter().any(Value::is_null)
}

/// Returns the elements an aggregate function works on.
///
/// A single list argument stands for its elements. A single `null` argument
/// is an unknown list and, like an empty argument list, yields `None`.
/// Anything else is taken as the elements themselves.
pub(crate) fn variadic_items(args: &[Value]) -> Option<&[Value]> {
    match args {
        [Value::List(items)] => Some(items.as_slice()),
        [] | [Value::Null] => None,
        _ => Some(args),
    }
}

/// Describes one built-in function for listings.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    /// The canonical (camel case) name.
    pub name:    &'static str,
    /// FEEL names that resolve to the same function.
    pub aliases: &'static [&'static str],
    /// Accepted argument counts.
    pub arity:   Arity,
}

/// The built-in function library.
///
/// A `Library` resolves function names, checks argument counts and applies
/// the error policy: a call that fails answers `null` and hands a
/// [`Diagnostic`] to the installed sink. It holds no other state and can be
/// shared freely between threads.
///
/// # Example
/// ```
/// use feelib::{Library, Value};
///
/// let library = Library::new();
///
/// let length = library.call("string length", &[Value::from("héllo")]);
/// assert_eq!(length, Value::from(5));
///
/// // Failures become null.
/// assert_eq!(library.call("number", &[Value::from("not-a-number")]), Value::Null);
/// assert!(library.try_call("number", &[Value::from("not-a-number")]).is_err());
/// ```
#[derive(Clone)]
pub struct Library {
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library").finish_non_exhaustive()
    }
}

impl Library {
    /// Creates a library that discards diagnostics.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Arc::new(SilentSink))
    }

    /// Creates a library that reports failed calls to `sink`.
    #[must_use]
    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }

    /// Calls a built-in function, turning every failure into `null`.
    ///
    /// # Parameters
    /// - `name`: Canonical name or FEEL alias of the function.
    /// - `args`: The argument values.
    ///
    /// # Returns
    /// The function result, or [`Value::Null`] if the call failed. Failures
    /// are reported to the diagnostic sink.
    #[must_use]
    pub fn call(&self, name: &str, args: &[Value]) -> Value {
        self.try_call(name, args).unwrap_or_else(|cause| {
                                      self.sink.record(&Diagnostic::new(name, args, &cause));
                                      Value::Null
                                  })
    }

    /// Calls a built-in function and returns the failure cause instead of
    /// `null`. Nothing is reported to the sink.
    ///
    /// # Errors
    /// - [`FeelError::UnknownFunction`] if `name` is not a built-in.
    /// - [`FeelError::ArgumentCountMismatch`] if the arity does not match.
    /// - Whatever the function itself fails with.
    pub fn try_call(&self, name: &str, args: &[Value]) -> EvalResult<Value> {
        let builtin = lookup(name).ok_or_else(|| FeelError::UnknownFunction { name: name.to_owned() })?;

        if !builtin.arity.check(args.len()) {
            return Err(arity_mismatch(builtin.arity, args.len()));
        }

        (builtin.func)(args)
    }

    /// Returns `true` if `name` is a canonical name or alias of a built-in.
    #[must_use]
    pub fn is_builtin(name: &str) -> bool {
        lookup(name).is_some()
    }

    /// Lists every built-in function in registration order.
    pub fn functions() -> impl Iterator<Item = Signature> {
        BUILTIN_TABLE.iter().map(|b| Signature { name:    b.name,
                                                 aliases: b.aliases,
                                                 arity:   b.arity, })
    }
}
