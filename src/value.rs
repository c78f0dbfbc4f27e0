/// The `Value` enum and its conversions.
///
/// Declares every kind of value the library receives and produces (numbers,
/// booleans, strings, temporal values, lists, contexts, callbacks and the
/// distinguished unknown value) together with typed accessors, ordering and
/// display.
pub mod core;
/// Structured key/value records.
///
/// Defines [`context::Context`], an insertion-ordered mapping whose equality
/// ignores order.
pub mod context;
/// Year-month and day-time durations.
///
/// Defines [`duration::Duration`] and its ISO-8601 literal lexer and parser.
pub mod duration;
/// JSON decoding.
///
/// Converts `serde_json` values into library values, including the tagged
/// objects used by call scripts for temporal values and comparators.
pub mod json;
/// Caller-supplied callbacks.
///
/// Wraps user functions, such as the predicate handed to `sort`, so they can
/// travel inside a [`core::Value`].
pub mod lambda;
/// Offset times and zoned date-times.
///
/// Defines [`temporal::OffsetTime`] and [`temporal::ZonedDateTime`] and the
/// literal parsers for dates, times and date-times.
pub mod temporal;
