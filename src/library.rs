/// Boolean functions with three-valued logic.
///
/// Implements `not`, `and` (`all`) and `or` (`any`) over the closed
/// [`boolean::Tribool`] enumeration, where anything other than exactly `true`
/// or `false` is unknown.
pub mod boolean;
/// Context functions.
pub mod context;
/// Conversion of arbitrary values to strings.
pub mod conversion;
/// The function table and the [`core::Library`] facade.
///
/// Every built-in is registered once in a static table with its canonical
/// name, its FEEL aliases and its accepted argument counts. The facade looks
/// functions up, checks arity and applies the error policy: a failed call
/// answers `null` and produces a diagnostic record.
///
/// # Responsibilities
/// - Declares [`core::EvalResult`], the return type of every built-in.
/// - Resolves names and aliases and validates argument counts.
/// - Turns failures into `null` and reports them to the installed sink.
pub mod core;
/// Date and date-time construction and field extraction.
pub mod date;
/// Duration parsing and component extraction.
pub mod duration;
/// List functions.
///
/// Positions are 1-based and negative positions count from the end. Every
/// function returns a fresh list and leaves its arguments untouched.
pub mod list;
/// Number parsing, rounding and aggregates.
///
/// Every result is a [`bigdecimal::BigDecimal`] rounded half to even to 64
/// significant digits. Exponent overflow and division by zero are reported as
/// failures instead of panicking.
pub mod numeric;
/// String functions, including regular-expression matching and replacement.
pub mod string;
/// Time construction, field extraction and offsets.
pub mod time;
