/// Built-in call failures.
///
/// Defines the causes that make a single built-in function call fail: malformed
/// literals, type mismatches, out-of-domain arguments and arithmetic or
/// pattern-engine failures. The library facade turns every one of them into an
/// unknown (`null`) result and hands the cause to the diagnostic sink.
pub mod feel_error;
/// Call-script errors.
///
/// Contains the errors raised while reading or executing a call script: invalid
/// JSON arguments, unknown function names and failed assertions. Every variant
/// carries the 1-based source line.
pub mod script_error;

pub use feel_error::FeelError;
pub use script_error::ScriptError;
