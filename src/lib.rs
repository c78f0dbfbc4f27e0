//! # feelib
//!
//! feelib is the built-in function library of a FEEL (Friendly Enough
//! Expression Language) evaluator written in Rust. It provides the numeric,
//! boolean, string, temporal, list and context functions an evaluator calls
//! with already-evaluated operands, following FEEL's value semantics:
//! decimal arithmetic, three-valued logic, 1-based and negative list
//! positions, offset- and zone-aware temporal values, and failures that
//! evaluate to `null` instead of aborting.
//!
//! ```
//! use feelib::{Library, Value};
//!
//! let library = Library::new();
//! let list: Value = (1..=5).map(Value::from).collect();
//!
//! assert_eq!(library.call("elementAt", &[list.clone(), Value::from(-1)]), Value::from(5));
//! assert_eq!(library.call("elementAt", &[list, Value::from(9)]), Value::Null);
//! ```

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

/// Diagnostic records for failed calls and the sinks that receive them.
///
/// The library never logs through global state. A [`diagnostics::DiagnosticSink`]
/// is injected when a [`Library`] is built, and every call that fails hands it
/// one [`diagnostics::Diagnostic`] holding the function name, the arguments in
/// display form and the cause.
///
/// # Responsibilities
/// - Defines the record type and the sink trait.
/// - Provides a silent sink, a `log` forwarding sink and an in-memory sink.
pub mod diagnostics;
/// Provides the error types of the crate.
///
/// [`error::FeelError`] describes why a single built-in call failed;
/// [`error::ScriptError`] describes why a call script could not be read or
/// run, with the offending line.
pub mod error;
/// The built-in functions, grouped by the kind of value they work on, and the
/// facade that dispatches calls to them.
pub mod library;
/// Line-oriented call scripts.
///
/// A call script lists function calls with JSON arguments and optional
/// expected results. Scripts drive the command-line tool and the executable
/// examples of the user guide.
pub mod script;
/// General utilities for safe numeric conversion.
pub mod util;
/// Defines every value the library receives and produces.
///
/// # Responsibilities
/// - Declares the [`Value`] enum and its typed accessors.
/// - Implements temporal values, durations, contexts and callbacks.
/// - Decodes JSON documents into values.
pub mod value;

pub use library::core::Library;
pub use script::{run_script, run_script_with};
pub use value::core::Value;
