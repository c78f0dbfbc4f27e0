use std::{
    fmt,
    sync::{Mutex, PoisonError},
};

use crate::{error::FeelError, value::core::Value};

/// One record per failed built-in call.
///
/// Records are informational only. Whatever a sink does with them, the value
/// returned by the call is already decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Name of the function as it was called.
    pub function:  String,
    /// The arguments in display form.
    pub arguments: Vec<String>,
    /// Why the call failed.
    pub cause:     String,
}

impl Diagnostic {
    /// Builds a record from the call and its failure.
    #[must_use]
    pub fn new(function: &str, args: &[Value], cause: &FeelError) -> Self {
        Self { function:  function.to_owned(),
               arguments: args.iter().map(ToString::to_string).collect(),
               cause:     cause.to_string(), }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}): {}", self.function, self.arguments.join(", "), self.cause)
    }
}

/// Receives diagnostic records from a [`crate::Library`].
///
/// Implementations must not panic. A sink is shared between every thread
/// calling the library it is installed in.
pub trait DiagnosticSink: Send + Sync {
    /// Records one failed call.
    fn record(&self, diagnostic: &Diagnostic);
}

/// Discards every record. This is the default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn record(&self, _: &Diagnostic) {}
}

/// Forwards records to the `log` facade at `error` level under the `feelib`
/// target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&self, diagnostic: &Diagnostic) {
        log::error!(target: "feelib", "{diagnostic}");
    }
}

/// Keeps every record in memory.
///
/// # Example
/// ```
/// use std::sync::Arc;
///
/// use feelib::{Library, Value, diagnostics::MemorySink};
///
/// let sink = Arc::new(MemorySink::default());
/// let library = Library::with_sink(sink.clone());
///
/// assert_eq!(library.call("number", &[Value::from("12x")]), Value::Null);
///
/// let records = sink.records();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].function, "number");
/// assert_eq!(records[0].arguments, ["\"12x\""]);
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    /// Returns a copy of everything recorded so far.
    #[must_use]
    pub fn records(&self) -> Vec<Diagnostic> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, diagnostic: &Diagnostic) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic.clone());
    }
}
