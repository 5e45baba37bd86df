mod kind;
mod sink;

pub use kind::{DiagKind, Severity};
pub use sink::{Diagnostic, DiagnosticBag, DiagnosticSink, Location};
