use crate::diagnostics::{DiagKind, Severity};
use core::fmt::{Display, Formatter, Result as FmtResult};
use serde::{Deserialize, Serialize};

/// Position of a declaration in the original source, as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub file: String,

    #[serde(default)]
    pub line: u32,
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.file.is_empty() {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}:{}", self.file, self.line)
        }
    }
}

/// One reported validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagKind,
    pub code: &'static str,
    pub severity: Severity,
    pub location: Location,
    pub message: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}: {} ({})", self.severity, self.code, self.message, self.location)
    }
}

/// Receives structured diagnostics from the pipeline. Write-only; the pipeline
/// never queries what was reported.
pub trait DiagnosticSink {
    fn report(&mut self, kind: DiagKind, location: &Location, args: &[&str]);
}

/// A [`DiagnosticSink`] that accumulates everything reported to it, preserving
/// report order.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    items: Vec<Diagnostic>,
}

impl DiagnosticBag {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of error-severity diagnostics in the bag.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.severity == Severity::Error).count()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl DiagnosticSink for DiagnosticBag {
    fn report(&mut self, kind: DiagKind, location: &Location, args: &[&str]) {
        self.items.push(Diagnostic {
            kind,
            code: kind.code(),
            severity: kind.severity(),
            location: location.clone(),
            message: kind.message(args),
        });
    }
}
