//! The generation pipeline: resolve the metrics API surface, build the
//! validated model, and run both emitters.

mod cancellation;

pub use cancellation::{CancellationToken, Cancelled};

use crate::diagnostics::DiagnosticSink;
use crate::emission::{emit_factories, emit_instruments};
use crate::parsing::build_model;
use crate::symbols::{Compilation, resolve_symbols};

const LOG_TARGET: &str = "pipeline";

/// The two generated compilation units of a successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    /// The per-namespace factory holder classes.
    pub factories: String,

    /// The partial method implementations and wrapper types.
    pub instruments: String,
}

/// How a generation pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The pass ran to completion. Diagnostics may still have been reported
    /// and both units may be empty when no annotated methods survived.
    Complete(GeneratedSource),

    /// The compilation does not reference the metrics API, so there is
    /// nothing to do and nothing to report.
    MeterApiUnavailable,

    /// The token fired before the pass finished. No output was produced.
    Cancelled,
}

/// Run one full generation pass over `compilation`.
///
/// Validation diagnostics flow into `sink` as they are found; the returned
/// outcome only distinguishes the three terminal states. Output is a pure
/// function of the compilation, so two passes over the same input yield
/// byte-identical units.
pub fn generate(
    compilation: &Compilation,
    cancel: &CancellationToken,
    sink: &mut dyn DiagnosticSink,
) -> GenerationOutcome {
    let Some(symbols) = resolve_symbols(compilation) else {
        log::debug!(target: LOG_TARGET, "metrics API types not found, skipping generation");
        return GenerationOutcome::MeterApiUnavailable;
    };

    let Ok(model) = build_model(compilation, &symbols, cancel, sink) else {
        return GenerationOutcome::Cancelled;
    };
    log::debug!(target: LOG_TARGET, "model holds {} metric-bearing types", model.len());

    let Ok(factories) = emit_factories(&model, cancel) else {
        return GenerationOutcome::Cancelled;
    };
    let Ok(instruments) = emit_instruments(&model, cancel) else {
        return GenerationOutcome::Cancelled;
    };

    GenerationOutcome::Complete(GeneratedSource { factories, instruments })
}
