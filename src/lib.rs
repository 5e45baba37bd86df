//! Compile-time generator for strongly-typed metric recording code.
//!
//! Takes a host compiler's declaration snapshot, validates every method
//! carrying a metric annotation, and deterministically emits two source
//! units: cached per-meter instrument factories and sealed wrapper types
//! whose recording methods attach tags without boxing dictionaries.
//!
//! # Module Organization
//!
//! - [`symbols`]: The host declaration snapshot and metrics API resolution
//! - [`diagnostics`]: The stable diagnostic catalog and reporting sinks
//! - [`parsing`]: Validation of annotated methods into the semantic model
//! - [`model`]: The validated semantic model both emitters consume
//! - [`emission`]: Deterministic rendering of the two generated units
//! - [`pipeline`]: End-to-end generation with cooperative cancellation

pub mod diagnostics;
pub mod emission;
pub mod model;
pub mod parsing;
pub mod pipeline;
pub mod symbols;

pub use pipeline::{CancellationToken, GeneratedSource, GenerationOutcome, generate};
