//! Validation and model construction for annotated declarations.
//!
//! The builder mirrors compiler-style batch diagnostics: every validation step
//! is "evaluate and record, then continue," so one pass reports all failures
//! for a method rather than stopping at the first. A failing check marks the
//! method excluded but never aborts analysis of its siblings.

use crate::diagnostics::{DiagKind, DiagnosticSink};
use crate::model::{InstrumentKind, MetricMethod, MetricParameter, MetricType};
use crate::parsing::docs::extract_summary;
use crate::parsing::strong_types::extract_strong_type_configs;
use crate::pipeline::{CancellationToken, Cancelled};
use crate::symbols::{Compilation, MethodAnnotation, MethodDecl, SymbolHolder, TypeId, TypeKeyword};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

const LOG_TARGET: &str = "model_builder";

/// Ceiling on the number of resolved tag names per method; exceeding it is
/// reported but does not stop generation.
pub const MAX_TAG_NAMES: usize = 30;

/// Identifiers starting with this prefix are reserved for generated code.
const RESERVED_PREFIX: char = '_';

static METRIC_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Z][A-Za-z0-9]*$").expect("metric name regex is valid"));

static TAG_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Za-z_][A-Za-z0-9_.:-]*$").expect("tag name regex is valid"));

/// Walk the annotated declarations and produce the ordered metric model,
/// pushing every validation failure to the sink along the way.
///
/// # Errors
///
/// Returns [`Cancelled`] when the token fires between iterations; the partial
/// model is discarded.
pub fn build_model(
    comp: &Compilation,
    symbols: &SymbolHolder,
    cancel: &CancellationToken,
    sink: &mut dyn DiagnosticSink,
) -> Result<Vec<MetricType>, Cancelled> {
    let builder = ModelBuilder { comp, symbols };
    let mut result = Vec::new();

    for &type_id in &comp.annotated {
        cancel.check()?;
        if let Some(metric_type) = builder.parse_type(type_id, cancel, sink)? {
            result.push(metric_type);
        }
    }

    log::debug!(target: LOG_TARGET, "Built model with {} metric type(s)", result.len());
    Ok(result)
}

struct ModelBuilder<'a> {
    comp: &'a Compilation,
    symbols: &'a SymbolHolder,
}

impl ModelBuilder<'_> {
    /// Scan one annotated type's methods. The `MetricType` node is
    /// materialized lazily, only once the first kept method is found.
    fn parse_type(
        &self,
        type_id: TypeId,
        cancel: &CancellationToken,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Option<MetricType>, Cancelled> {
        let decl = self.comp.type_decl(type_id);
        let mut metric_type: Option<MetricType> = None;
        let mut used_metric_names: HashSet<String> = HashSet::new();

        for method in &decl.methods {
            cancel.check()?;
            if let Some(metric_method) = self.parse_method(type_id, method, &mut used_metric_names, sink) {
                metric_type
                    .get_or_insert_with(|| self.materialize_type(type_id))
                    .methods
                    .push(metric_method);
            }
        }

        Ok(metric_type)
    }

    #[expect(clippy::too_many_lines, reason = "one linear validation pass reads better unsplit")]
    fn parse_method(
        &self,
        type_id: TypeId,
        method: &MethodDecl,
        used_metric_names: &mut HashSet<String>,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<MetricMethod> {
        // Instrument kind from the annotation's resolved type identity.
        // Methods without a metric annotation aren't this generator's concern.
        let (annotation, instrument) = self.find_metric_annotation(method)?;
        let loc = &method.location;

        if instrument == InstrumentKind::Gauge {
            sink.report(DiagKind::GaugeNotSupported, loc, &[&method.name]);
            return None;
        }

        let mut keep = true;

        // The return type must be a fresh, generator-owned type.
        let ret = &method.return_type;
        if ret.existing.is_some() {
            sink.report(DiagKind::InvalidMethodReturnType, loc, &[&method.name]);
            keep = false;
        }
        if ret.generic_arity != 0 {
            sink.report(DiagKind::InvalidReturnTypeArity, loc, &[&ret.written]);
            keep = false;
        }
        if ret.written != ret.qualified_or_written() {
            sink.report(DiagKind::InvalidReturnTypeLocation, loc, &[&ret.written]);
            keep = false;
        }

        let value_type = if instrument.is_generic() {
            let keyword = annotation
                .value_type
                .and_then(|ty| self.comp.type_decl(ty).scalar.instrument_value_keyword());
            match keyword {
                Some(kw) => kw.to_string(),
                None => {
                    let display = annotation
                        .value_type
                        .map_or_else(String::new, |ty| self.comp.qualified_name(ty));
                    sink.report(DiagKind::InvalidInstrumentValueType, loc, &[&display]);
                    keep = false;
                    String::new()
                }
            }
        } else {
            "long".to_string()
        };

        let wrapper_name = last_segment(&ret.written).to_string();
        let metric_name = annotation.metric_name.clone().unwrap_or_else(|| wrapper_name.clone());

        // Metric configuration: loose tag keys or a strong-type carrier.
        let mut tag_keys: Vec<String> = Vec::new();
        let mut tag_descriptions: BTreeMap<String, String> = BTreeMap::new();
        let mut strong_type_configs = Vec::new();
        let mut strong_type_name = None;
        let mut strong_type_is_reference = false;

        if let Some(carrier) = annotation.strong_type {
            match extract_strong_type_configs(self.comp, self.symbols, carrier, &method.name, loc, sink) {
                Ok(extraction) => {
                    if extraction.tag_count > MAX_TAG_NAMES {
                        sink.report(DiagKind::TooManyTagNames, loc, &[&method.name, "30"]);
                    }
                    strong_type_configs = extraction.configs;
                    tag_descriptions = extraction.descriptions;
                    strong_type_name = Some(self.comp.qualified_name(carrier));
                    strong_type_is_reference = self.comp.type_decl(carrier).is_reference_type;
                }
                Err(cycle) => {
                    let carrier_name = self.comp.qualified_name(carrier);
                    let container_name = self.comp.qualified_name(cycle.container);
                    let member_type_name = self.comp.qualified_name(cycle.member_type);
                    sink.report(
                        DiagKind::TagTypeCycleDetected,
                        loc,
                        &[&carrier_name, &container_name, &member_type_name],
                    );
                    keep = false;
                }
            }
        } else {
            let mut seen = HashSet::new();
            for arg in &annotation.tag_keys {
                if !TAG_NAME_RE.is_match(&arg.key) {
                    sink.report(DiagKind::InvalidTagNames, loc, &[&arg.key]);
                    keep = false;
                    continue;
                }
                if !seen.insert(arg.key.clone()) {
                    sink.report(DiagKind::DuplicateTagName, loc, &[&arg.key, &method.name]);
                    continue;
                }
                if let Some(doc) = &arg.doc {
                    let _ = tag_descriptions.insert(arg.key.clone(), doc.clone());
                }
                tag_keys.push(arg.key.clone());
            }
            if tag_keys.len() > MAX_TAG_NAMES {
                sink.report(DiagKind::TooManyTagNames, loc, &[&method.name, "30"]);
            }
        }

        // Structural checks, each independently gating inclusion.
        if method.name.starts_with(RESERVED_PREFIX) {
            sink.report(DiagKind::InvalidMethodName, loc, &[&method.name]);
            keep = false;
        }
        if method.generic_arity > 0 {
            sink.report(DiagKind::MethodIsGeneric, loc, &[&method.name]);
            keep = false;
        }
        if !method.is_static {
            sink.report(DiagKind::NotStaticMethod, loc, &[&method.name]);
            keep = false;
        }
        if method.has_body {
            sink.report(DiagKind::MethodHasBody, loc, &[&method.name]);
            keep = false;
        } else if !method.is_partial {
            sink.report(DiagKind::NotPartialMethod, loc, &[&method.name]);
            keep = false;
        }
        if !METRIC_NAME_RE.is_match(&metric_name) {
            sink.report(DiagKind::InvalidMetricName, loc, &[&metric_name]);
            keep = false;
        }
        if !used_metric_names.insert(metric_name.clone()) {
            // First match wins; later uses of the name are excluded.
            let type_name = self.comp.qualified_name(type_id);
            sink.report(DiagKind::MetricNameReuse, loc, &[&metric_name, &type_name]);
            keep = false;
        }

        // Parameters. The host compiler already reports error-typed
        // parameters, so those exclude the method without a diagnostic here.
        let mut params = Vec::new();
        let mut has_meter = false;
        for (index, param) in method.params.iter().enumerate() {
            let error_typed = param.type_text.is_empty() || param.ty.is_none_or(|ty| self.comp.type_decl(ty).is_error);
            if error_typed {
                log::debug!(target: LOG_TARGET, "Skipping method '{}': parameter '{}' has an unresolved type", method.name, param.name);
                keep = false;
                continue;
            }
            if param.name.starts_with(RESERVED_PREFIX) {
                sink.report(DiagKind::InvalidParameterName, loc, &[&param.name]);
            }
            let is_meter = index == 0 && param.ty.is_some_and(|ty| self.comp.is_or_derives_from(ty, self.symbols.meter));
            has_meter |= is_meter;
            params.push(MetricParameter {
                name: param.name.clone(),
                type_text: param.type_text.clone(),
                is_meter,
            });
        }
        if !has_meter {
            sink.report(DiagKind::MissingMeterParameter, loc, &[&method.name]);
            keep = false;
        }

        let doc_summary = match method.doc_comment.as_deref().map(extract_summary) {
            None => None,
            Some(Ok(summary)) => summary,
            Some(Err(_)) => {
                sink.report(DiagKind::MalformedDocComment, loc, &[&method.name]);
                None
            }
        };

        if !keep {
            return None;
        }

        Some(MetricMethod {
            name: method.name.clone(),
            metric_name,
            wrapper_name,
            instrument,
            value_type,
            params,
            tag_keys,
            strong_type_configs,
            strong_type_name,
            strong_type_is_reference,
            modifiers: method.modifiers.clone(),
            doc_summary,
            tag_descriptions,
        })
    }

    fn find_metric_annotation<'m>(&self, method: &'m MethodDecl) -> Option<(&'m MethodAnnotation, InstrumentKind)> {
        for annotation in &method.annotations {
            let kind = if annotation.ty == self.symbols.counter {
                InstrumentKind::Counter
            } else if Some(annotation.ty) == self.symbols.counter_generic {
                InstrumentKind::CounterGeneric
            } else if annotation.ty == self.symbols.histogram {
                InstrumentKind::Histogram
            } else if Some(annotation.ty) == self.symbols.histogram_generic {
                InstrumentKind::HistogramGeneric
            } else if Some(annotation.ty) == self.symbols.gauge {
                InstrumentKind::Gauge
            } else {
                continue;
            };
            return Some((annotation, kind));
        }
        None
    }

    /// Build the `MetricType` node and its chain of enclosing types, keeping
    /// only class/struct/record parents.
    fn materialize_type(&self, type_id: TypeId) -> MetricType {
        let decl = self.comp.type_decl(type_id);
        let parent = decl.containing.and_then(|outer| {
            let outer_decl = self.comp.type_decl(outer);
            matches!(
                outer_decl.keyword,
                TypeKeyword::Class | TypeKeyword::Struct | TypeKeyword::Record | TypeKeyword::RecordStruct
            )
            .then(|| Box::new(self.materialize_type(outer)))
        });

        MetricType {
            namespace: decl.namespace.clone(),
            name: decl.name.clone(),
            keyword: decl.keyword.keyword_text().to_string(),
            modifiers: decl.modifiers.clone(),
            constraints: decl.constraints.clone(),
            methods: Vec::new(),
            parent,
        }
    }
}

fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
