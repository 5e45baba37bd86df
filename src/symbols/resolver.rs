//! Resolution of the well-known metrics API identifiers.

use crate::symbols::{Compilation, TypeId};

/// Fully qualified names of the metrics API surface the generator binds to.
pub mod well_known {
    pub const METER_TYPE: &str = "System.Diagnostics.Metrics.Meter";
    pub const COUNTER_ATTRIBUTE: &str = "Microsoft.Extensions.Diagnostics.Metrics.CounterAttribute";
    pub const COUNTER_T_ATTRIBUTE: &str = "Microsoft.Extensions.Diagnostics.Metrics.CounterAttribute`1";
    pub const HISTOGRAM_ATTRIBUTE: &str = "Microsoft.Extensions.Diagnostics.Metrics.HistogramAttribute";
    pub const HISTOGRAM_T_ATTRIBUTE: &str = "Microsoft.Extensions.Diagnostics.Metrics.HistogramAttribute`1";
    pub const GAUGE_ATTRIBUTE: &str = "Microsoft.Extensions.Diagnostics.Metrics.GaugeAttribute";
    pub const TAG_NAME_ATTRIBUTE: &str = "Microsoft.Extensions.Diagnostics.Metrics.TagNameAttribute";
    pub const INT64_TYPE: &str = "System.Int64";
}

/// The resolved well-known identifiers for one compilation.
///
/// The optional fields cover older library versions that predate the generic
/// annotation variants or the gauge; their absence is tolerated and handled
/// downstream.
#[derive(Debug, Clone)]
pub struct SymbolHolder {
    pub meter: TypeId,
    pub counter: TypeId,
    pub histogram: TypeId,
    pub counter_generic: Option<TypeId>,
    pub histogram_generic: Option<TypeId>,
    pub gauge: Option<TypeId>,
    pub tag_name: Option<TypeId>,
    pub int64: Option<TypeId>,
}

/// Resolve the well-known identifiers against a compilation.
///
/// Returns `None` when the meter type or either base annotation type is
/// missing; that means the metrics library isn't referenced and the whole
/// pipeline is a no-op, not an error.
#[must_use]
pub fn resolve_symbols(comp: &Compilation) -> Option<SymbolHolder> {
    let meter = comp.find_by_qualified_name(well_known::METER_TYPE)?;
    let counter = comp.find_by_qualified_name(well_known::COUNTER_ATTRIBUTE)?;
    let histogram = comp.find_by_qualified_name(well_known::HISTOGRAM_ATTRIBUTE)?;

    Some(SymbolHolder {
        meter,
        counter,
        histogram,
        counter_generic: comp.find_by_qualified_name(well_known::COUNTER_T_ATTRIBUTE),
        histogram_generic: comp.find_by_qualified_name(well_known::HISTOGRAM_T_ATTRIBUTE),
        gauge: comp.find_by_qualified_name(well_known::GAUGE_ATTRIBUTE),
        tag_name: comp.find_by_qualified_name(well_known::TAG_NAME_ATTRIBUTE),
        int64: comp.find_by_qualified_name(well_known::INT64_TYPE),
    })
}
