//! Deterministic source emitters for the two generated compilation units.
//!
//! Both emitters walk the same validated model: namespaces in lexical order,
//! types in lexical order within a namespace, and methods in declaration
//! order. Running either emitter twice over the same model yields
//! byte-identical text.

mod factories;
mod instruments;
mod writer;

pub use factories::emit_factories;
pub use instruments::emit_instruments;

use crate::model::MetricType;
use std::collections::{BTreeMap, HashSet};
use writer::SourceWriter;

/// Tag counts above this switch the recording body to check
/// `Instrument.Enabled` before building the tag list.
pub const TAG_GUARD_THRESHOLD: usize = 8;

const FILE_HEADER: &str = "// <auto-generated/>";
const METER_TYPE: &str = "global::System.Diagnostics.Metrics.Meter";

fn file_preamble(writer: &mut SourceWriter) {
    writer.line(FILE_HEADER);
    writer.line("#nullable enable");
    writer.blank();
}

/// Group the model by namespace, both levels sorted for stable output.
fn group_by_namespace(model: &[MetricType]) -> BTreeMap<&str, Vec<&MetricType>> {
    let mut groups: BTreeMap<&str, Vec<&MetricType>> = BTreeMap::new();
    for ty in model {
        groups.entry(ty.namespace.as_str()).or_default().push(ty);
    }
    for types in groups.values_mut() {
        types.sort_by_key(|ty| ty.nested_name());
    }
    groups
}

/// The globally qualified name of a generated wrapper type.
fn wrapper_qualified(ty: &MetricType, wrapper_name: &str) -> String {
    if ty.namespace.is_empty() {
        format!("global::{}.{wrapper_name}", ty.nested_name())
    } else {
        format!("global::{}.{}.{wrapper_name}", ty.namespace, ty.nested_name())
    }
}

/// The globally qualified name of a namespace's factory holder class.
fn factory_qualified(namespace: &str) -> String {
    if namespace.is_empty() {
        "global::GeneratedInstrumentFactory".to_string()
    } else {
        format!("global::{namespace}.GeneratedInstrumentFactory")
    }
}

/// Turn a tag key into a usable parameter identifier.
fn tag_param_name(key: &str) -> String {
    key.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }).collect()
}

/// Parameter identifiers for a method's loose tag keys, in key order.
/// Distinct keys can sanitize to the same identifier, so collisions get a
/// trailing underscore until unique.
fn loose_param_names(keys: &[String]) -> Vec<String> {
    let mut used = HashSet::new();
    keys.iter()
        .map(|key| {
            let mut name = tag_param_name(key);
            while !used.insert(name.clone()) {
                name.push('_');
            }
            name
        })
        .collect()
}

/// Lowercase the leading character, for cache field names.
fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        format!("{}{}", first.to_lowercase(), chars.as_str())
    })
}
