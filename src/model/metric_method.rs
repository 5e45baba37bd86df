use crate::model::{InstrumentKind, StrongTypeConfig};
use serde::Serialize;
use std::collections::BTreeMap;

/// One parameter of a metric method, as carried into generated signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricParameter {
    pub name: String,
    pub type_text: String,

    /// Whether this is the meter instance parameter.
    pub is_meter: bool,
}

/// One annotated method that becomes a generated factory + wrapper pair.
///
/// Exactly one of `tag_keys` or `strong_type_configs` is meaningfully
/// populated, never both.
#[derive(Debug, Clone, Serialize)]
pub struct MetricMethod {
    /// The method name as declared.
    pub name: String,

    /// The resolved metric name: the explicit annotation argument when given,
    /// otherwise derived from the return type name.
    pub metric_name: String,

    /// Name of the generated wrapper type, i.e. the fresh return type the
    /// method declares.
    pub wrapper_name: String,

    pub instrument: InstrumentKind,

    /// The numeric value type display string, e.g. `long` or `double`.
    pub value_type: String,

    pub params: Vec<MetricParameter>,

    /// Loose tag keys, unique and case-sensitive, in declaration order.
    pub tag_keys: Vec<String>,

    /// The resolved strong-type tag graph.
    pub strong_type_configs: Vec<StrongTypeConfig>,

    /// Qualified name of the strong-type carrier, when the method takes one.
    pub strong_type_name: Option<String>,

    /// Whether the carrier is a reference type and needs a null check.
    pub strong_type_is_reference: bool,

    /// Declared method modifiers, e.g. `public static partial`.
    pub modifiers: String,

    pub doc_summary: Option<String>,

    /// Per-tag doc descriptions, keyed by the name path that resolved the tag.
    pub tag_descriptions: BTreeMap<String, String>,
}

impl MetricMethod {
    /// Total number of emitted tags: loose keys or strong-type leaves,
    /// whichever shape this method uses.
    #[must_use]
    pub fn tag_count(&self) -> usize {
        if self.strong_type_configs.is_empty() {
            self.tag_keys.len()
        } else {
            self.strong_type_configs.iter().filter(|c| c.kind.is_leaf()).count()
        }
    }

    /// The name of the meter parameter.
    #[must_use]
    pub fn meter_param_name(&self) -> &str {
        self.params
            .iter()
            .find(|p| p.is_meter)
            .map_or("meter", |p| p.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TagKind;

    fn method_with(tag_keys: Vec<String>, configs: Vec<StrongTypeConfig>) -> MetricMethod {
        MetricMethod {
            name: "RecordLatency".to_string(),
            metric_name: "Latency".to_string(),
            wrapper_name: "Latency".to_string(),
            instrument: InstrumentKind::Histogram,
            value_type: "long".to_string(),
            params: vec![MetricParameter {
                name: "m".to_string(),
                type_text: "Meter".to_string(),
                is_meter: true,
            }],
            tag_keys,
            strong_type_configs: configs,
            strong_type_name: None,
            strong_type_is_reference: false,
            modifiers: "public static partial".to_string(),
            doc_summary: None,
            tag_descriptions: BTreeMap::new(),
        }
    }

    #[test]
    fn test_tag_count_loose() {
        let m = method_with(vec!["a".to_string(), "b".to_string()], Vec::new());
        assert_eq!(m.tag_count(), 2);
    }

    #[test]
    fn test_tag_count_strong_skips_markers() {
        let configs = vec![
            StrongTypeConfig {
                name: "Inner".to_string(),
                path: String::new(),
                tag_name: "Inner".to_string(),
                kind: TagKind::Class,
            },
            StrongTypeConfig {
                name: "Status".to_string(),
                path: "Inner?".to_string(),
                tag_name: "Status".to_string(),
                kind: TagKind::String,
            },
            StrongTypeConfig {
                name: "Result".to_string(),
                path: String::new(),
                tag_name: "Result".to_string(),
                kind: TagKind::Enum,
            },
        ];
        let m = method_with(Vec::new(), configs);
        assert_eq!(m.tag_count(), 2);
    }

    #[test]
    fn test_meter_param_name() {
        let m = method_with(Vec::new(), Vec::new());
        assert_eq!(m.meter_param_name(), "m");
    }
}
