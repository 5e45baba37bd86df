use crate::model::MetricMethod;
use serde::Serialize;

/// A metric-bearing declared type, created lazily once the first valid method
/// is found for it and immutable once its declaration's methods are scanned.
#[derive(Debug, Clone, Serialize)]
pub struct MetricType {
    /// Containing namespace; empty for the global namespace.
    pub namespace: String,

    /// Simple name, including any generic parameter list text.
    pub name: String,

    /// Declared keyword text: `class`, `struct`, `record`, or `record struct`.
    pub keyword: String,

    pub modifiers: String,

    pub constraints: String,

    /// Methods in declaration order. Metric names are unique within the type.
    pub methods: Vec<MetricMethod>,

    /// The immediately enclosing declared type, forming a chain that lets the
    /// emitters reproduce the original nesting.
    pub parent: Option<Box<MetricType>>,
}

impl MetricType {
    /// The enclosing chain from outermost to this type, for emission.
    #[must_use]
    pub fn nesting_chain(&self) -> Vec<&Self> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(ty) = current {
            chain.push(ty);
            current = ty.parent.as_deref();
        }
        chain.reverse();
        chain
    }

    /// The dotted name of this type's full nesting chain, without namespace.
    #[must_use]
    pub fn nested_name(&self) -> String {
        self.nesting_chain()
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}
