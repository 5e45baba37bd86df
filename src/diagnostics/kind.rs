use serde::Serialize;
use strum::{Display, EnumIter};

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// The closed catalog of diagnostics the generator can produce.
///
/// Codes are stable so downstream tooling can filter by them; new kinds are
/// only ever appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DiagKind {
    InvalidMethodName,
    InvalidParameterName,
    InvalidMetricName,
    MetricNameReuse,
    InvalidMethodReturnType,
    MissingMeterParameter,
    NotPartialMethod,
    MethodIsGeneric,
    MethodHasBody,
    InvalidTagNames,
    NotStaticMethod,
    DuplicateTagName,
    InvalidTagValueType,
    TooManyTagNames,
    InvalidInstrumentValueType,
    InvalidReturnTypeLocation,
    InvalidReturnTypeArity,
    GaugeNotSupported,
    MalformedDocComment,
    TagTypeCycleDetected,
}

impl DiagKind {
    /// The stable diagnostic code, e.g. `METGEN003`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidMethodName => "METGEN000",
            Self::InvalidParameterName => "METGEN001",
            Self::InvalidMetricName => "METGEN002",
            Self::MetricNameReuse => "METGEN003",
            Self::InvalidMethodReturnType => "METGEN004",
            Self::MissingMeterParameter => "METGEN005",
            Self::NotPartialMethod => "METGEN006",
            Self::MethodIsGeneric => "METGEN007",
            Self::MethodHasBody => "METGEN008",
            Self::InvalidTagNames => "METGEN009",
            Self::NotStaticMethod => "METGEN010",
            Self::DuplicateTagName => "METGEN011",
            Self::InvalidTagValueType => "METGEN012",
            Self::TooManyTagNames => "METGEN013",
            Self::InvalidInstrumentValueType => "METGEN014",
            Self::InvalidReturnTypeLocation => "METGEN015",
            Self::InvalidReturnTypeArity => "METGEN016",
            Self::GaugeNotSupported => "METGEN017",
            Self::MalformedDocComment => "METGEN018",
            Self::TagTypeCycleDetected => "METGEN019",
        }
    }

    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::TooManyTagNames | Self::MalformedDocComment => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Short human-readable title for the diagnostic.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::InvalidMethodName => "Invalid method name",
            Self::InvalidParameterName => "Invalid parameter name",
            Self::InvalidMetricName => "Invalid metric name",
            Self::MetricNameReuse => "Metric name already in use",
            Self::InvalidMethodReturnType => "Invalid method return type",
            Self::MissingMeterParameter => "Missing meter parameter",
            Self::NotPartialMethod => "Method must be partial",
            Self::MethodIsGeneric => "Method must not be generic",
            Self::MethodHasBody => "Method must not have a body",
            Self::InvalidTagNames => "Invalid tag name",
            Self::NotStaticMethod => "Method must be static",
            Self::DuplicateTagName => "Duplicate tag name",
            Self::InvalidTagValueType => "Invalid tag member type",
            Self::TooManyTagNames => "Too many tag names",
            Self::InvalidInstrumentValueType => "Invalid instrument value type",
            Self::InvalidReturnTypeLocation => "Invalid return type location",
            Self::InvalidReturnTypeArity => "Invalid return type arity",
            Self::GaugeNotSupported => "Gauge instruments are not supported",
            Self::MalformedDocComment => "Malformed doc comment",
            Self::TagTypeCycleDetected => "Cycle detected in tag carrier type",
        }
    }

    /// The message template for the diagnostic. Occurrences of `{0}`, `{1}`,
    /// and `{2}` are replaced by the reported arguments, in order.
    #[must_use]
    pub const fn template(self) -> &'static str {
        match self {
            Self::InvalidMethodName => "Metric method names cannot start with '_': '{0}'",
            Self::InvalidParameterName => "Parameter names cannot start with '_': '{0}'",
            Self::InvalidMetricName => "Metric name '{0}' is invalid; names must start with an uppercase letter and contain only letters and digits",
            Self::MetricNameReuse => "Metric name '{0}' is already in use by another method of '{1}'",
            Self::InvalidMethodReturnType => "The return type of method '{0}' must be a new type generated by this generator, not a pre-existing type",
            Self::MissingMeterParameter => "Method '{0}' must take the meter as its first parameter",
            Self::NotPartialMethod => "Metric method '{0}' must be partial",
            Self::MethodIsGeneric => "Metric method '{0}' cannot be generic",
            Self::MethodHasBody => "Metric method '{0}' cannot have a body",
            Self::InvalidTagNames => "Tag name '{0}' is invalid",
            Self::NotStaticMethod => "Metric method '{0}' must be static",
            Self::DuplicateTagName => "Tag name '{0}' appears more than once for metric method '{1}'",
            Self::InvalidTagValueType => "Member '{0}' of type '{1}' cannot be used as a tag; only strings, enums, and nested classes or structs are supported",
            Self::TooManyTagNames => "Metric method '{0}' resolves more than {1} tag names",
            Self::InvalidInstrumentValueType => "Type '{0}' is not a supported instrument value type",
            Self::InvalidReturnTypeLocation => "The return type '{0}' must be declared in a namespace or a non-generic type",
            Self::InvalidReturnTypeArity => "The return type '{0}' cannot be generic",
            Self::GaugeNotSupported => "Gauge instruments are not supported for method '{0}'",
            Self::MalformedDocComment => "The doc comment of method '{0}' is malformed and will be ignored",
            Self::TagTypeCycleDetected => "Tag carrier type '{0}' contains a cycle: type '{1}' references '{2}' which is already being expanded",
        }
    }

    /// Expand the message template with the supplied arguments.
    #[must_use]
    pub fn message(self, args: &[&str]) -> String {
        let mut msg = self.template().to_string();
        for (i, arg) in args.iter().enumerate() {
            msg = msg.replace(&format!("{{{i}}}"), arg);
        }
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_codes_are_unique() {
        let mut seen = HashSet::new();
        for kind in DiagKind::iter() {
            assert!(seen.insert(kind.code()), "duplicate code {}", kind.code());
        }
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(DiagKind::InvalidMethodName.code(), "METGEN000");
        assert_eq!(DiagKind::MetricNameReuse.code(), "METGEN003");
        assert_eq!(DiagKind::GaugeNotSupported.code(), "METGEN017");
        assert_eq!(DiagKind::TagTypeCycleDetected.code(), "METGEN019");
    }

    #[test]
    fn test_severities() {
        assert_eq!(DiagKind::TooManyTagNames.severity(), Severity::Warning);
        assert_eq!(DiagKind::MalformedDocComment.severity(), Severity::Warning);
        assert_eq!(DiagKind::MetricNameReuse.severity(), Severity::Error);
    }

    #[test]
    fn test_message_substitution() {
        let msg = DiagKind::MetricNameReuse.message(&["Hits", "Metric"]);
        assert!(msg.contains("'Hits'"));
        assert!(msg.contains("'Metric'"));
    }

    #[test]
    fn test_message_with_missing_args_keeps_placeholder() {
        let msg = DiagKind::MetricNameReuse.message(&["Hits"]);
        assert!(msg.contains("{1}"));
    }

    #[test]
    fn test_every_kind_has_nonempty_text() {
        for kind in DiagKind::iter() {
            assert!(!kind.title().is_empty());
            assert!(!kind.template().is_empty());
        }
    }
}
