use serde::Serialize;
use strum::Display;

/// Which instrument a metric method requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InstrumentKind {
    #[default]
    None,
    Counter,
    CounterGeneric,
    Histogram,
    HistogramGeneric,

    /// Recognized only to be rejected.
    Gauge,
}

impl InstrumentKind {
    #[must_use]
    pub const fn is_counter(self) -> bool {
        matches!(self, Self::Counter | Self::CounterGeneric)
    }

    #[must_use]
    pub const fn is_histogram(self) -> bool {
        matches!(self, Self::Histogram | Self::HistogramGeneric)
    }

    #[must_use]
    pub const fn is_generic(self) -> bool {
        matches!(self, Self::CounterGeneric | Self::HistogramGeneric)
    }

    /// Name of the recording method on the generated wrapper type.
    #[must_use]
    pub const fn record_method_name(self) -> &'static str {
        if self.is_counter() { "Add" } else { "Record" }
    }

    /// The instrument type name in the metrics library.
    #[must_use]
    pub const fn instrument_type_name(self) -> &'static str {
        if self.is_counter() { "Counter" } else { "Histogram" }
    }
}
