mod instrument_kind;
mod metric_method;
mod metric_type;
mod strong_type_config;
mod tag_kind;

pub use instrument_kind::InstrumentKind;
pub use metric_method::{MetricMethod, MetricParameter};
pub use metric_type::MetricType;
pub use strong_type_config::StrongTypeConfig;
pub use tag_kind::TagKind;
