mod docs;
mod model_builder;
mod strong_types;

pub use docs::extract_summary;
pub use model_builder::{MAX_TAG_NAMES, build_model};
pub use strong_types::CycleError;
