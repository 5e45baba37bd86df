use crate::model::TagKind;
use serde::Serialize;

/// One resolved entry from a strong-type tag carrier's object graph.
///
/// `Class` and `Struct` entries are structural markers: they emit no tag of
/// their own, only the access-path prefix their descendants read through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrongTypeConfig {
    /// The member's own name.
    pub name: String,

    /// Dotted access path from the carrier root to the member's container,
    /// empty at the root. Reference-type hops carry a trailing `?` so emitted
    /// access is null-safe, e.g. `Inner?.Deeper`.
    pub path: String,

    /// The externally visible tag name: a `TagName` override when present,
    /// otherwise the member name.
    pub tag_name: String,

    pub kind: TagKind,
}

impl StrongTypeConfig {
    /// The emitted member access expression relative to `receiver`.
    #[must_use]
    pub fn access_expr(&self, receiver: &str) -> String {
        if self.path.is_empty() {
            format!("{receiver}.{}", self.name)
        } else {
            format!("{receiver}.{}.{}", self.path, self.name)
        }
    }
}
