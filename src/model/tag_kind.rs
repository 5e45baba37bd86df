use serde::Serialize;
use strum::Display;

/// Classification of a tag carrier member, computed once per member and
/// dispatched exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TagKind {
    /// A string-valued leaf; emitted as-is.
    String,

    /// An enum-valued leaf; stringified at the access site.
    Enum,

    /// A nested reference type; structural marker only, members are expanded
    /// behind a null-conditional hop.
    Class,

    /// A nested value type; structural marker only.
    Struct,

    /// Not usable as a tag.
    Invalid,
}

impl TagKind {
    /// Whether this entry contributes an emitted tag, as opposed to being a
    /// structural marker or a rejected member.
    #[must_use]
    pub const fn is_leaf(self) -> bool {
        matches!(self, Self::String | Self::Enum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_classification() {
        assert!(TagKind::String.is_leaf());
        assert!(TagKind::Enum.is_leaf());
        assert!(!TagKind::Class.is_leaf());
        assert!(!TagKind::Struct.is_leaf());
        assert!(!TagKind::Invalid.is_leaf());
    }
}
