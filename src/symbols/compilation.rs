//! The declaration model handed to the pipeline by the host.
//!
//! The host compiler integration is an external collaborator: it discovers the
//! declarations carrying metric annotations, flattens the semantic facts the
//! generator needs into this model, and invokes the pipeline once per
//! compilation. Types are interned in a single table and referenced by
//! [`TypeId`] handles so object graphs (including cyclic ones) can be
//! represented without ownership gymnastics. The whole model is serializable,
//! which lets a compilation be described as a JSON fixture and driven through
//! the CLI or the tests.

use crate::diagnostics::Location;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Handle to an interned [`TypeDecl`] within a [`Compilation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

/// The declaration keyword of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TypeKeyword {
    Class,
    Struct,
    Record,
    RecordStruct,
    Enum,
    Interface,
}

impl TypeKeyword {
    /// The keyword text used when re-declaring the type in generated source.
    #[must_use]
    pub const fn keyword_text(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Record => "record",
            Self::RecordStruct => "record struct",
            Self::Enum => "enum",
            Self::Interface => "interface",
        }
    }

    /// Whether the keyword declares a value type.
    #[must_use]
    pub const fn is_value_type(self) -> bool {
        matches!(self, Self::Struct | Self::RecordStruct | Self::Enum)
    }
}

/// Identifies types with language-level special meaning, as classified by the
/// host. Everything user-defined is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    #[default]
    None,
    Str,
    Boolean,
    Char,
    Byte,
    Int16,
    Int32,
    Int64,
    Single,
    Double,
    Decimal,
    Object,
}

impl ScalarKind {
    /// The emitted keyword for scalar kinds usable as a generic instrument
    /// value type. Returns `None` for everything else.
    #[must_use]
    pub const fn instrument_value_keyword(self) -> Option<&'static str> {
        match self {
            Self::Byte => Some("byte"),
            Self::Int16 => Some("short"),
            Self::Int32 => Some("int"),
            Self::Int64 => Some("long"),
            Self::Single => Some("float"),
            Self::Double => Some("double"),
            Self::Decimal => Some("decimal"),
            _ => None,
        }
    }
}

/// An annotation attached to a member of a tag carrier type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberAnnotation {
    /// The resolved annotation type.
    pub ty: TypeId,

    /// The annotation's single string argument, if any.
    #[serde(default)]
    pub value: Option<String>,
}

/// A field or property of a declared type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDecl {
    pub name: String,
    pub ty: TypeId,

    #[serde(default)]
    pub is_static: bool,

    /// Compiler-synthesized members are skipped during tag extraction.
    #[serde(default)]
    pub is_implicit: bool,

    #[serde(default)]
    pub annotations: Vec<MemberAnnotation>,

    #[serde(default)]
    pub doc_summary: Option<String>,
}

/// One loose tag-key argument of a metric annotation. The host resolves each
/// argument back to the constant it references and carries along that
/// constant's doc description, when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagKeyArg {
    pub key: String,

    #[serde(default)]
    pub doc: Option<String>,
}

/// A metric annotation attached to a method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodAnnotation {
    /// The resolved annotation type. Which instrument this requests is decided
    /// by comparing against the well-known symbols, never by name.
    pub ty: TypeId,

    /// Explicit metric name argument.
    #[serde(default)]
    pub metric_name: Option<String>,

    /// The generic value type argument of `Counter<T>`/`Histogram<T>`.
    #[serde(default)]
    pub value_type: Option<TypeId>,

    /// The tag carrier type argument of the strong-type shape.
    #[serde(default)]
    pub strong_type: Option<TypeId>,

    /// Loose tag keys from the annotation's constructor array argument.
    #[serde(default)]
    pub tag_keys: Vec<TagKeyArg>,
}

/// A method parameter as declared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,

    /// Resolved parameter type; `None` when the host could not resolve it
    /// (an error type in the compilation).
    #[serde(default)]
    pub ty: Option<TypeId>,

    /// The parameter type as written, used verbatim in generated signatures.
    #[serde(default)]
    pub type_text: String,
}

/// The return type of a metric method, as seen by the host compiler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReturnType {
    /// The type name as written at the declaration site.
    pub written: String,

    /// The fully qualified form of the written name, as the host computed it
    /// from the enclosing declaration context.
    #[serde(default)]
    pub qualified: String,

    #[serde(default)]
    pub generic_arity: usize,

    /// `Some` when the name resolves to a type that already exists in the
    /// compilation. Metric methods must return a fresh, generator-owned type.
    #[serde(default)]
    pub existing: Option<TypeId>,
}

impl ReturnType {
    /// The fully qualified form of the written name. Hosts that leave the
    /// field empty assert the written name is already fully qualified.
    #[must_use]
    pub fn qualified_or_written(&self) -> &str {
        if self.qualified.is_empty() {
            &self.written
        } else {
            &self.qualified
        }
    }
}

/// A method declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,

    /// Declared modifiers, e.g. `public static partial`.
    #[serde(default)]
    pub modifiers: String,

    #[serde(default)]
    pub is_static: bool,

    #[serde(default)]
    pub is_partial: bool,

    #[serde(default)]
    pub has_body: bool,

    #[serde(default)]
    pub generic_arity: usize,

    #[serde(default)]
    pub params: Vec<ParamDecl>,

    pub return_type: ReturnType,

    #[serde(default)]
    pub annotations: Vec<MethodAnnotation>,

    /// Raw doc comment text, if any.
    #[serde(default)]
    pub doc_comment: Option<String>,

    #[serde(default)]
    pub location: Location,
}

/// A type declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Simple name, including any generic parameter list text.
    pub name: String,

    /// Containing namespace; empty for the global namespace.
    #[serde(default)]
    pub namespace: String,

    pub keyword: TypeKeyword,

    #[serde(default)]
    pub modifiers: String,

    #[serde(default)]
    pub constraints: String,

    #[serde(default)]
    pub generic_arity: usize,

    #[serde(default)]
    pub is_reference_type: bool,

    #[serde(default)]
    pub is_array: bool,

    #[serde(default)]
    pub is_collection: bool,

    /// An unresolvable type the host compiler already reported on.
    #[serde(default)]
    pub is_error: bool,

    #[serde(default)]
    pub scalar: ScalarKind,

    #[serde(default)]
    pub base: Option<TypeId>,

    /// The immediately enclosing type for nested declarations.
    #[serde(default)]
    pub containing: Option<TypeId>,

    #[serde(default)]
    pub members: Vec<MemberDecl>,

    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

/// The input to one pipeline invocation: the interned type table plus the
/// declarations the host discovered as carrying metric annotations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Compilation {
    pub types: Vec<TypeDecl>,

    /// Annotated type declarations, in host discovery order.
    #[serde(default)]
    pub annotated: Vec<TypeId>,
}

impl Compilation {
    #[must_use]
    pub fn type_decl(&self, id: TypeId) -> &TypeDecl {
        &self.types[id.0 as usize]
    }

    /// Resolve a fully qualified name against the type table.
    #[must_use]
    pub fn find_by_qualified_name(&self, name: &str) -> Option<TypeId> {
        (0..self.types.len())
            .map(|i| TypeId(u32::try_from(i).unwrap_or(u32::MAX)))
            .find(|&id| self.qualified_name(id) == name)
    }

    /// The fully qualified name of a type: namespace, enclosing chain, then
    /// the simple name, dot-separated.
    #[must_use]
    pub fn qualified_name(&self, id: TypeId) -> String {
        let decl = self.type_decl(id);
        let mut segments = vec![decl.name.as_str()];
        let mut containing = decl.containing;
        while let Some(outer) = containing {
            let outer_decl = self.type_decl(outer);
            segments.push(outer_decl.name.as_str());
            containing = outer_decl.containing;
        }
        if !decl.namespace.is_empty() {
            segments.push(decl.namespace.as_str());
        }
        segments.reverse();
        segments.join(".")
    }

    /// Whether `id` is `target` or has `target` somewhere in its base chain.
    #[must_use]
    pub fn is_or_derives_from(&self, id: TypeId, target: TypeId) -> bool {
        let mut current = Some(id);
        while let Some(ty) = current {
            if ty == target {
                return true;
            }
            current = self.type_decl(ty).base;
        }
        false
    }
}
