mod compilation;
mod resolver;

pub use compilation::{
    Compilation, MemberAnnotation, MemberDecl, MethodAnnotation, MethodDecl, ParamDecl, ReturnType,
    ScalarKind, TagKeyArg, TypeDecl, TypeId, TypeKeyword,
};
pub use resolver::{SymbolHolder, resolve_symbols, well_known};
