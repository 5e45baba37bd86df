//! Strong-type tag carrier graph extraction.
//!
//! A strong-type metric method takes a single "tag carrier" object whose
//! member graph supplies the tags. The walk here flattens that graph into
//! [`StrongTypeConfig`] entries, recursing through nested classes and structs
//! while carrying a per-branch visited set so cyclic carrier graphs terminate
//! with a structured error instead of unbounded recursion.

use crate::diagnostics::{DiagKind, DiagnosticSink, Location};
use crate::model::{StrongTypeConfig, TagKind};
use crate::symbols::{Compilation, MemberDecl, ScalarKind, SymbolHolder, TypeId, TypeKeyword};
use std::collections::{BTreeMap, HashSet};

/// A cycle found while expanding a carrier graph: `container` holds a member
/// of type `member_type` that is already being expanded on the current branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleError {
    pub container: TypeId,
    pub member_type: TypeId,
}

/// The flattened result of a successful carrier walk.
#[derive(Debug, Default)]
pub struct StrongTypeResult {
    pub configs: Vec<StrongTypeConfig>,

    /// Doc descriptions keyed by the name path that resolved each tag: the
    /// override string when a `TagName` override was taken, the full access
    /// path otherwise.
    pub descriptions: BTreeMap<String, String>,

    /// Total number of resolved tag names.
    pub tag_count: usize,
}

/// Walk a carrier type's member graph and flatten it into tag configs.
///
/// Duplicate tag names and invalid member types are reported to the sink and
/// skipped; the earlier entry wins. A detected cycle aborts the whole
/// extraction for this one method.
///
/// # Errors
///
/// Returns [`CycleError`] when a type on the current expansion branch is
/// reached again.
pub fn extract_strong_type_configs(
    comp: &Compilation,
    symbols: &SymbolHolder,
    carrier: TypeId,
    method_name: &str,
    location: &Location,
    sink: &mut dyn DiagnosticSink,
) -> Result<StrongTypeResult, CycleError> {
    let mut walker = StrongTypeWalker {
        comp,
        symbols,
        method_name,
        location,
        sink,
        tag_names: HashSet::new(),
        configs: Vec::new(),
        descriptions: BTreeMap::new(),
        path: String::new(),
    };

    let mut visiting = HashSet::new();
    let _ = visiting.insert(carrier);
    walker.expand(carrier, &mut visiting)?;

    Ok(StrongTypeResult {
        tag_count: walker.tag_names.len(),
        configs: walker.configs,
        descriptions: walker.descriptions,
    })
}

/// Classify a member's value type for tag extraction.
fn classify(comp: &Compilation, ty: TypeId) -> TagKind {
    let decl = comp.type_decl(ty);
    if decl.is_error || decl.is_array || decl.is_collection {
        return TagKind::Invalid;
    }
    if decl.keyword == TypeKeyword::Enum {
        return TagKind::Enum;
    }
    match decl.scalar {
        ScalarKind::Str => TagKind::String,
        ScalarKind::None => match decl.keyword {
            TypeKeyword::Class | TypeKeyword::Record if decl.is_reference_type => TagKind::Class,
            TypeKeyword::Struct | TypeKeyword::RecordStruct => TagKind::Struct,
            _ => TagKind::Invalid,
        },
        // Numbers, bools, chars, and plain objects carry no usable tag text.
        _ => TagKind::Invalid,
    }
}

struct StrongTypeWalker<'a> {
    comp: &'a Compilation,
    symbols: &'a SymbolHolder,
    method_name: &'a str,
    location: &'a Location,
    sink: &'a mut dyn DiagnosticSink,
    tag_names: HashSet<String>,
    configs: Vec<StrongTypeConfig>,
    descriptions: BTreeMap<String, String>,
    path: String,
}

impl StrongTypeWalker<'_> {
    /// Expand a type's direct members, then fold in its base-type chain.
    /// Each base is walked with the current branch plus the base itself, so
    /// inherited members fold in normally while a member whose type loops
    /// back onto the branch still raises the cycle signal.
    fn expand(&mut self, ty: TypeId, visiting: &mut HashSet<TypeId>) -> Result<(), CycleError> {
        let decl = self.comp.type_decl(ty);
        for member in eligible_members(&decl.members) {
            self.member(ty, member, visiting)?;
        }

        let mut base = decl.base;
        while let Some(base_ty) = base {
            let base_decl = self.comp.type_decl(base_ty);
            let mut branch = visiting.clone();
            let _ = branch.insert(base_ty);
            for member in eligible_members(&base_decl.members) {
                self.member(base_ty, member, &mut branch)?;
            }
            base = base_decl.base;
        }

        Ok(())
    }

    fn member(&mut self, container: TypeId, member: &MemberDecl, visiting: &mut HashSet<TypeId>) -> Result<(), CycleError> {
        match classify(self.comp, member.ty) {
            kind @ (TagKind::String | TagKind::Enum) => {
                self.leaf(member, kind);
                Ok(())
            }
            TagKind::Class => self.descend(container, member, TagKind::Class, visiting),
            TagKind::Struct => self.descend(container, member, TagKind::Struct, visiting),
            TagKind::Invalid => {
                let type_name = self.comp.qualified_name(member.ty);
                self.sink.report(
                    DiagKind::InvalidTagValueType,
                    self.location,
                    &[&member.name, &type_name],
                );
                Ok(())
            }
        }
    }

    /// Record a leaf tag entry, resolving the `TagName` override and
    /// rejecting duplicates (the earlier entry is retained).
    fn leaf(&mut self, member: &MemberDecl, kind: TagKind) {
        let override_name = self.tag_name_override(member);
        let used_override = override_name.is_some();
        let tag_name = override_name.unwrap_or_else(|| member.name.clone());

        if !self.tag_names.insert(tag_name.clone()) {
            self.sink
                .report(DiagKind::DuplicateTagName, self.location, &[&tag_name, self.method_name]);
            return;
        }

        let config = StrongTypeConfig {
            name: member.name.clone(),
            path: self.path.clone(),
            tag_name,
            kind,
        };

        if let Some(doc) = &member.doc_summary {
            // The lookup key depends on which name path was taken; this
            // asymmetry matches the observed behavior of the original.
            let key = if used_override {
                config.tag_name.clone()
            } else if config.path.is_empty() {
                config.name.clone()
            } else {
                format!("{}.{}", config.path, config.name)
            };
            let _ = self.descriptions.insert(key, doc.clone());
        }

        self.configs.push(config);
    }

    /// Record a structural marker and expand the nested type's members with
    /// the access path extended, restoring the path buffer on the way out.
    fn descend(
        &mut self,
        container: TypeId,
        member: &MemberDecl,
        kind: TagKind,
        visiting: &mut HashSet<TypeId>,
    ) -> Result<(), CycleError> {
        if !visiting.insert(member.ty) {
            return Err(CycleError {
                container,
                member_type: member.ty,
            });
        }

        self.configs.push(StrongTypeConfig {
            name: member.name.clone(),
            path: self.path.clone(),
            tag_name: member.name.clone(),
            kind,
        });

        let saved_len = self.path.len();
        if !self.path.is_empty() {
            self.path.push('.');
        }
        self.path.push_str(&member.name);
        if kind == TagKind::Class {
            // The `?` marks a hop that may be absent, for null-safe access.
            self.path.push('?');
        }

        let outcome = self.expand(member.ty, visiting);

        self.path.truncate(saved_len);
        let _ = visiting.remove(&member.ty);

        outcome
    }

    fn tag_name_override(&self, member: &MemberDecl) -> Option<String> {
        let tag_name_ty = self.symbols.tag_name?;
        member
            .annotations
            .iter()
            .find(|a| a.ty == tag_name_ty)
            .and_then(|a| a.value.clone())
    }
}

fn eligible_members(members: &[MemberDecl]) -> impl Iterator<Item = &MemberDecl> {
    members.iter().filter(|m| !m.is_static && !m.is_implicit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticBag;
    use crate::symbols::{MemberAnnotation, TypeDecl, resolve_symbols, well_known};

    fn decl(name: &str, keyword: TypeKeyword, scalar: ScalarKind, is_reference: bool) -> TypeDecl {
        TypeDecl {
            name: name.to_string(),
            namespace: "App".to_string(),
            keyword,
            modifiers: String::new(),
            constraints: String::new(),
            generic_arity: 0,
            is_reference_type: is_reference,
            is_array: false,
            is_collection: false,
            is_error: false,
            scalar,
            base: None,
            containing: None,
            members: Vec::new(),
            methods: Vec::new(),
        }
    }

    fn member(name: &str, ty: TypeId) -> MemberDecl {
        MemberDecl {
            name: name.to_string(),
            ty,
            is_static: false,
            is_implicit: false,
            annotations: Vec::new(),
            doc_summary: None,
        }
    }

    /// A compilation with the API types at fixed slots: 0 meter, 1 counter,
    /// 2 histogram, 3 tag-name annotation, 4 string, 5 an enum.
    fn base_compilation() -> Compilation {
        let mut meter = decl("Meter", TypeKeyword::Class, ScalarKind::None, true);
        meter.namespace = "System.Diagnostics.Metrics".to_string();
        let mut counter = decl("CounterAttribute", TypeKeyword::Class, ScalarKind::None, true);
        counter.namespace = "Microsoft.Extensions.Diagnostics.Metrics".to_string();
        let mut histogram = decl("HistogramAttribute", TypeKeyword::Class, ScalarKind::None, true);
        histogram.namespace = "Microsoft.Extensions.Diagnostics.Metrics".to_string();
        let mut tag_name = decl("TagNameAttribute", TypeKeyword::Class, ScalarKind::None, true);
        tag_name.namespace = "Microsoft.Extensions.Diagnostics.Metrics".to_string();
        let mut string_ty = decl("String", TypeKeyword::Class, ScalarKind::Str, true);
        string_ty.namespace = "System".to_string();
        let result_enum = decl("Result", TypeKeyword::Enum, ScalarKind::None, false);

        Compilation {
            types: vec![meter, counter, histogram, tag_name, string_ty, result_enum],
            annotated: Vec::new(),
        }
    }

    const STRING: TypeId = TypeId(4);
    const RESULT_ENUM: TypeId = TypeId(5);

    fn walk(comp: &Compilation, carrier: TypeId, sink: &mut DiagnosticBag) -> Result<StrongTypeResult, CycleError> {
        let symbols = resolve_symbols(comp).unwrap();
        extract_strong_type_configs(comp, &symbols, carrier, "RecordIt", &Location::default(), sink)
    }

    #[test]
    fn test_enum_member_becomes_leaf() {
        let mut comp = base_compilation();
        let mut carrier = decl("Tags", TypeKeyword::Class, ScalarKind::None, true);
        carrier.members.push(member("Result", RESULT_ENUM));
        comp.types.push(carrier);
        let carrier_id = TypeId(6);

        let mut sink = DiagnosticBag::new();
        let result = walk(&comp, carrier_id, &mut sink).unwrap();

        assert!(sink.is_empty());
        assert_eq!(result.tag_count, 1);
        assert_eq!(result.configs.len(), 1);
        assert_eq!(result.configs[0].name, "Result");
        assert_eq!(result.configs[0].tag_name, "Result");
        assert_eq!(result.configs[0].kind, TagKind::Enum);
        assert!(result.configs[0].path.is_empty());
    }

    #[test]
    fn test_nested_class_gets_marker_and_nullable_hop() {
        let mut comp = base_compilation();
        let mut inner = decl("Inner", TypeKeyword::Class, ScalarKind::None, true);
        inner.members.push(member("Status", STRING));
        comp.types.push(inner);
        let inner_id = TypeId(6);
        let mut carrier = decl("Tags", TypeKeyword::Class, ScalarKind::None, true);
        carrier.members.push(member("Inner", inner_id));
        comp.types.push(carrier);
        let carrier_id = TypeId(7);

        let mut sink = DiagnosticBag::new();
        let result = walk(&comp, carrier_id, &mut sink).unwrap();

        assert_eq!(result.configs.len(), 2);
        assert_eq!(result.configs[0].kind, TagKind::Class);
        assert_eq!(result.configs[0].name, "Inner");
        assert_eq!(result.configs[1].kind, TagKind::String);
        assert_eq!(result.configs[1].path, "Inner?");
        // Markers contribute no tag.
        assert_eq!(result.tag_count, 1);
    }

    #[test]
    fn test_nested_struct_hop_has_no_nullable_marker() {
        let mut comp = base_compilation();
        let mut inner = decl("Details", TypeKeyword::Struct, ScalarKind::None, false);
        inner.members.push(member("Region", STRING));
        comp.types.push(inner);
        let inner_id = TypeId(6);
        let mut carrier = decl("Tags", TypeKeyword::Class, ScalarKind::None, true);
        carrier.members.push(member("Details", inner_id));
        comp.types.push(carrier);
        let carrier_id = TypeId(7);

        let mut sink = DiagnosticBag::new();
        let result = walk(&comp, carrier_id, &mut sink).unwrap();

        assert_eq!(result.configs[0].kind, TagKind::Struct);
        assert_eq!(result.configs[1].path, "Details");
    }

    #[test]
    fn test_tag_name_override_applies() {
        let mut comp = base_compilation();
        let mut carrier = decl("Tags", TypeKeyword::Class, ScalarKind::None, true);
        let mut m = member("Result", RESULT_ENUM);
        m.annotations.push(MemberAnnotation {
            ty: comp.find_by_qualified_name(well_known::TAG_NAME_ATTRIBUTE).unwrap(),
            value: Some("outcome".to_string()),
        });
        carrier.members.push(m);
        comp.types.push(carrier);
        let carrier_id = TypeId(6);

        let mut sink = DiagnosticBag::new();
        let result = walk(&comp, carrier_id, &mut sink).unwrap();

        assert_eq!(result.configs[0].tag_name, "outcome");
        assert_eq!(result.configs[0].name, "Result");
    }

    #[test]
    fn test_duplicate_tag_name_keeps_earlier_entry() {
        let mut comp = base_compilation();
        let mut carrier = decl("Tags", TypeKeyword::Class, ScalarKind::None, true);
        carrier.members.push(member("Status", STRING));
        let mut dup = member("OtherStatus", STRING);
        dup.annotations.push(MemberAnnotation {
            ty: comp.find_by_qualified_name(well_known::TAG_NAME_ATTRIBUTE).unwrap(),
            value: Some("Status".to_string()),
        });
        carrier.members.push(dup);
        comp.types.push(carrier);
        let carrier_id = TypeId(6);

        let mut sink = DiagnosticBag::new();
        let result = walk(&comp, carrier_id, &mut sink).unwrap();

        assert_eq!(result.configs.len(), 1);
        assert_eq!(result.configs[0].name, "Status");
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.iter().next().unwrap().kind, DiagKind::DuplicateTagName);
    }

    #[test]
    fn test_invalid_member_type_reported_and_dropped() {
        let mut comp = base_compilation();
        let mut int_ty = decl("Int32", TypeKeyword::Struct, ScalarKind::Int32, false);
        int_ty.namespace = "System".to_string();
        comp.types.push(int_ty);
        let int_id = TypeId(6);
        let mut carrier = decl("Tags", TypeKeyword::Class, ScalarKind::None, true);
        carrier.members.push(member("Count", int_id));
        carrier.members.push(member("Status", STRING));
        comp.types.push(carrier);
        let carrier_id = TypeId(7);

        let mut sink = DiagnosticBag::new();
        let result = walk(&comp, carrier_id, &mut sink).unwrap();

        assert_eq!(result.configs.len(), 1);
        assert_eq!(result.configs[0].name, "Status");
        assert_eq!(sink.iter().next().unwrap().kind, DiagKind::InvalidTagValueType);
    }

    #[test]
    fn test_static_and_implicit_members_skipped() {
        let mut comp = base_compilation();
        let mut carrier = decl("Tags", TypeKeyword::Class, ScalarKind::None, true);
        let mut stat = member("Shared", STRING);
        stat.is_static = true;
        let mut implicit = member("EqualityContract", STRING);
        implicit.is_implicit = true;
        carrier.members.push(stat);
        carrier.members.push(implicit);
        carrier.members.push(member("Status", STRING));
        comp.types.push(carrier);
        let carrier_id = TypeId(6);

        let mut sink = DiagnosticBag::new();
        let result = walk(&comp, carrier_id, &mut sink).unwrap();
        assert_eq!(result.configs.len(), 1);
        assert_eq!(result.configs[0].name, "Status");
    }

    #[test]
    fn test_two_member_cycle_detected() {
        // A { B Inner; } / B { A Back; }
        let mut comp = base_compilation();
        let mut a = decl("A", TypeKeyword::Class, ScalarKind::None, true);
        let mut b = decl("B", TypeKeyword::Class, ScalarKind::None, true);
        a.members.push(member("Inner", TypeId(7)));
        b.members.push(member("Back", TypeId(6)));
        comp.types.push(a);
        comp.types.push(b);

        let mut sink = DiagnosticBag::new();
        let err = walk(&comp, TypeId(6), &mut sink).unwrap_err();
        assert_eq!(err.container, TypeId(7));
        assert_eq!(err.member_type, TypeId(6));
    }

    #[test]
    fn test_self_cycle_detected() {
        let mut comp = base_compilation();
        let mut a = decl("A", TypeKeyword::Class, ScalarKind::None, true);
        a.members.push(member("Self", TypeId(6)));
        comp.types.push(a);

        let mut sink = DiagnosticBag::new();
        let err = walk(&comp, TypeId(6), &mut sink).unwrap_err();
        assert_eq!(err.container, TypeId(6));
        assert_eq!(err.member_type, TypeId(6));
    }

    #[test]
    fn test_cycle_through_base_chain_detected() {
        // Tags derives from BaseTags, which holds a member of type Tags.
        let mut comp = base_compilation();
        let mut base = decl("BaseTags", TypeKeyword::Class, ScalarKind::None, true);
        base.members.push(member("Derived", TypeId(7)));
        comp.types.push(base);
        let mut carrier = decl("Tags", TypeKeyword::Class, ScalarKind::None, true);
        carrier.base = Some(TypeId(6));
        comp.types.push(carrier);

        let mut sink = DiagnosticBag::new();
        let err = walk(&comp, TypeId(7), &mut sink).unwrap_err();
        assert_eq!(err.container, TypeId(6));
        assert_eq!(err.member_type, TypeId(7));
    }

    #[test]
    fn test_cycle_through_base_of_nested_member_detected() {
        // Carrier -> Inner, where Inner's base holds a member of type Carrier.
        let mut comp = base_compilation();
        let mut inner_base = decl("InnerBase", TypeKeyword::Class, ScalarKind::None, true);
        inner_base.members.push(member("Root", TypeId(8)));
        comp.types.push(inner_base);
        let mut inner = decl("Inner", TypeKeyword::Class, ScalarKind::None, true);
        inner.base = Some(TypeId(6));
        comp.types.push(inner);
        let mut carrier = decl("Carrier", TypeKeyword::Class, ScalarKind::None, true);
        carrier.members.push(member("Inner", TypeId(7)));
        comp.types.push(carrier);

        let mut sink = DiagnosticBag::new();
        let err = walk(&comp, TypeId(8), &mut sink).unwrap_err();
        assert_eq!(err.container, TypeId(6));
        assert_eq!(err.member_type, TypeId(8));
    }

    #[test]
    fn test_siblings_may_reuse_a_type() {
        // The visited set models the current path, not the whole graph.
        let mut comp = base_compilation();
        let mut shared = decl("Shared", TypeKeyword::Class, ScalarKind::None, true);
        shared.members.push(member("Status", STRING));
        comp.types.push(shared);
        let shared_id = TypeId(6);
        let mut carrier = decl("Tags", TypeKeyword::Class, ScalarKind::None, true);
        carrier.members.push(member("First", shared_id));
        carrier.members.push(member("Second", shared_id));
        comp.types.push(carrier);
        let carrier_id = TypeId(7);

        let mut sink = DiagnosticBag::new();
        let result = walk(&comp, carrier_id, &mut sink).unwrap();

        // Both branches expanded; the second leaf is a duplicate tag name.
        assert_eq!(result.configs.iter().filter(|c| c.kind == TagKind::Class).count(), 2);
        assert_eq!(sink.iter().filter(|d| d.kind == DiagKind::DuplicateTagName).count(), 1);
    }

    #[test]
    fn test_inherited_members_folded_in_with_fresh_visited_set() {
        let mut comp = base_compilation();
        let mut base = decl("BaseTags", TypeKeyword::Class, ScalarKind::None, true);
        base.members.push(member("Inherited", STRING));
        comp.types.push(base);
        let base_id = TypeId(6);
        let mut carrier = decl("Tags", TypeKeyword::Class, ScalarKind::None, true);
        carrier.base = Some(base_id);
        carrier.members.push(member("Own", STRING));
        comp.types.push(carrier);
        let carrier_id = TypeId(7);

        let mut sink = DiagnosticBag::new();
        let result = walk(&comp, carrier_id, &mut sink).unwrap();

        let names: Vec<_> = result.configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Own", "Inherited"]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_doc_description_key_asymmetry() {
        let mut comp = base_compilation();
        let mut carrier = decl("Tags", TypeKeyword::Class, ScalarKind::None, true);
        let mut with_override = member("Result", RESULT_ENUM);
        with_override.doc_summary = Some("The outcome.".to_string());
        with_override.annotations.push(MemberAnnotation {
            ty: comp.find_by_qualified_name(well_known::TAG_NAME_ATTRIBUTE).unwrap(),
            value: Some("outcome".to_string()),
        });
        let mut plain = member("Status", STRING);
        plain.doc_summary = Some("The status.".to_string());
        carrier.members.push(with_override);
        carrier.members.push(plain);
        comp.types.push(carrier);
        let carrier_id = TypeId(6);

        let mut sink = DiagnosticBag::new();
        let result = walk(&comp, carrier_id, &mut sink).unwrap();

        // Override path keys by the override, default path keys by the access path.
        assert_eq!(result.descriptions.get("outcome").map(String::as_str), Some("The outcome."));
        assert_eq!(result.descriptions.get("Status").map(String::as_str), Some("The status."));
    }
}
